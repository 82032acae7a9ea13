use serde_json::Value;

use crate::config::EngineConfig;
use crate::error::EngineError;

use super::tree::{Block, BlockKind, Node, Section};

/// Builds a node list from a structural JSON array, the shape hosts hand to
/// `normalize_clipboard`.
pub fn fragment_from_description(
    value: &Value,
    config: &EngineConfig,
) -> Result<Vec<Node>, EngineError> {
    let Some(items) = value.as_array() else {
        return Err(EngineError::SchemaRejection(
            "fragment description must be an array".into(),
        ));
    };
    items
        .iter()
        .map(|item| node_from_description(item, config))
        .collect()
}

/// Builds one node from its structural JSON description. Sections carry
/// `{"type": "section", "level": n, "title": "...", "body": [...]}`; blocks
/// carry `{"type": "paragraph" | "list" | "table" | "code", "text": "..."}`.
/// Shape and level-range violations are schema rejections.
pub fn node_from_description(value: &Value, config: &EngineConfig) -> Result<Node, EngineError> {
    let Some(obj) = value.as_object() else {
        return Err(EngineError::SchemaRejection(
            "node description must be an object".into(),
        ));
    };
    let Some(ty) = obj.get("type").and_then(Value::as_str) else {
        return Err(EngineError::SchemaRejection(
            "node description lacks a type".into(),
        ));
    };
    match ty {
        "section" => {
            let Some(level) = obj.get("level").and_then(Value::as_u64) else {
                return Err(EngineError::SchemaRejection(
                    "section description lacks a level".into(),
                ));
            };
            if level == 0 || level > u64::from(config.max_level) {
                return Err(EngineError::SchemaRejection(format!(
                    "section level {level} outside 1..={}",
                    config.max_level
                )));
            }
            let title = obj.get("title").and_then(Value::as_str).unwrap_or("");
            let body = match obj.get("body") {
                Some(body) => fragment_from_description(body, config)?,
                None => Vec::new(),
            };
            let mut sec = Section::new(level as u8, title).with_body(body);
            if sec.body.is_empty() {
                sec.body.push(Node::Block(Block::empty()));
            }
            Ok(Node::Section(sec))
        }
        "paragraph" | "list" | "table" | "code" => {
            let kind = match ty {
                "list" => BlockKind::List,
                "table" => BlockKind::Table,
                "code" => BlockKind::Code,
                _ => BlockKind::Paragraph,
            };
            let text = obj.get("text").and_then(Value::as_str).unwrap_or("");
            Ok(Node::Block(Block {
                kind,
                text: text.to_string(),
            }))
        }
        other => Err(EngineError::SchemaRejection(format!(
            "unknown node type {other:?}"
        ))),
    }
}

/// Re-checks a constructed subtree against the structural invariants before
/// it is staged.
pub fn validate_node(node: &Node, config: &EngineConfig) -> Result<(), EngineError> {
    match node {
        Node::Block(_) => Ok(()),
        Node::Section(sec) => {
            if sec.level == 0 || sec.level > config.max_level {
                return Err(EngineError::SchemaRejection(format!(
                    "section level {} outside 1..={}",
                    sec.level, config.max_level
                )));
            }
            if sec.body.is_empty() {
                return Err(EngineError::SchemaRejection(
                    "section body must hold at least one block".into(),
                ));
            }
            for child in &sec.body {
                validate_node(child, config)?;
            }
            Ok(())
        }
    }
}
