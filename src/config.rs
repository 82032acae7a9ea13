use serde::{Deserialize, Serialize};

/// Deepest heading level the engine accepts by default.
pub const MAX_LEVEL: u8 = 10;

/// Tunables for an editing session. Hosts usually run with the defaults;
/// the struct is serializable so they can persist overrides alongside their
/// own settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Valid section levels are `1..=max_level`.
    pub max_level: u8,
    /// Drop empty blocks from the edges of pasted fragments before
    /// normalizing them.
    pub trim_paste_edges: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_level: MAX_LEVEL,
            trim_paste_edges: true,
        }
    }
}
