use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_HISTORY_SIZE: usize = 50;

/// Editor settings, usually read from `stencil.config.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Undo levels kept before the oldest entry is evicted
    #[serde(default = "default_max_history_size")]
    pub max_history_size: usize,

    /// Prefix for generated node ids; derived from the document name when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_seed: Option<String>,
}

fn default_max_history_size() -> usize {
    DEFAULT_MAX_HISTORY_SIZE
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_history_size: default_max_history_size(),
            id_seed: None,
        }
    }
}
