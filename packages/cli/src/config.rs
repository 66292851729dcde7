use std::path::Path;
use stencil_editor::EditorConfig;

pub const DEFAULT_CONFIG_NAME: &str = "stencil.config.json";

/// Load editor settings from `cwd`, or defaults when there is no config file
pub fn load(cwd: &Path) -> anyhow::Result<EditorConfig> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);

    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        let config: EditorConfig = serde_json::from_str(&content)?;
        tracing::debug!(path = %config_path.display(), "Loaded config");
        Ok(config)
    } else {
        Ok(EditorConfig::default())
    }
}
