use std::fs;
use std::path::{Path, PathBuf};

use crate::types::TranscoderConfig;

/// `~/.prodsched/config.json`
pub fn config_path() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or("Could not find home directory")?;
    Ok(home.join(".prodsched").join("config.json"))
}

/// Load configuration from the default location.
pub fn load_config() -> Result<TranscoderConfig, String> {
    load_config_from(&config_path()?)
}

/// Load configuration from a file. A missing file yields the defaults.
pub fn load_config_from(config_path: &Path) -> Result<TranscoderConfig, String> {
    if !config_path.exists() {
        log::info!(
            "No config at {}; using defaults",
            config_path.display()
        );
        return Ok(TranscoderConfig::default());
    }

    let content =
        fs::read_to_string(config_path).map_err(|e| format!("Failed to read config: {}", e))?;

    let config: TranscoderConfig =
        serde_json::from_str(&content).map_err(|e| format!("Failed to parse config: {}", e))?;

    if config.model.command.trim().is_empty() {
        return Err("Config model.command must not be empty".to_string());
    }
    if config.model.timeout_secs == 0 {
        return Err("Config model.timeoutSecs must be greater than zero".to_string());
    }

    Ok(config)
}
