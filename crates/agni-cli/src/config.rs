use std::path::PathBuf;

use agni_core::AgniConfig;
use anyhow::Context;

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("agni")
        .join("config.toml")
}

/// Settings from the config file, or defaults when it is missing or invalid
pub fn load_config() -> AgniConfig {
    let path = config_path();
    let Ok(text) = std::fs::read_to_string(&path) else {
        return AgniConfig::default();
    };
    match AgniConfig::from_toml(&text) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Ignoring {}: {e}", path.display());
            AgniConfig::default()
        }
    }
}

pub fn save_config(config: &AgniConfig) -> anyhow::Result<PathBuf> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let text = toml::to_string_pretty(config)?;
    std::fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path() {
        let path = config_path();
        assert!(path.ends_with("agni/config.toml"));
    }
}
