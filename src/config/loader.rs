use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::AppConfig;

const CONFIG_DIR: &str = "storedash";
const CONFIG_FILE: &str = "config.toml";

fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(CONFIG_DIR))
}

fn config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join(CONFIG_FILE))
}

pub fn load() -> color_eyre::Result<AppConfig> {
    let Some(path) = config_path() else {
        debug!("No config directory found, using defaults");
        return Ok(AppConfig::default());
    };
    load_from(&path)
}

fn load_from(path: &Path) -> color_eyre::Result<AppConfig> {
    if !path.exists() {
        debug!("Config file not found at {}, using defaults", path.display());
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    debug!("Loaded config from {}", path.display());
    Ok(config)
}

fn save_to(path: &Path, config: &AppConfig) -> color_eyre::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, toml::to_string_pretty(config)?)?;
    debug!("Saved config to {}", path.display());
    Ok(())
}

/// Remember the store opened last so the next launch starts there.
///
/// Re-reads the file so keys edited while the app was running survive. A file
/// that no longer parses is left untouched.
pub fn save_last_store(store_id: &str) -> color_eyre::Result<()> {
    let Some(path) = config_path() else {
        warn!("Could not determine config directory");
        return Ok(());
    };
    save_last_store_at(&path, store_id)
}

fn save_last_store_at(path: &Path, store_id: &str) -> color_eyre::Result<()> {
    let mut config = load_from(path)?;
    if config.last_store.as_deref() == Some(store_id) {
        return Ok(());
    }
    config.last_store = Some(store_id.to_string());
    save_to(path, &config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_last_store_keeps_other_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[api]\nbase_url = \"https://shop.example\"\n").unwrap();

        save_last_store_at(&path, "s1").unwrap();

        let config = load_from(&path).unwrap();
        assert_eq!(config.api.base_url, "https://shop.example");
        assert_eq!(config.last_store.as_deref(), Some("s1"));
    }

    #[test]
    fn test_save_last_store_leaves_broken_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let content = "[api]\nbase_url = \"https://shop.example\"\nthis is not toml\n";
        fs::write(&path, content).unwrap();

        assert!(save_last_store_at(&path, "s1").is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), content);
    }

    #[test]
    fn test_missing_file_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storedash").join(CONFIG_FILE);

        save_last_store_at(&path, "s2").unwrap();

        assert_eq!(load_from(&path).unwrap().last_store.as_deref(), Some("s2"));
    }
}
