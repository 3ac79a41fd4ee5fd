mod actions;
mod defaults;
mod key;
mod keybindings;
mod loader;
mod resolver;

use serde::{Deserialize, Serialize};

pub use actions::{DialogAction, FormAction, GlobalAction, ListAction, NavAction, SearchAction};
pub use keybindings::KeybindingsConfig;
pub use loader::{load, save_last_store};
pub use resolver::KeyResolver;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub name: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "Catppuccin Mocha".to_string(),
        }
    }
}

/// Where the admin backend lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Per-request timeout. Requests wait indefinitely when unset.
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
    /// Store opened on the previous run.
    #[serde(default)]
    pub last_store: Option<String>,
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.api, ApiConfig::default());
        assert_eq!(config.theme.name, "Catppuccin Mocha");
        assert!(config.last_store.is_none());
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            last_store = "s1"

            [api]
            timeout_secs = 10

            [keybindings.list]
            reload = "F5"
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, DEFAULT_API_URL);
        assert_eq!(config.api.timeout_secs, Some(10));
        assert_eq!(config.last_store.as_deref(), Some("s1"));

        let resolver = KeyResolver::new(std::sync::Arc::new(config.keybindings));
        let f5 = KeyEvent::new(KeyCode::F(5), KeyModifiers::NONE);
        let n = KeyEvent::new(KeyCode::Char('n'), KeyModifiers::NONE);
        assert!(resolver.matches_list(&f5, ListAction::Reload));
        assert!(resolver.matches_list(&n, ListAction::New));
    }
}
