//! Configuration loading: a TOML file plus the API key from the
//! environment.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default config file name, looked up in the repo root.
pub const CONFIG_FILE: &str = "scribe.toml";

/// The API key never lives in the config file.
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

fn default_model() -> String {
    "openai/gpt-4o".to_string()
}

fn default_language() -> String {
    "English".to_string()
}

fn default_site_url() -> String {
    "https://localhost".to_string()
}

fn default_site_name() -> String {
    "scribe".to_string()
}

/// User-tunable settings. Every field has a default, so a missing config
/// file is equivalent to an empty one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Primary model id; the fallback chain is appended after it.
    #[serde(default = "default_model")]
    pub model: String,

    /// Natural language for generated descriptions.
    #[serde(default = "default_language")]
    pub language: String,

    /// Sent as the HTTP-Referer attribution header.
    #[serde(default = "default_site_url")]
    pub site_url: String,

    /// Sent as the X-Title attribution header.
    #[serde(default = "default_site_name")]
    pub site_name: String,

    /// Classify and print without committing.
    #[serde(default)]
    pub dry_run: bool,

    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            model: default_model(),
            language: default_language(),
            site_url: default_site_url(),
            site_name: default_site_name(),
            dry_run: false,
            api_key: None,
        }
    }
}

impl Config {
    /// Load from `path`, falling back to defaults when the file does not
    /// exist. The API key always comes from the environment.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(content) => {
                toml::from_str(&content).map_err(|source| ConfigError::ParseFailed {
                    path: path.display().to_string(),
                    source,
                })?
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Config::default(),
            Err(source) => {
                return Err(ConfigError::ReadFailed {
                    path: path.display().to_string(),
                    source,
                });
            }
        };

        config.api_key = std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty());
        Ok(config)
    }

    /// The API key, or [`ConfigError::MissingApiKey`] when unset.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key.as_deref().ok_or(ConfigError::MissingApiKey)
    }

    /// Write a commented starter config to `path`.
    pub fn write_default(path: &Path) -> Result<(), ConfigError> {
        let template = "\
# scribe configuration
#
# The OpenRouter API key is NOT stored here. Export it instead:
#   export OPENROUTER_API_KEY=sk-or-...

# Primary model. Fallbacks are tried automatically when it fails.
model = \"openai/gpt-4o\"

# Natural language for commit descriptions.
language = \"English\"

# Attribution headers sent with every request.
site_url = \"https://localhost\"
site_name = \"scribe\"

# Classify and print without committing.
dry_run = false
";
        std::fs::write(path, template).map_err(|source| ConfigError::WriteFailed {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.model, "openai/gpt-4o");
        assert_eq!(config.language, "English");
        assert!(!config.dry_run);
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "model = \"anthropic/claude-3-haiku\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.model, "anthropic/claude-3-haiku");
        assert_eq!(config.language, "English");
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "model = [not toml").unwrap();
        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn test_written_default_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        Config::write_default(&path).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.model, "openai/gpt-4o");
        assert_eq!(config.site_name, "scribe");
    }

    #[test]
    fn test_missing_api_key_is_an_error() {
        let config = Config::default();
        assert!(matches!(
            config.require_api_key(),
            Err(ConfigError::MissingApiKey)
        ));
    }
}
