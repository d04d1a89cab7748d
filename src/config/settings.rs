//! Configuration settings for Reelchat.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable consulted when `tmdb.api_key` is not set.
pub const TMDB_API_KEY_ENV: &str = "TMDB_API_KEY";

/// Environment variable consulted when `tmdb.read_access_token` is not set.
pub const TMDB_TOKEN_ENV: &str = "TMDB_READ_ACCESS_TOKEN";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub model: ModelSettings,
    pub tmdb: TmdbSettings,
    pub server: ServerSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// First assistant line shown when a chat session opens.
    pub greeting: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            greeting: "Hello! I'm your movie-buff assistant. Ask me to find a movie by title, \
                recommend something by genre, or show what's trending!"
                .to_string(),
        }
    }
}

/// Language model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Chat model used for tool selection and answers.
    pub model: String,
    /// Base URL of an OpenAI-compatible API. None = api.openai.com.
    pub api_base: Option<String>,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Timeout for a single model call.
    pub timeout_secs: u64,
    /// Maximum tool rounds per user turn.
    pub max_tool_rounds: usize,
    /// Sampling temperature (provider default when unset).
    pub temperature: Option<f32>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            api_base: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 30,
            max_tool_rounds: 5,
            temperature: None,
        }
    }
}

impl ModelSettings {
    /// Resolve the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env).ok().filter(|k| !k.is_empty())
    }
}

/// TMDB API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TmdbSettings {
    /// API root, without trailing slash.
    pub base_url: String,
    /// Prefix for poster paths.
    pub image_base_url: String,
    /// v3 API key, sent as the `api_key` query parameter.
    pub api_key: Option<String>,
    /// v4 read access token, sent as a Bearer header.
    pub read_access_token: Option<String>,
    /// Response language.
    pub language: String,
    /// Maximum records returned by list operations.
    pub page_size: usize,
    /// Number of trending records returned.
    pub trending_limit: usize,
    /// Fetch cast and director for every returned record.
    pub enrich_details: bool,
    /// Concurrent detail requests during enrichment.
    pub enrich_concurrency: usize,
    /// Timeout for a single HTTP request.
    pub timeout_secs: u64,
    /// Extra attempts on transient failures.
    pub retries: u32,
    /// Delay before a retry.
    pub retry_delay_ms: u64,
}

impl Default for TmdbSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.themoviedb.org/3".to_string(),
            image_base_url: "https://image.tmdb.org/t/p/w500".to_string(),
            api_key: None,
            read_access_token: None,
            language: "en-US".to_string(),
            page_size: 20,
            trending_limit: 5,
            enrich_details: true,
            enrich_concurrency: 4,
            timeout_secs: 15,
            retries: 1,
            retry_delay_ms: 250,
        }
    }
}

/// How requests to TMDB are authenticated.
#[derive(Debug, Clone, PartialEq)]
pub enum TmdbAuth {
    ApiKey(String),
    Bearer(String),
}

impl TmdbSettings {
    /// Resolve credentials from config, then from the environment.
    ///
    /// A read access token wins over an API key when both are present.
    pub fn auth(&self) -> Option<TmdbAuth> {
        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());
        let env = |name: &str| std::env::var(name).ok().filter(|s| !s.is_empty());

        non_empty(&self.read_access_token)
            .or_else(|| env(TMDB_TOKEN_ENV))
            .map(TmdbAuth::Bearer)
            .or_else(|| {
                non_empty(&self.api_key)
                    .or_else(|| env(TMDB_API_KEY_ENV))
                    .map(TmdbAuth::ApiKey)
            })
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Sessions unused for this long are dropped.
    pub session_idle_secs: u64,
    /// Open sessions kept at most; the least recently used goes first.
    pub max_sessions: usize,
    /// How often idle sessions are swept.
    pub sweep_interval_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            session_idle_secs: 1800,
            max_sessions: 1000,
            sweep_interval_secs: 60,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Overrides the built-in system prompt.
    pub system: Option<String>,
    /// Overrides the answer given when the tool round limit is hit.
    pub fallback: Option<String>,
    /// Overrides the answer given when the model call fails.
    pub model_failure: Option<String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::ReelError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("reelchat")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Set a single value by dotted key, e.g. `model.max_tool_rounds`.
    ///
    /// The value is parsed as a TOML scalar when possible, otherwise kept as a string.
    pub fn set_value(&mut self, key: &str, value: &str) -> crate::error::Result<()> {
        let (section, field) = key.split_once('.').ok_or_else(|| {
            crate::error::ReelError::Config(format!("Key must be 'section.field', got '{}'", key))
        })?;

        let mut doc = toml::Value::try_from(&*self)
            .map_err(|e| crate::error::ReelError::Config(e.to_string()))?;

        let table = doc
            .get_mut(section)
            .and_then(|s| s.as_table_mut())
            .ok_or_else(|| crate::error::ReelError::Config(format!("Unknown section: {}", section)))?;

        let parsed = toml::from_str::<toml::Table>(&format!("v = {}", value))
            .ok()
            .and_then(|mut t| t.remove("v"))
            .filter(|v| !v.is_table())
            .unwrap_or_else(|| toml::Value::String(value.to_string()));
        table.insert(field.to_string(), parsed);

        *self = doc
            .try_into()
            .map_err(|e: toml::de::Error| crate::error::ReelError::Config(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [model]
            model = "gemini-2.5-flash"
            api_base = "https://generativelanguage.googleapis.com/v1beta/openai"

            [tmdb]
            page_size = 10
            "#,
        )
        .unwrap();

        assert_eq!(settings.model.model, "gemini-2.5-flash");
        assert_eq!(settings.model.max_tool_rounds, 5);
        assert_eq!(settings.tmdb.page_size, 10);
        assert_eq!(settings.tmdb.trending_limit, 5);
        assert_eq!(settings.tmdb.base_url, "https://api.themoviedb.org/3");
        assert_eq!(settings.server.session_idle_secs, 1800);
    }

    #[test]
    fn test_configured_token_wins_over_key() {
        let tmdb = TmdbSettings {
            api_key: Some("key".to_string()),
            read_access_token: Some("token".to_string()),
            ..Default::default()
        };
        assert_eq!(tmdb.auth(), Some(TmdbAuth::Bearer("token".to_string())));
    }

    #[test]
    fn test_set_value() {
        let mut settings = Settings::default();
        settings.set_value("model.max_tool_rounds", "3").unwrap();
        settings.set_value("model.model", "gpt-4.1").unwrap();
        settings.set_value("server.max_sessions", "50").unwrap();
        assert_eq!(settings.server.max_sessions, 50);
        assert_eq!(settings.model.max_tool_rounds, 3);
        assert_eq!(settings.model.model, "gpt-4.1");

        assert!(settings.set_value("nope.field", "1").is_err());
        assert!(settings.set_value("no_dot", "1").is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.tmdb.language = "fr-FR".to_string();
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.tmdb.language, "fr-FR");
    }
}
