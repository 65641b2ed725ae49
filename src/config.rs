//! Configuration file parser for ~/.config/todo-client/config.toml.
//!
//! The config file is optional; a missing file yields `Config::default()`.
//! Unknown keys are silently ignored by serde (with `deny_unknown_fields` off),
//! though we log a warning when the file contains potential typos.
use crate::filter::Filter;
use crate::notice::DEFAULT_NOTICE_TTL;
use secrecy::SecretString;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// Missing keys fall back to `Default::default()`.
///
/// Custom Debug impl masks `api_token` so it never reaches logs.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the todo API; `/todos` is appended.
    pub api_base_url: String,

    /// Signed-in user. `None` means anonymous.
    pub user_id: Option<i64>,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// How long an error notice stays visible, in seconds.
    pub notice_secs: u64,

    /// Filter applied to the list on startup.
    pub default_filter: Filter,

    /// Bearer token for the API (alternative to TODO_API_TOKEN env var).
    /// Env var takes precedence over config file.
    pub api_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "https://mate.academy/students-api".to_string(),
            user_id: None,
            request_timeout_secs: 30,
            notice_secs: DEFAULT_NOTICE_TTL.as_secs(),
            default_filter: Filter::All,
            api_token: None,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_base_url", &self.api_base_url)
            .field("user_id", &self.user_id)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("notice_secs", &self.notice_secs)
            .field("default_filter", &self.default_filter)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 6] = [
        "api_base_url",
        "user_id",
        "request_timeout_secs",
        "notice_secs",
        "default_filter",
        "api_token",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → silently accepted (serde default behavior), logged as warning
    /// - Zero `request_timeout_secs`/`notice_secs` → replaced by the default, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let mut config: Config = toml::from_str(&content)?;
        config.replace_zero_durations();
        tracing::info!(path = %path.display(), api_base_url = %config.api_base_url, "Loaded configuration");
        Ok(config)
    }

    /// Durations must be positive; zero is replaced by the default.
    fn replace_zero_durations(&mut self) {
        let defaults = Self::default();
        if self.request_timeout_secs == 0 {
            tracing::warn!(
                default = defaults.request_timeout_secs,
                "request_timeout_secs must be positive, using default"
            );
            self.request_timeout_secs = defaults.request_timeout_secs;
        }
        if self.notice_secs == 0 {
            tracing::warn!(
                default = defaults.notice_secs,
                "notice_secs must be positive, using default"
            );
            self.notice_secs = defaults.notice_secs;
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn notice_ttl(&self) -> Duration {
        Duration::from_secs(self.notice_secs)
    }

    /// API token from `env_token` (the TODO_API_TOKEN value), else from the file.
    pub fn resolve_token(&self, env_token: Option<String>) -> Option<SecretString> {
        env_token
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.api_token.clone())
            .map(SecretString::from)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn write_config(name: &str, content: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("todo_client_config_test_{name}"));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    fn cleanup(path: &Path) {
        if let Some(dir) = path.parent() {
            std::fs::remove_dir_all(dir).ok();
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_base_url, "https://mate.academy/students-api");
        assert_eq!(config.user_id, None);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.notice_ttl(), Duration::from_secs(3));
        assert_eq!(config.default_filter, Filter::All);
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/todo_client_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let path = write_config("whitespace", "   \n  \n  ");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.notice_secs, 3);
        cleanup(&path);
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let path = write_config("partial", "user_id = 42\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.user_id, Some(42));
        assert_eq!(config.request_timeout_secs, 30); // default
        assert_eq!(config.default_filter, Filter::All); // default
        cleanup(&path);
    }

    #[test]
    fn test_full_config() {
        let content = r#"
api_base_url = "http://127.0.0.1:9000/api"
user_id = 7
request_timeout_secs = 5
notice_secs = 10
default_filter = "completed"
api_token = "test-token-123"
"#;
        let path = write_config("full", content);

        let config = Config::load(&path).unwrap();
        assert_eq!(config.api_base_url, "http://127.0.0.1:9000/api");
        assert_eq!(config.user_id, Some(7));
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.notice_ttl(), Duration::from_secs(10));
        assert_eq!(config.default_filter, Filter::Completed);
        assert_eq!(config.api_token.as_deref(), Some("test-token-123"));
        cleanup(&path);
    }

    #[test]
    fn test_zero_notice_secs_falls_back_to_default() {
        let path = write_config("zero_notice", "notice_secs = 0\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.notice_ttl(), Duration::from_secs(3));

        // A notice raised with the loaded lifetime must be visible
        let mut notice = crate::notice::Notice::new(config.notice_ttl());
        notice.raise("Unable to add a todo");
        assert!(notice.is_active());
        cleanup(&path);
    }

    #[test]
    fn test_zero_request_timeout_falls_back_to_default() {
        let path = write_config("zero_timeout", "request_timeout_secs = 0\nnotice_secs = 5\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.notice_ttl(), Duration::from_secs(5));
        cleanup(&path);
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let path = write_config("invalid", "this is not [valid toml");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
        cleanup(&path);
    }

    #[test]
    fn test_unknown_filter_is_parse_error() {
        let path = write_config("bad_filter", "default_filter = \"done\"\n");
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
        cleanup(&path);
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let content = r#"
user_id = 3
totally_fake_key = "should not fail"
"#;
        let path = write_config("unknown", content);
        let config = Config::load(&path).unwrap();
        assert_eq!(config.user_id, Some(3));
        cleanup(&path);
    }

    #[test]
    fn test_too_large_file_rejected() {
        let path = write_config("too_large", &"a".repeat(1_048_577));
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));
        cleanup(&path);
    }

    #[test]
    fn test_env_token_takes_precedence() {
        let config = Config {
            api_token: Some("from-file".to_string()),
            ..Config::default()
        };

        let token = config.resolve_token(Some("from-env".to_string())).unwrap();
        assert_eq!(token.expose_secret(), "from-env");

        let token = config.resolve_token(Some("  ".to_string())).unwrap();
        assert_eq!(token.expose_secret(), "from-file");

        let token = config.resolve_token(None).unwrap();
        assert_eq!(token.expose_secret(), "from-file");

        assert!(Config::default().resolve_token(None).is_none());
    }

    #[test]
    fn test_debug_masks_api_token() {
        let config = Config {
            api_token: Some("super-secret-key-12345".to_string()),
            ..Config::default()
        };

        let debug_output = format!("{:?}", config);
        assert!(
            !debug_output.contains("super-secret-key-12345"),
            "Debug output should not contain the API token"
        );
        assert!(debug_output.contains("[REDACTED]"));
    }
}
