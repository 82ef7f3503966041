//! Configuration file parser for ~/.config/guestbook/config.toml.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are accepted but logged, since they are usually typos.
use crate::feed::{DEFAULT_PAGE_SIZE, DEFAULT_SCROLL_THRESHOLD};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Environment variable that overrides `signer_token`.
pub const SIGNER_TOKEN_ENV: &str = "GUESTBOOK_SIGNER_TOKEN";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration
// ============================================================================

/// Top-level application configuration.
///
/// Every key is optional; missing keys fall back to `Default::default()`.
/// `Debug` masks `signer_token`.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// NEAR JSON-RPC endpoint.
    pub rpc_url: String,

    /// Account id of the guest book contract.
    pub contract_id: String,

    /// Messages requested per fetch.
    pub page_size: u64,

    /// Rows from the bottom of the list at which older messages are loaded.
    pub scroll_threshold: usize,

    /// Timeout for every RPC and signer request.
    pub request_timeout_secs: u64,

    /// Signed-in account. Posting is disabled without it.
    pub account_id: Option<String>,

    /// Base URL of the wallet signer relay.
    pub signer_url: Option<String>,

    /// Bearer token for the signer relay (env var takes precedence).
    pub signer_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: "https://rpc.testnet.near.org".to_string(),
            contract_id: "guestbook.near-examples.testnet".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            scroll_threshold: DEFAULT_SCROLL_THRESHOLD,
            request_timeout_secs: 20,
            account_id: None,
            signer_url: None,
            signer_token: None,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("rpc_url", &self.rpc_url)
            .field("contract_id", &self.contract_id)
            .field("page_size", &self.page_size)
            .field("scroll_threshold", &self.scroll_threshold)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("account_id", &self.account_id)
            .field("signer_url", &self.signer_url)
            .field(
                "signer_token",
                &self.signer_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 8] = [
        "rpc_url",
        "contract_id",
        "page_size",
        "scroll_threshold",
        "request_timeout_secs",
        "account_id",
        "signer_url",
        "signer_token",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing or empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - `page_size` of 0 is raised to 1
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
        if config.page_size == 0 {
            tracing::warn!("page_size = 0 in config file, using 1");
            config.page_size = 1;
        }
        tracing::info!(
            path = %path.display(),
            contract = %config.contract_id,
            page_size = config.page_size,
            "Loaded configuration"
        );
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Signer token from the environment, falling back to the file.
    pub fn resolve_signer_token(&self) -> Option<SecretString> {
        std::env::var(SIGNER_TOKEN_ENV)
            .ok()
            .filter(|t| !t.is_empty())
            .or_else(|| self.signer_token.clone())
            .map(SecretString::from)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(name: &str, content: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("guestbook_config_test_{name}"));
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
        assert_eq!(config.rpc_url, "https://rpc.testnet.near.org");
        assert_eq!(config.contract_id, "guestbook.near-examples.testnet");
        assert_eq!(config.page_size, 50);
        assert_eq!(config.scroll_threshold, 2);
        assert_eq!(config.request_timeout(), Duration::from_secs(20));
        assert!(config.account_id.is_none());
        assert!(config.signer_url.is_none());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/guestbook_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.page_size, 50);
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let path = write_config("whitespace", "   \n  \n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.contract_id, "guestbook.near-examples.testnet");
        cleanup(&path);
    }

    #[test]
    fn test_full_config() {
        let path = write_config(
            "full",
            r#"
rpc_url = "https://rpc.mainnet.near.org"
contract_id = "guestbook.near"
page_size = 25
scroll_threshold = 5
request_timeout_secs = 10
account_id = "alice.near"
signer_url = "https://signer.example.com/"
signer_token = "token-123"
"#,
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(config.rpc_url, "https://rpc.mainnet.near.org");
        assert_eq!(config.contract_id, "guestbook.near");
        assert_eq!(config.page_size, 25);
        assert_eq!(config.scroll_threshold, 5);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.account_id.as_deref(), Some("alice.near"));
        assert_eq!(config.signer_token.as_deref(), Some("token-123"));
        cleanup(&path);
    }

    #[test]
    fn test_zero_page_size_raised() {
        let path = write_config("zero_page", "page_size = 0\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.page_size, 1);
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
    fn test_wrong_type_returns_error() {
        let path = write_config("wrong_type", "page_size = \"fifty\"\n");
        assert!(Config::load(&path).is_err());
        cleanup(&path);
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let path = write_config("unknown", "page_size = 10\ntheme = \"dark\"\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.page_size, 10);
        cleanup(&path);
    }

    #[test]
    fn test_too_large_file_rejected() {
        let path = write_config("too_large", &"a".repeat(1_048_577));
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        cleanup(&path);
    }

    #[test]
    fn test_debug_masks_signer_token() {
        let config = Config {
            signer_token: Some("super-secret-token".to_string()),
            ..Config::default()
        };
        let debug_output = format!("{:?}", config);
        assert!(!debug_output.contains("super-secret-token"));
        assert!(debug_output.contains("[REDACTED]"));
    }
}
