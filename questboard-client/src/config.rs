//! Configuration loading for the Questboard client.
//!
//! All fields are required unless explicitly marked optional. No defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or QUESTBOARD_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Project URL; `/rest/v1/<table>` is appended per request.
    pub api_base_url: String,
    pub auth: AuthConfig,
    pub request_timeout_ms: u64,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    pub api_key: String,
    /// Session token; the api key is sent as bearer when absent.
    pub jwt: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    pub json: bool,
}

impl ClientConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path_from_args().or_else(config_path_from_env);
        let path = path.ok_or(ConfigError::MissingConfigPath)?;
        let config = Self::from_path(&path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.api_base_url.trim();
        if base.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if !base.starts_with("http://") && !base.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                reason: "must start with http:// or https://".to_string(),
            });
        }
        if self.auth.api_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "auth.api_key",
                reason: "must not be empty".to_string(),
            });
        }
        if self.auth.jwt.as_deref().is_some_and(|jwt| jwt.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "auth.jwt",
                reason: "must not be empty when present".to_string(),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_ms",
                reason: "must be > 0".to_string(),
            });
        }
        Ok(())
    }
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var("QUESTBOARD_CONFIG").ok().map(PathBuf::from)
}

fn config_path_from_args() -> Option<PathBuf> {
    arg_value("--config").map(PathBuf::from)
}

/// Value following `flag` on the command line, if any.
pub fn arg_value(flag: &str) -> Option<String> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == flag {
            return args.next();
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const VALID: &str = r#"
api_base_url = "https://example.supabase.co"
request_timeout_ms = 5000

[auth]
api_key = "anon-key"

[log]
json = false
"#;

    fn base_config() -> ClientConfig {
        ClientConfig::from_toml(VALID).unwrap()
    }

    #[test]
    fn test_valid_config_parses() {
        let config = base_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.auth.api_key, "anon-key");
        assert!(config.auth.jwt.is_none());
        assert!(!config.log.json);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let contents = VALID.replace("request_timeout_ms = 5000", "request_timeout_ms = 5000\nbogus = 1");
        assert!(matches!(
            ClientConfig::from_toml(&contents),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_error_keeps_toml_source() {
        let err = ClientConfig::from_toml("api_base_url = ").unwrap_err();
        let source = std::error::Error::source(&err).expect("toml error kept as source");
        assert!(source.downcast_ref::<toml::de::Error>().is_some());
    }

    #[test]
    fn test_config_requires_http_url() {
        let mut config = base_config();
        config.api_base_url = "ftp://example".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "api_base_url", .. })
        ));
    }

    #[test]
    fn test_config_requires_api_key() {
        let mut config = base_config();
        config.auth.api_key = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_rejects_blank_jwt() {
        let mut config = base_config();
        config.auth.jwt = Some(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_requires_timeout() {
        let mut config = base_config();
        config.request_timeout_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "request_timeout_ms", .. })
        ));
    }

    #[test]
    fn test_from_path_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(VALID.as_bytes()).unwrap();
        let config = ClientConfig::from_path(file.path()).unwrap();
        assert_eq!(config.request_timeout_ms, 5000);
    }

    #[test]
    fn test_from_path_missing_file() {
        let result = ClientConfig::from_path(Path::new("/nonexistent/questboard.toml"));
        let err = result.unwrap_err();
        assert!(err.to_string().contains("/nonexistent/questboard.toml"));
        let source = std::error::Error::source(&err).expect("io error kept as source");
        let io = source
            .downcast_ref::<std::io::Error>()
            .expect("source is the io error");
        assert_eq!(io.kind(), std::io::ErrorKind::NotFound);
    }
}
