//! Configuration loading for the Servyre IT service.
//!
//! Loads layered `.env` files and environment variables prefixed with
//! `SERVYRE_`, producing a typed [`AppConfig`].

use std::{collections::BTreeMap, env, net::SocketAddr, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const ENV_PREFIX: &str = "SERVYRE_";

/// Minimum session secret length (bytes) outside local/test profiles.
pub const MIN_SESSION_SECRET_LEN: usize = 32;

/// Application configuration derived from `SERVYRE_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AppConfig {
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default = "default_api_bind_addr")]
    pub api_bind_addr: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
    #[serde(default = "default_db_acquire_timeout_ms")]
    pub db_acquire_timeout_ms: u64,
    /// HMAC key for session tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_secret: Option<String>,
    /// Directory where comment attachments are written
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: PathBuf,
    #[serde(default = "default_max_attachment_bytes")]
    pub max_attachment_bytes: usize,
    /// Requester emails must contain `@{domain}.`
    #[serde(default = "default_requester_email_domain")]
    pub requester_email_domain: String,
    #[serde(default)]
    pub dev_login_enabled: bool,
    #[serde(default = "default_true")]
    pub run_migrations: bool,
    #[serde(default = "default_true")]
    pub seed_defaults: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            api_bind_addr: default_api_bind_addr(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            database_url: default_database_url(),
            db_max_connections: default_db_max_connections(),
            db_acquire_timeout_ms: default_db_acquire_timeout_ms(),
            session_secret: None,
            uploads_dir: default_uploads_dir(),
            max_attachment_bytes: default_max_attachment_bytes(),
            requester_email_domain: default_requester_email_domain(),
            dev_login_enabled: true,
            run_migrations: true,
            seed_defaults: true,
        }
    }
}

impl AppConfig {
    /// Returns the configured bind address as a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.api_bind_addr.parse()
    }

    /// Local and test profiles relax secret requirements and allow dev login.
    pub fn is_development(&self) -> bool {
        matches!(self.profile.as_str(), "local" | "test")
    }

    /// Key used to sign session tokens.
    ///
    /// Development profiles fall back to a fixed key when none is configured;
    /// [`AppConfig::validate`] rejects a missing secret everywhere else.
    pub fn session_key(&self) -> &[u8] {
        match self.session_secret.as_deref() {
            Some(secret) => secret.as_bytes(),
            None => b"servyre-local-development-session-key",
        }
    }

    /// Returns a redacted JSON representation (secrets are redacted).
    pub fn redacted_json(&self) -> serde_json::Result<String> {
        let mut config = self.clone();
        if config.session_secret.is_some() {
            config.session_secret = Some("[REDACTED]".to_string());
        }
        if let Some(redacted) = redact_url_password(&config.database_url) {
            config.database_url = redacted;
        }
        serde_json::to_string_pretty(&config)
    }

    /// Validates the configuration, returning an error if required settings are missing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.is_development() {
            match self.session_secret.as_deref() {
                None => return Err(ConfigError::MissingSessionSecret),
                Some(secret) if secret.len() < MIN_SESSION_SECRET_LEN => {
                    return Err(ConfigError::SessionSecretTooShort {
                        length: secret.len(),
                    });
                }
                Some(_) => {}
            }

            if self.dev_login_enabled {
                return Err(ConfigError::DevLoginOutsideDevelopment {
                    profile: self.profile.clone(),
                });
            }
        }

        if self.max_attachment_bytes == 0 {
            return Err(ConfigError::InvalidMaxAttachmentBytes);
        }

        if self.requester_email_domain.trim().is_empty()
            || !self
                .requester_email_domain
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(ConfigError::InvalidRequesterEmailDomain {
                value: self.requester_email_domain.clone(),
            });
        }

        if !matches!(self.log_format.as_str(), "json" | "pretty") {
            return Err(ConfigError::InvalidLogFormat {
                value: self.log_format.clone(),
            });
        }

        Ok(())
    }
}

fn redact_url_password(url: &str) -> Option<String> {
    let (scheme, rest) = url.split_once("://")?;
    let (credentials, host) = rest.split_once('@')?;
    let (user, _password) = credentials.split_once(':')?;
    Some(format!("{scheme}://{user}:[REDACTED]@{host}"))
}

fn default_profile() -> String {
    "local".to_string()
}

fn default_api_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_database_url() -> String {
    "sqlite://servyre.db?mode=rwc".to_string()
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_db_acquire_timeout_ms() -> u64 {
    5000
}

fn default_uploads_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_max_attachment_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_requester_email_domain() -> String {
    "servyre".to_string()
}

fn default_true() -> bool {
    true
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load environment file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        source: dotenvy::Error,
    },
    #[error("invalid api bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },
    #[error("session secret is missing; set SERVYRE_SESSION_SECRET")]
    MissingSessionSecret,
    #[error(
        "session secret must be at least {} bytes, got {length} bytes",
        MIN_SESSION_SECRET_LEN
    )]
    SessionSecretTooShort { length: usize },
    #[error("dev login cannot be enabled for profile '{profile}'")]
    DevLoginOutsideDevelopment { profile: String },
    #[error("max attachment size must be positive")]
    InvalidMaxAttachmentBytes,
    #[error("requester email domain '{value}' must be a single DNS label")]
    InvalidRequesterEmailDomain { value: String },
    #[error("log format must be 'json' or 'pretty', got '{value}'")]
    InvalidLogFormat { value: String },
}

/// Loads configuration using layered `.env` files and `SERVYRE_*` env vars.
pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    /// Creates a new loader rooted at the current working directory.
    pub fn new() -> Self {
        Self {
            base_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Creates a loader rooted at the provided directory (useful for tests).
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Loads `.env`, `.env.local`, `.env.{profile}`, `.env.{profile}.local`
    /// and finally the process environment, later layers winning.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let (mut layered, profile_hint) = self.collect_layered_env()?;

        // Overlay process environment last so it wins.
        for (key, value) in env::vars() {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                layered.insert(stripped.to_string(), value);
            }
        }

        let profile = take_string(&mut layered, "PROFILE").unwrap_or(profile_hint);
        let development = matches!(profile.as_str(), "local" | "test");

        let config = AppConfig {
            api_bind_addr: take_string(&mut layered, "API_BIND_ADDR")
                .unwrap_or_else(default_api_bind_addr),
            log_level: take_string(&mut layered, "LOG_LEVEL").unwrap_or_else(default_log_level),
            log_format: take_string(&mut layered, "LOG_FORMAT")
                .unwrap_or_else(default_log_format),
            database_url: take_string(&mut layered, "DATABASE_URL")
                .unwrap_or_else(default_database_url),
            db_max_connections: take_parsed(&mut layered, "DB_MAX_CONNECTIONS")?
                .unwrap_or_else(default_db_max_connections),
            db_acquire_timeout_ms: take_parsed(&mut layered, "DB_ACQUIRE_TIMEOUT_MS")?
                .unwrap_or_else(default_db_acquire_timeout_ms),
            session_secret: take_string(&mut layered, "SESSION_SECRET"),
            uploads_dir: take_string(&mut layered, "UPLOADS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(default_uploads_dir),
            max_attachment_bytes: take_parsed(&mut layered, "MAX_ATTACHMENT_BYTES")?
                .unwrap_or_else(default_max_attachment_bytes),
            requester_email_domain: take_string(&mut layered, "REQUESTER_EMAIL_DOMAIN")
                .unwrap_or_else(default_requester_email_domain),
            dev_login_enabled: take_bool(&mut layered, "DEV_LOGIN_ENABLED")?
                .unwrap_or(development),
            run_migrations: take_bool(&mut layered, "RUN_MIGRATIONS")?.unwrap_or(true),
            seed_defaults: take_bool(&mut layered, "SEED_DEFAULTS")?.unwrap_or(true),
            profile,
        };

        config.validate()?;

        match config.bind_addr() {
            Ok(_) => Ok(config),
            Err(source) => Err(ConfigError::InvalidBindAddr {
                value: config.api_bind_addr.clone(),
                source,
            }),
        }
    }

    fn collect_layered_env(&self) -> Result<(BTreeMap<String, String>, String), ConfigError> {
        let mut values = BTreeMap::new();

        self.merge_dotenv(self.base_dir.join(".env"), &mut values)?;
        self.merge_dotenv(self.base_dir.join(".env.local"), &mut values)?;

        let profile = env::var(format!("{ENV_PREFIX}PROFILE"))
            .ok()
            .or_else(|| values.get("PROFILE").cloned())
            .unwrap_or_else(default_profile);

        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}", &profile)),
            &mut values,
        )?;
        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}.local", &profile)),
            &mut values,
        )?;

        Ok((values, profile))
    }

    fn merge_dotenv(
        &self,
        path: PathBuf,
        values: &mut BTreeMap<String, String>,
    ) -> Result<(), ConfigError> {
        match dotenvy::from_path_iter(&path) {
            Ok(iter) => {
                for item in iter {
                    let (key, value) = item.map_err(|source| ConfigError::EnvFile {
                        path: path.clone(),
                        source,
                    })?;
                    if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                        values.insert(stripped.to_string(), value);
                    }
                }
                Ok(())
            }
            Err(dotenvy::Error::Io(ref io_err))
                if io_err.kind() == std::io::ErrorKind::NotFound =>
            {
                Ok(())
            }
            Err(err) => Err(ConfigError::EnvFile { path, source: err }),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn take_string(values: &mut BTreeMap<String, String>, key: &str) -> Option<String> {
    values
        .remove(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn take_parsed<T: std::str::FromStr>(
    values: &mut BTreeMap<String, String>,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    match take_string(values, key) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: format!("{ENV_PREFIX}{key}"),
                value: raw,
            }),
    }
}

fn take_bool(values: &mut BTreeMap<String, String>, key: &str) -> Result<Option<bool>, ConfigError> {
    match take_string(values, key) {
        None => Ok(None),
        Some(raw) => match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidValue {
                key: format!("{ENV_PREFIX}{key}"),
                value: raw,
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn production() -> AppConfig {
        AppConfig {
            profile: "prod".to_string(),
            session_secret: Some("x".repeat(MIN_SESSION_SECRET_LEN)),
            dev_login_enabled: false,
            ..Default::default()
        }
    }

    #[test]
    fn defaults_are_valid_for_local_profile() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.is_development());
        assert_eq!(config.bind_addr().unwrap().port(), 8080);
    }

    #[test]
    fn production_requires_session_secret() {
        let config = AppConfig {
            session_secret: None,
            ..production()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingSessionSecret)
        ));

        let config = AppConfig {
            session_secret: Some("short".to_string()),
            ..production()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SessionSecretTooShort { length: 5 })
        ));

        assert!(production().validate().is_ok());
    }

    #[test]
    fn production_rejects_dev_login() {
        let config = AppConfig {
            dev_login_enabled: true,
            ..production()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DevLoginOutsideDevelopment { .. })
        ));
    }

    #[test]
    fn rejects_bad_email_domain_and_log_format() {
        let config = AppConfig {
            requester_email_domain: "servyre.com".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AppConfig {
            log_format: "xml".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn redacted_json_hides_secrets() {
        let config = AppConfig {
            session_secret: Some("super-secret-value".to_string()),
            database_url: "postgres://servyre:hunter2@db:5432/servyre".to_string(),
            ..Default::default()
        };

        let json = config.redacted_json().unwrap();
        assert!(!json.contains("super-secret-value"));
        assert!(!json.contains("hunter2"));
        assert!(json.contains("[REDACTED]"));
    }

    #[test]
    fn bool_and_number_parsing() {
        let mut values = BTreeMap::new();
        values.insert("A".to_string(), "Yes".to_string());
        values.insert("B".to_string(), "maybe".to_string());
        values.insert("C".to_string(), " 42 ".to_string());

        assert_eq!(take_bool(&mut values, "A").unwrap(), Some(true));
        assert!(take_bool(&mut values, "B").is_err());
        assert_eq!(take_parsed::<u32>(&mut values, "C").unwrap(), Some(42));
        assert_eq!(take_parsed::<u32>(&mut values, "missing").unwrap(), None);
    }
}
