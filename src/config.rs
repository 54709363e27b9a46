use accounts::{JwtAuth, JwtPolicy};
use anyhow::Result;
use moka::future::Cache;
use sea_orm::{Database, DatabaseConnection};
use serde::{Deserialize, Serialize};
use std::{fmt, path::{Path, PathBuf}, sync::Arc, time::Duration};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::schemas::AppState;

/// Prefix of environment variables overriding settings, e.g. `LAPIS__JWT__SECRET`.
pub const ENV_PREFIX: &str = "LAPIS";
/// Settings file looked up in the working directory.
pub const DEFAULT_SETTINGS_FILE: &str = "settings";
/// Secret used when `debug` is on and no secret is configured.
const DEVELOPMENT_SECRET: &str = "lapis-development-secret";
const REDACTED: &str = "********";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("jwt.secret must be set unless debug is enabled")]
    MissingSecret,

    #[error("media_url must start and end with '/': {0}")]
    InvalidMediaUrl(String),

    #[error("request_timeout_secs must be positive")]
    InvalidTimeout,
}

/// Runtime settings of the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub database_url: String,
    pub bind_address: String,
    /// Enables the debug endpoint and the development JWT secret.
    pub debug: bool,
    /// Mounts the staff API under `/admin/`.
    pub use_staff: bool,
    /// Mounts the public API and the authentication endpoints.
    pub use_api: bool,
    pub media_url: String,
    pub media_root: PathBuf,
    pub request_timeout_secs: u64,
    pub jwt: JwtSettings,
    pub user_cache: CacheSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "sqlite://lapis.db?mode=rwc".to_string(),
            bind_address: "0.0.0.0:3000".to_string(),
            debug: false,
            use_staff: true,
            use_api: true,
            media_url: "/media/".to_string(),
            media_root: PathBuf::from("media"),
            request_timeout_secs: 30,
            jwt: JwtSettings::default(),
            user_cache: CacheSettings::default(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct JwtSettings {
    pub secret: String,
    pub expiration_secs: i64,
    pub refresh_expiration_secs: i64,
    pub allow_refresh: bool,
    /// Scheme expected in the `Authorization` header; `Bearer` is always accepted too.
    pub auth_header_prefix: String,
}

impl Default for JwtSettings {
    fn default() -> Self {
        Self {
            secret: String::new(),
            expiration_secs: accounts::jwt::DEFAULT_EXPIRATION_SECS,
            refresh_expiration_secs: accounts::jwt::DEFAULT_REFRESH_EXPIRATION_SECS,
            allow_refresh: true,
            auth_header_prefix: "JWT".to_string(),
        }
    }
}

impl fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &REDACTED)
            .field("expiration_secs", &self.expiration_secs)
            .field("refresh_expiration_secs", &self.refresh_expiration_secs)
            .field("allow_refresh", &self.allow_refresh)
            .field("auth_header_prefix", &self.auth_header_prefix)
            .finish()
    }
}

impl JwtSettings {
    pub fn policy(&self) -> JwtPolicy {
        JwtPolicy {
            expiration: chrono::Duration::seconds(self.expiration_secs),
            refresh_expiration: chrono::Duration::seconds(self.refresh_expiration_secs),
            allow_refresh: self.allow_refresh,
        }
    }
}

/// Bounds of the authenticated-user cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheSettings {
    pub max_capacity: u64,
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_capacity: 1000,
            ttl_secs: 300, // 5 minutes
        }
    }
}

impl Settings {
    /// Loads and validates settings; see [`Settings::load_unchecked`].
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        Self::load_unchecked(path)?.validate()
    }

    /// Loads settings from `settings.yaml` (optional), then `path` (required
    /// when given), then `LAPIS__*` environment variables.
    ///
    /// Commands that never issue tokens use this directly so they run without
    /// a JWT secret.
    pub fn load_unchecked(path: Option<&Path>) -> Result<Self, SettingsError> {
        use config::{Config, Environment, File, FileFormat};

        let mut builder = Config::builder()
            .add_source(File::new(DEFAULT_SETTINGS_FILE, FileFormat::Yaml).required(false));

        if let Some(path) = path {
            debug!("Loading settings from {}", path.display());
            builder = builder.add_source(File::from(path).format(FileFormat::Yaml).required(true));
        }

        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }

    /// Parses settings from a YAML document; missing keys take their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, SettingsError> {
        use config::{Config, File, FileFormat};

        let settings: Settings = Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?
            .try_deserialize()?;

        settings.validate()
    }

    /// Checks the settings and fills the development secret in debug mode.
    pub fn validate(mut self) -> Result<Self, SettingsError> {
        if self.jwt.secret.is_empty() {
            if !self.debug {
                return Err(SettingsError::MissingSecret);
            }
            warn!("jwt.secret is not set, using the development secret");
            self.jwt.secret = DEVELOPMENT_SECRET.to_string();
        }
        if !self.media_url.starts_with('/') || !self.media_url.ends_with('/') {
            return Err(SettingsError::InvalidMediaUrl(self.media_url));
        }
        if self.request_timeout_secs == 0 {
            return Err(SettingsError::InvalidTimeout);
        }
        Ok(self)
    }

    /// Copy safe to print or expose.
    pub fn redacted(&self) -> Self {
        let mut settings = self.clone();
        if !settings.jwt.secret.is_empty() {
            settings.jwt.secret = REDACTED.to_string();
        }
        settings
    }
}

/// Builds the shared state around an open database connection.
pub fn build_app_state(db: DatabaseConnection, settings: Settings) -> AppState {
    let user_cache = Cache::builder()
        .max_capacity(settings.user_cache.max_capacity)
        .time_to_live(Duration::from_secs(settings.user_cache.ttl_secs))
        .build();
    let jwt = JwtAuth::new(settings.jwt.secret.as_bytes(), settings.jwt.policy());

    AppState {
        db,
        user_cache,
        jwt: Arc::new(jwt),
        settings: Arc::new(settings),
    }
}

/// Connects to the configured database and builds the application state.
pub async fn initialize_app_state(settings: &Settings) -> Result<AppState> {
    info!("Connecting to database: {}", settings.database_url);
    let db = Database::connect(&settings.database_url).await?;
    Ok(build_app_state(db, settings.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_yaml_in_debug() {
        let settings = Settings::from_yaml("debug: true").unwrap();
        assert!(settings.use_api);
        assert!(settings.use_staff);
        assert_eq!(settings.media_url, "/media/");
        assert_eq!(settings.jwt.auth_header_prefix, "JWT");
        assert_eq!(settings.jwt.expiration_secs, 300);
        assert_eq!(settings.jwt.secret, DEVELOPMENT_SECRET);
    }

    #[test]
    fn test_missing_secret_rejected_outside_debug() {
        let result = Settings::from_yaml("use_api: true");
        assert!(matches!(result, Err(SettingsError::MissingSecret)));
    }

    #[test]
    fn test_nested_values() {
        let settings = Settings::from_yaml(
            r#"
use_staff: false
media_url: /uploads/
jwt:
  secret: s3cret
  allow_refresh: false
user_cache:
  max_capacity: 10
"#,
        )
        .unwrap();
        assert!(!settings.use_staff);
        assert_eq!(settings.media_url, "/uploads/");
        assert_eq!(settings.jwt.secret, "s3cret");
        assert!(!settings.jwt.policy().allow_refresh);
        assert_eq!(settings.user_cache.max_capacity, 10);
        assert_eq!(settings.user_cache.ttl_secs, 300);
    }

    #[test]
    fn test_invalid_media_url() {
        let result = Settings::from_yaml("debug: true\nmedia_url: media");
        assert!(matches!(result, Err(SettingsError::InvalidMediaUrl(_))));
    }

    #[test]
    fn test_redacted_hides_secret() {
        let settings = Settings::from_yaml("jwt:\n  secret: s3cret").unwrap();
        let redacted = settings.redacted();
        assert_eq!(redacted.jwt.secret, REDACTED);
        assert!(!format!("{:?}", settings).contains("s3cret"));
        assert!(!serde_yaml::to_string(&redacted).unwrap().contains("s3cret"));
    }
}
