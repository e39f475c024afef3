//! Application configuration
//!
//! Loaded from a TOML file (default `~/.config/mcare/config.toml`), then
//! selected environment variables override file values. Every section and
//! field has a default, so an empty or partial file is valid.

use std::path::{Path, PathBuf};

use chrono::{FixedOffset, NaiveTime};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::notifications::DeliveryMode;
use crate::domain::calendar::{parse_hour_minute, parse_utc_offset};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSettings,
    pub security: SecurityConfig,
    pub admin: AdminConfig,
    pub logging: LoggingConfig,
    pub mail: MailConfig,
    pub reminder: ReminderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub api_host: String,
    pub api_port: u16,
    /// Seconds to wait for in-flight requests on shutdown
    pub shutdown_timeout: u64,
    /// Externally reachable base URL, embedded in attendance QR codes
    pub public_base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_host: "0.0.0.0".into(),
            api_port: 3001,
            shutdown_timeout: 30,
            public_base_url: "http://localhost:3001".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "sqlite://./mcare.db?mode=rwc".into(),
        }
    }
}

impl DatabaseSettings {
    pub fn connection_url(&self) -> &str {
        &self.url
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Empty means a random secret per process start
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub bcrypt_cost: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_expiration_hours: 24,
            bcrypt_cost: 10,
        }
    }
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"***")
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

impl SecurityConfig {
    /// The configured secret, or a fresh random one. Tokens signed with a
    /// random secret do not survive a restart.
    pub fn jwt_secret_or_random(&self) -> String {
        if !self.jwt_secret.is_empty() {
            return self.jwt_secret.clone();
        }
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(48)
            .map(char::from)
            .collect()
    }
}

/// Administrator seeded into an empty database.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub school_id: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            school_id: "ADMIN-0001".into(),
            username: "admin".into(),
            email: "admin@mcare.local".into(),
            password: "Admin#12345".into(),
        }
    }
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("school_id", &self.school_id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// When false, messages are only logged
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from_name: String,
    pub from_address: String,
    pub delivery: DeliveryMode,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: String::new(),
            smtp_port: 587,
            username: String::new(),
            password: String::new(),
            from_name: "MCare".into(),
            from_address: "noreply@mcare.local".into(),
            delivery: DeliveryMode::PerMember,
        }
    }
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("enabled", &self.enabled)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("username", &self.username)
            .field("password", &"***")
            .field("from_name", &self.from_name)
            .field("from_address", &self.from_address)
            .field("delivery", &self.delivery)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    pub enabled: bool,
    /// Local wall-clock time, `HH:MM`
    pub time: String,
    /// Fixed offset such as `+08:00` defining "local"; process time zone when unset
    pub utc_offset: Option<String>,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            time: "18:00".into(),
            utc_offset: None,
        }
    }
}

impl ReminderConfig {
    pub fn trigger_time(&self) -> Result<NaiveTime, ConfigError> {
        parse_hour_minute(&self.time).ok_or_else(|| {
            ConfigError::Invalid(format!("reminder.time must be HH:MM, got '{}'", self.time))
        })
    }

    pub fn offset(&self) -> Result<Option<FixedOffset>, ConfigError> {
        match self.utc_offset.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(None),
            Some(raw) => parse_utc_offset(raw).map(Some).ok_or_else(|| {
                ConfigError::Invalid(format!("reminder.utc_offset must look like +08:00, got '{}'", raw))
            }),
        }
    }
}

impl AppConfig {
    /// Read and parse a TOML file. Environment overrides are not applied.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw)
    }

    /// Like [`AppConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply `DATABASE_URL`, `JWT_SECRET`, `REMINDER_TIME`,
    /// `SMTP_USERNAME` and `SMTP_PASSWORD` when set.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(secret) = get("JWT_SECRET") {
            self.security.jwt_secret = secret;
        }
        if let Some(time) = get("REMINDER_TIME") {
            self.reminder.time = time;
        }
        if let Some(user) = get("SMTP_USERNAME") {
            self.mail.username = user;
        }
        if let Some(password) = get("SMTP_PASSWORD") {
            self.mail.password = password;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.api_port == 0 {
            return Err(ConfigError::Invalid("server.api_port must not be 0".into()));
        }
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Invalid("database.url is required".into()));
        }
        if self.security.jwt_expiration_hours <= 0 {
            return Err(ConfigError::Invalid(
                "security.jwt_expiration_hours must be positive".into(),
            ));
        }
        if !(4..=31).contains(&self.security.bcrypt_cost) {
            return Err(ConfigError::Invalid(
                "security.bcrypt_cost must be between 4 and 31".into(),
            ));
        }
        if self.mail.enabled && self.mail.smtp_host.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "mail.smtp_host is required when mail is enabled".into(),
            ));
        }
        self.reminder.trigger_time()?;
        self.reminder.offset()?;
        Ok(())
    }
}

/// `~/.config/mcare/config.toml`, or `./config.toml` without a config dir.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .map(|dir| dir.join("mcare").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.server.api_port, 3001);
        assert_eq!(config.reminder.time, "18:00");
        assert_eq!(config.mail.delivery, DeliveryMode::PerMember);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [server]
            api_port = 8080

            [mail]
            delivery = "batch"

            [reminder]
            time = "07:30"
            utc_offset = "+08:00"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.api_port, 8080);
        assert_eq!(config.server.api_host, "0.0.0.0");
        assert_eq!(config.mail.delivery, DeliveryMode::Batch);
        assert_eq!(
            config.reminder.trigger_time().unwrap(),
            NaiveTime::from_hms_opt(7, 30, 0).unwrap()
        );
        assert_eq!(
            config.reminder.offset().unwrap().map(|o| o.local_minus_utc()),
            Some(8 * 3600)
        );
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("mcare-no-such-dir/config.toml");
        let config = AppConfig::load_or_default(&path).unwrap();
        assert_eq!(config.admin.username, "admin");
        assert!(matches!(AppConfig::load(&path), Err(ConfigError::Read { .. })));
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut config = AppConfig::default();
        config.apply_overrides(|key| match key {
            "DATABASE_URL" => Some("sqlite::memory:".into()),
            "REMINDER_TIME" => Some("06:15".into()),
            "SMTP_PASSWORD" => Some("  ".into()),
            _ => None,
        });

        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.reminder.time, "06:15");
        assert!(config.mail.password.is_empty());
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.reminder.time = "6pm".into();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = AppConfig::default();
        config.mail.enabled = true;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.security.bcrypt_cost = 2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn random_secret_is_generated_when_unset() {
        let security = SecurityConfig::default();
        let a = security.jwt_secret_or_random();
        let b = security.jwt_secret_or_random();
        assert_eq!(a.len(), 48);
        assert_ne!(a, b);
    }

    #[test]
    fn secrets_are_hidden_from_debug_output() {
        let mut config = AppConfig::default();
        config.mail.password = "hunter2".into();
        config.security.jwt_secret = "topsecret".into();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("topsecret"));
        assert!(!debug.contains("Admin#12345"));
    }
}
