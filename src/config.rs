//! Application configuration
//!
//! Read from a TOML file, by default `~/.config/park-eazy/config.toml`.
//! Every section and field has a default, so a partial file (or none at
//! all) is valid.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::settings::CurrencySettings;
use crate::domain::user::{CurrentUser, UserRole};
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::shared::utils::{BulkReadPolicy, RetryConfig, StorePolicy};

/// Environment variable that overrides the config file location
pub const CONFIG_ENV_VAR: &str = "PARK_EAZY_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// `~/.config/park-eazy/config.toml`, or `./config.toml` when the platform
/// has no config directory.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .map(|dir| dir.join("park-eazy").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

/// `PARK_EAZY_CONFIG` if set, otherwise [`default_config_path`].
pub fn resolve_config_path() -> PathBuf {
    std::env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_config_path())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSection,
    pub security: SecurityConfig,
    pub logging: LoggingConfig,
    pub store: StoreConfig,
    pub currency: CurrencyConfig,
    pub admin: AdminConfig,
    pub reservations: ReservationsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Seconds to wait for in-flight requests on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    /// SeaORM connection URL, or `memory` for the in-process store
    pub url: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        let path = dirs_next::data_dir()
            .map(|dir| dir.join("park-eazy").join("park-eazy.db"))
            .unwrap_or_else(|| PathBuf::from("park-eazy.db"));
        Self {
            url: format!("sqlite://{}?mode=rwc", path.display()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// HS256 secret shared with the auth provider
    pub jwt_secret: String,
    pub jwt_issuer: String,
    /// Lifetime of development tokens minted by the CLI
    pub jwt_expiration_hours: i64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        let jwt = JwtConfig::default();
        Self {
            jwt_secret: jwt.secret,
            jwt_issuer: jwt.issuer,
            jwt_expiration_hours: jwt.expiration_hours,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` wins when set
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

/// Store timeouts and the bulk-read retry budget
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub write_timeout_secs: u64,
    /// Retries after the first bulk-read attempt
    pub bulk_read_retries: u32,
    pub bulk_read_initial_delay_ms: u64,
    pub bulk_read_max_delay_ms: u64,
    pub bulk_read_attempt_timeout_secs: u64,
    pub bulk_read_timeout_ceiling_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            write_timeout_secs: 10,
            bulk_read_retries: 2,
            bulk_read_initial_delay_ms: 1000,
            bulk_read_max_delay_ms: 2000,
            bulk_read_attempt_timeout_secs: 5,
            bulk_read_timeout_ceiling_secs: 15,
        }
    }
}

/// Currency used until a super-admin stores one
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyConfig {
    pub code: String,
    pub symbol: String,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            code: "BDT".to_string(),
            symbol: "৳".to_string(),
        }
    }
}

/// Identity used for development tokens (`park-eazy token`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            user_id: Uuid::from_u128(0x5a4b_0000_0000_4000_8000_0000_0000_0001),
            email: "admin@park-eazy.local".to_string(),
            name: "Park-Eazy Admin".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReservationsConfig {
    /// 0 disables the overdue sweeper
    pub sweep_interval_secs: u64,
}

impl Default for ReservationsConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: 60,
        }
    }
}

impl AppConfig {
    /// Load and validate. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let raw = toml::to_string_pretty(self)?;
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::write(path, raw).map_err(write_err)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Invalid("security.jwt_secret is empty".into()));
        }
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Invalid("database.url is empty".into()));
        }
        self.default_currency()?;
        Ok(())
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig {
            secret: self.security.jwt_secret.clone(),
            expiration_hours: self.security.jwt_expiration_hours,
            issuer: self.security.jwt_issuer.clone(),
        }
    }

    pub fn store_policy(&self) -> StorePolicy {
        let s = &self.store;
        StorePolicy {
            write_timeout: Duration::from_secs(s.write_timeout_secs),
            bulk: BulkReadPolicy {
                retry: RetryConfig {
                    max_attempts: s.bulk_read_retries + 1,
                    initial_delay: Duration::from_millis(s.bulk_read_initial_delay_ms),
                    backoff_multiplier: 2.0,
                    max_delay: Duration::from_millis(s.bulk_read_max_delay_ms),
                },
                attempt_timeout: Duration::from_secs(s.bulk_read_attempt_timeout_secs),
                timeout_ceiling: Duration::from_secs(s.bulk_read_timeout_ceiling_secs),
            },
        }
    }

    pub fn default_currency(&self) -> Result<CurrencySettings, ConfigError> {
        CurrencySettings::new(&self.currency.code, &self.currency.symbol, None)
            .map_err(|e| ConfigError::Invalid(format!("currency: {}", e)))
    }

    /// Session for the configured admin identity with the given role.
    pub fn admin_user(&self, role: UserRole) -> CurrentUser {
        CurrentUser {
            id: self.admin.user_id,
            email: self.admin.email.clone(),
            name: self.admin.name.clone(),
            role,
        }
    }
}
