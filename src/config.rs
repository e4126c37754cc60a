use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub discovery: DiscoverySettings,
    pub auth: AuthSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
    #[serde(default)]
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
    /// JSON seed for the memory backend
    pub seed_path: Option<String>,
    #[serde(default = "default_storage_timeout")]
    pub timeout_secs: u64,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            seed_path: None,
            timeout_secs: default_storage_timeout(),
        }
    }
}

fn default_backend() -> StorageBackend { StorageBackend::Postgres }
fn default_storage_timeout() -> u64 { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverySettings {
    #[serde(default = "default_radius_km")]
    pub default_radius_km: f64,
    #[serde(default = "default_earth_radius_km")]
    pub earth_radius_km: f64,
    #[serde(default = "default_page_limit")]
    pub default_page_limit: u32,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            default_radius_km: default_radius_km(),
            earth_radius_km: default_earth_radius_km(),
            default_page_limit: default_page_limit(),
        }
    }
}

fn default_radius_km() -> f64 { 7.0 }
fn default_earth_radius_km() -> f64 { 6371.0 }
fn default_page_limit() -> u32 { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    /// HS256 secret shared with the token issuer
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "full".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with HARBOR__)
    /// 5. DATABASE_URL and JWT_SECRET
    ///
    /// Discovery defaults are checked before returning.
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., HARBOR__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("HARBOR")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = apply_env_overrides(settings)?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values that would make every request fail
    pub fn validate(&self) -> Result<(), ConfigError> {
        let discovery = &self.discovery;
        if !(discovery.default_radius_km.is_finite() && discovery.default_radius_km > 0.0) {
            return Err(ConfigError::Message(format!(
                "discovery.default_radius_km must be a positive number, got {}",
                discovery.default_radius_km
            )));
        }
        if !(discovery.earth_radius_km.is_finite() && discovery.earth_radius_km > 0.0) {
            return Err(ConfigError::Message(format!(
                "discovery.earth_radius_km must be a positive number, got {}",
                discovery.earth_radius_km
            )));
        }
        if discovery.default_page_limit == 0 {
            return Err(ConfigError::Message(
                "discovery.default_page_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Apply the conventional unprefixed variables on top of the loaded config
fn apply_env_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(database_url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", database_url)?;
    }
    if let Ok(secret) = env::var("JWT_SECRET") {
        builder = builder.set_override("auth.jwt_secret", secret)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_default_discovery() {
        let discovery = DiscoverySettings::default();
        assert_eq!(discovery.default_radius_km, 7.0);
        assert_eq!(discovery.earth_radius_km, 6371.0);
        assert_eq!(discovery.default_page_limit, 10);
    }

    #[test]
    fn test_default_logging() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, "full");
    }

    fn from_toml(raw: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    const MINIMAL: &str = r#"
        [server]
        host = "127.0.0.1"
        port = 8080

        [auth]
        jwt_secret = "secret"
    "#;

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(from_toml(MINIMAL).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_discovery_defaults() {
        let cases = [
            ("default_radius_km = 0.0", "default_radius_km"),
            ("default_radius_km = -3.0", "default_radius_km"),
            ("earth_radius_km = 0.0", "earth_radius_km"),
            ("default_page_limit = 0", "default_page_limit"),
        ];

        for (line, field) in cases {
            let raw = format!("{}\n[discovery]\n{}\n", MINIMAL, line);
            let err = from_toml(&raw).validate().unwrap_err();
            assert!(err.to_string().contains(field), "{}: {}", line, err);
        }
    }

    #[test]
    fn test_env_overrides_reach_loaded_settings() {
        std::env::set_var("JWT_SECRET", "from-env");
        let config = Config::builder()
            .add_source(File::from_str(MINIMAL, FileFormat::Toml))
            .build()
            .unwrap();
        let settings: Settings = apply_env_overrides(config).unwrap().try_deserialize().unwrap();
        std::env::remove_var("JWT_SECRET");

        assert_eq!(settings.auth.jwt_secret, "from-env");
    }

    #[test]
    fn test_minimal_toml() {
        let raw = r#"
            [server]
            host = "127.0.0.1"
            port = 8080

            [storage]
            backend = "memory"
            seed_path = "config/seed.json"

            [auth]
            jwt_secret = "secret"
        "#;

        let settings: Settings = Config::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.storage.backend, StorageBackend::Memory);
        assert_eq!(settings.storage.timeout_secs, 10);
        assert_eq!(settings.discovery.default_radius_km, 7.0);
        assert!(!settings.database.run_migrations);
    }
}
