use rocket::figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub api: ApiConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: u64,
    pub busy_timeout: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub address: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub json_format: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    pub enable_swagger: bool,
}

/// Lifetime of login sessions. `remember_ttl_days` applies when the user ticks "remember me".
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionConfig {
    pub ttl_hours: i64,
    pub remember_ttl_days: i64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://pocket_ledger.db".to_string(),
            max_connections: 8,
            min_connections: 1,
            acquire_timeout: 5,
            busy_timeout: 5,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            address: "127.0.0.1".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { enable_swagger: true }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_hours: 24,
            remember_ttl_days: 30,
        }
    }
}

impl SessionConfig {
    pub fn lifetime(&self, remember: bool) -> chrono::Duration {
        if remember {
            chrono::Duration::days(self.remember_ttl_days)
        } else {
            chrono::Duration::hours(self.ttl_hours)
        }
    }
}

impl Config {
    /// Load configuration from multiple sources in priority order:
    /// 1. Built-in defaults
    /// 2. Ledger.toml (if present)
    /// 3. Environment variables prefixed with LEDGER_ (e.g. LEDGER_DATABASE_URL)
    /// 4. DATABASE_URL
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file("Ledger.toml"))
            .merge(Env::prefixed("LEDGER_").split("_"))
            .merge(Env::raw().only(&["DATABASE_URL"]).map(|_| "database.url".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocket::figment::Jail;

    #[test]
    fn defaults_point_at_local_sqlite_file() {
        let config = Config::default();
        assert!(config.database.url.starts_with("sqlite://"));
        assert_eq!(config.session.ttl_hours, 24);
        assert!(config.api.enable_swagger);
    }

    #[test]
    fn env_overrides_file_and_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "Ledger.toml",
                r#"
                [logging]
                level = "debug"
                json_format = true

                [server]
                port = 9000
                address = "0.0.0.0"
                "#,
            )?;
            jail.set_env("LEDGER_SERVER_PORT", "9100");
            jail.set_env("DATABASE_URL", "sqlite://other.db");

            let config = Config::load()?;
            assert_eq!(config.logging.level, "debug");
            assert!(config.logging.json_format);
            assert_eq!(config.server.port, 9100);
            assert_eq!(config.server.address, "0.0.0.0");
            assert_eq!(config.database.url, "sqlite://other.db");
            Ok(())
        });
    }

    #[test]
    fn remember_me_extends_session_lifetime() {
        let session = SessionConfig::default();
        assert!(session.lifetime(true) > session.lifetime(false));
        assert_eq!(session.lifetime(false), chrono::Duration::hours(24));
    }
}
