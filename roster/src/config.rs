//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `ROSTER_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`). A missing file is fine.
//! 2. **Environment variables** - Variables prefixed with `ROSTER_` override YAML values
//! 3. **DATABASE_URL** - Special case: overrides `database.url` if set
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `ROSTER_DATABASE__POOL__MAX_CONNECTIONS=4` sets `database.pool.max_connections`.
//!
//! ```bash
//! ROSTER_PORT=8080
//! DATABASE_URL="sqlite://roster.db?mode=rwc"
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::Error;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "ROSTER_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// All fields have defaults, so an empty file (or no file at all) yields a runnable setup.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Store connection settings
    pub database: DatabaseConfig,
    /// Set from `DATABASE_URL`; folded into `database.url` on load
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    /// Statements slower than this are logged at `warn`
    pub slow_statement_threshold_ms: u64,
    /// Apply embedded migrations on startup
    pub run_migrations: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database: DatabaseConfig::default(),
            database_url: None,
            slow_statement_threshold_ms: 1000,
            run_migrations: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    pub url: String,
    pub pool: PoolSettings,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://roster.db?mode=rwc".to_string(),
            pool: PoolSettings::default(),
        }
    }
}

/// Connection pool configuration with the SQLx pool parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolSettings {
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of idle connections to maintain
    pub min_connections: u32,
    /// Maximum time to wait for a connection (seconds)
    pub acquire_timeout_secs: u64,
    /// Time before idle connections are closed (seconds, 0 = never)
    pub idle_timeout_secs: u64,
    /// Maximum lifetime of a connection (seconds, 0 = never)
    pub max_lifetime_secs: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 5,
            min_connections: 0,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,  // 10 minutes
            max_lifetime_secs: 1800, // 30 minutes
        }
    }
}

impl PoolSettings {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_secs > 0).then(|| Duration::from_secs(self.idle_timeout_secs))
    }

    pub fn max_lifetime(&self) -> Option<Duration> {
        (self.max_lifetime_secs > 0).then(|| Duration::from_secs(self.max_lifetime_secs))
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let mut config: Self = Self::figment(args).extract()?;

        if let Some(url) = config.database_url.take() {
            config.database.url = url;
        }

        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if self.database.url.trim().is_empty() {
            return Err(Error::Internal {
                operation: "Config validation: database.url cannot be empty. Set DATABASE_URL or database.url in the config file."
                    .to_string(),
            });
        }

        let pool = &self.database.pool;
        if pool.max_connections == 0 {
            return Err(Error::Internal {
                operation: "Config validation: database.pool.max_connections must be at least 1".to_string(),
            });
        }

        if pool.min_connections > pool.max_connections {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: database.pool.min_connections ({}) cannot be greater than max_connections ({})",
                    pool.min_connections, pool.max_connections
                ),
            });
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can still override specific values
            // ROSTER_CONFIG names the file itself and is not a config key
            .merge(Env::prefixed("ROSTER_").ignore(&["CONFIG"]).split("__"))
            .merge(Env::raw().only(&["DATABASE_URL"]))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn slow_statement_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_statement_threshold_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    fn args(path: &str) -> Args {
        Args {
            config: path.to_string(),
            validate: false,
        }
    }

    #[test]
    fn test_defaults_without_file() {
        Jail::expect_with(|_jail| {
            let config = Config::load(&args("missing.yaml"))?;

            assert_eq!(config.port, 3000);
            assert_eq!(config.database.url, "sqlite://roster.db?mode=rwc");
            assert_eq!(config.database.pool.max_connections, 5);
            assert!(config.run_migrations);

            Ok(())
        });
    }

    #[test]
    fn test_yaml_values() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
host: 127.0.0.1
port: 9000
database:
  url: "sqlite::memory:"
  pool:
    max_connections: 2
    idle_timeout_secs: 0
slow_statement_threshold_ms: 250
"#,
            )?;

            let config = Config::load(&args("test.yaml"))?;

            assert_eq!(config.bind_address(), "127.0.0.1:9000");
            assert_eq!(config.database.url, "sqlite::memory:");
            assert_eq!(config.database.pool.max_connections, 2);
            assert_eq!(config.database.pool.idle_timeout(), None);
            assert_eq!(config.database.pool.acquire_timeout(), Duration::from_secs(30)); // default
            assert_eq!(config.slow_statement_threshold(), Duration::from_millis(250));

            Ok(())
        });
    }

    #[test]
    fn test_shipped_config_file_loads() {
        Jail::expect_with(|_jail| {
            let config = Config::load(&args(concat!(env!("CARGO_MANIFEST_DIR"), "/config.yaml")))?;

            assert_eq!(config.database.url, "sqlite://roster.db?mode=rwc");
            assert_eq!(config.database.pool.idle_timeout(), Some(Duration::from_secs(600)));

            Ok(())
        });
    }

    #[test]
    fn test_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file("test.yaml", "port: 9000\n")?;

            jail.set_env("ROSTER_HOST", "127.0.0.1");
            jail.set_env("ROSTER_PORT", "8080");
            jail.set_env("ROSTER_DATABASE__POOL__MAX_CONNECTIONS", "7");

            let config = Config::load(&args("test.yaml"))?;

            assert_eq!(config.host, "127.0.0.1");
            assert_eq!(config.port, 8080);
            assert_eq!(config.database.pool.max_connections, 7);

            Ok(())
        });
    }

    #[test]
    fn test_config_path_env_is_not_a_key() {
        Jail::expect_with(|jail| {
            jail.create_file("test.yaml", "port: 9000\n")?;
            jail.set_env("ROSTER_CONFIG", "test.yaml");

            let config = Config::load(&args("test.yaml"))?;
            assert_eq!(config.port, 9000);

            Ok(())
        });
    }

    #[test]
    fn test_database_url_env_wins() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
database:
  url: sqlite://from-file.db
  pool:
    max_connections: 3
"#,
            )?;
            jail.set_env("DATABASE_URL", "sqlite://from-env.db");

            let config = Config::load(&args("test.yaml"))?;

            assert_eq!(config.database.url, "sqlite://from-env.db");
            assert_eq!(config.database_url, None);
            // pool settings survive the override
            assert_eq!(config.database.pool.max_connections, 3);

            Ok(())
        });
    }

    #[test]
    fn test_unknown_field_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("test.yaml", "prot: 9000\n")?;

            assert!(Config::load(&args("test.yaml")).is_err());

            Ok(())
        });
    }

    #[test]
    fn test_inconsistent_pool_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
database:
  pool:
    max_connections: 2
    min_connections: 4
"#,
            )?;

            let err = Config::load(&args("test.yaml")).unwrap_err();
            assert!(err.to_string().contains("min_connections"));

            Ok(())
        });
    }

    #[test]
    fn test_empty_url_rejected() {
        let mut config = Config::default();
        config.database.url = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
