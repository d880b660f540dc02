/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8880)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: *)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `RUN_MIGRATIONS`: Apply embedded migrations on startup (default: true)
/// - `REDIS_URL`: Redis connection URL (default: redis://127.0.0.1:6379)
/// - `REDIS_CONNECTION_TIMEOUT_SECS` / `REDIS_COMMAND_TIMEOUT_SECS`: Redis deadlines (default: 5)
/// - `JWT_SECRET`: Secret key for token signing (required, at least 32 characters)
/// - `TOKEN_TTL_HOURS`: Session lifetime in hours (default: 12)
/// - `NOTIFY_POLICY`: `strict` or `best_effort` (default: strict)
/// - `LOG_FORMAT`: `pretty` or `json` (default: pretty)
/// - `RUST_LOG`: Log filter (default: tasklist_api=debug,tasklist_shared=debug,tower_http=debug)
///
/// # Example
///
/// ```no_run
/// use tasklist_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::env;
use std::str::FromStr;

use anyhow::Context;
use tasklist_shared::notify::{NotifyPolicy, RedisConfig};

/// Complete application configuration
#[derive(Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Notifier connection
    pub redis: RedisConfig,

    /// Token signing configuration
    pub jwt: JwtConfig,

    /// What a failed publish does to a request
    pub notify_policy: NotifyPolicy,

    /// Log output format
    pub log_format: LogFormat,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,

    /// Run migrations before serving
    pub run_migrations: bool,
}

/// Token signing configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for HS256 signing
    ///
    /// IMPORTANT: This must be kept secret and should be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Session lifetime in hours
    pub token_ttl_hours: i64,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable
    #[default]
    Pretty,

    /// One JSON object per line
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => anyhow::bail!("unknown log format: {}", other),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// A `.env` file in the working directory is read first if present.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing
    /// - Environment variables have invalid values
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let api_port = var_or("API_PORT", "8880")
            .parse::<u16>()
            .context("API_PORT must be a port number")?;

        let cors_origins = var_or("CORS_ORIGINS", "*")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = var_or("DATABASE_MAX_CONNECTIONS", "10")
            .parse::<u32>()
            .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?;

        let run_migrations = var_or("RUN_MIGRATIONS", "true")
            .parse::<bool>()
            .context("RUN_MIGRATIONS must be true or false")?;

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let token_ttl_hours = var_or("TOKEN_TTL_HOURS", "12")
            .parse::<i64>()
            .context("TOKEN_TTL_HOURS must be an integer")?;

        if token_ttl_hours <= 0 {
            anyhow::bail!("TOKEN_TTL_HOURS must be greater than zero");
        }

        let notify_policy = var_or("NOTIFY_POLICY", "strict")
            .parse::<NotifyPolicy>()
            .map_err(anyhow::Error::msg)?;

        let log_format = var_or("LOG_FORMAT", "pretty").parse::<LogFormat>()?;

        let defaults = RedisConfig::default();
        let redis = RedisConfig {
            url: var_or("REDIS_URL", &defaults.url),
            connection_timeout_secs: var_or(
                "REDIS_CONNECTION_TIMEOUT_SECS",
                &defaults.connection_timeout_secs.to_string(),
            )
            .parse::<u64>()
            .context("REDIS_CONNECTION_TIMEOUT_SECS must be a number of seconds")?,
            command_timeout_secs: var_or(
                "REDIS_COMMAND_TIMEOUT_SECS",
                &defaults.command_timeout_secs.to_string(),
            )
            .parse::<u64>()
            .context("REDIS_COMMAND_TIMEOUT_SECS must be a number of seconds")?,
        };

        Ok(Self {
            api: ApiConfig {
                host: var_or("API_HOST", "0.0.0.0"),
                port: api_port,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
                run_migrations,
            },
            redis,
            jwt: JwtConfig {
                secret: jwt_secret,
                token_ttl_hours,
            },
            notify_policy,
            log_format,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![
            ("DATABASE_URL", "postgresql://localhost/test"),
            ("JWT_SECRET", SECRET),
        ]
    }

    #[test]
    fn test_defaults() {
        let config = load(&required()).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8880");
        assert_eq!(config.api.cors_origins, vec!["*"]);
        assert_eq!(config.database.max_connections, 10);
        assert!(config.database.run_migrations);
        assert_eq!(config.redis.url, "redis://127.0.0.1:6379");
        assert_eq!(config.jwt.token_ttl_hours, 12);
        assert_eq!(config.notify_policy, NotifyPolicy::Strict);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_overrides() {
        let mut vars = required();
        vars.extend([
            ("API_HOST", "127.0.0.1"),
            ("API_PORT", "9000"),
            ("CORS_ORIGINS", "https://a.example, https://b.example"),
            ("NOTIFY_POLICY", "best_effort"),
            ("LOG_FORMAT", "json"),
            ("TOKEN_TTL_HOURS", "1"),
            ("RUN_MIGRATIONS", "false"),
            ("REDIS_URL", "redis://cache:6379/2"),
            ("REDIS_COMMAND_TIMEOUT_SECS", "2"),
        ]);
        let config = load(&vars).unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:9000");
        assert_eq!(config.api.cors_origins, vec!["https://a.example", "https://b.example"]);
        assert_eq!(config.notify_policy, NotifyPolicy::BestEffort);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.jwt.token_ttl_hours, 1);
        assert!(!config.database.run_migrations);
        assert_eq!(config.redis.url, "redis://cache:6379/2");
        assert_eq!(config.redis.command_timeout_secs, 2);
        assert_eq!(config.redis.connection_timeout_secs, 5);
    }

    #[test]
    fn test_missing_required() {
        assert!(load(&[("JWT_SECRET", SECRET)]).is_err());
        assert!(load(&[("DATABASE_URL", "postgresql://localhost/test")]).is_err());
    }

    #[test]
    fn test_invalid_values() {
        let with = |key: &'static str, value: &'static str| {
            let mut vars = required();
            vars.push((key, value));
            load(&vars)
        };

        assert!(with("JWT_SECRET", "short").is_err());
        assert!(with("TOKEN_TTL_HOURS", "0").is_err());
        assert!(with("API_PORT", "http").is_err());
        assert!(with("NOTIFY_POLICY", "maybe").is_err());
        assert!(with("LOG_FORMAT", "xml").is_err());
    }
}
