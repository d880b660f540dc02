/// Redis pub/sub notifier
///
/// Publishes each event with `PUBLISH <topic> <payload>` over a
/// `ConnectionManager`, which reconnects on its own after a dropped
/// connection. Every command is bounded by the configured timeout so a
/// stalled broker cannot hold a request open.
///
/// # Example
///
/// ```no_run
/// use tasklist_shared::notify::{RedisConfig, RedisNotifier};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let notifier = RedisNotifier::connect(RedisConfig::from_env()).await?;
/// assert!(notifier.ping().await?);
/// # Ok(())
/// # }
/// ```

use std::env;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use redis::aio::ConnectionManager;
use redis::{Client, RedisError};
use serde::{Deserialize, Serialize};

use super::{Notifier, NotifyError};

impl From<RedisError> for NotifyError {
    fn from(err: RedisError) -> Self {
        match err.kind() {
            redis::ErrorKind::IoError => NotifyError::ConnectionError(format!("IO error: {}", err)),
            _ => NotifyError::PublishError(err.to_string()),
        }
    }
}

/// Redis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL
    ///
    /// Format: redis://[username:password@]host:port[/db]
    pub url: String,

    /// Connection timeout in seconds
    pub connection_timeout_secs: u64,

    /// Command timeout in seconds
    pub command_timeout_secs: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            connection_timeout_secs: 5,
            command_timeout_secs: 5,
        }
    }
}

impl RedisConfig {
    /// Reads the configuration from the environment
    ///
    /// # Environment Variables
    ///
    /// - `REDIS_URL`: connection URL (default: redis://127.0.0.1:6379)
    /// - `REDIS_CONNECTION_TIMEOUT_SECS`: connect timeout (default: 5)
    /// - `REDIS_COMMAND_TIMEOUT_SECS`: per-command timeout (default: 5)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            url: env::var("REDIS_URL").unwrap_or(defaults.url),
            connection_timeout_secs: env::var("REDIS_CONNECTION_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.connection_timeout_secs),
            command_timeout_secs: env::var("REDIS_COMMAND_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.command_timeout_secs),
        }
    }
}

/// Notifier backed by Redis pub/sub
#[derive(Clone)]
pub struct RedisNotifier {
    manager: ConnectionManager,
    config: Arc<RedisConfig>,
}

impl RedisNotifier {
    /// Connects to Redis
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the connection cannot be
    /// established within `connection_timeout_secs`.
    pub async fn connect(config: RedisConfig) -> Result<Self, NotifyError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| NotifyError::ConfigError(format!("Invalid Redis URL: {}", e)))?;

        let manager = tokio::time::timeout(
            Duration::from_secs(config.connection_timeout_secs),
            ConnectionManager::new(client),
        )
        .await
        .map_err(|_| NotifyError::ConnectionError("Timed out connecting to Redis".to_string()))?
        .map_err(|e| NotifyError::ConnectionError(format!("Failed to connect to Redis: {}", e)))?;

        tracing::info!("Redis notifier connected to {}", sanitize_url(&config.url));

        Ok(Self {
            manager,
            config: Arc::new(config),
        })
    }

    /// Sends PING and reports whether PONG came back
    pub async fn ping(&self) -> Result<bool, NotifyError> {
        let mut conn = self.manager.clone();

        let result: Result<String, RedisError> = tokio::time::timeout(
            self.command_timeout(),
            redis::cmd("PING").query_async(&mut conn),
        )
        .await
        .map_err(|_| NotifyError::ConnectionError("PING command timed out".to_string()))?;

        match result {
            Ok(pong) if pong == "PONG" => Ok(true),
            Ok(other) => {
                tracing::warn!("Redis health check: unexpected response: {}", other);
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Gets the Redis configuration
    pub fn config(&self) -> &RedisConfig {
        &self.config
    }

    fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.config.command_timeout_secs)
    }
}

#[async_trait]
impl Notifier for RedisNotifier {
    async fn publish(&self, topic: &str, message: Bytes) -> Result<(), NotifyError> {
        let mut conn = self.manager.clone();

        let receivers: i64 = tokio::time::timeout(
            self.command_timeout(),
            redis::cmd("PUBLISH")
                .arg(topic)
                .arg(message.as_ref())
                .query_async(&mut conn),
        )
        .await
        .map_err(|_| NotifyError::PublishError(format!("PUBLISH to {} timed out", topic)))??;

        tracing::trace!(topic, receivers, "PUBLISH acknowledged");
        Ok(())
    }
}

/// Replaces credentials in a Redis URL with `***:***` for logging
fn sanitize_url(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(scheme_end) = url.find("://") {
            let scheme = &url[..scheme_end + 3];
            let host = &url[at_pos + 1..];
            return format!("{}***:***@{}", scheme, host);
        }
    }
    url.to_string()
}
