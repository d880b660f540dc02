/// Outbound notifications
///
/// Every account and task operation describes itself as a
/// [`NotificationEvent`] and hands it to a [`Notifier`]. Delivery is
/// fire-and-forget: a successful publish says nothing about subscribers.
///
/// # Architecture
///
/// ```text
/// IdentityService ─┐
///                  ├─> EventPublisher ──(policy)──> dyn Notifier ──PUBLISH──> topic
/// TaskService ─────┘
/// ```
///
/// # Adapters
///
/// - [`redis`]: Redis pub/sub (`PUBLISH <topic> <json>`)
/// - [`memory`]: records messages in-process, optionally failing on demand
///
/// # Failure policy
///
/// [`NotifyPolicy::Strict`] turns a failed publish into an operation failure
/// even though the store write already committed. [`NotifyPolicy::BestEffort`]
/// logs the failure and lets the operation succeed.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, warn};

pub mod event;
pub mod memory;
pub mod redis;

pub use event::{NotificationEvent, Topic};
pub use memory::{PublishedMessage, RecordingNotifier};
pub use self::redis::{RedisConfig, RedisNotifier};

use crate::error::{ServiceError, ServiceResult};

/// Notifier errors
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Could not reach the broker
    #[error("Notifier connection error: {0}")]
    ConnectionError(String),

    /// Broker rejected or did not answer the publish
    #[error("Publish failed: {0}")]
    PublishError(String),

    /// Event could not be encoded
    #[error("Event encoding failed: {0}")]
    EncodeError(#[from] serde_json::Error),

    /// Invalid notifier configuration
    #[error("Notifier configuration error: {0}")]
    ConfigError(String),
}

/// Publish/subscribe sink
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Publishes `message` on `topic`
    async fn publish(&self, topic: &str, message: Bytes) -> Result<(), NotifyError>;
}

/// What a failed publish does to the surrounding operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NotifyPolicy {
    /// Report the operation as failed
    #[default]
    Strict,

    /// Log and carry on
    BestEffort,
}

impl FromStr for NotifyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(NotifyPolicy::Strict),
            "best_effort" | "best-effort" => Ok(NotifyPolicy::BestEffort),
            other => Err(format!("unknown notify policy: {}", other)),
        }
    }
}

/// Encodes events and applies the failure policy
#[derive(Clone)]
pub struct EventPublisher {
    notifier: Arc<dyn Notifier>,
    policy: NotifyPolicy,
}

impl EventPublisher {
    /// Creates a publisher over `notifier`
    pub fn new(notifier: Arc<dyn Notifier>, policy: NotifyPolicy) -> Self {
        Self { notifier, policy }
    }

    /// Active failure policy
    pub fn policy(&self) -> NotifyPolicy {
        self.policy
    }

    /// Publishes `event` on its topic
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Notify` under [`NotifyPolicy::Strict`] when
    /// encoding or publishing fails.
    pub async fn emit(&self, event: NotificationEvent) -> ServiceResult<()> {
        let topic = event.topic.as_str();

        let result = match event.to_bytes() {
            Ok(payload) => self.notifier.publish(topic, payload).await,
            Err(e) => Err(NotifyError::from(e)),
        };

        match (result, self.policy) {
            (Ok(()), _) => {
                debug!(topic, event_id = %event.event_id, "Published notification");
                Ok(())
            }
            (Err(e), NotifyPolicy::BestEffort) => {
                warn!(topic, error = %e, "Dropping notification after publish failure");
                Ok(())
            }
            (Err(e), NotifyPolicy::Strict) => Err(ServiceError::from(e)),
        }
    }
}
