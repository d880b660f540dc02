/// In-process notifier for tests and local runs
///
/// Records every published message in order. Can be switched into a failing
/// mode to exercise the notify failure policy.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use super::{NotificationEvent, Notifier, NotifyError};

/// A message as it was handed to the notifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub topic: String,
    pub payload: Bytes,
}

impl PublishedMessage {
    /// Decodes the payload back into an event
    pub fn decode(&self) -> Result<NotificationEvent, serde_json::Error> {
        NotificationEvent::from_slice(&self.payload)
    }
}

/// Notifier that keeps messages in memory
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<PublishedMessage>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent publishes fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All messages published so far
    pub fn published(&self) -> Vec<PublishedMessage> {
        self.lock().clone()
    }

    /// Topics published so far, in order
    pub fn topics(&self) -> Vec<String> {
        self.lock().iter().map(|m| m.topic.clone()).collect()
    }

    /// Forgets recorded messages
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<PublishedMessage>> {
        // A poisoned lock only means a test panicked mid-push.
        self.messages.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn publish(&self, topic: &str, message: Bytes) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::PublishError(format!("{} unavailable", topic)));
        }

        self.lock().push(PublishedMessage {
            topic: topic.to_string(),
            payload: message,
        });
        Ok(())
    }
}
