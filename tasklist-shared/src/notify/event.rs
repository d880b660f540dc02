/// Notification payloads
///
/// Each event is published as a JSON object on the topic named by
/// [`Topic::as_str`]:
///
/// ```json
/// {
///   "event_id": "6f1c...",
///   "topic": "create_item",
///   "account_id": 4,
///   "item_ids": [17],
///   "message": "created item 17",
///   "occurred_at": "2025-01-03T12:00:00Z"
/// }
/// ```

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Notification topics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    /// Account registered
    SignUp,

    /// Token issued
    SignIn,

    /// Task created
    CreateItem,

    /// Bulk create finished
    BulkCreateItem,

    /// Task list read
    GetAllItems,

    /// Single task read
    GetItemById,

    /// Task fields replaced
    UpdateItem,

    /// Done flag changed
    UpdateItemStatus,

    /// Task soft-deleted
    DeleteItem,
}

impl Topic {
    /// Topic name on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::SignUp => "sign_up",
            Topic::SignIn => "sign_in",
            Topic::CreateItem => "create_item",
            Topic::BulkCreateItem => "bulk_create_item",
            Topic::GetAllItems => "get_all_items",
            Topic::GetItemById => "get_item_by_id",
            Topic::UpdateItem => "update_item",
            Topic::UpdateItemStatus => "update_item_status",
            Topic::DeleteItem => "delete_item",
        }
    }
}

/// One notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Unique id, for de-duplication by subscribers
    pub event_id: Uuid,

    /// Topic the event is published on
    pub topic: Topic,

    /// Account that performed the operation
    pub account_id: i64,

    /// Affected task ids (empty for account events)
    pub item_ids: Vec<i64>,

    /// Human-readable summary
    pub message: String,

    /// When the operation completed
    pub occurred_at: DateTime<Utc>,
}

impl NotificationEvent {
    /// Builds an event stamped with a fresh id and the current time
    pub fn new(topic: Topic, account_id: i64, item_ids: Vec<i64>, message: impl Into<String>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            topic,
            account_id,
            item_ids,
            message: message.into(),
            occurred_at: Utc::now(),
        }
    }

    pub fn sign_up(account_id: i64) -> Self {
        Self::new(Topic::SignUp, account_id, Vec::new(), format!("registered account {}", account_id))
    }

    pub fn sign_in(account_id: i64) -> Self {
        Self::new(Topic::SignIn, account_id, Vec::new(), format!("account {} signed in", account_id))
    }

    pub fn create_item(account_id: i64, item_id: i64) -> Self {
        Self::new(Topic::CreateItem, account_id, vec![item_id], format!("created item {}", item_id))
    }

    pub fn bulk_create_item(account_id: i64, item_ids: Vec<i64>) -> Self {
        let message = format!("bulk created {} items for account {}", item_ids.len(), account_id);
        Self::new(Topic::BulkCreateItem, account_id, item_ids, message)
    }

    pub fn get_all_items(account_id: i64, item_ids: Vec<i64>) -> Self {
        Self::new(
            Topic::GetAllItems,
            account_id,
            item_ids,
            format!("listed items of account {}", account_id),
        )
    }

    pub fn get_item_by_id(account_id: i64, item_id: i64) -> Self {
        Self::new(Topic::GetItemById, account_id, vec![item_id], format!("read item {}", item_id))
    }

    pub fn update_item(account_id: i64, item_id: i64) -> Self {
        Self::new(Topic::UpdateItem, account_id, vec![item_id], format!("updated item {}", item_id))
    }

    pub fn update_item_status(account_id: i64, item_id: i64, done: bool) -> Self {
        Self::new(
            Topic::UpdateItemStatus,
            account_id,
            vec![item_id],
            format!("set item {} done={}", item_id, done),
        )
    }

    pub fn delete_item(account_id: i64, item_id: i64) -> Self {
        Self::new(Topic::DeleteItem, account_id, vec![item_id], format!("deleted item {}", item_id))
    }

    /// JSON encoding used as the publish payload
    pub fn to_bytes(&self) -> Result<Bytes, serde_json::Error> {
        serde_json::to_vec(self).map(Bytes::from)
    }

    /// Decodes a payload produced by [`NotificationEvent::to_bytes`]
    pub fn from_slice(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }
}
