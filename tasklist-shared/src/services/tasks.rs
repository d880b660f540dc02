/// Resource service: ownership-scoped task lifecycle
///
/// Every operation takes the caller's account id and passes it to the store
/// on every call. A task owned by someone else is reported exactly like a
/// task that does not exist ([`ServiceError::task_not_found`]).
///
/// Each successful operation, reads included, emits one notification after
/// the store call returns. What a failed publish means for the caller is
/// decided by the [`NotifyPolicy`](crate::notify::NotifyPolicy) of the
/// publisher.

use std::sync::Arc;

use tracing::debug;

use crate::error::{ServiceError, ServiceResult};
use crate::models::task::{Task, TaskChanges};
use crate::notify::{EventPublisher, NotificationEvent};
use crate::store::TaskStore;

/// One item of a bulk create
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: String,

    /// Owner claimed by the client. Ignored: tasks always belong to the caller.
    pub account_id: Option<i64>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            account_id: None,
        }
    }
}

/// Task lifecycle operations
pub struct TaskService {
    tasks: Arc<dyn TaskStore>,
    events: EventPublisher,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskStore>, events: EventPublisher) -> Self {
        Self { tasks, events }
    }

    /// Checks that the backing store answers
    pub async fn ping(&self) -> ServiceResult<()> {
        Ok(self.tasks.ping().await?)
    }

    /// Creates a task owned by `account_id` and returns its id
    ///
    /// The task starts not done and not removed. A blank title is rejected
    /// before anything is persisted.
    pub async fn create(&self, account_id: i64, title: &str, description: &str) -> ServiceResult<i64> {
        let task_id = self.insert(account_id, title, description).await?;

        self.events
            .emit(NotificationEvent::create_item(account_id, task_id))
            .await?;
        Ok(task_id)
    }

    /// Creates `items` in order, all owned by `account_id`
    ///
    /// Not atomic. When item *k* fails, items before it stay committed,
    /// items after it are never attempted, and the error of item *k* is
    /// returned. One `bulk_create_item` event is emitted, and only after
    /// every item succeeded.
    pub async fn bulk_create(&self, account_id: i64, items: Vec<NewTask>) -> ServiceResult<()> {
        let mut created = Vec::with_capacity(items.len());

        for (index, item) in items.into_iter().enumerate() {
            if let Some(claimed) = item.account_id.filter(|claimed| *claimed != account_id) {
                debug!(account_id, claimed, "Ignoring foreign owner in bulk item");
            }

            let task_id = self
                .insert(account_id, &item.title, &item.description)
                .await
                .map_err(|e| {
                    debug!(account_id, index, committed = created.len(), error = %e, "Bulk create stopped");
                    e
                })?;
            created.push(task_id);
        }

        self.events
            .emit(NotificationEvent::bulk_create_item(account_id, created))
            .await
    }

    /// Live tasks of `account_id`, ordered by id
    pub async fn get_all(&self, account_id: i64) -> ServiceResult<Vec<Task>> {
        let tasks = self.tasks.select_tasks(account_id).await?;

        let ids = tasks.iter().map(|t| t.id).collect();
        self.events
            .emit(NotificationEvent::get_all_items(account_id, ids))
            .await?;
        Ok(tasks)
    }

    /// A live task of `account_id`
    pub async fn get_by_id(&self, account_id: i64, task_id: i64) -> ServiceResult<Task> {
        let task = self
            .tasks
            .select_task(account_id, task_id)
            .await?
            .ok_or_else(|| ServiceError::task_not_found(task_id))?;

        self.events
            .emit(NotificationEvent::get_item_by_id(account_id, task_id))
            .await?;
        Ok(task)
    }

    /// Replaces title, description and done flag
    pub async fn update(
        &self,
        account_id: i64,
        task_id: i64,
        title: &str,
        description: &str,
        done: bool,
    ) -> ServiceResult<()> {
        validate_title(title)?;

        let changes = TaskChanges {
            title: title.to_string(),
            description: description.to_string(),
            done,
        };
        let rows = self.tasks.update_task(account_id, task_id, changes).await?;
        expect_match(rows, task_id)?;

        self.events
            .emit(NotificationEvent::update_item(account_id, task_id))
            .await
    }

    /// Sets the done flag, leaving the other fields untouched
    pub async fn change_status(&self, account_id: i64, task_id: i64, done: bool) -> ServiceResult<()> {
        let rows = self.tasks.update_task_status(account_id, task_id, done).await?;
        expect_match(rows, task_id)?;

        self.events
            .emit(NotificationEvent::update_item_status(account_id, task_id, done))
            .await
    }

    /// Soft-deletes a task; the row is kept with its removed flag set
    pub async fn delete(&self, account_id: i64, task_id: i64) -> ServiceResult<()> {
        let rows = self.tasks.soft_delete_task(account_id, task_id).await?;
        expect_match(rows, task_id)?;

        self.events
            .emit(NotificationEvent::delete_item(account_id, task_id))
            .await
    }

    async fn insert(&self, account_id: i64, title: &str, description: &str) -> ServiceResult<i64> {
        validate_title(title)?;

        let task_id = self.tasks.insert_task(title, description, account_id).await?;
        debug!(account_id, task_id, "Created task");
        Ok(task_id)
    }
}

/// Longest title the `tasks.title` column holds
pub const MAX_TITLE_CHARS: usize = 255;

fn validate_title(title: &str) -> ServiceResult<()> {
    if title.trim().is_empty() {
        return Err(ServiceError::Validation("title must not be empty".to_string()));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(ServiceError::Validation(format!(
            "title must be at most {} characters",
            MAX_TITLE_CHARS
        )));
    }
    Ok(())
}

/// Zero rows means no live task of this owner had that id.
fn expect_match(rows: u64, task_id: i64) -> ServiceResult<()> {
    if rows == 0 {
        return Err(ServiceError::task_not_found(task_id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{NotifyPolicy, RecordingNotifier};
    use crate::store::MemoryTaskStore;

    fn service() -> (TaskService, Arc<MemoryTaskStore>, Arc<RecordingNotifier>) {
        let store = Arc::new(MemoryTaskStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let service = TaskService::new(
            store.clone(),
            EventPublisher::new(notifier.clone(), NotifyPolicy::Strict),
        );
        (service, store, notifier)
    }

    #[test]
    fn test_validate_title() {
        assert!(validate_title("buy milk").is_ok());
        assert!(validate_title("").is_err());
        assert!(validate_title(" \t\n").is_err());
        assert!(validate_title(&"t".repeat(MAX_TITLE_CHARS)).is_ok());
        assert!(validate_title(&"t".repeat(MAX_TITLE_CHARS + 1)).is_err());
        // Characters, not bytes
        assert!(validate_title(&"é".repeat(MAX_TITLE_CHARS)).is_ok());
    }

    #[tokio::test]
    async fn test_create_defaults() {
        let (service, store, notifier) = service();

        let id = service.create(1, "buy milk", "2%").await.unwrap();
        let raw = store.raw_task(id).unwrap();

        assert!(!raw.done);
        assert!(!raw.is_removed);
        assert_eq!(raw.account_id, 1);
        assert_eq!(notifier.topics(), vec!["create_item"]);
    }

    #[tokio::test]
    async fn test_blank_title_persists_nothing() {
        let (service, store, notifier) = service();

        let result = service.create(1, "   ", "desc").await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
        assert_eq!(store.row_count(), 0);
        assert!(notifier.published().is_empty());
    }

    #[tokio::test]
    async fn test_bulk_create_forces_owner() {
        let (service, store, notifier) = service();

        let mut item = NewTask::new("sneaky", "");
        item.account_id = Some(99);
        service.bulk_create(1, vec![item]).await.unwrap();

        assert_eq!(store.raw_task(1).unwrap().account_id, 1);
        assert_eq!(notifier.topics(), vec!["bulk_create_item"]);
    }

    #[tokio::test]
    async fn test_update_rejects_blank_title_before_store() {
        let (service, store, _) = service();
        let id = service.create(1, "keep", "me").await.unwrap();

        let result = service.update(1, id, "", "changed", true).await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
        assert_eq!(store.raw_task(id).unwrap().title, "keep");
    }

    #[tokio::test]
    async fn test_store_failure_surfaces() {
        let (service, store, _) = service();
        store.set_unavailable(true);

        assert!(matches!(service.get_all(1).await, Err(ServiceError::Store(_))));
        assert!(matches!(service.ping().await, Err(ServiceError::Store(_))));
    }
}
