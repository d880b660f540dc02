/// Repository traits consumed by the services
///
/// The services never talk to sqlx directly; they hold an
/// `Arc<dyn AccountStore>` and an `Arc<dyn TaskStore>`. Two implementations
/// ship with the crate:
///
/// - [`postgres`]: PostgreSQL via the model queries in [`crate::models`]
/// - [`memory`]: in-process maps, used by tests and local demos
///
/// Adapters contain no business logic. Ownership scoping is part of every
/// task method signature so a caller cannot forget it.

use async_trait::async_trait;

use crate::models::account::Account;
use crate::models::task::{Task, TaskChanges};

pub mod memory;
pub mod postgres;

pub use memory::{MemoryAccountStore, MemoryTaskStore};
pub use postgres::{PgAccountStore, PgTaskStore};

/// Storage adapter errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// Unique constraint violated
    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// Any other backend failure
    #[error("Backend error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                let what = db_err
                    .constraint()
                    .map(|c| format!("constraint {} violated", c))
                    .unwrap_or_else(|| "unique constraint violated".to_string());
                StoreError::Duplicate(what)
            }
            other => StoreError::Backend(other.to_string()),
        }
    }
}

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Credential store
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Inserts an account, returning its id
    ///
    /// Fails with [`StoreError::Duplicate`] when the username exists.
    async fn insert_account(&self, name: &str, username: &str, secret: &str) -> StoreResult<i64>;

    /// Looks up an account by username
    async fn find_account_by_username(&self, username: &str) -> StoreResult<Option<Account>>;
}

/// Task store
///
/// Row-count returns are 0 when nothing live matched `(owner_id, task_id)`.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Inserts a task owned by `owner_id`, returning its id
    async fn insert_task(&self, title: &str, description: &str, owner_id: i64) -> StoreResult<i64>;

    /// Live tasks of `owner_id`, ordered by id
    async fn select_tasks(&self, owner_id: i64) -> StoreResult<Vec<Task>>;

    /// A live task of `owner_id`
    async fn select_task(&self, owner_id: i64, task_id: i64) -> StoreResult<Option<Task>>;

    /// Sets the soft-delete flag
    async fn soft_delete_task(&self, owner_id: i64, task_id: i64) -> StoreResult<u64>;

    /// Replaces title, description and done
    async fn update_task(&self, owner_id: i64, task_id: i64, changes: TaskChanges) -> StoreResult<u64>;

    /// Sets the done flag
    async fn update_task_status(&self, owner_id: i64, task_id: i64, done: bool) -> StoreResult<u64>;

    /// Liveness check used by the health endpoint
    async fn ping(&self) -> StoreResult<()>;
}
