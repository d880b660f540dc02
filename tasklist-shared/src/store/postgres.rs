/// PostgreSQL store adapters
///
/// Thin wrappers over the model queries. Both adapters share one `PgPool`.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tasklist_shared::db::pool::{create_pool, DatabaseConfig};
/// use tasklist_shared::store::{AccountStore, PgAccountStore, PgTaskStore, TaskStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// let accounts: Arc<dyn AccountStore> = Arc::new(PgAccountStore::new(pool.clone()));
/// let tasks: Arc<dyn TaskStore> = Arc::new(PgTaskStore::new(pool));
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use super::{AccountStore, StoreResult, TaskStore};
use crate::db::pool::health_check;
use crate::models::account::{Account, CreateAccount};
use crate::models::task::{CreateTask, Task, TaskChanges};

/// Account store backed by the `accounts` table
#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    /// Creates the adapter
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn insert_account(&self, name: &str, username: &str, secret: &str) -> StoreResult<i64> {
        let account = Account::create(
            &self.pool,
            CreateAccount {
                name: name.to_string(),
                username: username.to_string(),
                password_hash: secret.to_string(),
            },
        )
        .await?;

        debug!(account_id = account.id, "Inserted account");
        Ok(account.id)
    }

    async fn find_account_by_username(&self, username: &str) -> StoreResult<Option<Account>> {
        Ok(Account::find_by_username(&self.pool, username).await?)
    }
}

/// Task store backed by the `tasks` table
#[derive(Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    /// Creates the adapter
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn insert_task(&self, title: &str, description: &str, owner_id: i64) -> StoreResult<i64> {
        let task = Task::create(
            &self.pool,
            CreateTask {
                title: title.to_string(),
                description: description.to_string(),
                account_id: owner_id,
            },
        )
        .await?;

        debug!(task_id = task.id, owner_id, "Inserted task");
        Ok(task.id)
    }

    async fn select_tasks(&self, owner_id: i64) -> StoreResult<Vec<Task>> {
        Ok(Task::list_by_account(&self.pool, owner_id).await?)
    }

    async fn select_task(&self, owner_id: i64, task_id: i64) -> StoreResult<Option<Task>> {
        Ok(Task::find_for_account(&self.pool, owner_id, task_id).await?)
    }

    async fn soft_delete_task(&self, owner_id: i64, task_id: i64) -> StoreResult<u64> {
        Ok(Task::soft_delete(&self.pool, owner_id, task_id).await?)
    }

    async fn update_task(&self, owner_id: i64, task_id: i64, changes: TaskChanges) -> StoreResult<u64> {
        Ok(Task::update(&self.pool, owner_id, task_id, changes).await?)
    }

    async fn update_task_status(&self, owner_id: i64, task_id: i64, done: bool) -> StoreResult<u64> {
        Ok(Task::set_done(&self.pool, owner_id, task_id, done).await?)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(health_check(&self.pool).await?)
    }
}
