/// Task model and database operations
///
/// Every query in this module is scoped by the owning account. Reads and
/// writes only ever touch live rows (`is_removed = FALSE`); deletion flips
/// the flag and keeps the row.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     done BOOLEAN NOT NULL DEFAULT FALSE,
///     account_id BIGINT NOT NULL REFERENCES accounts(id),
///     is_removed BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use tasklist_shared::models::task::{CreateTask, Task};
/// use tasklist_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let task = Task::create(&pool, CreateTask {
///     title: "buy milk".to_string(),
///     description: "2%".to_string(),
///     account_id: 1,
/// }).await?;
///
/// Task::set_done(&pool, 1, task.id, true).await?;
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Task record
///
/// `account_id` and `is_removed` are internal and never sent to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Store-assigned identifier
    pub id: i64,

    /// Short title
    pub title: String,

    /// Free-form description
    pub description: String,

    /// Completion flag
    pub done: bool,

    /// Owning account
    #[serde(skip)]
    pub account_id: i64,

    /// Soft-delete flag
    #[serde(skip)]
    pub is_removed: bool,
}

/// Input for creating a task
#[derive(Debug, Clone)]
pub struct CreateTask {
    /// Title
    pub title: String,

    /// Description
    pub description: String,

    /// Owner, fixed for the lifetime of the task
    pub account_id: i64,
}

/// Full replacement of the mutable task fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskChanges {
    /// New title
    pub title: String,

    /// New description
    pub description: String,

    /// New completion flag
    pub done: bool,
}

impl Task {
    /// Inserts a new task owned by `data.account_id`
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, account_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, description, done, account_id, is_removed
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.account_id)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Lists live tasks of an account, ordered by id
    pub async fn list_by_account(pool: &PgPool, account_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, done, account_id, is_removed
            FROM tasks
            WHERE account_id = $1 AND is_removed = FALSE
            ORDER BY id
            "#,
        )
        .bind(account_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Finds a live task by id, only if owned by `account_id`
    pub async fn find_for_account(
        pool: &PgPool,
        account_id: i64,
        id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, done, account_id, is_removed
            FROM tasks
            WHERE id = $1 AND account_id = $2 AND is_removed = FALSE
            "#,
        )
        .bind(id)
        .bind(account_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by id regardless of owner or soft-delete flag
    ///
    /// Storage-level inspection only; services must not call this.
    pub async fn find_raw(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, done, account_id, is_removed
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Replaces title, description and done flag
    ///
    /// Returns the number of rows matched (0 or 1).
    pub async fn update(
        pool: &PgPool,
        account_id: i64,
        id: i64,
        changes: TaskChanges,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET title = $1, description = $2, done = $3
            WHERE id = $4 AND account_id = $5 AND is_removed = FALSE
            "#,
        )
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.done)
        .bind(id)
        .bind(account_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Sets the done flag
    pub async fn set_done(
        pool: &PgPool,
        account_id: i64,
        id: i64,
        done: bool,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET done = $1
            WHERE id = $2 AND account_id = $3 AND is_removed = FALSE
            "#,
        )
        .bind(done)
        .bind(id)
        .bind(account_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Marks a task as removed; the row is kept
    pub async fn soft_delete(pool: &PgPool, account_id: i64, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET is_removed = TRUE
            WHERE id = $1 AND account_id = $2 AND is_removed = FALSE
            "#,
        )
        .bind(id)
        .bind(account_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}
