/// In-memory store adapters
///
/// Behave like the PostgreSQL adapters (unique usernames, id sequences,
/// owner scoping, soft delete) without a database. Useful for:
/// - Service and HTTP tests
/// - Running the API locally without PostgreSQL
///
/// Both stores can be switched into an "unavailable" state in which every
/// call fails with [`StoreError::Backend`], to exercise failure paths.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use super::{AccountStore, StoreError, StoreResult, TaskStore};
use crate::models::account::Account;
use crate::models::task::{Task, TaskChanges};

fn unavailable() -> StoreError {
    StoreError::Backend("store unavailable".to_string())
}

fn poisoned() -> StoreError {
    StoreError::Backend("store lock poisoned".to_string())
}

/// In-memory account store
#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: Mutex<BTreeMap<i64, Account>>,
    unavailable: AtomicBool,
}

impl MemoryAccountStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail (or succeed again)
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of stored accounts
    pub fn account_count(&self) -> usize {
        self.accounts.lock().map(|a| a.len()).unwrap_or(0)
    }

    fn check(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn insert_account(&self, name: &str, username: &str, secret: &str) -> StoreResult<i64> {
        self.check()?;
        let mut accounts = self.accounts.lock().map_err(|_| poisoned())?;

        if accounts.values().any(|a| a.username == username) {
            return Err(StoreError::Duplicate(
                "constraint accounts_username_key violated".to_string(),
            ));
        }

        let id = accounts.keys().next_back().copied().unwrap_or(0) + 1;
        accounts.insert(
            id,
            Account {
                id,
                name: name.to_string(),
                username: username.to_string(),
                password_hash: secret.to_string(),
                created_at: Utc::now(),
            },
        );

        Ok(id)
    }

    async fn find_account_by_username(&self, username: &str) -> StoreResult<Option<Account>> {
        self.check()?;
        let accounts = self.accounts.lock().map_err(|_| poisoned())?;
        Ok(accounts.values().find(|a| a.username == username).cloned())
    }
}

/// In-memory task store
#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: Mutex<BTreeMap<i64, Task>>,
    unavailable: AtomicBool,
}

impl MemoryTaskStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail (or succeed again)
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Row as stored, ignoring owner and soft-delete flag
    pub fn raw_task(&self, task_id: i64) -> Option<Task> {
        self.tasks.lock().ok().and_then(|t| t.get(&task_id).cloned())
    }

    /// Number of stored rows, removed ones included
    pub fn row_count(&self) -> usize {
        self.tasks.lock().map(|t| t.len()).unwrap_or(0)
    }

    fn check(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }

    fn modify_live<F>(&self, owner_id: i64, task_id: i64, apply: F) -> StoreResult<u64>
    where
        F: FnOnce(&mut Task),
    {
        self.check()?;
        let mut tasks = self.tasks.lock().map_err(|_| poisoned())?;

        match tasks.get_mut(&task_id) {
            Some(task) if task.account_id == owner_id && !task.is_removed => {
                apply(task);
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn insert_task(&self, title: &str, description: &str, owner_id: i64) -> StoreResult<i64> {
        self.check()?;
        let mut tasks = self.tasks.lock().map_err(|_| poisoned())?;

        let id = tasks.keys().next_back().copied().unwrap_or(0) + 1;
        tasks.insert(
            id,
            Task {
                id,
                title: title.to_string(),
                description: description.to_string(),
                done: false,
                account_id: owner_id,
                is_removed: false,
            },
        );

        Ok(id)
    }

    async fn select_tasks(&self, owner_id: i64) -> StoreResult<Vec<Task>> {
        self.check()?;
        let tasks = self.tasks.lock().map_err(|_| poisoned())?;

        Ok(tasks
            .values()
            .filter(|t| t.account_id == owner_id && !t.is_removed)
            .cloned()
            .collect())
    }

    async fn select_task(&self, owner_id: i64, task_id: i64) -> StoreResult<Option<Task>> {
        self.check()?;
        let tasks = self.tasks.lock().map_err(|_| poisoned())?;

        Ok(tasks
            .get(&task_id)
            .filter(|t| t.account_id == owner_id && !t.is_removed)
            .cloned())
    }

    async fn soft_delete_task(&self, owner_id: i64, task_id: i64) -> StoreResult<u64> {
        self.modify_live(owner_id, task_id, |task| task.is_removed = true)
    }

    async fn update_task(&self, owner_id: i64, task_id: i64, changes: TaskChanges) -> StoreResult<u64> {
        self.modify_live(owner_id, task_id, move |task| {
            task.title = changes.title;
            task.description = changes.description;
            task.done = changes.done;
        })
    }

    async fn update_task_status(&self, owner_id: i64, task_id: i64, done: bool) -> StoreResult<u64> {
        self.modify_live(owner_id, task_id, |task| task.done = done)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.check()
    }
}
