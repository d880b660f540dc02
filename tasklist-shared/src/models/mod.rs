/// Database models for the task list
///
/// # Models
///
/// - `account`: Accounts and their credential secrets
/// - `task`: Owned, soft-deletable tasks
///
/// Queries live on the model types; the [`crate::store`] adapters wrap them
/// behind the repository traits the services consume.

pub mod account;
pub mod task;
