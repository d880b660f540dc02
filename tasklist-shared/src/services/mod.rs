/// Business services
///
/// - [`identity`]: account registration, sign-in and bearer-token resolution
/// - [`tasks`]: ownership-scoped task lifecycle
///
/// Both services are plain structs built from their own store and a shared
/// [`EventPublisher`](crate::notify::EventPublisher). They hold no mutable
/// state and are shared across requests behind an `Arc`.

pub mod identity;
pub mod tasks;

pub use identity::{IdentityConfig, IdentityService};
pub use tasks::{NewTask, TaskService};
