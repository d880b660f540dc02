/// Error kinds surfaced by the identity and task services
///
/// Every operation in [`crate::services`] returns [`ServiceResult`]. The
/// variants are deliberately coarse so the transport layer can map them
/// directly to status codes:
///
/// | Variant              | Meaning                                              |
/// |----------------------|------------------------------------------------------|
/// | `InvalidCredentials` | Unknown username or wrong password (not distinguished) |
/// | `Unauthenticated`    | Missing, malformed, expired or forged bearer token   |
/// | `Conflict`           | Username already taken                               |
/// | `NotFound`           | Task absent, removed, or owned by someone else       |
/// | `Validation`         | Malformed input                                      |
/// | `Store`              | Storage adapter failure                              |
/// | `Internal`           | Hashing or token signing failed                      |
/// | `Notify`             | Publish failed after the operation itself succeeded  |

use crate::notify::NotifyError;
use crate::store::StoreError;

/// Service result type alias
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Core service error
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Sign-in failed
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Caller identity could not be established
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Unique constraint violated
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Resource does not exist for this caller
    #[error("Not found: {0}")]
    NotFound(String),

    /// Input rejected before reaching the store
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Storage adapter failure
    #[error("Store failure: {0}")]
    Store(String),

    /// Failure inside the service itself (hashing, token signing)
    #[error("Internal failure: {0}")]
    Internal(String),

    /// Notification could not be published
    #[error("Notification failure: {0}")]
    Notify(String),
}

impl ServiceError {
    /// Not-found error for a task id
    ///
    /// Used for both absent and foreign tasks so callers cannot tell them apart.
    pub fn task_not_found(task_id: i64) -> Self {
        ServiceError::NotFound(format!("task {} not found", task_id))
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(what) => ServiceError::Conflict(what),
            StoreError::Backend(msg) => ServiceError::Store(msg),
        }
    }
}

impl From<NotifyError> for ServiceError {
    fn from(err: NotifyError) -> Self {
        ServiceError::Notify(err.to_string())
    }
}
