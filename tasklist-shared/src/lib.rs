//! # Tasklist Shared Library
//!
//! Core of the task-list backend: identity, ownership-scoped task services,
//! storage adapters and notifications. The HTTP server in `tasklist-api`
//! is a thin layer over this crate.
//!
//! ## Module Organization
//!
//! - `auth`: password hashing, session tokens, bearer gate
//! - `db`: connection pool and embedded migrations
//! - `error`: service error kinds
//! - `models`: database models and their queries
//! - `notify`: notifier trait, event payloads, Redis adapter
//! - `services`: identity and task services
//! - `store`: repository traits with PostgreSQL and in-memory adapters

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod notify;
pub mod services;
pub mod store;

/// Current version of the Tasklist shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
