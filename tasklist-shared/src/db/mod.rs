/// Database layer
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool with health checks
/// - `migrations`: Embedded schema migrations
///
/// Queries live on the model types in [`crate::models`].

pub mod migrations;
pub mod pool;
