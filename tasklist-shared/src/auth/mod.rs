/// Authentication primitives
///
/// # Modules
///
/// - [`password`]: Argon2id hashing of account secrets
/// - [`jwt`]: HS256 session claims (issue and validate)
/// - [`middleware`]: the bearer gate in front of resource routes
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id, salted per account, PHC string storage
/// - **Session Tokens**: HS256, fixed issuer, zero-leeway expiry
/// - **Constant-time Comparison**: password verification goes through argon2
///
/// # Example
///
/// ```
/// use chrono::{Duration, Utc};
/// use tasklist_shared::auth::jwt::{create_token, validate_token, Claims};
/// use tasklist_shared::auth::password::{hash_password, verify_password, HashParams};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password", &HashParams::minimal())?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let secret = "secret-key-that-is-at-least-32-bytes";
/// let token = create_token(&Claims::new(7, Utc::now(), Duration::hours(12)), secret)?;
/// assert_eq!(validate_token(&token, secret)?.account_id()?, 7);
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
