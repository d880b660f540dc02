/// Identity service
///
/// Owns account creation and the bearer tokens that bind later requests to
/// an account. Tokens are stateless HS256 session claims (see
/// [`crate::auth::jwt`]); nothing about a session is stored server-side.
///
/// Sign-in failures never reveal whether the username exists: an unknown
/// username and a wrong password both yield
/// [`ServiceError::InvalidCredentials`], and both pay for one Argon2
/// verification. Unknown usernames are checked against a placeholder hash
/// derived once with the configured [`HashParams`].

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

use crate::auth::jwt::{self, Claims, JwtError};
use crate::auth::password::{hash_password, verify_password, HashParams};
use crate::error::{ServiceError, ServiceResult};
use crate::notify::{EventPublisher, NotificationEvent};
use crate::store::{AccountStore, StoreError};

/// Default session lifetime
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 12;

const PLACEHOLDER_PASSWORD: &str = "tasklist-placeholder-password";

/// Immutable identity settings
#[derive(Clone)]
pub struct IdentityConfig {
    /// HS256 signing secret
    pub secret: String,

    /// How long an issued token stays valid
    pub token_ttl: Duration,

    /// Argon2id cost for new accounts
    pub hash_params: HashParams,
}

impl IdentityConfig {
    /// Config with the default TTL and hashing cost
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            token_ttl: Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
            hash_params: HashParams::default(),
        }
    }
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("hash_params", &self.hash_params)
            .finish()
    }
}

/// Registration, sign-in and token resolution
pub struct IdentityService {
    accounts: Arc<dyn AccountStore>,
    events: EventPublisher,
    config: IdentityConfig,
    placeholder_hash: OnceCell<String>,
}

impl IdentityService {
    pub fn new(accounts: Arc<dyn AccountStore>, events: EventPublisher, config: IdentityConfig) -> Self {
        Self {
            accounts,
            events,
            config,
            placeholder_hash: OnceCell::new(),
        }
    }

    /// Session lifetime applied to new tokens
    pub fn token_ttl(&self) -> Duration {
        self.config.token_ttl
    }

    /// Creates an account and returns its id
    ///
    /// # Errors
    ///
    /// - `Validation` for a blank username or an empty password
    /// - `Conflict` when the username is taken
    /// - `Store` / `Notify` for adapter failures
    /// - `Internal` when hashing fails
    pub async fn register(&self, name: &str, username: &str, password: &str) -> ServiceResult<i64> {
        if username.trim().is_empty() {
            return Err(ServiceError::Validation("username must not be empty".to_string()));
        }
        if password.is_empty() {
            return Err(ServiceError::Validation("password must not be empty".to_string()));
        }

        let secret = self.derive_secret(password).await?;

        let account_id = self
            .accounts
            .insert_account(name, username, &secret)
            .await
            .map_err(|e| match e {
                StoreError::Duplicate(_) => {
                    ServiceError::Conflict(format!("username {} is already taken", username))
                }
                other => other.into(),
            })?;

        info!(account_id, "Registered account");

        self.events.emit(NotificationEvent::sign_up(account_id)).await?;
        Ok(account_id)
    }

    /// Verifies credentials and issues a signed bearer token
    pub async fn authenticate(&self, username: &str, password: &str) -> ServiceResult<String> {
        let account = match self.accounts.find_account_by_username(username).await? {
            Some(account) => account,
            None => {
                // Same Argon2 cost as a wrong password
                let placeholder = self.placeholder_hash().await?;
                self.check_secret(password, placeholder).await?;
                return Err(ServiceError::InvalidCredentials);
            }
        };

        if !self.check_secret(password, &account.password_hash).await? {
            debug!(account_id = account.id, "Rejected sign-in with wrong password");
            return Err(ServiceError::InvalidCredentials);
        }

        let token = self.issue_token_at(account.id, Utc::now())?;

        self.events.emit(NotificationEvent::sign_in(account.id)).await?;
        Ok(token)
    }

    /// Signs a token for `account_id` as if issued at `now`
    pub fn issue_token_at(&self, account_id: i64, now: DateTime<Utc>) -> ServiceResult<String> {
        let claims = Claims::new(account_id, now, self.config.token_ttl);

        jwt::create_token(&claims, &self.config.secret).map_err(|e| {
            error!(account_id, error = %e, "Token signing failed");
            ServiceError::Internal(format!("token signing failed: {}", e))
        })
    }

    /// Resolves a bearer token to its account id
    pub fn resolve_identity(&self, token: &str) -> ServiceResult<i64> {
        self.resolve_identity_at(token, Utc::now())
    }

    /// Resolves a bearer token against an explicit clock
    ///
    /// Rejects with `Unauthenticated` on a bad signature, a malformed token
    /// or `now >= exp`.
    pub fn resolve_identity_at(&self, token: &str, now: DateTime<Utc>) -> ServiceResult<i64> {
        let claims = jwt::validate_token_at(token, &self.config.secret, now).map_err(|e| {
            debug!(error = %e, "Rejected bearer token");
            match e {
                JwtError::Expired => ServiceError::Unauthenticated("token expired".to_string()),
                _ => ServiceError::Unauthenticated("invalid token".to_string()),
            }
        })?;

        claims
            .account_id()
            .map_err(|_| ServiceError::Unauthenticated("invalid token".to_string()))
    }

    async fn derive_secret(&self, password: &str) -> ServiceResult<String> {
        let password = password.to_string();
        let params = self.config.hash_params;

        tokio::task::spawn_blocking(move || hash_password(&password, &params))
            .await
            .map_err(|e| ServiceError::Internal(format!("hashing task failed: {}", e)))?
            .map_err(|e| ServiceError::Internal(e.to_string()))
    }

    async fn placeholder_hash(&self) -> ServiceResult<&str> {
        self.placeholder_hash
            .get_or_try_init(|| self.derive_secret(PLACEHOLDER_PASSWORD))
            .await
            .map(String::as_str)
    }

    async fn check_secret(&self, password: &str, stored: &str) -> ServiceResult<bool> {
        let password = password.to_string();
        let stored = stored.to_string();

        tokio::task::spawn_blocking(move || verify_password(&password, &stored))
            .await
            .map_err(|e| ServiceError::Internal(format!("verification task failed: {}", e)))?
            .map_err(|e| ServiceError::Internal(e.to_string()))
    }
}
