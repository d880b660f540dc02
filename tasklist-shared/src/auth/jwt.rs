/// Session claims: JWT issuance and validation
///
/// A session claim binds an account id to an issuance and expiry time. It is
/// signed with HS256 and never stored server-side, so its validity depends
/// only on the signature and the clock at verification time.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Expiration**: caller-supplied TTL (the identity service defaults to 12 hours)
/// - **Validation**: signature, issuer and expiry, with zero leeway
/// - **Secret**: at least 32 bytes, loaded once at startup
///
/// Expiry is checked against an explicit `now` rather than inside
/// `jsonwebtoken`, which keeps the boundary testable to the second.
///
/// # Example
///
/// ```
/// use chrono::{Duration, Utc};
/// use tasklist_shared::auth::jwt::{create_token, validate_token, Claims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let claims = Claims::new(42, Utc::now(), Duration::hours(12));
/// let token = create_token(&claims, "your-secret-key-at-least-32-bytes")?;
///
/// let validated = validate_token(&token, "your-secret-key-at-least-32-bytes")?;
/// assert_eq!(validated.account_id()?, 42);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Issuer written into and required from every token
pub const ISSUER: &str = "tasklist";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature does not match the secret
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token could not be decoded or its claims are wrong
    #[error("Invalid token format: {0}")]
    InvalidFormat(String),

    /// Issuer is not ours
    #[error("Invalid issuer")]
    InvalidIssuer,
}

/// JWT claims
///
/// # Standard Claims
///
/// - `sub`: account id, as a decimal string
/// - `iss`: always [`ISSUER`]
/// - `iat`: issued at (Unix seconds)
/// - `exp`: expires at (Unix seconds)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - account id
    pub sub: String,

    /// Issuer
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Claims for `account_id`, issued at `issued_at`, valid for `ttl`
    pub fn new(account_id: i64, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: account_id.to_string(),
            iss: ISSUER.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }

    /// Parses the subject back into an account id
    pub fn account_id(&self) -> Result<i64, JwtError> {
        self.sub
            .parse::<i64>()
            .map_err(|_| JwtError::InvalidFormat(format!("subject is not an account id: {}", self.sub)))
    }

    /// Whether the token is expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

/// Signs claims with HS256
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a token against the current time
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    validate_token_at(token, secret, Utc::now())
}

/// Validates a token against an explicit clock
///
/// Verifies:
/// - Signature is valid for `secret`
/// - Issuer is [`ISSUER`]
/// - `now` is strictly before `exp`
/// - Subject is an account id
pub fn validate_token_at(token: &str, secret: &str, now: DateTime<Utc>) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidSignature,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        _ => JwtError::InvalidFormat(e.to_string()),
    })?;

    let claims = token_data.claims;
    if claims.is_expired_at(now) {
        return Err(JwtError::Expired);
    }
    claims.account_id()?;

    Ok(claims)
}
