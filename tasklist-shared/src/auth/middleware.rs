/// Request authentication gate for Axum
///
/// Every resource route sits behind [`require_bearer`]. The gate reads the
/// `Authorization` header, resolves the token through the
/// [`IdentityService`], and stores the caller as an [`AuthContext`] in the
/// request extensions. Anything else ends the request with 401 before a
/// handler or a store is touched.
///
/// Accepted header shape, exactly: `Authorization: Bearer <token>`.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use axum::{middleware, routing::get, Router};
/// use tasklist_shared::auth::middleware::{require_bearer, AuthContext};
/// use tasklist_shared::services::IdentityService;
///
/// async fn whoami(auth: AuthContext) -> String {
///     format!("account {}", auth.account_id)
/// }
///
/// fn router(identity: Arc<IdentityService>) -> Router {
///     Router::new()
///         .route("/whoami", get(whoami))
///         .layer(middleware::from_fn_with_state(identity, require_bearer))
/// }
/// ```

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ServiceError;
use crate::services::IdentityService;

/// Authenticated caller, added to request extensions by the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Account the bearer token was issued to
    pub account_id: i64,
}

/// Reasons the gate rejects a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization` header
    MissingCredentials,

    /// Header present but not `Bearer <token>`
    InvalidFormat(String),

    /// Token did not resolve to an account
    InvalidToken(String),

    /// Handler reached without passing the gate
    MissingContext,
}

impl AuthError {
    fn message(&self) -> String {
        match self {
            AuthError::MissingCredentials => "Missing credentials".to_string(),
            AuthError::InvalidFormat(msg) | AuthError::InvalidToken(msg) => msg.clone(),
            AuthError::MissingContext => "Request is not authenticated".to_string(),
        }
    }
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        ServiceError::Unauthenticated(err.message())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": "unauthenticated",
            "message": self.message(),
        });

        (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, "Bearer")],
            Json(body),
        )
            .into_response()
    }
}

/// Extracts the token from an `Authorization` header value
///
/// The value must split on a single space into exactly two parts: the
/// literal scheme `Bearer` and a non-empty token.
pub fn parse_bearer(header_value: Option<&str>) -> Result<&str, AuthError> {
    let value = header_value.ok_or(AuthError::MissingCredentials)?;

    let parts: Vec<&str> = value.split(' ').collect();
    match parts.as_slice() {
        ["Bearer", token] if !token.is_empty() => Ok(token),
        ["Bearer", _] => Err(AuthError::InvalidFormat("Empty bearer token".to_string())),
        _ => Err(AuthError::InvalidFormat(
            "Expected Authorization: Bearer <token>".to_string(),
        )),
    }
}

/// Bearer authentication middleware
///
/// Use with `axum::middleware::from_fn_with_state`, passing the shared
/// identity service as state.
///
/// # Errors
///
/// Returns 401 Unauthorized if:
/// - the `Authorization` header is missing or not valid UTF-8
/// - the header is not exactly `Bearer <token>`
/// - the token is forged, malformed or expired
pub async fn require_bearer(
    State(identity): State<Arc<IdentityService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .map(|v| v.to_str().unwrap_or_default());

    let token = parse_bearer(header_value)?;

    let account_id = identity.resolve_identity(token).map_err(|e| match e {
        ServiceError::Unauthenticated(msg) => AuthError::InvalidToken(msg),
        other => AuthError::InvalidToken(other.to_string()),
    })?;

    req.extensions_mut().insert(AuthContext { account_id });

    Ok(next.run(req).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .copied()
            .ok_or(AuthError::MissingContext)
    }
}
