/// Authentication endpoints
///
/// - `POST /auth/sign-up` - Create an account
/// - `POST /auth/sign-in` - Exchange credentials for a bearer token

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Sign-up request
#[derive(Debug, Deserialize, Validate)]
pub struct SignUpRequest {
    /// Display name
    #[serde(default)]
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub name: String,

    /// Unique login name
    #[validate(length(min = 1, max = 255, message = "Username must be 1 to 255 characters"))]
    pub username: String,

    /// Plaintext password, hashed before storage
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Sign-up response
#[derive(Debug, Serialize, Deserialize)]
pub struct SignUpResponse {
    /// New account id
    pub id: i64,
}

/// Sign-in request
#[derive(Debug, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Sign-in response
#[derive(Debug, Serialize, Deserialize)]
pub struct SignInResponse {
    /// Bearer token for the `Authorization` header
    pub token: String,
}

/// Register a new account
///
/// # Endpoint
///
/// ```text
/// POST /auth/sign-up
/// Content-Type: application/json
///
/// { "name": "Ann", "username": "ann", "password": "hunter2" }
/// ```
///
/// # Response
///
/// ```json
/// { "id": 1 }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
/// - `409 Conflict`: Username already taken
pub async fn sign_up(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> ApiResult<Json<SignUpResponse>> {
    req.validate()?;

    let id = state
        .identity
        .register(&req.name, &req.username, &req.password)
        .await?;

    Ok(Json(SignUpResponse { id }))
}

/// Sign in with username and password
///
/// # Endpoint
///
/// ```text
/// POST /auth/sign-in
/// Content-Type: application/json
///
/// { "username": "ann", "password": "hunter2" }
/// ```
///
/// # Response
///
/// ```json
/// { "token": "eyJ..." }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown username or wrong password
pub async fn sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> ApiResult<Json<SignInResponse>> {
    req.validate()?;

    let token = state
        .identity
        .authenticate(&req.username, &req.password)
        .await?;

    tracing::info!(username = %req.username, "Issued session token");

    Ok(Json(SignInResponse { token }))
}
