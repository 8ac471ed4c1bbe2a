/// Session endpoints: login and cross-service token verification
///
/// # Endpoints
///
/// - `POST /auth/login` - Exchange form credentials for a bearer token
/// - `GET  /auth/check` - Verify a (public identity, token) pair for the
///   task-tracking service

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    models::{account::Account, token::TokenRecord},
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Form, Json,
};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use taskmesh_shared::auth::{jwt, password};
use uuid::Uuid;

/// Login form body
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// Account username
    pub username: String,

    /// Plaintext password, verified against the stored hash
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Signed bearer token
    pub access_token: String,

    /// Always "bearer"
    pub token_type: String,
}

/// Token check query parameters
#[derive(Debug, Deserialize)]
pub struct CheckParams {
    /// The claimed external identity
    pub public_user_id: Uuid,

    /// The presented bearer token
    pub token: String,
}

/// Login endpoint
///
/// Verifies credentials, signs a fresh token, and stores it as the user's
/// single current token — a second login supersedes the first session.
///
/// # Endpoint
///
/// ```text
/// POST /auth/login
/// Content-Type: application/x-www-form-urlencoded
///
/// username=alice&password=...
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown username or wrong password (indistinguishable
///   by design)
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> ApiResult<Json<LoginResponse>> {
    let account = Account::find_by_username(&state.db, &form.username)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Incorrect username or password".to_string()))?;

    let valid = password::verify_password(&form.password, &account.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Incorrect username or password".to_string(),
        ));
    }

    let claims = jwt::Claims::with_ttl(
        &account.username,
        Duration::minutes(state.config.token.ttl_minutes),
    );
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    let record = TokenRecord::issue(&state.db, account.id, &token).await?;

    tracing::info!(public_id = %account.public_id, "Login succeeded");

    Ok(Json(LoginResponse {
        access_token: record.token,
        token_type: record.token_type,
    }))
}

/// Cross-service token verification endpoint
///
/// The task-tracking service calls this synchronously to validate that a
/// presented token still belongs to the claimed identity. Signature
/// validity is necessary but not sufficient: the exact pair must also be
/// live in storage. Signature mismatch, expiry, and absent storage row each
/// independently collapse to 401 — the caller never learns which.
///
/// # Endpoint
///
/// ```text
/// GET /auth/check?public_user_id=<uuid>&token=<string>
/// ```
pub async fn check(
    State(state): State<AppState>,
    Query(params): Query<CheckParams>,
) -> ApiResult<StatusCode> {
    if let Err(e) = jwt::validate_token(&params.token, state.jwt_secret()) {
        tracing::debug!(public_id = %params.public_user_id, error = %e, "Token check denied");
        return Err(ApiError::Unauthorized(
            "Could not validate credentials".to_string(),
        ));
    }

    let valid = TokenRecord::verify_by_identity(&state.db, params.public_user_id, &params.token)
        .await
        .map_err(|e| ApiError::InternalError(format!("Token lookup failed: {}", e)))?;

    if valid {
        Ok(StatusCode::OK)
    } else {
        Err(ApiError::Unauthorized(
            "Could not validate credentials".to_string(),
        ))
    }
}
