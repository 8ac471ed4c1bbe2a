/// Account lifecycle endpoints
///
/// Every successful mutation commits locally first, then publishes one
/// account event. Update and delete are gated on the caller presenting the
/// target user's current stored token.
///
/// # Endpoints
///
/// - `POST /auth/create` - Register a new account
/// - `POST /auth/update` - Mutate account fields
/// - `POST /auth/delete` - Remove an account

use crate::{
    app::AppState,
    error::{validation_error, ApiError, ApiResult},
    models::{
        account::{Account, CreateAccount, UpdateAccount},
        token::TokenRecord,
    },
    publisher::publish_after_commit,
};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use taskmesh_shared::auth::password;
use taskmesh_shared::events::{AccountEvent, AccountPayload};
use taskmesh_shared::models::role::Role;
use uuid::Uuid;
use validator::Validate;

/// Create account request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAccountRequest {
    /// Unique login name
    #[validate(length(min = 3, max = 64, message = "Username must be 3-64 characters"))]
    pub username: String,

    /// Contact email
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Plaintext password, hashed before storage
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Given name
    #[validate(length(max = 100, message = "First name must be at most 100 characters"))]
    pub first_name: Option<String>,

    /// Family name
    #[validate(length(max = 100, message = "Last name must be at most 100 characters"))]
    pub last_name: Option<String>,

    /// Numeric role; defaults to client
    pub role: Option<i32>,
}

/// Create account response
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateAccountResponse {
    /// Internal account id (used by update/delete requests)
    pub user_id: i64,

    /// Stable external identity
    pub public_id: Uuid,
}

/// Update account request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAccountRequest {
    /// The caller's current bearer token for the target account
    pub token: String,

    /// Internal id of the account to mutate
    pub user_id: i64,

    /// New login name
    #[validate(length(min = 3, max = 64, message = "Username must be 3-64 characters"))]
    pub username: Option<String>,

    /// New given name
    pub first_name: Option<String>,

    /// New family name
    pub last_name: Option<String>,

    /// New contact email
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// New numeric role
    pub role: Option<i32>,
}

/// Delete account request
#[derive(Debug, Deserialize)]
pub struct DeleteAccountRequest {
    /// The caller's current bearer token for the target account
    pub token: String,

    /// Internal id of the account to remove
    pub user_id: i64,
}

/// Mutation acknowledgement
#[derive(Debug, Serialize, Deserialize)]
pub struct MutationResponse {
    /// Always "ok"
    pub status: String,
}

fn parse_role(value: Option<i32>) -> Result<Option<Role>, ApiError> {
    value
        .map(Role::try_from)
        .transpose()
        .map_err(ApiError::BadRequest)
}

/// Register a new account
///
/// # Endpoint
///
/// ```text
/// POST /auth/create
/// Content-Type: application/json
///
/// {
///   "username": "alice",
///   "email": "alice@example.com",
///   "password": "hunter2hunter2",
///   "first_name": "Alice",
///   "last_name": "Liddell",
///   "role": 3
/// }
/// ```
///
/// # Errors
///
/// - `409 Conflict`: Username already exists
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateAccountRequest>,
) -> ApiResult<Json<CreateAccountResponse>> {
    req.validate().map_err(validation_error)?;

    let role = parse_role(req.role)?.unwrap_or_default();
    let password_hash = password::hash_password(&req.password)?;

    let account = Account::create(
        &state.db,
        CreateAccount {
            username: req.username,
            password_hash,
            first_name: req.first_name,
            last_name: req.last_name,
            email: Some(req.email),
            role,
        },
    )
    .await?;

    publish_after_commit(&state.events, AccountEvent::Created(account.snapshot())).await;

    tracing::info!(public_id = %account.public_id, role = role.as_str(), "Account created");

    Ok(Json(CreateAccountResponse {
        user_id: account.id,
        public_id: account.public_id,
    }))
}

/// Mutate an existing account
///
/// Requires the target account's current stored token. The published update
/// event carries exactly the fields the caller supplied; the mirror treats
/// absent fields as "unchanged".
///
/// # Errors
///
/// - `401 Unauthorized`: Token is not the account's current stored token
/// - `404 Not Found`: No account with that id
pub async fn update(
    State(state): State<AppState>,
    Json(req): Json<UpdateAccountRequest>,
) -> ApiResult<Json<MutationResponse>> {
    req.validate().map_err(validation_error)?;

    let authorized = TokenRecord::verify_local(&state.db, req.user_id, &req.token).await?;
    if !authorized {
        return Err(ApiError::Unauthorized(
            "Could not validate credentials".to_string(),
        ));
    }

    let role = parse_role(req.role)?;

    let account = Account::update(
        &state.db,
        req.user_id,
        UpdateAccount {
            username: req.username.clone(),
            first_name: req.first_name.clone(),
            last_name: req.last_name.clone(),
            email: req.email.clone(),
            role,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

    publish_after_commit(
        &state.events,
        AccountEvent::Updated(AccountPayload {
            username: req.username,
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            role,
            user_public_id: account.public_id,
        }),
    )
    .await;

    tracing::info!(public_id = %account.public_id, "Account updated");

    Ok(Json(MutationResponse {
        status: "ok".to_string(),
    }))
}

/// Remove an account
///
/// Requires the target account's current stored token. The token row goes
/// with the account (ON DELETE CASCADE); the delete event carries the public
/// identity so the mirror can drop its row.
///
/// # Errors
///
/// - `401 Unauthorized`: Token is not the account's current stored token
/// - `404 Not Found`: No account with that id
pub async fn delete(
    State(state): State<AppState>,
    Json(req): Json<DeleteAccountRequest>,
) -> ApiResult<Json<MutationResponse>> {
    let authorized = TokenRecord::verify_local(&state.db, req.user_id, &req.token).await?;
    if !authorized {
        return Err(ApiError::Unauthorized(
            "Could not validate credentials".to_string(),
        ));
    }

    let public_id = Account::delete(&state.db, req.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

    publish_after_commit(&state.events, AccountEvent::Deleted { user_id: public_id }).await;

    tracing::info!(public_id = %public_id, "Account deleted");

    Ok(Json(MutationResponse {
        status: "ok".to_string(),
    }))
}
