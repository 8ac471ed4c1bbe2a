/// Task endpoints
///
/// Privileged operations use two-factor authorization: the remote token
/// check confirms the caller's identity against the authentication service,
/// and the local role check confirms a privileged role in the mirror. Both
/// are fail-closed — an ambiguous answer denies with 403.
///
/// # Endpoints
///
/// - `POST /task_tracker/task/create` - Create and randomly assign a task
/// - `POST /task_tracker/task/check` - Probe both authorization factors
/// - `POST /task_tracker/task/reassign` - Redistribute every open task
/// - `POST /task_tracker/task/dashboard` - Reporting view

use crate::{
    app::AppState,
    assignment::{AssignmentError, ReassignSummary},
    error::{validation_error, ApiError, ApiResult},
    models::{mirror::MirroredAccount, task::DashboardRow},
};
use axum::{extract::State, Json};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// The caller's bearer token
    pub token: String,

    /// The caller's claimed public identity
    pub public_user_id: Uuid,

    /// Exact task cost
    pub cost: Decimal,

    /// What needs doing
    #[validate(length(min = 1, max = 2000, message = "Description must be 1-2000 characters"))]
    pub description: String,
}

/// Create task response
///
/// An empty eligible pool is a logged no-op, not an error: `assigned` is
/// false and no task exists.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTaskResponse {
    /// Whether a task was created and assigned
    pub assigned: bool,

    /// The new task's identity, when assigned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_public_id: Option<Uuid>,

    /// The assignee's identity, when assigned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_public_id: Option<Uuid>,
}

/// Authorization probe / reassign request
#[derive(Debug, Deserialize)]
pub struct AuthorizedRequest {
    /// The caller's bearer token
    pub token: String,

    /// The caller's claimed public identity
    pub public_user_id: Uuid,
}

/// Authorization probe response
#[derive(Debug, Serialize, Deserialize)]
pub struct CheckResponse {
    /// Always true on 200; failure is a 403
    pub authorized: bool,
}

/// Both authorization factors, fail-closed
///
/// Factor one: the authentication service confirms the token is live for
/// the identity. Factor two: the mirror shows a privileged role.
async fn require_privileged(
    state: &AppState,
    public_user_id: Uuid,
    token: &str,
) -> ApiResult<()> {
    if !state.auth.check_token(public_user_id, token).await {
        return Err(ApiError::Forbidden("Not authorized".to_string()));
    }

    let privileged = MirroredAccount::is_privileged(&state.db, public_user_id).await?;
    if !privileged {
        return Err(ApiError::Forbidden("Not authorized".to_string()));
    }

    Ok(())
}

/// Create a task
///
/// Requires a live token for the claimed identity; any caller who passes
/// the remote check may create. The assignee is drawn uniformly at random
/// from the eligible pool.
///
/// # Endpoint
///
/// ```text
/// POST /task_tracker/task/create
/// Content-Type: application/json
///
/// {
///   "token": "eyJ...",
///   "public_user_id": "uuid",
///   "cost": "10.00",
///   "description": "ship the release"
/// }
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: Remote token check failed (including any ambiguity)
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<Json<CreateTaskResponse>> {
    req.validate().map_err(validation_error)?;

    if req.cost.is_sign_negative() {
        return Err(ApiError::BadRequest("Cost must not be negative".to_string()));
    }

    if !state.auth.check_token(req.public_user_id, &req.token).await {
        return Err(ApiError::Forbidden("Not authorized".to_string()));
    }

    match state.engine.create_task(req.cost, &req.description).await {
        Ok(task) => Ok(Json(CreateTaskResponse {
            assigned: true,
            task_public_id: Some(task.public_id),
            assignee_public_id: Some(task.assignee_public_id),
        })),
        Err(AssignmentError::EmptyPool) => {
            tracing::warn!("Task creation requested with an empty eligible pool, no-op");
            Ok(Json(CreateTaskResponse {
                assigned: false,
                task_public_id: None,
                assignee_public_id: None,
            }))
        }
        Err(AssignmentError::Database(e)) => Err(e.into()),
    }
}

/// Probe both authorization factors
///
/// Returns 200 iff the caller's token is live AND their mirrored role is
/// privileged.
///
/// # Errors
///
/// - `403 Forbidden`: Either factor failed
pub async fn check(
    State(state): State<AppState>,
    Json(req): Json<AuthorizedRequest>,
) -> ApiResult<Json<CheckResponse>> {
    require_privileged(&state, req.public_user_id, &req.token).await?;

    Ok(Json(CheckResponse { authorized: true }))
}

/// Redistribute every open task
///
/// Gated like `check`: redistributing the whole board is the most
/// privileged operation the service has, so it demands both factors.
///
/// # Errors
///
/// - `403 Forbidden`: Either factor failed
pub async fn reassign(
    State(state): State<AppState>,
    Json(req): Json<AuthorizedRequest>,
) -> ApiResult<Json<ReassignSummary>> {
    require_privileged(&state, req.public_user_id, &req.token).await?;

    let summary = state.engine.reassign_open_tasks().await?;

    Ok(Json(summary))
}

/// Reporting view over every task
///
/// Joins each task with its assignee's mirror row, regardless of status.
/// No side effects, no authorization.
pub async fn dashboard(State(state): State<AppState>) -> ApiResult<Json<Vec<DashboardRow>>> {
    let rows = state.engine.dashboard().await?;

    Ok(Json(rows))
}
