//! Handlers for the approval queues.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use depot_core::error::CoreError;
use depot_core::paging::PageRequest;
use depot_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireDecider;
use crate::query::PaginationParams;
use crate::response::{CountResponse, DataResponse};
use crate::state::AppState;

/// GET /api/v1/approvals/pending
///
/// Pending approvals across all document types, newest first. Deciders only.
pub async fn list_pending(
    RequireDecider(user): RequireDecider,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let page = state
        .engine
        .pending_queue(Some(&user.actor()), PageRequest::from(params))
        .await?;
    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/approvals/pending/count
pub async fn count_pending(
    RequireDecider(user): RequireDecider,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let count = state.engine.pending_count_for(&user.actor()).await?;
    Ok(Json(DataResponse {
        data: CountResponse { count },
    }))
}

/// GET /api/v1/approvals/mine
///
/// The caller's own submissions in any status.
pub async fn list_mine(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let page = state
        .engine
        .submissions(&auth.actor(), PageRequest::from(params))
        .await?;
    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/approvals/{id}
///
/// One approval record by id, in any status.
pub async fn get_approval(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let record = state
        .engine
        .record(id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "approval_record",
            id,
        }))?;
    Ok(Json(DataResponse { data: record }))
}
