use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct OnlineSessions {
    pub count: usize,
}

/// GET /api/v1/sessions/online
///
/// Number of users with a live WebSocket session. Admin only.
pub async fn online_sessions(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let count = state.sessions.count().await;
    Ok(Json(DataResponse {
        data: OnlineSessions { count },
    }))
}
