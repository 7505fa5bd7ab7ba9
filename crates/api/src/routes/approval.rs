use axum::routing::get;
use axum::Router;

use crate::handlers::approval;
use crate::state::AppState;

/// Approval queue routes, nested under `/approvals`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pending", get(approval::list_pending))
        .route("/pending/count", get(approval::count_pending))
        .route("/mine", get(approval::list_mine))
        .route("/{id}", get(approval::get_approval))
}
