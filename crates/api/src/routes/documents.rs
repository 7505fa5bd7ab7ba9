use axum::routing::{get, post};
use axum::Router;

use crate::handlers::documents;
use crate::state::AppState;

/// Document lifecycle routes, nested under `/documents`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{doc_type}/{id}/submit", post(documents::submit_document))
        .route("/{doc_type}/{id}/approve", post(documents::approve_document))
        .route("/{doc_type}/{id}/reject", post(documents::reject_document))
        .route("/{doc_type}/{id}/cancel", post(documents::cancel_document))
        .route("/{doc_type}/{id}/approvals", get(documents::document_history))
}
