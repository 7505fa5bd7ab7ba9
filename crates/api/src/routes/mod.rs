pub mod approval;
pub mod documents;
pub mod health;
pub mod sessions;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws?token=                                   WebSocket (token in query)
///
/// /documents/{doc_type}/{id}/submit            submit (POST)
/// /documents/{doc_type}/{id}/approve           approve (POST, decider)
/// /documents/{doc_type}/{id}/reject            reject (POST, decider)
/// /documents/{doc_type}/{id}/cancel            cancel (POST, submitter)
/// /documents/{doc_type}/{id}/approvals         history (GET)
///
/// /approvals/pending                           pending queue (decider)
/// /approvals/pending/count                     pending count (decider)
/// /approvals/mine                              caller's submissions
/// /approvals/{id}                              one record by id
///
/// /sessions/online                             online session count (admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/documents", documents::router())
        .nest("/approvals", approval::router())
        .nest("/sessions", sessions::router())
}
