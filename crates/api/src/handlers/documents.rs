//! Handlers for the document approval lifecycle.
//!
//! Every mutation goes through [`DocumentService`](depot_workflow::DocumentService),
//! so the ledger, the document mirror and stock stay in step.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use depot_core::approval::{DocumentKey, DocumentType};
use depot_core::error::CoreError;
use depot_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Optional body for lifecycle calls: `{ "remark": "..." }`.
#[derive(Debug, Default, Deserialize)]
pub struct RemarkRequest {
    pub remark: Option<String>,
}

/// Build a document key from the `{doc_type}/{id}` path segments.
pub fn document_key(doc_type: &str, id: DbId) -> AppResult<DocumentKey> {
    let document_type = doc_type
        .parse::<DocumentType>()
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    Ok(DocumentKey::new(id, document_type))
}

/// An empty body means no remark.
fn parse_remark(body: &Bytes) -> AppResult<Option<String>> {
    if body.is_empty() {
        return Ok(None);
    }
    let request: RemarkRequest = serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))?;
    Ok(request.remark)
}

/// POST /api/v1/documents/{doc_type}/{id}/submit
///
/// Open a new approval for the document and alert online deciders.
pub async fn submit_document(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((doc_type, id)): Path<(String, DbId)>,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let key = document_key(&doc_type, id)?;
    let remark = parse_remark(&body)?;

    let transition = state
        .documents
        .submit(key, Some(&auth.actor()), remark)
        .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: transition })))
}

/// POST /api/v1/documents/{doc_type}/{id}/approve
pub async fn approve_document(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((doc_type, id)): Path<(String, DbId)>,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let key = document_key(&doc_type, id)?;
    let remark = parse_remark(&body)?;

    let transition = state
        .documents
        .approve(key, Some(&auth.actor()), remark)
        .await?;

    Ok(Json(DataResponse { data: transition }))
}

/// POST /api/v1/documents/{doc_type}/{id}/reject
pub async fn reject_document(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((doc_type, id)): Path<(String, DbId)>,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let key = document_key(&doc_type, id)?;
    let remark = parse_remark(&body)?;

    let transition = state
        .documents
        .reject(key, Some(&auth.actor()), remark)
        .await?;

    Ok(Json(DataResponse { data: transition }))
}

/// POST /api/v1/documents/{doc_type}/{id}/cancel
///
/// Only the original submitter may cancel.
pub async fn cancel_document(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((doc_type, id)): Path<(String, DbId)>,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let key = document_key(&doc_type, id)?;
    let remark = parse_remark(&body)?;

    let transition = state
        .documents
        .cancel(key, Some(&auth.actor()), remark)
        .await?;

    Ok(Json(DataResponse { data: transition }))
}

/// GET /api/v1/documents/{doc_type}/{id}/approvals
///
/// Full approval history of a document, newest first.
pub async fn document_history(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path((doc_type, id)): Path<(String, DbId)>,
) -> AppResult<impl IntoResponse> {
    let key = document_key(&doc_type, id)?;
    let history = state.documents.history(key).await?;
    Ok(Json(DataResponse { data: history }))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn path_type_is_case_insensitive() {
        let key = document_key("shipment", 3).unwrap();
        assert_eq!(key.document_type, DocumentType::Shipment);
        assert_eq!(key.document_id, 3);
    }

    #[test]
    fn unknown_path_type_is_a_validation_error() {
        assert_matches!(
            document_key("invoice", 1),
            Err(AppError::Core(CoreError::Validation(_)))
        );
    }

    #[test]
    fn remark_body_is_optional() {
        assert_eq!(parse_remark(&Bytes::new()).unwrap(), None);
        assert_eq!(
            parse_remark(&Bytes::from_static(br#"{"remark":"ok"}"#)).unwrap(),
            Some("ok".to_string())
        );
        assert_eq!(parse_remark(&Bytes::from_static(b"{}")).unwrap(), None);
        assert_matches!(
            parse_remark(&Bytes::from_static(b"not json")),
            Err(AppError::BadRequest(_))
        );
    }
}
