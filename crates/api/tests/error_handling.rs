//! Verifies the `AppError` to HTTP response mapping.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;

use depot_api::error::AppError;
use depot_core::approval::{DocumentKey, DocumentStatus, DocumentType};
use depot_core::error::CoreError;
use depot_core::store::StoreError;
use depot_workflow::ApprovalError;

async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn key() -> DocumentKey {
    DocumentKey::new(42, DocumentType::Receipt)
}

#[tokio::test]
async fn workflow_conflicts_map_to_409() {
    let cases = [
        (ApprovalError::AlreadyPending(key()), "ALREADY_PENDING"),
        (ApprovalError::NoPendingApproval(key()), "NO_PENDING_APPROVAL"),
        (
            ApprovalError::InvalidState {
                key: key(),
                status: DocumentStatus::Approved,
                operation: "submit",
            },
            "INVALID_STATE",
        ),
        (
            ApprovalError::InsufficientStock {
                product_id: 1,
                on_hand: 3,
                delta: -5,
            },
            "INSUFFICIENT_STOCK",
        ),
    ];

    for (err, code) in cases {
        let (status, json) = render(err.into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["code"], code);
        assert!(!json["error"].as_str().unwrap().is_empty());
    }
}

#[tokio::test]
async fn access_errors_map_to_401_and_403() {
    let (status, json) = render(ApprovalError::Unauthenticated.into()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");

    let (status, json) =
        render(ApprovalError::Forbidden("Only the submitter may cancel".into()).into()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");
    assert_eq!(json["error"], "Only the submitter may cancel");
}

#[tokio::test]
async fn lookup_errors_map_to_400_and_404() {
    let (status, json) =
        render(ApprovalError::InvalidDocument("document id must be positive".into()).into()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");

    let (status, json) = render(ApprovalError::NotFound(key()).into()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn storage_errors_are_sanitized() {
    let err = ApprovalError::Storage(StoreError::Backend("connection reset by peer".into()));
    let (status, json) = render(err.into()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn core_and_request_errors() {
    let (status, json) = render(CoreError::Validation("bad type".into()).into()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");

    let (status, json) = render(AppError::BadRequest("malformed JSON".into())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");

    let (status, json) = render(
        CoreError::NotFound {
            entity: "approval_record",
            id: 9,
        }
        .into(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}
