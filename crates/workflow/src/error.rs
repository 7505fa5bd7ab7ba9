use depot_core::approval::{DocumentKey, DocumentStatus};
use depot_core::store::StoreError;
use depot_core::types::DbId;

/// Errors returned by the approval engine and document adapters.
///
/// Every variant except [`ApprovalError::Storage`] is a business rejection
/// the caller can act on. `Storage` means the system could not process a
/// valid request.
#[derive(Debug, thiserror::Error)]
pub enum ApprovalError {
    #[error("Document {0} is already pending approval")]
    AlreadyPending(DocumentKey),

    #[error("No pending approval for document {0}")]
    NoPendingApproval(DocumentKey),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Invalid document reference: {0}")]
    InvalidDocument(String),

    #[error("Document {0} not found")]
    NotFound(DocumentKey),

    #[error("Document {key} is {status}, cannot {operation}")]
    InvalidState {
        key: DocumentKey,
        status: DocumentStatus,
        operation: &'static str,
    },

    #[error("Insufficient stock for product {product_id}: on hand {on_hand}, change {delta}")]
    InsufficientStock {
        product_id: DbId,
        on_hand: i64,
        delta: i64,
    },

    #[error("Storage error: {0}")]
    Storage(StoreError),
}

impl From<StoreError> for ApprovalError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InsufficientStock {
                product_id,
                on_hand,
                delta,
            } => ApprovalError::InsufficientStock {
                product_id,
                on_hand,
                delta,
            },
            other => ApprovalError::Storage(other),
        }
    }
}

/// Convenience type alias for workflow results.
pub type ApprovalResult<T> = Result<T, ApprovalError>;
