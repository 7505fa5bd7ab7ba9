//! Storage and directory traits the approval workflow depends on.
//!
//! Each trait has a PostgreSQL implementation in `depot-db` and an in-memory
//! implementation in `depot-workflow` for tests and local runs.

use async_trait::async_trait;

use crate::approval::{ApprovalRecord, DocumentKey, DocumentType, NewApproval};
use crate::document::{Document, StockEffect};
use crate::paging::{Page, PageRequest};
use crate::roles::Role;
use crate::types::DbId;

/// Failure reported by a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness rule was violated (e.g. a second PENDING record).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The row to update does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A stock change would leave a product below zero.
    #[error("Insufficient stock for product {product_id}: on hand {on_hand}, change {delta}")]
    InsufficientStock {
        product_id: DbId,
        on_hand: i64,
        delta: i64,
    },

    /// Anything else the backend could not do.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Which pending records a query covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFilter {
    pub document_types: Vec<DocumentType>,
}

impl PendingFilter {
    /// Every document type that goes through approval.
    pub fn all_types() -> Self {
        Self {
            document_types: DocumentType::ALL.to_vec(),
        }
    }

    pub fn matches(&self, document_type: DocumentType) -> bool {
        self.document_types.contains(&document_type)
    }
}

/// Document-side changes that commit together with a ledger write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentWrite {
    /// The document with its approval mirror already updated.
    pub document: Document,
    /// Stock change to apply, if the transition carries one.
    pub effect: Option<StockEffect>,
}

impl DocumentWrite {
    pub fn mirror(document: Document) -> Self {
        Self {
            document,
            effect: None,
        }
    }

    pub fn with_effect(mut self, effect: Option<StockEffect>) -> Self {
        self.effect = effect;
        self
    }
}

/// Persistence façade over approval records. Holds no business rules.
///
/// The write methods take an optional [`DocumentWrite`]. When given, the
/// ledger change, the stock effect and the document mirror land as one unit
/// of work: if any part fails, none of it is written.
#[async_trait]
pub trait ApprovalLedger: Send + Sync {
    async fn find_by_id(&self, id: DbId) -> Result<Option<ApprovalRecord>, StoreError>;

    /// The single PENDING record for a document, if any.
    async fn find_pending(&self, key: DocumentKey) -> Result<Option<ApprovalRecord>, StoreError>;

    async fn exists_pending(&self, key: DocumentKey) -> Result<bool, StoreError>;

    /// Insert a PENDING record. Must fail with [`StoreError::Conflict`] when
    /// the document already has a PENDING record, even under concurrent
    /// inserts.
    async fn insert(
        &self,
        new: NewApproval,
        write: Option<&DocumentWrite>,
    ) -> Result<ApprovalRecord, StoreError>;

    /// Overwrite a PENDING record in place. Fails with
    /// [`StoreError::Conflict`] if the stored row has already left PENDING,
    /// so two racing decisions cannot both land. Fails with
    /// [`StoreError::InsufficientStock`] if the write's effect would drive
    /// stock negative.
    async fn update(
        &self,
        record: &ApprovalRecord,
        write: Option<&DocumentWrite>,
    ) -> Result<ApprovalRecord, StoreError>;

    /// All records for a document, newest submission first.
    async fn list_history(&self, key: DocumentKey) -> Result<Vec<ApprovalRecord>, StoreError>;

    /// PENDING records matching `filter`, newest submission first.
    async fn list_pending(
        &self,
        filter: &PendingFilter,
        page: PageRequest,
    ) -> Result<Page<ApprovalRecord>, StoreError>;

    async fn count_pending(&self, filter: &PendingFilter) -> Result<i64, StoreError>;

    /// Records submitted by a user in any status, newest first.
    async fn list_by_submitter(
        &self,
        submitter_id: DbId,
        page: PageRequest,
    ) -> Result<Page<ApprovalRecord>, StoreError>;
}

/// Read access to the documents that go through approval.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn load(&self, key: DocumentKey) -> Result<Option<Document>, StoreError>;
}

/// A user as the directory reports them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryUser {
    pub user_id: DbId,
    pub role: Role,
}

/// Read-only user directory used for notification fan-out.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// All active users whose role may decide approvals.
    async fn resolve_deciders(&self) -> Result<Vec<DirectoryUser>, StoreError>;

    /// Human-readable name for a user, if the user exists.
    async fn display_name(&self, user_id: DbId) -> Result<Option<String>, StoreError>;
}
