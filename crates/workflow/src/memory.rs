//! In-memory implementations of the storage and directory traits.
//!
//! Used by tests and by local runs without PostgreSQL. [`InMemoryStore`]
//! keeps ledger records, documents and stock behind a single `RwLock`, so a
//! ledger write and the document change riding on it happen under one write
//! guard.

use std::collections::HashMap;

use async_trait::async_trait;
use depot_core::approval::{ApprovalRecord, DocumentKey, NewApproval};
use depot_core::document::{Document, Product};
use depot_core::paging::{Page, PageRequest};
use depot_core::roles::{can_decide, Role};
use depot_core::store::{
    ApprovalLedger, DirectoryUser, DocumentStore, DocumentWrite, PendingFilter, StoreError,
    UserDirectory,
};
use depot_core::types::DbId;
use tokio::sync::RwLock;

// ---------------------------------------------------------------------------
// Ledger and documents
// ---------------------------------------------------------------------------

#[derive(Default)]
struct StoreState {
    next_id: DbId,
    records: Vec<ApprovalRecord>,
    documents: HashMap<DocumentKey, Document>,
    products: HashMap<DbId, Product>,
}

impl StoreState {
    fn pending(&self, key: DocumentKey) -> Option<&ApprovalRecord> {
        self.records
            .iter()
            .find(|r| r.key() == key && r.is_pending())
    }

    /// Apply a document write. Every check runs before the first mutation,
    /// so an error leaves the state untouched.
    fn apply(&mut self, write: &DocumentWrite) -> Result<(), StoreError> {
        let key = write.document.key();
        if !self.documents.contains_key(&key) {
            return Err(StoreError::NotFound(format!("document {key}")));
        }

        if let Some(effect) = write.effect {
            let product = self
                .products
                .get_mut(&effect.product_id)
                .ok_or_else(|| StoreError::NotFound(format!("product {}", effect.product_id)))?;
            if !effect.is_feasible(product.stock_qty) {
                return Err(StoreError::InsufficientStock {
                    product_id: effect.product_id,
                    on_hand: product.stock_qty,
                    delta: effect.delta,
                });
            }
            product.stock_qty += effect.delta;
        }

        self.documents.insert(key, write.document.clone());
        Ok(())
    }
}

/// Newest submission first, id as tie-breaker.
fn newest_first(records: &mut [ApprovalRecord]) {
    records.sort_by(|a, b| b.submit_time.cmp(&a.submit_time).then(b.id.cmp(&a.id)));
}

fn paginate(mut records: Vec<ApprovalRecord>, page: PageRequest) -> Page<ApprovalRecord> {
    newest_first(&mut records);
    let total = records.len() as i64;
    let items = records
        .into_iter()
        .skip(page.offset as usize)
        .take(page.limit as usize)
        .collect();
    Page::new(items, total, page)
}

/// Ledger and document store in one. Hand the same `Arc` to both the engine
/// and the document service.
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_product(&self, product: Product) {
        self.state.write().await.products.insert(product.id, product);
    }

    pub async fn insert_document(&self, document: Document) {
        self.state
            .write()
            .await
            .documents
            .insert(document.key(), document);
    }

    pub async fn document(&self, key: DocumentKey) -> Option<Document> {
        self.state.read().await.documents.get(&key).cloned()
    }

    pub async fn stock(&self, product_id: DbId) -> Option<i64> {
        self.state
            .read()
            .await
            .products
            .get(&product_id)
            .map(|p| p.stock_qty)
    }

    /// Number of approval records in any status.
    pub async fn record_count(&self) -> usize {
        self.state.read().await.records.len()
    }
}

#[async_trait]
impl ApprovalLedger for InMemoryStore {
    async fn find_by_id(&self, id: DbId) -> Result<Option<ApprovalRecord>, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .records
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn find_pending(&self, key: DocumentKey) -> Result<Option<ApprovalRecord>, StoreError> {
        Ok(self.state.read().await.pending(key).cloned())
    }

    async fn exists_pending(&self, key: DocumentKey) -> Result<bool, StoreError> {
        Ok(self.state.read().await.pending(key).is_some())
    }

    async fn insert(
        &self,
        new: NewApproval,
        write: Option<&DocumentWrite>,
    ) -> Result<ApprovalRecord, StoreError> {
        let mut state = self.state.write().await;
        if state.pending(new.key).is_some() {
            return Err(StoreError::Conflict(format!(
                "document {} already has a pending approval",
                new.key
            )));
        }
        if let Some(write) = write {
            state.apply(write)?;
        }
        state.next_id += 1;
        let record = new.into_record(state.next_id);
        state.records.push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        record: &ApprovalRecord,
        write: Option<&DocumentWrite>,
    ) -> Result<ApprovalRecord, StoreError> {
        let mut state = self.state.write().await;
        let index = state
            .records
            .iter()
            .position(|r| r.id == record.id && r.is_pending())
            .ok_or_else(|| {
                StoreError::Conflict(format!("approval record {} is no longer pending", record.id))
            })?;
        if let Some(write) = write {
            state.apply(write)?;
        }
        state.records[index] = record.clone();
        Ok(record.clone())
    }

    async fn list_history(&self, key: DocumentKey) -> Result<Vec<ApprovalRecord>, StoreError> {
        let mut records: Vec<ApprovalRecord> = self
            .state
            .read()
            .await
            .records
            .iter()
            .filter(|r| r.key() == key)
            .cloned()
            .collect();
        newest_first(&mut records);
        Ok(records)
    }

    async fn list_pending(
        &self,
        filter: &PendingFilter,
        page: PageRequest,
    ) -> Result<Page<ApprovalRecord>, StoreError> {
        let records = self
            .state
            .read()
            .await
            .records
            .iter()
            .filter(|r| r.is_pending() && filter.matches(r.document_type))
            .cloned()
            .collect();
        Ok(paginate(records, page))
    }

    async fn count_pending(&self, filter: &PendingFilter) -> Result<i64, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .records
            .iter()
            .filter(|r| r.is_pending() && filter.matches(r.document_type))
            .count() as i64)
    }

    async fn list_by_submitter(
        &self,
        submitter_id: DbId,
        page: PageRequest,
    ) -> Result<Page<ApprovalRecord>, StoreError> {
        let records = self
            .state
            .read()
            .await
            .records
            .iter()
            .filter(|r| r.submitter_id == submitter_id)
            .cloned()
            .collect();
        Ok(paginate(records, page))
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn load(&self, key: DocumentKey) -> Result<Option<Document>, StoreError> {
        Ok(self.document(key).await)
    }
}

// ---------------------------------------------------------------------------
// Directory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct DirectoryEntry {
    role: Role,
    display_name: String,
    is_active: bool,
}

#[derive(Default)]
pub struct InMemoryDirectory {
    users: RwLock<HashMap<DbId, DirectoryEntry>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, user_id: DbId, role: Role, display_name: impl Into<String>) {
        self.users.write().await.insert(
            user_id,
            DirectoryEntry {
                role,
                display_name: display_name.into(),
                is_active: true,
            },
        );
    }

    /// Keep the user but exclude them from decider resolution.
    pub async fn deactivate(&self, user_id: DbId) {
        if let Some(entry) = self.users.write().await.get_mut(&user_id) {
            entry.is_active = false;
        }
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn resolve_deciders(&self) -> Result<Vec<DirectoryUser>, StoreError> {
        let mut deciders: Vec<DirectoryUser> = self
            .users
            .read()
            .await
            .iter()
            .filter(|(_, e)| e.is_active && can_decide(e.role))
            .map(|(id, e)| DirectoryUser {
                user_id: *id,
                role: e.role,
            })
            .collect();
        deciders.sort_by_key(|u| u.user_id);
        Ok(deciders)
    }

    async fn display_name(&self, user_id: DbId) -> Result<Option<String>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .get(&user_id)
            .map(|e| e.display_name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use depot_core::approval::{Decision, DocumentStatus, DocumentType, NewApproval};

    use super::*;

    fn key(id: DbId) -> DocumentKey {
        DocumentKey::new(id, DocumentType::Receipt)
    }

    #[tokio::test]
    async fn conditional_insert_rejects_second_pending() {
        let store = InMemoryStore::new();
        store
            .insert(NewApproval::submit(key(1), 7, None), None)
            .await
            .unwrap();

        let second = store.insert(NewApproval::submit(key(1), 8, None), None).await;
        assert_matches!(second, Err(StoreError::Conflict(_)));

        // A different document type with the same id is a different key.
        let shipment = DocumentKey::new(1, DocumentType::Shipment);
        assert!(store
            .insert(NewApproval::submit(shipment, 7, None), None)
            .await
            .is_ok());
        assert_eq!(store.record_count().await, 2);
    }

    #[tokio::test]
    async fn update_refuses_terminal_records() {
        let store = InMemoryStore::new();
        let mut record = store
            .insert(NewApproval::submit(key(1), 7, None), None)
            .await
            .unwrap();
        record.cancel(None).unwrap();
        store.update(&record, None).await.unwrap();

        assert_matches!(store.update(&record, None).await, Err(StoreError::Conflict(_)));
        assert_eq!(
            store.find_by_id(record.id).await.unwrap().unwrap().status,
            record.status
        );
    }

    #[tokio::test]
    async fn refused_effect_leaves_ledger_document_and_stock_untouched() {
        let store = InMemoryStore::new();
        store
            .insert_product(Product {
                id: 1,
                name: "Pallet".into(),
                stock_qty: 3,
            })
            .await;
        let mut doc = Document::draft(5, DocumentType::Shipment, 1, 4);
        store.insert_document(doc.clone()).await;

        let new = NewApproval::submit(doc.key(), 7, None);
        doc.mirror_submission(&new);
        let pending = store
            .insert(new, Some(&DocumentWrite::mirror(doc.clone())))
            .await
            .unwrap();

        let mut approved = pending.clone();
        approved
            .decide(Decision::Approve, 2, Some("go".into()), chrono::Utc::now())
            .unwrap();
        let mut mirrored = doc.clone();
        mirrored.mirror(&approved);
        let write = DocumentWrite::mirror(mirrored).with_effect(Some(doc.stock_effect()));

        let result = store.update(&approved, Some(&write)).await;

        assert_matches!(result, Err(StoreError::InsufficientStock { on_hand: 3, delta: -4, .. }));
        assert_eq!(store.stock(1).await, Some(3));
        assert_eq!(store.find_pending(doc.key()).await.unwrap(), Some(pending));
        let stored = store.document(doc.key()).await.unwrap();
        assert_eq!(stored.approval_status, DocumentStatus::Pending);
        assert!(stored.remark.is_none());
    }

    #[tokio::test]
    async fn write_for_missing_document_inserts_nothing() {
        let store = InMemoryStore::new();
        let doc = Document::draft(9, DocumentType::Receipt, 1, 1);

        let result = store
            .insert(
                NewApproval::submit(doc.key(), 7, None),
                Some(&DocumentWrite::mirror(doc.clone())),
            )
            .await;

        assert_matches!(result, Err(StoreError::NotFound(_)));
        assert_eq!(store.record_count().await, 0);
    }

    #[tokio::test]
    async fn directory_skips_inactive_and_non_deciders() {
        let directory = InMemoryDirectory::new();
        directory.add_user(1, Role::Admin, "Ada").await;
        directory.add_user(2, Role::WarehouseKeeper, "Kim").await;
        directory.add_user(3, Role::Employee, "Sam").await;
        directory.deactivate(2).await;

        let deciders = directory.resolve_deciders().await.unwrap();
        assert_eq!(deciders.len(), 1);
        assert_eq!(deciders[0].user_id, 1);
        assert_eq!(
            directory.display_name(3).await.unwrap().as_deref(),
            Some("Sam")
        );
    }
}
