//! PostgreSQL implementations of the `depot-core` storage traits.

use async_trait::async_trait;
use depot_core::approval::{ApprovalRecord, DocumentKey, NewApproval};
use depot_core::document::Document;
use depot_core::paging::{Page, PageRequest};
use depot_core::roles::{can_decide, Role};
use depot_core::store::{
    ApprovalLedger, DirectoryUser, DocumentStore, DocumentWrite, PendingFilter, StoreError,
    UserDirectory,
};
use depot_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::approval::ApprovalRecordRow;
use crate::repositories::{ApprovalRecordRepo, DocumentRepo, ProductRepo, UserRepo};

/// PostgreSQL unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Map a sqlx error onto the storage error vocabulary.
///
/// Violations of `uq_`-prefixed constraints become [`StoreError::Conflict`];
/// everything else is logged and reported as a backend failure.
pub fn store_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::RowNotFound => StoreError::NotFound("row".into()),
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            let constraint = db_err.constraint().unwrap_or("unknown");
            if constraint.starts_with("uq_") {
                StoreError::Conflict(format!("Duplicate value violates {constraint}"))
            } else {
                tracing::error!(error = %db_err, "Unexpected unique violation");
                StoreError::Backend(db_err.to_string())
            }
        }
        other => {
            tracing::error!(error = %other, "Database error");
            StoreError::Backend(other.to_string())
        }
    }
}

fn decode_all(rows: Vec<ApprovalRecordRow>) -> Result<Vec<ApprovalRecord>, StoreError> {
    rows.into_iter()
        .map(|row| ApprovalRecord::try_from(row).map_err(StoreError::from))
        .collect()
}

fn type_names(filter: &PendingFilter) -> Vec<String> {
    filter
        .document_types
        .iter()
        .map(|t| t.as_str().to_string())
        .collect()
}

/// Apply the stock effect and the mirror of `write` on an open transaction.
///
/// On error the caller's transaction is left uncommitted and rolls back when
/// dropped, taking the ledger change with it.
async fn write_document(conn: &mut PgConnection, write: &DocumentWrite) -> Result<(), StoreError> {
    if let Some(effect) = write.effect {
        let applied = ProductRepo::apply_delta(&mut *conn, effect.product_id, effect.delta)
            .await
            .map_err(store_error)?;
        if applied.is_none() {
            let on_hand = ProductRepo::find_stock(&mut *conn, effect.product_id)
                .await
                .map_err(store_error)?
                .ok_or_else(|| StoreError::NotFound(format!("product {}", effect.product_id)))?;
            return Err(StoreError::InsufficientStock {
                product_id: effect.product_id,
                on_hand,
                delta: effect.delta,
            });
        }
    }

    let updated = DocumentRepo::update_mirror(&mut *conn, &write.document)
        .await
        .map_err(store_error)?;
    if updated == 0 {
        return Err(StoreError::NotFound(format!("document {}", write.document.key())));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Approval ledger over the `approval_records` table.
#[derive(Clone)]
pub struct PgApprovalLedger {
    pool: PgPool,
}

impl PgApprovalLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApprovalLedger for PgApprovalLedger {
    async fn find_by_id(&self, id: DbId) -> Result<Option<ApprovalRecord>, StoreError> {
        ApprovalRecordRepo::find_by_id(&self.pool, id)
            .await
            .map_err(store_error)?
            .map(|row| ApprovalRecord::try_from(row).map_err(StoreError::from))
            .transpose()
    }

    async fn find_pending(&self, key: DocumentKey) -> Result<Option<ApprovalRecord>, StoreError> {
        ApprovalRecordRepo::find_pending(&self.pool, key)
            .await
            .map_err(store_error)?
            .map(|row| ApprovalRecord::try_from(row).map_err(StoreError::from))
            .transpose()
    }

    async fn exists_pending(&self, key: DocumentKey) -> Result<bool, StoreError> {
        ApprovalRecordRepo::exists_pending(&self.pool, key)
            .await
            .map_err(store_error)
    }

    async fn insert(
        &self,
        new: NewApproval,
        write: Option<&DocumentWrite>,
    ) -> Result<ApprovalRecord, StoreError> {
        // Dropping the transaction on an early return rolls it back.
        let mut tx = self.pool.begin().await.map_err(store_error)?;
        let row = ApprovalRecordRepo::insert(&mut *tx, &new)
            .await
            .map_err(store_error)?;
        if let Some(write) = write {
            write_document(&mut tx, write).await?;
        }
        tx.commit().await.map_err(store_error)?;
        Ok(ApprovalRecord::try_from(row)?)
    }

    async fn update(
        &self,
        record: &ApprovalRecord,
        write: Option<&DocumentWrite>,
    ) -> Result<ApprovalRecord, StoreError> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;
        let row = ApprovalRecordRepo::update_pending(&mut *tx, record)
            .await
            .map_err(store_error)?
            .ok_or_else(|| {
                StoreError::Conflict(format!("approval record {} is no longer pending", record.id))
            })?;
        if let Some(write) = write {
            write_document(&mut tx, write).await?;
        }
        tx.commit().await.map_err(store_error)?;
        Ok(ApprovalRecord::try_from(row)?)
    }

    async fn list_history(&self, key: DocumentKey) -> Result<Vec<ApprovalRecord>, StoreError> {
        let rows = ApprovalRecordRepo::list_for_document(&self.pool, key)
            .await
            .map_err(store_error)?;
        decode_all(rows)
    }

    async fn list_pending(
        &self,
        filter: &PendingFilter,
        page: PageRequest,
    ) -> Result<Page<ApprovalRecord>, StoreError> {
        let types = type_names(filter);
        let rows = ApprovalRecordRepo::list_pending(&self.pool, &types, page.limit, page.offset)
            .await
            .map_err(store_error)?;
        let total = ApprovalRecordRepo::count_pending(&self.pool, &types)
            .await
            .map_err(store_error)?;
        Ok(Page::new(decode_all(rows)?, total, page))
    }

    async fn count_pending(&self, filter: &PendingFilter) -> Result<i64, StoreError> {
        ApprovalRecordRepo::count_pending(&self.pool, &type_names(filter))
            .await
            .map_err(store_error)
    }

    async fn list_by_submitter(
        &self,
        submitter_id: DbId,
        page: PageRequest,
    ) -> Result<Page<ApprovalRecord>, StoreError> {
        let rows =
            ApprovalRecordRepo::list_by_submitter(&self.pool, submitter_id, page.limit, page.offset)
                .await
                .map_err(store_error)?;
        let total = ApprovalRecordRepo::count_by_submitter(&self.pool, submitter_id)
            .await
            .map_err(store_error)?;
        Ok(Page::new(decode_all(rows)?, total, page))
    }
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// Read access to the receipt, shipment and adjustment tables. Writes go
/// through [`PgApprovalLedger`] so they share its transaction.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn load(&self, key: DocumentKey) -> Result<Option<Document>, StoreError> {
        DocumentRepo::find(&self.pool, key)
            .await
            .map_err(store_error)?
            .map(|row| row.into_document(key.document_type).map_err(StoreError::from))
            .transpose()
    }
}

// ---------------------------------------------------------------------------
// Directory
// ---------------------------------------------------------------------------

/// User directory over the `users` table.
#[derive(Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn resolve_deciders(&self) -> Result<Vec<DirectoryUser>, StoreError> {
        let roles: Vec<String> = [Role::Admin, Role::WarehouseKeeper, Role::Employee]
            .into_iter()
            .filter(|r| can_decide(*r))
            .map(|r| r.as_str().to_string())
            .collect();
        let users = UserRepo::list_active_by_roles(&self.pool, &roles)
            .await
            .map_err(store_error)?;
        users
            .into_iter()
            .map(|u| DirectoryUser::try_from(u).map_err(StoreError::from))
            .collect()
    }

    async fn display_name(&self, user_id: DbId) -> Result<Option<String>, StoreError> {
        Ok(UserRepo::find_by_id(&self.pool, user_id)
            .await
            .map_err(store_error)?
            .map(|u| u.display_name))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        assert_matches!(store_error(sqlx::Error::RowNotFound), StoreError::NotFound(_));
    }

    #[test]
    fn other_errors_map_to_backend() {
        assert_matches!(store_error(sqlx::Error::PoolTimedOut), StoreError::Backend(_));
    }
}
