//! Repository for the three document tables.
//!
//! `receipts`, `shipments` and `adjustments` share their approval columns, so
//! one repository serves all three and picks the table from the
//! [`DocumentType`].

use depot_core::approval::{DocumentKey, DocumentType};
use depot_core::document::Document;
use sqlx::{PgExecutor, PgPool};

use crate::models::document::DocumentRow;

const COLUMNS: &str =
    "id, product_id, quantity, approval_status, approver_id, decision_time, remark, flow_id";

/// Table holding documents of the given type.
pub fn table_for(document_type: DocumentType) -> &'static str {
    match document_type {
        DocumentType::Receipt => "receipts",
        DocumentType::Shipment => "shipments",
        DocumentType::Adjustment => "adjustments",
    }
}

pub struct DocumentRepo;

impl DocumentRepo {
    pub async fn find(pool: &PgPool, key: DocumentKey) -> Result<Option<DocumentRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {} WHERE id = $1",
            table_for(key.document_type)
        );
        sqlx::query_as::<_, DocumentRow>(&query)
            .bind(key.document_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a draft document, returning the created row.
    pub async fn create_draft(
        pool: &PgPool,
        document_type: DocumentType,
        product_id: i64,
        quantity: i64,
    ) -> Result<DocumentRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO {} (product_id, quantity) VALUES ($1, $2) RETURNING {COLUMNS}",
            table_for(document_type)
        );
        sqlx::query_as::<_, DocumentRow>(&query)
            .bind(product_id)
            .bind(quantity)
            .fetch_one(pool)
            .await
    }

    /// Write the approval mirror columns. Returns the number of rows
    /// updated (0 if the document no longer exists).
    pub async fn update_mirror<'e>(
        executor: impl PgExecutor<'e>,
        document: &Document,
    ) -> Result<u64, sqlx::Error> {
        let query = format!(
            "UPDATE {}
             SET approval_status = $2, approver_id = $3, decision_time = $4,
                 remark = $5, flow_id = $6, updated_at = now()
             WHERE id = $1",
            table_for(document.document_type)
        );
        let result = sqlx::query(&query)
            .bind(document.id)
            .bind(document.approval_status.as_str())
            .bind(document.approver_id)
            .bind(document.decision_time)
            .bind(&document.remark)
            .bind(&document.flow_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
