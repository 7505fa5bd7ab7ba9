//! Document and product rows.

use depot_core::approval::{DocumentStatus, DocumentType};
use depot_core::document::{Document, Product};
use depot_core::types::{DbId, Timestamp};
use sqlx::FromRow;

use super::RowDecodeError;

/// A row from `receipts`, `shipments` or `adjustments`. The three tables
/// share these columns; the type comes from the table that was queried.
#[derive(Debug, Clone, FromRow)]
pub struct DocumentRow {
    pub id: DbId,
    pub product_id: DbId,
    pub quantity: i64,
    pub approval_status: String,
    pub approver_id: Option<DbId>,
    pub decision_time: Option<Timestamp>,
    pub remark: Option<String>,
    pub flow_id: Option<String>,
}

impl DocumentRow {
    pub fn into_document(self, document_type: DocumentType) -> Result<Document, RowDecodeError> {
        let approval_status = self
            .approval_status
            .parse::<DocumentStatus>()
            .map_err(RowDecodeError)?;
        Ok(Document {
            id: self.id,
            document_type,
            product_id: self.product_id,
            quantity: self.quantity,
            approval_status,
            approver_id: self.approver_id,
            decision_time: self.decision_time,
            remark: self.remark,
            flow_id: self.flow_id,
        })
    }
}

/// A row from the `products` table.
#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
    pub id: DbId,
    pub name: String,
    pub stock_qty: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            stock_qty: row.stock_qty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_rows_become_draft_documents() {
        let row = DocumentRow {
            id: 3,
            product_id: 1,
            quantity: -2,
            approval_status: "DRAFT".into(),
            approver_id: None,
            decision_time: None,
            remark: None,
            flow_id: None,
        };
        let doc = row.into_document(DocumentType::Adjustment).unwrap();
        assert_eq!(doc.approval_status, DocumentStatus::Draft);
        assert_eq!(doc.stock_effect().delta, -2);
    }
}
