//! Documents subject to approval and the stock effect each one carries.

use serde::{Deserialize, Serialize};

use crate::approval::{ApprovalRecord, DocumentKey, DocumentStatus, DocumentType, NewApproval};
use crate::types::{DbId, Timestamp};

/// A receipt, shipment or adjustment, as seen by the approval workflow.
///
/// Only the approval mirror fields are written by the workflow; everything
/// else is owned by the document CRUD layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: DbId,
    pub document_type: DocumentType,
    pub product_id: DbId,
    /// Units moved. Always positive for receipts and shipments; signed for
    /// adjustments.
    pub quantity: i64,
    pub approval_status: DocumentStatus,
    pub approver_id: Option<DbId>,
    pub decision_time: Option<Timestamp>,
    pub remark: Option<String>,
    pub flow_id: Option<String>,
}

impl Document {
    /// A freshly created document that has not been submitted yet.
    pub fn draft(id: DbId, document_type: DocumentType, product_id: DbId, quantity: i64) -> Self {
        Self {
            id,
            document_type,
            product_id,
            quantity,
            approval_status: DocumentStatus::Draft,
            approver_id: None,
            decision_time: None,
            remark: None,
            flow_id: None,
        }
    }

    pub fn key(&self) -> DocumentKey {
        DocumentKey::new(self.id, self.document_type)
    }

    /// Copy the ledger record's outcome onto the document.
    pub fn mirror(&mut self, record: &ApprovalRecord) {
        self.approval_status = record.status.into();
        self.approver_id = record.decider_id;
        self.decision_time = record.decision_time;
        self.remark = record.remark.clone();
        self.flow_id = Some(record.flow_id.clone());
    }

    /// Mirror a submission that storage has not assigned an id to yet.
    pub fn mirror_submission(&mut self, new: &NewApproval) {
        self.approval_status = DocumentStatus::Pending;
        self.approver_id = None;
        self.decision_time = None;
        self.remark = new.remark.clone();
        self.flow_id = Some(new.flow_id.clone());
    }

    /// The stock change this document causes once approved.
    pub fn stock_effect(&self) -> StockEffect {
        let delta = match self.document_type {
            DocumentType::Receipt => self.quantity,
            DocumentType::Shipment => -self.quantity,
            DocumentType::Adjustment => self.quantity,
        };
        StockEffect {
            product_id: self.product_id,
            delta,
        }
    }
}

/// A signed change to a product's on-hand quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockEffect {
    pub product_id: DbId,
    pub delta: i64,
}

impl StockEffect {
    /// Whether applying this effect to `on_hand` keeps stock non-negative.
    pub fn is_feasible(&self, on_hand: i64) -> bool {
        on_hand + self.delta >= 0
    }
}

/// A stocked product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: DbId,
    pub name: String,
    pub stock_qty: i64,
}
