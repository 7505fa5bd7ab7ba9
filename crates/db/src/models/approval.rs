//! Approval record rows.

use depot_core::approval::{ApprovalRecord, ApprovalStatus, DocumentType};
use depot_core::types::{DbId, Timestamp};
use sqlx::FromRow;

use super::RowDecodeError;

/// A row from the `approval_records` table.
#[derive(Debug, Clone, FromRow)]
pub struct ApprovalRecordRow {
    pub id: DbId,
    pub document_id: DbId,
    pub document_type: String,
    pub status: String,
    pub submitter_id: DbId,
    pub submit_time: Timestamp,
    pub decider_id: Option<DbId>,
    pub decision_time: Option<Timestamp>,
    pub remark: Option<String>,
    pub flow_id: String,
    pub step_order: i32,
}

impl TryFrom<ApprovalRecordRow> for ApprovalRecord {
    type Error = RowDecodeError;

    fn try_from(row: ApprovalRecordRow) -> Result<Self, Self::Error> {
        let document_type = row
            .document_type
            .parse::<DocumentType>()
            .map_err(RowDecodeError)?;
        let status = row.status.parse::<ApprovalStatus>().map_err(RowDecodeError)?;
        Ok(ApprovalRecord {
            id: row.id,
            document_id: row.document_id,
            document_type,
            status,
            submitter_id: row.submitter_id,
            submit_time: row.submit_time,
            decider_id: row.decider_id,
            decision_time: row.decision_time,
            remark: row.remark,
            flow_id: row.flow_id,
            step_order: row.step_order,
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn row(document_type: &str, status: &str) -> ApprovalRecordRow {
        ApprovalRecordRow {
            id: 1,
            document_id: 42,
            document_type: document_type.into(),
            status: status.into(),
            submitter_id: 7,
            submit_time: chrono::Utc::now(),
            decider_id: None,
            decision_time: None,
            remark: None,
            flow_id: "FLOW-0A1B2C3D".into(),
            step_order: 1,
        }
    }

    #[test]
    fn converts_known_enum_text() {
        let record = ApprovalRecord::try_from(row("SHIPMENT", "PENDING")).unwrap();
        assert_eq!(record.document_type, DocumentType::Shipment);
        assert!(record.is_pending());
    }

    #[test]
    fn rejects_unknown_status() {
        assert_matches!(
            ApprovalRecord::try_from(row("RECEIPT", "ON_HOLD")),
            Err(RowDecodeError(_))
        );
    }
}
