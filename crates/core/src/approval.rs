//! Approval state machine types.
//!
//! An [`ApprovalRecord`] tracks one submit → decide cycle for a single
//! document, keyed by `(document_id, document_type)`. Records are mutated in
//! place at decision time; once a record leaves [`ApprovalStatus::Pending`] it
//! never changes again.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::roles::Role;
use crate::types::{DbId, Timestamp};

/// Prefix of every generated flow id.
pub const FLOW_ID_PREFIX: &str = "FLOW-";

/// Number of hex characters following [`FLOW_ID_PREFIX`].
const FLOW_ID_HEX_LEN: usize = 8;

/// Multi-step flows are not modelled; every record is step 1.
pub const DEFAULT_STEP_ORDER: i32 = 1;

// ---------------------------------------------------------------------------
// DocumentType
// ---------------------------------------------------------------------------

/// The kinds of business document that go through approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    Receipt,
    Shipment,
    Adjustment,
}

impl DocumentType {
    /// Every document type subject to approval.
    pub const ALL: [DocumentType; 3] = [
        DocumentType::Receipt,
        DocumentType::Shipment,
        DocumentType::Adjustment,
    ];

    /// Stored and wire representation (`"RECEIPT"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentType::Receipt => "RECEIPT",
            DocumentType::Shipment => "SHIPMENT",
            DocumentType::Adjustment => "ADJUSTMENT",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = String;

    /// Case-insensitive, so both `"RECEIPT"` and the path form `"receipt"`
    /// parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!("Invalid document type '{s}'. Must be one of: receipt, shipment, adjustment")
            })
    }
}

// ---------------------------------------------------------------------------
// ApprovalStatus
// ---------------------------------------------------------------------------

/// Status of a ledger record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl ApprovalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "PENDING",
            ApprovalStatus::Approved => "APPROVED",
            ApprovalStatus::Rejected => "REJECTED",
            ApprovalStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, ApprovalStatus::Pending)
    }

    /// Whether this status records a decision (and therefore a decider).
    pub fn is_decision(self) -> bool {
        matches!(self, ApprovalStatus::Approved | ApprovalStatus::Rejected)
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApprovalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(ApprovalStatus::Pending),
            "APPROVED" => Ok(ApprovalStatus::Approved),
            "REJECTED" => Ok(ApprovalStatus::Rejected),
            "CANCELLED" => Ok(ApprovalStatus::Cancelled),
            other => Err(format!("Unknown approval status '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// DocumentStatus
// ---------------------------------------------------------------------------

/// Approval status mirrored onto a document. A superset of
/// [`ApprovalStatus`] that adds the pre-submission `Draft` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Draft,
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl DocumentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentStatus::Draft => "DRAFT",
            DocumentStatus::Pending => "PENDING",
            DocumentStatus::Approved => "APPROVED",
            DocumentStatus::Rejected => "REJECTED",
            DocumentStatus::Cancelled => "CANCELLED",
        }
    }

    /// A document may (re)enter the approval cycle from these states.
    pub fn is_submittable(self) -> bool {
        matches!(
            self,
            DocumentStatus::Draft | DocumentStatus::Rejected | DocumentStatus::Cancelled
        )
    }
}

impl From<ApprovalStatus> for DocumentStatus {
    fn from(status: ApprovalStatus) -> Self {
        match status {
            ApprovalStatus::Pending => DocumentStatus::Pending,
            ApprovalStatus::Approved => DocumentStatus::Approved,
            ApprovalStatus::Rejected => DocumentStatus::Rejected,
            ApprovalStatus::Cancelled => DocumentStatus::Cancelled,
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(DocumentStatus::Draft),
            other => other.parse::<ApprovalStatus>().map(DocumentStatus::from),
        }
    }
}

// ---------------------------------------------------------------------------
// Keys and actors
// ---------------------------------------------------------------------------

/// Identity of a document under approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentKey {
    pub document_id: DbId,
    pub document_type: DocumentType,
}

impl DocumentKey {
    pub fn new(document_id: DbId, document_type: DocumentType) -> Self {
        Self {
            document_id,
            document_type,
        }
    }

    /// Ids are BIGSERIAL, so anything below 1 cannot reference a document.
    pub fn is_valid(&self) -> bool {
        self.document_id > 0
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.document_type, self.document_id)
    }
}

/// The caller of a workflow operation. Always passed explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: DbId,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: DbId, role: Role) -> Self {
        Self { user_id, role }
    }
}

// ---------------------------------------------------------------------------
// ApprovalRecord
// ---------------------------------------------------------------------------

/// A ledger entry: one submission and its eventual outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRecord {
    pub id: DbId,
    pub document_id: DbId,
    pub document_type: DocumentType,
    pub status: ApprovalStatus,
    pub submitter_id: DbId,
    pub submit_time: Timestamp,
    pub decider_id: Option<DbId>,
    pub decision_time: Option<Timestamp>,
    pub remark: Option<String>,
    pub flow_id: String,
    pub step_order: i32,
}

/// A not-yet-persisted PENDING record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApproval {
    pub key: DocumentKey,
    pub submitter_id: DbId,
    pub submit_time: Timestamp,
    pub remark: Option<String>,
    pub flow_id: String,
}

impl NewApproval {
    /// Build a fresh submission with a newly generated flow id.
    pub fn submit(key: DocumentKey, submitter_id: DbId, remark: Option<String>) -> Self {
        Self {
            key,
            submitter_id,
            submit_time: chrono::Utc::now(),
            remark,
            flow_id: generate_flow_id(),
        }
    }

    /// Materialize the record once storage has assigned an id.
    pub fn into_record(self, id: DbId) -> ApprovalRecord {
        ApprovalRecord {
            id,
            document_id: self.key.document_id,
            document_type: self.key.document_type,
            status: ApprovalStatus::Pending,
            submitter_id: self.submitter_id,
            submit_time: self.submit_time,
            decider_id: None,
            decision_time: None,
            remark: self.remark,
            flow_id: self.flow_id,
            step_order: DEFAULT_STEP_ORDER,
        }
    }
}

/// Attempted to move a record that has already left PENDING.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Approval record {id} is already {status}")]
pub struct TerminalRecord {
    pub id: DbId,
    pub status: ApprovalStatus,
}

impl ApprovalRecord {
    pub fn key(&self) -> DocumentKey {
        DocumentKey::new(self.document_id, self.document_type)
    }

    pub fn is_pending(&self) -> bool {
        self.status == ApprovalStatus::Pending
    }

    /// Record an approve or reject decision. The remark replaces whatever
    /// was given at submission.
    pub fn decide(
        &mut self,
        outcome: Decision,
        decider_id: DbId,
        remark: Option<String>,
        at: Timestamp,
    ) -> Result<(), TerminalRecord> {
        self.ensure_pending()?;
        self.status = outcome.status();
        self.decider_id = Some(decider_id);
        self.decision_time = Some(at);
        self.remark = remark;
        Ok(())
    }

    /// Withdraw the submission. Leaves decider and decision time unset.
    pub fn cancel(&mut self, remark: Option<String>) -> Result<(), TerminalRecord> {
        self.ensure_pending()?;
        self.status = ApprovalStatus::Cancelled;
        self.remark = remark;
        Ok(())
    }

    fn ensure_pending(&self) -> Result<(), TerminalRecord> {
        if self.status.is_terminal() {
            return Err(TerminalRecord {
                id: self.id,
                status: self.status,
            });
        }
        Ok(())
    }
}

/// The two outcomes a decider can choose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn status(self) -> ApprovalStatus {
        match self {
            Decision::Approve => ApprovalStatus::Approved,
            Decision::Reject => ApprovalStatus::Rejected,
        }
    }
}

/// Generate an opaque correlation token, e.g. `FLOW-3FA85F64`.
pub fn generate_flow_id() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{FLOW_ID_PREFIX}{}",
        hex[..FLOW_ID_HEX_LEN].to_ascii_uppercase()
    )
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn pending_record() -> ApprovalRecord {
        NewApproval::submit(
            DocumentKey::new(42, DocumentType::Receipt),
            7,
            Some("please check".into()),
        )
        .into_record(1)
    }

    #[test]
    fn flow_id_has_prefix_and_upper_hex_suffix() {
        let id = generate_flow_id();
        assert!(id.starts_with(FLOW_ID_PREFIX));
        let suffix = &id[FLOW_ID_PREFIX.len()..];
        assert_eq!(suffix.len(), 8);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
    }

    #[test]
    fn flow_ids_are_unique() {
        assert_ne!(generate_flow_id(), generate_flow_id());
    }

    #[test]
    fn new_record_is_pending_without_decider() {
        let record = pending_record();
        assert!(record.is_pending());
        assert_eq!(record.step_order, DEFAULT_STEP_ORDER);
        assert!(record.decider_id.is_none());
        assert!(record.decision_time.is_none());
        assert_eq!(record.remark.as_deref(), Some("please check"));
    }

    #[test]
    fn decide_sets_decider_time_and_overwrites_remark() {
        let mut record = pending_record();
        let now = chrono::Utc::now();
        record
            .decide(Decision::Approve, 3, Some("ok".into()), now)
            .unwrap();

        assert_eq!(record.status, ApprovalStatus::Approved);
        assert_eq!(record.decider_id, Some(3));
        assert_eq!(record.decision_time, Some(now));
        assert_eq!(record.remark.as_deref(), Some("ok"));
    }

    #[test]
    fn cancel_leaves_decision_fields_empty() {
        let mut record = pending_record();
        record.cancel(Some("typo".into())).unwrap();

        assert_eq!(record.status, ApprovalStatus::Cancelled);
        assert!(record.decider_id.is_none());
        assert!(record.decision_time.is_none());
    }

    #[test]
    fn terminal_records_cannot_transition() {
        let mut record = pending_record();
        record
            .decide(Decision::Reject, 3, None, chrono::Utc::now())
            .unwrap();

        assert_matches!(
            record.decide(Decision::Approve, 3, None, chrono::Utc::now()),
            Err(TerminalRecord { status: ApprovalStatus::Rejected, .. })
        );
        assert_matches!(record.cancel(None), Err(TerminalRecord { .. }));
    }

    #[test]
    fn document_type_parses_path_and_wire_forms() {
        assert_eq!("receipt".parse::<DocumentType>(), Ok(DocumentType::Receipt));
        assert_eq!("SHIPMENT".parse::<DocumentType>(), Ok(DocumentType::Shipment));
        assert!("invoice".parse::<DocumentType>().is_err());
    }

    #[test]
    fn document_status_accepts_draft_and_ledger_states() {
        assert_eq!("DRAFT".parse::<DocumentStatus>(), Ok(DocumentStatus::Draft));
        assert_eq!(
            "CANCELLED".parse::<DocumentStatus>(),
            Ok(DocumentStatus::Cancelled)
        );
        assert!(DocumentStatus::Rejected.is_submittable());
        assert!(!DocumentStatus::Approved.is_submittable());
        assert!(!DocumentStatus::Pending.is_submittable());
    }

    #[test]
    fn non_positive_ids_are_invalid_keys() {
        assert!(!DocumentKey::new(0, DocumentType::Receipt).is_valid());
        assert!(!DocumentKey::new(-5, DocumentType::Receipt).is_valid());
        assert!(DocumentKey::new(1, DocumentType::Receipt).is_valid());
    }

    #[test]
    fn record_serializes_with_camel_case_fields() {
        let json = serde_json::to_value(pending_record()).unwrap();
        assert_eq!(json["documentType"], "RECEIPT");
        assert_eq!(json["status"], "PENDING");
        assert!(json["flowId"].as_str().unwrap().starts_with("FLOW-"));
    }
}
