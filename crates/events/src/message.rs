//! Messages queued for a live session.
//!
//! The JSON shape of [`ApprovalEvent`] is consumed by the web client and must
//! stay stable:
//!
//! ```json
//! {"type":"decision","documentId":42,"documentType":"RECEIPT","status":"APPROVED",
//!  "actorName":"Alice","timestamp":"2026-10-19T08:00:00Z","remark":"ok"}
//! ```

use depot_core::approval::{ApprovalRecord, ApprovalStatus, DocumentType};
use depot_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};

/// Shown when the directory has no name for the acting user.
pub const UNKNOWN_ACTOR_NAME: &str = "Unknown user";

/// Value of the event's `type` field: `"submission"` for a new submission
/// awaiting a decision, `"decision"` for the outcome sent to the submitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Submission,
    Decision,
}

/// A push notification about an approval lifecycle change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub document_id: DbId,
    pub document_type: DocumentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ApprovalStatus>,
    pub actor_name: String,
    pub timestamp: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

impl ApprovalEvent {
    /// Tell a decider that `record` awaits a decision.
    pub fn submission(record: &ApprovalRecord, submitter_name: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Submission,
            document_id: record.document_id,
            document_type: record.document_type,
            status: None,
            actor_name: submitter_name.into(),
            timestamp: record.submit_time,
            remark: None,
        }
    }

    /// Tell the submitter how `record` was decided.
    pub fn decision(record: &ApprovalRecord, decider_name: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Decision,
            document_id: record.document_id,
            document_type: record.document_type,
            status: Some(record.status),
            actor_name: decider_name.into(),
            timestamp: record.decision_time.unwrap_or_else(chrono::Utc::now),
            remark: record.remark.clone(),
        }
    }

    /// Serialize to the JSON text frame sent over the socket.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Everything a session's writer task can be asked to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionMessage {
    Event(ApprovalEvent),
    /// Keep-alive ping from the heartbeat.
    Ping,
    /// Server is closing the session.
    Close,
}

impl SessionMessage {
    /// The event, if this message carries one.
    pub fn as_event(&self) -> Option<&ApprovalEvent> {
        match self {
            SessionMessage::Event(event) => Some(event),
            _ => None,
        }
    }
}
