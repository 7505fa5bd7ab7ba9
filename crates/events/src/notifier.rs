//! Approval notification fan-out.
//!
//! [`Notifier`] turns ledger records into [`ApprovalEvent`]s and queues them
//! on the affected users' sessions. Delivery is best-effort: offline users
//! are skipped, dead sessions are unregistered, and nothing is ever reported
//! back to the caller.

use std::sync::Arc;

use depot_core::approval::ApprovalRecord;
use depot_core::roles::can_decide;
use depot_core::store::UserDirectory;
use depot_core::types::DbId;

use crate::message::{ApprovalEvent, SessionMessage, UNKNOWN_ACTOR_NAME};
use crate::session::SessionRegistry;

/// Formats and delivers approval events to live sessions.
pub struct Notifier {
    sessions: Arc<SessionRegistry>,
    directory: Arc<dyn UserDirectory>,
}

impl Notifier {
    pub fn new(sessions: Arc<SessionRegistry>, directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            sessions,
            directory,
        }
    }

    /// The registry this notifier delivers into.
    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    /// Send a `submission` event to every online decider.
    ///
    /// Returns the number of sessions the event was queued on.
    pub async fn broadcast_submission(&self, record: &ApprovalRecord) -> usize {
        let deciders = match self.directory.resolve_deciders().await {
            Ok(users) => users,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    document_id = record.document_id,
                    "Failed to resolve deciders, submission alert dropped"
                );
                return 0;
            }
        };

        let submitter_name = self.actor_name(record.submitter_id).await;
        let message = SessionMessage::Event(ApprovalEvent::submission(record, submitter_name));

        let mut delivered = 0;
        for decider in deciders.iter().filter(|u| can_decide(u.role)) {
            if self
                .sessions
                .send_to_user(decider.user_id, message.clone())
                .await
            {
                delivered += 1;
            }
        }

        tracing::debug!(
            document_id = record.document_id,
            document_type = %record.document_type,
            deciders = deciders.len(),
            delivered,
            "Submission alert fanned out"
        );
        delivered
    }

    /// Send a `decision` event to the record's submitter, if online.
    pub async fn notify_decision(&self, record: &ApprovalRecord) -> bool {
        if !self.sessions.is_online(record.submitter_id).await {
            tracing::debug!(
                user_id = record.submitter_id,
                document_id = record.document_id,
                "Submitter offline, decision alert skipped"
            );
            return false;
        }

        let decider_name = match record.decider_id {
            Some(id) => self.actor_name(id).await,
            None => UNKNOWN_ACTOR_NAME.to_string(),
        };
        let message = SessionMessage::Event(ApprovalEvent::decision(record, decider_name));

        let delivered = self
            .sessions
            .send_to_user(record.submitter_id, message)
            .await;
        tracing::debug!(
            user_id = record.submitter_id,
            document_id = record.document_id,
            status = %record.status,
            delivered,
            "Decision alert sent"
        );
        delivered
    }

    async fn actor_name(&self, user_id: DbId) -> String {
        match self.directory.display_name(user_id).await {
            Ok(Some(name)) => name,
            Ok(None) => UNKNOWN_ACTOR_NAME.to_string(),
            Err(e) => {
                tracing::warn!(error = %e, user_id, "Display name lookup failed");
                UNKNOWN_ACTOR_NAME.to_string()
            }
        }
    }
}
