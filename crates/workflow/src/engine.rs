//! The approval state machine.
//!
//! [`ApprovalEngine`] owns the rules for moving a document's approval
//! record through `PENDING → APPROVED | REJECTED | CANCELLED`. It knows
//! nothing about document contents or stock. Adapters hand it a closure that
//! builds the [`DocumentWrite`] for a transition; the ledger commits that
//! write together with the record, and notifications go out only after the
//! commit succeeds.

use std::sync::Arc;

use depot_core::approval::{Actor, ApprovalRecord, Decision, DocumentKey, NewApproval};
use depot_core::paging::{Page, PageRequest};
use depot_core::roles::{can_decide, can_submit};
use depot_core::store::{ApprovalLedger, DocumentWrite, PendingFilter, StoreError};
use depot_core::types::DbId;
use depot_events::Notifier;

use crate::error::{ApprovalError, ApprovalResult};

pub struct ApprovalEngine {
    ledger: Arc<dyn ApprovalLedger>,
    notifier: Arc<Notifier>,
}

impl ApprovalEngine {
    pub fn new(ledger: Arc<dyn ApprovalLedger>, notifier: Arc<Notifier>) -> Self {
        Self { ledger, notifier }
    }

    /// Open a PENDING record for the document and alert every online decider.
    pub async fn submit(
        &self,
        key: DocumentKey,
        submitter: Option<&Actor>,
        remark: Option<String>,
    ) -> ApprovalResult<ApprovalRecord> {
        self.submit_with(key, submitter, remark, |_| None).await
    }

    /// [`submit`](Self::submit), committing the write built by `attach` in
    /// the same unit of work as the new record.
    pub async fn submit_with<F>(
        &self,
        key: DocumentKey,
        submitter: Option<&Actor>,
        remark: Option<String>,
        attach: F,
    ) -> ApprovalResult<ApprovalRecord>
    where
        F: FnOnce(&NewApproval) -> Option<DocumentWrite> + Send,
    {
        let submitter = require_actor(submitter)?;
        require_valid(key)?;
        if !can_submit(submitter.role) {
            return Err(ApprovalError::Forbidden(format!(
                "Role {} may not submit documents",
                submitter.role
            )));
        }

        if self.ledger.exists_pending(key).await? {
            return Err(ApprovalError::AlreadyPending(key));
        }

        // The pre-check above is only a fast path; the ledger's conditional
        // insert is what actually enforces a single PENDING record.
        let new = NewApproval::submit(key, submitter.user_id, remark);
        let write = attach(&new);
        let record = self
            .ledger
            .insert(new, write.as_ref())
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => ApprovalError::AlreadyPending(key),
                other => other.into(),
            })?;

        tracing::info!(
            user_id = submitter.user_id,
            document_id = key.document_id,
            document_type = %key.document_type,
            flow_id = %record.flow_id,
            "Approval submitted"
        );

        self.notifier.broadcast_submission(&record).await;
        Ok(record)
    }

    /// Approve the document's pending record and alert the submitter.
    pub async fn approve(
        &self,
        key: DocumentKey,
        decider: Option<&Actor>,
        remark: Option<String>,
    ) -> ApprovalResult<ApprovalRecord> {
        self.decide_with(key, decider, remark, Decision::Approve, |_| None).await
    }

    /// Reject the document's pending record and alert the submitter.
    pub async fn reject(
        &self,
        key: DocumentKey,
        decider: Option<&Actor>,
        remark: Option<String>,
    ) -> ApprovalResult<ApprovalRecord> {
        self.decide_with(key, decider, remark, Decision::Reject, |_| None).await
    }

    /// Record a decision, committing the write built by `attach` in the same
    /// unit of work as the ledger update. If that commit fails the record
    /// stays PENDING and nobody is notified.
    pub async fn decide_with<F>(
        &self,
        key: DocumentKey,
        decider: Option<&Actor>,
        remark: Option<String>,
        outcome: Decision,
        attach: F,
    ) -> ApprovalResult<ApprovalRecord>
    where
        F: FnOnce(&ApprovalRecord) -> Option<DocumentWrite> + Send,
    {
        let decider = require_actor(decider)?;
        require_valid(key)?;
        if !can_decide(decider.role) {
            return Err(ApprovalError::Forbidden(format!(
                "Role {} may not decide approvals",
                decider.role
            )));
        }

        let mut record = self.pending_record(key).await?;
        record
            .decide(outcome, decider.user_id, remark, chrono::Utc::now())
            .map_err(|_| ApprovalError::NoPendingApproval(key))?;
        let write = attach(&record);
        let record = self.persist_transition(key, &record, write).await?;

        tracing::info!(
            user_id = decider.user_id,
            document_id = key.document_id,
            document_type = %key.document_type,
            status = %record.status,
            "Approval decided"
        );

        self.notifier.notify_decision(&record).await;
        Ok(record)
    }

    /// Withdraw a pending submission. Only the original submitter may do
    /// this, whatever their role. No one is notified.
    pub async fn cancel(
        &self,
        key: DocumentKey,
        caller: Option<&Actor>,
        remark: Option<String>,
    ) -> ApprovalResult<ApprovalRecord> {
        self.cancel_with(key, caller, remark, |_| None).await
    }

    /// [`cancel`](Self::cancel), committing the write built by `attach` in
    /// the same unit of work as the ledger update.
    pub async fn cancel_with<F>(
        &self,
        key: DocumentKey,
        caller: Option<&Actor>,
        remark: Option<String>,
        attach: F,
    ) -> ApprovalResult<ApprovalRecord>
    where
        F: FnOnce(&ApprovalRecord) -> Option<DocumentWrite> + Send,
    {
        let caller = require_actor(caller)?;
        require_valid(key)?;

        let mut record = self.pending_record(key).await?;
        if record.submitter_id != caller.user_id {
            return Err(ApprovalError::Forbidden(
                "Only the submitter may cancel an approval".into(),
            ));
        }

        record
            .cancel(remark)
            .map_err(|_| ApprovalError::NoPendingApproval(key))?;
        let write = attach(&record);
        let record = self.persist_transition(key, &record, write).await?;

        tracing::info!(
            user_id = caller.user_id,
            document_id = key.document_id,
            document_type = %key.document_type,
            "Approval cancelled"
        );
        Ok(record)
    }

    /// A single record by id, in any status.
    pub async fn record(&self, id: DbId) -> ApprovalResult<Option<ApprovalRecord>> {
        Ok(self.ledger.find_by_id(id).await?)
    }

    /// Every record for the document, newest submission first.
    pub async fn history(&self, key: DocumentKey) -> ApprovalResult<Vec<ApprovalRecord>> {
        require_valid(key)?;
        Ok(self.ledger.list_history(key).await?)
    }

    /// Pending records visible to `decider`, or the global queue if `None`.
    ///
    /// Any decider may act on any pending record, so a decider sees the
    /// whole queue. Callers who cannot decide see nothing.
    pub async fn pending_queue(
        &self,
        decider: Option<&Actor>,
        page: PageRequest,
    ) -> ApprovalResult<Page<ApprovalRecord>> {
        if decider.is_some_and(|d| !can_decide(d.role)) {
            return Ok(Page::empty(page));
        }
        Ok(self
            .ledger
            .list_pending(&PendingFilter::all_types(), page)
            .await?)
    }

    /// Number of pending records across every approvable document type.
    pub async fn pending_count(&self) -> ApprovalResult<i64> {
        Ok(self
            .ledger
            .count_pending(&PendingFilter::all_types())
            .await?)
    }

    /// Pending count as seen by one user; zero for non-deciders.
    pub async fn pending_count_for(&self, user: &Actor) -> ApprovalResult<i64> {
        if !can_decide(user.role) {
            return Ok(0);
        }
        self.pending_count().await
    }

    /// The caller's own submissions in any status, newest first.
    pub async fn submissions(
        &self,
        submitter: &Actor,
        page: PageRequest,
    ) -> ApprovalResult<Page<ApprovalRecord>> {
        Ok(self
            .ledger
            .list_by_submitter(submitter.user_id, page)
            .await?)
    }

    async fn pending_record(&self, key: DocumentKey) -> ApprovalResult<ApprovalRecord> {
        self.ledger
            .find_pending(key)
            .await?
            .ok_or(ApprovalError::NoPendingApproval(key))
    }

    async fn persist_transition(
        &self,
        key: DocumentKey,
        record: &ApprovalRecord,
        write: Option<DocumentWrite>,
    ) -> ApprovalResult<ApprovalRecord> {
        self.ledger
            .update(record, write.as_ref())
            .await
            .map_err(|e| match e {
                // Lost a race with another decision or cancel.
                StoreError::Conflict(_) => ApprovalError::NoPendingApproval(key),
                other => other.into(),
            })
    }
}

fn require_actor(actor: Option<&Actor>) -> ApprovalResult<&Actor> {
    actor.ok_or(ApprovalError::Unauthenticated)
}

fn require_valid(key: DocumentKey) -> ApprovalResult<()> {
    if key.is_valid() {
        Ok(())
    } else {
        Err(ApprovalError::InvalidDocument(format!(
            "document id must be positive, got {}",
            key.document_id
        )))
    }
}
