//! Document adapters: the layer between document controllers and the
//! approval engine.
//!
//! Every lifecycle call follows the same shape: load the document, then hand
//! the engine a closure that builds the [`DocumentWrite`] for the transition
//! (the mirrored status and, on approval, the stock effect). The ledger
//! commits that write together with the record, so a refused stock effect
//! leaves the record PENDING and sends no notification.
//!
//! Receipts, shipments and adjustments all apply their stock effect at
//! approval time and never on rejection or cancellation.

use std::collections::HashMap;
use std::sync::Arc;

use depot_core::approval::{
    Actor, ApprovalRecord, Decision, DocumentKey, DocumentStatus, DocumentType,
};
use depot_core::document::{Document, StockEffect};
use depot_core::store::{DocumentStore, DocumentWrite};
use serde::Serialize;

use crate::engine::ApprovalEngine;
use crate::error::{ApprovalError, ApprovalResult};

/// Computes the stock effect an approved document applies, if any.
pub type EffectFn = fn(&Document) -> Option<StockEffect>;

fn quantity_effect(document: &Document) -> Option<StockEffect> {
    Some(document.stock_effect())
}

/// Result of a lifecycle call: the updated document and its ledger record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub document: Document,
    pub record: ApprovalRecord,
}

pub struct DocumentService {
    engine: Arc<ApprovalEngine>,
    documents: Arc<dyn DocumentStore>,
    effects: HashMap<DocumentType, EffectFn>,
}

impl DocumentService {
    /// Create a service with the default quantity effect registered for
    /// every document type.
    pub fn new(engine: Arc<ApprovalEngine>, documents: Arc<dyn DocumentStore>) -> Self {
        let effects = DocumentType::ALL
            .into_iter()
            .map(|t| (t, quantity_effect as EffectFn))
            .collect();
        Self {
            engine,
            documents,
            effects,
        }
    }

    /// Replace the approval side effect for one document type.
    pub fn with_effect(mut self, document_type: DocumentType, effect: EffectFn) -> Self {
        self.effects.insert(document_type, effect);
        self
    }

    /// Submit a draft (or previously rejected/cancelled) document.
    ///
    /// An approved document is final and cannot be resubmitted.
    pub async fn submit(
        &self,
        key: DocumentKey,
        actor: Option<&Actor>,
        remark: Option<String>,
    ) -> ApprovalResult<Transition> {
        let mut document = self.load_for(key, actor).await?;
        if document.approval_status == DocumentStatus::Approved {
            return Err(ApprovalError::InvalidState {
                key,
                status: document.approval_status,
                operation: "submit",
            });
        }

        let record = self
            .engine
            .submit_with(key, actor, remark, |new| {
                let mut mirrored = document.clone();
                mirrored.mirror_submission(new);
                Some(DocumentWrite::mirror(mirrored))
            })
            .await?;
        document.mirror(&record);
        Ok(Transition { document, record })
    }

    /// Approve a pending document and apply its stock effect.
    pub async fn approve(
        &self,
        key: DocumentKey,
        actor: Option<&Actor>,
        remark: Option<String>,
    ) -> ApprovalResult<Transition> {
        let mut document = self.load_for(key, actor).await?;
        let effect = self
            .effects
            .get(&key.document_type)
            .and_then(|effect| effect(&document));

        let record = self
            .engine
            .decide_with(key, actor, remark, Decision::Approve, |record| {
                Some(mirrored(&document, record).with_effect(effect))
            })
            .await?;
        document.mirror(&record);

        if let Some(effect) = effect {
            tracing::info!(
                document_id = key.document_id,
                document_type = %key.document_type,
                product_id = effect.product_id,
                delta = effect.delta,
                "Stock effect applied"
            );
        }
        Ok(Transition { document, record })
    }

    /// Reject a pending document. Stock is untouched.
    pub async fn reject(
        &self,
        key: DocumentKey,
        actor: Option<&Actor>,
        remark: Option<String>,
    ) -> ApprovalResult<Transition> {
        let mut document = self.load_for(key, actor).await?;

        let record = self
            .engine
            .decide_with(key, actor, remark, Decision::Reject, |record| {
                Some(mirrored(&document, record))
            })
            .await?;
        document.mirror(&record);
        Ok(Transition { document, record })
    }

    /// Cancel a pending document on behalf of its submitter. Stock is
    /// untouched.
    pub async fn cancel(
        &self,
        key: DocumentKey,
        actor: Option<&Actor>,
        remark: Option<String>,
    ) -> ApprovalResult<Transition> {
        let mut document = self.load_for(key, actor).await?;

        let record = self
            .engine
            .cancel_with(key, actor, remark, |record| Some(mirrored(&document, record)))
            .await?;
        document.mirror(&record);
        Ok(Transition { document, record })
    }

    /// Approval history of an existing document, newest first.
    pub async fn history(&self, key: DocumentKey) -> ApprovalResult<Vec<ApprovalRecord>> {
        self.load(key).await?;
        self.engine.history(key).await
    }

    /// Load a document, failing with `NotFound` if it does not exist.
    pub async fn load(&self, key: DocumentKey) -> ApprovalResult<Document> {
        if !key.is_valid() {
            return Err(ApprovalError::InvalidDocument(format!(
                "document id must be positive, got {}",
                key.document_id
            )));
        }
        self.documents
            .load(key)
            .await?
            .ok_or(ApprovalError::NotFound(key))
    }

    async fn load_for(&self, key: DocumentKey, actor: Option<&Actor>) -> ApprovalResult<Document> {
        if actor.is_none() {
            return Err(ApprovalError::Unauthenticated);
        }
        self.load(key).await
    }
}

fn mirrored(document: &Document, record: &ApprovalRecord) -> DocumentWrite {
    let mut document = document.clone();
    document.mirror(record);
    DocumentWrite::mirror(document)
}
