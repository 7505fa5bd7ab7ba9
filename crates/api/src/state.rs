use std::sync::Arc;

use depot_core::store::{ApprovalLedger, DocumentStore, UserDirectory};
use depot_events::{Notifier, SessionRegistry};
use depot_workflow::{ApprovalEngine, DocumentService};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database pool, absent when the stores are in-memory.
    pub pool: Option<depot_db::DbPool>,
    pub config: Arc<ServerConfig>,
    /// Live WebSocket sessions, one per user.
    pub sessions: Arc<SessionRegistry>,
    pub engine: Arc<ApprovalEngine>,
    /// Document-level lifecycle calls (engine plus stock side effects).
    pub documents: Arc<DocumentService>,
}

impl AppState {
    /// Wire the notifier, engine and document service over the given stores.
    pub fn assemble(
        config: ServerConfig,
        pool: Option<depot_db::DbPool>,
        sessions: Arc<SessionRegistry>,
        ledger: Arc<dyn ApprovalLedger>,
        store: Arc<dyn DocumentStore>,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        let notifier = Arc::new(Notifier::new(Arc::clone(&sessions), directory));
        let engine = Arc::new(ApprovalEngine::new(ledger, notifier));
        let documents = Arc::new(DocumentService::new(Arc::clone(&engine), store));
        Self {
            pool,
            config: Arc::new(config),
            sessions,
            engine,
            documents,
        }
    }
}
