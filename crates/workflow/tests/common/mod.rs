//! Shared fixtures for workflow integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use depot_core::approval::{Actor, DocumentKey, DocumentType};
use depot_core::document::{Document, Product};
use depot_core::roles::Role;
use depot_core::types::DbId;
use depot_events::{Notifier, SessionMessage, SessionReceiver, SessionRegistry};
use depot_workflow::memory::{InMemoryDirectory, InMemoryStore};
use depot_workflow::{ApprovalEngine, DocumentService};

pub const ADMIN: DbId = 1;
pub const KEEPER: DbId = 2;
pub const KEEPER_TWO: DbId = 3;
pub const EMPLOYEE: DbId = 7;
pub const OTHER_EMPLOYEE: DbId = 8;

pub const PRODUCT: DbId = 1;
pub const INITIAL_STOCK: i64 = 100;

pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub directory: Arc<InMemoryDirectory>,
    pub sessions: Arc<SessionRegistry>,
    pub engine: Arc<ApprovalEngine>,
    pub service: DocumentService,
}

impl Harness {
    pub async fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let directory = Arc::new(InMemoryDirectory::new());
        let sessions = Arc::new(SessionRegistry::new());

        directory.add_user(ADMIN, Role::Admin, "Ada").await;
        directory.add_user(KEEPER, Role::WarehouseKeeper, "Kim").await;
        directory.add_user(KEEPER_TWO, Role::WarehouseKeeper, "Lee").await;
        directory.add_user(EMPLOYEE, Role::Employee, "Sam").await;
        directory.add_user(OTHER_EMPLOYEE, Role::Employee, "Max").await;

        store
            .insert_product(Product {
                id: PRODUCT,
                name: "Steel bolts".into(),
                stock_qty: INITIAL_STOCK,
            })
            .await;

        let notifier = Arc::new(Notifier::new(Arc::clone(&sessions), directory.clone()));
        let engine = Arc::new(ApprovalEngine::new(store.clone(), notifier));
        let service = DocumentService::new(Arc::clone(&engine), store.clone());

        Self {
            store,
            directory,
            sessions,
            engine,
            service,
        }
    }

    /// Store a draft document for [`PRODUCT`] and return its key.
    pub async fn draft(&self, id: DbId, document_type: DocumentType, quantity: i64) -> DocumentKey {
        let document = Document::draft(id, document_type, PRODUCT, quantity);
        let key = document.key();
        self.store.insert_document(document).await;
        key
    }

    pub async fn connect(&self, user_id: DbId) -> SessionReceiver {
        self.sessions.register(user_id).await.1
    }

    pub async fn stock(&self) -> i64 {
        self.store.stock(PRODUCT).await.unwrap_or_default()
    }
}

pub fn admin() -> Actor {
    Actor::new(ADMIN, Role::Admin)
}

pub fn keeper() -> Actor {
    Actor::new(KEEPER, Role::WarehouseKeeper)
}

pub fn employee() -> Actor {
    Actor::new(EMPLOYEE, Role::Employee)
}

pub fn other_employee() -> Actor {
    Actor::new(OTHER_EMPLOYEE, Role::Employee)
}

pub fn drain(rx: &mut SessionReceiver) -> Vec<SessionMessage> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        out.push(msg);
    }
    out
}
