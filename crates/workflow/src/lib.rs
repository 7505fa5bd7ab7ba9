//! Approval workflow for warehouse documents.
//!
//! - [`ApprovalEngine`]: the submit → decide state machine over the
//!   approval ledger, with authorization checks and notification fan-out.
//! - [`DocumentService`]: per-document-type adapters that drive the engine,
//!   apply the stock side effect on approval, and keep the document's
//!   approval mirror in sync.
//! - [`memory`]: in-memory store (ledger plus documents under one lock) and
//!   user directory.

pub mod adapter;
pub mod engine;
pub mod error;
pub mod memory;

pub use adapter::{DocumentService, Transition};
pub use engine::ApprovalEngine;
pub use error::ApprovalError;
