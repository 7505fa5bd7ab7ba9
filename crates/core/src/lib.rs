//! Depot domain core.
//!
//! Pure domain types shared by every other crate in the workspace: approval
//! records and their state machine enums, documents and stock effects, user
//! roles, pagination, and the storage traits the workflow engine is written
//! against.

pub mod approval;
pub mod document;
pub mod error;
pub mod paging;
pub mod roles;
pub mod store;
pub mod types;
