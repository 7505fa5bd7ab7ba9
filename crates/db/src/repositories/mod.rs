//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async queries that
//! accept `&PgPool` (or any executor, for calls made inside a transaction)
//! as the first argument.

pub mod approval_record_repo;
pub mod document_repo;
pub mod product_repo;
pub mod user_repo;

pub use approval_record_repo::ApprovalRecordRepo;
pub use document_repo::DocumentRepo;
pub use product_repo::ProductRepo;
pub use user_repo::UserRepo;
