//! HTTP handlers, one module per resource.

pub mod approval;
pub mod documents;
pub mod sessions;
