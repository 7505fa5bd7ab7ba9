//! Shared response envelope types for API handlers.
//!
//! All API responses use a `{ "data": ... }` envelope.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "count": n }` payload for counting endpoints.
#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: i64,
}
