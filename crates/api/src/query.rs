//! Shared query parameter types for API handlers.

use depot_core::paging::PageRequest;
use serde::Deserialize;

/// Generic pagination parameters (`?limit=&offset=`).
///
/// Values are clamped when converted into a [`PageRequest`].
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl From<PaginationParams> for PageRequest {
    fn from(params: PaginationParams) -> Self {
        PageRequest::new(params.limit, params.offset)
    }
}

/// Query parameters for the WebSocket upgrade (`?token=`).
#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub token: Option<String>,
}
