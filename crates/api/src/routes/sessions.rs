use axum::routing::get;
use axum::Router;

use crate::handlers::sessions;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/online", get(sessions::online_sessions))
}
