//! WebSocket transport for approval notifications.
//!
//! Each connection is bound to one user at upgrade time and registered with
//! the shared [`SessionRegistry`](depot_events::SessionRegistry). The
//! registry owns delivery; this module only moves frames.

mod handler;
mod heartbeat;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
