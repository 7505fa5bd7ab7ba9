//! Real-time approval notifications.
//!
//! - [`SessionRegistry`]: the live map from user id to a per-session send
//!   queue, shared via `Arc` by every connection task.
//! - [`ApprovalEvent`]: the JSON event pushed to clients.
//! - [`Notifier`]: best-effort fan-out of submission and decision events.

pub mod message;
pub mod notifier;
pub mod session;

pub use message::{ApprovalEvent, EventKind, SessionMessage};
pub use notifier::Notifier;
pub use session::{SessionHandle, SessionId, SessionReceiver, SessionRegistry};
