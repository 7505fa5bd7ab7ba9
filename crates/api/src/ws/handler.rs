use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use depot_core::types::DbId;
use depot_events::{SessionMessage, SessionRegistry};
use futures::{SinkExt, StreamExt};

use crate::middleware::auth::QueryTokenUser;
use crate::state::AppState;

/// HTTP handler that upgrades the connection to WebSocket.
///
/// The user is resolved from `?token=` before upgrading; a missing or
/// invalid token is refused with 401 and no session is created.
pub async fn ws_handler(
    State(state): State<AppState>,
    QueryTokenUser(user): QueryTokenUser,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.sessions, user.user_id))
}

/// Translate a registry message into a WebSocket frame. `None` means the
/// session should close.
fn to_frame(message: SessionMessage) -> Option<Message> {
    match message {
        SessionMessage::Event(event) => match event.to_json() {
            Ok(text) => Some(Message::Text(text.into())),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize approval event");
                Some(Message::Ping(Bytes::new()))
            }
        },
        SessionMessage::Ping => Some(Message::Ping(Bytes::new())),
        SessionMessage::Close => None,
    }
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink and a stream, then:
///   1. Registers the session (replacing any earlier one for this user).
///   2. Spawns a writer task that drains the session queue into the sink.
///   3. Spawns a reader task that watches for close and pong frames.
///   4. Unregisters when either side finishes.
async fn handle_socket(socket: WebSocket, sessions: Arc<SessionRegistry>, user_id: DbId) {
    let (session_id, mut rx) = sessions.register(user_id).await;
    tracing::info!(user_id, %session_id, "WebSocket connected");

    let (mut sink, mut stream) = socket.split();

    let mut send_task = tokio::spawn(async move {
        // The queue ends when the registry drops this session's sender,
        // which happens when the same user connects again.
        while let Some(message) = rx.recv().await {
            let Some(frame) = to_frame(message) else {
                break;
            };
            if sink.send(frame).await.is_err() {
                tracing::debug!(user_id, "WebSocket sink closed");
                return;
            }
        }
        let _ = sink.send(Message::Close(None)).await;
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = stream.next().await {
            match result {
                Ok(Message::Close(_)) => break,
                Ok(Message::Pong(_)) => {
                    tracing::trace!(user_id, "Pong received");
                }
                // Clients have nothing to send on this channel.
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(user_id, error = %e, "WebSocket receive error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    sessions.unregister(session_id).await;
    tracing::info!(user_id, %session_id, "WebSocket disconnected");
}

#[cfg(test)]
mod tests {
    use depot_core::approval::{DocumentKey, DocumentType, NewApproval};
    use depot_events::ApprovalEvent;

    use super::*;

    #[test]
    fn events_become_camel_case_text_frames() {
        let record = NewApproval::submit(DocumentKey::new(42, DocumentType::Receipt), 7, None)
            .into_record(1);
        let frame = to_frame(SessionMessage::Event(ApprovalEvent::submission(&record, "Sam")));

        let text = match frame {
            Some(Message::Text(text)) => text,
            other => panic!("expected a text frame, got {other:?}"),
        };
        let json: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
        assert_eq!(json["type"], "submission");
        assert_eq!(json["documentId"], 42);
        assert_eq!(json["actorName"], "Sam");
        assert!(json.get("status").is_none());
    }

    #[test]
    fn close_ends_the_session() {
        assert!(to_frame(SessionMessage::Close).is_none());
        assert!(matches!(to_frame(SessionMessage::Ping), Some(Message::Ping(_))));
    }
}
