use std::sync::Arc;
use std::time::Duration;

use depot_events::SessionRegistry;
use tokio_util::sync::CancellationToken;

/// Spawn a background task that pings every live session on an interval.
///
/// Sessions whose queue has closed are pruned by the registry as a side
/// effect. The task stops when `cancel` fires.
pub fn start_heartbeat(
    sessions: Arc<SessionRegistry>,
    interval: Duration,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    tracing::debug!("Heartbeat stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let pinged = sessions.ping_all().await;
                    tracing::debug!(pinged, "WebSocket heartbeat ping");
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use depot_events::SessionMessage;

    use super::*;

    #[tokio::test]
    async fn pings_sessions_until_cancelled() {
        let sessions = Arc::new(SessionRegistry::new());
        let (_id, mut rx) = sessions.register(1).await;
        let cancel = CancellationToken::new();

        let handle = start_heartbeat(
            Arc::clone(&sessions),
            Duration::from_millis(10),
            cancel.clone(),
        );

        let first = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap();
        assert!(matches!(first, Some(SessionMessage::Ping)));

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
