use crate::state::SharedState;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Fixed-interval refresh of the admin message inbox. Last write wins;
/// a failed fetch keeps the previous snapshot and waits for the next
/// tick. No backoff by policy.
pub fn spawn_refresh(state: SharedState, token: String) -> JoinHandle<()> {
    let every = Duration::from_secs(state.config.inbox_refresh_secs);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            match state.api.inbox(&token).await {
                Ok(threads) => {
                    let mut inbox = state.inbox.write().await;
                    *inbox = threads;
                }
                Err(e) => {
                    tracing::warn!("inbox refresh failed, keeping previous snapshot: {e}");
                }
            }
        }
    })
}
