//! Mutation watch: turns move-list notifications into move cycles.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use movesync_protocols::{MutationEvent, Subscription};

use crate::controller::Inner;
use crate::toggle::TogglePhase;

/// Consume notifications until cancelled, the source closes, or the session
/// ends.
pub(crate) async fn watch_move_list(
    inner: Arc<Inner>,
    mut subscription: Subscription,
    cancel: CancellationToken,
    epoch: u64,
) {
    debug!("Watching move list ({})", subscription.id());
    loop {
        let event = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            event = subscription.next() => event,
        };

        let Some(event) = event else {
            if !cancel.is_cancelled() {
                inner
                    .set_error(Some(epoch), "Move list notifications stopped".to_string())
                    .await;
            }
            break;
        };

        if !handle_mutation(&inner, epoch, &event).await {
            break;
        }
    }
    debug!("Move list watch for {} finished", subscription.id());
}

/// Handle one notification. Returns false once the watch should end.
async fn handle_mutation(inner: &Arc<Inner>, epoch: u64, event: &MutationEvent) -> bool {
    match inner.host().has_game_result().await {
        Ok(true) => {
            inner.finish(epoch).await;
            return false;
        }
        Ok(false) => {}
        Err(e) => {
            inner
                .set_error(Some(epoch), format!("Game result check failed: {}", e))
                .await;
            return false;
        }
    }

    match inner.flip_toggle(epoch) {
        Some(TogglePhase::Swallowed) => {
            debug!("Notification swallowed ({} records)", event.records);
            true
        }
        Some(TogglePhase::Process) => {
            debug!("Move detected ({} records)", event.records);
            inner.spawn_cycle(epoch, None);
            true
        }
        None => false,
    }
}
