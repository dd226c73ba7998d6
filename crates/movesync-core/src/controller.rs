//! Bot controller: the Idle / Running / Error state machine.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use movesync_config::{Config, ExtractMode};
use movesync_protocols::{
    BotState, BotStatus, HostDocument, MoveRecommender, MoveSequence,
};

use crate::extract::MoveExtractor;
use crate::inject::MoveInjector;
use crate::retry::{RetryOutcome, RetryPolicy, RetryTask};
use crate::session::{ActiveSubscription, Session};
use crate::toggle::TogglePhase;

/// Controller tuning.
#[derive(Debug, Clone)]
pub struct BotOptions {
    pub retry: RetryPolicy,
    pub extract_mode: ExtractMode,
    /// Drop recommendations that resolve after the session they were
    /// requested for has ended.
    pub discard_stale_moves: bool,
}

impl Default for BotOptions {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            extract_mode: ExtractMode::default(),
            discard_stale_moves: true,
        }
    }
}

impl BotOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            retry: RetryPolicy::from(&config.retry),
            extract_mode: config.controller.extract_mode,
            discard_stale_moves: config.controller.discard_stale_moves,
        }
    }
}

/// Drives one observed board.
///
/// `start()` and `stop()` are the only entry points; failures are never
/// returned to the caller but published as [`BotStatus`] updates.
pub struct BotController {
    inner: Arc<Inner>,
}

pub(crate) struct Inner {
    host: Arc<dyn HostDocument>,
    recommender: Arc<dyn MoveRecommender>,
    options: BotOptions,
    extractor: MoveExtractor,
    injector: MoveInjector,
    session: Mutex<Session>,
    status: watch::Sender<BotStatus>,
}

impl BotController {
    pub fn new(
        host: Arc<dyn HostDocument>,
        recommender: Arc<dyn MoveRecommender>,
        options: BotOptions,
    ) -> Self {
        let (status, _) = watch::channel(BotStatus::idle());
        Self {
            inner: Arc::new(Inner {
                host,
                recommender,
                extractor: MoveExtractor::new(options.extract_mode),
                injector: MoveInjector::new(),
                options,
                session: Mutex::new(Session::new()),
                status,
            }),
        }
    }

    /// Enter `Running`: snapshot the move list, subscribe to it and play the
    /// initial cycle. No-op while already running.
    pub async fn start(&self) {
        let inner = &self.inner;
        if !inner.session.lock().begin_start() {
            debug!("Start ignored, bot is already running");
            return;
        }
        info!("Starting bot");

        let snapshot = match inner.extractor.extract(inner.host.as_ref()).await {
            Ok(moves) => moves,
            Err(e) => {
                inner.set_error(None, format!("Move extraction failed: {}", e)).await;
                return;
            }
        };

        let subscription = match inner.host.observe_move_list().await {
            Ok(subscription) => subscription,
            Err(e) => {
                inner.set_error(None, format!("Move list not available: {}", e)).await;
                return;
            }
        };

        let cancel = CancellationToken::new();
        let active = ActiveSubscription {
            id: subscription.id().clone(),
            cancel: cancel.clone(),
        };
        let entered = inner.session.lock().enter_running(active);
        let epoch = match entered {
            Ok(epoch) => epoch,
            Err(active) => {
                debug!("Start aborted during setup");
                inner.release(active).await;
                return;
            }
        };

        info!("Bot running, watching subscription {}", subscription.id());
        inner.publish();

        tokio::spawn(crate::watch::watch_move_list(
            Arc::clone(inner),
            subscription,
            cancel,
            epoch,
        ));
        inner.spawn_cycle(epoch, Some(snapshot));
    }

    /// Enter `Idle` and release the subscription. No-op unless running.
    ///
    /// In-flight cycles are not aborted; they notice the session ended.
    pub async fn stop(&self) {
        let released = {
            let mut session = self.inner.session.lock();
            if session.abort_start() {
                None
            } else {
                match session.leave_running(BotState::Idle, None, None) {
                    Some(active) => Some(active),
                    None => {
                        debug!("Stop ignored, bot is not running");
                        return;
                    }
                }
            }
        };

        info!("Bot stopped");
        self.inner.publish();
        if let Some(active) = released {
            self.inner.release(active).await;
        }
    }

    pub fn state(&self) -> BotState {
        self.inner.session.lock().state()
    }

    pub fn status(&self) -> BotStatus {
        self.inner.session.lock().status()
    }

    /// Status updates for a UI. The current value is available immediately.
    pub fn subscribe_status(&self) -> watch::Receiver<BotStatus> {
        self.inner.status.subscribe()
    }

    pub fn retry_count(&self) -> u32 {
        self.inner.session.lock().retry_count()
    }

    pub fn has_subscription(&self) -> bool {
        self.inner.session.lock().has_subscription()
    }
}

impl Inner {
    pub(crate) fn host(&self) -> &dyn HostDocument {
        self.host.as_ref()
    }

    pub(crate) fn is_current(&self, epoch: u64) -> bool {
        self.session.lock().is_current(epoch)
    }

    /// Feed a notification through the toggle. `None` once the session is
    /// stale.
    pub(crate) fn flip_toggle(&self, epoch: u64) -> Option<TogglePhase> {
        let mut session = self.session.lock();
        session.is_current(epoch).then(|| session.flip_toggle())
    }

    fn publish(&self) {
        let session = self.session.lock();
        self.status.send_replace(session.status());
    }

    /// Cancel the watch task and disconnect from the host.
    async fn release(&self, active: ActiveSubscription) {
        active.cancel.cancel();
        if let Err(e) = self.host.disconnect(&active.id).await {
            warn!("Failed to disconnect subscription {}: {}", active.id, e);
        }
    }

    /// Record a failure and move to `Error`.
    ///
    /// `epoch` is `None` during setup. Failures from a session that has
    /// already ended are logged and otherwise ignored.
    pub(crate) async fn set_error(&self, epoch: Option<u64>, message: String) {
        let outcome = {
            let mut session = self.session.lock();
            match epoch {
                None => session.fail_start(message.clone()).then_some(None),
                Some(epoch) => session
                    .leave_running(BotState::Error, Some(message.clone()), Some(epoch))
                    .map(Some),
            }
        };

        match outcome {
            Some(released) => {
                error!("Bot error: {}", message);
                self.publish();
                if let Some(active) = released {
                    self.release(active).await;
                }
            }
            None => warn!("Ignoring failure from an ended session: {}", message),
        }
    }

    /// Game over: `Running` → `Idle`.
    pub(crate) async fn finish(&self, epoch: u64) {
        let released = self
            .session
            .lock()
            .leave_running(BotState::Idle, None, Some(epoch));
        if let Some(active) = released {
            info!("Game over, bot stopped");
            self.publish();
            self.release(active).await;
        }
    }

    pub(crate) fn spawn_cycle(self: &Arc<Self>, epoch: u64, snapshot: Option<MoveSequence>) {
        tokio::spawn(Arc::clone(self).run_cycle(epoch, snapshot));
    }

    /// Extract (unless given a snapshot), request a move and inject it.
    async fn run_cycle(self: Arc<Self>, epoch: u64, snapshot: Option<MoveSequence>) {
        if !self.session.lock().begin_cycle(epoch) {
            debug!("Skipping cycle for an ended session");
            return;
        }

        let moves = match snapshot {
            Some(moves) => moves,
            None => match self.extractor.extract(self.host.as_ref()).await {
                Ok(moves) => moves,
                Err(e) => {
                    self.set_error(Some(epoch), format!("Move extraction failed: {}", e))
                        .await;
                    return;
                }
            },
        };
        debug!("Requesting a move for {} plies", moves.len());

        let mut task = RetryTask::new(self.options.retry.clone());
        let outcome = task
            .run(
                self.recommender.as_ref(),
                &moves,
                || self.is_current(epoch),
                |count| self.session.lock().record_retry(epoch, count),
            )
            .await;

        let mv = match outcome {
            RetryOutcome::Resolved(mv) => mv,
            RetryOutcome::Exhausted {
                attempts,
                last_error,
            } => {
                let message = format!(
                    "Engine request failed after {} attempts: {}",
                    attempts, last_error
                );
                self.set_error(Some(epoch), message).await;
                return;
            }
            RetryOutcome::Abandoned { attempts } => {
                debug!("Cycle abandoned after {} failed attempts", attempts);
                return;
            }
        };

        if self.options.discard_stale_moves && !self.is_current(epoch) {
            info!("Discarding move {} from an ended session", mv);
            return;
        }

        match self.injector.inject(self.host.as_ref(), &mv).await {
            Ok(()) => info!("Played {}", mv),
            Err(e) => {
                self.set_error(Some(epoch), format!("Move injection failed: {}", e))
                    .await
            }
        }
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
