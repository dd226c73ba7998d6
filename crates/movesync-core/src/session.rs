//! Controller session state.

use tokio_util::sync::CancellationToken;

use movesync_protocols::{BotState, BotStatus, SubscriptionId};

use crate::toggle::{MoveToggle, TogglePhase};

/// The active move-list subscription and the token stopping its watch task.
#[derive(Debug)]
pub(crate) struct ActiveSubscription {
    pub id: SubscriptionId,
    pub cancel: CancellationToken,
}

/// Everything the controller mutates, in one place.
///
/// A subscription is held exactly while the state is `Running`. The epoch
/// changes every time `Running` is entered or left, so work started under an
/// older epoch can tell that it is stale.
#[derive(Debug, Default)]
pub struct Session {
    state: BotState,
    last_error: Option<String>,
    retry_count: u32,
    toggle: MoveToggle,
    subscription: Option<ActiveSubscription>,
    epoch: u64,
    starting: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> BotState {
        self.state
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn has_subscription(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn status(&self) -> BotStatus {
        BotStatus {
            status: self.state,
            last_error: self.last_error.clone(),
        }
    }

    /// Claim the right to run setup. Fails while running or already starting.
    pub(crate) fn begin_start(&mut self) -> bool {
        if self.state == BotState::Running || self.starting {
            return false;
        }
        self.starting = true;
        self.toggle.reset();
        self.retry_count = 0;
        self.last_error = None;
        true
    }

    /// Finish setup successfully and return the new epoch.
    ///
    /// Hands the subscription back when the start was aborted meanwhile.
    pub(crate) fn enter_running(
        &mut self,
        subscription: ActiveSubscription,
    ) -> Result<u64, ActiveSubscription> {
        if !self.starting {
            return Err(subscription);
        }
        debug_assert!(self.subscription.is_none());
        self.starting = false;
        self.state = BotState::Running;
        self.subscription = Some(subscription);
        self.epoch += 1;
        Ok(self.epoch)
    }

    /// Finish setup with a failure. Ignored when the start was aborted.
    pub(crate) fn fail_start(&mut self, message: String) -> bool {
        if !self.starting {
            return false;
        }
        self.starting = false;
        self.state = BotState::Error;
        self.last_error = Some(message);
        true
    }

    /// Abandon a start that has not reached `Running` yet.
    pub(crate) fn abort_start(&mut self) -> bool {
        if !self.starting {
            return false;
        }
        self.starting = false;
        self.state = BotState::Idle;
        true
    }

    /// Leave `Running` for `next`, handing back the subscription to release.
    ///
    /// Returns `None` without changing anything when not running or when
    /// `epoch` names an older run.
    pub(crate) fn leave_running(
        &mut self,
        next: BotState,
        message: Option<String>,
        epoch: Option<u64>,
    ) -> Option<ActiveSubscription> {
        if self.state != BotState::Running {
            return None;
        }
        if epoch.is_some_and(|e| e != self.epoch) {
            return None;
        }
        self.state = next;
        self.last_error = message;
        self.epoch += 1;
        self.subscription.take()
    }

    /// Whether work started under `epoch` may still act.
    pub(crate) fn is_current(&self, epoch: u64) -> bool {
        self.state == BotState::Running && self.epoch == epoch
    }

    /// Start a move-request cycle: the retry counter goes back to zero.
    pub(crate) fn begin_cycle(&mut self, epoch: u64) -> bool {
        if !self.is_current(epoch) {
            return false;
        }
        self.retry_count = 0;
        true
    }

    pub(crate) fn record_retry(&mut self, epoch: u64, count: u32) {
        if self.is_current(epoch) {
            self.retry_count = count;
        }
    }

    /// Feed one notification through the toggle.
    pub(crate) fn flip_toggle(&mut self) -> TogglePhase {
        self.toggle.flip()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscription(id: &str) -> ActiveSubscription {
        ActiveSubscription {
            id: id.to_string(),
            cancel: CancellationToken::new(),
        }
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = Session::new();
        assert_eq!(session.state(), BotState::Idle);
        assert!(!session.has_subscription());
        assert_eq!(session.status(), BotStatus::idle());
    }

    #[test]
    fn test_subscription_held_iff_running() {
        let mut session = Session::new();
        assert!(session.begin_start());
        assert!(!session.has_subscription());

        let epoch = session.enter_running(subscription("sub-1")).unwrap();
        assert_eq!(session.state(), BotState::Running);
        assert!(session.has_subscription());

        let released = session.leave_running(BotState::Idle, None, Some(epoch));
        assert_eq!(released.map(|s| s.id), Some("sub-1".to_string()));
        assert_eq!(session.state(), BotState::Idle);
        assert!(!session.has_subscription());
    }

    #[test]
    fn test_begin_start_rejected_while_running() {
        let mut session = Session::new();
        session.begin_start();
        assert!(!session.begin_start());
        session.enter_running(subscription("sub-1")).unwrap();
        assert!(!session.begin_start());
    }

    #[test]
    fn test_begin_start_resets_cycle_state() {
        let mut session = Session::new();
        session.begin_start();
        session.fail_start("boom".to_string());
        assert_eq!(session.last_error(), Some("boom"));

        session.flip_toggle();
        assert!(session.begin_start());
        assert_eq!(session.last_error(), None);
        assert_eq!(session.retry_count(), 0);
        assert_eq!(session.flip_toggle(), TogglePhase::Swallowed);
    }

    #[test]
    fn test_stale_epoch_cannot_leave_running() {
        let mut session = Session::new();
        session.begin_start();
        let first = session.enter_running(subscription("sub-1")).unwrap();
        session.leave_running(BotState::Idle, None, None);

        session.begin_start();
        let second = session.enter_running(subscription("sub-2")).unwrap();
        assert_ne!(first, second);
        assert!(!session.is_current(first));
        assert!(session.is_current(second));

        let released = session.leave_running(BotState::Error, Some("late".to_string()), Some(first));
        assert!(released.is_none());
        assert_eq!(session.state(), BotState::Running);
    }

    #[test]
    fn test_aborted_start_returns_subscription() {
        let mut session = Session::new();
        session.begin_start();
        assert!(session.abort_start());

        let rejected = session.enter_running(subscription("sub-1"));
        assert_eq!(rejected.err().map(|s| s.id), Some("sub-1".to_string()));
        assert_eq!(session.state(), BotState::Idle);
        assert!(!session.has_subscription());
        assert!(!session.fail_start("late".to_string()));
        assert!(!session.abort_start());
    }

    #[test]
    fn test_leave_running_when_idle_is_noop() {
        let mut session = Session::new();
        assert!(session.leave_running(BotState::Idle, None, None).is_none());
        assert_eq!(session.state(), BotState::Idle);
    }

    #[test]
    fn test_cycle_resets_retry_counter() {
        let mut session = Session::new();
        session.begin_start();
        let epoch = session.enter_running(subscription("sub-1")).unwrap();

        assert!(session.begin_cycle(epoch));
        session.record_retry(epoch, 2);
        assert_eq!(session.retry_count(), 2);

        assert!(session.begin_cycle(epoch));
        assert_eq!(session.retry_count(), 0);
        assert!(!session.begin_cycle(epoch + 1));
    }

    #[test]
    fn test_error_status_carries_message() {
        let mut session = Session::new();
        session.begin_start();
        let epoch = session.enter_running(subscription("sub-1")).unwrap();
        session.leave_running(BotState::Error, Some("engine down".to_string()), Some(epoch));

        assert_eq!(session.status(), BotStatus::error("engine down"));
    }
}
