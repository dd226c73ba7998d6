//! Bounded retry for a single move-request cycle.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use movesync_config::RetryConfig;
use movesync_protocols::{EngineError, MoveNotation, MoveRecommender, MoveSequence};

/// Retry configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Failures tolerated per cycle. The cycle escalates when the failure
    /// count reaches this value, so this is also the maximum number of
    /// requests issued.
    pub max_retries: u32,
    /// Fixed delay before resending.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Duration::from_secs(1),
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff: Duration::from_millis(config.backoff_ms),
        }
    }
}

/// How a retry task ended.
#[derive(Debug)]
pub enum RetryOutcome {
    /// The service recommended a move.
    Resolved(MoveNotation),
    /// Every allowed request failed.
    Exhausted { attempts: u32, last_error: EngineError },
    /// The cycle went stale during a backoff; nothing more was sent.
    Abandoned { attempts: u32 },
}

/// One cycle's request loop with explicit attempt state.
///
/// The same [`MoveSequence`] is resent on every attempt; it is never
/// re-extracted.
#[derive(Debug)]
pub struct RetryTask {
    policy: RetryPolicy,
    retry_count: u32,
}

impl RetryTask {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            retry_count: 0,
        }
    }

    #[cfg(test)]
    fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Request a move until it resolves, the policy is exhausted or
    /// `is_current` reports the cycle stale after a backoff.
    ///
    /// `on_failure` observes the failure count after every failed request.
    pub async fn run<C, F>(
        &mut self,
        recommender: &dyn MoveRecommender,
        moves: &MoveSequence,
        mut is_current: C,
        mut on_failure: F,
    ) -> RetryOutcome
    where
        C: FnMut() -> bool,
        F: FnMut(u32),
    {
        loop {
            match recommender.recommend(moves).await {
                Ok(mv) => {
                    debug!("Recommendation received after {} failures: {}", self.retry_count, mv);
                    return RetryOutcome::Resolved(mv);
                }
                Err(e) => {
                    self.retry_count += 1;
                    on_failure(self.retry_count);

                    if self.retry_count >= self.policy.max_retries {
                        return RetryOutcome::Exhausted {
                            attempts: self.retry_count,
                            last_error: e,
                        };
                    }

                    warn!(
                        "Engine request failed (attempt {}/{}): {}, retrying in {:?}",
                        self.retry_count, self.policy.max_retries, e, self.policy.backoff
                    );
                    sleep(self.policy.backoff).await;

                    if !is_current() {
                        debug!("Cycle went stale during backoff, dropping retry");
                        return RetryOutcome::Abandoned {
                            attempts: self.retry_count,
                        };
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::ScriptedEngine;
    use std::cell::Cell;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_retries: 3,
            backoff: Duration::from_millis(1),
        }
    }

    fn moves() -> MoveSequence {
        MoveSequence::from(&["e4"][..])
    }

    #[test]
    fn test_policy_default() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.backoff, Duration::from_secs(1));
    }

    #[test]
    fn test_policy_from_config() {
        let config = RetryConfig {
            max_retries: 5,
            backoff_ms: 250,
        };
        let policy = RetryPolicy::from(&config);
        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.backoff, Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_resolves_first_try() {
        let engine = ScriptedEngine::answering("e7e5");
        let mut task = RetryTask::new(fast_policy());

        let outcome = task.run(&engine, &moves(), || true, |_| {}).await;
        assert!(matches!(outcome, RetryOutcome::Resolved(ref m) if m == "e7e5"));
        assert_eq!(task.retry_count(), 0);
        assert_eq!(engine.calls(), 1);
    }

    #[tokio::test]
    async fn test_resolves_after_failures() {
        let engine = ScriptedEngine::answering("e7e5");
        engine.fail_next(2);
        let mut task = RetryTask::new(fast_policy());

        let outcome = task.run(&engine, &moves(), || true, |_| {}).await;
        assert!(matches!(outcome, RetryOutcome::Resolved(_)));
        assert_eq!(task.retry_count(), 2);
        assert_eq!(engine.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_after_third_failure() {
        let engine = ScriptedEngine::answering("e7e5");
        engine.fail_next(10);
        let mut task = RetryTask::new(RetryPolicy::default());

        let outcome = task.run(&engine, &moves(), || true, |_| {}).await;
        match outcome {
            RetryOutcome::Exhausted { attempts, .. } => assert_eq!(attempts, 3),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(engine.calls(), 3);
    }

    #[tokio::test]
    async fn test_resends_same_sequence() {
        let engine = ScriptedEngine::answering("d7d5");
        engine.fail_next(2);
        let mut task = RetryTask::new(fast_policy());
        let sequence = MoveSequence::from(&["d4", "Nf6", "c4"][..]);

        task.run(&engine, &sequence, || true, |_| {}).await;
        let requests = engine.requests();
        assert_eq!(requests.len(), 3);
        assert!(requests.iter().all(|r| *r == sequence));
    }

    #[tokio::test]
    async fn test_failure_counter_is_monotonic() {
        let engine = ScriptedEngine::answering("d7d5");
        engine.fail_next(2);
        let mut task = RetryTask::new(fast_policy());
        let mut seen = Vec::new();

        task.run(&engine, &moves(), || true, |count| seen.push(count)).await;
        assert_eq!(seen, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_stale_cycle_abandons_retry() {
        let engine = ScriptedEngine::answering("e7e5");
        engine.fail_next(1);
        let mut task = RetryTask::new(fast_policy());

        let outcome = task.run(&engine, &moves(), || false, |_| {}).await;
        assert!(matches!(outcome, RetryOutcome::Abandoned { attempts: 1 }));
        assert_eq!(engine.calls(), 1);
    }

    #[tokio::test]
    async fn test_staleness_checked_after_each_backoff() {
        let engine = ScriptedEngine::answering("e7e5");
        engine.fail_next(5);
        let mut task = RetryTask::new(RetryPolicy {
            max_retries: 5,
            backoff: Duration::from_millis(1),
        });
        let checks = Cell::new(0);

        let outcome = task
            .run(
                &engine,
                &moves(),
                || {
                    checks.set(checks.get() + 1);
                    checks.get() < 2
                },
                |_| {},
            )
            .await;
        assert!(matches!(outcome, RetryOutcome::Abandoned { attempts: 2 }));
        assert_eq!(engine.calls(), 2);
    }

    #[tokio::test]
    async fn test_error_field_counts_like_http_failure() {
        let engine = ScriptedEngine::answering("e7e5");
        engine.push_error(EngineError::Service("no moves".to_string()));
        engine.push_error(EngineError::Status {
            status: 503,
            message: "busy".to_string(),
        });
        let mut task = RetryTask::new(fast_policy());

        let outcome = task.run(&engine, &moves(), || true, |_| {}).await;
        assert!(matches!(outcome, RetryOutcome::Resolved(_)));
        assert_eq!(task.retry_count(), 2);
    }
}
