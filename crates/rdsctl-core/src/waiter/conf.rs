//! The state-change poll loop
//!
//! A [`StateChangeConf`] describes one wait: which statuses mean "still
//! working", which mean "done", how often to look, and how long to wait in
//! total. It is built fresh for every operation and consumed by the wait.

use std::fmt;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::error::{WaitError, WaitResult};
use super::event::{WaitEvent, WaitEventCallback, emit};
use super::refresh::{Probe, ProbeResult, Refresh};

/// Consecutive not-found probes tolerated when not configured
pub const DEFAULT_NOT_FOUND_CHECKS: u32 = 20;

/// Consecutive target observations required when not configured
pub const DEFAULT_CONTINUOUS_TARGET_OCCURRENCE: u32 = 1;

/// First backoff wait when no fixed poll interval is set
const INITIAL_BACKOFF: Duration = Duration::from_millis(100);

/// Upper bound of the backoff wait
const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// Stand-in for "never" when a timeout or wait does not fit in an `Instant`
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Poll configuration for a single wait
///
/// # Example
///
/// ```rust,ignore
/// use rdsctl_core::waiter::StateChangeConf;
/// use std::time::Duration;
///
/// let cluster = StateChangeConf::new(probe, Duration::from_secs(7200))
///     .pending([ClusterStatus::Creating, ClusterStatus::BackingUp])
///     .target([ClusterStatus::Available])
///     .delay(Duration::from_secs(30))
///     .min_timeout(Duration::from_secs(10))
///     .wait_for_state()
///     .await?;
/// ```
pub struct StateChangeConf<R: Refresh> {
    pending: Vec<R::Status>,
    target: Vec<R::Status>,
    refresh: R,
    timeout: Duration,
    delay: Duration,
    poll_interval: Option<Duration>,
    min_timeout: Duration,
    not_found_checks: u32,
    continuous_target_occurrence: u32,
    cancel: Option<CancellationToken>,
    on_event: Option<WaitEventCallback>,
}

impl<R> StateChangeConf<R>
where
    R: Refresh,
    R::Object: fmt::Debug,
{
    /// Start a poll configuration with default tuning
    ///
    /// `timeout` bounds the whole wait, initial delay included.
    pub fn new(refresh: R, timeout: Duration) -> Self {
        Self {
            pending: Vec::new(),
            target: Vec::new(),
            refresh,
            timeout,
            delay: Duration::ZERO,
            poll_interval: None,
            min_timeout: Duration::ZERO,
            not_found_checks: DEFAULT_NOT_FOUND_CHECKS,
            continuous_target_occurrence: DEFAULT_CONTINUOUS_TARGET_OCCURRENCE,
            cancel: None,
            on_event: None,
        }
    }

    /// Statuses tolerated while waiting
    pub fn pending(mut self, statuses: impl IntoIterator<Item = R::Status>) -> Self {
        self.pending = statuses.into_iter().collect();
        self
    }

    /// Statuses that complete the wait
    pub fn target(mut self, statuses: impl IntoIterator<Item = R::Status>) -> Self {
        self.target = statuses.into_iter().collect();
        self
    }

    /// Sleep before the first probe
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fixed wait between probes; zero falls back to backoff
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = (!interval.is_zero()).then_some(interval);
        self
    }

    /// Smallest wait between probes when backing off
    pub fn min_timeout(mut self, min_timeout: Duration) -> Self {
        self.min_timeout = min_timeout;
        self
    }

    pub fn not_found_checks(mut self, checks: u32) -> Self {
        self.not_found_checks = checks;
        self
    }

    /// Consecutive target observations required; zero is treated as one
    pub fn continuous_target_occurrence(mut self, occurrences: u32) -> Self {
        self.continuous_target_occurrence = occurrences;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Abort the wait when `token` is cancelled
    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn on_event(mut self, callback: WaitEventCallback) -> Self {
        self.on_event = Some(callback);
        self
    }

    /// Wait until the object reports a target status
    ///
    /// Returns the object from the probe that completed the wait.
    pub async fn wait_for_state(self) -> WaitResult<R::Object> {
        if self.target.is_empty() {
            return Err(WaitError::InvalidConfig(
                "no target states given; use wait_until_gone to wait for removal".to_string(),
            ));
        }

        match self.run(false).await? {
            Some(object) => Ok(object),
            None => Err(WaitError::InvalidConfig(
                "wait finished without an object".to_string(),
            )),
        }
    }

    /// Wait until the object disappears (or reports a target status)
    ///
    /// Not-found results count towards the target instead of consuming the
    /// not-found tolerance. Returns the last object seen, if any.
    pub async fn wait_until_gone(self) -> Result<Option<R::Object>, WaitError<R::Object>> {
        self.run(true).await
    }

    async fn run(self, until_gone: bool) -> Result<Option<R::Object>, WaitError<R::Object>> {
        let StateChangeConf {
            pending,
            target,
            mut refresh,
            timeout,
            delay,
            poll_interval,
            min_timeout,
            not_found_checks,
            continuous_target_occurrence,
            cancel,
            on_event,
        } = self;

        let occurrences = continuous_target_occurrence.max(1);
        let mut expected: Vec<String> = target.iter().map(ToString::to_string).collect();
        if until_gone && expected.is_empty() {
            expected.push("gone".to_string());
        }

        let start = Instant::now();
        let deadline = later(start, timeout);
        let mut seen = Seen::<R::Object>::new(start, timeout, expected);

        let mut attempts = 0u32;
        let mut target_hits = 0u32;
        let mut not_found = 0u32;
        let mut backoff = INITIAL_BACKOFF;

        emit(&on_event, WaitEvent::Started { timeout, delay });
        debug!(
            ?timeout,
            ?delay,
            target = ?seen.expected,
            "waiting for resource state"
        );

        if !delay.is_zero()
            && let Err(interrupt) = pause(cancel.as_ref(), delay, deadline).await
        {
            return Err(fail(&on_event, start, seen.interrupted(interrupt)));
        }

        loop {
            attempts += 1;

            let probe = match observe(&mut refresh, cancel.as_ref(), deadline).await {
                Ok(Ok(probe)) => probe,
                Ok(Err(e)) => return Err(fail(&on_event, start, WaitError::Probe(e))),
                Err(interrupt) => return Err(fail(&on_event, start, seen.interrupted(interrupt))),
            };
            let elapsed = start.elapsed();

            match probe {
                Probe::NotFound => {
                    trace!(attempt = attempts, "resource not found");

                    if until_gone {
                        target_hits += 1;
                        emit(
                            &on_event,
                            WaitEvent::NotFound {
                                attempt: attempts,
                                consecutive: target_hits,
                                elapsed,
                            },
                        );
                        if target_hits >= occurrences {
                            emit(&on_event, WaitEvent::Completed { attempts, elapsed });
                            return Ok(seen.last);
                        }
                    } else {
                        target_hits = 0;
                        not_found += 1;
                        emit(
                            &on_event,
                            WaitEvent::NotFound {
                                attempt: attempts,
                                consecutive: not_found,
                                elapsed,
                            },
                        );
                        if not_found > not_found_checks {
                            return Err(fail(
                                &on_event,
                                start,
                                WaitError::NotFound { retries: not_found },
                            ));
                        }
                    }
                }
                Probe::Found { object, status } => {
                    not_found = 0;
                    let state = status.to_string();
                    trace!(attempt = attempts, status = %state, "refreshed resource state");
                    emit(
                        &on_event,
                        WaitEvent::Polling {
                            attempt: attempts,
                            status: state.clone(),
                            elapsed,
                        },
                    );

                    if target.contains(&status) {
                        target_hits += 1;
                        if target_hits >= occurrences {
                            emit(&on_event, WaitEvent::Completed { attempts, elapsed });
                            return Ok(Some(object));
                        }
                    } else {
                        target_hits = 0;
                        if !pending.contains(&status) {
                            let err = WaitError::UnexpectedState {
                                state,
                                expected: seen.expected,
                                object,
                            };
                            return Err(fail(&on_event, start, err));
                        }
                    }

                    seen.last_state = Some(state);
                    seen.last = Some(object);
                }
            }

            let wait = match poll_interval {
                Some(interval) => interval,
                None => {
                    let wait = bounded_backoff(backoff, min_timeout);
                    if target_hits == 0 {
                        backoff = (backoff * 2).min(MAX_BACKOFF);
                    }
                    wait
                }
            };

            debug!(?wait, attempt = attempts, target_hits, "waiting before next refresh");
            emit(
                &on_event,
                WaitEvent::Sleeping {
                    attempt: attempts,
                    wait,
                },
            );
            if let Err(interrupt) = pause(cancel.as_ref(), wait, deadline).await {
                return Err(fail(&on_event, start, seen.interrupted(interrupt)));
            }
        }
    }
}

/// What stopped a sleep or an in-flight probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interrupt {
    Deadline,
    Cancelled,
}

/// Last observation, kept for timeout diagnostics
struct Seen<T> {
    start: Instant,
    timeout: Duration,
    expected: Vec<String>,
    last: Option<T>,
    last_state: Option<String>,
}

impl<T: fmt::Debug> Seen<T> {
    fn new(start: Instant, timeout: Duration, expected: Vec<String>) -> Self {
        Self {
            start,
            timeout,
            expected,
            last: None,
            last_state: None,
        }
    }

    fn interrupted(self, interrupt: Interrupt) -> WaitError<T> {
        match interrupt {
            Interrupt::Deadline => WaitError::Timeout {
                timeout: self.timeout,
                last_state: self.last_state,
                expected: self.expected,
                last: self.last,
            },
            Interrupt::Cancelled => WaitError::Cancelled {
                elapsed: self.start.elapsed(),
            },
        }
    }
}

fn fail<T: fmt::Debug>(
    on_event: &Option<WaitEventCallback>,
    start: Instant,
    err: WaitError<T>,
) -> WaitError<T> {
    debug!(error = %err, "wait failed");
    emit(
        on_event,
        WaitEvent::Failed {
            error: err.to_string(),
            elapsed: start.elapsed(),
        },
    );
    err
}

/// `from + by`, or a far-future instant when that overflows
fn later(from: Instant, by: Duration) -> Instant {
    from.checked_add(by).unwrap_or_else(|| from + FAR_FUTURE)
}

fn bounded_backoff(backoff: Duration, min_timeout: Duration) -> Duration {
    if backoff < min_timeout {
        min_timeout
    } else if backoff > MAX_BACKOFF {
        MAX_BACKOFF
    } else {
        backoff
    }
}

/// Run one probe, bounded by the deadline and the cancellation token
async fn observe<R: Refresh>(
    refresh: &mut R,
    cancel: Option<&CancellationToken>,
    deadline: Instant,
) -> Result<ProbeResult<R::Object, R::Status>, Interrupt> {
    let probe = tokio::time::timeout_at(deadline, refresh.refresh());
    match cancel {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => Err(Interrupt::Cancelled),
            res = probe => res.map_err(|_| Interrupt::Deadline),
        },
        None => probe.await.map_err(|_| Interrupt::Deadline),
    }
}

/// Sleep for `wait`, cut short at the deadline or on cancellation
async fn pause(
    cancel: Option<&CancellationToken>,
    wait: Duration,
    deadline: Instant,
) -> Result<(), Interrupt> {
    let wake = later(Instant::now(), wait);
    let crosses_deadline = wake > deadline;
    let sleep = tokio::time::sleep_until(if crosses_deadline { deadline } else { wake });

    match cancel {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => return Err(Interrupt::Cancelled),
            _ = sleep => {}
        },
        None => sleep.await,
    }

    if crosses_deadline {
        Err(Interrupt::Deadline)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waiter::refresh::BoxError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    const TICK: Duration = Duration::from_secs(1);

    #[derive(Debug, Clone, Copy)]
    enum Step {
        State(&'static str),
        Missing,
        Fail(&'static str),
    }

    /// Probe that replays `steps`, repeating the last one forever.
    /// Objects are the 1-based probe number.
    fn scripted(
        steps: Vec<Step>,
    ) -> (
        impl Refresh<Object = u32, Status = &'static str>,
        Arc<AtomicU32>,
    ) {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let refresh = move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            let step = steps
                .get(n as usize - 1)
                .or(steps.last())
                .copied()
                .unwrap_or(Step::Missing);
            async move {
                match step {
                    Step::State(status) => Ok(Probe::found(n, status)),
                    Step::Missing => Ok(Probe::NotFound),
                    Step::Fail(msg) => Err(BoxError::from(msg)),
                }
            }
        };
        (refresh, calls)
    }

    fn creating_to_available(
        steps: Vec<Step>,
    ) -> (
        StateChangeConf<impl Refresh<Object = u32, Status = &'static str>>,
        Arc<AtomicU32>,
    ) {
        let (refresh, calls) = scripted(steps);
        let conf = StateChangeConf::new(refresh, 10 * TICK)
            .pending(["creating"])
            .target(["available"])
            .poll_interval(TICK);
        (conf, calls)
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_then_target_succeeds_with_third_object() {
        use Step::State;
        let (conf, calls) =
            creating_to_available(vec![State("creating"), State("creating"), State("available")]);

        let start = Instant::now();
        let object = conf.wait_for_state().await.unwrap();

        assert_eq!(object, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(start.elapsed(), 2 * TICK);
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_target_returns_after_initial_delay() {
        let (refresh, calls) = scripted(vec![Step::State("available")]);
        let start = Instant::now();

        let object = StateChangeConf::new(refresh, 10 * TICK)
            .pending(["creating"])
            .target(["available"])
            .delay(3 * TICK)
            .poll_interval(TICK)
            .wait_for_state()
            .await
            .unwrap();

        assert_eq!(object, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), 3 * TICK);
    }

    #[tokio::test(start_paused = true)]
    async fn test_n_pending_probes_then_target_takes_n_plus_one_probes() {
        for n in 0..5u32 {
            let mut steps = vec![Step::State("creating"); n as usize];
            steps.push(Step::State("available"));
            let (conf, calls) = creating_to_available(steps);

            let object = conf.wait_for_state().await.unwrap();

            assert_eq!(object, n + 1);
            assert_eq!(calls.load(Ordering::SeqCst), n + 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_status_fails_immediately() {
        use Step::State;
        let (conf, calls) = creating_to_available(vec![State("creating"), State("failed")]);

        let err = conf.wait_for_state().await.unwrap_err();

        match err {
            WaitError::UnexpectedState {
                state,
                expected,
                object,
            } => {
                assert_eq!(state, "failed");
                assert_eq!(expected, vec!["available".to_string()]);
                assert_eq!(object, 2);
            }
            other => panic!("expected UnexpectedState, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_status_fails_even_with_large_budget() {
        let (refresh, _) = scripted(vec![Step::State("incompatible-network")]);
        let start = Instant::now();

        let err = StateChangeConf::new(refresh, Duration::from_secs(86_400))
            .pending(["creating"])
            .target(["available"])
            .wait_for_state()
            .await
            .unwrap_err();

        assert!(err.is_unexpected_state());
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_pending_rejects_non_target_status() {
        let (refresh, _) = scripted(vec![Step::State("creating")]);

        let err = StateChangeConf::new(refresh, 10 * TICK)
            .target(["available"])
            .wait_for_state()
            .await
            .unwrap_err();

        assert!(err.is_unexpected_state());
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_exhausted_after_tolerance_plus_one() {
        let (refresh, calls) = scripted(vec![Step::Missing]);

        let err = StateChangeConf::new(refresh, 10 * TICK)
            .target(["deleted"])
            .not_found_checks(2)
            .poll_interval(TICK)
            .wait_for_state()
            .await
            .unwrap_err();

        assert!(matches!(err, WaitError::NotFound { retries: 3 }));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_counter_resets_on_found() {
        use Step::{Missing, State};
        let (refresh, calls) = scripted(vec![
            Missing,
            Missing,
            State("creating"),
            Missing,
            Missing,
            State("available"),
        ]);

        let object = StateChangeConf::new(refresh, 10 * TICK)
            .pending(["creating"])
            .target(["available"])
            .not_found_checks(2)
            .poll_interval(TICK)
            .wait_for_state()
            .await
            .unwrap();

        assert_eq!(object, 6);
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_not_found_checks_fails_on_first_miss() {
        let (refresh, calls) = scripted(vec![Step::Missing]);

        let err = StateChangeConf::new(refresh, 10 * TICK)
            .target(["available"])
            .not_found_checks(0)
            .wait_for_state()
            .await
            .unwrap_err();

        assert!(matches!(err, WaitError::NotFound { retries: 1 }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_continuous_occurrence_resets_on_pending() {
        use Step::State;
        let (refresh, calls) = scripted(vec![
            State("available"),
            State("creating"),
            State("available"),
            State("available"),
        ]);

        let object = StateChangeConf::new(refresh, 10 * TICK)
            .pending(["creating"])
            .target(["available"])
            .continuous_target_occurrence(2)
            .poll_interval(TICK)
            .wait_for_state()
            .await
            .unwrap();

        assert_eq!(object, 4);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_continuous_occurrence_requires_k_matches_after_reset() {
        use Step::State;
        let (refresh, calls) = scripted(vec![
            State("available"),
            State("available"),
            State("modifying"),
            State("available"),
            State("available"),
            State("available"),
        ]);

        let object = StateChangeConf::new(refresh, 20 * TICK)
            .pending(["modifying"])
            .target(["available"])
            .continuous_target_occurrence(3)
            .poll_interval(TICK)
            .wait_for_state()
            .await
            .unwrap();

        assert_eq!(object, 6);
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_reports_last_state_and_object() {
        let (refresh, calls) = scripted(vec![Step::State("creating")]);
        let start = Instant::now();

        let err = StateChangeConf::new(refresh, 10 * TICK)
            .pending(["creating"])
            .target(["available"])
            .poll_interval(3 * TICK)
            .wait_for_state()
            .await
            .unwrap_err();

        // probes at 0, 3, 6 and 9; the next sleep would cross 10
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(start.elapsed(), 10 * TICK);
        match err {
            WaitError::Timeout {
                timeout,
                last_state,
                last,
                ..
            } => {
                assert_eq!(timeout, 10 * TICK);
                assert_eq!(last_state.as_deref(), Some("creating"));
                assert_eq!(last, Some(4));
            }
            other => panic!("expected Timeout, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_longer_than_timeout_times_out_without_probing() {
        let (refresh, calls) = scripted(vec![Step::State("available")]);

        let err = StateChangeConf::new(refresh, 5 * TICK)
            .target(["available"])
            .delay(6 * TICK)
            .wait_for_state()
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(err.last_object().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_probe_is_abandoned_at_deadline() {
        let refresh = || async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, BoxError>(Probe::found(1u32, "available"))
        };
        let start = Instant::now();

        let err = StateChangeConf::new(refresh, 10 * TICK)
            .target(["available"])
            .wait_for_state()
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert_eq!(start.elapsed(), 10 * TICK);
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_error_is_fatal_and_untranslated() {
        use Step::{Fail, State};
        let (refresh, calls) =
            scripted(vec![State("creating"), Fail("throttled by control plane")]);

        let err = StateChangeConf::new(refresh, 10 * TICK)
            .pending(["creating"])
            .target(["available"])
            .poll_interval(TICK)
            .wait_for_state()
            .await
            .unwrap_err();

        assert!(matches!(err, WaitError::Probe(_)));
        assert_eq!(err.to_string(), "throttled by control plane");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_sleep() {
        let (refresh, calls) = scripted(vec![Step::State("creating")]);
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            trigger.cancel();
        });
        let start = Instant::now();

        let err = StateChangeConf::new(refresh, Duration::from_secs(3600))
            .pending(["creating"])
            .target(["available"])
            .poll_interval(Duration::from_secs(60))
            .cancel_on(token)
            .wait_for_state()
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_cancelled_token_stops_before_probing() {
        let (refresh, calls) = scripted(vec![Step::State("available")]);
        let token = CancellationToken::new();
        token.cancel();

        let err = StateChangeConf::new(refresh, 10 * TICK)
            .target(["available"])
            .cancel_on(token)
            .wait_for_state()
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_target_is_invalid_for_wait_for_state() {
        let (refresh, calls) = scripted(vec![Step::State("available")]);

        let err = StateChangeConf::new(refresh, 10 * TICK)
            .pending(["creating"])
            .wait_for_state()
            .await
            .unwrap_err();

        assert!(matches!(err, WaitError::InvalidConfig(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_until_gone_returns_last_seen_object() {
        use Step::{Missing, State};
        let (refresh, calls) = scripted(vec![State("deleting"), State("deleting"), Missing]);

        let last = StateChangeConf::new(refresh, 10 * TICK)
            .pending(["available", "deleting"])
            .poll_interval(TICK)
            .wait_until_gone()
            .await
            .unwrap();

        assert_eq!(last, Some(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_until_gone_requires_continuous_absence() {
        use Step::{Missing, State};
        let (refresh, calls) = scripted(vec![
            Missing,
            State("deleting"),
            Missing,
            Missing,
            Missing,
        ]);

        let last = StateChangeConf::new(refresh, 20 * TICK)
            .pending(["deleting"])
            .continuous_target_occurrence(3)
            .poll_interval(TICK)
            .wait_until_gone()
            .await
            .unwrap();

        assert_eq!(last, Some(2));
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_until_gone_timeout_names_gone() {
        let (refresh, _) = scripted(vec![Step::State("deleting")]);

        let err = StateChangeConf::new(refresh, 5 * TICK)
            .pending(["deleting"])
            .poll_interval(TICK)
            .wait_until_gone()
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert!(err.to_string().contains("become 'gone'"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_without_poll_interval() {
        let (refresh, calls) = scripted(vec![
            Step::State("creating"),
            Step::State("creating"),
            Step::State("creating"),
            Step::State("available"),
        ]);
        let start = Instant::now();

        StateChangeConf::new(refresh, 60 * TICK)
            .pending(["creating"])
            .target(["available"])
            .wait_for_state()
            .await
            .unwrap();

        // 100ms + 200ms + 400ms
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(start.elapsed(), Duration::from_millis(700));
    }

    #[tokio::test(start_paused = true)]
    async fn test_min_timeout_floors_backoff() {
        let (refresh, _) = scripted(vec![
            Step::State("creating"),
            Step::State("creating"),
            Step::State("available"),
        ]);
        let start = Instant::now();

        StateChangeConf::new(refresh, 60 * TICK)
            .pending(["creating"])
            .target(["available"])
            .min_timeout(Duration::from_secs(10))
            .wait_for_state()
            .await
            .unwrap();

        assert_eq!(start.elapsed(), Duration::from_secs(20));
    }

    #[test]
    fn test_bounded_backoff() {
        let ms = Duration::from_millis;
        assert_eq!(bounded_backoff(ms(100), Duration::ZERO), ms(100));
        assert_eq!(bounded_backoff(ms(100), ms(500)), ms(500));
        assert_eq!(bounded_backoff(ms(20_000), Duration::ZERO), MAX_BACKOFF);
        assert_eq!(
            bounded_backoff(ms(100), Duration::from_secs(30)),
            Duration::from_secs(30)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_are_emitted_in_order() {
        use Step::{Missing, State};
        let (refresh, _) = scripted(vec![Missing, State("creating"), State("available")]);
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();

        StateChangeConf::new(refresh, 10 * TICK)
            .pending(["creating"])
            .target(["available"])
            .poll_interval(TICK)
            .on_event(Arc::new(move |event: &WaitEvent| {
                sink.lock().unwrap().push(event.clone());
            }))
            .wait_for_state()
            .await
            .unwrap();

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 7);
        assert!(matches!(events[0], WaitEvent::Started { .. }));
        assert!(matches!(
            events[1],
            WaitEvent::NotFound {
                attempt: 1,
                consecutive: 1,
                ..
            }
        ));
        assert_eq!(
            events[2],
            WaitEvent::Sleeping {
                attempt: 1,
                wait: TICK
            }
        );
        assert!(matches!(&events[3], WaitEvent::Polling { status, .. } if status == "creating"));
        assert!(matches!(events[4], WaitEvent::Sleeping { attempt: 2, .. }));
        assert!(matches!(&events[5], WaitEvent::Polling { status, .. } if status == "available"));
        assert!(matches!(
            events[6],
            WaitEvent::Completed { attempts: 3, .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_absence_events_report_streak() {
        use Step::{Missing, State};
        let (refresh, _) = scripted(vec![
            Missing,
            State("deleting"),
            Missing,
            Missing,
            Missing,
        ]);
        let streaks = Arc::new(Mutex::new(Vec::new()));
        let sink = streaks.clone();

        StateChangeConf::new(refresh, 20 * TICK)
            .pending(["deleting"])
            .continuous_target_occurrence(3)
            .poll_interval(TICK)
            .on_event(Arc::new(move |event: &WaitEvent| {
                if let WaitEvent::NotFound { consecutive, .. } = event {
                    sink.lock().unwrap().push(*consecutive);
                }
            }))
            .wait_until_gone()
            .await
            .unwrap();

        assert_eq!(*streaks.lock().unwrap(), vec![1, 1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_timeout_does_not_overflow() {
        use Step::State;
        let (refresh, calls) = scripted(vec![State("creating"), State("available")]);
        let start = Instant::now();

        let object = StateChangeConf::new(refresh, Duration::from_secs(u64::MAX))
            .pending(["creating"])
            .target(["available"])
            .poll_interval(TICK)
            .wait_for_state()
            .await
            .unwrap();

        assert_eq!(object, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(start.elapsed(), TICK);
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_poll_interval_times_out_at_deadline() {
        let (refresh, calls) = scripted(vec![Step::State("creating")]);
        let start = Instant::now();

        let err = StateChangeConf::new(refresh, 10 * TICK)
            .pending(["creating"])
            .target(["available"])
            .poll_interval(Duration::from_secs(u64::MAX))
            .wait_for_state()
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), 10 * TICK);
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_delay_times_out_without_probing() {
        let (refresh, calls) = scripted(vec![Step::State("available")]);

        let err = StateChangeConf::new(refresh, 5 * TICK)
            .target(["available"])
            .delay(Duration::from_secs(u64::MAX))
            .wait_for_state()
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_later_saturates_to_far_future() {
        let now = Instant::now();
        assert_eq!(later(now, TICK), now + TICK);
        assert_eq!(later(now, Duration::MAX), now + FAR_FUTURE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_independent_waiters_run_concurrently() {
        let (slow, _) = scripted(vec![
            Step::State("creating"),
            Step::State("creating"),
            Step::State("available"),
        ]);
        let (fast, _) = scripted(vec![Step::State("available")]);
        let start = Instant::now();

        let (a, b) = tokio::join!(
            StateChangeConf::new(slow, 10 * TICK)
                .pending(["creating"])
                .target(["available"])
                .poll_interval(TICK)
                .wait_for_state(),
            StateChangeConf::new(fast, 10 * TICK)
                .target(["available"])
                .wait_for_state(),
        );

        assert_eq!(a.unwrap(), 3);
        assert_eq!(b.unwrap(), 1);
        assert_eq!(start.elapsed(), 2 * TICK);
    }
}
