// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Readiness waits
//!
//! Resources boot and shut down on their own schedule and never notify us, so
//! a transition is confirmed by polling a probe until the wanted state shows
//! up or a deadline passes. Each wait is a plain loop: probe, compare, sleep.
//!
//! Probe failures (launch error, non-zero exit, malformed output, probe
//! timeout) are logged and polling continues. With
//! `max_consecutive_probe_errors` set, that many failures in a row end the
//! wait early with [`WaitOutcome::ProbeError`].

use std::future::Future;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::Instrument;
use vmgate_adapters::{ProbeAdapter, ProbeError};
use vmgate_core::{observed_state, parse_listing, ReadinessConfig, ResourceObservedState};

/// What a single successful probe saw
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Observation {
    /// The resource is listed with this state
    State(ResourceObservedState),
    /// The resource is not in the listing
    Absent,
    /// The device identifier is not in the device listing
    Disconnected,
}

impl std::fmt::Display for Observation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::State(state) => write!(f, "{}", state),
            Self::Absent => write!(f, "absent"),
            Self::Disconnected => write!(f, "disconnected"),
        }
    }
}

/// Result of a readiness wait
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WaitOutcome {
    Ready {
        elapsed: Duration,
        polls: u32,
    },
    TimedOut {
        elapsed: Duration,
        polls: u32,
        /// Last thing a successful probe reported, if any probe succeeded
        last_observed: Option<Observation>,
        last_error: Option<ProbeError>,
    },
    /// Too many consecutive probe failures
    ProbeError {
        elapsed: Duration,
        polls: u32,
        consecutive_errors: u32,
        last_error: ProbeError,
    },
    /// The stop flag was raised
    Cancelled {
        elapsed: Duration,
        polls: u32,
    },
}

impl WaitOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    pub fn elapsed(&self) -> Duration {
        match self {
            Self::Ready { elapsed, .. }
            | Self::TimedOut { elapsed, .. }
            | Self::ProbeError { elapsed, .. }
            | Self::Cancelled { elapsed, .. } => *elapsed,
        }
    }

    pub fn polls(&self) -> u32 {
        match self {
            Self::Ready { polls, .. }
            | Self::TimedOut { polls, .. }
            | Self::ProbeError { polls, .. }
            | Self::Cancelled { polls, .. } => *polls,
        }
    }
}

impl std::fmt::Display for WaitOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready { elapsed, polls } => {
                write!(f, "ready after {:?} ({} polls)", elapsed, polls)
            }
            Self::TimedOut {
                elapsed,
                polls,
                last_observed,
                last_error,
            } => {
                write!(f, "timed out after {:?} ({} polls", elapsed, polls)?;
                if let Some(observed) = last_observed {
                    write!(f, ", last observed: {}", observed)?;
                }
                if let Some(error) = last_error {
                    write!(f, ", last probe error: {}", error)?;
                }
                write!(f, ")")
            }
            Self::ProbeError {
                elapsed,
                consecutive_errors,
                last_error,
                ..
            } => write!(
                f,
                "probe failed {} times in a row after {:?}: {}",
                consecutive_errors, elapsed, last_error
            ),
            Self::Cancelled { elapsed, .. } => write!(f, "cancelled after {:?}", elapsed),
        }
    }
}

/// Periodic report from a long wait
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WaitProgress {
    /// Resource name or device identifier being waited on
    pub subject: String,
    pub target: String,
    pub elapsed: Duration,
    pub polls: u32,
    pub last_observed: Option<Observation>,
}

struct Check {
    matched: bool,
    observed: Observation,
}

/// Polls a probe until a resource reaches a wanted state
#[derive(Clone)]
pub struct ReadinessWaiter<P> {
    probe: P,
    config: ReadinessConfig,
    cancel: Option<watch::Receiver<bool>>,
    progress: Option<mpsc::UnboundedSender<WaitProgress>>,
}

impl<P: ProbeAdapter> ReadinessWaiter<P> {
    pub fn new(probe: P, config: ReadinessConfig) -> Self {
        Self {
            probe,
            config,
            cancel: None,
            progress: None,
        }
    }

    /// End waits with [`WaitOutcome::Cancelled`] once `stop` reads `true`
    pub fn with_cancel(mut self, stop: watch::Receiver<bool>) -> Self {
        self.cancel = Some(stop);
        self
    }

    /// Send a [`WaitProgress`] every `progress_interval` of a wait
    pub fn with_progress(mut self, progress: mpsc::UnboundedSender<WaitProgress>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn config(&self) -> &ReadinessConfig {
        &self.config
    }

    /// Probe once and report the state of `name` (`None` if not listed)
    pub async fn observe(&self, name: &str) -> Result<Option<ResourceObservedState>, ProbeError> {
        let probe_timeout = self.config.probe_timeout;
        let listing = tokio::time::timeout(probe_timeout, self.probe.list_resources())
            .await
            .map_err(|_| ProbeError::TimedOut(probe_timeout))??;
        let records = parse_listing(&listing).map_err(|e| ProbeError::Malformed(e.to_string()))?;
        Ok(observed_state(&records, name))
    }

    /// Wait until `name` is observed in `target`
    ///
    /// A resource missing from the listing counts as `Stopped`.
    pub async fn wait_for_state(
        &self,
        name: &str,
        target: ResourceObservedState,
        timeout: Duration,
        poll_interval: Duration,
    ) -> WaitOutcome {
        let span = tracing::info_span!("readiness.wait", resource = name, want = %target);

        self.poll_until(name, &target.to_string(), timeout, poll_interval, move || async move {
            let observed = self.observe(name).await?;
            Ok(match observed {
                Some(state) => Check {
                    matched: state == target,
                    observed: Observation::State(state),
                },
                None => Check {
                    matched: target == ResourceObservedState::Stopped,
                    observed: Observation::Absent,
                },
            })
        })
        .instrument(span)
        .await
    }

    pub async fn wait_until_running(
        &self,
        name: &str,
        timeout: Duration,
        poll_interval: Duration,
    ) -> WaitOutcome {
        self.wait_for_state(name, ResourceObservedState::Running, timeout, poll_interval)
            .await
    }

    /// Wait until `name` is stopped or gone from the listing
    pub async fn wait_until_stopped(
        &self,
        name: &str,
        timeout: Duration,
        poll_interval: Duration,
    ) -> WaitOutcome {
        self.wait_for_state(name, ResourceObservedState::Stopped, timeout, poll_interval)
            .await
    }

    /// Wait until `serial` appears in the device listing
    pub async fn wait_for_device(
        &self,
        serial: &str,
        timeout: Duration,
        poll_interval: Duration,
    ) -> WaitOutcome {
        let span = tracing::info_span!("readiness.device", device = serial);
        let probe_timeout = self.config.probe_timeout;

        self.poll_until(serial, "connected", timeout, poll_interval, move || async move {
            let devices = tokio::time::timeout(probe_timeout, self.probe.list_devices())
                .await
                .map_err(|_| ProbeError::TimedOut(probe_timeout))??;
            let connected = devices.contains(serial);
            Ok(Check {
                matched: connected,
                observed: if connected {
                    Observation::State(ResourceObservedState::Running)
                } else {
                    Observation::Disconnected
                },
            })
        })
        .instrument(span)
        .await
    }

    async fn poll_until<F, Fut>(
        &self,
        subject: &str,
        target: &str,
        timeout: Duration,
        poll_interval: Duration,
        mut check: F,
    ) -> WaitOutcome
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Check, ProbeError>>,
    {
        let start = Instant::now();
        // None: the timeout is too large to represent, so the wait is unbounded
        let deadline = start.checked_add(timeout);
        let progress_interval = self.config.progress_interval;
        let mut next_progress = next_progress_after(start, progress_interval, start);
        let mut polls = 0u32;
        let mut consecutive_errors = 0u32;
        let mut last_observed: Option<Observation> = None;
        let mut last_error: Option<ProbeError> = None;

        loop {
            if self.is_cancelled() {
                tracing::info!(polls, "wait cancelled");
                return WaitOutcome::Cancelled {
                    elapsed: start.elapsed(),
                    polls,
                };
            }

            polls += 1;
            match check().await {
                Ok(Check { matched: true, .. }) => {
                    let elapsed = start.elapsed();
                    tracing::info!(elapsed_ms = elapsed.as_millis() as u64, polls, "ready");
                    return WaitOutcome::Ready { elapsed, polls };
                }
                Ok(Check { observed, .. }) => {
                    consecutive_errors = 0;
                    tracing::debug!(polls, observed = %observed, "not ready");
                    last_observed = Some(observed);
                }
                Err(error) => {
                    consecutive_errors += 1;
                    tracing::warn!(polls, consecutive_errors, error = %error, "probe failed, retrying");
                    if let Some(limit) = self.config.max_consecutive_probe_errors {
                        if consecutive_errors >= limit {
                            let elapsed = start.elapsed();
                            tracing::error!(
                                elapsed_ms = elapsed.as_millis() as u64,
                                consecutive_errors,
                                "probe unavailable, giving up"
                            );
                            return WaitOutcome::ProbeError {
                                elapsed,
                                polls,
                                consecutive_errors,
                                last_error: error,
                            };
                        }
                    }
                    last_error = Some(error);
                }
            }

            let now = Instant::now();
            if next_progress.is_some_and(|due| now >= due) {
                self.report_progress(subject, target, now - start, polls, &last_observed);
                next_progress = next_progress_after(start, progress_interval, now);
            }

            if deadline.is_some_and(|deadline| now >= deadline) {
                let elapsed = now - start;
                tracing::warn!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    polls,
                    last_observed = last_observed.as_ref().map(|o| o.to_string()).as_deref(),
                    "wait timed out"
                );
                return WaitOutcome::TimedOut {
                    elapsed,
                    polls,
                    last_observed,
                    last_error,
                };
            }

            // Never sleep past the deadline, so the final probe lands on it
            let pause = match deadline {
                Some(deadline) => poll_interval.min(deadline - now),
                None => poll_interval,
            };
            if self.sleep_or_cancel(pause).await {
                tracing::info!(polls, "wait cancelled");
                return WaitOutcome::Cancelled {
                    elapsed: start.elapsed(),
                    polls,
                };
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().map(|rx| *rx.borrow()).unwrap_or(false)
    }

    /// Sleep for `duration`; true if the stop flag was raised meanwhile
    async fn sleep_or_cancel(&self, duration: Duration) -> bool {
        let Some(cancel) = &self.cancel else {
            tokio::time::sleep(duration).await;
            return false;
        };

        let mut cancel = cancel.clone();
        tokio::select! {
            _ = tokio::time::sleep(duration) => false,
            _ = stop_raised(&mut cancel) => true,
        }
    }

    fn report_progress(
        &self,
        subject: &str,
        target: &str,
        elapsed: Duration,
        polls: u32,
        last_observed: &Option<Observation>,
    ) {
        tracing::info!(
            elapsed_secs = elapsed.as_secs(),
            polls,
            last_observed = last_observed.as_ref().map(|o| o.to_string()).as_deref(),
            "still waiting"
        );
        if let Some(progress) = &self.progress {
            let _ = progress.send(WaitProgress {
                subject: subject.to_string(),
                target: target.to_string(),
                elapsed,
                polls,
                last_observed: last_observed.clone(),
            });
        }
    }
}

/// First progress instant after `now` on the `start + k * interval` grid
///
/// `None` disables reporting: a zero interval, or a grid point past the
/// representable range.
fn next_progress_after(start: Instant, interval: Duration, now: Instant) -> Option<Instant> {
    let step = interval.as_nanos();
    if step == 0 {
        return None;
    }
    let periods = (now - start).as_nanos() / step + 1;
    let offset = u64::try_from(step.checked_mul(periods)?).ok()?;
    start.checked_add(Duration::from_nanos(offset))
}

/// Resolves once the flag reads `true`; never resolves if the sender is gone
pub(crate) async fn stop_raised(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow_and_update() {
            return;
        }
        if cancel.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
#[path = "readiness_tests.rs"]
mod tests;
