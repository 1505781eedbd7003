// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exclusive sessions on a resource
//!
//! A session holds the resource's gate for its whole lifetime:
//!
//! ```text
//! lease -> start -> wait running -> wait device -> op -> stop -> wait stopped -> release
//! ```
//!
//! Shutdown always runs once the lease is held, whatever happened before it,
//! and the gate is only released after the stop wait finishes so the next
//! holder never finds a half-stopped resource.

use crate::error::SessionError;
use crate::readiness::{stop_raised, ReadinessWaiter, WaitOutcome, WaitProgress};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::Instrument;
use vmgate_adapters::{ControlAdapter, ControlError, ProbeAdapter};
use vmgate_core::{Config, ResourceCoordinator};

/// Runs operations that need a resource to themselves
pub struct SessionRunner<P, C> {
    coordinator: Arc<ResourceCoordinator>,
    probe: P,
    control: C,
    config: Config,
    stop: Option<watch::Receiver<bool>>,
    progress: Option<mpsc::UnboundedSender<WaitProgress>>,
}

impl<P: ProbeAdapter, C: ControlAdapter> SessionRunner<P, C> {
    pub fn new(coordinator: Arc<ResourceCoordinator>, probe: P, control: C, config: Config) -> Self {
        Self {
            coordinator,
            probe,
            control,
            config,
            stop: None,
            progress: None,
        }
    }

    /// Abandon boot waits and the running operation once `stop` reads `true`
    ///
    /// The operation future is dropped on stop; child processes it spawned
    /// with `kill_on_drop` die with it. Shutdown still runs.
    pub fn with_stop(mut self, stop: watch::Receiver<bool>) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn with_progress(mut self, progress: mpsc::UnboundedSender<WaitProgress>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn coordinator(&self) -> &Arc<ResourceCoordinator> {
        &self.coordinator
    }

    fn waiter(&self, cancellable: bool) -> ReadinessWaiter<P> {
        let mut waiter = ReadinessWaiter::new(self.probe.clone(), self.config.readiness.clone());
        if let Some(progress) = &self.progress {
            waiter = waiter.with_progress(progress.clone());
        }
        match &self.stop {
            Some(stop) if cancellable => waiter.with_cancel(stop.clone()),
            _ => waiter,
        }
    }

    /// Hold `name` exclusively, boot it, run `op`, then shut it down and release
    pub async fn run_exclusive<F, Fut, T>(
        &self,
        name: &str,
        caller: &str,
        op: F,
    ) -> Result<T, SessionError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let span = tracing::info_span!("session", resource = name, caller);

        async move {
            let acquire_timeout = self.config.coordinator.acquire_timeout;
            let asked = Instant::now();
            let Some(lease) = self.coordinator.lease(name, acquire_timeout, caller).await? else {
                return Err(SessionError::AcquireTimedOut {
                    resource: name.to_string(),
                    caller: caller.to_string(),
                    waited: asked.elapsed(),
                    holder: self
                        .coordinator
                        .holder(name)
                        .unwrap_or_else(|| "unknown".to_string()),
                });
            };

            let result = self.run_held(name, op).await;
            let shutdown = self.shutdown(name).await;
            drop(lease);

            match (result, shutdown) {
                (Ok(value), Ok(())) => Ok(value),
                (Ok(_), Err(e)) => Err(e),
                (Err(e), Ok(())) => Err(e),
                (Err(e), Err(shutdown_err)) => {
                    tracing::error!(error = %shutdown_err, "shutdown also failed");
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run_held<F, Fut, T>(&self, name: &str, op: F) -> Result<T, SessionError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let readiness = &self.config.readiness;
        let waiter = self.waiter(true);

        self.control_with_timeout("start", name, self.control.start(name))
            .await?;

        let booted = waiter
            .wait_until_running(name, readiness.boot_timeout, readiness.poll_interval)
            .await;
        require_ready(name, "running", booted)?;

        let device = self
            .config
            .resource(name)
            .and_then(|r| r.device.as_deref());
        if let Some(serial) = device {
            let connected = waiter
                .wait_for_device(serial, readiness.device_timeout, readiness.poll_interval)
                .await;
            require_ready(name, "connected", connected)?;
        }

        let mut stop = self.stop.clone();
        tokio::select! {
            value = op() => Ok(value),
            _ = async {
                match stop.as_mut() {
                    Some(stop) => stop_raised(stop).await,
                    None => std::future::pending().await,
                }
            } => {
                tracing::info!("stop requested, abandoning operation");
                Err(SessionError::Cancelled { resource: name.to_string() })
            }
        }
    }

    /// Request shutdown and wait until the resource is stopped or gone
    async fn shutdown(&self, name: &str) -> Result<(), SessionError> {
        let readiness = &self.config.readiness;
        let requested = self
            .control_with_timeout("stop", name, self.control.stop(name))
            .await;

        // Not cancellable: the gate must not be released mid-teardown
        let outcome = self
            .waiter(false)
            .wait_until_stopped(name, readiness.shutdown_timeout, readiness.poll_interval)
            .await;

        match (requested, outcome.is_ready()) {
            (_, true) => Ok(()),
            (Err(e), false) => Err(SessionError::ShutdownIncomplete {
                resource: name.to_string(),
                reason: format!("{}; {}", e, outcome),
            }),
            (Ok(()), false) => Err(SessionError::ShutdownIncomplete {
                resource: name.to_string(),
                reason: outcome.to_string(),
            }),
        }
    }

    async fn control_with_timeout(
        &self,
        action: &'static str,
        name: &str,
        request: impl Future<Output = Result<(), ControlError>>,
    ) -> Result<(), SessionError> {
        let timeout = self.config.console.command_timeout;
        tokio::time::timeout(timeout, request)
            .await
            .map_err(|_| ControlError::TimedOut {
                action,
                resource: name.to_string(),
                timeout,
            })??;
        Ok(())
    }
}

fn require_ready(name: &str, stage: &'static str, outcome: WaitOutcome) -> Result<(), SessionError> {
    match outcome {
        WaitOutcome::Ready { .. } => Ok(()),
        WaitOutcome::Cancelled { .. } => Err(SessionError::Cancelled {
            resource: name.to_string(),
        }),
        outcome => Err(SessionError::NotReady {
            resource: name.to_string(),
            stage,
            outcome,
        }),
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
