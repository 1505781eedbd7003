// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::control::{ControlAdapter, ControlError};
use crate::probe::{ProbeAdapter, ProbeError};
use async_trait::async_trait;
use tracing::Instrument;

/// Wrapper that adds tracing to any ProbeAdapter
#[derive(Clone)]
pub struct TracedProbeAdapter<P> {
    inner: P,
}

impl<P> TracedProbeAdapter<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }
}

fn log_probe(kind: &'static str, result: &Result<String, ProbeError>, elapsed_ms: u64) {
    match result {
        Ok(output) => tracing::trace!(
            kind,
            elapsed_ms,
            lines = output.lines().count(),
            "probed"
        ),
        Err(e) => tracing::warn!(kind, elapsed_ms, error = %e, "probe failed"),
    }
}

#[async_trait]
impl<P: ProbeAdapter> ProbeAdapter for TracedProbeAdapter<P> {
    async fn list_resources(&self) -> Result<String, ProbeError> {
        let start = std::time::Instant::now();
        let result = self.inner.list_resources().await;
        log_probe("resources", &result, start.elapsed().as_millis() as u64);
        result
    }

    async fn list_devices(&self) -> Result<String, ProbeError> {
        let start = std::time::Instant::now();
        let result = self.inner.list_devices().await;
        log_probe("devices", &result, start.elapsed().as_millis() as u64);
        result
    }
}

/// Wrapper that adds tracing to any ControlAdapter
#[derive(Clone)]
pub struct TracedControlAdapter<C> {
    inner: C,
}

impl<C> TracedControlAdapter<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<C: ControlAdapter> ControlAdapter for TracedControlAdapter<C> {
    async fn start(&self, name: &str) -> Result<(), ControlError> {
        let span = tracing::info_span!("control.start", resource = name);

        async {
            tracing::info!("starting");
            let start = std::time::Instant::now();
            let result = self.inner.start(name).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(()) => tracing::info!(elapsed_ms, "start requested"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "start failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn stop(&self, name: &str) -> Result<(), ControlError> {
        let span = tracing::info_span!("control.stop", resource = name);

        async {
            tracing::info!("stopping");
            let start = std::time::Instant::now();
            let result = self.inner.stop(name).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            // A failed stop leaves the resource up; the caller decides what to do
            match &result {
                Ok(()) => tracing::info!(elapsed_ms, "stop requested"),
                Err(e) => tracing::warn!(elapsed_ms, error = %e, "stop failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
