// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status probes
//!
//! Probes observe resources without changing them: one lists every resource
//! with its state code, the other lists connected devices.

mod console;

pub use console::ConsoleProbe;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeProbeAdapter, ProbeCall};

use crate::process::CommandError;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors from a single probe invocation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("probe timed out after {0:?}")]
    TimedOut(Duration),
    #[error("malformed probe output: {0}")]
    Malformed(String),
}

/// Adapter for observing resource and device state
#[async_trait]
pub trait ProbeAdapter: Clone + Send + Sync + 'static {
    /// Raw status listing, one record per resource
    async fn list_resources(&self) -> Result<String, ProbeError>;

    /// Raw connected-device listing
    async fn list_devices(&self) -> Result<String, ProbeError>;
}
