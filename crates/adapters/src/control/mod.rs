// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource start/stop control
//!
//! Control commands only request a transition; they return before the
//! resource has actually booted or shut down. Readiness is observed separately
//! through a probe.

mod console;

pub use console::ConsoleControl;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{ControlCall, FakeControlAdapter};

use crate::process::CommandError;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors from control operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ControlError {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("{action} of {resource} timed out after {timeout:?}")]
    TimedOut {
        action: &'static str,
        resource: String,
        timeout: Duration,
    },
    #[error("{action} of {resource} rejected: {message}")]
    Rejected {
        action: &'static str,
        resource: String,
        message: String,
    },
}

/// Adapter for requesting resource state transitions
#[async_trait]
pub trait ControlAdapter: Clone + Send + Sync + 'static {
    /// Ask the resource to boot
    async fn start(&self, name: &str) -> Result<(), ControlError>;

    /// Ask the resource to shut down
    async fn stop(&self, name: &str) -> Result<(), ControlError>;
}
