// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for exclusive sessions

use crate::readiness::WaitOutcome;
use std::time::Duration;
use thiserror::Error;
use vmgate_adapters::ControlError;
use vmgate_core::CoordinationError;

/// Errors that end an exclusive session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("coordination error: {0}")]
    Coordination(#[from] CoordinationError),
    #[error("{caller} could not acquire {resource} within {waited:?} (held by {holder})")]
    AcquireTimedOut {
        resource: String,
        caller: String,
        waited: Duration,
        holder: String,
    },
    #[error("control error: {0}")]
    Control(#[from] ControlError),
    #[error("{resource} did not become {stage}: {outcome}")]
    NotReady {
        resource: String,
        stage: &'static str,
        outcome: WaitOutcome,
    },
    #[error("{resource} did not shut down cleanly: {reason}")]
    ShutdownIncomplete { resource: String, reason: String },
    #[error("session on {resource} cancelled")]
    Cancelled { resource: String },
}
