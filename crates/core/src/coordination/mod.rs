// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-resource exclusive access
//!
//! This module provides:
//! - **Gate** - One mutual-exclusion primitive per resource, created lazily and never removed
//! - **ResourceCoordinator** - Timed acquire/release and non-blocking status over all gates
//! - **ResourceLease** - RAII handle that releases its gate on drop

mod coordinator;
mod gate;

pub use coordinator::{ResourceCoordinator, ResourceLease};

use crate::resource::ResourceName;
use thiserror::Error;

/// Errors from coordinator misuse
///
/// A timed-out acquire is not an error; it is reported as `Ok(false)`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoordinationError {
    #[error("resource name must not be empty")]
    EmptyName,
    #[error("no gate exists for resource {0}")]
    UnknownResource(ResourceName),
    #[error("resource {0} is not held")]
    NotHeld(ResourceName),
    #[error("resource {name} is held by {holder}, not {caller}")]
    NotHolder {
        name: ResourceName,
        caller: String,
        holder: String,
    },
}
