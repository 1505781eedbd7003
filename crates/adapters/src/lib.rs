// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external I/O

pub mod control;
pub mod probe;
pub mod process;
pub mod traced;

pub use control::{ConsoleControl, ControlAdapter, ControlError};
pub use probe::{ConsoleProbe, ProbeAdapter, ProbeError};
pub use process::CommandError;
pub use traced::{TracedControlAdapter, TracedProbeAdapter};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use control::{ControlCall, FakeControlAdapter};
#[cfg(any(test, feature = "test-support"))]
pub use probe::{FakeProbeAdapter, ProbeCall};
