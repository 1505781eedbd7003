// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vmgate engine: readiness waits and exclusive sessions

mod error;
pub mod logging;
mod readiness;
mod session;

pub use error::SessionError;
pub use logging::{LogTarget, LoggingError};
pub use readiness::{Observation, ReadinessWaiter, WaitOutcome, WaitProgress};
pub use session::SessionRunner;
