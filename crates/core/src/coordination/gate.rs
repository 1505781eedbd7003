// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-resource gate
//!
//! Ownership is the tokio mutex guard itself; the holder slot only records who
//! owns it so that release can be checked against the caller.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::OwnedMutexGuard;
use tokio::time::Instant;

struct Holding {
    caller: String,
    since: Instant,
    _guard: OwnedMutexGuard<()>,
}

/// Why a release was refused
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ReleaseDenied {
    NotHeld,
    HeldBy(String),
}

pub(crate) struct Gate {
    lock: Arc<tokio::sync::Mutex<()>>,
    holding: Mutex<Option<Holding>>,
}

impl Gate {
    pub(crate) fn new() -> Self {
        Self {
            lock: Arc::new(tokio::sync::Mutex::new(())),
            holding: Mutex::new(None),
        }
    }

    /// Wait up to `timeout` for the gate; true if `caller` now holds it
    pub(crate) async fn acquire(&self, timeout: Duration, caller: &str) -> bool {
        let pending = Arc::clone(&self.lock).lock_owned();
        match tokio::time::timeout(timeout, pending).await {
            Ok(guard) => {
                *self.holding.lock().unwrap_or_else(|e| e.into_inner()) = Some(Holding {
                    caller: caller.to_string(),
                    since: Instant::now(),
                    _guard: guard,
                });
                true
            }
            Err(_) => false,
        }
    }

    /// Release the gate if `caller` holds it, returning how long it was held
    pub(crate) fn release(&self, caller: &str) -> Result<Duration, ReleaseDenied> {
        let mut holding = self.holding.lock().unwrap_or_else(|e| e.into_inner());
        match holding.as_ref() {
            None => Err(ReleaseDenied::NotHeld),
            Some(h) if h.caller != caller => Err(ReleaseDenied::HeldBy(h.caller.clone())),
            Some(h) => {
                let held_for = h.since.elapsed();
                // Dropping the holding drops the guard and wakes one waiter
                *holding = None;
                Ok(held_for)
            }
        }
    }

    /// Zero-wait acquire-then-release against the real primitive
    pub(crate) fn is_locked(&self) -> bool {
        self.lock.try_lock().is_err()
    }

    pub(crate) fn holder(&self) -> Option<String> {
        self.holding
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|h| h.caller.clone())
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
