// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource coordinator
//!
//! Keeps one gate per resource name. The name-to-gate map has its own lock,
//! held only while a gate is looked up or created and never across the wait
//! for the gate itself, so a slow acquirer cannot stall unrelated resources.

use super::gate::{Gate, ReleaseDenied};
use super::CoordinationError;
use crate::resource::ResourceName;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Serializes access to named resources across concurrent workers
///
/// Construct one per process and share it (e.g. behind an `Arc`).
#[derive(Default)]
pub struct ResourceCoordinator {
    gates: Mutex<HashMap<ResourceName, Arc<Gate>>>,
}

impl ResourceCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the gate for `name`
    fn gate(&self, name: &str) -> Arc<Gate> {
        let mut gates = self.gates.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(gate) = gates.get(name) {
            return Arc::clone(gate);
        }
        tracing::debug!(resource = name, "creating gate");
        let gate = Arc::new(Gate::new());
        gates.insert(ResourceName::new(name), Arc::clone(&gate));
        gate
    }

    fn existing_gate(&self, name: &str) -> Option<Arc<Gate>> {
        self.gates
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
    }

    /// Wait up to `timeout` for exclusive use of `name`
    ///
    /// Returns `Ok(true)` once `caller` holds the resource and `Ok(false)` if
    /// the timeout elapsed first. A timed-out call leaves the gate untouched.
    pub async fn acquire(
        &self,
        name: &str,
        timeout: Duration,
        caller: &str,
    ) -> Result<bool, CoordinationError> {
        Ok(self.acquire_gate(name, timeout, caller).await?.is_some())
    }

    /// Acquire and hand back the gate now held by `caller`
    async fn acquire_gate(
        &self,
        name: &str,
        timeout: Duration,
        caller: &str,
    ) -> Result<Option<Arc<Gate>>, CoordinationError> {
        if name.is_empty() {
            return Err(CoordinationError::EmptyName);
        }

        let gate = self.gate(name);
        let start = Instant::now();
        let acquired = gate.acquire(timeout, caller).await;
        let waited_ms = start.elapsed().as_millis() as u64;

        if !acquired {
            tracing::warn!(
                resource = name,
                caller,
                waited_ms,
                holder = gate.holder().as_deref(),
                "acquire timed out"
            );
            return Ok(None);
        }

        tracing::info!(resource = name, caller, waited_ms, "acquired");
        Ok(Some(gate))
    }

    /// Release `name`, which `caller` must currently hold
    pub fn release(&self, name: &str, caller: &str) -> Result<(), CoordinationError> {
        let Some(gate) = self.existing_gate(name) else {
            tracing::warn!(resource = name, caller, "release of unknown resource");
            return Err(CoordinationError::UnknownResource(ResourceName::new(name)));
        };
        release_gate(&gate, name, caller)
    }

    /// Acquire `name` and wrap the ownership in a lease that releases on drop
    pub async fn lease(
        &self,
        name: &str,
        timeout: Duration,
        caller: &str,
    ) -> Result<Option<ResourceLease>, CoordinationError> {
        let lease = self
            .acquire_gate(name, timeout, caller)
            .await?
            .map(|gate| ResourceLease {
                name: ResourceName::new(name),
                caller: caller.to_string(),
                gate,
            });
        Ok(lease)
    }

    /// Whether `name` is currently held
    ///
    /// Advisory only: the answer may be stale by the time it is read, so this
    /// must never stand in for `acquire`. Unknown names report `false`.
    pub fn is_locked(&self, name: &str) -> bool {
        self.existing_gate(name)
            .map(|gate| gate.is_locked())
            .unwrap_or(false)
    }

    /// Caller label of the current holder of `name`, if any
    pub fn holder(&self, name: &str) -> Option<String> {
        self.existing_gate(name).and_then(|gate| gate.holder())
    }

    /// Lock state of every resource that has ever had a gate
    ///
    /// Each entry is read separately; the snapshot is not atomic.
    pub fn status(&self) -> BTreeMap<ResourceName, bool> {
        let gates: Vec<(ResourceName, Arc<Gate>)> = self
            .gates
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(name, gate)| (name.clone(), Arc::clone(gate)))
            .collect();

        gates
            .into_iter()
            .map(|(name, gate)| (name, gate.is_locked()))
            .collect()
    }
}

fn release_gate(gate: &Gate, name: &str, caller: &str) -> Result<(), CoordinationError> {
    match gate.release(caller) {
        Ok(held_for) => {
            tracing::info!(
                resource = name,
                caller,
                held_ms = held_for.as_millis() as u64,
                "released"
            );
            Ok(())
        }
        Err(ReleaseDenied::NotHeld) => {
            tracing::warn!(resource = name, caller, "release of resource that is not held");
            Err(CoordinationError::NotHeld(ResourceName::new(name)))
        }
        Err(ReleaseDenied::HeldBy(holder)) => {
            tracing::warn!(
                resource = name,
                caller,
                holder = holder.as_str(),
                "release by non-holder"
            );
            Err(CoordinationError::NotHolder {
                name: ResourceName::new(name),
                caller: caller.to_string(),
                holder,
            })
        }
    }
}

/// Exclusive hold on one resource; released when dropped
pub struct ResourceLease {
    name: ResourceName,
    caller: String,
    gate: Arc<Gate>,
}

impl ResourceLease {
    pub fn name(&self) -> &ResourceName {
        &self.name
    }

    pub fn caller(&self) -> &str {
        &self.caller
    }
}

impl std::fmt::Debug for ResourceLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceLease")
            .field("name", &self.name)
            .field("caller", &self.caller)
            .finish()
    }
}

impl Drop for ResourceLease {
    fn drop(&mut self) {
        // Errors are already logged by release_gate
        let _ = release_gate(&self.gate, self.name.as_str(), &self.caller);
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
