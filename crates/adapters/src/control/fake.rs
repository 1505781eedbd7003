// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake control adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ControlAdapter, ControlError};
use crate::probe::FakeProbeAdapter;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Recorded control call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCall {
    Start { name: String },
    Stop { name: String },
}

#[derive(Default)]
struct FakeControlState {
    calls: Vec<ControlCall>,
    fail_start: Option<String>,
    fail_stop: Option<String>,
}

/// Fake control adapter for testing
///
/// When linked to a [`FakeProbeAdapter`], start and stop immediately update
/// the probe's resource table (and device table, for resources given a
/// device) so readiness waits observe the transition.
#[derive(Clone, Default)]
pub struct FakeControlAdapter {
    state: Arc<Mutex<FakeControlState>>,
    probe: Option<FakeProbeAdapter>,
    devices: Arc<Mutex<HashMap<String, String>>>,
}

impl FakeControlAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reflect start/stop into `probe`
    pub fn linked(probe: FakeProbeAdapter) -> Self {
        Self {
            probe: Some(probe),
            ..Self::default()
        }
    }

    /// Connect `serial` on the linked probe whenever `name` starts
    pub fn with_device(self, name: &str, serial: &str) -> Self {
        self.devices
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.to_string(), serial.to_string());
        self
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<ControlCall> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .calls
            .clone()
    }

    /// Make every subsequent start fail with `message`
    pub fn fail_start(&self, message: &str) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).fail_start = Some(message.to_string());
    }

    /// Make every subsequent stop fail with `message`
    pub fn fail_stop(&self, message: &str) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).fail_stop = Some(message.to_string());
    }

    fn device_for(&self, name: &str) -> Option<String> {
        self.devices
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
    }
}

#[async_trait]
impl ControlAdapter for FakeControlAdapter {
    async fn start(&self, name: &str) -> Result<(), ControlError> {
        let failure = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.calls.push(ControlCall::Start {
                name: name.to_string(),
            });
            state.fail_start.clone()
        };
        if let Some(message) = failure {
            return Err(ControlError::Rejected {
                action: "start",
                resource: name.to_string(),
                message,
            });
        }

        if let Some(probe) = &self.probe {
            probe.set_resource_state(name, "1");
            if let Some(serial) = self.device_for(name) {
                probe.connect_device(&serial);
            }
        }
        Ok(())
    }

    async fn stop(&self, name: &str) -> Result<(), ControlError> {
        let failure = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.calls.push(ControlCall::Stop {
                name: name.to_string(),
            });
            state.fail_stop.clone()
        };
        if let Some(message) = failure {
            return Err(ControlError::Rejected {
                action: "stop",
                resource: name.to_string(),
                message,
            });
        }

        if let Some(probe) = &self.probe {
            probe.set_resource_state(name, "0");
            if let Some(serial) = self.device_for(name) {
                probe.disconnect_device(&serial);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
