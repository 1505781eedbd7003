// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake probe adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ProbeAdapter, ProbeError};
use crate::process::CommandError;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::{Arc, Mutex};

/// Recorded probe call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeCall {
    ListResources,
    ListDevices,
}

#[derive(Debug, Clone)]
enum Scripted {
    Output(String),
    Error(ProbeError),
    Hang,
}

#[derive(Default)]
struct FakeProbeState {
    /// Resource name -> state code
    resources: BTreeMap<String, String>,
    devices: BTreeSet<String>,
    listing_script: VecDeque<Scripted>,
    device_script: VecDeque<Scripted>,
    calls: Vec<ProbeCall>,
}

impl FakeProbeState {
    fn render_listing(&self) -> String {
        self.resources
            .iter()
            .enumerate()
            .map(|(i, (name, code))| format!("{},{},{},0,{},{}\n", i, name, name, code, 1000 + i))
            .collect()
    }

    fn render_devices(&self) -> String {
        let mut out = String::from("List of devices attached\n");
        for serial in &self.devices {
            out.push_str(serial);
            out.push_str("\tdevice\n");
        }
        out
    }
}

/// Fake probe for testing
///
/// Scripted responses are returned first, one per call, in order. Once the
/// script is exhausted the fake renders its current resource and device
/// tables.
#[derive(Clone, Default)]
pub struct FakeProbeAdapter {
    state: Arc<Mutex<FakeProbeState>>,
}

impl FakeProbeAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut FakeProbeState) -> T) -> T {
        f(&mut self.state.lock().unwrap_or_else(|e| e.into_inner()))
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<ProbeCall> {
        self.with_state(|s| s.calls.clone())
    }

    /// Number of status listing calls so far
    pub fn listing_calls(&self) -> usize {
        self.with_state(|s| {
            s.calls
                .iter()
                .filter(|c| **c == ProbeCall::ListResources)
                .count()
        })
    }

    /// Set the state code reported for a resource
    pub fn set_resource_state(&self, name: &str, code: &str) {
        self.with_state(|s| {
            s.resources.insert(name.to_string(), code.to_string());
        });
    }

    /// Drop a resource from the listing entirely
    pub fn remove_resource(&self, name: &str) {
        self.with_state(|s| {
            s.resources.remove(name);
        });
    }

    /// Queue a raw listing for the next unscripted call
    pub fn push_listing(&self, output: &str) {
        self.with_state(|s| s.listing_script.push_back(Scripted::Output(output.to_string())));
    }

    /// Queue a failed listing call
    pub fn push_listing_error(&self, message: &str) {
        self.with_state(|s| {
            s.listing_script
                .push_back(Scripted::Error(launch_error(message)))
        });
    }

    /// Queue a listing call that never completes
    pub fn push_listing_hang(&self) {
        self.with_state(|s| s.listing_script.push_back(Scripted::Hang));
    }

    pub fn connect_device(&self, serial: &str) {
        self.with_state(|s| {
            s.devices.insert(serial.to_string());
        });
    }

    pub fn disconnect_device(&self, serial: &str) {
        self.with_state(|s| {
            s.devices.remove(serial);
        });
    }

    /// Queue a failed device listing call
    pub fn push_devices_error(&self, message: &str) {
        self.with_state(|s| {
            s.device_script
                .push_back(Scripted::Error(launch_error(message)))
        });
    }
}

fn launch_error(message: &str) -> ProbeError {
    ProbeError::Command(CommandError::Launch {
        program: "fake".to_string(),
        message: message.to_string(),
    })
}

async fn respond(scripted: Option<Scripted>, rendered: String) -> Result<String, ProbeError> {
    match scripted {
        None => Ok(rendered),
        Some(Scripted::Output(out)) => Ok(out),
        Some(Scripted::Error(e)) => Err(e),
        Some(Scripted::Hang) => std::future::pending().await,
    }
}

#[async_trait]
impl ProbeAdapter for FakeProbeAdapter {
    async fn list_resources(&self) -> Result<String, ProbeError> {
        let (scripted, rendered) = self.with_state(|s| {
            s.calls.push(ProbeCall::ListResources);
            (s.listing_script.pop_front(), s.render_listing())
        });
        respond(scripted, rendered).await
    }

    async fn list_devices(&self) -> Result<String, ProbeError> {
        let (scripted, rendered) = self.with_state(|s| {
            s.calls.push(ProbeCall::ListDevices);
            (s.device_script.pop_front(), s.render_devices())
        });
        respond(scripted, rendered).await
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
