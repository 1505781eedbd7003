// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource identity and observed state
//!
//! A resource is one named emulator instance. Its state is never stored here;
//! it is re-derived from the status listing on every poll.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

/// Unique name of an external resource instance
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceName(pub String);

impl ResourceName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for ResourceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ResourceName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for ResourceName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl Borrow<str> for ResourceName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// State of a resource as reported by the status listing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceObservedState {
    Unknown,
    Stopped,
    Starting,
    Running,
}

impl ResourceObservedState {
    /// Map a listing state code to a state
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "0" => Self::Stopped,
            "1" => Self::Running,
            "2" => Self::Starting,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for ResourceObservedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unknown => "unknown",
            Self::Stopped => "stopped",
            Self::Starting => "starting",
            Self::Running => "running",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
#[path = "resource_tests.rs"]
mod tests;
