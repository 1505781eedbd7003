// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration
//!
//! Loaded from TOML. Durations use humantime notation (`"10s"`, `"3m"`,
//! `"2h"`). Every field has a default, so an empty file is a valid config.

use crate::resource::ResourceName;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors from loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {0}: {1}")]
    Read(PathBuf, #[source] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("resource name must not be empty")]
    EmptyResourceName,
    #[error("duplicate resource name: {0}")]
    DuplicateResource(ResourceName),
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

/// Top-level configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub console: ConsoleConfig,
    pub coordinator: CoordinatorConfig,
    pub readiness: ReadinessConfig,
    pub resources: Vec<ResourceConfig>,
}

impl Config {
    /// Read and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        Self::parse(&text)
    }

    /// Parse and validate config text
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for resource in &self.resources {
            if resource.name.is_empty() {
                return Err(ConfigError::EmptyResourceName);
            }
            if !seen.insert(&resource.name) {
                return Err(ConfigError::DuplicateResource(resource.name.clone()));
            }
        }
        if self.console.command_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration("console.command_timeout"));
        }
        self.readiness.validate()
    }

    /// Look up a configured resource by name
    pub fn resource(&self, name: &str) -> Option<&ResourceConfig> {
        self.resources.iter().find(|r| r.name.as_str() == name)
    }
}

/// External commands used to observe and control resources
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsoleConfig {
    /// Emulator console program
    pub program: PathBuf,
    /// Arguments that make the console print its status listing
    pub list_args: Vec<String>,
    /// Arguments that boot a resource; the resource name is appended
    pub start_args: Vec<String>,
    /// Arguments that shut a resource down; the resource name is appended
    pub stop_args: Vec<String>,
    /// Limit on a single start or stop command
    #[serde(with = "humantime_serde")]
    pub command_timeout: Duration,
    /// Device bridge program
    pub adb: PathBuf,
    /// Arguments that make the device bridge list connected devices
    pub adb_args: Vec<String>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ldconsole"),
            list_args: vec!["list2".to_string()],
            start_args: vec!["launch".to_string(), "--name".to_string()],
            stop_args: vec!["quit".to_string(), "--name".to_string()],
            command_timeout: Duration::from_secs(30),
            adb: PathBuf::from("adb"),
            adb_args: vec!["devices".to_string()],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoordinatorConfig {
    /// How long a worker waits for a resource before giving up
    #[serde(with = "humantime_serde")]
    pub acquire_timeout: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            acquire_timeout: Duration::from_secs(2 * 60 * 60),
        }
    }
}

/// Readiness polling parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReadinessConfig {
    /// Limit on a single probe invocation
    #[serde(with = "humantime_serde")]
    pub probe_timeout: Duration,
    /// Sleep between probes
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    /// Cadence of progress reports during a long wait
    #[serde(with = "humantime_serde")]
    pub progress_interval: Duration,
    #[serde(with = "humantime_serde")]
    pub boot_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub shutdown_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub device_timeout: Duration,
    /// End a wait early after this many probe errors in a row (`None` never does)
    pub max_consecutive_probe_errors: Option<u32>,
}

impl ReadinessConfig {
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn with_max_consecutive_probe_errors(mut self, limit: u32) -> Self {
        self.max_consecutive_probe_errors = Some(limit);
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.probe_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration("readiness.probe_timeout"));
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroDuration("readiness.poll_interval"));
        }
        if self.progress_interval.is_zero() {
            return Err(ConfigError::ZeroDuration("readiness.progress_interval"));
        }
        Ok(())
    }
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_secs(2),
            progress_interval: Duration::from_secs(30),
            boot_timeout: Duration::from_secs(180),
            shutdown_timeout: Duration::from_secs(60),
            device_timeout: Duration::from_secs(60),
            max_consecutive_probe_errors: None,
        }
    }
}

/// One managed resource
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceConfig {
    pub name: ResourceName,
    /// Device identifier reported by the device bridge once the resource is up
    #[serde(default)]
    pub device: Option<String>,
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
