// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vmgate-core: exclusive access to named emulator instances
//!
//! This crate provides:
//! - Resource identity and observed-state types
//! - The status listing parser
//! - The per-resource coordinator
//! - TOML configuration

pub mod config;
pub mod coordination;
pub mod listing;
pub mod resource;

pub use config::{
    Config, ConfigError, ConsoleConfig, CoordinatorConfig, ReadinessConfig, ResourceConfig,
};
pub use coordination::{CoordinationError, ResourceCoordinator, ResourceLease};
pub use listing::{observed_state, parse_listing, ListingError, ResourceRecord};
pub use resource::{ResourceName, ResourceObservedState};
