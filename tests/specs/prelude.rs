//! Shared helpers for behavioral specs

#![allow(dead_code, unused_imports)]

pub use std::sync::Arc;
pub use std::time::Duration;
pub use tokio::time::Instant;
pub use vmgate_adapters::{
    ControlCall, FakeControlAdapter, FakeProbeAdapter, TracedControlAdapter, TracedProbeAdapter,
};
pub use vmgate_core::{Config, ResourceConfig, ResourceCoordinator, ResourceObservedState};
pub use vmgate_engine::{Observation, ReadinessWaiter, SessionError, SessionRunner, WaitOutcome};

pub const VM_A: &str = "vm-A";

pub fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

/// Config with short timings and a single resource `vm-A`
pub fn fast_config() -> Config {
    Config::parse(
        r#"
[coordinator]
acquire_timeout = "2s"

[readiness]
poll_interval = "1s"
boot_timeout = "30s"
shutdown_timeout = "20s"
device_timeout = "10s"

[[resources]]
name = "vm-A"
"#,
    )
    .unwrap()
}

/// Fake probe plus a control adapter whose start/stop show up in it
pub fn linked_fakes() -> (FakeProbeAdapter, FakeControlAdapter) {
    let probe = FakeProbeAdapter::new();
    let control = FakeControlAdapter::linked(probe.clone());
    (probe, control)
}
