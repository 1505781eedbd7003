// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Write;

#[test]
fn empty_config_uses_defaults() {
    let config = Config::parse("").unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.readiness.probe_timeout, Duration::from_secs(10));
    assert_eq!(config.readiness.max_consecutive_probe_errors, None);
    assert_eq!(config.console.list_args, vec!["list2".to_string()]);
}

#[test]
fn parses_full_config() {
    let text = r#"
[console]
program = "/opt/emu/console"
list_args = ["list2"]
start_args = ["launch", "--name"]
stop_args = ["quit", "--name"]
command_timeout = "20s"
adb = "/opt/emu/adb"
adb_args = ["devices"]

[coordinator]
acquire_timeout = "2h"

[readiness]
probe_timeout = "5s"
poll_interval = "500ms"
progress_interval = "1m"
boot_timeout = "3m"
shutdown_timeout = "45s"
device_timeout = "1m"
max_consecutive_probe_errors = 5

[[resources]]
name = "vm-A"
device = "emulator-5554"

[[resources]]
name = "vm-B"
"#;

    let config = Config::parse(text).unwrap();
    assert_eq!(config.console.program, PathBuf::from("/opt/emu/console"));
    assert_eq!(config.console.command_timeout, Duration::from_secs(20));
    assert_eq!(
        config.coordinator.acquire_timeout,
        Duration::from_secs(7200)
    );
    assert_eq!(config.readiness.poll_interval, Duration::from_millis(500));
    assert_eq!(config.readiness.shutdown_timeout, Duration::from_secs(45));
    assert_eq!(config.readiness.max_consecutive_probe_errors, Some(5));
    assert_eq!(config.resources.len(), 2);
    assert_eq!(
        config.resource("vm-A").and_then(|r| r.device.as_deref()),
        Some("emulator-5554")
    );
    assert_eq!(config.resource("vm-B").and_then(|r| r.device.clone()), None);
    assert!(config.resource("vm-C").is_none());
}

#[test]
fn rejects_duplicate_resources() {
    let text = r#"
[[resources]]
name = "vm-A"

[[resources]]
name = "vm-A"
"#;
    let err = Config::parse(text).unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateResource(ref n) if n.as_str() == "vm-A"));
}

#[test]
fn rejects_empty_resource_name() {
    let err = Config::parse("[[resources]]\nname = \"\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::EmptyResourceName));
}

#[test]
fn rejects_zero_poll_interval() {
    let err = Config::parse("[readiness]\npoll_interval = \"0s\"\n").unwrap_err();
    assert_eq!(
        err.to_string(),
        "readiness.poll_interval must be greater than zero"
    );
}

#[test]
fn rejects_unknown_fields() {
    let err = Config::parse("[readiness]\npol_interval = \"1s\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn rejects_bad_duration() {
    let err = Config::parse("[coordinator]\nacquire_timeout = \"soon\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn load_reads_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[[resources]]\nname = \"vm-A\"").unwrap();

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.resources[0].name.as_str(), "vm-A");
}

#[test]
fn load_missing_file_names_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.toml");

    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Read(ref p, _) if p == &path));
}

#[test]
fn builders_override_readiness_defaults() {
    let readiness = ReadinessConfig::default()
        .with_probe_timeout(Duration::from_secs(1))
        .with_progress_interval(Duration::from_secs(5))
        .with_max_consecutive_probe_errors(3);
    assert_eq!(readiness.probe_timeout, Duration::from_secs(1));
    assert_eq!(readiness.progress_interval, Duration::from_secs(5));
    assert_eq!(readiness.max_consecutive_probe_errors, Some(3));
}
