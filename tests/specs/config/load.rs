//! Config specs
//!
//! A worker host's config file drives every timing the engine uses.

use crate::prelude::*;
use vmgate_core::ConfigError;

const HOST_CONFIG: &str = r#"
[console]
program = "/opt/ldplayer/ldconsole"
command_timeout = "45s"

[coordinator]
acquire_timeout = "1h 30m"

[readiness]
poll_interval = "500ms"
boot_timeout = "4m"
max_consecutive_probe_errors = 5

[[resources]]
name = "vm-A"
device = "emulator-5554"

[[resources]]
name = "vm-B"
"#;

#[test]
fn host_config_loads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vmgate.toml");
    std::fs::write(&path, HOST_CONFIG).unwrap();

    let config = Config::load(&path).unwrap();

    assert_eq!(config.console.program, std::path::PathBuf::from("/opt/ldplayer/ldconsole"));
    assert_eq!(config.console.command_timeout, secs(45));
    assert_eq!(config.console.list_args, vec!["list2".to_string()]);
    assert_eq!(config.coordinator.acquire_timeout, secs(90 * 60));
    assert_eq!(config.readiness.poll_interval, Duration::from_millis(500));
    assert_eq!(config.readiness.boot_timeout, secs(240));
    assert_eq!(config.readiness.shutdown_timeout, secs(60));
    assert_eq!(config.readiness.max_consecutive_probe_errors, Some(5));
    assert_eq!(
        config.resource(VM_A).and_then(|r| r.device.as_deref()),
        Some("emulator-5554")
    );
    assert_eq!(config.resource("vm-B").map(|r| r.device.is_none()), Some(true));
    assert!(config.resource("vm-C").is_none());
}

#[test]
fn missing_file_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Read(ref p, _) if *p == path));
}

#[test]
fn duplicate_resources_are_rejected() {
    let err = Config::parse("[[resources]]\nname = \"vm-A\"\n[[resources]]\nname = \"vm-A\"\n")
        .unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateResource(_)));
}
