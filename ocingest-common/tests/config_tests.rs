//! Integration tests for config file resolution and loading
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate OCINGEST_CONFIG are marked with #[serial].

use ocingest_common::config::{resolve_config_path, Config, CustomAclEntry, CONFIG_ENV_VAR};
use ocingest_common::Error;
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

const FULL_CONFIG: &str = r#"
[opencast]
host = "https://oc.example.org/"
username = "admin"
password = "opencast"
default_series = "Conference Recordings"
create_without_series = true
copy_metadata_from_series = true
event_title_prefix = "Meeting"
default_acl = "Public"
custom_acl = [
    { role = "ROLE_STUDENT", action = "read" },
    { role = "ROLE_LECTURER", action = "write" },
]
workflow_definition_id = "fast"
run_with_roles = ["ROLE_ADMIN", "ROLE_SUDO"]
allow_deny_only_policy = true
request_timeout_secs = 600

[opencast.metadata]
location = "Room 101"
description = "Weekly meeting"
language = "eng"
license = "CC-BY"
rights = "ACME"
subjects = ["meetings"]
contributors = ["Alice"]
creators = ["Bob"]
publishers = ["ACME Media"]

[plugnmeet]
host = "https://pnm.example.org"
api_key = "plugnmeet"
api_secret = "zumyyYWqv7KR2kUqvYdq4z4sXg7XTBD2ljT6"
recording_location = "/app/recording_files"
delete_when_ingested = true

[logging]
level = "debug"
"#;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_full_config() {
    let file = write_config(FULL_CONFIG);
    let config = Config::load(file.path()).unwrap();

    assert_eq!(config.opencast.default_series.as_deref(), Some("Conference Recordings"));
    assert!(config.opencast.copy_metadata_from_series);
    assert_eq!(config.opencast.event_title_prefix, "Meeting");
    assert_eq!(config.opencast.workflow_definition_id, "fast");
    assert_eq!(config.opencast.run_with_roles, vec!["ROLE_ADMIN", "ROLE_SUDO"]);
    assert_eq!(config.opencast.request_timeout_secs, Some(600));
    assert_eq!(config.opencast.metadata.location, "Room 101");
    assert_eq!(config.opencast.metadata.publishers, vec!["ACME Media"]);
    assert_eq!(config.plugnmeet.recording_location, PathBuf::from("/app/recording_files"));
    assert!(config.plugnmeet.delete_when_ingested);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_custom_acl_preserves_order() {
    let file = write_config(FULL_CONFIG);
    let config = Config::load(file.path()).unwrap();

    let acl = config.opencast.custom_acl.unwrap();
    assert_eq!(
        acl,
        vec![
            CustomAclEntry { role: "ROLE_STUDENT".into(), action: "read".into() },
            CustomAclEntry { role: "ROLE_LECTURER".into(), action: "write".into() },
        ]
    );
}

#[test]
fn test_load_missing_file_is_not_found() {
    let err = Config::load(std::path::Path::new("/nonexistent/ocingest.toml")).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)), "{}", err);
    assert!(err.to_string().contains("/nonexistent/ocingest.toml"));
}

#[test]
fn test_load_unreadable_path_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load(dir.path()).unwrap_err();
    assert!(matches!(err, Error::Io(_)), "{}", err);
}

#[test]
fn test_missing_section_is_parse_error() {
    let file = write_config("[opencast]\nhost = \"h\"\nusername = \"u\"\npassword = \"p\"\n");
    let err = Config::load(file.path()).unwrap_err();
    assert!(matches!(err, Error::Parse(_)), "missing [plugnmeet] should fail: {}", err);
}

#[test]
#[serial]
fn test_env_var_used_when_no_cli_arg() {
    let file = write_config(FULL_CONFIG);
    env::set_var(CONFIG_ENV_VAR, file.path());

    let resolved = resolve_config_path(None).unwrap();
    assert_eq!(resolved, file.path());

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_cli_arg_overrides_env_var() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/from-env.toml");

    let resolved = resolve_config_path(Some(std::path::Path::new("/tmp/from-cli.toml"))).unwrap();
    assert_eq!(resolved, PathBuf::from("/tmp/from-cli.toml"));

    env::remove_var(CONFIG_ENV_VAR);
}
