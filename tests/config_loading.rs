//! Configuration file loading.

use std::io::Write;

use clb::config::{load_config, load_or_default, ConfigError, ValidationError};
use clb::provider::Region;

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_loads_full_file() {
    let file = write_config(
        r#"
        regions = ["dfw", "LON"]

        [provider]
        identity_url = "https://lon.identity.api.rackspacecloud.com/v2.0"
        username_env = "LON_USERNAME"
        api_key_env = "LON_APIKEY"

        [timeouts]
        connect_secs = 2
        request_secs = 10

        [retries]
        enabled = false

        [observability]
        log_level = "clb=debug"
        json = true
        "#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.regions, vec![Region::Dfw, Region::Lon]);
    assert_eq!(config.provider.username_env, "LON_USERNAME");
    assert_eq!(config.timeouts.connect_secs, 2);
    assert!(!config.retries.enabled);
    assert!(config.observability.json);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_config(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn test_unknown_region_is_parse_error() {
    let file = write_config(r#"regions = ["dfw", "mars"]"#);
    let err = load_config(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
    assert!(err.to_string().contains("mars"));
}

#[test]
fn test_validation_reports_every_problem() {
    let file = write_config(
        r#"
        regions = []

        [timeouts]
        connect_secs = 0
        "#,
    );

    match load_config(file.path()).unwrap_err() {
        ConfigError::Validation(errors) => {
            assert_eq!(
                errors,
                vec![
                    ValidationError::NoRegions,
                    ValidationError::ZeroTimeout("connect_secs"),
                ]
            );
        }
        other => panic!("expected validation error, got {}", other),
    }
}

#[test]
fn test_no_file_means_defaults() {
    let config = load_or_default(None).unwrap();
    assert_eq!(config.regions, Region::DEFAULT_SET.to_vec());
}
