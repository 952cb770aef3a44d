use serial_test::serial;
use temp_env::with_vars;

use super::*;
use crate::Error;

fn cleanup_all_dove_env_vars() {
    for (key, _) in std::env::vars() {
        if key.starts_with("DOVE__") || key == "CONFIG_PATH" {
            std::env::remove_var(&key);
        }
    }
}

#[test]
#[serial]
fn default_config_should_initialize_with_hardcoded_values() {
    let config = ChangeLogNodeConfig::default();

    assert!(config.gc.enabled);
    assert_eq!(config.gc.interval_ms, 5000);
    assert_eq!(config.gc.interval(), std::time::Duration::from_secs(5));
    assert_eq!(config.feed.uri_prefix, "/controller/sb/v2/opendove/odmc");
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn new_should_merge_environment_overrides() {
    cleanup_all_dove_env_vars();
    with_vars(
        vec![
            ("DOVE__GC__INTERVAL_MS", Some("250")),
            ("DOVE__GC__ENABLED", Some("false")),
        ],
        || {
            let config = ChangeLogNodeConfig::new().unwrap();

            assert_eq!(config.gc.interval_ms, 250);
            assert!(!config.gc.enabled);
        },
    );
}

#[test]
#[serial]
fn new_should_read_config_path_file() {
    cleanup_all_dove_env_vars();
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("node.toml");
    std::fs::write(
        &config_path,
        r#"
        [feed]
        uri_prefix = "/sb/v3"
        "#,
    )
    .unwrap();

    with_vars(vec![("CONFIG_PATH", Some(config_path.to_str().unwrap()))], || {
        let config = ChangeLogNodeConfig::new().unwrap().validate().unwrap();

        assert_eq!(config.feed.uri_prefix, "/sb/v3");
        assert_eq!(config.gc.interval_ms, 5000);
    });
}

#[test]
#[serial]
fn with_override_config_should_merge_file_settings() {
    cleanup_all_dove_env_vars();
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("dynamic_config.toml");
    std::fs::write(
        &config_path,
        r#"
        [gc]
        interval_ms = 1000 # Override default value
        "#,
    )
    .unwrap();

    let empty_vars: Vec<(&str, Option<&str>)> = vec![];
    with_vars(empty_vars, || {
        let base_config = ChangeLogNodeConfig::new().expect("success");
        let config = base_config
            .with_override_config(config_path.to_str().unwrap())
            .expect("override applied");

        assert_eq!(config.gc.interval_ms, 1000);
        assert!(config.gc.enabled);
    });
}

#[test]
#[serial]
fn environment_should_win_over_override_file() {
    cleanup_all_dove_env_vars();
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("override.toml");
    std::fs::write(&config_path, "[gc]\ninterval_ms = 1000\n").unwrap();

    with_vars(vec![("DOVE__GC__INTERVAL_MS", Some("2000"))], || {
        let config = ChangeLogNodeConfig::default()
            .with_override_config(config_path.to_str().unwrap())
            .unwrap();

        assert_eq!(config.gc.interval_ms, 2000);
    });
}

#[test]
fn validation_should_reject_out_of_range_interval() {
    let mut config = ChangeLogNodeConfig::default();
    config.gc.interval_ms = 10;
    assert!(matches!(config.clone().validate(), Err(Error::InvalidConfig(_))));

    config.gc.interval_ms = 3_600_001;
    assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
}

#[test]
fn validation_should_reject_malformed_uri_prefix() {
    for prefix in ["", "controller/sb", "/controller/sb/", "/"] {
        let config = FeedConfig {
            uri_prefix: prefix.to_string(),
        };
        assert!(config.validate().is_err(), "prefix {prefix:?} accepted");
    }
}
