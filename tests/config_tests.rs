use std::io::Write;

use script_cloak::config::{load_config, ConfigError};

#[test]
fn cli_flags_populate_config() {
    let cfg = load_config(None, &Some("example.com".into()), true, true).unwrap();
    assert_eq!(cfg.domain.as_deref(), Some("example.com"));
    assert!(cfg.inject_runtime);
    assert!(cfg.tamper_check);
    // obfuscation defaults mirror the usual engine defaults
    assert!(cfg.obfuscation.compact);
    assert!(cfg.obfuscation.self_defending);
}

#[test]
fn everything_off_by_default() {
    let cfg = load_config(None, &None, false, false).unwrap();
    assert!(cfg.domain.is_none());
    assert!(!cfg.inject_runtime);
    assert!(!cfg.tamper_check);
}

#[test]
fn options_file_overrides_obfuscation_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"compact": false, "selfDefending": false}}"#).unwrap();
    let cfg = load_config(file.path().to_str(), &None, false, false).unwrap();
    assert!(!cfg.obfuscation.compact);
    assert!(!cfg.obfuscation.self_defending);
    assert!(cfg.obfuscation.control_flow_flattening);
}

#[test]
fn malformed_options_file_is_a_parse_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "not json").unwrap();
    let err = load_config(file.path().to_str(), &None, false, false).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn missing_options_file_is_an_io_error() {
    let err = load_config(Some("/nonexistent/options.json"), &None, false, false).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}
