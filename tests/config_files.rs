// tests/config_files.rs
//
// The shipped config files must load, validate, and match the built-in
// defaults so the binary and the library agree out of the box.

use serial_test::serial;
use skill_credibility::config::AppConfig;
use skill_credibility::{ClaimLevel, ConfigError, ScoringPolicy, WeightTable};

#[test]
fn shipped_weights_match_default_seed() {
    let loaded = WeightTable::load_from_file("config/weights.json").expect("config/weights.json");
    assert_eq!(loaded.config(), WeightTable::default_seed().config());
}

#[test]
fn shipped_policy_matches_defaults() {
    let loaded = ScoringPolicy::load_from_file("config/scoring.toml").expect("config/scoring.toml");
    assert_eq!(loaded, ScoringPolicy::default());
    assert_eq!(loaded.expected_score(ClaimLevel::Expert), 90.0);
}

#[test]
#[serial]
fn app_config_loads_both_files_by_default() {
    std::env::remove_var("CREDIBILITY_WEIGHTS_PATH");
    std::env::remove_var("CREDIBILITY_POLICY_PATH");
    let cfg = AppConfig::from_env();
    assert!(cfg.load_weights().is_ok());
    assert!(cfg.load_policy().is_ok());
}

#[test]
fn missing_weights_file_is_a_read_error() {
    match WeightTable::load_from_file("config/does-not-exist.json") {
        Err(ConfigError::Read { path, .. }) => {
            assert!(path.ends_with("does-not-exist.json"))
        }
        other => panic!("expected read error, got {other:?}"),
    }
}

#[test]
fn weights_parse_error_names_origin() {
    let err = WeightTable::from_json_str("not json").unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("weights json"));
}
