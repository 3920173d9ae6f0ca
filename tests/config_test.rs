use rstest::rstest;
use runeforge::config::{Config, ScoringWeights, SearchParams, Strategy};
use runeforge::error::RuneError;
use std::io::Write;

#[test]
fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.search.strategy, Strategy::TwoPhase);
    assert_eq!(config.search.top_n, 10);
    assert_eq!(config.search.expansion_radius, 3);
    assert_eq!(config.search.progress_interval_ms, 500);
    assert_eq!(config.search.two_phase_interval_ms, 200);
    assert!(!config.search.distinct_accessory_skills);
    assert!(config.weights.validate().is_ok());
}

#[test]
fn test_resolved_threads() {
    let params = SearchParams {
        threads: 3,
        ..Default::default()
    };
    assert_eq!(params.resolved_threads(), 3);
    assert!(SearchParams::default().resolved_threads() >= 1);
}

#[rstest]
#[case(ScoringWeights { stacking_weight: 1.5, ..Default::default() })]
#[case(ScoringWeights { dot_uptime: -0.1, ..Default::default() })]
#[case(ScoringWeights { role_bonus: -1.0, ..Default::default() })]
#[case(ScoringWeights { synergy_multiplier: 0.9, ..Default::default() })]
#[case(ScoringWeights { min_awakening_cooldown: 0.0, ..Default::default() })]
fn test_invalid_weights_rejected(#[case] weights: ScoringWeights) {
    assert!(matches!(weights.validate(), Err(RuneError::Config(_))));
}

#[test]
fn test_partial_weights_file_keeps_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"trigger_weight": 0.6, "synergy_multiplier": 1.25}}"#).unwrap();

    let weights = ScoringWeights::load_from_file(file.path()).unwrap();
    assert_eq!(weights.trigger_weight, 0.6);
    assert_eq!(weights.synergy_multiplier, 1.25);
    assert_eq!(weights.stacking_weight, 0.85);
}

#[test]
fn test_invalid_weights_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"default_uptime": 3.0}}"#).unwrap();
    assert!(matches!(
        ScoringWeights::load_from_file(file.path()),
        Err(RuneError::Config(_))
    ));

    let mut broken = tempfile::NamedTempFile::new().unwrap();
    write!(broken, "not json").unwrap();
    assert!(matches!(
        ScoringWeights::load_from_file(broken.path()),
        Err(RuneError::Json(_))
    ));

    assert!(matches!(
        ScoringWeights::load_from_file("/definitely/not/here.json"),
        Err(RuneError::Io(_))
    ));
}

#[test]
fn test_search_params_deserialize_snake_case() {
    let params: SearchParams =
        serde_json::from_str(r#"{"strategy": "single_phase", "top_n": 4}"#).unwrap();
    assert_eq!(params.strategy, Strategy::SinglePhase);
    assert_eq!(params.top_n, 4);
    assert_eq!(params.max_subsets, 2_000_000);
}
