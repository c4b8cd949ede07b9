use tessera_core::config::defaults;
use tessera_core::TesseraConfig;

#[test]
fn defaults_are_valid() {
    let config = TesseraConfig::default();
    config.validate().unwrap();
    assert_eq!(config.quantizer.clusters, defaults::DEFAULT_CLUSTER_COUNT);
    assert_eq!(config.selector.exploration_rate, 0.1);
    assert_eq!(config.selector.learning_rate, 0.1);
    assert_eq!(config.feedback.high_quality_threshold, 0.8);
}

#[test]
fn partial_toml_falls_back_to_defaults() {
    let config = TesseraConfig::from_toml(
        r#"
        [selector]
        exploration_rate = 0.25

        [quantizer]
        clusters = 8
        "#,
    )
    .unwrap();
    assert_eq!(config.selector.exploration_rate, 0.25);
    assert_eq!(config.selector.learning_rate, defaults::DEFAULT_LEARNING_RATE);
    assert_eq!(config.quantizer.clusters, 8);
    assert_eq!(config.rerank.top_n, defaults::DEFAULT_RERANK_TOP_N);
}

#[test]
fn toml_round_trip_preserves_sections() {
    let mut config = TesseraConfig::default();
    config.feedback.min_content_chars = 42;
    config.storage.db_path = Some("/tmp/tessera.db".to_string());
    let text = config.to_toml().unwrap();
    let back = TesseraConfig::from_toml(&text).unwrap();
    assert_eq!(back.feedback.min_content_chars, 42);
    assert_eq!(back.storage.db_path.as_deref(), Some("/tmp/tessera.db"));
}

#[test]
fn out_of_range_exploration_rate_rejected() {
    let err = TesseraConfig::from_toml("[selector]\nexploration_rate = 1.5\n").unwrap_err();
    assert!(err.to_string().contains("exploration_rate"));
}

#[test]
fn inverted_thresholds_rejected() {
    let mut config = TesseraConfig::default();
    config.feedback.medium_quality_threshold = 0.9;
    config.feedback.high_quality_threshold = 0.7;
    assert!(config.validate().is_err());
}

#[test]
fn zero_clusters_rejected() {
    let mut config = TesseraConfig::default();
    config.quantizer.clusters = 0;
    assert!(config.validate().is_err());
}

#[test]
fn malformed_toml_is_config_error() {
    let err = TesseraConfig::from_toml("[selector\n").unwrap_err();
    assert!(matches!(err, tessera_core::TesseraError::ConfigError(_)));
}

#[test]
fn zero_event_timeout_rejected() {
    let mut config = TesseraConfig::default();
    config.feedback.event_timeout_secs = 0;
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("event_timeout_secs"));
}

#[test]
fn hash_fallback_is_off_by_default() {
    let config = TesseraConfig::default();
    assert!(!config.embedding.hash_fallback);
    assert!(config.embedding.retry_cooldown_secs > 0);
}
