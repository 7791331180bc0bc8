use super::*;
use serial_test::serial;
use std::env;
use std::path::PathBuf;

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    clear_titlenorm_env();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    clear_titlenorm_env();
    result
}

fn clear_titlenorm_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for name in Config::ENV_VARS {
        unsafe { env::remove_var(name) };
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.mapping_path, PathBuf::from("canonical_mapping_raw.json"));
    assert!(config.model_path.is_none());
    assert_eq!(config.similarity_threshold, 0.75);
    assert_eq!(config.auto_learn_threshold, 0.88);
    assert_eq!(config.fuzzy_cutoff, 85);
    assert_eq!(config.index_policy, IndexPolicy::Snapshot);
    assert_eq!(config.sample_size, 500);
    assert_eq!(config.sample_seed, 42);
    assert_eq!(config.review_top_k, 20);
    assert_eq!(config.target_column, "Designation*");
    assert!(config.department_column.is_none());
    assert_eq!(config.embedder, EmbedderKind::Model);
}

#[test]
fn test_validate_requires_model_path_for_model_embedder() {
    let config = Config::default();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::MissingModelPath {
            name: "TITLENORM_MODEL_PATH",
            opt_in: "TITLENORM_EMBEDDER",
        })
    ));

    let with_model = Config {
        model_path: Some(PathBuf::from("/models/minilm")),
        ..Default::default()
    };
    assert!(with_model.validate().is_ok());
}

#[test]
#[serial]
fn test_unset_model_path_does_not_select_stub() {
    let config = with_env_vars(&[], Config::from_env).unwrap();
    assert_eq!(config.embedder, EmbedderKind::Model);
    assert!(!config.sentence_config().testing_stub);
    assert!(config.validate().is_err());
}

#[test]
#[serial]
fn test_stub_embedder_is_explicit_opt_in() {
    let config = with_env_vars(&[("TITLENORM_EMBEDDER", " Stub ")], Config::from_env).unwrap();
    assert_eq!(config.embedder, EmbedderKind::Stub);
    assert!(config.model_path.is_none());
    assert!(config.validate().is_ok());
    assert!(config.sentence_config().testing_stub);
}

#[test]
#[serial]
fn test_unknown_embedder() {
    let result = with_env_vars(&[("TITLENORM_EMBEDDER", "hashed")], Config::from_env);
    assert!(matches!(result, Err(ConfigError::UnknownEmbedder { .. })));
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    let config = with_env_vars(&[], Config::from_env).expect("should parse with defaults");
    assert_eq!(config, Config::default());
}

#[test]
#[serial]
fn test_from_env_overrides() {
    let config = with_env_vars(
        &[
            ("TITLENORM_MAPPING_PATH", "/data/titles.json"),
            ("TITLENORM_MODEL_PATH", "/models/minilm"),
            ("TITLENORM_SIMILARITY_THRESHOLD", "0.7"),
            ("TITLENORM_AUTO_LEARN_THRESHOLD", " 0.9 "),
            ("TITLENORM_FUZZY_CUTOFF", "90"),
            ("TITLENORM_INDEX_POLICY", "incremental"),
            ("TITLENORM_SAMPLE_SIZE", "100"),
            ("TITLENORM_SAMPLE_SEED", "7"),
            ("TITLENORM_REVIEW_TOP_K", "0"),
            ("TITLENORM_TARGET_COLUMN", "Job Title"),
            ("TITLENORM_DEPARTMENT_COLUMN", "Department"),
            ("TITLENORM_DEPARTMENT_OUTPUT", "/tmp/departments.json"),
            ("TITLENORM_REPORT_PATH", "/tmp/report.json"),
            ("TITLENORM_EMBED_CACHE_CAPACITY", "50"),
        ],
        Config::from_env,
    )
    .unwrap();

    assert_eq!(config.mapping_path, PathBuf::from("/data/titles.json"));
    assert_eq!(config.model_path, Some(PathBuf::from("/models/minilm")));
    assert_eq!(config.similarity_threshold, 0.7);
    assert_eq!(config.auto_learn_threshold, 0.9);
    assert_eq!(config.fuzzy_cutoff, 90);
    assert_eq!(config.index_policy, IndexPolicy::Incremental);
    assert_eq!(config.sample_size, 100);
    assert_eq!(config.sample_seed, 7);
    assert_eq!(config.review_top_k, 0);
    assert_eq!(config.target_column, "Job Title");
    assert_eq!(config.department_column.as_deref(), Some("Department"));
    assert_eq!(config.department_output, Some(PathBuf::from("/tmp/departments.json")));
    assert_eq!(config.report_path, Some(PathBuf::from("/tmp/report.json")));
    assert_eq!(config.embed_cache_capacity, 50);
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_malformed_threshold_is_an_error() {
    let result = with_env_vars(&[("TITLENORM_SIMILARITY_THRESHOLD", "high")], Config::from_env);
    assert!(matches!(
        result,
        Err(ConfigError::InvalidNumber {
            name: "TITLENORM_SIMILARITY_THRESHOLD",
            ..
        })
    ));
}

#[test]
#[serial]
fn test_malformed_cutoff_is_an_error() {
    let result = with_env_vars(&[("TITLENORM_FUZZY_CUTOFF", "-5")], Config::from_env);
    assert!(matches!(result, Err(ConfigError::InvalidNumber { .. })));
}

#[test]
#[serial]
fn test_unknown_index_policy() {
    let result = with_env_vars(&[("TITLENORM_INDEX_POLICY", "lazy")], Config::from_env);
    assert!(matches!(result, Err(ConfigError::UnknownIndexPolicy { .. })));
}

#[test]
#[serial]
fn test_empty_values_fall_back_to_defaults() {
    let config = with_env_vars(
        &[("TITLENORM_MODEL_PATH", "  "), ("TITLENORM_TARGET_COLUMN", "")],
        Config::from_env,
    )
    .unwrap();
    assert!(config.model_path.is_none());
    assert_eq!(config.target_column, "Designation*");
}

#[test]
fn test_validate_threshold_order() {
    let config = Config {
        similarity_threshold: 0.9,
        auto_learn_threshold: 0.8,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::ThresholdOrder { .. })
    ));
}

#[test]
fn test_validate_threshold_range() {
    let config = Config {
        auto_learn_threshold: 1.2,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::ThresholdOutOfRange { .. })
    ));
}

#[test]
fn test_validate_fuzzy_cutoff() {
    let config = Config {
        fuzzy_cutoff: 101,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::FuzzyCutoffOutOfRange { value: 101 })
    ));

    let config = Config {
        fuzzy_cutoff: 100,
        ..Default::default()
    };
    assert_eq!(config.resolver_config().unwrap().fuzzy_cutoff, 100);
}

#[test]
fn test_validate_zero_sample_size() {
    let config = Config {
        sample_size: 0,
        ..Default::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::ZeroValue { .. })));
}

#[test]
fn test_derived_configs() {
    let config = Config {
        department_column: Some("Dept".to_string()),
        review_top_k: 5,
        ..Default::default()
    };

    let request = config.batch_request();
    assert_eq!(request.target_column, "Designation*");
    assert_eq!(request.department_column.as_deref(), Some("Dept"));
    assert_eq!(request.review_top_k, 5);

    let missing = config.sentence_config();
    assert!(!missing.testing_stub);
    assert!(missing.validate().is_err());
    let with_model = Config {
        model_path: Some(PathBuf::from("/models/minilm")),
        ..Default::default()
    };
    let sentence = with_model.sentence_config();
    assert!(!sentence.testing_stub);
    assert_eq!(sentence.model_path, PathBuf::from("/models/minilm"));
}
