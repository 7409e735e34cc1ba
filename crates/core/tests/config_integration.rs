//! stagehand.toml 통합 설정 테스트
//!
//! - stagehand.toml.example 파싱 테스트
//! - 파일 로딩 + 환경변수 우선순위 테스트
//! - 잘못된 형식 에러 테스트

use std::io::Write;

use serial_test::serial;
use stagehand_core::config::{HarnessConfig, TeardownPolicy};
use stagehand_core::error::{ConfigError, HarnessError};

const ENV_KEYS: [&str; 6] = [
    "DISABLE_COMPOSITION",
    "TEST_SLEEP",
    "AGENT_LOG_LEVEL",
    "AGENT_LOG_MODULE",
    "STAGEHAND_COMPOSITION_TEARDOWN_POLICY",
    "STAGEHAND_SCENARIOS_SEED",
];

fn clear_env() {
    for key in ENV_KEYS {
        // SAFETY: serial 테스트에서만 호출됩니다.
        unsafe { std::env::remove_var(key) };
    }
}

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("should create temp file");
    file.write_all(content.as_bytes())
        .expect("should write config");
    file
}

// =============================================================================
// stagehand.toml.example 파싱 테스트
// =============================================================================

#[test]
fn example_config_parses_successfully() {
    let content = include_str!("../../../stagehand.toml.example");
    let config = HarnessConfig::parse(content).expect("example config should parse");
    config
        .validate()
        .expect("example config should pass validation");

    assert!(config.composition.enabled);
    assert_eq!(config.composition.settle_secs, 5);
    assert_eq!(config.composition.definitions.len(), 2);
    assert_eq!(config.scenarios.features_dir, "features");
    assert!(config.context.args.is_empty());
}

// =============================================================================
// 환경변수 우선순위 테스트
// =============================================================================

#[tokio::test]
#[serial]
async fn env_overrides_file_values() {
    clear_env();
    let file = write_config(
        r#"
[composition]
settle_secs = 20
teardown_policy = "abort"
"#,
    );

    // SAFETY: serial 테스트이므로 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("TEST_SLEEP", "2");
        std::env::set_var("DISABLE_COMPOSITION", "true");
        std::env::set_var("STAGEHAND_COMPOSITION_TEARDOWN_POLICY", "continue");
        std::env::set_var("STAGEHAND_SCENARIOS_SEED", "99");
    }

    let config = HarnessConfig::load(file.path())
        .await
        .expect("config should load");
    clear_env();

    assert_eq!(config.composition.settle_secs, 2);
    assert!(!config.composition.enabled);
    assert_eq!(
        config.composition.teardown_policy,
        TeardownPolicy::ContinueOnError
    );
    assert_eq!(config.scenarios.seed, Some(99));
}

#[tokio::test]
#[serial]
async fn disable_composition_requires_exact_true() {
    clear_env();
    // SAFETY: serial 테스트이므로 환경변수 조작이 안전합니다.
    unsafe { std::env::set_var("DISABLE_COMPOSITION", "yes") };

    let config = HarnessConfig::load_or_default(None)
        .await
        .expect("defaults should load");
    clear_env();

    assert!(config.composition.enabled);
}

#[tokio::test]
#[serial]
async fn settle_defaults_to_five_without_override() {
    clear_env();
    let config = HarnessConfig::load_or_default(None)
        .await
        .expect("defaults should load");
    assert_eq!(config.composition.settle_duration().as_secs(), 5);
}

#[tokio::test]
#[serial]
async fn invalid_agent_log_level_is_rejected() {
    clear_env();
    // SAFETY: serial 테스트이므로 환경변수 조작이 안전합니다.
    unsafe { std::env::set_var("AGENT_LOG_LEVEL", "chatty") };

    let result = HarnessConfig::load_or_default(None).await;
    clear_env();

    let err = result.expect_err("invalid level should fail");
    assert!(matches!(
        err,
        HarnessError::Config(ConfigError::InvalidValue { .. })
    ));
}

// =============================================================================
// 에러 테스트
// =============================================================================

#[tokio::test]
#[serial]
async fn malformed_file_is_parse_error() {
    clear_env();
    let file = write_config("[composition\nsettle_secs = ");
    let err = HarnessConfig::load(file.path())
        .await
        .expect_err("malformed file should fail");
    assert!(matches!(
        err,
        HarnessError::Config(ConfigError::ParseFailed { .. })
    ));
}
