//! 설정 관리 — stagehand.toml 파싱 및 런타임 설정
//!
//! [`HarnessConfig`]는 하네스 실행에 필요한 모든 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`DISABLE_COMPOSITION`, `TEST_SLEEP`, `STAGEHAND_*`)
//! 3. 설정 파일 (`stagehand.toml`, 선택)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), stagehand_core::error::HarnessError> {
//! use stagehand_core::config::HarnessConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = HarnessConfig::load("stagehand.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = HarnessConfig::parse("[composition]\nsettle_secs = 10")?;
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, HarnessError};

/// 허용되는 로그 레벨
pub const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// `AGENT_LOG_LEVEL` 값을 tracing 레벨 이름으로 변환합니다.
///
/// 대소문자를 구분하지 않습니다. 에이전트 쪽 레벨 이름(`CRITICAL`, `ERROR`,
/// `WARNING`, `INFO`, `DEBUG`)과 tracing 레벨 이름을 모두 받습니다.
pub fn agent_tracing_level(level: &str) -> Option<&'static str> {
    match level.to_ascii_lowercase().as_str() {
        "critical" | "error" => Some("error"),
        "warning" | "warn" => Some("warn"),
        "info" => Some("info"),
        "debug" => Some("debug"),
        "trace" => Some("trace"),
        _ => None,
    }
}

/// Stagehand 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// 일반 설정 (로깅)
    #[serde(default)]
    pub general: GeneralConfig,
    /// 컴포지션 오케스트레이션 설정
    #[serde(default)]
    pub composition: CompositionConfig,
    /// 시나리오 실행 설정
    #[serde(default)]
    pub scenarios: ScenariosConfig,
    /// 공유 컨텍스트 기본 인자
    #[serde(default)]
    pub context: ContextConfig,
}

impl HarnessConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, HarnessError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 파일이 주어지면 로드하고, 없으면 기본값에 환경변수만 적용합니다.
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, HarnessError> {
        match path {
            Some(path) => Self::load(path).await,
            None => {
                let mut config = Self::default();
                config.apply_env_overrides();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, HarnessError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                HarnessError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                HarnessError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, HarnessError> {
        toml::from_str(toml_str).map_err(|e| {
            HarnessError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 기존 하네스와 호환되는 변수(`DISABLE_COMPOSITION`, `TEST_SLEEP`,
    /// `AGENT_LOG_LEVEL`, `AGENT_LOG_MODULE`)와 `STAGEHAND_{SECTION}_{FIELD}`
    /// 형식의 변수를 함께 지원합니다.
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "STAGEHAND_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "STAGEHAND_GENERAL_LOG_FORMAT");
        override_opt_string(&mut self.general.agent_log_level, "AGENT_LOG_LEVEL");
        override_opt_string(&mut self.general.agent_log_module, "AGENT_LOG_MODULE");

        // Composition
        override_bool(&mut self.composition.enabled, "STAGEHAND_COMPOSITION_ENABLED");
        if std::env::var("DISABLE_COMPOSITION").is_ok_and(|v| v == "true") {
            self.composition.enabled = false;
        }
        override_u64_or_zero(&mut self.composition.settle_secs, "TEST_SLEEP");
        override_string(
            &mut self.composition.definition_file,
            "STAGEHAND_COMPOSITION_DEFINITION_FILE",
        );
        override_parsed(
            &mut self.composition.teardown_policy,
            "STAGEHAND_COMPOSITION_TEARDOWN_POLICY",
        );

        // Scenarios
        override_string(
            &mut self.scenarios.features_dir,
            "STAGEHAND_SCENARIOS_FEATURES_DIR",
        );
        if let Ok(val) = std::env::var("STAGEHAND_SCENARIOS_SEED") {
            match val.parse::<u64>() {
                Ok(parsed) => self.scenarios.seed = Some(parsed),
                Err(_) => warn!(
                    env_key = "STAGEHAND_SCENARIOS_SEED",
                    value = val.as_str(),
                    "failed to parse seed from env var, ignoring"
                ),
            }
        }

        // Context
        override_string(&mut self.context.sidetree_url, "STAGEHAND_CONTEXT_SIDETREE_URL");
        override_string(&mut self.context.did_doc_path, "STAGEHAND_CONTEXT_DID_DOC_PATH");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), HarnessError> {
        if !VALID_LOG_LEVELS.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", VALID_LOG_LEVELS.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        // AGENT_LOG_LEVEL 파싱 실패는 실행 전체를 중단시킵니다
        if let Some(level) = &self.general.agent_log_level {
            if agent_tracing_level(level).is_none() {
                return Err(ConfigError::InvalidValue {
                    field: "general.agent_log_level".to_owned(),
                    reason: format!(
                        "'{level}' is not a log level, expected one of: \
                         critical, error, warning, info, debug"
                    ),
                }
                .into());
            }
        }

        if self.composition.enabled {
            if self.composition.definitions.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "composition.definitions".to_owned(),
                    reason: "at least one definition is required when composition is enabled"
                        .to_owned(),
                }
                .into());
            }
            if let Some(entry) = self.composition.definitions.iter().find(|d| d.dir.is_empty()) {
                return Err(ConfigError::InvalidValue {
                    field: "composition.definitions.dir".to_owned(),
                    reason: format!("definition directory must not be empty ({entry:?})"),
                }
                .into());
            }
            if self.composition.definition_file.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "composition.definition_file".to_owned(),
                    reason: "must not be empty".to_owned(),
                }
                .into());
            }
        }

        if self.scenarios.features_dir.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "scenarios.features_dir".to_owned(),
                reason: "must not be empty".to_owned(),
            }
            .into());
        }

        if self.context.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "context.request_timeout_secs".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 하네스 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
    /// 테스트 대상 시스템의 로그 레벨 (`AGENT_LOG_LEVEL`)
    pub agent_log_level: Option<String>,
    /// `agent_log_level`을 적용할 모듈 (`AGENT_LOG_MODULE`, 없으면 전체)
    pub agent_log_module: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
            agent_log_level: None,
            agent_log_module: None,
        }
    }
}

/// 컴포지션 오케스트레이션 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositionConfig {
    /// 오케스트레이션 활성화 여부 (`DISABLE_COMPOSITION=true`이면 비활성)
    pub enabled: bool,
    /// 기동 후 대기 시간 (초, `TEST_SLEEP`)
    pub settle_secs: u64,
    /// 각 정의 디렉토리 안의 정의 파일 이름
    pub definition_file: String,
    /// 기동 순서대로 나열한 정의 디렉토리
    pub definitions: Vec<DefinitionEntry>,
    /// 해체 중 에러 처리 정책
    pub teardown_policy: TeardownPolicy,
}

impl CompositionConfig {
    /// 기동 후 대기 시간
    pub fn settle_duration(&self) -> Duration {
        Duration::from_secs(self.settle_secs)
    }

    /// 정의 파일 이름을 해석한 (디렉토리, 파일) 목록을 반환합니다.
    pub fn resolved_definitions(&self) -> Vec<(PathBuf, String)> {
        self.definitions
            .iter()
            .map(|d| {
                let file = d
                    .file
                    .clone()
                    .unwrap_or_else(|| self.definition_file.clone());
                (PathBuf::from(&d.dir), file)
            })
            .collect()
    }
}

impl Default for CompositionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            settle_secs: 5,
            definition_file: "docker-compose.yml".to_owned(),
            definitions: vec![
                DefinitionEntry::new("./fixtures/sidetree-node"),
                DefinitionEntry::new("./fixtures/agent"),
            ],
            teardown_policy: TeardownPolicy::default(),
        }
    }
}

/// 컴포지션 정의 디렉토리
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionEntry {
    /// 정의 파일이 들어 있는 디렉토리
    pub dir: String,
    /// 이 디렉토리에만 적용할 정의 파일 이름
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl DefinitionEntry {
    /// 기본 정의 파일 이름을 쓰는 항목을 생성합니다.
    pub fn new(dir: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            file: None,
        }
    }
}

/// 해체 중 에러 처리 정책
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeardownPolicy {
    /// 첫 에러에서 즉시 중단 (남은 컴포지션은 처리하지 않음)
    #[default]
    #[serde(rename = "abort")]
    AbortOnError,
    /// 모든 컴포지션을 처리한 뒤 에러를 모아 보고
    #[serde(rename = "continue")]
    ContinueOnError,
}

impl fmt::Display for TeardownPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AbortOnError => write!(f, "abort"),
            Self::ContinueOnError => write!(f, "continue"),
        }
    }
}

impl FromStr for TeardownPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "abort" => Ok(Self::AbortOnError),
            "continue" => Ok(Self::ContinueOnError),
            other => Err(ConfigError::InvalidValue {
                field: "composition.teardown_policy".to_owned(),
                reason: format!("'{other}' is not one of: abort, continue"),
            }),
        }
    }
}

/// 시나리오 실행 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenariosConfig {
    /// feature 파일 탐색 루트
    pub features_dir: String,
    /// 시나리오 순서 시드 고정값 (없으면 실행마다 현재 시각)
    pub seed: Option<u64>,
}

impl Default for ScenariosConfig {
    fn default() -> Self {
        Self {
            features_dir: "features".to_owned(),
            seed: None,
        }
    }
}

/// 공유 컨텍스트 기본 인자
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// 서비스 엔드포인트 URL
    pub sidetree_url: String,
    /// 픽스처 문서 경로
    pub did_doc_path: String,
    /// 첫 번째 에이전트 호스트 이름
    pub alice_agent_host: String,
    /// 두 번째 에이전트 호스트 이름
    pub bob_agent_host: String,
    /// 스텝에서 사용하는 HTTP 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
    /// 추가로 시드할 인자
    pub args: BTreeMap<String, String>,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            sidetree_url: "http://localhost:48326/.sidetree/document".to_owned(),
            did_doc_path: "fixtures/sidetree-node/config/didDocument.json".to_owned(),
            alice_agent_host: "alice.agent.example.com".to_owned(),
            bob_agent_host: "bob.agent.example.com".to_owned(),
            request_timeout_secs: 30,
            args: BTreeMap::new(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_opt_string(target: &mut Option<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        if !val.is_empty() {
            *target = Some(val);
        }
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

/// 파싱에 실패하면 0으로 내려갑니다 (`TEST_SLEEP` 호환 동작).
fn override_u64_or_zero(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        if val.is_empty() {
            return;
        }
        match val.trim().parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => {
                warn!(
                    env_key,
                    value = val.as_str(),
                    "failed to parse u64 from env var, using 0"
                );
                *target = 0;
            }
        }
    }
}

fn override_parsed<T>(target: &mut T, env_key: &str)
where
    T: FromStr,
    T::Err: fmt::Display,
{
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<T>() {
            Ok(parsed) => *target = parsed,
            Err(e) => warn!(
                env_key,
                value = val.as_str(),
                error = %e,
                "failed to parse env var, ignoring"
            ),
        }
    }
}
