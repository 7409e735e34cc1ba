//! Stagehand 공통 크레이트
//!
//! 하네스의 모든 크레이트가 공유하는 타입을 제공합니다.
//!
//! - [`error`]: 도메인별 에러 타입 (`HarnessError` 외)
//! - [`config`]: `stagehand.toml` 파싱 및 환경변수 오버라이드
//! - [`run`]: 실행 구성 해석 (태그 필터, 출력 형식, 시드, 실패 정책)
//! - [`context`]: 모든 스텝 등록기가 공유하는 실행 범위 컨텍스트

pub mod config;
pub mod context;
pub mod error;
pub mod run;

// --- 주요 타입 re-export ---

// 에러
pub use error::{CompositionError, ConfigError, ContextError, HarnessError, ScenarioError};

// 설정
pub use config::{
    CompositionConfig, ContextConfig, DefinitionEntry, GeneralConfig, HarnessConfig,
    ScenariosConfig, TeardownPolicy,
};

// 실행 구성
pub use run::{OutputFormat, RunConfiguration, RunInputs, TagFilter};

// 공유 컨텍스트
pub use context::SharedContext;
