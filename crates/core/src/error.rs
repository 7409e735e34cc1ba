//! 에러 타입 — 도메인별 에러 정의
//!
//! 하네스의 에러는 세 부류로 나뉩니다.
//! - 인프라 치명 에러: 컴포지션 기동/로그 수집/해체, 컨텍스트 생성 실패
//! - 시나리오 에러: 시나리오 엔진이 기록하며 프로세스 종료 코드로만 드러남
//! - 설정 경고: 잘못된 숫자 환경변수는 경고 후 기본값으로 대체 (에러 아님)

/// Stagehand 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 공유 컨텍스트 생성 에러
    #[error("context error: {0}")]
    Context(#[from] ContextError),

    /// 컴포지션 생명주기 에러
    #[error("composition error: {0}")]
    Composition(#[from] CompositionError),

    /// 시나리오 엔진 에러
    #[error("scenario error: {0}")]
    Scenario(#[from] ScenarioError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 공유 컨텍스트 생성 에러
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    /// HTTP 클라이언트 생성 실패
    #[error("failed to build http client: {0}")]
    HttpClient(String),

    /// 필수 인자 누락
    #[error("missing context argument: {0}")]
    MissingArg(String),
}

/// 컴포지션 생명주기 에러
#[derive(Debug, thiserror::Error)]
pub enum CompositionError {
    /// 오케스트레이터 데몬에 연결할 수 없음
    #[error("orchestrator unreachable: {0}")]
    Unreachable(String),

    /// 컴포지션 기동 실패
    #[error("bring-up failed for '{definition}': {reason}")]
    BringUp { definition: String, reason: String },

    /// 로그 수집 실패
    #[error("log collection failed for '{definition}': {reason}")]
    Logs { definition: String, reason: String },

    /// 컴포지션 해체 실패
    #[error("decompose failed for '{definition}': {reason}")]
    Decompose { definition: String, reason: String },

    /// 계속 진행 정책에서 수집된 해체 에러 요약
    #[error("{0}")]
    Teardown(String),
}

/// 시나리오 엔진 에러
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// 태그 표현식 파싱 실패
    #[error("invalid tag expression '{expression}': {reason}")]
    TagExpression { expression: String, reason: String },

    /// 스텝 패턴 컴파일 실패
    #[error("invalid step pattern '{pattern}': {reason}")]
    StepPattern { pattern: String, reason: String },
}
