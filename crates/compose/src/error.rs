//! 컴포지션 에러 타입
//!
//! [`ComposeError`]는 컴포지션 기동/로그 수집/해체 중 발생하는 모든 에러를 표현합니다.
//! `From<ComposeError> for HarnessError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use stagehand_core::error::{CompositionError, HarnessError};

/// 컴포지션 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    /// Docker 데몬 연결 실패
    #[error("docker connection error: {0}")]
    DaemonConnection(String),

    /// 오케스트레이터가 허용하지 않는 프로젝트 이름
    #[error("invalid project name '{0}': only [a-z0-9_] allowed")]
    InvalidProjectName(String),

    /// 정의 디렉토리 또는 정의 파일이 없음
    #[error("definition not found: {path}")]
    DefinitionNotFound {
        /// 찾지 못한 경로
        path: String,
    },

    /// 오케스트레이터 명령 실행 불가
    #[error("failed to spawn '{command}': {reason}")]
    Spawn {
        /// 실행하려던 명령
        command: String,
        /// 실패 사유
        reason: String,
    },

    /// 오케스트레이터 명령이 0이 아닌 상태로 종료
    #[error("'{command}' exited with {status}: {stderr}")]
    CommandFailed {
        /// 실행한 명령
        command: String,
        /// 종료 상태
        status: String,
        /// 표준 에러 출력 (앞뒤 공백 제거)
        stderr: String,
    },

    /// 로그 파일 기록 실패
    #[error("failed to write log file {path}: {reason}")]
    LogWrite {
        /// 로그 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 컴포지션 기동 실패
    #[error("bring-up failed for '{definition}': {source}")]
    BringUp {
        /// 정의 디렉토리
        definition: String,
        /// 원인
        source: Box<ComposeError>,
    },

    /// 로그 수집 실패
    #[error("log collection failed for '{definition}': {source}")]
    LogCollection {
        /// 정의 디렉토리
        definition: String,
        /// 원인
        source: Box<ComposeError>,
    },

    /// 컴포지션 해체 실패
    #[error("decompose failed for '{definition}': {source}")]
    Decompose {
        /// 정의 디렉토리
        definition: String,
        /// 원인
        source: Box<ComposeError>,
    },

    /// 계속 진행 정책에서 수집된 해체 에러 목록
    #[error("teardown failed for {} composition(s): {}", .0.len(), join_errors(.0))]
    Teardown(Vec<ComposeError>),
}

fn join_errors(errors: &[ComposeError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<ComposeError> for HarnessError {
    fn from(err: ComposeError) -> Self {
        match &err {
            ComposeError::DaemonConnection(msg) => {
                HarnessError::Composition(CompositionError::Unreachable(msg.clone()))
            }
            ComposeError::BringUp { definition, source } => {
                HarnessError::Composition(CompositionError::BringUp {
                    definition: definition.clone(),
                    reason: source.to_string(),
                })
            }
            ComposeError::LogCollection { definition, source } => {
                HarnessError::Composition(CompositionError::Logs {
                    definition: definition.clone(),
                    reason: source.to_string(),
                })
            }
            ComposeError::Decompose { definition, source } => {
                HarnessError::Composition(CompositionError::Decompose {
                    definition: definition.clone(),
                    reason: source.to_string(),
                })
            }
            ComposeError::Teardown(_) => {
                HarnessError::Composition(CompositionError::Teardown(err.to_string()))
            }
            ComposeError::InvalidProjectName(_)
            | ComposeError::DefinitionNotFound { .. }
            | ComposeError::Spawn { .. }
            | ComposeError::CommandFailed { .. }
            | ComposeError::LogWrite { .. } => {
                HarnessError::Composition(CompositionError::BringUp {
                    definition: "*".to_owned(),
                    reason: err.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command_failed() -> ComposeError {
        ComposeError::CommandFailed {
            command: "docker compose up -d".to_owned(),
            status: "exit status: 1".to_owned(),
            stderr: "no such service".to_owned(),
        }
    }

    #[test]
    fn command_failed_display() {
        let msg = command_failed().to_string();
        assert!(msg.contains("docker compose up -d"));
        assert!(msg.contains("no such service"));
    }

    #[test]
    fn bring_up_display_includes_cause() {
        let err = ComposeError::BringUp {
            definition: "./fixtures/agent".to_owned(),
            source: Box::new(command_failed()),
        };
        let msg = err.to_string();
        assert!(msg.contains("./fixtures/agent"));
        assert!(msg.contains("no such service"));
    }

    #[test]
    fn teardown_display_lists_every_failure() {
        let err = ComposeError::Teardown(vec![
            ComposeError::Decompose {
                definition: "a".to_owned(),
                source: Box::new(command_failed()),
            },
            ComposeError::LogCollection {
                definition: "b".to_owned(),
                source: Box::new(ComposeError::LogWrite {
                    path: "/tmp/x.log".to_owned(),
                    reason: "read-only".to_owned(),
                }),
            },
        ]);
        let msg = err.to_string();
        assert!(msg.starts_with("teardown failed for 2 composition(s)"));
        assert!(msg.contains("'a'"));
        assert!(msg.contains("read-only"));
    }

    #[test]
    fn converts_bring_up_to_harness_error() {
        let err = ComposeError::BringUp {
            definition: "x".to_owned(),
            source: Box::new(command_failed()),
        };
        let harness: HarnessError = err.into();
        assert!(matches!(
            harness,
            HarnessError::Composition(CompositionError::BringUp { .. })
        ));
    }

    #[test]
    fn converts_aggregated_teardown_to_harness_error() {
        let err = ComposeError::Teardown(vec![ComposeError::Decompose {
            definition: "a".to_owned(),
            source: Box::new(command_failed()),
        }]);
        let harness: HarnessError = err.into();
        assert!(matches!(
            harness,
            HarnessError::Composition(CompositionError::Teardown(_))
        ));
        assert!(harness.to_string().contains("teardown failed for 1 composition(s)"));
    }

    #[test]
    fn converts_log_collection_to_harness_error() {
        let err = ComposeError::LogCollection {
            definition: "x".to_owned(),
            source: Box::new(command_failed()),
        };
        let harness: HarnessError = err.into();
        assert!(matches!(
            harness,
            HarnessError::Composition(CompositionError::Logs { .. })
        ));
    }

    #[test]
    fn converts_daemon_connection_to_unreachable() {
        let harness: HarnessError = ComposeError::DaemonConnection("no socket".to_owned()).into();
        assert!(matches!(
            harness,
            HarnessError::Composition(CompositionError::Unreachable(_))
        ));
    }
}
