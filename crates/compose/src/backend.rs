//! 오케스트레이터 추상화
//!
//! [`ComposeBackend`] trait은 컴포지션의 저수준 기동/해체 동작을 추상화합니다.
//! 운영 코드는 [`DockerComposeCli`]를, 테스트는 `MockComposeBackend`를 사용합니다.
//!
//! ```text
//! ┌──────────────────┐
//! │ LifecycleManager │
//! └────────┬─────────┘
//!          ▼
//!   ┌──────────────┐
//!   │ComposeBackend│ (trait)
//!   └──────────────┘
//!        │     │
//!        ▼     ▼
//!  ┌──────────┐ ┌────┐
//!  │ComposeCli│ │Mock│
//!  └────┬─────┘ └────┘
//!       ▼
//!  docker compose + Docker daemon (bollard ping)
//! ```

use std::future::Future;
use std::path::Path;
use std::process::{Output, Stdio};

use crate::composition::Composition;
use crate::error::ComposeError;

/// 컴포지션 기동/로그 수집/해체 동작
///
/// `Send + Sync + 'static`이므로 `Arc`로 공유할 수 있습니다.
pub trait ComposeBackend: Send + Sync + 'static {
    /// 오케스트레이터 데몬 연결을 확인합니다.
    ///
    /// # Errors
    ///
    /// 데몬에 연결할 수 없으면 `ComposeError::DaemonConnection`을 반환합니다.
    fn ping(&self) -> impl Future<Output = Result<(), ComposeError>> + Send;

    /// 컴포지션의 모든 서비스를 백그라운드로 기동합니다.
    fn up(
        &self,
        composition: &Composition,
    ) -> impl Future<Output = Result<(), ComposeError>> + Send;

    /// 컴포지션의 로그를 `log_path`에 기록합니다.
    fn logs(
        &self,
        composition: &Composition,
        log_path: &Path,
    ) -> impl Future<Output = Result<(), ComposeError>> + Send;

    /// 컴포지션을 정지하고 제거합니다.
    fn down(
        &self,
        composition: &Composition,
    ) -> impl Future<Output = Result<(), ComposeError>> + Send;
}

/// `docker compose` CLI 기반 운영 구현
///
/// 모든 명령은 컴포지션의 작업 디렉토리에서
/// `docker compose -p <project> -f <file> ...` 형태로 실행됩니다.
/// 데몬 연결 확인은 `bollard`로 수행합니다.
pub struct DockerComposeCli {
    program: String,
    daemon_check: bool,
}

impl DockerComposeCli {
    /// 기본 `docker` 실행 파일을 사용합니다.
    pub fn new() -> Self {
        Self {
            program: "docker".to_owned(),
            daemon_check: true,
        }
    }

    /// 다른 실행 파일을 사용합니다 (예: `podman`).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// 기동 전 데몬 연결 확인을 건너뜁니다.
    pub fn without_daemon_check(mut self) -> Self {
        self.daemon_check = false;
        self
    }

    async fn compose(
        &self,
        composition: &Composition,
        args: &[&str],
    ) -> Result<Output, ComposeError> {
        let command = format!(
            "{} compose -p {} -f {} {}",
            self.program,
            composition.project_name(),
            composition.definition_file(),
            args.join(" ")
        );
        tracing::debug!(
            command = %command,
            dir = %composition.working_dir().display(),
            "running compose command"
        );

        let output = tokio::process::Command::new(&self.program)
            .arg("compose")
            .arg("-p")
            .arg(composition.project_name())
            .arg("-f")
            .arg(composition.definition_file())
            .args(args)
            .current_dir(composition.working_dir())
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ComposeError::Spawn {
                command: command.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(ComposeError::CommandFailed {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        Ok(output)
    }
}

impl Default for DockerComposeCli {
    fn default() -> Self {
        Self::new()
    }
}

impl ComposeBackend for DockerComposeCli {
    async fn ping(&self) -> Result<(), ComposeError> {
        if !self.daemon_check {
            return Ok(());
        }
        let docker = bollard::Docker::connect_with_local_defaults().map_err(|e| {
            ComposeError::DaemonConnection(format!("failed to connect to docker: {e}"))
        })?;
        docker
            .ping()
            .await
            .map_err(|e| ComposeError::DaemonConnection(format!("ping failed: {e}")))?;
        Ok(())
    }

    async fn up(&self, composition: &Composition) -> Result<(), ComposeError> {
        self.compose(composition, &["up", "-d", "--force-recreate"])
            .await?;
        Ok(())
    }

    async fn logs(&self, composition: &Composition, log_path: &Path) -> Result<(), ComposeError> {
        let output = self
            .compose(composition, &["logs", "--no-color", "--timestamps"])
            .await?;
        tokio::fs::write(log_path, &output.stdout)
            .await
            .map_err(|e| ComposeError::LogWrite {
                path: log_path.display().to_string(),
                reason: e.to_string(),
            })
    }

    async fn down(&self, composition: &Composition) -> Result<(), ComposeError> {
        self.compose(composition, &["down", "--remove-orphans"])
            .await?;
        Ok(())
    }
}

/// 테스트용 Mock 백엔드
///
/// 호출을 순서대로 기록하고, 지정한 정의 디렉토리에서 실패를 흉내냅니다.
#[cfg(test)]
#[derive(Default)]
pub struct MockComposeBackend {
    /// `"<op>:<definition dir>"` 형식의 호출 기록
    pub calls: std::sync::Mutex<Vec<String>>,
    /// ping 실패 여부
    pub unreachable: bool,
    /// up이 실패할 정의 디렉토리 이름
    pub fail_up: Option<String>,
    /// logs가 실패할 정의 디렉토리 이름
    pub fail_logs: Option<String>,
    /// down이 실패할 정의 디렉토리 이름
    pub fail_down: Option<String>,
}

#[cfg(test)]
impl MockComposeBackend {
    /// 모든 호출이 성공하는 mock을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 기록된 호출 목록
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, op: &str, composition: &Composition) -> String {
        let label = composition
            .definition_dir()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.calls.lock().unwrap().push(format!("{op}:{label}"));
        label
    }

    fn failure(label: &str) -> ComposeError {
        ComposeError::CommandFailed {
            command: format!("mock {label}"),
            status: "exit status: 1".to_owned(),
            stderr: "mock failure".to_owned(),
        }
    }
}

#[cfg(test)]
impl ComposeBackend for MockComposeBackend {
    async fn ping(&self) -> Result<(), ComposeError> {
        if self.unreachable {
            return Err(ComposeError::DaemonConnection("mock daemon down".to_owned()));
        }
        Ok(())
    }

    async fn up(&self, composition: &Composition) -> Result<(), ComposeError> {
        let label = self.record("up", composition);
        if self.fail_up.as_deref() == Some(label.as_str()) {
            return Err(Self::failure(&label));
        }
        Ok(())
    }

    async fn logs(&self, composition: &Composition, log_path: &Path) -> Result<(), ComposeError> {
        let label = self.record("logs", composition);
        if self.fail_logs.as_deref() == Some(label.as_str()) {
            return Err(Self::failure(&label));
        }
        tokio::fs::write(log_path, b"mock logs\n")
            .await
            .map_err(|e| ComposeError::LogWrite {
                path: log_path.display().to_string(),
                reason: e.to_string(),
            })
    }

    async fn down(&self, composition: &Composition) -> Result<(), ComposeError> {
        let label = self.record("down", composition);
        if self.fail_down.as_deref() == Some(label.as_str()) {
            return Err(Self::failure(&label));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::CompositionDefinition;

    fn composition_in(dir: &Path) -> Composition {
        std::fs::write(dir.join("docker-compose.yml"), "services: {}\n").unwrap();
        Composition::new("proj1", CompositionDefinition::new(dir, "docker-compose.yml")).unwrap()
    }

    #[tokio::test]
    async fn mock_records_calls_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let composition = composition_in(dir.path());
        let backend = MockComposeBackend::new();

        backend.up(&composition).await.unwrap();
        backend
            .logs(&composition, &composition.log_path())
            .await
            .unwrap();
        backend.down(&composition).await.unwrap();

        let label = dir.path().file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(
            backend.calls(),
            vec![
                format!("up:{label}"),
                format!("logs:{label}"),
                format!("down:{label}")
            ]
        );
        assert!(composition.log_path().exists());
    }

    #[tokio::test]
    async fn mock_unreachable_ping_fails() {
        let backend = MockComposeBackend {
            unreachable: true,
            ..Default::default()
        };
        assert!(matches!(
            backend.ping().await.unwrap_err(),
            ComposeError::DaemonConnection(_)
        ));
    }

    #[tokio::test]
    async fn cli_without_daemon_check_pings_ok() {
        let cli = DockerComposeCli::new().without_daemon_check();
        cli.ping().await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn cli_nonzero_exit_is_command_failed() {
        let dir = tempfile::tempdir().unwrap();
        let composition = composition_in(dir.path());
        let cli = DockerComposeCli::new().with_program("false");

        let err = cli.up(&composition).await.unwrap_err();
        match err {
            ComposeError::CommandFailed { command, .. } => {
                assert!(command.starts_with("false compose -p proj1 -f docker-compose.yml up -d"));
            }
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn cli_missing_program_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let composition = composition_in(dir.path());
        let cli = DockerComposeCli::new().with_program("stagehand-no-such-binary-xyz");

        let err = cli.down(&composition).await.unwrap_err();
        assert!(matches!(err, ComposeError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn cli_logs_writes_command_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let composition = composition_in(dir.path());
        // echo는 인자를 그대로 출력하므로 로그 파일 내용으로 명령 형태를 확인할 수 있습니다
        let cli = DockerComposeCli::new().with_program("echo");

        cli.logs(&composition, &composition.log_path()).await.unwrap();

        let content = std::fs::read_to_string(composition.log_path()).unwrap();
        assert_eq!(
            content.trim(),
            "compose -p proj1 -f docker-compose.yml logs --no-color --timestamps"
        );
    }
}
