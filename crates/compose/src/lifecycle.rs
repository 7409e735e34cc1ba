//! 컴포지션 생명주기 관리
//!
//! [`LifecycleManager`]는 정의 목록을 순서대로 기동하고, 고정된 시간만큼 대기한 뒤,
//! 시나리오 단계가 끝나면 같은 순서로 로그를 수집하고 해체합니다.
//!
//! # 순서 보장
//! - 기동은 정의 순서대로 하나씩 수행하며, 성공한 컴포지션만 목록에 추가됩니다.
//! - 해체는 목록 순서(= 기동 순서)대로 수행합니다.
//! - 첫 기동 실패는 즉시 반환되며, 이미 기동된 컴포지션은 되돌리지 않습니다.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use stagehand_core::config::TeardownPolicy;
use tracing::{debug, error, info, warn};

use crate::backend::ComposeBackend;
use crate::composition::{Composition, CompositionDefinition, generate_project_name};
use crate::error::ComposeError;

/// 기본 대기 시간 (초)
const DEFAULT_SETTLE_SECS: u64 = 5;

/// 기동 순서대로 쌓이는 컴포지션 목록
#[derive(Debug, Default)]
pub struct CompositionList {
    compositions: Vec<Composition>,
}

impl CompositionList {
    /// 빈 목록 (오케스트레이션 비활성 시 사용)
    pub fn empty() -> Self {
        Self::default()
    }

    /// 기동에 성공한 컴포지션을 추가합니다.
    fn push(&mut self, composition: Composition) {
        self.compositions.push(composition);
    }

    /// 컴포지션 수
    pub fn len(&self) -> usize {
        self.compositions.len()
    }

    /// 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.compositions.is_empty()
    }

    /// 기동 순서대로 순회합니다.
    pub fn iter(&self) -> std::slice::Iter<'_, Composition> {
        self.compositions.iter()
    }

    /// 모든 컴포지션이 공유하는 프로젝트 이름
    pub fn project_name(&self) -> Option<&str> {
        self.compositions.first().map(Composition::project_name)
    }
}

impl<'a> IntoIterator for &'a CompositionList {
    type Item = &'a Composition;
    type IntoIter = std::slice::Iter<'a, Composition>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// 해체 결과
#[derive(Debug, Default)]
pub struct TeardownReport {
    /// 로그 수집과 해체를 모두 마친 컴포지션 수
    pub processed: usize,
    /// 기록된 로그 파일 경로 (해체 순서)
    pub log_files: Vec<PathBuf>,
}

/// 컴포지션 기동/대기/해체 관리자
pub struct LifecycleManager<B: ComposeBackend> {
    backend: Arc<B>,
    settle: Duration,
    policy: TeardownPolicy,
}

impl<B: ComposeBackend> LifecycleManager<B> {
    /// 기본 대기 시간(5초)과 중단 정책으로 관리자를 생성합니다.
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            settle: Duration::from_secs(DEFAULT_SETTLE_SECS),
            policy: TeardownPolicy::default(),
        }
    }

    /// 기동 후 대기 시간을 설정합니다.
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// 해체 에러 정책을 설정합니다.
    pub fn with_teardown_policy(mut self, policy: TeardownPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// 설정된 대기 시간
    pub fn settle_duration(&self) -> Duration {
        self.settle
    }

    /// 설정된 해체 정책
    pub fn teardown_policy(&self) -> TeardownPolicy {
        self.policy
    }

    /// 새 프로젝트 이름으로 모든 정의를 순서대로 기동합니다.
    ///
    /// # Errors
    ///
    /// 데몬 연결 실패 또는 첫 번째 기동 실패를 `ComposeError::BringUp`으로 반환합니다.
    pub async fn bring_up(
        &self,
        definitions: &[CompositionDefinition],
    ) -> Result<CompositionList, ComposeError> {
        self.bring_up_with_project(&generate_project_name(), definitions)
            .await
    }

    /// 주어진 프로젝트 이름으로 모든 정의를 순서대로 기동합니다.
    pub async fn bring_up_with_project(
        &self,
        project_name: &str,
        definitions: &[CompositionDefinition],
    ) -> Result<CompositionList, ComposeError> {
        let mut list = CompositionList::empty();
        if definitions.is_empty() {
            return Ok(list);
        }

        self.backend.ping().await.map_err(|e| ComposeError::BringUp {
            definition: "*".to_owned(),
            source: Box::new(e),
        })?;

        info!(
            project = project_name,
            count = definitions.len(),
            "bringing up compositions"
        );

        for definition in definitions {
            let label = definition.dir.display().to_string();
            let composition =
                Composition::new(project_name, definition.clone()).map_err(|e| {
                    ComposeError::BringUp {
                        definition: label.clone(),
                        source: Box::new(e),
                    }
                })?;

            if let Err(e) = self.backend.up(&composition).await {
                error!(definition = %label, error = %e, "bring-up failed");
                return Err(ComposeError::BringUp {
                    definition: label,
                    source: Box::new(e),
                });
            }

            info!(
                definition = %label,
                working_dir = %composition.working_dir().display(),
                "composition started"
            );
            list.push(composition);
        }

        Ok(list)
    }

    /// 고정된 시간만큼 대기합니다. 준비 상태 확인은 하지 않습니다.
    pub async fn settle(&self) {
        if self.settle.is_zero() {
            debug!("settle skipped");
            return;
        }
        info!(secs = self.settle.as_secs(), "waiting for compositions to settle");
        tokio::time::sleep(self.settle).await;
    }

    /// 모든 컴포지션의 로그를 수집하고 기동 순서대로 해체합니다.
    ///
    /// # Errors
    ///
    /// - `AbortOnError`: 첫 에러를 즉시 반환하고 남은 컴포지션은 건드리지 않습니다.
    /// - `ContinueOnError`: 모든 컴포지션을 처리한 뒤 `ComposeError::Teardown`으로
    ///   수집된 에러를 모두 반환합니다.
    pub async fn tear_down(&self, list: CompositionList) -> Result<TeardownReport, ComposeError> {
        let mut report = TeardownReport::default();
        if list.is_empty() {
            debug!("no compositions to tear down");
            return Ok(report);
        }

        let mut failures = Vec::new();
        for composition in &list {
            match self.tear_down_one(composition).await {
                Ok(log_path) => {
                    report.processed += 1;
                    report.log_files.push(log_path);
                }
                Err(errors) => match self.policy {
                    TeardownPolicy::AbortOnError => {
                        return Err(errors.into_iter().next().unwrap_or_else(|| {
                            ComposeError::Teardown(Vec::new())
                        }));
                    }
                    TeardownPolicy::ContinueOnError => failures.extend(errors),
                },
            }
        }

        if failures.is_empty() {
            info!(processed = report.processed, "compositions torn down");
            Ok(report)
        } else {
            warn!(
                processed = report.processed,
                failed = failures.len(),
                "teardown finished with errors"
            );
            Err(ComposeError::Teardown(failures))
        }
    }

    /// 컴포지션 하나의 로그를 수집하고 해체합니다.
    ///
    /// 중단 정책에서는 로그 수집 실패 시 해체를 시도하지 않습니다.
    async fn tear_down_one(&self, composition: &Composition) -> Result<PathBuf, Vec<ComposeError>> {
        let label = composition.label();
        let log_path = composition.log_path();
        let mut errors = Vec::new();

        match self.backend.logs(composition, &log_path).await {
            Ok(()) => info!(definition = %label, log = %log_path.display(), "logs collected"),
            Err(e) => {
                error!(definition = %label, error = %e, "log collection failed");
                errors.push(ComposeError::LogCollection {
                    definition: label.clone(),
                    source: Box::new(e),
                });
                if self.policy == TeardownPolicy::AbortOnError {
                    return Err(errors);
                }
            }
        }

        match self.backend.down(composition).await {
            Ok(()) => info!(definition = %label, "composition decomposed"),
            Err(e) => {
                error!(definition = %label, error = %e, "decompose failed");
                errors.push(ComposeError::Decompose {
                    definition: label,
                    source: Box::new(e),
                });
            }
        }

        if errors.is_empty() {
            Ok(log_path)
        } else {
            Err(errors)
        }
    }
}
