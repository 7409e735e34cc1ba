//! 시나리오 엔진
//!
//! [`ScenarioEngine`]은 `cucumber`를 하네스 규칙에 맞게 구성합니다.
//!
//! - 시나리오는 한 번에 하나씩 실행 (`max_concurrent_scenarios(1)`)
//! - strict: 바인딩되지 않은 스텝은 실패 (`fail_on_skipped_with`)
//! - stop-on-failure: 첫 실패 이후 남은 시나리오를 실행하지 않음 (`fail_fast`)
//! - strict + stop-on-failure: 바인딩되지 않은 스텝도 러너 수준 실패로 처리
//!   (`after` 훅), 그 뒤의 시나리오는 실행되지 않음
//! - 명령줄은 하네스가 소유 (`with_default_cli`)
//! - 순서는 [`SeededParser`]가, 태그 선택은 `filter_run`이 담당
//!
//! 모든 시나리오의 월드는 `before` 훅에서 같은 [`SharedContext`]에 연결됩니다.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cucumber::gherkin::tagexpr::TagOperation;
use cucumber::tag::Ext as _;
use cucumber::writer::{self, Stats as _};
use cucumber::{Cucumber, WriterExt as _, cli, event, gherkin, runner};
use futures::FutureExt as _;
use futures::future;
use stagehand_core::SharedContext;
use stagehand_core::error::ScenarioError;
use stagehand_core::run::{OutputFormat, RunConfiguration, TagFilter};
use tracing::{info, warn};

use crate::order::SeededParser;
use crate::registry::{StepKind, StepRegistrar, StepRegistry};
use crate::world::HarnessWorld;

/// 시나리오 실행 결과 요약
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineReport {
    /// 통과한 스텝 수
    pub steps_passed: usize,
    /// 실패한 스텝 수 (strict 모드에서 바인딩되지 않은 스텝 포함)
    pub steps_failed: usize,
    /// 건너뛴 스텝 수
    pub steps_skipped: usize,
    /// feature 파싱 에러 수
    pub parsing_errors: usize,
    /// 훅 실패 수
    pub hook_errors: usize,
    /// 엔진이 실행 실패로 판정했는지 여부
    pub execution_failed: bool,
}

impl EngineReport {
    /// 시나리오 수준 상태 (실패 또는 strict 위반 시 1)
    pub fn scenario_status(&self) -> i32 {
        i32::from(self.steps_failed > 0 || self.steps_skipped > 0 || self.execution_failed)
    }

    /// 프로세스 수준 상태 (파싱/훅 에러 시 1)
    pub fn process_status(&self) -> i32 {
        i32::from(self.parsing_errors > 0 || self.hook_errors > 0)
    }

    /// 두 상태 중 더 나쁜 값
    pub fn exit_code(&self) -> i32 {
        self.scenario_status().max(self.process_status())
    }
}

/// strict 모드에서 바인딩되지 않은 스텝을 만난 시나리오의 실패 메시지
pub const UNMATCHED_STEP_MESSAGE: &str = "step doesn't match any function";

/// 태그 필터를 `cucumber` 태그 표현식으로 컴파일합니다.
///
/// [`TagFilter::All`]은 `None`(모든 시나리오)입니다.
///
/// # Errors
///
/// 표현식을 파싱할 수 없으면 `ScenarioError::TagExpression`을 반환합니다.
pub fn compile_tag_filter(filter: &TagFilter) -> Result<Option<TagOperation>, ScenarioError> {
    let Some(expression) = filter.normalized() else {
        return Ok(None);
    };
    expression
        .parse::<TagOperation>()
        .map(Some)
        .map_err(|e| ScenarioError::TagExpression {
            expression: filter.as_str().to_owned(),
            reason: e.to_string(),
        })
}

/// 하네스 규칙으로 구성된 시나리오 엔진
#[derive(Debug)]
pub struct ScenarioEngine {
    features_dir: PathBuf,
    registry: StepRegistry,
}

impl ScenarioEngine {
    /// feature 루트 디렉토리로 엔진을 생성합니다.
    pub fn new(features_dir: impl Into<PathBuf>) -> Self {
        Self {
            features_dir: features_dir.into(),
            registry: StepRegistry::new(),
        }
    }

    /// feature 루트 디렉토리
    pub fn features_dir(&self) -> &Path {
        &self.features_dir
    }

    /// 등록기의 스텝을 바인딩합니다.
    pub fn register(&mut self, registrar: &dyn StepRegistrar) -> &mut Self {
        self.registry.register(registrar);
        self
    }

    /// 바인딩된 스텝 수
    pub fn step_count(&self) -> usize {
        self.registry.len()
    }

    /// 실행 구성에 따라 시나리오를 실행합니다.
    ///
    /// feature 루트가 없으면 시나리오 0개로 성공 처리합니다.
    ///
    /// # Errors
    ///
    /// 태그 필터 또는 스텝 패턴이 유효하지 않으면 실행 전에 에러를 반환합니다.
    /// 시나리오 실패는 에러가 아니라 [`EngineReport`]에 기록됩니다.
    pub async fn run(
        self,
        run: &RunConfiguration,
        context: Arc<SharedContext>,
    ) -> Result<EngineReport, ScenarioError> {
        let tag_filter = compile_tag_filter(&run.tags)?;
        let bindings = self.registry.into_bindings()?;

        if !self.features_dir.exists() {
            warn!(
                dir = %self.features_dir.display(),
                "feature directory not found, no scenarios to run"
            );
            return Ok(EngineReport::default());
        }

        info!(
            seed = run.seed,
            tags = %run.tags,
            format = %run.format,
            steps = bindings.len(),
            "running scenarios"
        );

        let (coloring, verbosity) = match run.format {
            OutputFormat::Pretty => (
                writer::Coloring::Auto,
                writer::Verbosity::ShowWorldAndDocString,
            ),
            OutputFormat::Progress => (writer::Coloring::Never, writer::Verbosity::Default),
        };
        let strict = run.strict;
        let halt_on_unmatched = run.strict && run.stop_on_failure;

        let runner: runner::Basic<HarnessWorld> = runner::Basic::default();
        let mut cucumber = Cucumber::<_, _, _, _, _, cli::Empty>::custom(
            SeededParser::new(run.seed),
            runner,
            writer::Basic::new(io::stdout(), coloring, verbosity).summarized(),
        )
        .fail_on_skipped_with(
            move |_: &gherkin::Feature, _: Option<&gherkin::Rule>, _: &gherkin::Scenario| strict,
        )
        .max_concurrent_scenarios(1);

        if run.stop_on_failure {
            cucumber = cucumber.fail_fast();
        }

        for binding in bindings {
            cucumber = match binding.kind {
                StepKind::Given => cucumber.given(binding.pattern, binding.handler),
                StepKind::When => cucumber.when(binding.pattern, binding.handler),
                StepKind::Then => cucumber.then(binding.pattern, binding.handler),
            };
        }

        let writer = cucumber
            .before(move |_, _, _, world| {
                world.attach(Arc::clone(&context));
                future::ready(()).boxed_local()
            })
            .after(move |_, _, _, finished, _| {
                // 러너는 바인딩되지 않은 스텝을 Skipped로만 보므로 fail_fast가 멈추지 않음
                let unmatched = halt_on_unmatched
                    && matches!(finished, event::ScenarioFinished::StepSkipped);
                async move {
                    assert!(!unmatched, "{UNMATCHED_STEP_MESSAGE}");
                }
                .boxed_local()
            })
            .with_default_cli()
            .filter_run(
                self.features_dir,
                move |feature: &gherkin::Feature,
                      rule: Option<&gherkin::Rule>,
                      scenario: &gherkin::Scenario| {
                    tag_filter.as_ref().is_none_or(|op| {
                        op.eval(
                            feature
                                .tags
                                .iter()
                                .chain(rule.iter().flat_map(|r| &r.tags))
                                .chain(scenario.tags.iter()),
                        )
                    })
                },
            )
            .await;

        let report = EngineReport {
            steps_passed: writer.passed_steps(),
            steps_failed: writer.failed_steps(),
            steps_skipped: writer.skipped_steps(),
            parsing_errors: writer.parsing_errors(),
            hook_errors: writer.hook_errors(),
            execution_failed: writer.execution_has_failed(),
        };

        info!(
            passed = report.steps_passed,
            failed = report.steps_failed,
            skipped = report.steps_skipped,
            parsing_errors = report.parsing_errors,
            hook_errors = report.hook_errors,
            "scenario run finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use cucumber::tag::Ext as _;

    use super::*;

    #[test]
    fn all_compiles_to_no_filter() {
        assert!(compile_tag_filter(&TagFilter::All).unwrap().is_none());
    }

    #[test]
    fn bare_tags_compile() {
        let op = compile_tag_filter(&TagFilter::Expression("smoke and not slow".to_owned()))
            .unwrap()
            .unwrap();
        assert!(op.eval(["smoke"].iter()));
        assert!(!op.eval(["smoke", "slow"].iter()));
    }

    #[test]
    fn malformed_expression_is_error() {
        let err = compile_tag_filter(&TagFilter::Expression("@a and (".to_owned())).unwrap_err();
        assert!(matches!(err, ScenarioError::TagExpression { ref expression, .. } if expression == "@a and ("));
    }

    #[test]
    fn report_statuses() {
        let ok = EngineReport::default();
        assert_eq!(ok.exit_code(), 0);

        let failed = EngineReport {
            steps_failed: 1,
            execution_failed: true,
            ..Default::default()
        };
        assert_eq!(failed.scenario_status(), 1);
        assert_eq!(failed.process_status(), 0);
        assert_eq!(failed.exit_code(), 1);

        let parse = EngineReport {
            parsing_errors: 2,
            ..Default::default()
        };
        assert_eq!(parse.scenario_status(), 0);
        assert_eq!(parse.process_status(), 1);
        assert_eq!(parse.exit_code(), 1);
    }
}
