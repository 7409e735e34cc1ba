//! 스텝 등록 프로토콜
//!
//! 각 [`StepRegistrar`]는 하나의 기능 영역에 속한 스텝 묶음을 소유하고,
//! [`StepRegistry`]에 (종류, 패턴, 핸들러) 바인딩을 추가합니다.
//! 핸들러는 [`HarnessWorld`]를 통해 실행당 하나뿐인 공유 컨텍스트를 읽고 씁니다.
//!
//! 같은 종류와 패턴이 두 번 등록되면 나중 바인딩이 앞의 것을 대체합니다.
//! 이는 관례로 피해야 하며, 발생하면 경고 로그를 남깁니다.

use std::fmt;

use regex::Regex;
use stagehand_core::error::ScenarioError;
use tracing::{debug, warn};

use crate::world::HarnessWorld;

/// 스텝 핸들러 (`cucumber`의 런타임 스텝 함수)
pub type StepFn = cucumber::step::Step<HarnessWorld>;

/// 스텝 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// 전제 조건
    Given,
    /// 동작
    When,
    /// 검증
    Then,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Given => write!(f, "given"),
            Self::When => write!(f, "when"),
            Self::Then => write!(f, "then"),
        }
    }
}

/// 스텝 묶음을 엔진에 바인딩하는 모듈
pub trait StepRegistrar: Send + Sync {
    /// 등록기 이름 (로그용)
    fn name(&self) -> &'static str;

    /// 스텝 패턴과 핸들러를 등록합니다.
    fn register_steps(&self, steps: &mut StepRegistry);
}

/// 하나의 스텝 바인딩
#[derive(Clone)]
pub struct StepBinding {
    /// 스텝 종류
    pub kind: StepKind,
    /// 컴파일된 패턴
    pub pattern: Regex,
    /// 핸들러
    pub handler: StepFn,
    /// 바인딩을 등록한 등록기 이름
    pub registrar: &'static str,
}

impl fmt::Debug for StepBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepBinding")
            .field("kind", &self.kind)
            .field("pattern", &self.pattern.as_str())
            .field("registrar", &self.registrar)
            .finish_non_exhaustive()
    }
}

/// 등록 순서를 보존하는 스텝 바인딩 모음
#[derive(Debug, Default)]
pub struct StepRegistry {
    bindings: Vec<StepBinding>,
    errors: Vec<ScenarioError>,
    current: &'static str,
}

impl StepRegistry {
    /// 빈 레지스트리를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 등록기의 모든 스텝을 바인딩합니다.
    pub fn register(&mut self, registrar: &dyn StepRegistrar) {
        let before = self.bindings.len();
        self.current = registrar.name();
        registrar.register_steps(self);
        self.current = "";
        debug!(
            registrar = registrar.name(),
            added = self.bindings.len().saturating_sub(before),
            "step registrar bound"
        );
    }

    /// `Given` 스텝을 등록합니다.
    pub fn given(&mut self, pattern: &str, handler: StepFn) -> &mut Self {
        self.bind(StepKind::Given, pattern, handler)
    }

    /// `When` 스텝을 등록합니다.
    pub fn when(&mut self, pattern: &str, handler: StepFn) -> &mut Self {
        self.bind(StepKind::When, pattern, handler)
    }

    /// `Then` 스텝을 등록합니다.
    pub fn then(&mut self, pattern: &str, handler: StepFn) -> &mut Self {
        self.bind(StepKind::Then, pattern, handler)
    }

    /// 스텝을 등록합니다. 같은 종류와 패턴의 기존 바인딩은 대체됩니다.
    pub fn bind(&mut self, kind: StepKind, pattern: &str, handler: StepFn) -> &mut Self {
        let regex = match Regex::new(pattern) {
            Ok(regex) => regex,
            Err(e) => {
                self.errors.push(ScenarioError::StepPattern {
                    pattern: pattern.to_owned(),
                    reason: e.to_string(),
                });
                return self;
            }
        };

        let binding = StepBinding {
            kind,
            pattern: regex,
            handler,
            registrar: self.current,
        };

        if let Some(existing) = self
            .bindings
            .iter_mut()
            .find(|b| b.kind == kind && b.pattern.as_str() == pattern)
        {
            warn!(
                kind = %kind,
                pattern,
                previous = existing.registrar,
                registrar = self.current,
                "step pattern bound twice, later binding wins"
            );
            *existing = binding;
        } else {
            self.bindings.push(binding);
        }
        self
    }

    /// 등록된 바인딩 수
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// 등록 순서대로 바인딩을 반환합니다.
    pub fn bindings(&self) -> &[StepBinding] {
        &self.bindings
    }

    /// 패턴 컴파일 에러를 확인하고 바인딩 목록을 꺼냅니다.
    ///
    /// # Errors
    ///
    /// 컴파일에 실패한 패턴이 있으면 첫 번째 `ScenarioError::StepPattern`을 반환합니다.
    pub fn into_bindings(self) -> Result<Vec<StepBinding>, ScenarioError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(self.bindings),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cucumber::step;
    use futures::FutureExt as _;
    use futures::future::LocalBoxFuture;

    fn noop(_world: &mut HarnessWorld, _ctx: step::Context) -> LocalBoxFuture<'_, ()> {
        async {}.boxed_local()
    }

    fn other(_world: &mut HarnessWorld, _ctx: step::Context) -> LocalBoxFuture<'_, ()> {
        async {}.boxed_local()
    }

    struct First;
    impl StepRegistrar for First {
        fn name(&self) -> &'static str {
            "first"
        }
        fn register_steps(&self, steps: &mut StepRegistry) {
            steps.given("^a thing$", noop).then("^it holds$", noop);
        }
    }

    struct Second;
    impl StepRegistrar for Second {
        fn name(&self) -> &'static str {
            "second"
        }
        fn register_steps(&self, steps: &mut StepRegistry) {
            steps.given("^a thing$", other).when("^it moves$", other);
        }
    }

    #[test]
    fn register_records_registrar_name() {
        let mut registry = StepRegistry::new();
        registry.register(&First);

        assert_eq!(registry.len(), 2);
        assert!(registry.bindings().iter().all(|b| b.registrar == "first"));
    }

    #[test]
    fn identical_pattern_is_overwritten_by_later_binding() {
        let mut registry = StepRegistry::new();
        registry.register(&First);
        registry.register(&Second);

        assert_eq!(registry.len(), 3);
        let thing = &registry.bindings()[0];
        assert_eq!(thing.pattern.as_str(), "^a thing$");
        assert_eq!(thing.registrar, "second");
    }

    #[test]
    fn same_pattern_different_kind_is_kept() {
        let mut registry = StepRegistry::new();
        registry.given("^x$", noop).then("^x$", noop);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let mut registry = StepRegistry::new();
        registry.when("^unclosed ($", noop);

        let err = registry.into_bindings().unwrap_err();
        assert!(matches!(err, ScenarioError::StepPattern { ref pattern, .. } if pattern == "^unclosed ($"));
    }

    #[test]
    fn step_kind_display() {
        assert_eq!(StepKind::Given.to_string(), "given");
        assert_eq!(StepKind::When.to_string(), "when");
        assert_eq!(StepKind::Then.to_string(), "then");
    }
}
