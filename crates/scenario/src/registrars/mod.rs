//! 하네스 수준 스텝 등록기
//!
//! - [`ContextArgsSteps`]: 컨텍스트 인자 기록/복사/검증
//! - [`FixtureSteps`]: 인자로 지정된 픽스처 문서 로드 및 검증
//! - [`EndpointSteps`]: 인자에 저장된 URL로 HTTP 요청, 응답 상태 검증
//!
//! 세 등록기 모두 같은 공유 컨텍스트를 통해 값을 주고받으므로,
//! 예를 들어 `FixtureSteps`가 기록한 인자를 `ContextArgsSteps`가 검증할 수 있습니다.

mod args;
mod endpoint;
mod fixture;

pub use args::ContextArgsSteps;
pub use endpoint::{EndpointSteps, LAST_BODY, LAST_STATUS};
pub use fixture::FixtureSteps;

use cucumber::step;

use crate::registry::StepRegistrar;

/// 하네스에 기본으로 바인딩되는 등록기 목록 (바인딩 순서)
pub fn default_registrars() -> Vec<Box<dyn StepRegistrar>> {
    vec![
        Box::new(ContextArgsSteps),
        Box::new(FixtureSteps),
        Box::new(EndpointSteps),
    ]
}

/// 스텝 패턴의 `index`번째 캡처 그룹 (0은 전체 일치)
fn capture(ctx: &step::Context, index: usize) -> String {
    ctx.matches
        .get(index)
        .map(|(_, value)| value.clone())
        .unwrap_or_default()
}
