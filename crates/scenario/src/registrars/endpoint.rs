//! 서비스 엔드포인트 스텝
//!
//! 응답 상태와 본문은 컨텍스트 인자 [`LAST_STATUS`], [`LAST_BODY`]에 기록되어
//! 이후 다른 등록기의 스텝에서도 읽을 수 있습니다.

use cucumber::step;
use futures::FutureExt as _;
use futures::future::LocalBoxFuture;

use super::capture;
use crate::registry::{StepRegistrar, StepRegistry};
use crate::world::HarnessWorld;

/// 마지막 응답 상태 코드 인자 이름
pub const LAST_STATUS: &str = "last_status";
/// 마지막 응답 본문 인자 이름
pub const LAST_BODY: &str = "last_body";

/// 공유 HTTP 클라이언트로 엔드포인트를 호출하는 스텝 묶음
#[derive(Debug, Default, Clone, Copy)]
pub struct EndpointSteps;

impl StepRegistrar for EndpointSteps {
    fn name(&self) -> &'static str {
        "endpoint"
    }

    fn register_steps(&self, steps: &mut StepRegistry) {
        steps
            .when(
                r#"^a GET request is sent to the URL in "([^"]*)"$"#,
                get_url,
            )
            .then(r"^the response status is (\d{3})$", assert_status)
            .then(
                r#"^the response body contains "([^"]*)"$"#,
                assert_body_contains,
            );
    }
}

fn get_url(world: &mut HarnessWorld, ctx: step::Context) -> LocalBoxFuture<'_, ()> {
    async move {
        let key = capture(&ctx, 1);
        let context = world.context();
        let url = match context.require_arg(&key) {
            Ok(url) => url,
            Err(e) => panic!("{e}"),
        };

        let response = match context.http().get(&url).send().await {
            Ok(response) => response,
            Err(e) => panic!("GET {url} failed: {e}"),
        };
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        tracing::debug!(url = %url, status, "endpoint responded");
        context.set_arg(LAST_STATUS, status.to_string());
        context.set_arg(LAST_BODY, body);
    }
    .boxed_local()
}

fn assert_status(world: &mut HarnessWorld, ctx: step::Context) -> LocalBoxFuture<'_, ()> {
    async move {
        let expected = capture(&ctx, 1);
        let actual = world.context().arg(LAST_STATUS);
        assert_eq!(
            actual.as_deref(),
            Some(expected.as_str()),
            "unexpected response status"
        );
    }
    .boxed_local()
}

fn assert_body_contains(world: &mut HarnessWorld, ctx: step::Context) -> LocalBoxFuture<'_, ()> {
    async move {
        let needle = capture(&ctx, 1);
        let body = world.context().arg(LAST_BODY).unwrap_or_default();
        assert!(
            body.contains(&needle),
            "response body does not contain '{needle}'"
        );
    }
    .boxed_local()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_pattern_accepts_three_digits_only() {
        let mut registry = StepRegistry::new();
        registry.register(&EndpointSteps);
        let bindings = registry.into_bindings().unwrap();

        let status = bindings
            .iter()
            .find(|b| b.pattern.as_str().contains("status"))
            .unwrap();
        assert!(status.pattern.is_match("the response status is 200"));
        assert!(!status.pattern.is_match("the response status is 20"));
    }
}
