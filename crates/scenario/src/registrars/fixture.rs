//! 픽스처 문서 스텝
//!
//! 픽스처 경로는 컨텍스트 인자로 전달됩니다 (기본 시드: `did_doc_path`).

use cucumber::step;
use futures::FutureExt as _;
use futures::future::LocalBoxFuture;

use super::capture;
use crate::registry::{StepRegistrar, StepRegistry};
use crate::world::HarnessWorld;

/// 픽스처 파일을 읽어 컨텍스트에 저장하는 스텝 묶음
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSteps;

impl StepRegistrar for FixtureSteps {
    fn name(&self) -> &'static str {
        "fixture"
    }

    fn register_steps(&self, steps: &mut StepRegistry) {
        steps
            .given(
                r#"^the fixture named by "([^"]*)" is loaded into "([^"]*)"$"#,
                load_fixture,
            )
            .then(
                r#"^the document in "([^"]*)" has the field "([^"]*)"$"#,
                assert_document_field,
            );
    }
}

fn load_fixture(world: &mut HarnessWorld, ctx: step::Context) -> LocalBoxFuture<'_, ()> {
    async move {
        let path_arg = capture(&ctx, 1);
        let target = capture(&ctx, 2);

        let path = match world.context().require_arg(&path_arg) {
            Ok(path) => path,
            Err(e) => panic!("{e}"),
        };
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) => panic!("failed to read fixture {path}: {e}"),
        };
        if let Err(e) = serde_json::from_str::<serde_json::Value>(&content) {
            panic!("fixture {path} is not valid JSON: {e}");
        }

        tracing::debug!(fixture = %path, arg = %target, "fixture loaded");
        world.context().set_arg(target, content);
    }
    .boxed_local()
}

fn assert_document_field(world: &mut HarnessWorld, ctx: step::Context) -> LocalBoxFuture<'_, ()> {
    async move {
        let key = capture(&ctx, 1);
        let field = capture(&ctx, 2);

        let content = match world.context().require_arg(&key) {
            Ok(content) => content,
            Err(e) => panic!("{e}"),
        };
        let document: serde_json::Value = match serde_json::from_str(&content) {
            Ok(document) => document,
            Err(e) => panic!("argument '{key}' is not valid JSON: {e}"),
        };
        assert!(
            has_field(&document, &field),
            "document in '{key}' has no field '{field}'"
        );
    }
    .boxed_local()
}

/// `/`로 시작하면 JSON Pointer, 아니면 최상위 키로 찾습니다.
fn has_field(document: &serde_json::Value, field: &str) -> bool {
    if field.starts_with('/') {
        document.pointer(field).is_some()
    } else {
        document.get(field).is_some()
    }
}
