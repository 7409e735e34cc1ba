//! 컨텍스트 인자 스텝

use cucumber::step;
use futures::FutureExt as _;
use futures::future::LocalBoxFuture;

use super::capture;
use crate::registry::{StepRegistrar, StepRegistry};
use crate::world::HarnessWorld;

/// 공유 컨텍스트의 인자를 직접 다루는 스텝 묶음
#[derive(Debug, Default, Clone, Copy)]
pub struct ContextArgsSteps;

impl StepRegistrar for ContextArgsSteps {
    fn name(&self) -> &'static str {
        "context-args"
    }

    fn register_steps(&self, steps: &mut StepRegistry) {
        steps
            .given(r#"^the context argument "([^"]*)" is "([^"]*)"$"#, set_arg)
            .when(
                r#"^the context argument "([^"]*)" is copied to "([^"]*)"$"#,
                copy_arg,
            )
            .when(r#"^the context argument "([^"]*)" is removed$"#, remove_arg)
            .then(
                r#"^the context argument "([^"]*)" equals "([^"]*)"$"#,
                assert_arg_equals,
            )
            .then(r#"^the context argument "([^"]*)" is set$"#, assert_arg_set);
    }
}

fn set_arg(world: &mut HarnessWorld, ctx: step::Context) -> LocalBoxFuture<'_, ()> {
    async move {
        world.context().set_arg(capture(&ctx, 1), capture(&ctx, 2));
    }
    .boxed_local()
}

fn copy_arg(world: &mut HarnessWorld, ctx: step::Context) -> LocalBoxFuture<'_, ()> {
    async move {
        let from = capture(&ctx, 1);
        let value = match world.context().require_arg(&from) {
            Ok(value) => value,
            Err(e) => panic!("{e}"),
        };
        world.context().set_arg(capture(&ctx, 2), value);
    }
    .boxed_local()
}

fn remove_arg(world: &mut HarnessWorld, ctx: step::Context) -> LocalBoxFuture<'_, ()> {
    async move {
        world.context().remove_arg(&capture(&ctx, 1));
    }
    .boxed_local()
}

fn assert_arg_equals(world: &mut HarnessWorld, ctx: step::Context) -> LocalBoxFuture<'_, ()> {
    async move {
        let key = capture(&ctx, 1);
        let expected = capture(&ctx, 2);
        let actual = world.context().arg(&key);
        assert_eq!(
            actual.as_deref(),
            Some(expected.as_str()),
            "context argument '{key}'"
        );
    }
    .boxed_local()
}

fn assert_arg_set(world: &mut HarnessWorld, ctx: step::Context) -> LocalBoxFuture<'_, ()> {
    async move {
        let key = capture(&ctx, 1);
        assert!(
            world.context().has_arg(&key),
            "context argument '{key}' is not set"
        );
    }
    .boxed_local()
}
