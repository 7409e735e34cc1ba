//! 시나리오 월드
//!
//! `cucumber`는 시나리오마다 새 월드를 만들지만, 하네스의 모든 상태는 실행당 하나뿐인
//! [`SharedContext`]에 있습니다. 월드는 그 컨텍스트에 대한 핸들만 가지며,
//! 엔진의 `before` 훅이 시나리오 시작 전에 핸들을 붙입니다.

use std::sync::Arc;

use stagehand_core::SharedContext;

/// 시나리오마다 생성되는 월드
#[derive(Debug, Default, cucumber::World)]
pub struct HarnessWorld {
    context: Option<Arc<SharedContext>>,
}

impl HarnessWorld {
    /// 공유 컨텍스트를 붙입니다.
    pub fn attach(&mut self, context: Arc<SharedContext>) {
        self.context = Some(context);
    }

    /// 공유 컨텍스트가 붙어 있는지 확인합니다.
    pub fn is_attached(&self) -> bool {
        self.context.is_some()
    }

    /// 공유 컨텍스트
    ///
    /// # Panics
    ///
    /// 컨텍스트가 붙지 않은 월드에서 호출하면 패닉합니다.
    /// 스텝 안에서의 패닉은 해당 스텝의 실패로 기록됩니다.
    pub fn context(&self) -> &SharedContext {
        match &self.context {
            Some(context) => context,
            None => panic!("shared context is not attached to this world"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagehand_core::ContextConfig;

    #[test]
    fn default_world_is_detached() {
        assert!(!HarnessWorld::default().is_attached());
    }

    #[test]
    fn worlds_share_one_context() {
        let ctx = Arc::new(SharedContext::new(&ContextConfig::default()).unwrap());
        let mut first = HarnessWorld::default();
        first.attach(Arc::clone(&ctx));
        let mut second = HarnessWorld::default();
        second.attach(Arc::clone(&ctx));

        first.context().set_arg("written_by", "first");
        assert_eq!(
            second.context().arg("written_by").as_deref(),
            Some("first")
        );
    }

    #[test]
    #[should_panic(expected = "not attached")]
    fn detached_context_access_panics() {
        let world = HarnessWorld::default();
        let _ = world.context();
    }
}
