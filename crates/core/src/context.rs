//! 공유 컨텍스트 — 실행 범위의 가변 상태
//!
//! [`SharedContext`]는 실행당 정확히 하나만 만들어지며, `Arc`로 모든 스텝
//! 등록기에 전달됩니다. 한 등록기가 기록한 값은 같은 실행의 나머지 기간 동안
//! 다른 모든 등록기에서 보입니다. 시나리오 사이에 초기화되지 않습니다.
//!
//! # 상태 종류
//! - 인자: 이름 → 문자열 값 (엔드포인트 URL, 픽스처 경로, 호스트 이름, 응답 등)
//! - 타입별 확장 상태: 등록기가 자체 구조체를 붙여 둘 수 있는 슬롯
//! - 하위 리소스: 스텝에서 사용하는 HTTP 클라이언트

use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use crate::config::ContextConfig;
use crate::error::ContextError;

/// 서비스 엔드포인트 URL 인자 이름
pub const SIDETREE_URL: &str = "sidetree_url";
/// 픽스처 문서 경로 인자 이름
pub const DID_DOC_PATH: &str = "did_doc_path";
/// 첫 번째 에이전트 호스트 인자 이름
pub const ALICE_AGENT_HOST: &str = "alice_agent_host";
/// 두 번째 에이전트 호스트 인자 이름
pub const BOB_AGENT_HOST: &str = "bob_agent_host";

type StateMap = HashMap<TypeId, Box<dyn Any + Send + Sync>>;

/// 모든 스텝 등록기가 공유하는 실행 범위 컨텍스트
pub struct SharedContext {
    args: RwLock<HashMap<String, String>>,
    state: RwLock<StateMap>,
    http: reqwest::Client,
}

impl SharedContext {
    /// 컨텍스트를 생성합니다.
    ///
    /// 하위 리소스(HTTP 클라이언트)를 만들 수 없을 때만 실패하며,
    /// 호출자는 이 에러를 실행 전체의 치명 에러로 취급해야 합니다.
    pub fn new(config: &ContextConfig) -> Result<Self, ContextError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ContextError::HttpClient(e.to_string()))?;

        Ok(Self {
            args: RwLock::new(HashMap::new()),
            state: RwLock::new(HashMap::new()),
            http,
        })
    }

    /// 시나리오 실행 전에 정적/동적 기본 인자를 기록합니다.
    pub fn seed_defaults(&self, config: &ContextConfig) {
        self.set_arg(SIDETREE_URL, &config.sidetree_url);
        self.set_arg(DID_DOC_PATH, &config.did_doc_path);
        self.set_arg(ALICE_AGENT_HOST, &config.alice_agent_host);
        self.set_arg(BOB_AGENT_HOST, &config.bob_agent_host);
        for (key, value) in &config.args {
            self.set_arg(key, value);
        }
        tracing::debug!(args = self.arg_count(), "context defaults seeded");
    }

    /// 인자를 기록하고 이전 값을 반환합니다.
    pub fn set_arg(&self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.args
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into())
    }

    /// 인자 값을 조회합니다.
    pub fn arg(&self, key: &str) -> Option<String> {
        self.args
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// 인자 값을 조회하고, 없으면 에러를 반환합니다.
    pub fn require_arg(&self, key: &str) -> Result<String, ContextError> {
        self.arg(key)
            .ok_or_else(|| ContextError::MissingArg(key.to_owned()))
    }

    /// 인자가 존재하는지 확인합니다.
    pub fn has_arg(&self, key: &str) -> bool {
        self.args
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    /// 인자를 제거하고 값을 반환합니다.
    pub fn remove_arg(&self, key: &str) -> Option<String> {
        self.args
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }

    /// 기록된 인자 수
    pub fn arg_count(&self) -> usize {
        self.args.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// 현재 인자 전체의 정렬된 사본을 반환합니다.
    pub fn args_snapshot(&self) -> BTreeMap<String, String> {
        self.args
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// 타입별 확장 상태를 기록합니다. 같은 타입의 이전 값은 대체됩니다.
    pub fn insert_state<T: Any + Send + Sync>(&self, value: T) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(TypeId::of::<T>(), Box::new(value));
    }

    /// 확장 상태에 가변 접근합니다. 상태가 없으면 `None`입니다.
    pub fn with_state<T: Any + Send + Sync, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        guard
            .get_mut(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_mut::<T>())
            .map(f)
    }

    /// 확장 상태를 꺼내 소유권을 가져옵니다.
    pub fn take_state<T: Any + Send + Sync>(&self) -> Option<T> {
        let boxed = self
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&TypeId::of::<T>())?;
        boxed.downcast::<T>().ok().map(|b| *b)
    }

    /// 스텝에서 사용하는 HTTP 클라이언트
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

impl fmt::Debug for SharedContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state_slots = self.state.read().unwrap_or_else(PoisonError::into_inner).len();
        f.debug_struct("SharedContext")
            .field("args", &self.args_snapshot())
            .field("state_slots", &state_slots)
            .finish_non_exhaustive()
    }
}
