//! Stagehand 시나리오 크레이트
//!
//! # Module Structure
//!
//! - [`world`]: 시나리오마다 생성되는 `HarnessWorld` (공유 컨텍스트 핸들만 보유)
//! - [`registry`]: 스텝 등록 프로토콜 (`StepRegistrar` trait, `StepRegistry`)
//! - [`registrars`]: 하네스 수준 스텝 묶음 (컨텍스트 인자, 픽스처, 엔드포인트)
//! - [`order`]: 시드 기반 시나리오 순서 (`SeededParser`)
//! - [`engine`]: `cucumber` 기반 시나리오 실행 (`ScenarioEngine`, `EngineReport`)
//!
//! # Architecture
//!
//! ```text
//! StepRegistrar* --register_steps()--> StepRegistry
//!                                          |
//! features/ --SeededParser--> ScenarioEngine.run() --> EngineReport
//!                                          |
//!                       before hook: HarnessWorld.attach(Arc<SharedContext>)
//! ```

pub mod engine;
pub mod order;
pub mod registrars;
pub mod registry;
pub mod world;

// --- Public API Re-exports ---

pub use engine::{EngineReport, ScenarioEngine, compile_tag_filter};
pub use order::SeededParser;
pub use registrars::{ContextArgsSteps, EndpointSteps, FixtureSteps, default_registrars};
pub use registry::{StepKind, StepRegistrar, StepRegistry};
pub use world::HarnessWorld;
