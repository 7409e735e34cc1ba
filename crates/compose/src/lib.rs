//! Stagehand 컴포지션 크레이트
//!
//! # Module Structure
//!
//! - [`error`]: 도메인 에러 타입 (`ComposeError`)
//! - [`composition`]: 컴포지션 단위 (`Composition`, `CompositionDefinition`, 프로젝트 이름)
//! - [`backend`]: 오케스트레이터 추상화 (`ComposeBackend` trait, `DockerComposeCli`)
//! - [`lifecycle`]: 기동/대기/해체 순서 관리 (`LifecycleManager`, `CompositionList`)
//!
//! # Architecture
//!
//! ```text
//! definitions --> LifecycleManager.bring_up() --> CompositionList
//!                        |                            |
//!                  ComposeBackend.up()          (scenario phase)
//!                                                     |
//!                 LifecycleManager.tear_down() <------+
//!                        |
//!          ComposeBackend.logs() + ComposeBackend.down()
//! ```

pub mod backend;
pub mod composition;
pub mod error;
pub mod lifecycle;

// --- Public API Re-exports ---

pub use backend::{ComposeBackend, DockerComposeCli};
pub use composition::{Composition, CompositionDefinition, generate_project_name};
pub use error::ComposeError;
pub use lifecycle::{CompositionList, LifecycleManager, TeardownReport};
