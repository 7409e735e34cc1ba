//! Fatal harness errors.
//!
//! Infrastructure failures (bring-up, log collection, decompose, context
//! construction, logging setup, invalid tag filter) are not retried. They
//! are logged once and the process exits with [`FATAL_EXIT_CODE`].

use std::fmt;

/// Exit code for infrastructure-fatal errors.
pub const FATAL_EXIT_CODE: i32 = 2;

/// Harness stage in which a fatal error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalStage {
    /// Configuration loading, validation or tag filter compilation.
    Configuration,
    /// Tracing subscriber setup.
    Logging,
    /// Composition bring-up.
    BringUp,
    /// Shared context construction.
    Context,
    /// Step registration or engine setup.
    Scenarios,
    /// Log collection or decompose.
    Teardown,
}

impl fmt::Display for FatalStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "configuration"),
            Self::Logging => write!(f, "logging"),
            Self::BringUp => write!(f, "bring-up"),
            Self::Context => write!(f, "context"),
            Self::Scenarios => write!(f, "scenarios"),
            Self::Teardown => write!(f, "teardown"),
        }
    }
}

/// An error that terminates the run.
#[derive(Debug, thiserror::Error)]
#[error("{stage} failed: {cause:#}")]
pub struct FatalError {
    stage: FatalStage,
    cause: anyhow::Error,
}

impl FatalError {
    /// Wrap `cause` as a fatal error of `stage`.
    pub fn new(stage: FatalStage, cause: impl Into<anyhow::Error>) -> Self {
        Self {
            stage,
            cause: cause.into(),
        }
    }

    /// Stage in which the error occurred.
    pub fn stage(&self) -> FatalStage {
        self.stage
    }

    /// Log the error and terminate the process immediately.
    pub fn abort(&self) -> ! {
        tracing::error!(
            stage = %self.stage,
            error = %format!("{:#}", self.cause),
            "fatal harness error, aborting"
        );
        eprintln!("stagehand: {self}");
        std::process::exit(FATAL_EXIT_CODE)
    }
}
