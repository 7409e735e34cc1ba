//! Stagehand runner library.
//!
//! This library exposes internal modules for integration testing.
//! In production, `stagehand` is used as a binary (main.rs).

pub mod cli;
pub mod fatal;
pub mod harness;
pub mod logging;
