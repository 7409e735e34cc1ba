//! CLI argument definitions for the `stagehand` runner.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use stagehand_core::config::HarnessConfig;
use stagehand_core::run::RunInputs;

/// Stagehand integration-test harness.
///
/// Brings up the declared compositions, runs the tagged scenarios
/// against them with one shared context, and tears everything down
/// while keeping the service logs.
#[derive(Parser, Debug)]
#[command(name = "stagehand")]
#[command(version, about, long_about = None)]
pub struct RunnerCli {
    /// Step-by-step (pretty) output when the value is `true`.
    ///
    /// A bare `-v` means `true`.
    #[arg(
        short,
        long,
        value_name = "VALUE",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub verbose: Option<String>,

    /// Scenario selector: a tag expression such as `@didexchange and not @slow`.
    ///
    /// Empty or absent runs every scenario.
    #[arg(long, value_name = "TAG_EXPR")]
    pub run: Option<String>,

    /// Path to an optional stagehand.toml configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Pin the scenario order seed (defaults to the current time).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_format: Option<String>,

    /// Validate configuration, print the resolved run and exit.
    #[arg(long)]
    pub validate: bool,
}

impl RunnerCli {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut HarnessConfig) {
        if let Some(level) = &self.log_level {
            config.general.log_level.clone_from(level);
        }
        if let Some(format) = &self.log_format {
            config.general.log_format.clone_from(format);
        }
        if let Some(seed) = self.seed {
            config.scenarios.seed = Some(seed);
        }
    }

    /// Raw inputs for run configuration resolution.
    pub fn run_inputs(&self, config: &HarnessConfig) -> RunInputs {
        RunInputs {
            verbose: self.verbose.clone(),
            run: self.run.clone(),
            seed: self.seed.or(config.scenarios.seed),
        }
    }
}
