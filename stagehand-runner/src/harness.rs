//! Harness orchestration -- bring-up, scenario run, teardown, exit status.
//!
//! The [`Harness`] drives one run from start to finish on a single task.
//!
//! # Run Order
//!
//! 1. Compile the tag filter (an invalid filter is fatal before bring-up)
//! 2. Bring up every composition in definition order, unless disabled
//! 3. Settle for the configured delay
//! 4. Build and seed the shared context, bind every registrar
//! 5. Run the scenarios
//! 6. Collect logs and decompose every composition in bring-up order
//!
//! Once step 4 is reached, teardown always runs, even when the context
//! cannot be built or the scenarios fail.

use std::sync::Arc;

use stagehand_compose::{
    ComposeBackend, CompositionDefinition, CompositionList, LifecycleManager, TeardownReport,
};
use stagehand_core::{HarnessError, SharedContext};
use stagehand_core::config::HarnessConfig;
use stagehand_core::run::RunConfiguration;
use stagehand_scenario::{
    EngineReport, ScenarioEngine, StepRegistrar, compile_tag_filter, default_registrars,
};

use crate::fatal::{FatalError, FatalStage};

/// Result of a run that reached the scenario phase.
#[derive(Debug)]
pub struct RunOutcome {
    /// Scenario engine summary.
    pub report: EngineReport,
    /// Number of compositions that were brought up.
    pub compositions: usize,
    /// Project name shared by the compositions, if any were brought up.
    pub project_name: Option<String>,
    /// Teardown summary.
    pub teardown: TeardownReport,
}

impl RunOutcome {
    /// Process exit code: the worse of the scenario and process statuses.
    pub fn exit_code(&self) -> i32 {
        self.report.exit_code()
    }
}

/// One harness run.
pub struct Harness<B: ComposeBackend> {
    config: HarnessConfig,
    run: RunConfiguration,
    lifecycle: LifecycleManager<B>,
    registrars: Vec<Box<dyn StepRegistrar>>,
}

impl<B: ComposeBackend> Harness<B> {
    /// Build a harness with the default step registrars.
    pub fn new(config: HarnessConfig, run: RunConfiguration, backend: Arc<B>) -> Self {
        let lifecycle = LifecycleManager::new(backend)
            .with_settle(config.composition.settle_duration())
            .with_teardown_policy(config.composition.teardown_policy);
        Self {
            config,
            run,
            lifecycle,
            registrars: default_registrars(),
        }
    }

    /// Add a step registrar, bound after the existing ones.
    pub fn with_registrar(mut self, registrar: Box<dyn StepRegistrar>) -> Self {
        self.registrars.push(registrar);
        self
    }

    /// Resolved run configuration.
    pub fn run_configuration(&self) -> &RunConfiguration {
        &self.run
    }

    /// Composition definitions in bring-up order.
    pub fn definitions(&self) -> Vec<CompositionDefinition> {
        self.config
            .composition
            .resolved_definitions()
            .into_iter()
            .map(|(dir, file)| CompositionDefinition::new(dir, file))
            .collect()
    }

    /// Execute the run.
    ///
    /// # Errors
    ///
    /// Returns a [`FatalError`] for infrastructure failures. Scenario
    /// failures are not errors; they are reported in [`RunOutcome`].
    pub async fn run(self) -> Result<RunOutcome, FatalError> {
        compile_tag_filter(&self.run.tags)
            .map_err(|e| FatalError::new(FatalStage::Configuration, e))?;

        tracing::info!(
            seed = self.run.seed,
            tags = %self.run.tags,
            format = %self.run.format,
            strict = self.run.strict,
            stop_on_failure = self.run.stop_on_failure,
            "run configuration resolved"
        );

        let compositions = self.bring_up().await?;
        let project_name = compositions.project_name().map(str::to_owned);
        let brought_up = compositions.len();

        let scenarios = self.run_scenarios().await;

        let teardown = self
            .lifecycle
            .tear_down(compositions)
            .await
            .map_err(|e| FatalError::new(FatalStage::Teardown, HarnessError::from(e)))?;

        let report = scenarios?;
        let outcome = RunOutcome {
            report,
            compositions: brought_up,
            project_name,
            teardown,
        };
        tracing::info!(
            exit_code = outcome.exit_code(),
            compositions = outcome.compositions,
            logs = outcome.teardown.log_files.len(),
            "run finished"
        );
        Ok(outcome)
    }

    async fn bring_up(&self) -> Result<CompositionList, FatalError> {
        if !self.config.composition.enabled {
            tracing::info!("composition disabled, skipping bring-up and settle");
            return Ok(CompositionList::empty());
        }

        let list = self
            .lifecycle
            .bring_up(&self.definitions())
            .await
            .map_err(|e| FatalError::new(FatalStage::BringUp, HarnessError::from(e)))?;
        tracing::info!(
            project = list.project_name().unwrap_or_default(),
            count = list.len(),
            "compositions up"
        );

        self.lifecycle.settle().await;
        Ok(list)
    }

    async fn run_scenarios(&self) -> Result<EngineReport, FatalError> {
        let context = SharedContext::new(&self.config.context)
            .map_err(|e| FatalError::new(FatalStage::Context, e))?;
        context.seed_defaults(&self.config.context);
        let context = Arc::new(context);

        let mut engine = ScenarioEngine::new(&self.config.scenarios.features_dir);
        for registrar in &self.registrars {
            engine.register(registrar.as_ref());
        }
        tracing::debug!(
            registrars = self.registrars.len(),
            steps = engine.step_count(),
            "step registrars bound"
        );

        engine
            .run(&self.run, context)
            .await
            .map_err(|e| FatalError::new(FatalStage::Scenarios, e))
    }
}
