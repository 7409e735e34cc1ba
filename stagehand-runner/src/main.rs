use std::sync::Arc;
use std::time::SystemTime;

use clap::Parser;

use stagehand_compose::DockerComposeCli;
use stagehand_core::config::HarnessConfig;
use stagehand_core::run::RunConfiguration;
use stagehand_runner::cli::RunnerCli;
use stagehand_runner::fatal::{FatalError, FatalStage};
use stagehand_runner::harness::Harness;
use stagehand_runner::logging::init_tracing;
use stagehand_scenario::compile_tag_filter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = RunnerCli::parse();
    match execute(cli).await {
        Ok(code) => std::process::exit(code),
        Err(fatal) => fatal.abort(),
    }
}

async fn execute(cli: RunnerCli) -> Result<i32, FatalError> {
    // 설정 로드: 파일 (선택) -> 환경변수 -> CLI
    let mut config = HarnessConfig::load_or_default(cli.config.as_deref())
        .await
        .map_err(|e| FatalError::new(FatalStage::Configuration, e))?;
    cli.apply_overrides(&mut config);
    config
        .validate()
        .map_err(|e| FatalError::new(FatalStage::Configuration, e))?;

    // 로깅 초기화 (등록기 바인딩 전에 한 번)
    init_tracing(&config.general).map_err(|e| FatalError::new(FatalStage::Logging, e))?;

    let run = RunConfiguration::resolve(&cli.run_inputs(&config), SystemTime::now());

    if cli.validate {
        compile_tag_filter(&run.tags)
            .map_err(|e| FatalError::new(FatalStage::Configuration, e))?;
        let resolved = serde_json::to_string_pretty(&run)
            .map_err(|e| FatalError::new(FatalStage::Configuration, e))?;
        println!("{resolved}");
        tracing::info!("configuration is valid");
        return Ok(0);
    }

    tracing::info!("stagehand starting");
    let backend = Arc::new(DockerComposeCli::new());
    let outcome = Harness::new(config, run, backend).run().await?;
    Ok(outcome.exit_code())
}
