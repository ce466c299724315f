//! Trainpush - train one LoRA job, then publish its weights
//!
//! Bootstrap -> credential (training) -> job -> credential (upload) -> publish -> summary

mod cli;
mod logging;
mod settings;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::sync::Arc;
use tracing::{error, info};

use trainpush_core::application::{CredentialSwitcher, JobRunner, Pipeline, RunReport};
use trainpush_core::domain::{DomainError, Stage, StageEnv};
use trainpush_core::port::id_provider::UuidProvider;
use trainpush_core::port::time_provider::SystemTimeProvider;
use trainpush_core::port::{IdProvider, TimeProvider};
use trainpush_core::PipelineError;
use trainpush_infra_hub::HubPublisher;
use trainpush_infra_system::{
    read_secrets, EnvironmentBootstrapper, FileCredentialStore, SubprocessJobLauncher,
};

use crate::cli::Cli;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Settings, token store and adapters; any failure here is an `init` stage failure
fn build_pipeline(
    cli: &Cli,
    base_env: StageEnv,
    id_provider: Arc<dyn IdProvider>,
) -> std::result::Result<Pipeline, PipelineError> {
    let config = settings::load(cli).map_err(|e| {
        PipelineError::new(
            Stage::Init,
            DomainError::InvalidSettings(format!(
                "{} (source: {})",
                e,
                settings::describe_source(cli)
            )),
        )
    })?;

    let store = Arc::new(
        FileCredentialStore::from_env().map_err(|e| PipelineError::new(Stage::Init, e))?,
    );
    info!(token_store = %store.path().display(), "Using token store");

    let time_provider: Arc<dyn TimeProvider> = Arc::new(SystemTimeProvider);
    let launcher = Arc::new(SubprocessJobLauncher::new(
        config.toolkit.clone(),
        time_provider.clone(),
    ));
    let publisher = Arc::new(HubPublisher::from_env());
    info!(endpoint = %publisher.endpoint(), "Using hub endpoint");

    Ok(Pipeline::new(
        config,
        CredentialSwitcher::new(store, base_env),
        JobRunner::new(launcher),
        publisher,
        time_provider,
        id_provider,
    ))
}

fn print_outcome(report: &RunReport) {
    match &report.result {
        Ok(receipt) => {
            println!("{} {}", "Weights pushed to:".green().bold(), receipt.repo_url);
        }
        Err(e) => {
            println!("{} {}", "Error running job:".red().bold(), e);
        }
    }
    print!("{}", report.summary());
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Logging
    logging::init().context("Failed to initialise logging")?;

    // 2. Settings file before flags, so `.env` can feed TRAINPUSH_* flag defaults
    let bootstrap = EnvironmentBootstrapper::from_env().load();
    let cli = Cli::parse();

    info!(
        version = VERSION,
        settings_file = ?bootstrap.settings_file,
        pipeline_settings = %settings::describe_source(&cli),
        debug_toolkit = bootstrap.debug_toolkit,
        "Trainpush starting"
    );

    // 3. Configuration + wiring
    let id_provider: Arc<dyn IdProvider> = Arc::new(UuidProvider);
    let report = match build_pipeline(&cli, bootstrap.base_env, id_provider.clone()) {
        Ok(pipeline) => {
            // 4. Run
            println!(
                "Running job with config: {}",
                pipeline.config().job.config_path.display()
            );
            pipeline.execute(&read_secrets()).await
        }
        Err(e) => {
            error!(stage = %e.stage, error = %e, "Error running job");
            RunReport::aborted(id_provider.generate_id(), e)
        }
    };

    print_outcome(&report);

    report.into_result()?;
    Ok(())
}
