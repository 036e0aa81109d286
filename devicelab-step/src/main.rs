//! Devicelab Execute Step
//!
//! A CI pipeline step that submits one mobile test-automation job to a
//! remote device-lab executor, optionally waits for it to finish, retrieves
//! logs and a report URL, and drives the scriptless automation subsystem
//! when requested.
//!
//! Architecture:
//! - Configuration: environment variables provided by the CI orchestrator
//! - Request builder: translate configuration into the submission payload
//! - Poller: one generic wait loop used for both job and scriptless status
//! - Runner: the submit/wait/fetch/download state machine
//! - Outputs: named values exported for downstream pipeline steps
//!
//! The process exits 0 whenever the state machine reaches its end, including
//! on polling timeouts and scriptless failures; only transport failures
//! toward the executor abort the run with a non-zero exit.

mod config;
mod outputs;
mod poller;
mod request;
mod runner;

use anyhow::{Context, Result};
use devicelab_client::ExecutorClient;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::StepConfig;
use crate::runner::StepRunner;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "devicelab_step=info,devicelab_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting devicelab execute step");

    let config = StepConfig::from_env().context("Failed to load step configuration")?;
    config.validate()?;
    info!("Loaded configuration: executor_url={}", config.executor_url);

    let client = ExecutorClient::new(
        &config.executor_url,
        &config.executor_credentials(),
        config.device_cloud_credentials().as_ref(),
    )
    .context("Failed to initialize executor client")?;

    let runner = StepRunner::new(config, client);
    let report = runner.run().await.context("Step run failed")?;

    if !report.job_id.is_empty() {
        info!("Job ID: {}", report.job_id);
    }
    if !report.report_url.is_empty() {
        info!("Report URL: {}", report.report_url);
    }

    outputs::publish(&report);

    Ok(())
}
