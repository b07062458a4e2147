//! Job bridge handler binary.
//!
//! Reads one job document (argument file or stdin), records its arrival
//! with the admission controller, runs the orchestrator, and prints the
//! structured outcome for the job runtime.

use std::io::Read;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mbridge_ffmpeg_client::FfmpegClient;
use mbridge_handler::{
    ConcurrencyController, HandlerConfig, JobOrchestrator, TracingProgressSink,
};
use mbridge_models::Job;
use mbridge_storage::CloudObjectStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing();

    info!("Starting mbridge-handler");

    let config = HandlerConfig::from_env();
    config.validate().context("Invalid handler configuration")?;
    info!("Handler config: {:?}", config);

    if let Err(e) = metrics_exporter_prometheus::PrometheusBuilder::new().install() {
        warn!("Failed to install metrics exporter: {}", e);
    }

    let controller = ConcurrencyController::new(config.concurrency.clone())
        .context("Invalid concurrency settings")?;

    let client = FfmpegClient::from_env().context("Failed to create worker client")?;
    let orchestrator = JobOrchestrator::new(
        config,
        client,
        Arc::new(CloudObjectStore::new()),
        Arc::new(TracingProgressSink),
    );

    let job = read_job().context("Failed to read job input")?;

    controller.record_arrival();
    info!(
        job_id = %job.id,
        limit = controller.current_limit(),
        "Job admitted"
    );

    let outcome = orchestrator.run(&job).await;

    println!("{}", serde_json::to_string(&outcome)?);
    Ok(())
}

fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("mbridge=info".parse().expect("valid directive"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

/// Read the job document from the first argument (a file path) or stdin.
fn read_job() -> anyhow::Result<Job> {
    let raw = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read job file {}", path))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    serde_json::from_str(&raw).context("Failed to parse job JSON")
}
