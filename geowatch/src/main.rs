//! geowatch - inspect the change-detection backend from a terminal
//!
//! Fetches one namespace through the same stores a UI would use and prints
//! one line per entity.
//!
//! # Usage
//!
//! ```sh
//! geowatch aois
//! geowatch --api-url http://10.0.0.5:8000/api/v1 jobs
//! geowatch results 3f2a9c
//! RUST_LOG=geowatch=debug geowatch alerts
//! ```

use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use geowatch::config::{ApiConfig, ConfigError};
use geowatch::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "geowatch")]
#[command(about = "Query a satellite change-detection backend", version)]
struct Cli {
    /// Backend base URL (overrides GEOWATCH_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Request timeout in seconds (overrides GEOWATCH_TIMEOUT_SECS)
    #[arg(long)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List areas of interest
    Aois,
    /// List imagery
    Imagery,
    /// List detection jobs
    Jobs,
    /// List alerts
    Alerts,
    /// List alert rules
    Rules,
    /// Show the results of one detection job
    Results { job_id: String },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Operation(#[from] OperationError),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn config(cli: &Cli) -> Result<ApiConfig, ConfigError> {
    let mut config = ApiConfig::from_env()?;
    if let Some(url) = &cli.api_url {
        config = config.with_base_url(url)?;
    }
    if let Some(secs) = cli.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    Ok(config)
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let app = AppStore::new(&config(&cli)?)?;

    match &cli.command {
        Command::Aois => {
            print_all(app.aoi(), |aoi: &Aoi| {
                let active = if aoi.is_active { "active" } else { "inactive" };
                format!("{}\t{}\t{}\t{}", aoi.id, aoi.name, active, aoi.monitoring_frequency)
            })
            .await?
        }
        Command::Imagery => {
            print_all(app.imagery(), |image: &Imagery| {
                format!(
                    "{}\t{}\t{}\t{:.1}%\t{}",
                    image.id,
                    image.name,
                    image.satellite,
                    image.cloud_coverage,
                    image.processing_status
                )
            })
            .await?
        }
        Command::Jobs => {
            print_all(app.detection().jobs(), |job: &DetectionJob| {
                format!("{}\t{}\t{}", job.id, job.aoi_id, job.status)
            })
            .await?
        }
        Command::Alerts => {
            print_all(app.alerts().alerts(), |alert: &Alert| {
                format!(
                    "{}\t{}\t{}\t{}",
                    alert.id,
                    alert.status,
                    alert.severity.as_ref().map_or("-", |s| s.as_str()),
                    alert.message.as_deref().unwrap_or("")
                )
            })
            .await?
        }
        Command::Rules => {
            print_all(app.alerts().rules(), |rule: &AlertRule| {
                let active = if rule.is_active { "active" } else { "inactive" };
                format!("{}\t{}\t{}\t{}", rule.id, rule.name, active, rule.channels.join(","))
            })
            .await?
        }
        Command::Results { job_id } => {
            for result in app.detection().fetch_results(job_id).await? {
                println!("{}", result_line(&result));
            }
        }
    }
    Ok(())
}

/// Refresh `store` and print one line per entity, or the recorded error
async fn print_all<R: RemoteResource>(
    store: &ResourceStore<R>,
    line: impl Fn(&R::Entity) -> String,
) -> Result<(), OperationError> {
    store.fetch_all().await;
    store.read(|state| {
        if let Some(error) = state.error() {
            return Err(OperationError::new(error));
        }
        for entity in state.iter() {
            println!("{}", line(entity));
        }
        Ok(())
    })
}

fn result_line(result: &DetectionResult) -> String {
    let number = |value: Option<f64>| value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"));
    format!(
        "{}\tchange={}%\tndvi_before={}\tndvi_after={}\t{}",
        result.id.as_deref().unwrap_or("-"),
        number(result.change_percentage),
        number(result.ndvi_before_mean),
        number(result.ndvi_after_mean),
        result.message.as_deref().unwrap_or("")
    )
}
