//! Pipeline entry point: resolve configuration, run all five stages in order.

use clap::Parser;
use mlpipe_core::{ConfigPaths, ConfigResolver, TrackingConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "mlpipe",
    about = "Config-driven batch pipeline for tabular regression models",
    version
)]
struct Cli {
    /// Directory holding config.yaml, params.yaml and schema.yaml
    #[arg(long, default_value = "config")]
    config_dir: PathBuf,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::new(filter))
        .init();

    // Tracking endpoint and credentials leave the process environment exactly
    // once, here; the library only ever sees this record.
    let tracking = TrackingConfig {
        uri: std::env::var("MLPIPE_TRACKING_URI")
            .unwrap_or_else(|_| "artifacts/mlruns".to_string()),
        username: std::env::var("MLPIPE_TRACKING_USERNAME").ok(),
        password: std::env::var("MLPIPE_TRACKING_PASSWORD").ok(),
        experiment: std::env::var("MLPIPE_EXPERIMENT").unwrap_or_else(|_| "default".to_string()),
        model_name: std::env::var("MLPIPE_MODEL_NAME")
            .unwrap_or_else(|_| "elasticnet-regressor".to_string()),
    };

    let paths = ConfigPaths {
        config: cli.config_dir.join("config.yaml"),
        params: cli.config_dir.join("params.yaml"),
        schema: cli.config_dir.join("schema.yaml"),
    };
    let resolver = ConfigResolver::load(&paths)?;
    let stages = mlpipe_core::build_stages(&resolver, tracking)?;
    mlpipe_core::run_pipeline(&stages).await?;
    tracing::info!("pipeline run completed");
    Ok(())
}
