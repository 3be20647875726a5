mod config;
mod devtools_guard;
mod domain_lock;
mod errors;
mod guard;
mod logger;
mod metrics;
mod obfuscator;
mod pipeline;
mod tamper_seal;

use std::path::Path;

use clap::Parser;
use prometheus::Registry;
use tracing::{error, info};

use crate::config::load_config;
use errors::AppError;
use metrics::Metrics;
use obfuscator::JsObfuscator;
use pipeline::Pipeline;

#[derive(Parser)]
#[command(name = "cloak", version, about = "Obfuscate and protect delivered scripts")]
struct Cli {
    /// Path to the script file to protect
    file: String,

    /// Lock execution to this hostname
    #[arg(short, long)]
    domain: Option<String>,

    /// Inject the devtools detection runtime
    #[arg(long)]
    inject_runtime: bool,

    /// Add the integrity seal
    #[arg(long)]
    tamper_check: bool,

    /// Output path; defaults to obf-<name> beside the input
    #[arg(short, long)]
    output: Option<String>,

    /// JSON file with obfuscation pass-through options
    #[arg(long)]
    options: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    logger::init();
    let cli = Cli::parse();
    let cfg = load_config(
        cli.options.as_deref(),
        &cli.domain,
        cli.inject_runtime,
        cli.tamper_check,
    )?;

    let registry = Registry::new();
    let metrics = Metrics::new(&registry);

    info!("Reading script from {}", cli.file);
    let source = tokio::fs::read_to_string(&cli.file).await?;

    let pipeline = Pipeline::new(Box::new(JsObfuscator));
    let artifact = match pipeline.run(&source, &cfg) {
        Ok(artifact) => {
            metrics.runs_total.inc();
            artifact
        }
        Err(e) => {
            metrics.runs_failed.inc();
            error!("Run aborted at {} stage: {}", e.stage(), e);
            return Err(e.into());
        }
    };
    metrics.record_manifest(artifact.manifest());

    let out_path = match cli.output {
        Some(path) => path,
        None => default_output(&cli.file)?,
    };
    tokio::fs::write(&out_path, artifact.content()).await?;

    let stages: Vec<String> = artifact.manifest().iter().map(|s| s.to_string()).collect();
    info!("Applied stages: {}", stages.join(", "));
    info!("Protected script written to {}", out_path);
    info!("Code secured");
    Ok(())
}

fn default_output(input: &str) -> Result<String, AppError> {
    let path = Path::new(input);
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AppError::Other(format!("cannot derive output name from {}", input)))?;
    Ok(path
        .with_file_name(format!("obf-{}", name))
        .to_string_lossy()
        .into_owned())
}
