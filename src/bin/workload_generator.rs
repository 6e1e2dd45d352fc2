/// Synthetic order workload generator
///
/// Writes a workload file of buy, sell and cancel events for driving a
/// matching engine. Settings come from defaults, an optional JSON config file,
/// then command-line overrides.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use order_workload::{generate_to_path, validate_workload, Expectations, GeneratorConfig};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "workload_generator")]
#[command(about = "Generate a synthetic buy/sell/cancel workload file")]
#[command(version)]
struct Args {
    /// JSON config file; missing fields take defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of symbols in the universe
    #[arg(long)]
    symbols: Option<usize>,

    /// Number of actors
    #[arg(long)]
    threads: Option<u32>,

    /// Number of events to emit
    #[arg(long)]
    lines: Option<usize>,

    /// RNG seed for a reproducible workload
    #[arg(long)]
    seed: Option<u64>,

    /// Re-read the written file and replay it
    #[arg(long)]
    verify: bool,
}

impl Args {
    fn into_config(self) -> Result<(GeneratorConfig, bool)> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => GeneratorConfig::default(),
        };

        if let Some(output) = self.output {
            config.filename = output;
        }
        if let Some(n) = self.symbols {
            config.n_symbols = n;
        }
        if let Some(n) = self.threads {
            config.n_threads = n;
        }
        if let Some(n) = self.lines {
            config.n_lines = n;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }

        Ok((config, self.verify))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let (config, verify) = Args::parse().into_config()?;

    info!(
        path = %config.filename.display(),
        events = config.n_lines,
        symbols = config.n_symbols,
        actors = config.n_threads,
        seed = ?config.seed,
        "generating workload"
    );

    let stats = generate_to_path(&config)
        .with_context(|| format!("generating {}", config.filename.display()))?;
    stats.log_summary();

    if verify {
        let text = fs::read_to_string(&config.filename)
            .with_context(|| format!("reading back {}", config.filename.display()))?;
        let report = validate_workload(&text, &Expectations::from_config(&config))
            .context("workload failed replay validation")?;
        info!(
            buys = report.buys,
            sells = report.sells,
            cancels = report.cancels,
            outstanding = report.outstanding,
            "workload verified"
        );
    }

    Ok(())
}
