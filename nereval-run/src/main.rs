//! Command-line driver: runs the configured NER experiment and prints the
//! annotations, scores and timings of every run.

use std::time::Instant;

use anyhow::Context;
use nereval_core::{run_experiment, ExperimentConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ExperimentConfig::load().context("loading experiment configuration")?;
    info!(runs = config.runs.len(), export = ?config.export, "starting experiment");

    let started = Instant::now();
    let outcomes = run_experiment(&config, |outcome| {
        println!("{}", outcome.render(config.print_annotations));
        println!();
    })
    .context("running experiment")?;

    println!("{} runs, total time: {:.3}s", outcomes.len(), started.elapsed().as_secs_f64());
    Ok(())
}
