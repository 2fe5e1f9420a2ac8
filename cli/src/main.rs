//! `kfilter` CLI: scenario runs, filter parameter overrides, run log replay.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kalman_core::metrics::FilterMetrics;
use sim::replay::{load_run_log, save_run_log, RunLog};
use sim::runner::{run_filter, FilterSpec};
use sim::scenarios::{Scenario, ScenarioKind};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "kfilter", about = "Discrete Kalman filter CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a named scenario through its filter and report RMSE.
    Run {
        #[arg(value_enum)]
        scenario: ScenarioKind,
        /// Random seed for the measurement noise
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// JSON filter parameters replacing the scenario's defaults
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output metrics to a JSON file
        #[arg(long)]
        output: Option<PathBuf>,
        /// Also save the full run log
        #[arg(long)]
        save_log: Option<PathBuf>,
    },
    /// Re-filter a previously saved run log.
    Replay {
        /// Path to run log JSON file
        input: PathBuf,
        /// Output metrics to a JSON file
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            scenario,
            seed,
            config,
            output,
            save_log,
        } => {
            run_scenario(scenario, seed, config.as_deref(), output.as_deref(), save_log.as_deref())?;
        }
        Commands::Replay { input, output } => {
            run_replay(&input, output.as_deref())?;
        }
    }

    Ok(())
}

fn load_filter_spec(path: &Path) -> Result<FilterSpec> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading filter config {}", path.display()))?;
    let spec = serde_json::from_str(&text)
        .with_context(|| format!("parsing filter config {}", path.display()))?;
    Ok(spec)
}

fn run_scenario(
    kind: ScenarioKind,
    seed: u64,
    config_path: Option<&Path>,
    output_path: Option<&Path>,
    log_path: Option<&Path>,
) -> Result<()> {
    let mut scenario = Scenario::build(kind, seed);
    if let Some(cpath) = config_path {
        scenario = scenario.with_filter(load_filter_spec(cpath)?)?;
    }

    println!(
        "Running scenario '{}' (seed={}, {} steps)...",
        scenario.name,
        seed,
        scenario.steps.len()
    );

    let start = std::time::Instant::now();
    let outcome = run_filter(&scenario.filter, &scenario.steps)?;
    let elapsed = start.elapsed();

    print_metrics(&outcome.metrics, elapsed.as_secs_f64());

    if let Some(lpath) = log_path {
        save_run_log(&RunLog::new(&scenario, &outcome), lpath)?;
        println!("Run log saved to {}", lpath.display());
    }

    if let Some(opath) = output_path {
        let json = serde_json::json!({
            "scenario": scenario.name,
            "seed": seed,
            "elapsed_s": elapsed.as_secs_f64(),
            "filter": scenario.filter,
            "metrics": outcome.metrics,
            "rmse_measurement": outcome.metrics.rmse_measurement(),
            "rmse_estimate": outcome.metrics.rmse_estimate(),
        });
        std::fs::write(opath, serde_json::to_string_pretty(&json)?)?;
        println!("Metrics saved to {}", opath.display());
    }

    Ok(())
}

fn run_replay(input: &Path, output_path: Option<&Path>) -> Result<()> {
    let log = load_run_log(input)?;
    println!(
        "Replaying '{}' ({} steps)...",
        log.scenario_name,
        log.steps.len()
    );

    let start = std::time::Instant::now();
    let (outcome, divergence) = log.replay()?;
    let elapsed = start.elapsed();

    print_metrics(&outcome.metrics, elapsed.as_secs_f64());
    match divergence {
        None => println!("Estimates match the recorded run"),
        Some(step) => {
            tracing::warn!(step, "replayed estimate differs from the log");
            println!("Estimates diverge from the recorded run at step {step}");
        }
    }

    if let Some(opath) = output_path {
        let json = serde_json::json!({
            "scenario": log.scenario_name,
            "seed": log.seed,
            "elapsed_s": elapsed.as_secs_f64(),
            "metrics": outcome.metrics,
            "rmse_measurement": outcome.metrics.rmse_measurement(),
            "rmse_estimate": outcome.metrics.rmse_estimate(),
            "first_divergence": divergence,
        });
        std::fs::write(opath, serde_json::to_string_pretty(&json)?)?;
    }

    Ok(())
}

fn print_metrics(metrics: &FilterMetrics, elapsed_s: f64) {
    println!(
        "Done: {} steps, {} readings skipped, elapsed={:.3}s",
        metrics.n_steps, metrics.inversion_failures, elapsed_s
    );
    println!(
        "RMSE: measurements {:.4}, estimates {:.4}",
        metrics.rmse_measurement(),
        metrics.rmse_estimate()
    );
}
