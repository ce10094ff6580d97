//! Regen Monetary Policy Simulator CLI
//!
//! Offline entry points for the allocation scenario, single simulation runs,
//! parameter sweeps and the full validation audit.

mod report;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use regen_economics::{run_scenario, AllocationScenario};
use regen_monetary::{
    run_audit, run_simulation, run_sweep, score_confidence, ControllerKind, MetricsBundle,
    SimulationConfig,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "regen-sim")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Regen monetary policy simulator and validation audit", long_about = None)]
struct Cli {
    /// Verbose logging (per-epoch detail)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run an authority reward-split scenario from JSON
    Allocate {
        /// Scenario file
        scenario: PathBuf,
    },
    /// Run one controller over the configured epochs
    Simulate {
        /// TOML simulation config (defaults when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Controller policy: threshold or pid
        #[arg(long, default_value = "threshold")]
        controller: ControllerKind,
        /// Override the configured epoch count
        #[arg(long)]
        epochs: Option<u64>,
        /// Override the configured seed
        #[arg(long)]
        seed: Option<u64>,
        /// Output directory
        #[arg(short, long, default_value = "exports")]
        out: PathBuf,
    },
    /// Sweep the initial (alpha, beta) grid
    Sweep {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long, default_value = "threshold")]
        controller: ControllerKind,
        #[arg(short, long, default_value = "exports")]
        out: PathBuf,
    },
    /// Run the full policy comparison audit and write all reports
    Audit {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long, default_value = "exports")]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    match cli.command {
        Commands::Allocate { scenario } => allocate(&scenario),
        Commands::Simulate {
            config,
            controller,
            epochs,
            seed,
            out,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(epochs) = epochs {
                config.epochs = epochs;
            }
            if let Some(seed) = seed {
                config.seed = seed;
            }
            config.validate().context("Invalid simulation config")?;
            simulate(&config, controller, &out)
        }
        Commands::Sweep {
            config,
            controller,
            out,
        } => {
            let config = load_config(config.as_deref())?;
            sweep(&config, controller, &out)
        }
        Commands::Audit { config, out } => {
            let config = load_config(config.as_deref())?;
            audit(&config, &out)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<SimulationConfig> {
    match path {
        Some(path) => SimulationConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(SimulationConfig::default()),
    }
}

fn allocate(path: &Path) -> Result<()> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario {}", path.display()))?;
    let scenario: AllocationScenario =
        serde_json::from_str(&content).context("Failed to parse scenario")?;

    let outcome = run_scenario(&scenario).context("Allocation failed")?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if let Some(expected) = &scenario.expected {
        let mismatches = outcome.mismatches(expected);
        if !mismatches.is_empty() {
            bail!("Outcome differs from expected: {}", mismatches.join("; "));
        }
        info!("Outcome matches expected values");
    }
    Ok(())
}

fn simulate(config: &SimulationConfig, controller: ControllerKind, out: &Path) -> Result<()> {
    info!(
        "Simulating {} epochs with {} controller (seed {})",
        config.epochs, controller, config.seed
    );
    let run = run_simulation(config, controller).context("Simulation failed")?;
    let metrics = MetricsBundle::from_records(&run.records, config);
    let confidence = score_confidence(&metrics, &config.control.bounds);

    fs::create_dir_all(out).with_context(|| format!("Failed to create {}", out.display()))?;
    let path = out.join("epochs.csv");
    report::write_epochs_csv(&path, &run.records, config.supply.supply_cap)?;

    for (name, value) in metrics.to_named_values() {
        println!("{name:<24} {value:>16.6}");
    }
    println!("{:<24} {:>16.3}", "confidence", confidence);
    info!("Epoch records written to {}", path.display());
    Ok(())
}

fn sweep(config: &SimulationConfig, controller: ControllerKind, out: &Path) -> Result<()> {
    let rows = run_sweep(config, controller).context("Sweep failed")?;

    fs::create_dir_all(out).with_context(|| format!("Failed to create {}", out.display()))?;
    let path = out.join("parameter_sweep.csv");
    report::write_sweep_csv(&path, &rows)?;

    for row in &rows {
        println!(
            "alpha {:.2} beta {:.2} -> confidence {:.3}",
            row.alpha, row.beta, row.confidence
        );
    }
    info!("Sweep written to {}", path.display());
    Ok(())
}

fn audit(config: &SimulationConfig, out: &Path) -> Result<()> {
    let report = run_audit(config).context("Audit failed")?;
    let timestamp = chrono::Utc::now().to_rfc3339();
    let written = report::write_audit_bundle(out, &report, config.supply.supply_cap, &timestamp)?;

    println!("Audit complete.");
    println!("Confidence score: {:.3}", report.confidence());
    for path in written {
        info!("Wrote {}", path.display());
    }
    Ok(())
}
