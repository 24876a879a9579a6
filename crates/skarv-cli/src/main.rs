//! Skarv Command-Line Interface
//!
//! Loads an `OpenQASM` 2 circuit and prints its op counts before and after
//! two transpile calls: one restricted to a basis gate set, one mapped onto
//! a 20-qubit mock device.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use console::style;
use tracing_subscriber::EnvFilter;

use skarv_ir::Circuit;
use skarv_transpile::{BasisGates, Target, TranspileOptions, transpile};

/// Basis for the optimization pass of the demo.
const BASIS_GATES: [&str; 10] = ["u3", "t", "tdg", "s", "sdg", "cx", "x", "y", "z", "h"];

/// Layout seed, fixed so repeated runs print identical summaries.
const SEED: u64 = 11;

/// Optimization level for both transpile calls.
const OPTIMIZATION_LEVEL: u8 = 3;

/// Skarv - quantum circuit transpilation demo
#[derive(Parser)]
#[command(name = "skarv")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input circuit file (OpenQASM 2)
    file: PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging; diagnostics go to stderr so stdout stays comparable
    // across runs.
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = execute(&cli.file) {
        eprintln!("{} {e:#}", style("Error:").red().bold());
        std::process::exit(1);
    }

    Ok(())
}

/// Run the demo: load, summarize, transpile twice, summarize each result.
fn execute(file: &PathBuf) -> anyhow::Result<()> {
    let circuit = skarv_qasm2::parse_file(file)
        .with_context(|| format!("Failed to load circuit from '{}'", file.display()))?;
    tracing::info!(
        qubits = circuit.num_qubits(),
        ops = circuit.len(),
        "loaded circuit"
    );

    print_summary("Original", &circuit);

    let optimized = transpile(
        &circuit,
        &TranspileOptions::new()
            .with_basis_gates(BasisGates::new(BASIS_GATES))
            .with_seed(SEED)
            .with_optimization_level(OPTIMIZATION_LEVEL),
    )
    .context("Optimization pass failed")?;
    print_summary("Optimized", &optimized);

    let mapped = transpile(
        &circuit,
        &TranspileOptions::new()
            .with_target(Target::tokyo())
            .with_seed(SEED)
            .with_optimization_level(OPTIMIZATION_LEVEL),
    )
    .context("Mapping pass failed")?;
    print_summary("Mapped", &mapped);

    Ok(())
}

/// Print one labeled op-count summary.
fn print_summary(label: &str, circuit: &Circuit) {
    println!("{label}:");
    println!("  {}", circuit.count_ops());
}
