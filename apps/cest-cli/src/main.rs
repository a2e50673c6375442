mod compile;
mod error;

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cest_sim::{Metabolite, Mtr, ZSpectrum};
use compile::compile_scenario;
use error::CliResult;

#[derive(Parser)]
#[command(name = "cest-cli")]
#[command(about = "CEST Z-spectrum simulation with Bloch-McConnell exchange", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate scenario file syntax and parameters
    Validate {
        /// Path to the scenario file (YAML or JSON)
        scenario_path: PathBuf,
    },
    /// Simulate the Z-spectrum of a scenario
    ZSpectrum {
        /// Path to the scenario file (YAML or JSON)
        scenario_path: PathBuf,
        /// Output file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write JSON instead of CSV
        #[arg(long)]
        json: bool,
    },
    /// List the metabolite catalog
    Catalog,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { scenario_path } => cmd_validate(&scenario_path),
        Commands::ZSpectrum {
            scenario_path,
            output,
            json,
        } => cmd_z_spectrum(&scenario_path, output.as_deref(), json),
        Commands::Catalog => cmd_catalog(),
    }
}

fn cmd_validate(scenario_path: &Path) -> CliResult<()> {
    println!("Validating scenario: {}", scenario_path.display());
    let scenario = cest_project::load(scenario_path)?;
    compile_scenario(&scenario)?;
    println!("✓ Scenario is valid");
    Ok(())
}

fn cmd_z_spectrum(scenario_path: &Path, output: Option<&Path>, json: bool) -> CliResult<()> {
    let scenario = cest_project::load(scenario_path)?;
    let compiled = compile_scenario(&scenario)?;
    info!(
        name = %compiled.name,
        pools = compiled.request.model.pool_count(),
        offsets = compiled.request.offsets_ppm.len(),
        "running scenario"
    );

    let start = Instant::now();
    let spectrum = compiled.request.run()?;
    let mtr = compiled
        .mtr
        .map(|normalization| spectrum.mtr(normalization))
        .transpose()?;
    info!(elapsed_ms = start.elapsed().as_millis() as u64, "Z-spectrum done");

    let content = if json {
        let report = Report {
            name: &compiled.name,
            offsets_ppm: &spectrum.offsets_ppm,
            z: &spectrum.z,
            mtr: mtr.as_ref().map(|m| MtrReport {
                normalization: m.normalization.key(),
                offsets_ppm: &m.offsets_ppm,
                values: &m.values,
            }),
        };
        let mut text = serde_json::to_string_pretty(&report)?;
        text.push('\n');
        text
    } else {
        build_csv(&spectrum, mtr.as_ref())
    };

    if let Some(path) = output {
        std::fs::write(path, content)?;
        println!(
            "✓ Wrote {} offsets to {}",
            spectrum.len(),
            path.display()
        );
    } else {
        print!("{}", content);
    }
    Ok(())
}

fn cmd_catalog() -> CliResult<()> {
    println!(
        "{:<26} {:>8} {:>8} {:>9} {:>10} {:>10}",
        "key", "ppm", "T1 (s)", "T2 (ms)", "conc (mM)", "k (Hz)"
    );
    for metabolite in Metabolite::ALL {
        let p = metabolite.params();
        println!(
            "{:<26} {:>8.2} {:>8.2} {:>9.1} {:>10.2} {:>10.0}",
            metabolite.key(),
            p.offset_ppm,
            p.t1,
            p.t2 * 1e3,
            p.concentration_mm,
            p.exchange_rate
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct Report<'a> {
    name: &'a str,
    offsets_ppm: &'a [f64],
    z: &'a [f64],
    #[serde(skip_serializing_if = "Option::is_none")]
    mtr: Option<MtrReport<'a>>,
}

#[derive(Serialize)]
struct MtrReport<'a> {
    normalization: &'static str,
    offsets_ppm: &'a [f64],
    values: &'a [f64],
}

/// `offset_ppm,z` rows, then an `offset_ppm,mtr_<normalization>` block.
fn build_csv(spectrum: &ZSpectrum, mtr: Option<&Mtr>) -> String {
    let mut csv = String::from("offset_ppm,z\n");
    for (ppm, z) in spectrum.iter() {
        csv.push_str(&format!("{},{}\n", ppm, z));
    }
    if let Some(mtr) = mtr {
        csv.push_str(&format!("\noffset_ppm,mtr_{}\n", mtr.normalization));
        for (ppm, v) in mtr.offsets_ppm.iter().zip(&mtr.values) {
            csv.push_str(&format!("{},{}\n", ppm, v));
        }
    }
    csv
}
