// ─────────────────────────────────────────────────────────────────────
// JetFB — Command-Line Runner
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use clap::Parser;
use jetfb_core::cooling::CoolingTable;
use jetfb_core::pipeline::run;
use jetfb_types::config::RunConfig;
use jetfb_types::state::{AggregateResult, PopulationSummary, VirialScale};
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Population-averaged radio-jet feedback on a hydrostatic cluster atmosphere."
)]
struct Cli {
    /// JSON run configuration; built-in defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Two-column (log T, log Λ) cooling table; overrides the config entry.
    #[arg(long)]
    cooling_table: Option<PathBuf>,

    /// Where to write the JSON results; stdout when omitted.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Override the population seed.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Serialize)]
struct Report<'a> {
    virial: &'a VirialScale,
    population: &'a PopulationSummary,
    feedback: &'a AggregateResult,
}

fn load_config(cli: &Cli) -> Result<RunConfig, Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => RunConfig::from_file(path)?,
        None => RunConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.population.seed = seed;
    }
    Ok(config)
}

fn load_table(cli: &Cli, config: &RunConfig) -> Result<CoolingTable, Box<dyn Error>> {
    let path = cli
        .cooling_table
        .clone()
        .or_else(|| config.cooling_table.as_ref().map(PathBuf::from));
    match path {
        Some(p) => Ok(CoolingTable::from_file(&p)?),
        None => {
            log::warn!("No cooling table given; using the free-free (bremsstrahlung) approximation");
            Ok(CoolingTable::free_free())
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let table = load_table(&cli, &config)?;

    log::info!(
        "Running {} sources (seed {}) over {} duty cycles",
        config.population.n_sources,
        config.population.seed,
        config.duty_cycles.len()
    );
    let out = run(&config, &table)?;

    let report = Report {
        virial: &out.virial,
        population: &out.summary,
        feedback: &out.aggregate,
    };
    let json = serde_json::to_string_pretty(&report)?;
    match &cli.output {
        Some(path) => {
            std::fs::write(path, json)?;
            log::info!("Wrote results to {}", path.display());
        }
        None => println!("{json}"),
    }

    let s = &out.summary;
    log::info!(
        "Escaped {}/{} ({:.1}%), stuck {}, compact {}",
        s.counts.escaped,
        s.counts.sampled,
        100.0 * s.escaped_fraction,
        s.counts.stuck,
        s.counts.compact
    );
    if let Some(eq) = s.equilibrium {
        log::info!(
            "{} flared jets: median R_eq = {:.3e} m, median t_eq = {:.3e} s",
            eq.flared,
            eq.median_length_m,
            eq.median_time_s
        );
    }
    Ok(())
}
