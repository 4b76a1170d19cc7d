//! `tidepool-evaluate`: evaluates every tracer tendency of a model at one
//! point.
//!
//! **Usage:**
//! ```text
//! tidepool-evaluate [CONFIG] --tracer N=1.0 --tracer P1=0.1 --aux PAR=100
//!                   [--parameter NAME=VALUE] [--z DEPTH] [--t TIME] [--json]
//! ```
//!
//! Tracers and auxiliary fields that are not given read as 0.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use tidepool_clients::{load_model, parse_assignment, values_in_order};
use tidepool_compiler::Coordinates;

/// Evaluate tracer tendencies of a Tidepool model.
#[derive(Parser)]
#[command(name = "tidepool-evaluate", about = "Evaluate tracer tendencies at one point")]
struct Args {
    /// Model configuration (`.json` or `.toml`).
    config: Option<PathBuf>,

    /// Tracer value, `NAME=VALUE`. Repeatable.
    #[arg(long = "tracer", value_parser = parse_assignment)]
    tracers: Vec<(String, f64)>,

    /// Auxiliary field value, `NAME=VALUE`. Repeatable.
    #[arg(long = "aux", value_parser = parse_assignment)]
    auxiliary: Vec<(String, f64)>,

    /// Parameter to rebind, `NAME=VALUE`. Repeatable.
    #[arg(long = "parameter", value_parser = parse_assignment)]
    parameters: Vec<(String, f64)>,

    /// Vertical coordinate (m, negative below the surface).
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    z: f64,

    /// Time (s).
    #[arg(long, default_value_t = 0.0)]
    t: f64,

    /// Print JSON instead of one line per tracer.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let model = load_model(args.config.as_deref())?;
    let system = model
        .system()
        .with_parameters(args.parameters.iter().map(|(n, v)| (n.as_str(), *v)))
        .context("Failed to rebind parameters")?;

    let tracers = values_in_order(system.tracer_names(), &args.tracers, "tracer")?;
    let auxiliary = values_in_order(system.auxiliary_fields(), &args.auxiliary, "auxiliary field")?;
    let rates = system.evaluate_all(&Coordinates::at(args.z, args.t), &tracers, &auxiliary);

    if args.json {
        let pairs: serde_json::Map<String, serde_json::Value> = system
            .tracer_names()
            .iter()
            .zip(&rates)
            .map(|(name, rate)| (name.clone(), json!(rate)))
            .collect();
        let text = serde_json::to_string_pretty(&pairs).context("Failed to serialize tendencies")?;
        println!("{text}");
    } else {
        for (name, rate) in system.tracer_names().iter().zip(&rates) {
            println!("d{name}/dt = {rate:e}");
        }
    }

    Ok(())
}
