//! `tidepool-describe`: constructs a model and prints its tracers,
//! expressions and parameters.
//!
//! **Usage:**
//! ```text
//! tidepool-describe [CONFIG] [--format text|json]
//! ```
//!
//! `CONFIG` is a JSON or TOML `NiPiZD` configuration; without it the default
//! two-by-two model is described.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tidepool_clients::{describe_json, describe_text, load_model};

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Describe a Tidepool model.
#[derive(Parser)]
#[command(name = "tidepool-describe", about = "Describe a Tidepool model")]
struct Args {
    /// Model configuration (`.json` or `.toml`).
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value = "text")]
    format: Format,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let model = load_model(args.config.as_deref())?;

    match args.format {
        Format::Text => print!("{}", describe_text(&model)),
        Format::Json => {
            let text = serde_json::to_string_pretty(&describe_json(&model))
                .context("Failed to serialize model description")?;
            println!("{text}");
        }
    }

    Ok(())
}
