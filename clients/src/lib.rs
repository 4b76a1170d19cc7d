//! Shared plumbing for the Tidepool client binaries: configuration loading,
//! `NAME=VALUE` arguments and model descriptions.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use log::debug;
use serde_json::{json, Value};
use tidepool_constructors::{ConstructError, ModelType, NiPiZD};

/// Configuration file syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON document.
    Json,
    /// TOML document.
    Toml,
}

impl ConfigFormat {
    /// `.toml` files are TOML, everything else is JSON.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Json,
        }
    }
}

/// Parses a configuration document.
///
/// # Errors
///
/// Returns [`ConstructError::Document`] if the text is not a valid
/// configuration.
pub fn parse_config(text: &str, format: ConfigFormat) -> Result<NiPiZD, ConstructError> {
    match format {
        ConfigFormat::Json => NiPiZD::from_json_str(text),
        ConfigFormat::Toml => NiPiZD::from_toml_str(text),
    }
}

/// Reads and constructs the model configured in `path`. Without a path the
/// default configuration is used.
///
/// # Errors
///
/// Fails if the file cannot be read, is not a valid configuration, or the
/// model cannot be constructed.
pub fn load_model(path: Option<&Path>) -> Result<ModelType> {
    let config = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            debug!("loaded configuration from {}", path.display());
            parse_config(&text, ConfigFormat::from_path(path))
                .with_context(|| format!("Failed to parse {}", path.display()))?
        }
        None => NiPiZD::default(),
    };
    config.construct().context("Failed to construct model")
}

/// Parses `NAME=VALUE`.
///
/// # Errors
///
/// Returns a message if `=` is missing, the name is empty, or the value is
/// not a number.
pub fn parse_assignment(text: &str) -> std::result::Result<(String, f64), String> {
    let (name, value) = text
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{text}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing name in `{text}`"));
    }
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid value in `{text}`: {e}"))?;
    Ok((name.to_owned(), value))
}

/// Orders `assignments` by `names`. Unassigned names read as 0.
///
/// # Errors
///
/// Fails if an assignment names something outside `names`.
pub fn values_in_order(names: &[String], assignments: &[(String, f64)], what: &str) -> Result<Vec<f64>> {
    let mut values = vec![0.0; names.len()];
    for (name, value) in assignments {
        let Some(i) = names.iter().position(|n| n == name) else {
            bail!("unknown {what} `{name}` (expected one of: {})", names.join(", "));
        };
        values[i] = *value;
    }
    Ok(values)
}

/// Machine-readable description of a model.
#[must_use]
pub fn describe_json(model: &ModelType) -> Value {
    let tracers: Vec<Value> = model
        .tracer_names()
        .iter()
        .map(|name| {
            json!({
                "name": name,
                "expression": model.expression(name).map(ToString::to_string),
                "sinking_speed": model.function(name).and_then(|f| f.sinking_speed()),
            })
        })
        .collect();
    let parameters: serde_json::Map<String, Value> = model
        .parameters()
        .iter()
        .map(|(name, value)| (name.to_owned(), json!(value)))
        .collect();
    json!({
        "tracers": tracers,
        "auxiliary_fields": model.system().auxiliary_fields(),
        "parameters": parameters,
        "palatability": model.palatability(),
        "assimilation_efficiency": model.assimilation_efficiency(),
        "fluxes": model.network().fluxes(),
    })
}

/// Human-readable description of a model.
#[must_use]
pub fn describe_text(model: &ModelType) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Tracers ({}):", model.tracer_names().len());
    for name in model.tracer_names() {
        let expression = model.expression(name).map(ToString::to_string).unwrap_or_default();
        let _ = writeln!(out, "  d{name}/dt = {expression}");
        if let Some(w) = model.function(name).and_then(|f| f.sinking_speed()) {
            let _ = writeln!(out, "    sinks at {w} m/s");
        }
    }
    let _ = writeln!(out, "Auxiliary fields: {}", model.system().auxiliary_fields().join(", "));
    let _ = writeln!(out, "Parameters ({}):", model.parameters().len());
    for (name, value) in model.parameters().iter() {
        let _ = writeln!(out, "  {name} = {value}");
    }
    out
}
