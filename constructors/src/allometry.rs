//! Diameters and size-dependent parameters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use tidepool_library::allometry::allometric_scaling_power as scale;

use crate::classes::FunctionalType;
use crate::error::ConstructError;

/// How a diameter range is split into classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Splitting {
    /// Geometric spacing.
    #[serde(rename = "log_splitting")]
    LogSplitting,
    /// Arithmetic spacing.
    #[serde(rename = "linear_splitting")]
    LinearSplitting,
}

impl fmt::Display for Splitting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Splitting::LogSplitting => "log_splitting",
            Splitting::LinearSplitting => "linear_splitting",
        })
    }
}

impl FromStr for Splitting {
    type Err = ConstructError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "log_splitting" => Ok(Splitting::LogSplitting),
            "linear_splitting" => Ok(Splitting::LinearSplitting),
            other => Err(ConstructError::UnknownSplitting {
                name: other.to_owned(),
            }),
        }
    }
}

/// Where class diameters come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DiameterSpec {
    /// One diameter per class, used as given.
    Explicit(Vec<f64>),
    /// A range split into as many classes as requested.
    Range {
        /// Smallest diameter.
        min_diameter: f64,
        /// Largest diameter.
        max_diameter: f64,
        /// Spacing policy.
        splitting: Splitting,
    },
}

impl DiameterSpec {
    /// A log-split range.
    #[must_use]
    pub fn log(min_diameter: f64, max_diameter: f64) -> Self {
        DiameterSpec::Range {
            min_diameter,
            max_diameter,
            splitting: Splitting::LogSplitting,
        }
    }

    /// A linearly split range.
    #[must_use]
    pub fn linear(min_diameter: f64, max_diameter: f64) -> Self {
        DiameterSpec::Range {
            min_diameter,
            max_diameter,
            splitting: Splitting::LinearSplitting,
        }
    }
}

fn invalid(functional_type: FunctionalType, reason: String) -> ConstructError {
    ConstructError::InvalidDiameters {
        functional_type,
        reason,
    }
}

/// Produces `n` diameters for classes of `functional_type`.
///
/// Ranges include both endpoints exactly and increase strictly. A single
/// class sits at the midpoint of the range: arithmetic for linear
/// splitting, geometric for log splitting.
///
/// # Errors
///
/// - [`ConstructError::NoClasses`] if `n` is 0,
/// - [`ConstructError::DiameterCount`] if an explicit list has the wrong
///   length,
/// - [`ConstructError::InvalidDiameters`] for non-positive or non-finite
///   diameters or `min_diameter >= max_diameter`.
pub fn derive_diameters(
    functional_type: FunctionalType,
    spec: &DiameterSpec,
    n: usize,
) -> Result<Vec<f64>, ConstructError> {
    if n == 0 {
        return Err(ConstructError::NoClasses { functional_type });
    }
    match spec {
        DiameterSpec::Explicit(values) => {
            if values.len() != n {
                return Err(ConstructError::DiameterCount {
                    functional_type,
                    expected: n,
                    found: values.len(),
                });
            }
            if let Some(bad) = values.iter().find(|d| !(d.is_finite() && **d > 0.0)) {
                return Err(invalid(
                    functional_type,
                    format!("diameter {bad} is not positive and finite"),
                ));
            }
            Ok(values.clone())
        }
        DiameterSpec::Range {
            min_diameter: lo,
            max_diameter: hi,
            splitting,
        } => {
            let (lo, hi) = (*lo, *hi);
            if !(lo.is_finite() && hi.is_finite() && lo > 0.0) {
                return Err(invalid(
                    functional_type,
                    format!("range {lo}..{hi} must be positive and finite"),
                ));
            }
            if lo >= hi {
                return Err(invalid(
                    functional_type,
                    format!("min_diameter {lo} must be below max_diameter {hi}"),
                ));
            }
            if n == 1 {
                return Ok(vec![match splitting {
                    Splitting::LinearSplitting => 0.5 * (lo + hi),
                    Splitting::LogSplitting => (lo * hi).sqrt(),
                }]);
            }
            let last = n - 1;
            let step = |i: usize| i as f64 / last as f64;
            let diameters: Vec<f64> = (0..n)
                .map(|i| match i {
                    0 => lo,
                    i if i == last => hi,
                    i => match splitting {
                        Splitting::LinearSplitting => lo + (hi - lo) * step(i),
                        Splitting::LogSplitting => (lo.ln() + (hi.ln() - lo.ln()) * step(i)).exp(),
                    },
                })
                .collect();
            if !diameters.windows(2).all(|w| w[0] < w[1]) {
                return Err(invalid(
                    functional_type,
                    format!("range {lo}..{hi} is too narrow for {n} distinct classes"),
                ));
            }
            Ok(diameters)
        }
    }
}

/// A plankton parameter that is either shared by every class of a type or
/// scales with diameter.
///
/// Deserializes from a bare number or from `{ "a": .., "b": .. }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SizeDependent {
    /// The same value for every class.
    Constant(f64),
    /// `a · diameter^b`.
    Allometric {
        /// Scale.
        a: f64,
        /// Exponent.
        b: f64,
    },
}

impl SizeDependent {
    /// Value for a class of the given diameter.
    #[must_use]
    pub fn value_for(&self, diameter: f64) -> f64 {
        match *self {
            SizeDependent::Constant(v) => v,
            SizeDependent::Allometric { a, b } => scale(a, b, diameter),
        }
    }
}

impl From<f64> for SizeDependent {
    fn from(value: f64) -> Self {
        SizeDependent::Constant(value)
    }
}
