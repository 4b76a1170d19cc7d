//! Typed parameter records and their flattening into named scalars.
//!
//! Each functional type has one record; fields are [`SizeDependent`] so a
//! value can be shared across classes or scale with diameter. Records are
//! plain values: overriding a default builds a new record and never
//! touches a shared one.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::allometry::SizeDependent;
use crate::classes::SizeClass;
use crate::error::ConstructError;

/// Which light-limitation formulation drives photosynthetic growth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightLimitation {
    /// Smith (1936), parameterised by the initial slope `alpha`.
    #[default]
    Smith,
    /// Geider et al. (1998), parameterised by photosynthetic slope and
    /// chlorophyll to carbon ratio.
    Geider,
}

/// Phytoplankton parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhytoplanktonArgs {
    /// Maximum growth rate (s⁻¹).
    pub maximum_growth_rate: SizeDependent,
    /// Nutrient half saturation (mmol N m⁻³).
    pub nutrient_half_saturation: SizeDependent,
    /// Linear mortality rate (s⁻¹).
    pub linear_mortality: SizeDependent,
    /// Quadratic mortality rate (m³ mmol N⁻¹ s⁻¹).
    pub quadratic_mortality: SizeDependent,
    /// Initial slope of the Smith light response.
    pub alpha: SizeDependent,
    /// Initial photosynthetic slope of the Geider light response.
    pub photosynthetic_slope: SizeDependent,
    /// Chlorophyll to carbon ratio of the Geider light response.
    pub chlorophyll_to_carbon_ratio: SizeDependent,
}

impl Default for PhytoplanktonArgs {
    fn default() -> Self {
        PhytoplanktonArgs {
            maximum_growth_rate: SizeDependent::Allometric { a: 2.3148e-5, b: -0.15 },
            nutrient_half_saturation: SizeDependent::Allometric { a: 0.17, b: 0.27 },
            linear_mortality: SizeDependent::Constant(8e-7),
            quadratic_mortality: SizeDependent::Constant(0.0),
            alpha: SizeDependent::Constant(2.2604e-6),
            photosynthetic_slope: SizeDependent::Constant(4.6e-6),
            chlorophyll_to_carbon_ratio: SizeDependent::Constant(0.1),
        }
    }
}

/// Zooplankton parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ZooplanktonArgs {
    /// Maximum predation rate (s⁻¹).
    pub maximum_predation_rate: SizeDependent,
    /// Prey density at half the maximum predation rate (mmol N m⁻³).
    pub holling_half_saturation: SizeDependent,
    /// Linear mortality rate (s⁻¹).
    pub linear_mortality: SizeDependent,
    /// Quadratic mortality rate (m³ mmol N⁻¹ s⁻¹).
    pub quadratic_mortality: SizeDependent,
}

impl Default for ZooplanktonArgs {
    fn default() -> Self {
        ZooplanktonArgs {
            maximum_predation_rate: SizeDependent::Allometric { a: 3.5694e-4, b: -0.16 },
            holling_half_saturation: SizeDependent::Constant(5.0),
            linear_mortality: SizeDependent::Constant(8e-7),
            quadratic_mortality: SizeDependent::Constant(1e-6),
        }
    }
}

/// Nutrient and detritus parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BiogeochemistryArgs {
    /// Detritus remineralization rate (s⁻¹).
    pub detritus_remineralization: f64,
}

impl Default for BiogeochemistryArgs {
    fn default() -> Self {
        BiogeochemistryArgs {
            detritus_remineralization: 1.4039e-6,
        }
    }
}

impl PhytoplanktonArgs {
    /// `(field, value)` pairs, in declaration order, for one class.
    #[must_use]
    pub fn values_for(&self, class: &SizeClass) -> Vec<(&'static str, f64)> {
        let d = class.diameter();
        vec![
            ("maximum_growth_rate", self.maximum_growth_rate.value_for(d)),
            ("nutrient_half_saturation", self.nutrient_half_saturation.value_for(d)),
            ("linear_mortality", self.linear_mortality.value_for(d)),
            ("quadratic_mortality", self.quadratic_mortality.value_for(d)),
            ("alpha", self.alpha.value_for(d)),
            ("photosynthetic_slope", self.photosynthetic_slope.value_for(d)),
            ("chlorophyll_to_carbon_ratio", self.chlorophyll_to_carbon_ratio.value_for(d)),
        ]
    }
}

impl ZooplanktonArgs {
    /// `(field, value)` pairs, in declaration order, for one class.
    #[must_use]
    pub fn values_for(&self, class: &SizeClass) -> Vec<(&'static str, f64)> {
        let d = class.diameter();
        vec![
            ("maximum_predation_rate", self.maximum_predation_rate.value_for(d)),
            ("holling_half_saturation", self.holling_half_saturation.value_for(d)),
            ("linear_mortality", self.linear_mortality.value_for(d)),
            ("quadratic_mortality", self.quadratic_mortality.value_for(d)),
        ]
    }
}

impl BiogeochemistryArgs {
    /// `(field, value)` pairs in declaration order.
    #[must_use]
    pub fn values(&self) -> Vec<(&'static str, f64)> {
        vec![("detritus_remineralization", self.detritus_remineralization)]
    }
}

/// Name of the per-class scalar for `field`.
#[must_use]
pub fn class_parameter(field: &str, class: &str) -> String {
    format!("{field}_{class}")
}

/// Name of the scalar for a matrix entry.
#[must_use]
pub fn pair_parameter(matrix: &str, predator: &str, prey: &str) -> String {
    format!("{matrix}_{predator}_{prey}")
}

/// Flattened scalar parameters in registration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(into = "Vec<(String, f64)>")]
pub struct ParameterSet {
    entries: Vec<(String, f64)>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl From<ParameterSet> for Vec<(String, f64)> {
    fn from(set: ParameterSet) -> Self {
        set.entries
    }
}

impl ParameterSet {
    /// An empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name = value`. Registering an existing name again with the
    /// same value is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructError::ParameterConflict`] if `name` is already
    /// bound to a different value.
    pub fn register(&mut self, name: impl Into<String>, value: f64) -> Result<(), ConstructError> {
        let name = name.into();
        if let Some(&i) = self.index.get(&name) {
            let existing = self.entries[i].1;
            if existing.to_bits() == value.to_bits() {
                return Ok(());
            }
            return Err(ConstructError::ParameterConflict {
                name,
                existing,
                new: value,
            });
        }
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push((name, value));
        Ok(())
    }

    /// Value bound to `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.index.get(name).map(|&i| self.entries[i].1)
    }

    /// Whether `name` is bound.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// `(name, value)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
