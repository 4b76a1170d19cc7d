//! Predator-prey interaction matrices.
//!
//! Rows are predators, columns are prey, both over the full class set in
//! class order. Two matrices exist: palatability and assimilation
//! efficiency. A caller-supplied matrix replaces derivation for that matrix
//! entirely; there is no per-cell merge.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tidepool_library::allometry::{
    allometric_palatability_unimodal_protection, assimilation_efficiency_emergent_binary,
    PredatorTraits, PreyTraits,
};

use crate::classes::{ClassSet, FunctionalType, SizeClass};
use crate::error::ConstructError;

/// Matrix label used in names and errors.
pub const PALATABILITY: &str = "palatability";
/// Matrix label used in names and errors.
pub const ASSIMILATION_EFFICIENCY: &str = "assimilation_efficiency";

/// Feeding behaviour of one functional type (or one class).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeedingTraits {
    /// Whether the class feeds.
    pub can_eat: bool,
    /// Whether the class can be fed on.
    pub can_be_eaten: bool,
    /// Predator/prey diameter ratio of peak palatability.
    #[serde(default)]
    pub optimum_predator_prey_ratio: f64,
    /// Width exponent of the palatability curve, `>= 0`.
    #[serde(default)]
    pub specificity: f64,
    /// Prey protection in `[0, 1]`; absent means unprotected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protection: Option<f64>,
    /// Fraction of ingested prey assimilated, in `[0, 1]`.
    #[serde(default)]
    pub assimilation_efficiency: f64,
}

impl FeedingTraits {
    /// Default phytoplankton traits: eaten, never eating.
    #[must_use]
    pub fn phytoplankton() -> Self {
        FeedingTraits {
            can_eat: false,
            can_be_eaten: true,
            optimum_predator_prey_ratio: 0.0,
            specificity: 0.0,
            protection: None,
            assimilation_efficiency: 0.0,
        }
    }

    /// Default zooplankton traits: eating, never eaten.
    #[must_use]
    pub fn zooplankton() -> Self {
        FeedingTraits {
            can_eat: true,
            can_be_eaten: false,
            optimum_predator_prey_ratio: 10.0,
            specificity: 0.3,
            protection: None,
            assimilation_efficiency: 0.32,
        }
    }

    fn check(owner: &str, field: &str, value: f64, ok: bool, reason: &'static str) -> Result<(), ConstructError> {
        if ok {
            Ok(())
        } else {
            Err(ConstructError::InvalidParameter {
                name: format!("{field}_{owner}"),
                value,
                reason,
            })
        }
    }

    /// Checks the traits palatability is derived from.
    fn validate_palatability(&self, owner: &str) -> Result<(), ConstructError> {
        let protection = self.protection.unwrap_or(1.0);
        Self::check(owner, "protection", protection, (0.0..=1.0).contains(&protection), "must lie in [0, 1]")?;
        Self::check(
            owner,
            "specificity",
            self.specificity,
            self.specificity.is_finite() && self.specificity >= 0.0,
            "must be finite and non-negative",
        )?;
        Self::check(
            owner,
            "optimum_predator_prey_ratio",
            self.optimum_predator_prey_ratio,
            self.optimum_predator_prey_ratio.is_finite(),
            "must be finite",
        )
    }

    /// Checks the traits assimilation efficiency is derived from.
    fn validate_assimilation(&self, owner: &str) -> Result<(), ConstructError> {
        Self::check(
            owner,
            "assimilation_efficiency",
            self.assimilation_efficiency,
            (0.0..=1.0).contains(&self.assimilation_efficiency),
            "must lie in [0, 1]",
        )
    }
}

/// Arguments from which both matrices are derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InteractionArgs {
    /// Traits shared by every phytoplankton class.
    pub phytoplankton: FeedingTraits,
    /// Traits shared by every zooplankton class.
    pub zooplankton: FeedingTraits,
    /// Per-class replacements, keyed by class name.
    pub per_class: BTreeMap<String, FeedingTraits>,
    /// Keep diagonal entries instead of forcing them to zero.
    pub allow_self_predation: bool,
}

impl Default for InteractionArgs {
    fn default() -> Self {
        InteractionArgs {
            phytoplankton: FeedingTraits::phytoplankton(),
            zooplankton: FeedingTraits::zooplankton(),
            per_class: BTreeMap::new(),
            allow_self_predation: false,
        }
    }
}

impl InteractionArgs {
    fn traits_of(&self, class: &SizeClass) -> FeedingTraits {
        self.per_class.get(class.name()).copied().unwrap_or(match class.functional_type() {
            FunctionalType::Phytoplankton => self.phytoplankton,
            FunctionalType::Zooplankton => self.zooplankton,
        })
    }
}

/// A square, name-indexed matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MatrixRows", into = "MatrixRows")]
pub struct InteractionMatrix {
    names: Vec<String>,
    values: Vec<f64>,
    index: HashMap<String, usize>,
}

/// Serialized form of an [`InteractionMatrix`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatrixRows {
    /// Class names labelling both rows and columns.
    pub names: Vec<String>,
    /// One row per predator.
    pub rows: Vec<Vec<f64>>,
}

impl TryFrom<MatrixRows> for InteractionMatrix {
    type Error = ConstructError;

    fn try_from(rows: MatrixRows) -> Result<Self, Self::Error> {
        InteractionMatrix::from_rows("interaction", rows.names, &rows.rows)
    }
}

impl From<InteractionMatrix> for MatrixRows {
    fn from(matrix: InteractionMatrix) -> Self {
        let n = matrix.names.len();
        MatrixRows {
            rows: (0..n).map(|i| matrix.values[i * n..(i + 1) * n].to_vec()).collect(),
            names: matrix.names,
        }
    }
}

impl InteractionMatrix {
    /// Builds a matrix from labelled rows.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructError::MatrixDimension`] if the rows do not form
    /// an `n × n` table for `n` names, and
    /// [`ConstructError::MatrixUnexpectedClass`] for a repeated name.
    pub fn from_rows(
        matrix: &'static str,
        names: Vec<String>,
        rows: &[Vec<f64>],
    ) -> Result<Self, ConstructError> {
        let n = names.len();
        for row in 0..rows.len().max(n) {
            let columns = rows.get(row).map_or(0, Vec::len);
            if row >= n || columns != n {
                return Err(ConstructError::MatrixDimension {
                    matrix,
                    rows: n,
                    row,
                    columns,
                });
            }
        }
        let mut index = HashMap::with_capacity(n);
        for (i, name) in names.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(ConstructError::MatrixUnexpectedClass {
                    matrix,
                    class: name.clone(),
                });
            }
        }
        Ok(InteractionMatrix {
            names,
            values: rows.concat(),
            index,
        })
    }

    fn zeros(classes: &ClassSet) -> Self {
        let names: Vec<String> = classes.names().map(str::to_owned).collect();
        let index = names.iter().enumerate().map(|(i, n)| (n.clone(), i)).collect();
        InteractionMatrix {
            values: vec![0.0; names.len() * names.len()],
            names,
            index,
        }
    }

    /// Row and column labels.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Side length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the matrix has no classes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Entry for `(predator, prey)`.
    #[must_use]
    pub fn get(&self, predator: &str, prey: &str) -> Option<f64> {
        let i = *self.index.get(predator)?;
        let j = *self.index.get(prey)?;
        Some(self.values[i * self.len() + j])
    }

    /// Entry by position.
    #[must_use]
    pub fn at(&self, row: usize, column: usize) -> f64 {
        self.values[row * self.len() + column]
    }

    /// One predator's row.
    #[must_use]
    pub fn row(&self, row: usize) -> &[f64] {
        let n = self.len();
        &self.values[row * n..(row + 1) * n]
    }

    fn set(&mut self, row: usize, column: usize, value: f64) {
        let n = self.len();
        self.values[row * n + column] = value;
    }

    /// Checks labels against `classes` and entries against `[0, 1]`.
    fn check_against(&self, matrix: &'static str, classes: &ClassSet) -> Result<(), ConstructError> {
        for class in classes.names() {
            if !self.index.contains_key(class) {
                return Err(ConstructError::MatrixMissingClass {
                    matrix,
                    class: class.to_owned(),
                });
            }
        }
        if let Some(extra) = self.names.iter().find(|n| classes.get(n).is_none()) {
            return Err(ConstructError::MatrixUnexpectedClass {
                matrix,
                class: extra.clone(),
            });
        }
        for (position, (expected, found)) in classes.names().zip(&self.names).enumerate() {
            if expected != found {
                return Err(ConstructError::MatrixOrder {
                    matrix,
                    position,
                    expected: expected.to_owned(),
                    found: found.clone(),
                });
            }
        }
        let n = self.len();
        if let Some(k) = self.values.iter().position(|v| !(0.0..=1.0).contains(v)) {
            return Err(ConstructError::MatrixEntry {
                matrix,
                predator: self.names[k / n].clone(),
                prey: self.names[k % n].clone(),
                value: self.values[k],
            });
        }
        Ok(())
    }
}

fn validated_traits(
    classes: &ClassSet,
    args: &InteractionArgs,
    validate: fn(&FeedingTraits, &str) -> Result<(), ConstructError>,
) -> Result<Vec<FeedingTraits>, ConstructError> {
    if let Some(unknown) = args.per_class.keys().find(|k| classes.get(k).is_none()) {
        return Err(ConstructError::UnknownClass {
            class: unknown.clone(),
            context: "interaction_args.per_class",
        });
    }
    classes
        .classes()
        .iter()
        .map(|class| {
            let traits = args.traits_of(class);
            validate(&traits, class.name())?;
            Ok(traits)
        })
        .collect()
}

/// Visits every (predator, prey) pair except the diagonal, unless self
/// predation is allowed.
fn fill(
    classes: &ClassSet,
    args: &InteractionArgs,
    traits: &[FeedingTraits],
    entry: impl Fn(&SizeClass, &FeedingTraits, &SizeClass, &FeedingTraits) -> f64,
) -> InteractionMatrix {
    let mut matrix = InteractionMatrix::zeros(classes);
    for (i, predator) in classes.classes().iter().enumerate() {
        for (j, prey) in classes.classes().iter().enumerate() {
            if i == j && !args.allow_self_predation {
                continue;
            }
            matrix.set(i, j, entry(predator, &traits[i], prey, &traits[j]));
        }
    }
    matrix
}

fn derive_palatability(classes: &ClassSet, args: &InteractionArgs) -> Result<InteractionMatrix, ConstructError> {
    let traits = validated_traits(classes, args, FeedingTraits::validate_palatability)?;
    Ok(fill(classes, args, &traits, |predator, pt, prey, qt| {
        allometric_palatability_unimodal_protection(
            &PreyTraits {
                can_be_eaten: qt.can_be_eaten,
                diameter: prey.diameter(),
                protection: qt.protection.unwrap_or(1.0),
            },
            &PredatorTraits {
                can_eat: pt.can_eat,
                diameter: predator.diameter(),
                optimum_predator_prey_ratio: pt.optimum_predator_prey_ratio,
                specificity: pt.specificity,
            },
        )
    }))
}

fn derive_assimilation(classes: &ClassSet, args: &InteractionArgs) -> Result<InteractionMatrix, ConstructError> {
    let traits = validated_traits(classes, args, FeedingTraits::validate_assimilation)?;
    Ok(fill(classes, args, &traits, |_, pt, _, qt| {
        assimilation_efficiency_emergent_binary(pt.can_eat, qt.can_be_eaten, pt.assimilation_efficiency)
    }))
}

/// Derives palatability and assimilation efficiency from diameters and
/// feeding traits.
///
/// # Errors
///
/// Returns [`ConstructError::UnknownClass`] for a per-class entry naming no
/// class and [`ConstructError::InvalidParameter`] for traits outside their
/// ranges.
pub fn build_matrices(
    classes: &ClassSet,
    args: &InteractionArgs,
) -> Result<(InteractionMatrix, InteractionMatrix), ConstructError> {
    Ok((derive_palatability(classes, args)?, derive_assimilation(classes, args)?))
}

/// Resolves both matrices: a supplied matrix is checked and used verbatim,
/// an absent one is derived from `args`. Only the traits feeding a derived
/// matrix are validated.
///
/// # Errors
///
/// Returns the first mismatch between a supplied matrix and the class set
/// (missing, unexpected or reordered class; entry outside `[0, 1]`), or
/// the errors of [`build_matrices`] for the traits a derived matrix needs.
pub fn resolve_matrices(
    classes: &ClassSet,
    args: &InteractionArgs,
    palatability: Option<&InteractionMatrix>,
    assimilation_efficiency: Option<&InteractionMatrix>,
) -> Result<(InteractionMatrix, InteractionMatrix), ConstructError> {
    if let Some(m) = palatability {
        m.check_against(PALATABILITY, classes)?;
    }
    if let Some(m) = assimilation_efficiency {
        m.check_against(ASSIMILATION_EFFICIENCY, classes)?;
    }
    let palatability = match palatability {
        Some(m) => m.clone(),
        None => derive_palatability(classes, args)?,
    };
    let assimilation_efficiency = match assimilation_efficiency {
        Some(m) => m.clone(),
        None => derive_assimilation(classes, args)?,
    };
    Ok((palatability, assimilation_efficiency))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tidepool_compiler::ErrorKind;

    fn classes() -> ClassSet {
        ClassSet::new(&[2.0, 10.0], &[20.0, 100.0])
    }

    #[test]
    fn default_matrices_are_well_formed() {
        let set = classes();
        let (p, a) = build_matrices(&set, &InteractionArgs::default()).unwrap();
        assert_eq!(p.names(), ["P1", "P2", "Z1", "Z2"]);
        for (i, row) in set.classes().iter().enumerate() {
            if row.functional_type() == FunctionalType::Phytoplankton {
                assert!(p.row(i).iter().all(|&v| v == 0.0), "{} eats", row.name());
            }
            assert_eq!(p.at(i, i), 0.0);
        }
        assert_eq!(p.get("Z1", "P1"), Some(1.0));
        assert_eq!(a.get("Z1", "P1"), Some(0.32));
        assert_eq!(a.get("Z1", "Z2"), Some(0.0));
    }

    #[test]
    fn self_predation_is_opt_in() {
        let set = ClassSet::new(&[2.0], &[20.0]);
        let mut args = InteractionArgs::default();
        args.zooplankton.can_be_eaten = true;
        let (p, _) = build_matrices(&set, &args).unwrap();
        assert_eq!(p.get("Z1", "Z1"), Some(0.0));
        args.allow_self_predation = true;
        let (p, _) = build_matrices(&set, &args).unwrap();
        assert!(p.get("Z1", "Z1").unwrap() > 0.0);
    }

    #[test]
    fn per_class_traits_must_name_a_class() {
        let mut args = InteractionArgs::default();
        args.per_class.insert("Z9".into(), FeedingTraits::zooplankton());
        let err = build_matrices(&classes(), &args).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(matches!(err, ConstructError::UnknownClass { ref class, .. } if class == "Z9"));
    }

    #[test]
    fn protection_is_range_checked() {
        let mut args = InteractionArgs::default();
        args.phytoplankton.protection = Some(1.5);
        let err = build_matrices(&classes(), &args).unwrap_err();
        assert!(matches!(err, ConstructError::InvalidParameter { ref name, .. } if name == "protection_P1"));
    }

    #[test]
    fn supplied_matrix_must_match_classes() {
        let set = classes();
        let names = |ns: &[&str]| ns.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        let three = InteractionMatrix::from_rows(
            PALATABILITY,
            names(&["P1", "P2", "Z1"]),
            &[vec![0.0; 3], vec![0.0; 3], vec![0.0; 3]],
        )
        .unwrap();
        let err = resolve_matrices(&set, &InteractionArgs::default(), Some(&three), None).unwrap_err();
        assert_eq!(
            err,
            ConstructError::MatrixMissingClass {
                matrix: PALATABILITY,
                class: "Z2".into()
            }
        );

        let swapped = InteractionMatrix::from_rows(
            PALATABILITY,
            names(&["P2", "P1", "Z1", "Z2"]),
            &vec![vec![0.0; 4]; 4],
        )
        .unwrap();
        assert!(matches!(
            resolve_matrices(&set, &InteractionArgs::default(), Some(&swapped), None),
            Err(ConstructError::MatrixOrder { position: 0, .. })
        ));
    }

    #[test]
    fn supplied_matrix_is_used_verbatim() {
        let set = classes();
        let mut rows = vec![vec![0.0; 4]; 4];
        rows[3][0] = 0.5;
        let names = set.names().map(str::to_owned).collect();
        let supplied = InteractionMatrix::from_rows(PALATABILITY, names, &rows).unwrap();
        let mut args = InteractionArgs::default();
        args.zooplankton.specificity = f64::NAN;
        args.phytoplankton.protection = Some(2.0);
        let (p, a) = resolve_matrices(&set, &args, Some(&supplied), None).unwrap();
        assert_eq!(p, supplied);
        assert_eq!(a.get("Z2", "P1"), Some(0.32));

        // Assimilation efficiency is still derived, so its traits are checked.
        args.zooplankton.assimilation_efficiency = 1.5;
        let err = resolve_matrices(&set, &args, Some(&supplied), None).unwrap_err();
        assert!(matches!(err, ConstructError::InvalidParameter { ref name, .. } if name == "assimilation_efficiency_Z1"));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = serde_json::from_str::<InteractionMatrix>(
            r#"{"names": ["P1", "Z1"], "rows": [[0.0, 0.0], [1.0]]}"#,
        );
        assert!(err.is_err());
        let ok: InteractionMatrix = serde_json::from_str(
            r#"{"names": ["P1", "Z1"], "rows": [[0.0, 0.0], [1.0, 0.0]]}"#,
        )
        .unwrap();
        assert_eq!(ok.get("Z1", "P1"), Some(1.0));
    }
}
