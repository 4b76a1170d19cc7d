//! Size classes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The two plankton functional types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionalType {
    /// Primary producers; names start with `P`.
    Phytoplankton,
    /// Grazers; names start with `Z`.
    Zooplankton,
}

impl FunctionalType {
    /// Prefix of class names of this type.
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            FunctionalType::Phytoplankton => "P",
            FunctionalType::Zooplankton => "Z",
        }
    }
}

impl fmt::Display for FunctionalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FunctionalType::Phytoplankton => "phytoplankton",
            FunctionalType::Zooplankton => "zooplankton",
        })
    }
}

/// One plankton size class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeClass {
    name: String,
    functional_type: FunctionalType,
    diameter: f64,
    ordinal: usize,
}

impl SizeClass {
    /// Class name, e.g. `P1`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Functional type.
    #[must_use]
    pub fn functional_type(&self) -> FunctionalType {
        self.functional_type
    }

    /// Equivalent spherical diameter.
    #[must_use]
    pub fn diameter(&self) -> f64 {
        self.diameter
    }

    /// 1-based position within its functional type.
    #[must_use]
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }
}

/// Every class of a model: phytoplankton first, then zooplankton, each in
/// ordinal order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassSet {
    classes: Vec<SizeClass>,
    n_phyto: usize,
}

impl ClassSet {
    /// Builds classes from per-type diameters.
    #[must_use]
    pub fn new(phyto_diameters: &[f64], zoo_diameters: &[f64]) -> Self {
        let make = |functional_type: FunctionalType, diameters: &[f64]| {
            diameters
                .iter()
                .enumerate()
                .map(move |(i, &diameter)| SizeClass {
                    name: format!("{}{}", functional_type.prefix(), i + 1),
                    functional_type,
                    diameter,
                    ordinal: i + 1,
                })
                .collect::<Vec<_>>()
        };
        let mut classes = make(FunctionalType::Phytoplankton, phyto_diameters);
        classes.extend(make(FunctionalType::Zooplankton, zoo_diameters));
        ClassSet {
            classes,
            n_phyto: phyto_diameters.len(),
        }
    }

    /// All classes.
    #[must_use]
    pub fn classes(&self) -> &[SizeClass] {
        &self.classes
    }

    /// Phytoplankton classes.
    #[must_use]
    pub fn phytoplankton(&self) -> &[SizeClass] {
        &self.classes[..self.n_phyto]
    }

    /// Zooplankton classes.
    #[must_use]
    pub fn zooplankton(&self) -> &[SizeClass] {
        &self.classes[self.n_phyto..]
    }

    /// Class names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(SizeClass::name)
    }

    /// Looks up a class by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SizeClass> {
        self.classes.iter().find(|c| c.name == name)
    }

    /// Number of classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
