//! One-dimensional vertical grids.

use serde::{Deserialize, Serialize};

use crate::error::CompileError;

/// A vertical column of cells described by its face heights.
///
/// Faces run bottom to top and are strictly increasing; `z` is height, so a
/// column of depth 100 m spans faces `-100 ..= 0`. Cell `k` lies between
/// faces `k` and `k + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GridSpec", into = "GridSpec")]
pub struct VerticalGrid {
    faces: Vec<f64>,
}

/// Serialized form of a [`VerticalGrid`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GridSpec {
    /// `levels` equal cells from `-depth` to the surface.
    Uniform {
        /// Total depth, positive.
        depth: f64,
        /// Number of cells.
        levels: usize,
    },
    /// Explicit face heights, bottom to top.
    Faces {
        /// Face heights.
        faces: Vec<f64>,
    },
}

impl TryFrom<GridSpec> for VerticalGrid {
    type Error = CompileError;

    fn try_from(spec: GridSpec) -> Result<Self, Self::Error> {
        match spec {
            GridSpec::Uniform { depth, levels } => VerticalGrid::uniform(depth, levels),
            GridSpec::Faces { faces } => VerticalGrid::from_faces(faces),
        }
    }
}

impl From<VerticalGrid> for GridSpec {
    fn from(grid: VerticalGrid) -> Self {
        GridSpec::Faces { faces: grid.faces }
    }
}

impl VerticalGrid {
    /// `levels` cells of equal thickness between `-depth` and 0.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::InvalidGrid`] if `depth` is not positive and
    /// finite or `levels` is 0.
    pub fn uniform(depth: f64, levels: usize) -> Result<Self, CompileError> {
        if !(depth.is_finite() && depth > 0.0) {
            return Err(CompileError::InvalidGrid {
                reason: format!("depth must be positive and finite, got {depth}"),
            });
        }
        if levels == 0 {
            return Err(CompileError::InvalidGrid {
                reason: "a grid needs at least one level".into(),
            });
        }
        let dz = depth / levels as f64;
        let faces = (0..=levels)
            .map(|k| if k == levels { 0.0 } else { -depth + dz * k as f64 })
            .collect();
        Ok(VerticalGrid { faces })
    }

    /// A grid with explicit face heights, bottom to top.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::InvalidGrid`] if fewer than two faces are
    /// given, any face is not finite, or faces are not strictly increasing.
    pub fn from_faces(faces: Vec<f64>) -> Result<Self, CompileError> {
        if faces.len() < 2 {
            return Err(CompileError::InvalidGrid {
                reason: format!("need at least two faces, got {}", faces.len()),
            });
        }
        if let Some(bad) = faces.iter().find(|f| !f.is_finite()) {
            return Err(CompileError::InvalidGrid {
                reason: format!("face height {bad} is not finite"),
            });
        }
        if let Some(k) = faces.windows(2).position(|w| w[1] <= w[0]) {
            return Err(CompileError::InvalidGrid {
                reason: format!(
                    "faces must increase upward, but face {} ({}) is not above face {k} ({})",
                    k + 1,
                    faces[k + 1],
                    faces[k]
                ),
            });
        }
        Ok(VerticalGrid { faces })
    }

    /// Number of cells.
    #[must_use]
    pub fn levels(&self) -> usize {
        self.faces.len() - 1
    }

    /// Face heights, bottom to top.
    #[must_use]
    pub fn faces(&self) -> &[f64] {
        &self.faces
    }

    /// Height of the bottom face.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.faces[0]
    }

    /// Thickness of cell `level`.
    #[must_use]
    pub fn spacing(&self, level: usize) -> f64 {
        self.faces[level + 1] - self.faces[level]
    }

    /// Height of the centre of cell `level`.
    #[must_use]
    pub fn centre(&self, level: usize) -> f64 {
        0.5 * (self.faces[level] + self.faces[level + 1])
    }
}
