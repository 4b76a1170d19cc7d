//! Spatial and temporal coordinates seen by compiled tracer functions.

use serde::{Deserialize, Serialize};

/// Names reserved for coordinates, in slot order.
pub const COORDINATE_NAMES: [&str; 4] = ["x", "y", "z", "t"];

/// One of the four coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Coordinate {
    /// Zonal position.
    X,
    /// Meridional position.
    Y,
    /// Height (negative below the surface).
    Z,
    /// Time.
    T,
}

impl Coordinate {
    /// Resolves a reserved coordinate name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "x" => Some(Coordinate::X),
            "y" => Some(Coordinate::Y),
            "z" => Some(Coordinate::Z),
            "t" => Some(Coordinate::T),
            _ => None,
        }
    }

    /// The reserved name.
    #[must_use]
    pub fn name(self) -> &'static str {
        COORDINATE_NAMES[self as usize]
    }
}

/// A point in space and time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Zonal position.
    pub x: f64,
    /// Meridional position.
    pub y: f64,
    /// Height.
    pub z: f64,
    /// Time.
    pub t: f64,
}

impl Coordinates {
    /// A point at height `z` and time `t` on the column axis.
    #[must_use]
    pub fn at(z: f64, t: f64) -> Self {
        Coordinates { z, t, ..Self::default() }
    }

    /// Reads one coordinate.
    #[must_use]
    pub fn get(&self, coordinate: Coordinate) -> f64 {
        match coordinate {
            Coordinate::X => self.x,
            Coordinate::Y => self.y,
            Coordinate::Z => self.z,
            Coordinate::T => self.t,
        }
    }
}

/// Where in a vertical column a point sits.
///
/// `above` holds the tracer values of the cell directly above `level`, or
/// `None` at the surface cell.
#[derive(Debug, Clone, Copy)]
pub struct Column<'a> {
    /// Cell index, 0 at the bottom.
    pub level: usize,
    /// Tracer values one cell up, in declared tracer order.
    pub above: Option<&'a [f64]>,
}
