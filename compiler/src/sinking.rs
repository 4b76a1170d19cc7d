//! Downward sinking of particulate tracers.
//!
//! Sinking is upwind advection at a fixed speed `w > 0`. Each tracer that
//! sinks carries a [`SinkingProfile`]: the speed on every face of the
//! vertical grid, precomputed once. The flux through a face is
//! `w_face · c_above`; the tendency of cell `k` is
//! `(w_{k+1} · c_{k+1} − w_k · c_k) / Δz_k`, with `c_{k+1} = 0` at the surface.

use crate::grid::VerticalGrid;

/// Default distance over which a closed bottom ramps the speed to zero.
pub const DEFAULT_SMOOTHING_DISTANCE: f64 = 2.0;

/// Face speeds of one sinking tracer.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkingProfile {
    speed: f64,
    face_speeds: Vec<f64>,
    spacing: Vec<f64>,
}

impl SinkingProfile {
    /// Precomputes face speeds for `speed` on `grid`.
    ///
    /// With `open_bottom` every face below the surface carries `speed` and
    /// material leaves through the bottom. Otherwise the speed on a face at
    /// height `z` is `speed · tanh(max(0, (z − z_bottom) / smoothing_distance))`,
    /// which is exactly zero on the bottom face. The surface face never
    /// carries flux.
    #[must_use]
    pub fn new(speed: f64, grid: &VerticalGrid, open_bottom: bool, smoothing_distance: f64) -> Self {
        let faces = grid.faces();
        let surface = faces.len() - 1;
        let bottom = grid.bottom();
        let face_speeds = faces
            .iter()
            .enumerate()
            .map(|(k, &z)| {
                if k == surface {
                    0.0
                } else if open_bottom {
                    speed
                } else {
                    speed * ((z - bottom) / smoothing_distance).max(0.0).tanh()
                }
            })
            .collect();
        let spacing = (0..grid.levels()).map(|k| grid.spacing(k)).collect();
        SinkingProfile {
            speed,
            face_speeds,
            spacing,
        }
    }

    /// Configured speed.
    #[must_use]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Effective speed on the bottom face of cell `level`.
    #[must_use]
    pub fn speed_at(&self, level: usize) -> Option<f64> {
        self.face_speeds.get(level).copied()
    }

    /// Number of cells the profile covers.
    #[must_use]
    pub fn levels(&self) -> usize {
        self.spacing.len()
    }

    /// Sinking tendency of cell `level` given the concentration there and
    /// in the cell above (`None` at the surface).
    #[must_use]
    pub fn divergence(&self, level: usize, here: f64, above: Option<f64>) -> f64 {
        let inflow = self.face_speeds[level + 1] * above.unwrap_or(0.0);
        let outflow = self.face_speeds[level] * here;
        (inflow - outflow) / self.spacing[level]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn grid() -> VerticalGrid {
        VerticalGrid::uniform(40.0, 4).unwrap()
    }

    #[test]
    fn open_bottom_keeps_the_configured_speed() {
        let p = SinkingProfile::new(3.0, &grid(), true, DEFAULT_SMOOTHING_DISTANCE);
        assert_eq!(p.speed_at(0), Some(3.0));
        assert_eq!(p.speed_at(2), Some(3.0));
        assert_eq!(p.speed_at(4), Some(0.0));
    }

    #[test]
    fn closed_bottom_ramps_to_zero() {
        let p = SinkingProfile::new(3.0, &grid(), false, DEFAULT_SMOOTHING_DISTANCE);
        assert_eq!(p.speed_at(0), Some(0.0));
        let interior = p.speed_at(1).unwrap();
        assert!(interior > 0.0 && interior <= 3.0);
    }

    #[test]
    fn closed_column_conserves_mass() {
        let g = grid();
        let p = SinkingProfile::new(3.0, &g, false, DEFAULT_SMOOTHING_DISTANCE);
        let c = [0.4, 1.0, 2.0, 0.5];
        let total: f64 = (0..4)
            .map(|k| p.divergence(k, c[k], c.get(k + 1).copied()) * g.spacing(k))
            .sum();
        assert!(total.abs() < 1e-12, "column total {total}");
    }

    #[test]
    fn open_column_loses_through_the_bottom() {
        let g = grid();
        let p = SinkingProfile::new(3.0, &g, true, DEFAULT_SMOOTHING_DISTANCE);
        let c = [1.0; 4];
        let total: f64 = (0..4)
            .map(|k| p.divergence(k, c[k], c.get(k + 1).copied()) * g.spacing(k))
            .sum();
        assert!((total + 3.0).abs() < 1e-12);
    }
}
