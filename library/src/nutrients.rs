//! Nutrient limitation.

/// Monod formulation of nutrient limitation, `R / (kᵣ + R)`.
///
/// Based on Michaelis-Menten enzyme kinetics. The same shape is used for
/// predation as the Holling type II response.
///
/// # Arguments
///
/// - `r`: nutrient concentration (e.g. N, P, Si)
/// - `k`: nutrient half saturation constant
#[must_use]
pub fn monod_limitation(r: f64, k: f64) -> f64 {
    r / (k + r)
}
