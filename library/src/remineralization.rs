//! Remineralization of detritus into dissolved nutrients.

/// Idealized remineralization, `r · D`.
///
/// # Arguments
///
/// - `d`: detritus concentration
/// - `r`: remineralization rate
#[must_use]
pub fn remineralization_idealized(d: f64, r: f64) -> f64 {
    r * d
}
