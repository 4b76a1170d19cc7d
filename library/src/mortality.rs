//! Mortality losses.

/// Linear mortality, `l · P`.
///
/// Constant per-capita mortality; often read as a closure term for
/// low-density predation and other death terms.
#[must_use]
pub fn linear_loss(p: f64, l: f64) -> f64 {
    l * p
}

/// Quadratic mortality, `l · P²`.
///
/// Mortality that grows with biomass; usually read as viral lysis and
/// unresolved density-dependent predation.
#[must_use]
pub fn quadratic_loss(p: f64, l: f64) -> f64 {
    l * p * p
}
