//! Predation.
//!
//! The *idealized* kernels describe a single predator feeding on a single
//! prey; the *preferential* kernels add a palatability weight so a predator
//! can feed unevenly across many prey. For every formulation
//! `loss = gain + assimilation_loss`: the prey's loss is split between the
//! predator (assimilated fraction β) and the environment (sloppy feeding).

/// Holling (1959) type II functional response, `R / (k + R)`.
///
/// Predation decelerates as prey density increases.
///
/// # Arguments
///
/// - `r`: prey density
/// - `k`: prey density at which predation is half its maximum rate
#[must_use]
pub fn holling_type_2(r: f64, k: f64) -> f64 {
    r / (k + r)
}

/// Loss rate of prey `P` to predator `Z`, `gₘₐₓ · H(P, kₚ) · Z`.
#[must_use]
pub fn predation_loss_idealized(p: f64, z: f64, g_max: f64, k_p: f64) -> f64 {
    g_max * holling_type_2(p, k_p) * z
}

/// Gain rate of predator `Z` feeding on prey `P`, `β · loss`.
#[must_use]
pub fn predation_gain_idealized(p: f64, z: f64, beta: f64, g_max: f64, k_p: f64) -> f64 {
    beta * predation_loss_idealized(p, z, g_max, k_p)
}

/// Part of the predation loss not assimilated by the predator, `(1 − β) · loss`.
#[must_use]
pub fn predation_assimilation_loss_idealized(
    p: f64,
    z: f64,
    beta: f64,
    g_max: f64,
    k_p: f64,
) -> f64 {
    (1.0 - beta) * predation_loss_idealized(p, z, g_max, k_p)
}

/// Loss rate of prey `P` to predator `Z` weighted by palatability.
///
/// `gₘₐₓ · palatability · H(P, kₚ) · Z`
#[must_use]
pub fn predation_loss_preferential(p: f64, z: f64, g_max: f64, k_p: f64, palatability: f64) -> f64 {
    g_max * palatability * holling_type_2(p, k_p) * z
}

/// Gain rate of predator `Z` feeding on prey `P` weighted by palatability.
#[must_use]
pub fn predation_gain_preferential(
    p: f64,
    z: f64,
    beta: f64,
    g_max: f64,
    k_p: f64,
    palatability: f64,
) -> f64 {
    beta * predation_loss_preferential(p, z, g_max, k_p, palatability)
}

/// Sloppy-feeding loss of predator `Z` feeding on prey `P`.
#[must_use]
pub fn predation_assimilation_loss_preferential(
    p: f64,
    z: f64,
    beta: f64,
    g_max: f64,
    k_p: f64,
    palatability: f64,
) -> f64 {
    (1.0 - beta) * predation_loss_preferential(p, z, g_max, k_p, palatability)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loss_splits_into_gain_and_assimilation_loss() {
        let (p, z, beta, g, k, pal) = (0.4, 0.2, 0.32, 3.0, 1.0, 0.8);
        let loss = predation_loss_preferential(p, z, g, k, pal);
        let gain = predation_gain_preferential(p, z, beta, g, k, pal);
        let sloppy = predation_assimilation_loss_preferential(p, z, beta, g, k, pal);
        assert!(libm::fabs(loss - (gain + sloppy)) < 1e-15);
    }

    #[test]
    fn idealized_matches_fully_palatable_preferential() {
        let a = predation_loss_idealized(0.4, 0.2, 3.0, 1.0);
        let b = predation_loss_preferential(0.4, 0.2, 3.0, 1.0, 1.0);
        assert_eq!(a, b);
    }
}
