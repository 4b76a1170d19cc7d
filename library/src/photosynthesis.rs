//! Light limitation and photosynthetic growth.

use crate::nutrients::monod_limitation;

/// Smith (1936) light limitation, `α·PAR / √(μ₀² + α²·PAR²)`.
///
/// See also Evans and Parslow (1985). Returns 0 in the degenerate case
/// `μ₀ = α·PAR = 0`.
///
/// # Arguments
///
/// - `par`: photosynthetic active radiation
/// - `alpha`: initial photosynthetic slope
/// - `mu0`: maximum growth rate at T = 0 °C
#[must_use]
pub fn light_limitation_smith(par: f64, alpha: f64, mu0: f64) -> f64 {
    let light = alpha * par;
    let denominator = libm::sqrt(mu0 * mu0 + light * light);
    if denominator == 0.0 {
        return 0.0;
    }
    light / denominator
}

/// Geider et al. (1998) light limitation, `Pᶜₘₐₓ[1 − exp(−αᶜʰˡ·θᶜ·E₀ / Pᶜₘₐₓ)]`.
///
/// Depends on the cellular chlorophyll to carbon ratio. A non-positive
/// maximum growth rate yields 0.
///
/// # Arguments
///
/// - `par`: photosynthetic active radiation (E₀)
/// - `maximum_growth_rate`: maximum growth rate before nutrient limitation (Pᶜₘₐₓ)
/// - `photosynthetic_slope`: initial photosynthetic slope (αᶜʰˡ)
/// - `chlorophyll_to_carbon_ratio`: cellular chlorophyll to carbon ratio (θᶜ)
#[must_use]
pub fn light_limitation_geider(
    par: f64,
    maximum_growth_rate: f64,
    photosynthetic_slope: f64,
    chlorophyll_to_carbon_ratio: f64,
) -> f64 {
    if maximum_growth_rate <= 0.0 {
        return 0.0;
    }
    let exponent = -photosynthetic_slope * chlorophyll_to_carbon_ratio * par / maximum_growth_rate;
    maximum_growth_rate * (1.0 - libm::exp(exponent))
}

/// Light limitation (MITgcm-DARWIN default formulation).
///
/// `γˡⁱᵍʰᵗ = (1 − e^(kˢᵃᵗ·I)) · e^kⁱⁿʰ · nˡⁱᵍʰᵗ`
///
/// # Arguments
///
/// - `irradiance`: I
/// - `k_saturation`: half saturation constant of light saturation
/// - `k_inhibition`: half saturation constant of light inhibition
/// - `light_penalty`: light penalty term
#[must_use]
pub fn light_limitation_darwin(
    irradiance: f64,
    k_saturation: f64,
    k_inhibition: f64,
    light_penalty: f64,
) -> f64 {
    (1.0 - libm::exp(k_saturation * irradiance)) * libm::exp(k_inhibition) * light_penalty
}

/// Single nutrient Monod-Smith photosynthetic growth (as used in Kuhn 2015).
///
/// `μ₀ · N/(kₙ + N) · γˢᵐⁱᵗʰ(PAR) · P`
#[must_use]
pub fn photosynthetic_growth_single_nutrient(
    n: f64,
    p: f64,
    par: f64,
    mu0: f64,
    kn: f64,
    alpha: f64,
) -> f64 {
    mu0 * monod_limitation(n, kn) * light_limitation_smith(par, alpha, mu0) * p
}

/// Single nutrient photosynthetic growth with Geider light limitation.
///
/// `N/(kₙ + N) · γᵍᵉⁱᵈᵉʳ(PAR) · P`
#[must_use]
pub fn photosynthetic_growth_single_nutrient_geider_light(
    n: f64,
    p: f64,
    par: f64,
    maximum_growth_rate: f64,
    kn: f64,
    photosynthetic_slope: f64,
    chlorophyll_to_carbon_ratio: f64,
) -> f64 {
    monod_limitation(n, kn)
        * light_limitation_geider(
            par,
            maximum_growth_rate,
            photosynthetic_slope,
            chlorophyll_to_carbon_ratio,
        )
        * p
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smith_saturates_towards_one() {
        let low = light_limitation_smith(1.0, 0.1, 1.0);
        let high = light_limitation_smith(1.0e6, 0.1, 1.0);
        assert!(low < high);
        assert!(high < 1.0 && high > 0.999);
    }

    #[test]
    fn smith_degenerate_case_is_zero() {
        assert_eq!(light_limitation_smith(0.0, 0.1, 0.0), 0.0);
    }

    #[test]
    fn geider_is_bounded_by_maximum_growth_rate() {
        let g = light_limitation_geider(1.0e4, 2.0, 0.5, 0.1);
        assert!(g <= 2.0 && g > 1.99);
        assert_eq!(light_limitation_geider(100.0, 0.0, 0.5, 0.1), 0.0);
    }

    #[test]
    fn growth_vanishes_without_nutrient_or_biomass() {
        assert_eq!(photosynthetic_growth_single_nutrient(0.0, 1.0, 100.0, 1.0, 0.5, 0.1), 0.0);
        assert_eq!(photosynthetic_growth_single_nutrient(1.0, 0.0, 100.0, 1.0, 0.5, 0.1), 0.0);
    }
}
