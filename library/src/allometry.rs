//! Size-based (allometric) formulas.
//!
//! These are not expression kernels: they run once at model construction to
//! turn diameters into per-class parameters and interaction matrix entries.

/// Allometric scaling using a power law on equivalent spherical diameter.
///
/// Returns `a · d^b`.
///
/// # Arguments
///
/// - `a`: scale
/// - `b`: exponent
/// - `d`: cell equivalent spherical diameter (ESD)
#[must_use]
pub fn allometric_scaling_power(a: f64, b: f64, d: f64) -> f64 {
    a * libm::pow(d, b)
}

/// Predator-side traits consumed by the palatability formulas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredatorTraits {
    /// Whether the predator feeds at all.
    pub can_eat: bool,
    /// Predator diameter.
    pub diameter: f64,
    /// Predator/prey diameter ratio at which palatability peaks.
    pub optimum_predator_prey_ratio: f64,
    /// How sharply palatability decays away from the optimum.
    pub specificity: f64,
}

/// Prey-side traits consumed by the palatability formulas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreyTraits {
    /// Whether anything may feed on this prey.
    pub can_be_eaten: bool,
    /// Prey diameter.
    pub diameter: f64,
    /// Protection factor in `[0, 1]`; 1 means unprotected.
    pub protection: f64,
}

/// Unimodal allometric palatability of a prey for a predator.
///
/// Equivalent to [`allometric_palatability_unimodal_protection`] with an
/// unprotected prey (`protection = 1`).
#[must_use]
pub fn allometric_palatability_unimodal(prey: &PreyTraits, predator: &PredatorTraits) -> f64 {
    let unprotected = PreyTraits {
        protection: 1.0,
        ..*prey
    };
    allometric_palatability_unimodal_protection(&unprotected, predator)
}

/// Unimodal allometric palatability with an explicit prey protection factor.
///
/// `protection / (1 + (r − optimum)²)^specificity` with
/// `r = predator_diameter / prey_diameter`, or 0 when the predator cannot
/// eat or the prey cannot be eaten. The width and the optimum of the
/// response are set by `specificity` and `optimum_predator_prey_ratio`.
#[must_use]
pub fn allometric_palatability_unimodal_protection(
    prey: &PreyTraits,
    predator: &PredatorTraits,
) -> f64 {
    if !predator.can_eat || !prey.can_be_eaten {
        return 0.0;
    }
    let ratio = predator.diameter / prey.diameter;
    let offset = ratio - predator.optimum_predator_prey_ratio;
    prey.protection / libm::pow(1.0 + offset * offset, predator.specificity)
}

/// Binary assimilation efficiency.
///
/// Returns `efficiency` when the predator can eat and the prey can be eaten,
/// otherwise 0.
#[must_use]
pub fn assimilation_efficiency_emergent_binary(
    can_eat: bool,
    can_be_eaten: bool,
    efficiency: f64,
) -> f64 {
    if can_eat && can_be_eaten {
        efficiency
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zooplankton(diameter: f64) -> PredatorTraits {
        PredatorTraits {
            can_eat: true,
            diameter,
            optimum_predator_prey_ratio: 10.0,
            specificity: 0.3,
        }
    }

    fn phytoplankton(diameter: f64) -> PreyTraits {
        PreyTraits {
            can_be_eaten: true,
            diameter,
            protection: 1.0,
        }
    }

    #[test]
    fn scaling_matches_power_law() {
        assert_eq!(allometric_scaling_power(2.0, 1.0, 3.0), 6.0);
        assert_eq!(allometric_scaling_power(0.5, 0.0, 42.0), 0.5);
    }

    #[test]
    fn palatability_peaks_at_optimum_ratio() {
        let peak = allometric_palatability_unimodal(&phytoplankton(2.0), &zooplankton(20.0));
        assert_eq!(peak, 1.0);
        let off = allometric_palatability_unimodal(&phytoplankton(4.0), &zooplankton(20.0));
        assert!(off < peak);
    }

    #[test]
    fn palatability_is_zero_when_feeding_is_disabled() {
        let mut predator = zooplankton(20.0);
        predator.can_eat = false;
        assert_eq!(
            allometric_palatability_unimodal(&phytoplankton(2.0), &predator),
            0.0
        );

        let mut prey = phytoplankton(2.0);
        prey.can_be_eaten = false;
        assert_eq!(
            allometric_palatability_unimodal(&prey, &zooplankton(20.0)),
            0.0
        );
    }

    #[test]
    fn protection_scales_palatability() {
        let mut prey = phytoplankton(2.0);
        prey.protection = 0.25;
        let p = allometric_palatability_unimodal_protection(&prey, &zooplankton(20.0));
        assert_eq!(p, 0.25);
    }

    #[test]
    fn assimilation_is_a_binary_gate() {
        assert_eq!(assimilation_efficiency_emergent_binary(true, true, 0.32), 0.32);
        assert_eq!(assimilation_efficiency_emergent_binary(false, true, 0.32), 0.0);
        assert_eq!(assimilation_efficiency_emergent_binary(true, false, 0.32), 0.0);
    }
}
