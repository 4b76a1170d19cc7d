//! Property-based tests for the allometric formulas.
//!
//! Uses proptest to check that scaling is an exact power law and that
//! palatability stays inside `[0, protection]` for all diameters.

use proptest::prelude::*;
use tidepool_library::allometry::{
    allometric_palatability_unimodal_protection, allometric_scaling_power, PredatorTraits,
    PreyTraits,
};

fn predator(diameter: f64, optimum: f64, specificity: f64) -> PredatorTraits {
    PredatorTraits {
        can_eat: true,
        diameter,
        optimum_predator_prey_ratio: optimum,
        specificity,
    }
}

fn prey(diameter: f64, protection: f64) -> PreyTraits {
    PreyTraits {
        can_be_eaten: true,
        diameter,
        protection,
    }
}

proptest! {
    /// scale(a, b, d) == a * d^b
    #[test]
    fn prop_scaling_is_exact(a in 1e-9f64..1e3, b in -2.0f64..2.0, d in 1e-2f64..1e3) {
        prop_assert_eq!(allometric_scaling_power(a, b, d), a * libm::pow(d, b));
    }

    /// 0 <= palatability <= protection <= 1
    #[test]
    fn prop_palatability_is_bounded(
        d_pred in 1.0f64..500.0,
        d_prey in 0.5f64..200.0,
        optimum in 0.0f64..50.0,
        specificity in 0.0f64..3.0,
        protection in 0.0f64..=1.0,
    ) {
        let p = allometric_palatability_unimodal_protection(
            &prey(d_prey, protection),
            &predator(d_pred, optimum, specificity),
        );
        prop_assert!(p >= 0.0, "negative palatability {}", p);
        prop_assert!(p <= protection, "palatability {} above protection {}", p, protection);
    }

    /// Disabled feeding always yields exactly zero.
    #[test]
    fn prop_disabled_feeding_is_zero(d_pred in 1.0f64..500.0, d_prey in 0.5f64..200.0) {
        let mut z = predator(d_pred, 10.0, 0.3);
        z.can_eat = false;
        prop_assert_eq!(allometric_palatability_unimodal_protection(&prey(d_prey, 1.0), &z), 0.0);

        let mut p = prey(d_prey, 1.0);
        p.can_be_eaten = false;
        prop_assert_eq!(
            allometric_palatability_unimodal_protection(&p, &predator(d_pred, 10.0, 0.3)),
            0.0
        );
    }

    /// The optimum ratio is the argmax.
    #[test]
    fn prop_optimum_ratio_is_maximum(d_prey in 0.5f64..50.0, ratio in 0.1f64..40.0) {
        let optimum = 10.0;
        let at_optimum = allometric_palatability_unimodal_protection(
            &prey(d_prey, 1.0),
            &predator(d_prey * optimum, optimum, 0.3),
        );
        let elsewhere = allometric_palatability_unimodal_protection(
            &prey(d_prey, 1.0),
            &predator(d_prey * ratio, optimum, 0.3),
        );
        prop_assert!(at_optimum > 1.0 - 1e-12, "peak {} is not 1", at_optimum);
        prop_assert!(elsewhere <= at_optimum + 1e-12);
    }
}
