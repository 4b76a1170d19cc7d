//! Property tests for diameter derivation.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use tidepool_constructors::{derive_diameters, DiameterSpec, FunctionalType};

fn spec() -> impl Strategy<Value = DiameterSpec> {
    (0.1f64..50.0, 1.01f64..100.0, any::<bool>()).prop_map(|(lo, factor, log)| {
        if log {
            DiameterSpec::log(lo, lo * factor)
        } else {
            DiameterSpec::linear(lo, lo * factor)
        }
    })
}

proptest! {
    #[test]
    fn prop_ranges_hit_both_endpoints(spec in spec(), n in 2usize..12) {
        let DiameterSpec::Range { min_diameter, max_diameter, .. } = spec else {
            unreachable!()
        };
        let d = derive_diameters(FunctionalType::Phytoplankton, &spec, n).unwrap();
        prop_assert_eq!(d.len(), n);
        prop_assert_eq!(d[0], min_diameter);
        prop_assert_eq!(d[n - 1], max_diameter);
    }

    #[test]
    fn prop_ranges_increase_strictly(spec in spec(), n in 1usize..12) {
        let d = derive_diameters(FunctionalType::Zooplankton, &spec, n).unwrap();
        prop_assert!(d.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(d.iter().all(|v| v.is_finite() && *v > 0.0));
    }

    #[test]
    fn prop_single_class_sits_inside_range(spec in spec()) {
        let DiameterSpec::Range { min_diameter, max_diameter, .. } = spec else {
            unreachable!()
        };
        let d = derive_diameters(FunctionalType::Phytoplankton, &spec, 1).unwrap();
        prop_assert!(d[0] > min_diameter && d[0] < max_diameter);
    }

    #[test]
    fn prop_explicit_lists_are_used_verbatim(values in prop::collection::vec(0.1f64..1e3, 1..8)) {
        let d = derive_diameters(
            FunctionalType::Phytoplankton,
            &DiameterSpec::Explicit(values.clone()),
            values.len(),
        )
        .unwrap();
        prop_assert_eq!(d, values);
    }
}
