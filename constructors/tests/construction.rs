//! End-to-end construction of NiPiZD models.

#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;

use proptest::prelude::*;
use tidepool_compiler::{Column, Coordinates, ErrorKind, Expr, HelperFunctions, VerticalGrid};
use tidepool_constructors::{
    ConstructError, DiameterSpec, FunctionalType, Instantiation, InteractionMatrix,
    LightLimitation, NiPiZD, PhytoplanktonArgs, SinkingConfig, SizeDependent, TracerOverride,
    ZooplanktonArgs,
};

fn one_by_one() -> NiPiZD {
    NiPiZD {
        n_phyto: 1,
        n_zoo: 1,
        ..NiPiZD::default()
    }
}

fn zeros(names: &[&str]) -> InteractionMatrix {
    let n = names.len();
    InteractionMatrix::from_rows(
        "palatability",
        names.iter().map(|s| (*s).to_owned()).collect(),
        &vec![vec![0.0; n]; n],
    )
    .unwrap()
}

// ============================================================================
// Matrices
// ============================================================================

#[test]
fn test_default_matrices_are_well_formed() {
    let model = NiPiZD::default().construct().unwrap();
    let classes: Vec<&str> = model.classes().names().collect();
    for matrix in [model.palatability(), model.assimilation_efficiency()] {
        assert_eq!(matrix.names(), classes.as_slice());
        for i in 0..matrix.len() {
            assert_eq!(matrix.row(i).len(), matrix.len());
            assert_eq!(matrix.at(i, i), 0.0, "no self predation by default");
            for &v in matrix.row(i) {
                assert!((0.0..=1.0).contains(&v));
            }
        }
    }
    for prey in ["P1", "P2", "Z1", "Z2"] {
        assert_eq!(model.palatability().get("P1", prey), Some(0.0), "phytoplankton never eat");
    }
    assert!(model.palatability().get("Z1", "P1").unwrap() > 0.0);
}

#[test]
fn test_supplied_matrix_must_follow_class_order() {
    let config = NiPiZD {
        palatability_matrix: Some(zeros(&["P1", "P2", "Z2", "Z1"])),
        ..NiPiZD::default()
    };
    let err = config.construct().unwrap_err();
    assert!(matches!(err, ConstructError::MatrixOrder { position: 2, .. }));
    assert_eq!(err.kind(), ErrorKind::Configuration);

    let config = NiPiZD {
        palatability_matrix: Some(zeros(&["P1", "Z1", "Z2"])),
        ..NiPiZD::default()
    };
    assert!(matches!(
        config.construct().unwrap_err(),
        ConstructError::MatrixMissingClass { .. }
    ));
}

#[test]
fn test_zero_palatability_drops_predation_terms() {
    let config = NiPiZD {
        palatability_matrix: Some(zeros(&["P1", "P2", "Z1", "Z2"])),
        ..NiPiZD::default()
    };
    let model = config.construct().unwrap();
    assert!(model.network().fluxes().iter().all(|f| f.process != "predation"));
    assert!(!model.parameters().contains("palatability_Z1_P1"));
    let z1 = model.expression("Z1").unwrap();
    assert!(!z1.functions().contains("predation_gain_preferential"));
}

#[test]
fn test_supplied_palatability_ignores_palatability_traits() {
    let mut config = NiPiZD {
        palatability_matrix: Some(zeros(&["P1", "P2", "Z1", "Z2"])),
        ..NiPiZD::default()
    };
    config.interaction_args.phytoplankton.protection = Some(2.0);
    config.interaction_args.zooplankton.specificity = -1.0;
    let model = config.construct().unwrap();
    assert_eq!(model.assimilation_efficiency().get("Z1", "P1"), Some(0.32));

    config.palatability_matrix = None;
    let err = config.construct().unwrap_err();
    assert!(matches!(err, ConstructError::InvalidParameter { ref name, .. } if name == "protection_P1"));
}

// ============================================================================
// Mass conservation
// ============================================================================

#[test]
fn test_nutrient_and_phytoplankton_balance_without_losses() {
    let config = NiPiZD {
        phyto_args: PhytoplanktonArgs {
            linear_mortality: SizeDependent::Constant(0.0),
            quadratic_mortality: SizeDependent::Constant(0.0),
            ..PhytoplanktonArgs::default()
        },
        zoo_args: ZooplanktonArgs {
            linear_mortality: SizeDependent::Constant(0.0),
            quadratic_mortality: SizeDependent::Constant(0.0),
            ..ZooplanktonArgs::default()
        },
        palatability_matrix: Some(zeros(&["P1", "Z1"])),
        ..one_by_one()
    };
    let model = config.construct().unwrap();
    let rates = model
        .system()
        .evaluate_all(&Coordinates::default(), &[1.0, 0.0, 0.1, 0.05], &[100.0]);
    assert!(rates[2] > 0.0, "phytoplankton grows");
    assert_eq!(rates[0] + rates[2], 0.0);
    assert_eq!(rates[1], 0.0);
    assert_eq!(rates[3], 0.0);
}

proptest! {
    #[test]
    fn prop_total_nitrogen_is_conserved(
        n in 0.0f64..10.0,
        d in 0.0f64..5.0,
        p in 0.0f64..2.0,
        z in 0.0f64..2.0,
        par in 0.0f64..500.0,
        geider in any::<bool>(),
    ) {
        let config = NiPiZD {
            light_limitation: if geider { LightLimitation::Geider } else { LightLimitation::Smith },
            ..one_by_one()
        };
        let model = config.construct().unwrap();
        let rates = model.system().evaluate_all(&Coordinates::default(), &[n, d, p, z], &[par]);
        let scale: f64 = rates.iter().map(|r| r.abs()).sum::<f64>().max(1e-30);
        prop_assert!(rates.iter().sum::<f64>().abs() <= 1e-12 * scale);
    }
}

// ============================================================================
// Evaluation
// ============================================================================

#[test]
fn test_two_by_two_evaluation_is_finite_and_repeatable() {
    let model = NiPiZD::default().construct().unwrap();
    let tracers = [1.0, 0.0, 0.1, 0.1, 0.05, 0.05];
    let first = model.system().evaluate_all(&Coordinates::default(), &tracers, &[100.0]);
    let second = model.system().evaluate_all(&Coordinates::default(), &tracers, &[100.0]);
    assert_eq!(first.len(), 6);
    assert!(first.iter().all(|r| r.is_finite()));
    assert_eq!(first, second);
}

#[test]
fn test_models_are_shareable_across_threads() {
    let model = NiPiZD::default().construct().unwrap();
    let tracers = [1.0, 0.0, 0.1, 0.1, 0.05, 0.05];
    let expected = model.system().evaluate_all(&Coordinates::default(), &tracers, &[100.0]);
    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                let rates = model.system().evaluate_all(&Coordinates::default(), &tracers, &[100.0]);
                assert_eq!(rates, expected);
            });
        }
    });
}

// ============================================================================
// Overrides
// ============================================================================

#[test]
fn test_override_without_parameters_is_rejected() {
    let config = NiPiZD::from_json_str(
        r#"{"n_phyto": 1, "n_zoo": 1, "tracer_overrides": {"D": {"expression": "-r * D"}}}"#,
    )
    .unwrap();
    let err = config.construct().unwrap_err();
    assert_eq!(err, ConstructError::OverrideWithoutParameters { tracer: "D".into() });
    assert_eq!(err.kind(), ErrorKind::Consistency);
}

#[test]
fn test_override_is_used_verbatim() {
    let expression: Expr = "remin * D - monod_limitation(N, k) * P1".parse().unwrap();
    let mut config = one_by_one();
    config.tracer_overrides.insert(
        "N".into(),
        TracerOverride::new(
            expression.clone(),
            [("remin".to_owned(), 0.25), ("k".to_owned(), 1.0)],
        ),
    );
    let model = config.construct().unwrap();
    assert_eq!(model.expression("N"), Some(&expression));
    let n = model
        .function("N")
        .unwrap()
        .evaluate(&Coordinates::default(), &[1.0, 2.0, 0.5, 0.0], &[0.0]);
    assert_eq!(n, 0.25 * 2.0 - 0.5 * 0.5);
}

#[test]
fn test_override_may_call_helpers() {
    let mut config = one_by_one();
    config.helper_functions = HelperFunctions::new()
        .with("seasonal", 1, |a| 1.0 + a[0].cos())
        .unwrap();
    config.tracer_overrides.insert(
        "D".into(),
        TracerOverride::new(
            "-r * seasonal(t) * D".parse().unwrap(),
            [("r".to_owned(), 0.5)],
        ),
    );
    let model = config.construct().unwrap();
    let d = model
        .function("D")
        .unwrap()
        .evaluate(&Coordinates::at(0.0, 0.0), &[0.0, 1.0, 0.0, 0.0], &[0.0]);
    assert_eq!(d, -0.5 * 2.0);
}

#[test]
fn test_override_parameter_conflicting_with_model_is_rejected() {
    let mut config = one_by_one();
    config.tracer_overrides.insert(
        "D".into(),
        TracerOverride::new(
            "-detritus_remineralization * D".parse().unwrap(),
            [("detritus_remineralization".to_owned(), 1.0)],
        ),
    );
    let err = config.construct().unwrap_err();
    assert!(matches!(err, ConstructError::ParameterConflict { .. }));
    assert_eq!(err.kind(), ErrorKind::Consistency);
}

// ============================================================================
// Sinking
// ============================================================================

fn sinking_model(open_bottom: bool) -> NiPiZD {
    NiPiZD {
        grid: Some(VerticalGrid::uniform(50.0, 10).unwrap()),
        sinking: Some(SinkingConfig {
            speeds: BTreeMap::from([("D".to_owned(), 2.5), ("P2".to_owned(), 1.0)]),
            open_bottom,
            ..SinkingConfig::default()
        }),
        ..NiPiZD::default()
    }
}

#[test]
fn test_deepest_cell_speed_follows_bottom_policy() {
    let closed = sinking_model(false).construct().unwrap();
    let open = sinking_model(true).construct().unwrap();
    assert_eq!(closed.function("D").unwrap().sinking_speed_at(0), Some(0.0));
    assert_eq!(open.function("D").unwrap().sinking_speed_at(0), Some(2.5));
    assert_eq!(open.function("P2").unwrap().sinking_speed_at(0), Some(1.0));
    assert!(!open.function("P1").unwrap().sinks());
}

#[test]
fn test_surface_cell_only_loses_to_sinking() {
    let model = sinking_model(true).construct().unwrap();
    let d = model.function("D").unwrap();
    let tracers = [0.0, 1.0, 0.0, 0.0, 0.0, 0.0];
    let coordinates = Coordinates::at(-2.5, 0.0);
    let local = d.evaluate(&coordinates, &tracers, &[0.0]);
    let column = d.evaluate_in_column(&coordinates, &tracers, &[0.0], Column { level: 9, above: None });
    assert_eq!(column, local - 2.5 / 5.0);
}

#[test]
fn test_sinking_without_grid_fails_to_construct() {
    let config = NiPiZD {
        grid: None,
        ..sinking_model(true)
    };
    let err = config.construct().unwrap_err();
    assert!(matches!(err, ConstructError::Compile(_)));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

// ============================================================================
// Configuration documents and instantiation
// ============================================================================

#[test]
fn test_toml_document_builds_the_same_model() {
    let config = NiPiZD::from_toml_str(
        r#"
        n_phyto = 2
        n_zoo = 2
        phyto_diameters = [2.0, 10.0]
        zoo_diameters = [20.0, 100.0]

        [zoo_args]
        holling_half_saturation = 5.0
        "#,
    )
    .unwrap();
    let from_toml = config.construct().unwrap();
    let default = NiPiZD::default().construct().unwrap();
    assert_eq!(from_toml.parameters(), default.parameters());
    assert_eq!(from_toml.tracer_names(), default.tracer_names());
}

#[test]
fn test_json_document_with_grid_and_sinking() {
    let config = NiPiZD::from_json_str(
        r#"{
            "grid": {"depth": 100.0, "levels": 20},
            "sinking": {"speeds": {"D": 1.0}, "open_bottom": false}
        }"#,
    )
    .unwrap();
    let model = config.construct().unwrap();
    assert_eq!(model.system().grid().unwrap().levels(), 20);
    assert_eq!(model.function("D").unwrap().sinking_speed_at(0), Some(0.0));
}

#[test]
fn test_instantiate_rebuilds_parameters() {
    let model = NiPiZD::default().construct().unwrap();
    let faster = model
        .instantiate(Instantiation {
            zoo_args: Some(ZooplanktonArgs {
                maximum_predation_rate: SizeDependent::Constant(1e-4),
                ..ZooplanktonArgs::default()
            }),
            zoo_diameters: Some(DiameterSpec::log(20.0, 200.0)),
            ..Instantiation::default()
        })
        .unwrap();
    assert_eq!(faster.parameters().get("maximum_predation_rate_Z2"), Some(1e-4));
    assert_eq!(faster.diameters(FunctionalType::Zooplankton), [20.0, 200.0]);
    assert_ne!(model.parameters().get("maximum_predation_rate_Z2"), Some(1e-4));
}

#[test]
fn test_instantiate_rejects_other_class_counts() {
    let model = one_by_one().construct().unwrap();
    let err = model
        .instantiate(Instantiation {
            zoo_diameters: Some(DiameterSpec::Explicit(vec![10.0, 20.0])),
            ..Instantiation::default()
        })
        .unwrap_err();
    assert_eq!(
        err,
        ConstructError::InstantiationClassCount {
            functional_type: FunctionalType::Zooplankton,
            expected: 1,
            found: 2
        }
    );
}
