//! Sinking flux composition over a vertical grid.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use tidepool_compiler::{
    Column, CompileError, Coordinates, ErrorKind, Expr, TracerDefinition, VerticalGrid,
};

fn detritus(open_bottom: bool, speed: f64) -> TracerDefinition {
    TracerDefinition::new(
        [("r", 0.0)],
        [
            ("N", "r * D".parse::<Expr>().unwrap()),
            ("D", "-r * D".parse::<Expr>().unwrap()),
        ],
    )
    .auxiliary_fields(Vec::<String>::new())
    .grid(VerticalGrid::uniform(50.0, 10).unwrap())
    .sinking_tracers([("D", speed)])
    .open_bottom(open_bottom)
}

#[test]
fn test_closed_bottom_speed_is_zero_at_deepest_cell() {
    let system = detritus(false, 2.5).compile().unwrap();
    let d = system.function("D").unwrap();
    assert_eq!(d.sinking_speed_at(0), Some(0.0));
    assert_eq!(d.sinking_speed(), Some(2.5));
    assert!(system.function("N").unwrap().sinking_speed_at(0).is_none());
}

#[test]
fn test_open_bottom_speed_is_unmodified_at_deepest_cell() {
    let system = detritus(true, 2.5).compile().unwrap();
    assert_eq!(system.function("D").unwrap().sinking_speed_at(0), Some(2.5));
}

#[test]
fn test_sinking_without_grid_is_configuration_error() {
    let err = TracerDefinition::new([("r", 0.0)], [("D", "-r * D".parse::<Expr>().unwrap())])
        .sinking_tracers([("D", 1.0)])
        .compile()
        .unwrap_err();
    assert_eq!(err, CompileError::SinkingWithoutGrid { tracer: "D".into() });
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_local_evaluation_excludes_sinking() {
    let system = detritus(true, 2.5).compile().unwrap();
    let d = system.function("D").unwrap();
    let c = Coordinates::at(-2.5, 0.0);
    assert_eq!(d.evaluate(&c, &[0.0, 1.0], &[]), 0.0);
    let with_sinking = d.evaluate_in_column(
        &c,
        &[0.0, 1.0],
        &[],
        Column {
            level: 9,
            above: None,
        },
    );
    assert_eq!(with_sinking, -2.5 / 5.0);
}

fn column_inventory(system: &tidepool_compiler::TracerSystem, profile: &[f64]) -> f64 {
    let tracers: Vec<Vec<f64>> = profile.iter().map(|&d| vec![0.0, d]).collect();
    let aux = vec![Vec::new(); profile.len()];
    let rates = system
        .column_tendencies(&Coordinates::default(), &tracers, &aux)
        .unwrap();
    let grid = system.grid().unwrap();
    rates
        .iter()
        .enumerate()
        .map(|(k, r)| r[1] * grid.spacing(k))
        .sum()
}

proptest! {
    /// A closed column neither gains nor loses sinking material.
    #[test]
    fn prop_closed_column_conserves_mass(
        profile in proptest::collection::vec(0.0f64..10.0, 10),
        speed in 0.1f64..20.0,
    ) {
        let system = detritus(false, speed).compile().unwrap();
        let total = column_inventory(&system, &profile);
        prop_assert!(total.abs() < 1e-9, "column inventory changed by {}", total);
    }

    /// An open column loses exactly the bottom-face flux.
    #[test]
    fn prop_open_column_loses_bottom_flux(
        profile in proptest::collection::vec(0.0f64..10.0, 10),
        speed in 0.1f64..20.0,
    ) {
        let system = detritus(true, speed).compile().unwrap();
        let total = column_inventory(&system, &profile);
        prop_assert!((total + speed * profile[0]).abs() < 1e-9);
    }
}
