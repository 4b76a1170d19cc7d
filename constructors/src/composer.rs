//! Expression composition as a flux network.
//!
//! Every process moves material from a source tracer to a sink at some
//! rate. A tracer's tendency is the sum of its inflows minus the sum of its
//! outflows, so whatever one tracer loses another gains, unless the sink is
//! [`Sink::Exported`].
//!
//! | Process | Flux | Kernel |
//! |---------|------|--------|
//! | growth | N → Pᵢ | `photosynthetic_growth_single_nutrient[_geider_light]` |
//! | linear mortality | X → D | `linear_loss` |
//! | quadratic mortality | X → D | `quadratic_loss` |
//! | predation gain | prey → predator | `predation_gain_preferential` |
//! | sloppy feeding | prey → D | `predation_assimilation_loss_preferential` |
//! | remineralization | D → N | `remineralization_idealized` |

use log::debug;
use serde::Serialize;
use tidepool_compiler::Expr;

use crate::classes::{ClassSet, SizeClass};
use crate::error::ConstructError;
use crate::interactions::{InteractionMatrix, ASSIMILATION_EFFICIENCY, PALATABILITY};
use crate::parameters::{
    class_parameter, pair_parameter, BiogeochemistryArgs, LightLimitation, ParameterSet,
    PhytoplanktonArgs, ZooplanktonArgs,
};

/// Nutrient tracer name.
pub const NUTRIENT: &str = "N";
/// Detritus tracer name.
pub const DETRITUS: &str = "D";
/// Photosynthetically active radiation, the default auxiliary field.
pub const PAR: &str = "PAR";

/// Where a flux goes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sink {
    /// Another tracer.
    Tracer(String),
    /// Out of the modelled system.
    Exported,
}

/// One directed transfer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Flux {
    /// Process name.
    pub process: &'static str,
    /// Tracer losing material.
    pub source: String,
    /// Where the material goes.
    pub sink: Sink,
    /// Transfer rate, `>= 0` for physical states.
    pub rate: Expr,
}

/// All fluxes of a model.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FluxNetwork {
    fluxes: Vec<Flux>,
}

impl FluxNetwork {
    /// Adds a flux from `source` to another tracer.
    pub fn transfer(&mut self, process: &'static str, source: &str, sink: &str, rate: Expr) {
        self.fluxes.push(Flux {
            process,
            source: source.to_owned(),
            sink: Sink::Tracer(sink.to_owned()),
            rate,
        });
    }

    /// Adds a flux leaving the system.
    pub fn export(&mut self, process: &'static str, source: &str, rate: Expr) {
        self.fluxes.push(Flux {
            process,
            source: source.to_owned(),
            sink: Sink::Exported,
            rate,
        });
    }

    /// Every flux in insertion order.
    #[must_use]
    pub fn fluxes(&self) -> &[Flux] {
        &self.fluxes
    }

    /// `Σ inflows − Σ outflows` of `tracer`.
    #[must_use]
    pub fn tendency(&self, tracer: &str) -> Expr {
        let inflows = self
            .fluxes
            .iter()
            .filter(|f| matches!(&f.sink, Sink::Tracer(t) if t == tracer))
            .map(|f| f.rate.clone());
        let mut outflows = self
            .fluxes
            .iter()
            .filter(|f| f.source == tracer)
            .map(|f| f.rate.clone());
        let gains: Vec<Expr> = inflows.collect();
        let mut total = if gains.is_empty() {
            match outflows.next() {
                Some(first) => -first,
                None => return Expr::Literal(0.0),
            }
        } else {
            Expr::sum(gains)
        };
        for loss in outflows {
            total = total - loss;
        }
        total
    }
}

/// Output of [`compose`]: flattened parameters and the flux network.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    /// Every scalar the composed expressions reference.
    pub parameters: ParameterSet,
    /// Every flux between tracers.
    pub network: FluxNetwork,
    tracers: Vec<String>,
}

impl Composition {
    /// Tracer names: `N`, `D`, then every class.
    #[must_use]
    pub fn tracers(&self) -> &[String] {
        &self.tracers
    }

    /// Composed tendency of `tracer`.
    #[must_use]
    pub fn expression(&self, tracer: &str) -> Expr {
        self.network.tendency(tracer)
    }
}

/// Parameter sets and matrices consumed by [`compose`].
#[derive(Debug, Clone, Copy)]
pub struct ComposeInputs<'a> {
    /// Phytoplankton record.
    pub phyto_args: &'a PhytoplanktonArgs,
    /// Zooplankton record.
    pub zoo_args: &'a ZooplanktonArgs,
    /// Nutrient and detritus record.
    pub bgc_args: &'a BiogeochemistryArgs,
    /// Growth formulation.
    pub light_limitation: LightLimitation,
    /// Palatability matrix over the class set.
    pub palatability: &'a InteractionMatrix,
    /// Assimilation efficiency matrix over the class set.
    pub assimilation_efficiency: &'a InteractionMatrix,
}

struct Builder {
    parameters: ParameterSet,
    network: FluxNetwork,
}

impl Builder {
    fn bind(&mut self, name: String, value: f64) -> Result<Expr, ConstructError> {
        self.parameters.register(name.as_str(), value)?;
        Ok(Expr::Symbol(name))
    }

    fn class_symbol(&self, field: &str, class: &SizeClass) -> Expr {
        Expr::symbol(class_parameter(field, class.name()))
    }

    fn require(&self, process: &'static str, field: &str, class: &SizeClass) -> Result<Expr, ConstructError> {
        let name = class_parameter(field, class.name());
        if self.parameters.contains(&name) {
            Ok(Expr::Symbol(name))
        } else {
            Err(ConstructError::MissingParameter {
                process,
                class: class.name().to_owned(),
                parameter: name,
            })
        }
    }
}

/// Builds the flux network of a size-structured NPZD model.
///
/// Predation fluxes are emitted only for pairs with non-zero palatability;
/// the gain flux is left out when assimilation efficiency is 0 and the
/// sloppy-feeding flux when it is 1.
///
/// # Errors
///
/// Returns [`ConstructError::ParameterConflict`] if two flattened names
/// collide with different values and [`ConstructError::MissingParameter`]
/// if a class with non-zero palatability as predator has no predation
/// rates (phytoplankton never do).
pub fn compose(classes: &ClassSet, inputs: ComposeInputs<'_>) -> Result<Composition, ConstructError> {
    let mut b = Builder {
        parameters: ParameterSet::new(),
        network: FluxNetwork::default(),
    };

    for class in classes.phytoplankton() {
        for (field, value) in inputs.phyto_args.values_for(class) {
            b.bind(class_parameter(field, class.name()), value)?;
        }
    }
    for class in classes.zooplankton() {
        for (field, value) in inputs.zoo_args.values_for(class) {
            b.bind(class_parameter(field, class.name()), value)?;
        }
    }

    for class in classes.phytoplankton() {
        let mut args = vec![
            Expr::symbol(NUTRIENT),
            Expr::symbol(class.name()),
            Expr::symbol(PAR),
            b.class_symbol("maximum_growth_rate", class),
            b.class_symbol("nutrient_half_saturation", class),
        ];
        let kernel = match inputs.light_limitation {
            LightLimitation::Smith => {
                args.push(b.class_symbol("alpha", class));
                "photosynthetic_growth_single_nutrient"
            }
            LightLimitation::Geider => {
                args.push(b.class_symbol("photosynthetic_slope", class));
                args.push(b.class_symbol("chlorophyll_to_carbon_ratio", class));
                "photosynthetic_growth_single_nutrient_geider_light"
            }
        };
        b.network
            .transfer("growth", NUTRIENT, class.name(), Expr::call(kernel, args));
    }

    for class in classes.classes() {
        let x = Expr::symbol(class.name());
        b.network.transfer(
            "linear_mortality",
            class.name(),
            DETRITUS,
            Expr::call("linear_loss", [x.clone(), b.class_symbol("linear_mortality", class)]),
        );
        b.network.transfer(
            "quadratic_mortality",
            class.name(),
            DETRITUS,
            Expr::call("quadratic_loss", [x, b.class_symbol("quadratic_mortality", class)]),
        );
    }

    for (i, predator) in classes.classes().iter().enumerate() {
        for (j, prey) in classes.classes().iter().enumerate() {
            let palatability = inputs.palatability.at(i, j);
            if palatability == 0.0 {
                continue;
            }
            let g_max = b.require("predation", "maximum_predation_rate", predator)?;
            let k_p = b.require("predation", "holling_half_saturation", predator)?;
            let beta_value = inputs.assimilation_efficiency.at(i, j);
            let beta = b.bind(pair_parameter(ASSIMILATION_EFFICIENCY, predator.name(), prey.name()), beta_value)?;
            let palat = b.bind(pair_parameter(PALATABILITY, predator.name(), prey.name()), palatability)?;
            let args = [
                Expr::symbol(prey.name()),
                Expr::symbol(predator.name()),
                beta,
                g_max,
                k_p,
                palat,
            ];
            if beta_value != 0.0 {
                b.network.transfer(
                    "predation",
                    prey.name(),
                    predator.name(),
                    Expr::call("predation_gain_preferential", args.clone()),
                );
            }
            if beta_value != 1.0 {
                b.network.transfer(
                    "sloppy_feeding",
                    prey.name(),
                    DETRITUS,
                    Expr::call("predation_assimilation_loss_preferential", args),
                );
            }
        }
    }

    for (field, value) in inputs.bgc_args.values() {
        b.bind(field.to_owned(), value)?;
    }
    b.network.transfer(
        "remineralization",
        DETRITUS,
        NUTRIENT,
        Expr::call(
            "remineralization_idealized",
            [Expr::symbol(DETRITUS), Expr::symbol("detritus_remineralization")],
        ),
    );

    let tracers = [NUTRIENT, DETRITUS]
        .into_iter()
        .map(str::to_owned)
        .chain(classes.names().map(str::to_owned))
        .collect();
    debug!(
        "composed {} fluxes over {} parameters for {} phytoplankton and {} zooplankton",
        b.network.fluxes().len(),
        b.parameters.len(),
        classes.phytoplankton().len(),
        classes.zooplankton().len()
    );
    Ok(Composition {
        parameters: b.parameters,
        network: b.network,
        tracers,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::interactions::{build_matrices, InteractionArgs};

    fn composition(n_phyto: usize, n_zoo: usize, light: LightLimitation) -> Composition {
        let phyto: Vec<f64> = (1..=n_phyto).map(|i| 2.0 * i as f64).collect();
        let zoo: Vec<f64> = (1..=n_zoo).map(|i| 20.0 * i as f64).collect();
        let classes = ClassSet::new(&phyto, &zoo);
        let (p, a) = build_matrices(&classes, &InteractionArgs::default()).unwrap();
        compose(
            &classes,
            ComposeInputs {
                phyto_args: &PhytoplanktonArgs::default(),
                zoo_args: &ZooplanktonArgs::default(),
                bgc_args: &BiogeochemistryArgs::default(),
                light_limitation: light,
                palatability: &p,
                assimilation_efficiency: &a,
            },
        )
        .unwrap()
    }

    #[test]
    fn tracer_order_is_nutrient_detritus_classes() {
        let c = composition(2, 1, LightLimitation::Smith);
        assert_eq!(c.tracers(), ["N", "D", "P1", "P2", "Z1"]);
    }

    #[test]
    fn default_network_exports_nothing() {
        let c = composition(2, 2, LightLimitation::Smith);
        for flux in c.network.fluxes() {
            assert_ne!(flux.sink, Sink::Exported);
        }
        let uses = |tracer: &str| c.expression(tracer).to_string();
        assert!(uses("N").contains("remineralization_idealized"));
        assert!(uses("P1").starts_with("photosynthetic_growth_single_nutrient("));
        assert!(uses("Z1").contains("predation_gain_preferential(P1, Z1"));
    }

    #[test]
    fn geider_growth_uses_chlorophyll_parameters() {
        let c = composition(1, 1, LightLimitation::Geider);
        let growth = c.expression("P1").to_string();
        assert!(growth.contains("photosynthetic_growth_single_nutrient_geider_light"));
        assert!(growth.contains("chlorophyll_to_carbon_ratio_P1"));
    }

    #[test]
    fn zero_palatability_pairs_are_skipped() {
        let c = composition(1, 2, LightLimitation::Smith);
        assert!(c.parameters.contains("palatability_Z1_P1"));
        assert!(!c.parameters.contains("palatability_P1_Z1"));
        assert!(!c.parameters.contains("palatability_Z1_Z2"));
    }

    #[test]
    fn phytoplankton_cannot_prey() {
        let classes = ClassSet::new(&[2.0], &[20.0]);
        let mut args = InteractionArgs::default();
        args.phytoplankton.can_eat = true;
        args.phytoplankton.optimum_predator_prey_ratio = 1.0;
        args.zooplankton.can_be_eaten = true;
        let (p, a) = build_matrices(&classes, &args).unwrap();
        let err = compose(
            &classes,
            ComposeInputs {
                phyto_args: &PhytoplanktonArgs::default(),
                zoo_args: &ZooplanktonArgs::default(),
                bgc_args: &BiogeochemistryArgs::default(),
                light_limitation: LightLimitation::Smith,
                palatability: &p,
                assimilation_efficiency: &a,
            },
        )
        .unwrap_err();
        assert!(matches!(err, ConstructError::MissingParameter { ref parameter, .. } if parameter == "maximum_predation_rate_P1"));
    }

    #[test]
    fn tendency_of_an_isolated_tracer_is_zero() {
        let net = FluxNetwork::default();
        assert_eq!(net.tendency("N"), Expr::Literal(0.0));
        let mut net = FluxNetwork::default();
        net.export("respiration", "Z1", Expr::symbol("r"));
        assert_eq!(net.tendency("Z1"), -Expr::symbol("r"));
    }
}
