//! Size-structured NPZD model types.
//!
//! [`NiPiZD`] is the configuration: class counts, diameters, parameter
//! records, interaction settings and optional overrides. [`NiPiZD::construct`]
//! runs the whole pipeline and returns a [`ModelType`]:
//!
//! ```text
//! diameters ──► ClassSet ──► matrices ──► flux network ──► overrides ──► TracerSystem
//! ```
//!
//! Any failure ends construction; no partially built model is returned.

use std::collections::BTreeMap;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use tidepool_compiler::{
    Coordinate, Expr, HelperFunctions, TracerDefinition, TracerFunction, TracerSystem,
    VerticalGrid, DEFAULT_SMOOTHING_DISTANCE,
};

use crate::allometry::{derive_diameters, DiameterSpec};
use crate::classes::{ClassSet, FunctionalType};
use crate::composer::{compose, ComposeInputs, FluxNetwork, PAR};
use crate::error::ConstructError;
use crate::interactions::{resolve_matrices, InteractionArgs, InteractionMatrix};
use crate::parameters::{
    BiogeochemistryArgs, LightLimitation, ParameterSet, PhytoplanktonArgs, ZooplanktonArgs,
};

/// Sinking settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SinkingConfig {
    /// Downward speed per tracer, positive.
    pub speeds: BTreeMap<String, f64>,
    /// Whether material leaves through the bottom face.
    pub open_bottom: bool,
    /// Ramp distance used with a closed bottom.
    pub smoothing_distance: f64,
}

impl Default for SinkingConfig {
    fn default() -> Self {
        SinkingConfig {
            speeds: BTreeMap::new(),
            open_bottom: true,
            smoothing_distance: DEFAULT_SMOOTHING_DISTANCE,
        }
    }
}

/// A caller-supplied expression replacing the composed one for a tracer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TracerOverride {
    /// Replacement tendency.
    pub expression: Expr,
    /// Every parameter the expression uses, with values. Required.
    #[serde(default)]
    pub parameters: Option<BTreeMap<String, f64>>,
}

impl TracerOverride {
    /// An override with its own parameter set.
    #[must_use]
    pub fn new(expression: Expr, parameters: impl IntoIterator<Item = (String, f64)>) -> Self {
        TracerOverride {
            expression,
            parameters: Some(parameters.into_iter().collect()),
        }
    }
}

/// Configuration of a size-structured NPZD model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NiPiZD {
    /// Number of phytoplankton classes, `>= 1`.
    pub n_phyto: usize,
    /// Number of zooplankton classes, `>= 1`.
    pub n_zoo: usize,
    /// Phytoplankton diameters.
    pub phyto_diameters: DiameterSpec,
    /// Zooplankton diameters.
    pub zoo_diameters: DiameterSpec,
    /// Phytoplankton parameters.
    pub phyto_args: PhytoplanktonArgs,
    /// Zooplankton parameters.
    pub zoo_args: ZooplanktonArgs,
    /// Feeding traits for matrix derivation.
    pub interaction_args: InteractionArgs,
    /// Nutrient and detritus parameters.
    pub bgc_args: BiogeochemistryArgs,
    /// Growth formulation.
    pub light_limitation: LightLimitation,
    /// Replaces palatability derivation when present.
    pub palatability_matrix: Option<InteractionMatrix>,
    /// Replaces assimilation efficiency derivation when present.
    pub assimilation_efficiency_matrix: Option<InteractionMatrix>,
    /// Per-tracer expression overrides.
    pub tracer_overrides: BTreeMap<String, TracerOverride>,
    /// Auxiliary fields visible to expressions.
    pub auxiliary_fields: Vec<String>,
    /// Sinking settings; requires `grid`.
    pub sinking: Option<SinkingConfig>,
    /// Vertical grid for sinking and column evaluation.
    pub grid: Option<VerticalGrid>,
    /// Extra functions available to override expressions.
    #[serde(skip)]
    pub helper_functions: HelperFunctions,
}

impl Default for NiPiZD {
    fn default() -> Self {
        NiPiZD {
            n_phyto: 2,
            n_zoo: 2,
            phyto_diameters: DiameterSpec::log(2.0, 10.0),
            zoo_diameters: DiameterSpec::linear(20.0, 100.0),
            phyto_args: PhytoplanktonArgs::default(),
            zoo_args: ZooplanktonArgs::default(),
            interaction_args: InteractionArgs::default(),
            bgc_args: BiogeochemistryArgs::default(),
            light_limitation: LightLimitation::default(),
            palatability_matrix: None,
            assimilation_efficiency_matrix: None,
            tracer_overrides: BTreeMap::new(),
            auxiliary_fields: vec![PAR.to_owned()],
            sinking: None,
            grid: None,
            helper_functions: HelperFunctions::new(),
        }
    }
}

impl NiPiZD {
    /// Reads a configuration from JSON. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructError::Document`] for malformed JSON, unknown keys
    /// or values of the wrong shape.
    pub fn from_json_str(text: &str) -> Result<Self, ConstructError> {
        serde_json::from_str(text).map_err(|e| ConstructError::Document {
            format: "JSON",
            message: e.to_string(),
        })
    }

    /// Reads a configuration from TOML. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructError::Document`] for malformed TOML, unknown keys
    /// or values of the wrong shape.
    pub fn from_toml_str(text: &str) -> Result<Self, ConstructError> {
        toml::from_str(text).map_err(|e| ConstructError::Document {
            format: "TOML",
            message: e.to_string(),
        })
    }

    /// Builds the model type.
    ///
    /// # Errors
    ///
    /// Any [`ConstructError`]: bad class counts or diameters, invalid
    /// interaction traits or supplied matrices, parameter conflicts, bad
    /// overrides, or a [`CompileError`](tidepool_compiler::CompileError)
    /// from compiling the composed expressions.
    pub fn construct(&self) -> Result<ModelType, ConstructError> {
        let phyto = derive_diameters(FunctionalType::Phytoplankton, &self.phyto_diameters, self.n_phyto)?;
        let zoo = derive_diameters(FunctionalType::Zooplankton, &self.zoo_diameters, self.n_zoo)?;
        let classes = ClassSet::new(&phyto, &zoo);
        debug!("phytoplankton diameters {phyto:?}, zooplankton diameters {zoo:?}");

        let (palatability, assimilation_efficiency) = resolve_matrices(
            &classes,
            &self.interaction_args,
            self.palatability_matrix.as_ref(),
            self.assimilation_efficiency_matrix.as_ref(),
        )?;

        let composition = compose(
            &classes,
            ComposeInputs {
                phyto_args: &self.phyto_args,
                zoo_args: &self.zoo_args,
                bgc_args: &self.bgc_args,
                light_limitation: self.light_limitation,
                palatability: &palatability,
                assimilation_efficiency: &assimilation_efficiency,
            },
        )?;
        let tracers = composition.tracers().to_vec();
        let mut parameters = composition.parameters.clone();
        let mut expressions: Vec<Expr> = tracers.iter().map(|t| composition.expression(t)).collect();
        self.apply_overrides(&tracers, &mut expressions, &mut parameters)?;

        let mut definition = TracerDefinition::new(
            parameters.iter().map(|(n, v)| (n.to_owned(), v)),
            tracers.iter().cloned().zip(expressions),
        )
        .auxiliary_fields(self.auxiliary_fields.iter().cloned())
        .helper_functions(self.helper_functions.clone());
        if let Some(grid) = &self.grid {
            definition = definition.grid(grid.clone());
        }
        if let Some(sinking) = &self.sinking {
            definition = definition
                .sinking_tracers(sinking.speeds.iter().map(|(n, w)| (n.clone(), *w)))
                .open_bottom(sinking.open_bottom)
                .smoothing_distance(sinking.smoothing_distance);
        }
        let system = definition.compile()?;

        info!(
            "constructed NiPiZD model with {} phytoplankton, {} zooplankton, {} tracers and {} parameters",
            self.n_phyto,
            self.n_zoo,
            tracers.len(),
            parameters.len()
        );
        Ok(ModelType {
            config: self.clone(),
            classes,
            parameters,
            palatability,
            assimilation_efficiency,
            network: composition.network,
            system,
        })
    }

    fn apply_overrides(
        &self,
        tracers: &[String],
        expressions: &mut [Expr],
        parameters: &mut ParameterSet,
    ) -> Result<(), ConstructError> {
        for (tracer, over) in &self.tracer_overrides {
            let position = tracers
                .iter()
                .position(|t| t == tracer)
                .ok_or_else(|| ConstructError::UnknownOverrideTracer {
                    tracer: tracer.clone(),
                })?;
            let own = over
                .parameters
                .as_ref()
                .ok_or_else(|| ConstructError::OverrideWithoutParameters {
                    tracer: tracer.clone(),
                })?;
            for symbol in over.expression.free_symbols() {
                let declared_elsewhere = tracers.iter().any(|t| t == symbol)
                    || self.auxiliary_fields.iter().any(|a| a == symbol)
                    || Coordinate::from_name(symbol).is_some()
                    || self.helper_functions.get(symbol).is_some();
                if !declared_elsewhere && !own.contains_key(symbol) {
                    return Err(ConstructError::OverrideUnboundParameter {
                        tracer: tracer.clone(),
                        symbol: symbol.to_owned(),
                    });
                }
            }
            for (name, value) in own {
                parameters.register(name.as_str(), *value)?;
            }
            debug!("tracer `{tracer}` uses an override expression");
            expressions[position] = over.expression.clone();
        }
        Ok(())
    }
}

/// New values for [`ModelType::instantiate`]. Absent fields keep the model
/// type's values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Instantiation {
    /// Phytoplankton diameters.
    pub phyto_diameters: Option<DiameterSpec>,
    /// Zooplankton diameters.
    pub zoo_diameters: Option<DiameterSpec>,
    /// Phytoplankton parameters.
    pub phyto_args: Option<PhytoplanktonArgs>,
    /// Zooplankton parameters.
    pub zoo_args: Option<ZooplanktonArgs>,
    /// Feeding traits.
    pub interaction_args: Option<InteractionArgs>,
    /// Nutrient and detritus parameters.
    pub bgc_args: Option<BiogeochemistryArgs>,
    /// Palatability matrix.
    pub palatability_matrix: Option<InteractionMatrix>,
    /// Assimilation efficiency matrix.
    pub assimilation_efficiency_matrix: Option<InteractionMatrix>,
}

/// A constructed model: classes, parameters, matrices, expressions and the
/// compiled tracer functions.
#[derive(Debug, Clone)]
pub struct ModelType {
    config: NiPiZD,
    classes: ClassSet,
    parameters: ParameterSet,
    palatability: InteractionMatrix,
    assimilation_efficiency: InteractionMatrix,
    network: FluxNetwork,
    system: TracerSystem,
}

impl ModelType {
    /// Tracer names: `N`, `D`, `P1..Pn`, `Z1..Zm`.
    #[must_use]
    pub fn tracer_names(&self) -> &[String] {
        self.system.tracer_names()
    }

    /// Compiled function of `tracer`.
    #[must_use]
    pub fn function(&self, tracer: &str) -> Option<&TracerFunction> {
        self.system.function(tracer)
    }

    /// Expression of `tracer`, composed or overridden.
    #[must_use]
    pub fn expression(&self, tracer: &str) -> Option<&Expr> {
        self.system.expression(tracer)
    }

    /// The compiled system.
    #[must_use]
    pub fn system(&self) -> &TracerSystem {
        &self.system
    }

    /// Flattened parameters.
    #[must_use]
    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    /// Size classes.
    #[must_use]
    pub fn classes(&self) -> &ClassSet {
        &self.classes
    }

    /// Diameters of one functional type in ordinal order.
    #[must_use]
    pub fn diameters(&self, functional_type: FunctionalType) -> Vec<f64> {
        let classes = match functional_type {
            FunctionalType::Phytoplankton => self.classes.phytoplankton(),
            FunctionalType::Zooplankton => self.classes.zooplankton(),
        };
        classes.iter().map(|c| c.diameter()).collect()
    }

    /// Palatability matrix.
    #[must_use]
    pub fn palatability(&self) -> &InteractionMatrix {
        &self.palatability
    }

    /// Assimilation efficiency matrix.
    #[must_use]
    pub fn assimilation_efficiency(&self) -> &InteractionMatrix {
        &self.assimilation_efficiency
    }

    /// Fluxes behind the composed expressions.
    #[must_use]
    pub fn network(&self) -> &FluxNetwork {
        &self.network
    }

    /// The configuration this model type was built from.
    #[must_use]
    pub fn configuration(&self) -> &NiPiZD {
        &self.config
    }

    /// Rebuilds the model with new diameters, parameters or matrices.
    ///
    /// Class counts, light limitation, overrides, auxiliary fields, helpers,
    /// sinking and grid are kept.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructError::InstantiationClassCount`] if explicit
    /// diameters disagree with the class counts, or any error of
    /// [`NiPiZD::construct`].
    pub fn instantiate(&self, with: Instantiation) -> Result<ModelType, ConstructError> {
        let mut config = self.config.clone();
        for (functional_type, spec, expected) in [
            (FunctionalType::Phytoplankton, &with.phyto_diameters, config.n_phyto),
            (FunctionalType::Zooplankton, &with.zoo_diameters, config.n_zoo),
        ] {
            if let Some(DiameterSpec::Explicit(values)) = spec {
                if values.len() != expected {
                    return Err(ConstructError::InstantiationClassCount {
                        functional_type,
                        expected,
                        found: values.len(),
                    });
                }
            }
        }
        if let Some(d) = with.phyto_diameters {
            config.phyto_diameters = d;
        }
        if let Some(d) = with.zoo_diameters {
            config.zoo_diameters = d;
        }
        if let Some(a) = with.phyto_args {
            config.phyto_args = a;
        }
        if let Some(a) = with.zoo_args {
            config.zoo_args = a;
        }
        if let Some(a) = with.interaction_args {
            config.interaction_args = a;
        }
        if let Some(a) = with.bgc_args {
            config.bgc_args = a;
        }
        if let Some(m) = with.palatability_matrix {
            config.palatability_matrix = Some(m);
        }
        if let Some(m) = with.assimilation_efficiency_matrix {
            config.assimilation_efficiency_matrix = Some(m);
        }
        config.construct()
    }
}
