//! Tracer definitions and the compiled systems they produce.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, info};

use crate::compile::{Frame, Node};
use crate::coordinates::{Column, Coordinates};
use crate::error::CompileError;
use crate::expr::Expr;
use crate::grid::VerticalGrid;
use crate::helpers::HelperFunctions;
use crate::resolve::SymbolTable;
use crate::sinking::{SinkingProfile, DEFAULT_SMOOTHING_DISTANCE};

/// Everything needed to compile a set of tracer equations.
///
/// ```
/// use tidepool_compiler::{Coordinates, Expr, TracerDefinition};
///
/// let system = TracerDefinition::new(
///     [("alpha", 2.0), ("beta", 0.5), ("gamma", 1.0), ("delta", 0.25)],
///     [
///         ("R", "alpha * R - beta * R * F".parse::<Expr>()?),
///         ("F", "delta * R * F - gamma * F".parse::<Expr>()?),
///     ],
/// )
/// .auxiliary_fields(Vec::<String>::new())
/// .compile()?;
///
/// let rates = system.evaluate_all(&Coordinates::default(), &[1.0, 2.0], &[]);
/// assert_eq!(rates, vec![1.0, -1.5]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct TracerDefinition {
    parameters: Vec<(String, f64)>,
    tracers: Vec<(String, Expr)>,
    auxiliary_fields: Vec<String>,
    helper_functions: HelperFunctions,
    sinking_tracers: BTreeMap<String, f64>,
    grid: Option<VerticalGrid>,
    open_bottom: bool,
    smoothing_distance: f64,
}

impl TracerDefinition {
    /// Parameters with their default values and one expression per tracer,
    /// both in declaration order.
    ///
    /// Auxiliary fields default to a single `PAR`; no helpers, no sinking,
    /// open bottom.
    pub fn new<P, T>(
        parameters: impl IntoIterator<Item = (P, f64)>,
        tracers: impl IntoIterator<Item = (T, Expr)>,
    ) -> Self
    where
        P: Into<String>,
        T: Into<String>,
    {
        TracerDefinition {
            parameters: parameters.into_iter().map(|(n, v)| (n.into(), v)).collect(),
            tracers: tracers.into_iter().map(|(n, e)| (n.into(), e)).collect(),
            auxiliary_fields: vec!["PAR".to_owned()],
            helper_functions: HelperFunctions::new(),
            sinking_tracers: BTreeMap::new(),
            grid: None,
            open_bottom: true,
            smoothing_distance: DEFAULT_SMOOTHING_DISTANCE,
        }
    }

    /// Replaces the auxiliary field list.
    #[must_use]
    pub fn auxiliary_fields<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.auxiliary_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the helper-function namespace.
    #[must_use]
    pub fn helper_functions(mut self, helpers: HelperFunctions) -> Self {
        self.helper_functions = helpers;
        self
    }

    /// Sets downward sinking speeds per tracer.
    #[must_use]
    pub fn sinking_tracers<S: Into<String>>(mut self, speeds: impl IntoIterator<Item = (S, f64)>) -> Self {
        self.sinking_tracers = speeds.into_iter().map(|(n, w)| (n.into(), w)).collect();
        self
    }

    /// Sets the vertical grid used for sinking and column evaluation.
    #[must_use]
    pub fn grid(mut self, grid: VerticalGrid) -> Self {
        self.grid = Some(grid);
        self
    }

    /// Whether sinking material may leave through the bottom face.
    #[must_use]
    pub fn open_bottom(mut self, open_bottom: bool) -> Self {
        self.open_bottom = open_bottom;
        self
    }

    /// Distance above the bottom over which a closed bottom ramps sinking
    /// speeds to zero.
    #[must_use]
    pub fn smoothing_distance(mut self, distance: f64) -> Self {
        self.smoothing_distance = distance;
        self
    }

    /// Validates every declaration and expression, then compiles.
    ///
    /// Nothing is lowered until every expression has been checked, so a
    /// failure never leaves a partial system behind.
    ///
    /// # Errors
    ///
    /// - [`CompileError::ReservedName`] / [`CompileError::AmbiguousName`] for
    ///   bad declarations,
    /// - [`CompileError::UnresolvedSymbol`], [`CompileError::UnknownFunction`]
    ///   or [`CompileError::ArityMismatch`] for bad expressions,
    /// - [`CompileError::SinkingWithoutGrid`],
    ///   [`CompileError::UnknownSinkingTracer`],
    ///   [`CompileError::InvalidSinkingSpeed`] or [`CompileError::InvalidGrid`]
    ///   for bad sinking settings.
    pub fn compile(&self) -> Result<TracerSystem, CompileError> {
        let table = SymbolTable::build(
            self.parameters.iter().map(|(n, _)| n.as_str()),
            self.tracers.iter().map(|(n, _)| n.as_str()),
            self.auxiliary_fields.iter().map(String::as_str),
            &self.helper_functions,
        )?;
        for (name, expr) in &self.tracers {
            table.check(name, expr)?;
        }
        debug!(
            "resolved {} tracer expressions against {} parameters and {} auxiliary fields",
            self.tracers.len(),
            self.parameters.len(),
            self.auxiliary_fields.len()
        );

        let sinking = self.sinking_profiles()?;

        let values: Arc<[f64]> = self.parameters.iter().map(|(_, v)| *v).collect();
        let functions = self
            .tracers
            .iter()
            .enumerate()
            .map(|(index, (name, expr))| TracerFunction {
                name: name.clone(),
                index,
                root: Arc::new(Node::lower(expr, &table)),
                parameters: Arc::clone(&values),
                sinking: sinking.get(name).cloned(),
            })
            .collect();

        info!(
            "compiled {} tracers ({} sinking)",
            self.tracers.len(),
            sinking.len()
        );
        Ok(TracerSystem {
            parameters: ParameterTable {
                names: self.parameters.iter().map(|(n, _)| n.clone()).collect(),
                values,
            },
            tracer_names: self.tracers.iter().map(|(n, _)| n.clone()).collect(),
            auxiliary_fields: self.auxiliary_fields.clone(),
            expressions: self.tracers.iter().map(|(_, e)| e.clone()).collect(),
            functions,
            grid: self.grid.clone(),
        })
    }

    fn sinking_profiles(&self) -> Result<BTreeMap<String, Arc<SinkingProfile>>, CompileError> {
        let mut profiles = BTreeMap::new();
        for (tracer, &speed) in &self.sinking_tracers {
            let grid = self.grid.as_ref().ok_or_else(|| CompileError::SinkingWithoutGrid {
                tracer: tracer.clone(),
            })?;
            if !self.tracers.iter().any(|(n, _)| n == tracer) {
                return Err(CompileError::UnknownSinkingTracer {
                    tracer: tracer.clone(),
                });
            }
            if !(speed.is_finite() && speed > 0.0) {
                return Err(CompileError::InvalidSinkingSpeed {
                    tracer: tracer.clone(),
                    speed,
                });
            }
            if !self.open_bottom && !(self.smoothing_distance.is_finite() && self.smoothing_distance > 0.0) {
                return Err(CompileError::InvalidGrid {
                    reason: format!(
                        "smoothing distance must be positive and finite, got {}",
                        self.smoothing_distance
                    ),
                });
            }
            let profile = SinkingProfile::new(speed, grid, self.open_bottom, self.smoothing_distance);
            debug!(
                "tracer `{tracer}` sinks at {speed} with bottom face speed {:?}",
                profile.speed_at(0)
            );
            profiles.insert(tracer.clone(), Arc::new(profile));
        }
        Ok(profiles)
    }
}

/// Compiles a [`TracerDefinition`]; the same as
/// [`TracerDefinition::compile`].
///
/// # Errors
///
/// See [`TracerDefinition::compile`].
pub fn define_tracer_functions(definition: &TracerDefinition) -> Result<TracerSystem, CompileError> {
    definition.compile()
}

/// Parameter names with the values currently bound to them.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterTable {
    names: Vec<String>,
    values: Arc<[f64]>,
}

impl ParameterTable {
    /// Value bound to `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.index_of(name).map(|i| self.values[i])
    }

    /// Position of `name` in declaration order.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.names.iter().map(String::as_str).zip(self.values.iter().copied())
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// The compiled derivative of one tracer.
///
/// Cheap to clone; clones share the compiled tree and parameter vector.
#[derive(Debug, Clone)]
pub struct TracerFunction {
    name: String,
    index: usize,
    root: Arc<Node>,
    parameters: Arc<[f64]>,
    sinking: Option<Arc<SinkingProfile>>,
}

impl TracerFunction {
    /// Tracer name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Local rate of change at a point, without sinking.
    ///
    /// `tracers` and `auxiliary` are in declaration order; a value missing
    /// from a short slice reads as NaN.
    #[must_use]
    pub fn evaluate(&self, coordinates: &Coordinates, tracers: &[f64], auxiliary: &[f64]) -> f64 {
        self.root.eval(&Frame {
            coordinates,
            parameters: &self.parameters,
            tracers,
            auxiliary,
        })
    }

    /// Rate of change of cell `column.level`, including sinking divergence
    /// when this tracer sinks.
    ///
    /// Returns NaN if the level lies outside the grid of a sinking tracer.
    #[must_use]
    pub fn evaluate_in_column(
        &self,
        coordinates: &Coordinates,
        tracers: &[f64],
        auxiliary: &[f64],
        column: Column<'_>,
    ) -> f64 {
        let local = self.evaluate(coordinates, tracers, auxiliary);
        match &self.sinking {
            None => local,
            Some(profile) if column.level >= profile.levels() => f64::NAN,
            Some(profile) => {
                let here = tracers.get(self.index).copied().unwrap_or(f64::NAN);
                let above = column
                    .above
                    .map(|a| a.get(self.index).copied().unwrap_or(f64::NAN));
                local + profile.divergence(column.level, here, above)
            }
        }
    }

    /// Whether the tracer sinks.
    #[must_use]
    pub fn sinks(&self) -> bool {
        self.sinking.is_some()
    }

    /// Configured sinking speed, if the tracer sinks.
    #[must_use]
    pub fn sinking_speed(&self) -> Option<f64> {
        self.sinking.as_ref().map(|p| p.speed())
    }

    /// Effective sinking speed on the bottom face of cell `level`.
    ///
    /// `None` if the tracer does not sink or the level is off the grid.
    #[must_use]
    pub fn sinking_speed_at(&self, level: usize) -> Option<f64> {
        self.sinking.as_ref().and_then(|p| p.speed_at(level))
    }
}

/// A compiled set of tracer functions sharing one parameter vector.
#[derive(Debug, Clone)]
pub struct TracerSystem {
    parameters: ParameterTable,
    tracer_names: Vec<String>,
    auxiliary_fields: Vec<String>,
    expressions: Vec<Expr>,
    functions: Vec<TracerFunction>,
    grid: Option<VerticalGrid>,
}

impl TracerSystem {
    /// Tracer names in declaration order.
    #[must_use]
    pub fn tracer_names(&self) -> &[String] {
        &self.tracer_names
    }

    /// Auxiliary field names in declaration order.
    #[must_use]
    pub fn auxiliary_fields(&self) -> &[String] {
        &self.auxiliary_fields
    }

    /// Bound parameters.
    #[must_use]
    pub fn parameters(&self) -> &ParameterTable {
        &self.parameters
    }

    /// Value bound to parameter `name`.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<f64> {
        self.parameters.get(name)
    }

    /// Position of tracer `name`.
    #[must_use]
    pub fn tracer_index(&self, name: &str) -> Option<usize> {
        self.tracer_names.iter().position(|n| n == name)
    }

    /// Compiled function of tracer `name`.
    #[must_use]
    pub fn function(&self, name: &str) -> Option<&TracerFunction> {
        self.tracer_index(name).map(|i| &self.functions[i])
    }

    /// Compiled functions in declaration order.
    #[must_use]
    pub fn functions(&self) -> &[TracerFunction] {
        &self.functions
    }

    /// Source expression of tracer `name`.
    #[must_use]
    pub fn expression(&self, name: &str) -> Option<&Expr> {
        self.tracer_index(name).map(|i| &self.expressions[i])
    }

    /// The grid the system was compiled with.
    #[must_use]
    pub fn grid(&self) -> Option<&VerticalGrid> {
        self.grid.as_ref()
    }

    /// Local rates of every tracer at one point.
    #[must_use]
    pub fn evaluate_all(&self, coordinates: &Coordinates, tracers: &[f64], auxiliary: &[f64]) -> Vec<f64> {
        self.functions
            .iter()
            .map(|f| f.evaluate(coordinates, tracers, auxiliary))
            .collect()
    }

    /// Rates of every tracer in every cell of the grid, sinking included.
    ///
    /// `tracers[k]` and `auxiliary[k]` hold the values of cell `k` (0 at the
    /// bottom). `coordinates.z` is replaced by each cell centre.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::ColumnWithoutGrid`] if the system has no grid
    /// and [`CompileError::ColumnShape`] if an input does not match the grid
    /// or the declarations.
    pub fn column_tendencies(
        &self,
        coordinates: &Coordinates,
        tracers: &[Vec<f64>],
        auxiliary: &[Vec<f64>],
    ) -> Result<Vec<Vec<f64>>, CompileError> {
        let grid = self.grid.as_ref().ok_or(CompileError::ColumnWithoutGrid)?;
        let levels = grid.levels();
        check_len("tracer levels", levels, tracers.len())?;
        check_len("auxiliary levels", levels, auxiliary.len())?;
        for (row, aux) in tracers.iter().zip(auxiliary) {
            check_len("tracer row", self.tracer_names.len(), row.len())?;
            check_len("auxiliary row", self.auxiliary_fields.len(), aux.len())?;
        }
        Ok((0..levels)
            .map(|level| {
                let at = Coordinates {
                    z: grid.centre(level),
                    ..*coordinates
                };
                let column = Column {
                    level,
                    above: tracers.get(level + 1).map(Vec::as_slice),
                };
                self.functions
                    .iter()
                    .map(|f| f.evaluate_in_column(&at, &tracers[level], &auxiliary[level], column))
                    .collect()
            })
            .collect())
    }

    /// A system with the same compiled trees and some parameters rebound.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::UnknownParameter`] for a name that is not a
    /// declared parameter.
    pub fn with_parameters<'a>(
        &self,
        overrides: impl IntoIterator<Item = (&'a str, f64)>,
    ) -> Result<TracerSystem, CompileError> {
        let mut values = self.parameters.values.to_vec();
        for (name, value) in overrides {
            let i = self
                .parameters
                .index_of(name)
                .ok_or_else(|| CompileError::UnknownParameter { name: name.to_owned() })?;
            values[i] = value;
        }
        let values: Arc<[f64]> = values.into();
        Ok(TracerSystem {
            parameters: ParameterTable {
                names: self.parameters.names.clone(),
                values: Arc::clone(&values),
            },
            functions: self
                .functions
                .iter()
                .map(|f| TracerFunction {
                    parameters: Arc::clone(&values),
                    ..f.clone()
                })
                .collect(),
            ..self.clone()
        })
    }
}

fn check_len(what: &'static str, expected: usize, found: usize) -> Result<(), CompileError> {
    if expected == found {
        Ok(())
    } else {
        Err(CompileError::ColumnShape { what, expected, found })
    }
}
