//! Construction errors.

use tidepool_compiler::{CompileError, ErrorKind};

use crate::classes::FunctionalType;

/// Errors raised while constructing or instantiating a model.
///
/// Each variant names the offending class, parameter, tracer or matrix
/// dimension. Compilation failures pass through unchanged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConstructError {
    /// A functional type was requested with zero classes.
    #[error("at least one {functional_type} class is required")]
    NoClasses {
        /// The empty functional type.
        functional_type: FunctionalType,
    },
    /// An explicit diameter list does not match the class count.
    #[error("{functional_type} diameters: expected {expected} values, got {found}")]
    DiameterCount {
        /// Functional type the diameters belong to.
        functional_type: FunctionalType,
        /// Requested class count.
        expected: usize,
        /// Supplied diameters.
        found: usize,
    },
    /// A diameter specification is malformed.
    #[error("{functional_type} diameters: {reason}")]
    InvalidDiameters {
        /// Functional type the diameters belong to.
        functional_type: FunctionalType,
        /// What is wrong with them.
        reason: String,
    },
    /// A splitting policy name is not recognised.
    #[error("unknown splitting policy `{name}` (expected `log_splitting` or `linear_splitting`)")]
    UnknownSplitting {
        /// The rejected name.
        name: String,
    },
    /// A parameter value is outside its admissible range.
    #[error("parameter `{name}` = {value} is invalid: {reason}")]
    InvalidParameter {
        /// Parameter or trait name.
        name: String,
        /// Rejected value.
        value: f64,
        /// Admissible range.
        reason: &'static str,
    },
    /// A per-class setting names a class that does not exist.
    #[error("{context} names unknown class `{class}`")]
    UnknownClass {
        /// The unknown class name.
        class: String,
        /// Where it was named.
        context: &'static str,
    },
    /// A supplied interaction matrix is not square or its rows are ragged.
    #[error("{matrix} matrix must be {rows} × {rows}, but row {row} has {columns} entries")]
    MatrixDimension {
        /// Which matrix.
        matrix: &'static str,
        /// Number of class names.
        rows: usize,
        /// Offending row.
        row: usize,
        /// Its length.
        columns: usize,
    },
    /// A supplied interaction matrix lacks a class.
    #[error("{matrix} matrix has no entry for class `{class}`")]
    MatrixMissingClass {
        /// Which matrix.
        matrix: &'static str,
        /// The missing class.
        class: String,
    },
    /// A supplied interaction matrix names a class outside the model.
    #[error("{matrix} matrix names unexpected class `{class}`")]
    MatrixUnexpectedClass {
        /// Which matrix.
        matrix: &'static str,
        /// The unexpected name.
        class: String,
    },
    /// A supplied interaction matrix orders its classes differently.
    #[error("{matrix} matrix has `{found}` at position {position}, expected `{expected}`")]
    MatrixOrder {
        /// Which matrix.
        matrix: &'static str,
        /// Position of the mismatch.
        position: usize,
        /// Class expected there.
        expected: String,
        /// Class found there.
        found: String,
    },
    /// A matrix entry lies outside `[0, 1]`.
    #[error("{matrix}[{predator}, {prey}] = {value} is outside [0, 1]")]
    MatrixEntry {
        /// Which matrix.
        matrix: &'static str,
        /// Row class.
        predator: String,
        /// Column class.
        prey: String,
        /// Rejected value.
        value: f64,
    },
    /// A flattened parameter was registered twice with different values.
    #[error("parameter `{name}` is bound to both {existing} and {new}")]
    ParameterConflict {
        /// The parameter.
        name: String,
        /// Value already registered.
        existing: f64,
        /// Conflicting value.
        new: f64,
    },
    /// A process needs a parameter that no parameter set provides.
    #[error("{process} for `{class}` needs parameter `{parameter}`, which no parameter set provides")]
    MissingParameter {
        /// The process.
        process: &'static str,
        /// Class the process applies to.
        class: String,
        /// The missing parameter.
        parameter: String,
    },
    /// A tracer override carries no parameter set of its own.
    #[error("override for tracer `{tracer}` must supply its own parameters")]
    OverrideWithoutParameters {
        /// Overridden tracer.
        tracer: String,
    },
    /// A tracer override uses a parameter it does not declare.
    #[error("override for tracer `{tracer}` uses `{symbol}`, which its parameters do not declare")]
    OverrideUnboundParameter {
        /// Overridden tracer.
        tracer: String,
        /// Undeclared symbol.
        symbol: String,
    },
    /// An override targets a tracer the model does not have.
    #[error("override for unknown tracer `{tracer}`")]
    UnknownOverrideTracer {
        /// The unknown tracer.
        tracer: String,
    },
    /// Instantiation supplied diameters for a different number of classes.
    #[error("instantiation gives {found} {functional_type} diameters but the model type has {expected} classes")]
    InstantiationClassCount {
        /// Functional type.
        functional_type: FunctionalType,
        /// Classes in the model type.
        expected: usize,
        /// Diameters supplied.
        found: usize,
    },
    /// A configuration document could not be read.
    #[error("invalid {format} configuration: {message}")]
    Document {
        /// `JSON` or `TOML`.
        format: &'static str,
        /// Deserializer message.
        message: String,
    },
    /// Compilation of the composed expressions failed.
    #[error(transparent)]
    Compile(#[from] CompileError),
}

impl ConstructError {
    /// Returns the coarse classification of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConstructError::Compile(inner) => inner.kind(),
            ConstructError::ParameterConflict { .. }
            | ConstructError::MissingParameter { .. }
            | ConstructError::OverrideWithoutParameters { .. }
            | ConstructError::OverrideUnboundParameter { .. } => ErrorKind::Consistency,
            _ => ErrorKind::Configuration,
        }
    }
}
