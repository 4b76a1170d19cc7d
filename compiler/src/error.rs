//! Compilation errors.

use std::fmt;

/// Coarse classification shared by every Tidepool error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Shape or count mismatches, missing grid, invalid numeric settings.
    Configuration,
    /// Unresolved symbols, unknown functions, reserved or ambiguous names.
    NameResolution,
    /// Caller-supplied pieces that do not fit together.
    Consistency,
}

/// What a declared name was declared as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationRole {
    /// A model parameter.
    Parameter,
    /// A tracer.
    Tracer,
    /// An auxiliary field.
    AuxiliaryField,
    /// A caller-supplied helper function.
    HelperFunction,
    /// A library kernel.
    Kernel,
}

impl fmt::Display for DeclarationRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeclarationRole::Parameter => "parameter",
            DeclarationRole::Tracer => "tracer",
            DeclarationRole::AuxiliaryField => "auxiliary field",
            DeclarationRole::HelperFunction => "helper function",
            DeclarationRole::Kernel => "library kernel",
        })
    }
}

/// Errors raised while validating or compiling tracer expressions.
///
/// Every variant names the offending entity.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    /// A symbol reference resolves to nothing.
    #[error("unresolved symbol `{symbol}` in tracer `{tracer}`")]
    UnresolvedSymbol {
        /// The unresolved name.
        symbol: String,
        /// Tracer whose expression references it.
        tracer: String,
    },
    /// A call site names neither a kernel nor a helper.
    #[error("unknown function `{function}` called in tracer `{tracer}`")]
    UnknownFunction {
        /// The called name.
        function: String,
        /// Tracer whose expression calls it.
        tracer: String,
    },
    /// A call passes the wrong number of arguments.
    #[error(
        "function `{function}` takes {expected} argument(s) but tracer `{tracer}` passes {found}"
    )]
    ArityMismatch {
        /// The called name.
        function: String,
        /// Tracer whose expression calls it.
        tracer: String,
        /// Declared arity.
        expected: usize,
        /// Arguments at the call site.
        found: usize,
    },
    /// A declared name shadows a coordinate (`x`, `y`, `z`, `t`).
    #[error("`{name}` is reserved for a coordinate and cannot be declared as a {role}")]
    ReservedName {
        /// The reserved name.
        name: String,
        /// What it was declared as.
        role: DeclarationRole,
    },
    /// A name is declared twice.
    #[error("`{name}` is declared as both a {first} and a {second}")]
    AmbiguousName {
        /// The duplicated name.
        name: String,
        /// First declaration.
        first: DeclarationRole,
        /// Second declaration.
        second: DeclarationRole,
    },
    /// A parameter override names no declared parameter.
    #[error("unknown parameter `{name}`")]
    UnknownParameter {
        /// The unknown name.
        name: String,
    },
    /// Sinking was requested but no grid was given.
    #[error("sinking requested for tracer `{tracer}` but no grid was supplied")]
    SinkingWithoutGrid {
        /// First sinking tracer.
        tracer: String,
    },
    /// Sinking speeds must be positive and finite.
    #[error("sinking speed for tracer `{tracer}` must be positive and finite, got {speed}")]
    InvalidSinkingSpeed {
        /// The sinking tracer.
        tracer: String,
        /// The rejected speed.
        speed: f64,
    },
    /// Sinking was requested for a tracer that is not declared.
    #[error("sinking requested for undeclared tracer `{tracer}`")]
    UnknownSinkingTracer {
        /// The undeclared name.
        tracer: String,
    },
    /// A helper declares more arguments than the evaluator buffer holds.
    #[error("helper function `{name}` declares {arity} arguments; at most {max} are supported")]
    HelperArity {
        /// Helper name.
        name: String,
        /// Declared arity.
        arity: usize,
        /// Largest supported arity.
        max: usize,
    },
    /// The vertical grid is malformed.
    #[error("invalid vertical grid: {reason}")]
    InvalidGrid {
        /// What is wrong with it.
        reason: String,
    },
    /// Column evaluation was requested on a system compiled without a grid.
    #[error("column evaluation requires a vertical grid")]
    ColumnWithoutGrid,
    /// Column input does not match the grid or the declared tracers.
    #[error("column {what} has length {found}, expected {expected}")]
    ColumnShape {
        /// Which input is mis-sized.
        what: &'static str,
        /// Expected length.
        expected: usize,
        /// Supplied length.
        found: usize,
    },
}

impl CompileError {
    /// Returns the coarse classification of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            CompileError::UnresolvedSymbol { .. }
            | CompileError::UnknownFunction { .. }
            | CompileError::ArityMismatch { .. }
            | CompileError::ReservedName { .. }
            | CompileError::AmbiguousName { .. }
            | CompileError::UnknownParameter { .. } => ErrorKind::NameResolution,
            CompileError::SinkingWithoutGrid { .. }
            | CompileError::InvalidSinkingSpeed { .. }
            | CompileError::UnknownSinkingTracer { .. }
            | CompileError::HelperArity { .. }
            | CompileError::InvalidGrid { .. }
            | CompileError::ColumnWithoutGrid
            | CompileError::ColumnShape { .. } => ErrorKind::Configuration,
        }
    }
}
