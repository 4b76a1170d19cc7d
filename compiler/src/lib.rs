//! Tidepool tracer compiler.
//!
//! Turns a set of symbolic tracer expressions into thread-safe derivative
//! functions an external integrator can call once per cell and time step.
//!
//! # Pipeline
//!
//! ```text
//! TracerDefinition ──► SymbolTable ──► check every Expr ──► lower to Node ──► TracerSystem
//!   parameters           values: x y z t, params,           fold literal       TracerFunction
//!   tracers: Expr          tracers, auxiliary fields        and kernel         per tracer, plus
//!   auxiliary fields     functions: kernels, helpers        subtrees           sinking profile
//! ```
//!
//! Validation is complete before anything is lowered: a definition either
//! compiles in full or fails with one [`CompileError`].
//!
//! # Example: Lotka-Volterra
//!
//! ```
//! use tidepool_compiler::{define_tracer_functions, Coordinates, Expr, TracerDefinition};
//!
//! let definition = TracerDefinition::new(
//!     [("alpha", 0.1), ("beta", 0.02), ("gamma", 0.3), ("delta", 0.01)],
//!     [
//!         ("R", "alpha * R - beta * R * F".parse::<Expr>()?),
//!         ("F", "delta * R * F - gamma * F".parse::<Expr>()?),
//!     ],
//! )
//! .auxiliary_fields(Vec::<String>::new());
//!
//! let system = define_tracer_functions(&definition)?;
//! let dr = system.function("R").map(|f| f.evaluate(&Coordinates::default(), &[10.0, 5.0], &[]));
//! assert_eq!(dr, Some(0.1 * 10.0 - 0.02 * 10.0 * 5.0));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Names
//!
//! | Namespace | Members | Rules |
//! |-----------|---------|-------|
//! | values | `x`, `y`, `z`, `t`, parameters, tracers, auxiliary fields | pairwise distinct; coordinates are reserved |
//! | functions | library kernels, helpers | helpers may not shadow a kernel; arity checked at every call |

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

mod compile;
pub mod coordinates;
pub mod error;
pub mod expr;
pub mod grid;
pub mod helpers;
pub mod parse;
mod resolve;
pub mod sinking;
mod system;

pub use coordinates::{Column, Coordinate, Coordinates, COORDINATE_NAMES};
pub use error::{CompileError, DeclarationRole, ErrorKind};
pub use expr::{BinaryOp, Expr, UnaryOp};
pub use grid::{GridSpec, VerticalGrid};
pub use helpers::{Helper, HelperFn, HelperFunctions};
pub use parse::ParseError;
pub use sinking::{SinkingProfile, DEFAULT_SMOOTHING_DISTANCE};
pub use system::{
    define_tracer_functions, ParameterTable, TracerDefinition, TracerFunction, TracerSystem,
};
