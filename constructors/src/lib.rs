//! Tidepool model constructors.
//!
//! Builds size-structured nutrient, phytoplankton, zooplankton and detritus
//! models from a handful of class counts, diameter ranges and allometric
//! parameter records. The result is a [`ModelType`] whose tracer functions
//! come from [`tidepool_compiler`].
//!
//! # Example
//!
//! ```
//! use tidepool_compiler::Coordinates;
//! use tidepool_constructors::NiPiZD;
//!
//! let model = NiPiZD { n_phyto: 1, n_zoo: 1, ..NiPiZD::default() }.construct()?;
//! assert_eq!(model.tracer_names(), ["N", "D", "P1", "Z1"]);
//!
//! let tendencies = model
//!     .system()
//!     .evaluate_all(&Coordinates::default(), &[1.0, 0.0, 0.1, 0.05], &[100.0]);
//! assert!(tendencies.iter().sum::<f64>().abs() < 1e-12);
//! # Ok::<(), tidepool_constructors::ConstructError>(())
//! ```
//!
//! # Module Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`classes`] | Functional types and size classes |
//! | [`allometry`] | Diameter derivation and size-dependent values |
//! | [`parameters`] | Typed parameter records and the flattened parameter set |
//! | [`interactions`] | Palatability and assimilation efficiency matrices |
//! | [`composer`] | Flux network and per-tracer expressions |
//! | [`model`] | `NiPiZD` configuration, construction and instantiation |

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod allometry;
pub mod classes;
pub mod composer;
pub mod error;
pub mod interactions;
pub mod model;
pub mod parameters;

pub use allometry::{derive_diameters, DiameterSpec, SizeDependent, Splitting};
pub use classes::{ClassSet, FunctionalType, SizeClass};
pub use composer::{compose, ComposeInputs, Composition, Flux, FluxNetwork, Sink};
pub use error::ConstructError;
pub use interactions::{
    build_matrices, resolve_matrices, FeedingTraits, InteractionArgs, InteractionMatrix,
};
pub use model::{Instantiation, ModelType, NiPiZD, SinkingConfig, TracerOverride};
pub use parameters::{
    BiogeochemistryArgs, LightLimitation, ParameterSet, PhytoplanktonArgs, ZooplanktonArgs,
};
