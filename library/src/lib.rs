//! Tidepool kernel library.
//!
//! Every biological process a Tidepool model can use is a **kernel**: a pure
//! `f64` function with a fixed, named argument list and no internal state.
//! Kernels are grouped by process family and collected in a single
//! registry, [`KERNELS`], which the tracer compiler resolves call sites
//! against.
//!
//! # Entry Point
//!
//! ```
//! use tidepool_library::{find_kernel, nutrients::monod_limitation};
//!
//! let kernel = find_kernel("monod_limitation").unwrap();
//! assert_eq!(kernel.arity(), 2);
//! assert_eq!(kernel.call(&[1.0, 1.0]), Some(monod_limitation(1.0, 1.0)));
//! ```
//!
//! # Module Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`allometry`] | Power-law scaling, unimodal palatability, binary assimilation |
//! | [`nutrients`] | Monod limitation |
//! | [`photosynthesis`] | Smith, Geider and DARWIN light limitation, photosynthetic growth |
//! | [`growth`] | Carbon-specific growth |
//! | [`mortality`] | Linear and quadratic losses |
//! | [`predation`] | Holling type II, idealized and preferential predation |
//! | [`remineralization`] | Detritus remineralization |
//! | [`math`] | Elementary functions usable in expressions |
//!
//! The crate is `#![no_std]`; transcendental functions come from `libm`.

#![no_std]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod allometry;
pub mod growth;
pub mod math;
pub mod mortality;
pub mod nutrients;
pub mod photosynthesis;
pub mod predation;
mod registry;
pub mod remineralization;

pub use registry::{find_kernel, KernelFn, KernelSpec, KERNELS, MAX_KERNEL_ARITY};
