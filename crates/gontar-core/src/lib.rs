//! Core types for the Gontar reaction-diffusion engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared across the workspace: reactant channels, the
//! boundary-condition selector, kinetic parameters and their validated
//! limits, the iteration counter, and the error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod boundary;
pub mod channel;
pub mod error;
pub mod id;
pub mod params;

pub use boundary::BoundaryCondition;
pub use channel::{Channel, Injection};
pub use error::{ParseBoundaryError, ValidationError};
pub use id::Iteration;
pub use params::{
    Coefficient, Dimension, KineticParams, Limits, Parameter, Range, INITIAL_CONCENTRATIONS,
    MIN_CONCENTRATION,
};
