//! Boundary policies and the Gontar reaction kinetics.
//!
//! Both halves are pure with respect to the grids they are given:
//!
//! 1. [`boundary`]: ring values for each [`BoundaryCondition`](gontar_core::BoundaryCondition).
//! 2. [`gontar`]: next-step concentrations of every interior cell from
//!    its 3x3 neighbourhood means.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod boundary;
pub mod gontar;
pub mod neighbourhood;

pub use boundary::{apply_boundary, ring_values};
pub use gontar::{CellOutcome, GontarKinetics, KineticsReport, Singularity};
pub use neighbourhood::neighbourhood_mean;
