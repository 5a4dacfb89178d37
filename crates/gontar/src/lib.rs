//! Gontar: a three-species reaction-diffusion engine on a 2D grid.
//!
//! Gathers the vessel, its handles, and the grid and parameter types
//! under one crate, with a [`prelude`] for the names a host program
//! touches most. The `gontar-run` binary drives a vessel from the
//! command line.
//!
//! # Quick start
//!
//! ```rust
//! use gontar::prelude::*;
//!
//! let mut vessel = Vessel::new(VesselConfig::with_dims(32, 32)).unwrap();
//! vessel.set_boundary_condition(BoundaryCondition::XSine);
//! vessel.inject(16, 16, Injection::new(0.9, 0.05, 0.05));
//!
//! let frames = vessel.frame_channel();
//! let frame = vessel.step();
//! assert_eq!(frame.iteration(), Iteration(1));
//! assert_eq!(frames.recv().unwrap().iteration(), Iteration(1));
//!
//! let mean_b = frame.stats(Channel::B).mean;
//! assert!(mean_b > 0.0);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `gontar-core` | Channels, boundary selector, limits, parameters, errors |
//! | [`grid`] | `gontar-grid` | Concentration grids, the buffer pair, frames |
//! | [`kinetics`] | `gontar-kinetics` | Boundary policies and the reaction step |
//! | [`engine`] | `gontar-engine` | `Vessel`, `VesselHandle`, `Simulation` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, limits, and errors (`gontar-core`).
pub use gontar_core as types;

/// Grid storage and frames (`gontar-grid`).
///
/// Most users only need [`grid::Frame`], which is also in the [`prelude`].
pub use gontar_grid as grid;

/// Boundary policies and the reaction step (`gontar-kinetics`).
pub use gontar_kinetics as kinetics;

/// The simulation engine (`gontar-engine`).
///
/// [`engine::Vessel`] for synchronous stepping,
/// [`engine::Simulation`] for a background step loop.
pub use gontar_engine as engine;

/// Common imports for typical Gontar usage.
///
/// ```rust
/// use gontar::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use gontar_core::{
        BoundaryCondition, Channel, Coefficient, Dimension, Injection, Iteration, KineticParams,
        Limits, Parameter,
    };

    // Errors
    pub use gontar_core::ValidationError;
    pub use gontar_engine::RunError;

    // Frames
    pub use gontar_grid::{ChannelStats, Frame};

    // Engine
    pub use gontar_engine::{
        Delivery, Diagnostics, ObserverId, RunConfig, Simulation, StepMetrics, Vessel,
        VesselConfig, VesselHandle,
    };
}
