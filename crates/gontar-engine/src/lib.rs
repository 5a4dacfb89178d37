//! Simulation engine for the Gontar reaction-diffusion model.
//!
//! [`Vessel`] owns the double-buffered grid and advances it one step per
//! [`Vessel::step`] call. [`VesselHandle`] is a cloneable, thread-safe view
//! used to inject concentrations, retune parameters, select boundary
//! policies, and subscribe to frames from any thread. [`Simulation`] runs a
//! vessel's step loop on a dedicated background thread with cooperative
//! start/stop.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod handle;
pub mod metrics;
pub mod observer;
pub mod realtime;
pub mod vessel;

pub use config::{RunConfig, VesselConfig};
pub use handle::VesselHandle;
pub use metrics::{Diagnostics, StepMetrics};
pub use observer::{Delivery, ObserverId};
pub use realtime::{RunError, RunState, Simulation};
pub use vessel::Vessel;
