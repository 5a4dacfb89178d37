//! Concentration storage for the Gontar engine.
//!
//! [`ConcentrationGrid`] is a three-plane, row-major field of `f64`
//! concentrations. [`BufferPair`] couples a lock-guarded **current** grid
//! ([`SharedGrid`]) with a private **next** grid and a scratch copy, and
//! performs the per-step snapshot/transfer cycle. [`Frame`] is the owned,
//! immutable result handed to consumers after each step.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod frame;
pub mod grid;
pub mod pair;
pub mod shared;

pub use frame::{ChannelStats, Frame};
pub use grid::ConcentrationGrid;
pub use pair::{BufferPair, PublishReport, StepGuard};
pub use shared::{InjectionReceipt, SharedGrid};
