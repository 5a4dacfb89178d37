//! Per-step metrics and cumulative diagnostics.
//!
//! [`StepMetrics`] captures timing and cell counts for a single step.
//! [`Diagnostics`] aggregates the counters a host may want to surface
//! without treating them as errors, most notably how many cells were
//! skipped because of numeric singularities.

use gontar_core::Iteration;

/// Timing and cell counts collected during a single step.
///
/// All durations are in microseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepMetrics {
    /// Iteration this step completed.
    pub iteration: Iteration,
    /// Wall-clock time for the entire step.
    pub total_us: u64,
    /// Time spent in the kinetics pass.
    pub kinetics_us: u64,
    /// Time spent transferring next into current.
    pub transfer_us: u64,
    /// Time spent notifying observers.
    pub notify_us: u64,
    /// Ring cells rewritten because the boundary policy changed.
    pub boundary_cells_written: usize,
    /// Interior cells updated by the kinetics.
    pub updated_cells: usize,
    /// Interior cells skipped because of a numeric singularity.
    pub skipped_cells: usize,
    /// Distinct injection blocks replayed after the transfer.
    pub replayed_injections: usize,
}

/// Cumulative counters shared between a vessel and its handles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Last completed iteration.
    pub iteration: Iteration,
    /// Total interior cells skipped across all steps.
    pub singular_cells: u64,
    /// Steps that skipped at least one cell.
    pub steps_with_singularities: u64,
    /// Total injections accepted.
    pub injections: u64,
    /// Distinct injection blocks that arrived mid-step and were replayed.
    pub replayed_injections: u64,
}
