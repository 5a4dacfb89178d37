//! The single-threaded simulation core.
//!
//! A [`Vessel`] owns the grid pair and advances it one step per
//! [`step()`](Vessel::step) call. Each step:
//!
//! 1. Reapplies the boundary policy to the current grid if the selection
//!    changed since it was last applied.
//! 2. Snapshots current and mirrors its ring into next.
//! 3. Reacts every interior cell.
//! 4. Transfers next into current and replays mid-step injections.
//! 5. Publishes a [`Frame`] to observers, in registration order.
//!
//! Everything a host needs while the vessel steps on another thread is
//! reachable through its [`VesselHandle`].

use std::sync::Arc;
use std::time::Instant;

use gontar_core::{
    BoundaryCondition, Coefficient, Injection, Iteration, KineticParams, Limits, ValidationError,
};
use gontar_grid::{BufferPair, ConcentrationGrid, Frame, InjectionReceipt};
use gontar_kinetics::{apply_boundary, GontarKinetics};

use crate::config::VesselConfig;
use crate::handle::{Controls, VesselHandle};
use crate::metrics::{Diagnostics, StepMetrics};
use crate::observer::{Delivery, ObserverId};

/// A Gontar reaction-diffusion vessel.
pub struct Vessel {
    pair: BufferPair,
    handle: VesselHandle,
    /// Policy last written to the ring.
    applied_boundary: BoundaryCondition,
    iteration: Iteration,
    last_metrics: StepMetrics,
}

// Compile-time assertion: Vessel must be Send to move onto the step thread.
const _: fn() = || {
    fn assert<T: Send>() {}
    assert::<Vessel>();
};

impl Vessel {
    /// Build a vessel from `config`.
    ///
    /// Every value is checked against `config.limits` first; on failure the
    /// error names the offending parameter and nothing is allocated.
    pub fn new(config: VesselConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: VesselConfig) -> Self {
        let VesselConfig {
            width,
            height,
            params,
            boundary,
            limits,
        } = config;
        let pair = BufferPair::new(fresh_grid(width, height, boundary));
        let controls = Arc::new(Controls::new(limits, params, boundary));
        let handle = VesselHandle::new(Arc::clone(pair.current()), controls);
        Self {
            pair,
            handle,
            applied_boundary: boundary,
            iteration: Iteration::default(),
            last_metrics: StepMetrics::default(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────

    /// Grid width in cells.
    pub fn width(&self) -> usize {
        self.pair.dims().0
    }

    /// Grid height in cells.
    pub fn height(&self) -> usize {
        self.pair.dims().1
    }

    /// `(width, height)`.
    pub fn dims(&self) -> (usize, usize) {
        self.pair.dims()
    }

    /// Number of completed steps.
    pub fn iteration(&self) -> Iteration {
        self.iteration
    }

    /// The limits this vessel validates against.
    pub fn limits(&self) -> &Limits {
        self.handle.limits()
    }

    /// The coefficients the next step will use.
    pub fn params(&self) -> KineticParams {
        self.handle.params()
    }

    /// A thread-safe handle sharing this vessel's grid and controls.
    pub fn handle(&self) -> VesselHandle {
        self.handle.clone()
    }

    /// Metrics from the most recent step.
    pub fn last_metrics(&self) -> &StepMetrics {
        &self.last_metrics
    }

    /// Cumulative counters.
    pub fn diagnostics(&self) -> Diagnostics {
        self.handle.diagnostics()
    }

    /// A frame of the live current grid, without stepping. Includes any
    /// injections made since the last step.
    pub fn current_frame(&self) -> Frame {
        let iteration = self.iteration;
        self.pair
            .current()
            .read(|grid| Frame::capture(iteration, grid))
    }

    // ── Parameters ───────────────────────────────────────────────

    /// Total concentration `b`.
    pub fn b(&self) -> f64 {
        self.params().b
    }

    /// Set `b`. Out-of-range values are rejected.
    pub fn set_b(&mut self, value: f64) -> Result<(), ValidationError> {
        self.set_parameter(Coefficient::B, value)
    }

    /// Rate constant `K1`.
    pub fn k1(&self) -> f64 {
        self.params().k1
    }

    /// Set `K1`. Out-of-range values are rejected.
    pub fn set_k1(&mut self, value: f64) -> Result<(), ValidationError> {
        self.set_parameter(Coefficient::K1, value)
    }

    /// Feedback weight `W1`.
    pub fn w1(&self) -> f64 {
        self.params().w1
    }

    /// Set `W1`. Out-of-range values are rejected.
    pub fn set_w1(&mut self, value: f64) -> Result<(), ValidationError> {
        self.set_parameter(Coefficient::W1, value)
    }

    /// Rate constant `K2`.
    pub fn k2(&self) -> f64 {
        self.params().k2
    }

    /// Set `K2`. Out-of-range values are rejected.
    pub fn set_k2(&mut self, value: f64) -> Result<(), ValidationError> {
        self.set_parameter(Coefficient::K2, value)
    }

    /// Feedback weight `W2`.
    pub fn w2(&self) -> f64 {
        self.params().w2
    }

    /// Set `W2`. Out-of-range values are rejected.
    pub fn set_w2(&mut self, value: f64) -> Result<(), ValidationError> {
        self.set_parameter(Coefficient::W2, value)
    }

    /// Set any kinetic coefficient by name. Dimensions change through
    /// [`resize`](Self::resize).
    pub fn set_parameter(
        &mut self,
        coefficient: Coefficient,
        value: f64,
    ) -> Result<(), ValidationError> {
        self.handle.set_parameter(coefficient, value)
    }

    /// Replace all coefficients at once, or none on error.
    pub fn set_params(&mut self, params: KineticParams) -> Result<(), ValidationError> {
        self.handle.set_params(params)
    }

    // ── Grid lifecycle ───────────────────────────────────────────

    /// Reallocate the grids at `width x height`.
    ///
    /// Concentrations are discarded: every cell is refilled with the initial
    /// values and the selected boundary policy is written to the ring. The
    /// iteration count is kept. On error the vessel is unchanged.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), ValidationError> {
        let (width, height) = self
            .handle
            .limits()
            .check_dimensions(width, height)
            .inspect_err(|e| log::warn!("rejected resize: {e}"))?;
        let before = self.dims();
        self.refill(width, height);
        log::info!(
            "resized vessel from {}x{} to {width}x{height} at iteration {}",
            before.0,
            before.1,
            self.iteration
        );
        Ok(())
    }

    /// Refill the grid with initial values and reapply the boundary policy,
    /// keeping the dimensions and iteration count.
    pub fn reset(&mut self) {
        let (width, height) = self.dims();
        self.refill(width, height);
        log::info!("reset vessel at iteration {}", self.iteration);
    }

    fn refill(&mut self, width: usize, height: usize) {
        let policy = self.handle.boundary_condition();
        self.pair.replace(fresh_grid(width, height, policy));
        self.applied_boundary = policy;
    }

    // ── Interaction ──────────────────────────────────────────────

    /// Write `injection` into the 3x3 block around `(x, y)` of the current
    /// grid. The centre is clamped into `[1, width - 2] x [1, height - 2]`.
    pub fn inject(&self, x: i64, y: i64, injection: Injection) -> InjectionReceipt {
        self.handle.inject(x, y, injection)
    }

    /// Select the boundary policy; it is applied at the start of the next
    /// step, and only if it differs from the policy already applied.
    pub fn set_boundary_condition(&self, policy: BoundaryCondition) {
        self.handle.set_boundary_condition(policy);
    }

    /// The selected boundary policy.
    pub fn boundary_condition(&self) -> BoundaryCondition {
        self.handle.boundary_condition()
    }

    /// See [`VesselHandle::subscribe`].
    pub fn subscribe(&self, callback: impl FnMut(&Arc<Frame>) + Send + 'static) -> ObserverId {
        self.handle.subscribe(callback)
    }

    /// See [`VesselHandle::subscribe_until`].
    pub fn subscribe_until(
        &self,
        callback: impl FnMut(&Arc<Frame>) -> Delivery + Send + 'static,
    ) -> ObserverId {
        self.handle.subscribe_until(callback)
    }

    /// See [`VesselHandle::unsubscribe`].
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        self.handle.unsubscribe(id)
    }

    /// See [`VesselHandle::frame_channel`].
    pub fn frame_channel(&self) -> crossbeam_channel::Receiver<Arc<Frame>> {
        self.handle.frame_channel()
    }

    // ── Step ─────────────────────────────────────────────────────

    /// Advance the simulation by one step and return its frame.
    ///
    /// The frame is also delivered to every observer before this returns.
    /// Numeric singularities never fail a step: affected cells keep their
    /// previous value and are counted in [`last_metrics`](Self::last_metrics)
    /// and [`diagnostics`](Self::diagnostics).
    pub fn step(&mut self) -> Arc<Frame> {
        let step_start = Instant::now();

        // 1. Boundary policy, only on change.
        let policy = self.handle.boundary_condition();
        let boundary_cells_written = if policy != self.applied_boundary {
            let written = self
                .pair
                .current()
                .write(|grid| apply_boundary(grid, policy));
            log::debug!(
                "boundary changed from {} to {policy}, {written} ring cells written",
                self.applied_boundary
            );
            self.applied_boundary = policy;
            written
        } else {
            0
        };

        // 2-3. Snapshot and react.
        let kinetics = GontarKinetics::new(self.handle.params());
        let kinetics_start = Instant::now();
        let report = kinetics.step(self.pair.begin_step());
        let kinetics_us = kinetics_start.elapsed().as_micros() as u64;

        // 4. Transfer, replay, and capture.
        self.iteration = self.iteration.next();
        let transfer_start = Instant::now();
        let published = self.pair.publish(self.iteration);
        let transfer_us = transfer_start.elapsed().as_micros() as u64;
        let frame = Arc::new(published.frame);

        // 5. Notify.
        let notify_start = Instant::now();
        self.handle.controls().publish(
            &frame,
            report.skipped,
            published.replayed_injections,
        );
        let notify_us = notify_start.elapsed().as_micros() as u64;

        if let Some((x, y)) = report.first_skipped {
            log::debug!(
                "iteration {}: {} cells skipped on numeric singularities, first at ({x}, {y})",
                self.iteration,
                report.skipped
            );
        }

        self.last_metrics = StepMetrics {
            iteration: self.iteration,
            total_us: step_start.elapsed().as_micros() as u64,
            kinetics_us,
            transfer_us,
            notify_us,
            boundary_cells_written,
            updated_cells: report.updated,
            skipped_cells: report.skipped,
            replayed_injections: published.replayed_injections,
        };
        log::debug!(
            "iteration {} in {}us (kinetics {}us, transfer {}us, notify {}us)",
            self.iteration,
            self.last_metrics.total_us,
            kinetics_us,
            transfer_us,
            notify_us
        );
        frame
    }
}

impl Default for Vessel {
    /// A 200x200 vessel with the default coefficients and `Uniform` ring.
    fn default() -> Self {
        Self::build(VesselConfig::default())
    }
}

impl std::fmt::Debug for Vessel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vessel")
            .field("dims", &self.dims())
            .field("iteration", &self.iteration)
            .field("boundary", &self.applied_boundary)
            .field("params", &self.params())
            .finish()
    }
}

fn fresh_grid(width: usize, height: usize, policy: BoundaryCondition) -> ConcentrationGrid {
    let mut grid = ConcentrationGrid::new(width, height);
    apply_boundary(&mut grid, policy);
    grid
}
