//! The Gontar reaction kinetics.
//!
//! For an interior cell with neighbourhood means `(wa, wb, wc)`:
//!
//! ```text
//! fc = exp(-W1 / wc)                  feedback from C
//! fb = exp(-W2 * wb)                  feedback from B
//! g0 = K1 * K2 * fc * fb / (1 + K1 * fc)
//! Xc = max(b * g0 / (g0 + 1), min)
//! Xb = max(K1 * fc / (1 + K1 * fc) * (b - Xc), min)
//! Xa = max(b - Xb - Xc, min)
//! ```
//!
//! Each result is then capped at `b` independently. The caps mean
//! `A + B + C = b` holds only approximately.

use gontar_core::{KineticParams, MIN_CONCENTRATION};
use gontar_grid::{ConcentrationGrid, StepGuard};

use crate::neighbourhood::neighbourhood_mean;

/// Why a cell could not be updated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Singularity {
    /// The C-channel weight is exactly zero, so `W1 / wc` is undefined.
    ZeroWeight,
    /// A weight or an intermediate result is NaN or infinite.
    NonFinite,
}

/// Result of reacting one cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CellOutcome {
    /// New `[A, B, C]` for the cell.
    Updated([f64; 3]),
    /// The cell keeps its previous next-grid value this step.
    Skipped(Singularity),
}

/// Per-step tally of cell outcomes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KineticsReport {
    /// Interior cells written.
    pub updated: usize,
    /// Interior cells skipped because of a singularity.
    pub skipped: usize,
    /// The first skipped cell in row-major order, if any.
    pub first_skipped: Option<(usize, usize)>,
}

/// The Gontar model bound to a set of (already validated) coefficients.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GontarKinetics {
    params: KineticParams,
}

impl GontarKinetics {
    /// Bind the model to `params`.
    pub fn new(params: KineticParams) -> Self {
        Self { params }
    }

    /// The bound coefficients.
    pub fn params(&self) -> &KineticParams {
        &self.params
    }

    /// React one cell given its neighbourhood means `[wa, wb, wc]`.
    pub fn react(&self, weights: [f64; 3]) -> CellOutcome {
        let KineticParams { b, k1, w1, k2, w2 } = self.params;
        let [_, wb, wc] = weights;
        if !wc.is_finite() || !wb.is_finite() {
            return CellOutcome::Skipped(Singularity::NonFinite);
        }
        if wc == 0.0 {
            return CellOutcome::Skipped(Singularity::ZeroWeight);
        }

        let feedback_c = (-w1 / wc).exp();
        let feedback_b = (-w2 * wb).exp();
        let k1_fc = k1 * feedback_c;
        let g0 = (k1 * k2 * feedback_c * feedback_b) / (1.0 + k1_fc);

        let xc = (b * (g0 / (g0 + 1.0))).max(MIN_CONCENTRATION);
        let xb = ((k1_fc / (1.0 + k1_fc)) * (b - xc)).max(MIN_CONCENTRATION);
        let xa = (b - xb - xc).max(MIN_CONCENTRATION);

        let out = [xa.min(b), xb.min(b), xc.min(b)];
        // `max`/`min` swallow a NaN operand, so check the raw values.
        if [g0, xa, xb, xc].iter().all(|v| v.is_finite()) {
            CellOutcome::Updated(out)
        } else {
            CellOutcome::Skipped(Singularity::NonFinite)
        }
    }

    /// React every interior cell of `current` into `next`.
    ///
    /// Skipped cells leave `next` untouched and are logged at trace level.
    pub fn react_interior(
        &self,
        current: &ConcentrationGrid,
        next: &mut ConcentrationGrid,
    ) -> KineticsReport {
        let (w, h) = current.dims();
        let mut report = KineticsReport::default();
        for y in 1..h - 1 {
            for x in 1..w - 1 {
                match self.react(neighbourhood_mean(current, x, y)) {
                    CellOutcome::Updated(values) => {
                        next.set_cell(x, y, values);
                        report.updated += 1;
                    }
                    CellOutcome::Skipped(reason) => {
                        log::trace!("cell ({x}, {y}) skipped: {reason:?}");
                        report.skipped += 1;
                        report.first_skipped.get_or_insert((x, y));
                    }
                }
            }
        }
        report
    }

    /// React the interior of an open step.
    pub fn step(&self, guard: StepGuard<'_>) -> KineticsReport {
        self.react_interior(guard.current, guard.next)
    }
}
