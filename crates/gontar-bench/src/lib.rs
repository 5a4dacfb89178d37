//! Benchmark profiles for the Gontar engine.
//!
//! - [`reference_profile`]: 100x100 grid (10K cells), default coefficients.
//! - [`stress_profile`]: 316x316 grid (~100K cells).
//! - [`seeded_vessel`]: a vessel from a profile with deterministic
//!   injections, so every run benchmarks the same field.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use gontar_core::{BoundaryCondition, Injection};
use gontar_engine::{Vessel, VesselConfig};

/// 100x100 grid with the default coefficients and an `XSine` ring.
pub fn reference_profile() -> VesselConfig {
    VesselConfig {
        boundary: BoundaryCondition::XSine,
        ..VesselConfig::with_dims(100, 100)
    }
}

/// 316x316 grid, otherwise as [`reference_profile`].
pub fn stress_profile() -> VesselConfig {
    VesselConfig {
        boundary: BoundaryCondition::XSine,
        ..VesselConfig::with_dims(316, 316)
    }
}

/// Build a vessel from `config` and seed `n` injections at positions
/// derived from `seed`.
///
/// # Panics
///
/// Panics if `config` is invalid.
pub fn seeded_vessel(config: VesselConfig, n: usize, seed: u64) -> Vessel {
    let vessel = Vessel::new(config).unwrap_or_else(|e| panic!("invalid bench profile: {e}"));
    let (w, h) = vessel.dims();
    for pos in injection_sites(w * h, n, seed) {
        vessel.inject(
            (pos % w) as i64,
            (pos / w) as i64,
            Injection::new(0.9, 0.05, 0.05),
        );
    }
    vessel
}

/// Deterministic flat cell indices from a simple hash of the seed.
fn injection_sites(cell_count: usize, n: usize, seed: u64) -> Vec<usize> {
    (0..n as u64)
        .map(|i| {
            (seed
                .wrapping_mul(6364136223846793005)
                .wrapping_add(i.wrapping_mul(1442695040888963407))
                % cell_count as u64) as usize
        })
        .collect()
}
