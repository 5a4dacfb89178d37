//! Headless Gontar runner.
//!
//! Builds a vessel from command-line flags, optionally seeds an injection
//! at the centre, steps it, and logs per-channel means. Set `RUST_LOG` to
//! control verbosity, e.g. `RUST_LOG=info gontar-run --steps 500`.

use std::process::ExitCode;

use clap::Parser;
use gontar::prelude::*;
use log::{error, info};

#[derive(Debug, Parser)]
#[command(name = "gontar-run", version, about = "Run a Gontar vessel headless")]
struct Cli {
    /// Grid width in cells.
    #[arg(long, default_value_t = Limits::GONTAR.width.default as usize)]
    width: usize,

    /// Grid height in cells.
    #[arg(long, default_value_t = Limits::GONTAR.height.default as usize)]
    height: usize,

    /// Total concentration b.
    #[arg(short, long, default_value_t = Limits::GONTAR.b.default)]
    b: f64,

    /// Rate constant K1.
    #[arg(long, default_value_t = Limits::GONTAR.k1.default)]
    k1: f64,

    /// Feedback weight W1.
    #[arg(long, default_value_t = Limits::GONTAR.w1.default)]
    w1: f64,

    /// Rate constant K2.
    #[arg(long, default_value_t = Limits::GONTAR.k2.default)]
    k2: f64,

    /// Feedback weight W2.
    #[arg(long, default_value_t = Limits::GONTAR.w2.default)]
    w2: f64,

    /// Boundary policy (none, uniform, x-gradient, y-gradient, x-sine,
    /// y-sine, x-ramp, y-ramp).
    #[arg(long, default_value_t = BoundaryCondition::Uniform)]
    boundary: BoundaryCondition,

    /// Number of steps to run.
    #[arg(short = 'n', long, default_value_t = 100)]
    steps: u64,

    /// Inject A B C into the 3x3 block at the grid centre before stepping.
    #[arg(long, num_args = 3, value_names = ["A", "B", "C"])]
    inject: Option<Vec<f64>>,

    /// Log channel means every N steps.
    #[arg(short = 'r', long = "report-every", default_value_t = 10)]
    report_every: u64,

    /// Step on a background thread, capped at this many steps per second.
    #[arg(long)]
    rate: Option<f64>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), RunError> {
    let config = VesselConfig {
        width: cli.width,
        height: cli.height,
        params: KineticParams {
            b: cli.b,
            k1: cli.k1,
            w1: cli.w1,
            k2: cli.k2,
            w2: cli.w2,
        },
        boundary: cli.boundary,
        ..VesselConfig::default()
    };
    let mut vessel = Vessel::new(config)?;
    info!(
        "built {}x{} vessel, {:?}, boundary {}",
        cli.width,
        cli.height,
        vessel.params(),
        cli.boundary
    );

    if let Some([a, b, c]) = cli.inject.as_deref().and_then(|v| <[f64; 3]>::try_from(v).ok()) {
        let receipt = vessel.inject(
            cli.width as i64 / 2,
            cli.height as i64 / 2,
            Injection::new(a, b, c),
        );
        info!("injected [{a}, {b}, {c}] at ({}, {})", receipt.x, receipt.y);
    }

    match cli.rate {
        None => {
            for _ in 0..cli.steps {
                let frame = vessel.step();
                report(&frame, cli.report_every);
            }
            summarize(&vessel.diagnostics());
        }
        Some(hz) => summarize(&run_paced(vessel, hz, cli.steps, cli.report_every)?),
    }
    Ok(())
}

/// Step `vessel` on a background thread until `steps` more frames have
/// been delivered. The rate is validated even when there is nothing to do.
fn run_paced(
    vessel: Vessel,
    hz: f64,
    steps: u64,
    report_every: u64,
) -> Result<Diagnostics, RunError> {
    let run_config = RunConfig {
        max_steps_per_second: Some(hz),
        ..RunConfig::default()
    };
    let mut sim = Simulation::new(vessel, run_config)?;
    if steps == 0 {
        return Ok(sim.handle().diagnostics());
    }
    let target = sim.handle().iteration().0 + steps;
    let frames = sim.handle().frame_channel();
    sim.start()?;
    for frame in frames.iter() {
        report(&frame, report_every);
        if frame.iteration().0 >= target {
            break;
        }
    }
    sim.stop()?;
    Ok(sim.handle().diagnostics())
}

fn report(frame: &Frame, every: u64) {
    let i = frame.iteration().0;
    if every == 0 || i % every != 0 {
        return;
    }
    let [a, b, c] = Channel::ALL.map(|ch| frame.stats(ch).mean);
    info!("iteration {i}: mean A={a:.4} B={b:.4} C={c:.4}");
}

fn summarize(d: &Diagnostics) {
    info!(
        "finished at iteration {}: {} singular cells over {} steps, {} injections",
        d.iteration, d.singular_cells, d.steps_with_singularities, d.injections
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vessel() -> Vessel {
        Vessel::new(VesselConfig::with_dims(8, 8)).unwrap()
    }

    #[test]
    fn zero_paced_steps_returns_without_stepping() {
        let d = run_paced(vessel(), 1000.0, 0, 1).unwrap();
        assert_eq!(d.iteration, Iteration(0));
    }

    #[test]
    fn paced_run_stops_after_requested_steps() {
        let d = run_paced(vessel(), 1000.0, 3, 0).unwrap();
        assert!(d.iteration >= Iteration(3));
    }

    #[test]
    fn bad_rate_is_rejected_before_stepping() {
        let err = run_paced(vessel(), 0.0, 0, 1).unwrap_err();
        assert!(matches!(err, RunError::InvalidStepRate { .. }));
    }
}
