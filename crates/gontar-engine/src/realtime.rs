//! Background step loop.
//!
//! [`Simulation`] owns a [`Vessel`] while idle and moves it onto a
//! dedicated, named computation thread while running. The thread calls
//! [`Vessel::step`] in a loop until asked to stop, then hands the vessel
//! back through its `JoinHandle`.
//!
//! ```text
//! Host thread(s)                    Step thread
//!     |                                 |
//!     |--handle.inject()------lock----->| (current grid)
//!     |--handle.set_*()---------------->| (read at step start)
//!     |                                 | vessel.step()
//!     |<--frame_channel()---------------| observers notified
//!     |                                 | park_timeout(budget - elapsed)
//!     |--request_stop(): flag + unpark->|
//!     |--stop(): join <-----------------| returns Vessel
//! ```
//!
//! The stop flag is checked at the top of each iteration, so the step in
//! flight always completes and no frame is ever half-published.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use gontar_core::ValidationError;

use crate::config::RunConfig;
use crate::handle::VesselHandle;
use crate::vessel::Vessel;

// ── Error types ──────────────────────────────────────────────────

/// Errors from controlling a [`Simulation`].
#[derive(Debug, Clone, PartialEq)]
pub enum RunError {
    /// `max_steps_per_second` is not a finite positive rate.
    InvalidStepRate {
        /// The rejected rate.
        value: f64,
    },
    /// The OS refused to spawn the computation thread. The vessel is
    /// still owned by the simulation.
    ThreadSpawnFailed {
        /// The OS error message.
        reason: String,
    },
    /// The computation thread panicked and took the vessel with it.
    VesselLost,
    /// A vessel operation rejected its input.
    Validation(ValidationError),
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidStepRate { value } => {
                write!(f, "max_steps_per_second must be finite and positive, got {value}")
            }
            Self::ThreadSpawnFailed { reason } => {
                write!(f, "failed to spawn step thread: {reason}")
            }
            Self::VesselLost => write!(f, "step thread panicked; the vessel was lost"),
            Self::Validation(e) => write!(f, "validation failed: {e}"),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ValidationError> for RunError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

// ── RunState ─────────────────────────────────────────────────────

/// Where a [`Simulation`] is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    /// No computation thread; the vessel can be borrowed directly.
    Idle,
    /// The computation thread is stepping.
    Running,
    /// Stop was requested; the thread finishes its current step.
    StopRequested,
}

// ── Simulation ───────────────────────────────────────────────────

/// A vessel plus the thread that steps it.
///
/// Dropping a running simulation stops it and joins the thread.
pub struct Simulation {
    handle: VesselHandle,
    idle: Option<Vessel>,
    thread: Option<JoinHandle<Option<Vessel>>>,
    stop_flag: Arc<AtomicBool>,
    config: RunConfig,
}

impl Simulation {
    /// Wrap `vessel`. The simulation starts idle.
    pub fn new(vessel: Vessel, config: RunConfig) -> Result<Self, RunError> {
        config.validate()?;
        Ok(Self {
            handle: vessel.handle(),
            idle: Some(vessel),
            thread: None,
            stop_flag: Arc::new(AtomicBool::new(false)),
            config,
        })
    }

    /// A handle onto the vessel, usable whether or not it is running.
    pub fn handle(&self) -> &VesselHandle {
        &self.handle
    }

    /// The run configuration.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RunState {
        match &self.thread {
            None => RunState::Idle,
            Some(_) if self.stop_flag.load(Ordering::Acquire) => RunState::StopRequested,
            Some(_) => RunState::Running,
        }
    }

    /// Whether a computation thread exists (running or stopping).
    pub fn is_running(&self) -> bool {
        self.thread.is_some()
    }

    /// Borrow the vessel. `None` while running.
    pub fn vessel(&self) -> Option<&Vessel> {
        self.idle.as_ref()
    }

    /// Mutably borrow the vessel. `None` while running.
    pub fn vessel_mut(&mut self) -> Option<&mut Vessel> {
        self.idle.as_mut()
    }

    /// Spawn the computation thread. Does nothing if already running.
    ///
    /// The iteration count continues from where the vessel left off.
    pub fn start(&mut self) -> Result<(), RunError> {
        if self.thread.is_some() {
            return Ok(());
        }
        let vessel = self.idle.take().ok_or(RunError::VesselLost)?;
        self.stop_flag.store(false, Ordering::Release);

        // The vessel is only sent once the thread exists, so a failed
        // spawn leaves it with us.
        let (tx, rx) = crossbeam_channel::bounded::<Vessel>(1);
        let stop_flag = Arc::clone(&self.stop_flag);
        let budget = self
            .config
            .max_steps_per_second
            .map(|hz| Duration::from_secs_f64(1.0 / hz));
        let spawned = thread::Builder::new()
            .name(self.config.thread_name.clone())
            .spawn(move || {
                let vessel = rx.recv().ok()?;
                Some(run_loop(vessel, &stop_flag, budget))
            });

        let thread = match spawned {
            Ok(thread) => thread,
            Err(e) => {
                self.idle = Some(vessel);
                log::warn!("could not spawn step thread: {e}");
                return Err(RunError::ThreadSpawnFailed {
                    reason: e.to_string(),
                });
            }
        };
        if let Err(returned) = tx.send(vessel) {
            // The receiver only disappears if the thread died before recv.
            self.idle = Some(returned.into_inner());
            let _ = thread.join();
            return Err(RunError::ThreadSpawnFailed {
                reason: "step thread exited before receiving the vessel".to_string(),
            });
        }
        self.thread = Some(thread);
        Ok(())
    }

    /// Ask the computation thread to stop after its current step.
    ///
    /// Non-blocking. Does nothing when idle or already requested.
    pub fn request_stop(&self) {
        if let Some(thread) = &self.thread {
            self.stop_flag.store(true, Ordering::Release);
            // Wake the thread if it is parked out a pacing budget.
            thread.thread().unpark();
        }
    }

    /// Stop the computation thread and take the vessel back.
    ///
    /// Blocks until the current step completes. Does nothing when idle.
    pub fn stop(&mut self) -> Result<(), RunError> {
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };
        self.stop_flag.store(true, Ordering::Release);
        thread.thread().unpark();
        match thread.join() {
            Ok(Some(vessel)) => {
                self.idle = Some(vessel);
                Ok(())
            }
            Ok(None) | Err(_) => {
                log::warn!("step thread ended without returning the vessel");
                Err(RunError::VesselLost)
            }
        }
    }

    /// Resize the vessel, stopping and restarting the thread around it if
    /// it was running.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), RunError> {
        let was_running = self.is_running();
        self.stop()?;
        let resized = self
            .idle
            .as_mut()
            .ok_or(RunError::VesselLost)?
            .resize(width, height);
        if was_running {
            self.start()?;
        }
        resized.map_err(RunError::from)
    }

    /// Stop if running and return the vessel.
    pub fn into_vessel(mut self) -> Result<Vessel, RunError> {
        self.stop()?;
        self.idle.take().ok_or(RunError::VesselLost)
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("state", &self.state())
            .field("iteration", &self.handle.iteration())
            .field("config", &self.config)
            .finish()
    }
}

fn run_loop(mut vessel: Vessel, stop_flag: &AtomicBool, budget: Option<Duration>) -> Vessel {
    let (w, h) = vessel.dims();
    log::info!(
        "step loop started on {w}x{h} vessel at iteration {}",
        vessel.iteration()
    );
    while !stop_flag.load(Ordering::Acquire) {
        let step_start = Instant::now();
        vessel.step();

        if let Some(budget) = budget {
            let deadline = step_start + budget;
            loop {
                if stop_flag.load(Ordering::Acquire) {
                    break;
                }
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                thread::park_timeout(deadline - now);
            }
        }
    }
    log::info!("step loop stopped at iteration {}", vessel.iteration());
    vessel
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VesselConfig;
    use gontar_core::{Coefficient, Iteration, Parameter};

    fn small() -> Vessel {
        Vessel::new(VesselConfig::with_dims(8, 8)).unwrap()
    }

    fn wait_for(handle: &VesselHandle, at_least: u64) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while handle.iteration().0 < at_least {
            assert!(Instant::now() < deadline, "step thread made no progress");
            thread::yield_now();
        }
    }

    #[test]
    fn start_and_stop_lifecycle() {
        let mut sim = Simulation::new(small(), RunConfig::default()).unwrap();
        assert_eq!(sim.state(), RunState::Idle);
        assert!(sim.vessel().is_some());

        sim.start().unwrap();
        assert!(sim.vessel().is_none());
        sim.start().unwrap();
        wait_for(sim.handle(), 3);

        sim.stop().unwrap();
        sim.stop().unwrap();
        assert_eq!(sim.state(), RunState::Idle);
        let v = sim.vessel().unwrap();
        assert!(v.iteration().0 >= 3);
        assert_eq!(v.iteration(), sim.handle().iteration());
    }

    #[test]
    fn restart_continues_iteration() {
        let mut sim = Simulation::new(small(), RunConfig::default()).unwrap();
        sim.start().unwrap();
        wait_for(sim.handle(), 2);
        sim.stop().unwrap();
        let first = sim.vessel().unwrap().iteration();

        sim.start().unwrap();
        wait_for(sim.handle(), first.0 + 2);
        sim.stop().unwrap();
        assert!(sim.vessel().unwrap().iteration() > first);
    }

    #[test]
    fn request_stop_is_prompt_with_slow_pacing() {
        let config = RunConfig {
            max_steps_per_second: Some(0.1),
            ..RunConfig::default()
        };
        let mut sim = Simulation::new(small(), config).unwrap();
        sim.start().unwrap();
        wait_for(sim.handle(), 1);

        let begin = Instant::now();
        sim.request_stop();
        assert_ne!(sim.state(), RunState::Running);
        sim.stop().unwrap();
        assert!(begin.elapsed() < Duration::from_secs(5));
        assert_eq!(sim.vessel().unwrap().iteration(), Iteration(1));
    }

    #[test]
    fn request_stop_when_idle_is_noop() {
        let sim = Simulation::new(small(), RunConfig::default()).unwrap();
        sim.request_stop();
        assert_eq!(sim.state(), RunState::Idle);
    }

    #[test]
    fn resize_while_running_restarts() {
        let mut sim = Simulation::new(small(), RunConfig::default()).unwrap();
        sim.start().unwrap();
        wait_for(sim.handle(), 1);
        sim.resize(16, 12).unwrap();
        assert!(sim.is_running());
        assert_eq!(sim.handle().dims(), (16, 12));

        let err = sim.resize(2, 12).unwrap_err();
        assert!(matches!(err, RunError::Validation(ref e) if e.parameter() == Parameter::Width));
        assert!(sim.is_running());
        let v = sim.into_vessel().unwrap();
        assert_eq!(v.dims(), (16, 12));
    }

    #[test]
    fn handle_controls_a_running_vessel() {
        let mut sim = Simulation::new(small(), RunConfig::default()).unwrap();
        let handle = sim.handle().clone();
        sim.start().unwrap();
        handle.set_parameter(Coefficient::K2, 9.0).unwrap();
        assert!(handle.set_parameter(Coefficient::K2, 1000.0).is_err());
        sim.stop().unwrap();
        assert_eq!(sim.vessel().unwrap().k2(), 9.0);
    }

    #[test]
    fn invalid_rate_is_rejected() {
        let config = RunConfig {
            max_steps_per_second: Some(-5.0),
            ..RunConfig::default()
        };
        let err = Simulation::new(small(), config).unwrap_err();
        assert_eq!(err, RunError::InvalidStepRate { value: -5.0 });
    }

    #[test]
    fn drop_joins_running_thread() {
        let mut sim = Simulation::new(small(), RunConfig::default()).unwrap();
        let handle = sim.handle().clone();
        sim.start().unwrap();
        wait_for(&handle, 1);
        drop(sim);
        let stopped_at = handle.iteration();
        thread::sleep(Duration::from_millis(20));
        assert_eq!(handle.iteration(), stopped_at);
    }

    #[test]
    fn thread_carries_configured_name() {
        let config = RunConfig {
            thread_name: "vessel-under-test".to_string(),
            ..RunConfig::default()
        };
        let mut sim = Simulation::new(small(), config).unwrap();
        let (tx, rx) = crossbeam_channel::bounded(1);
        sim.handle().subscribe_until(move |_| {
            let _ = tx.send(thread::current().name().map(str::to_string));
            crate::observer::Delivery::Unsubscribe
        });
        sim.start().unwrap();
        let name = rx.recv_timeout(Duration::from_secs(10)).unwrap();
        sim.stop().unwrap();
        assert_eq!(name.as_deref(), Some("vessel-under-test"));
    }
}
