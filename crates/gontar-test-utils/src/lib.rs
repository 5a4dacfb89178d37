//! Test fixtures and helpers for Gontar development.
//!
//! Provides small-vessel constructors, grid assertions for the boundary
//! ring and injection blocks, seeded injection patterns, and a
//! [`FrameRecorder`] that collects every published frame.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::sync::{Arc, Mutex};

use gontar_engine::{ObserverId, VesselHandle};
use gontar_grid::Frame;

pub use fixtures::{
    assert_block_eq, ring_snapshot, scatter_injections, small_vessel, ScatteredInjection,
};

/// Records every frame a vessel publishes.
///
/// Attach before stepping; frames published earlier are not seen.
pub struct FrameRecorder {
    id: ObserverId,
    frames: Arc<Mutex<Vec<Arc<Frame>>>>,
}

impl FrameRecorder {
    pub fn attach(handle: &VesselHandle) -> Self {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&frames);
        let id = handle.subscribe(move |frame| sink.lock().unwrap().push(Arc::clone(frame)));
        Self { id, frames }
    }

    /// The observer id, for unsubscribing.
    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// All frames received so far.
    pub fn frames(&self) -> Vec<Arc<Frame>> {
        self.frames.lock().unwrap().clone()
    }

    /// Iteration numbers of the frames received so far.
    pub fn iterations(&self) -> Vec<u64> {
        self.frames
            .lock()
            .unwrap()
            .iter()
            .map(|f| f.iteration().0)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.frames.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
