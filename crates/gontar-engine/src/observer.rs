//! Step-completed notification.
//!
//! Observers are callbacks kept in registration order and invoked
//! synchronously at the end of every step, once per step, in strictly
//! increasing iteration order. Callbacks run on the stepping thread, so
//! they should hand the frame off (e.g. over a channel) and return
//! quickly. [`ObserverList::channel`] does exactly that with an unbounded
//! crossbeam channel: sending never blocks and never drops a frame.

use std::fmt;
use std::sync::Arc;

use gontar_grid::Frame;
use indexmap::IndexMap;

/// Identifies a registered observer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What an observer wants after receiving a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// Keep delivering frames.
    Continue,
    /// Remove this observer.
    Unsubscribe,
}

type Callback = Box<dyn FnMut(&Arc<Frame>) -> Delivery + Send>;

/// Registration-ordered observer registry.
#[derive(Default)]
pub(crate) struct ObserverList {
    next_id: u64,
    observers: IndexMap<ObserverId, Callback>,
}

impl ObserverList {
    pub fn insert(&mut self, callback: Callback) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.insert(id, callback);
        id
    }

    /// Remove an observer, preserving the order of the rest.
    pub fn remove(&mut self, id: ObserverId) -> bool {
        self.observers.shift_remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Deliver `frame` to every observer in registration order, dropping
    /// those that ask to unsubscribe.
    pub fn notify(&mut self, frame: &Arc<Frame>) {
        self.observers
            .retain(|_, callback| callback(frame) == Delivery::Continue);
    }

    /// Register a channel-backed observer and return its receiving end.
    /// The observer removes itself once the receiver is dropped.
    pub fn channel(&mut self) -> (ObserverId, crossbeam_channel::Receiver<Arc<Frame>>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let id = self.insert(Box::new(move |frame: &Arc<Frame>| {
            match tx.send(Arc::clone(frame)) {
                Ok(()) => Delivery::Continue,
                Err(_) => Delivery::Unsubscribe,
            }
        }));
        (id, rx)
    }
}

impl fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverList")
            .field("len", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gontar_core::Iteration;
    use gontar_grid::ConcentrationGrid;
    use std::sync::Mutex;

    fn frame(i: u64) -> Arc<Frame> {
        Arc::new(Frame::capture(Iteration(i), &ConcentrationGrid::new(3, 3)))
    }

    #[test]
    fn notify_runs_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut list = ObserverList::default();
        for tag in ["first", "second", "third"] {
            let log = Arc::clone(&log);
            list.insert(Box::new(move |_: &Arc<Frame>| {
                log.lock().unwrap().push(tag);
                Delivery::Continue
            }));
        }
        list.notify(&frame(1));
        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn remove_keeps_remaining_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut list = ObserverList::default();
        let ids: Vec<_> = (0..3)
            .map(|n| {
                let log = Arc::clone(&log);
                list.insert(Box::new(move |_: &Arc<Frame>| {
                    log.lock().unwrap().push(n);
                    Delivery::Continue
                }))
            })
            .collect();
        assert!(list.remove(ids[1]));
        assert!(!list.remove(ids[1]));
        list.notify(&frame(1));
        assert_eq!(*log.lock().unwrap(), vec![0, 2]);
    }

    #[test]
    fn unsubscribe_delivery_removes_observer() {
        let mut list = ObserverList::default();
        list.insert(Box::new(|_: &Arc<Frame>| Delivery::Unsubscribe));
        assert_eq!(list.len(), 1);
        list.notify(&frame(1));
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn dropped_channel_receiver_unsubscribes() {
        let mut list = ObserverList::default();
        let (_, rx) = list.channel();
        list.notify(&frame(1));
        assert_eq!(rx.try_recv().unwrap().iteration(), Iteration(1));
        drop(rx);
        list.notify(&frame(2));
        assert_eq!(list.len(), 0);
    }
}
