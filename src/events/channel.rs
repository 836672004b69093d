//! Event channel built on crossbeam-channel.
//!
//! The pipeline only ever holds an [`EventSender`]; whoever renders progress
//! owns the matching [`EventReceiver`].

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::Event;

/// Sending half handed to the pipeline. Cheap to clone.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Send an event.
    ///
    /// A dropped receiver is not an error: extraction keeps going without
    /// anyone watching.
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }
}

/// Receiving half used by the presentation layer.
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Iterate until every sender has been dropped
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

/// Constructor namespace for sender/receiver pairs.
pub struct EventChannel;

impl EventChannel {
    /// Create an unbounded channel.
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }
}

/// A sender whose receiver is already gone, for headless runs and tests.
pub fn null_sender() -> EventSender {
    let (sender, _receiver) = EventChannel::new();
    sender
}
