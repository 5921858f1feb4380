//! A demand-driven, single-slot handoff channel between one producer and one consumer.
//!
//! Unlike a regular bounded channel, the producer is not allowed to run ahead: it may
//! only publish a value after the consumer has explicitly asked for one. This makes the
//! channel suitable for suspending a push-style producer between elements.
//!
//! ## Channel Lifecycle
//!
//! The turn alternates between the two sides:
//!
//! 1. Idle: initial state, and the state after the consumer took a value
//! 2. Demand: the consumer called [`HandoffReceiver::request`] and waits
//! 3. Offered: the producer published a value with [`HandoffSender::offer`]
//!
//! Independently of the turn, the channel can be:
//! - finished, when the sender is dropped (the producer ran to completion or unwound)
//! - closed, when the receiver calls [`HandoffReceiver::close`] or is dropped
//!
//! A closed channel wakes a producer blocked in [`HandoffSender::wait_demand`], which
//! then observes `false` and is expected to stop producing.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

/// Creates a new handoff channel, returning the producer and consumer halves.
pub fn channel<T>() -> (HandoffSender<T>, HandoffReceiver<T>) {
    let cell = Arc::new(HandoffCell::new());
    (HandoffSender(cell.clone()), HandoffReceiver(cell))
}

/// The producing half of a handoff channel.
///
/// Dropping the sender marks the channel as finished: a consumer blocked in
/// [`HandoffReceiver::request`] wakes up and receives `None`.
pub struct HandoffSender<T>(Arc<HandoffCell<T>>);

impl<T> HandoffSender<T> {
    /// Blocks until the consumer asks for a value or closes the channel.
    ///
    /// Returns `true` when there is outstanding demand, `false` when the channel
    /// was closed and the producer should wind down.
    pub fn wait_demand(&self) -> bool {
        self.0.wait_demand()
    }

    /// Publishes a single value to the waiting consumer.
    ///
    /// Must only be called while there is outstanding demand (after
    /// [`wait_demand`](Self::wait_demand) returned `true`). Returns `Err(value)` if
    /// the channel is closed or nobody asked for a value.
    pub fn offer(&self, value: T) -> Result<(), T> {
        self.0.offer(value)
    }

    /// Returns `true` if the consumer has closed the channel.
    pub fn is_closed(&self) -> bool {
        self.0.lock().closed
    }
}

impl<T> Drop for HandoffSender<T> {
    fn drop(&mut self) {
        self.0.finish();
    }
}

/// The consuming half of a handoff channel.
///
/// Dropping the receiver closes the channel.
pub struct HandoffReceiver<T>(Arc<HandoffCell<T>>);

impl<T> HandoffReceiver<T> {
    /// Asks the producer for the next value and blocks until it is published.
    ///
    /// Returns `None` once the producer has finished or the channel was closed.
    pub fn request(&self) -> Option<T> {
        self.0.request()
    }

    /// Closes the channel, waking a producer blocked on demand.
    ///
    /// Idempotent. A value that was offered but not yet taken is dropped.
    pub fn close(&self) {
        self.0.close();
    }

    /// Returns `true` once the sender has been dropped.
    pub fn is_finished(&self) -> bool {
        self.0.lock().finished
    }
}

impl<T> Drop for HandoffReceiver<T> {
    fn drop(&mut self) {
        self.0.close();
    }
}

struct HandoffCell<T> {
    state: Mutex<State<T>>,
    condvar: Condvar,
}

impl<T> HandoffCell<T> {
    fn new() -> HandoffCell<T> {
        HandoffCell {
            state: Mutex::new(State {
                turn: Turn::Idle,
                slot: None,
                finished: false,
                closed: false,
            }),
            condvar: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait_demand(&self) -> bool {
        let guard = self.lock();
        let guard = self
            .condvar
            .wait_while(guard, |state| !state.closed && state.turn != Turn::Demand)
            .unwrap_or_else(PoisonError::into_inner);
        !guard.closed
    }

    fn offer(&self, value: T) -> Result<(), T> {
        let mut guard = self.lock();
        if guard.closed || guard.turn != Turn::Demand {
            return Err(value);
        }
        guard.slot = Some(value);
        guard.turn = Turn::Offered;
        drop(guard);
        self.condvar.notify_all();
        Ok(())
    }

    fn request(&self) -> Option<T> {
        let mut guard = self.lock();
        if guard.closed {
            return None;
        }
        if let Some(value) = guard.take() {
            return Some(value);
        }
        if guard.finished {
            return None;
        }

        guard.turn = Turn::Demand;
        self.condvar.notify_all();
        let mut guard = self
            .condvar
            .wait_while(guard, |state| {
                state.turn == Turn::Demand && !state.finished && !state.closed
            })
            .unwrap_or_else(PoisonError::into_inner);
        guard.take()
    }

    fn finish(&self) {
        let mut guard = self.lock();
        guard.finished = true;
        drop(guard);
        self.condvar.notify_all();
    }

    fn close(&self) {
        let mut guard = self.lock();
        guard.closed = true;
        let pending = guard.slot.take();
        drop(guard);
        self.condvar.notify_all();
        drop(pending);
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Turn {
    /// Nobody is waiting for a value.
    Idle,
    /// The consumer is waiting for the producer to publish a value.
    Demand,
    /// A value is in the slot, waiting to be taken.
    Offered,
}

struct State<T> {
    turn: Turn,
    slot: Option<T>,
    finished: bool,
    closed: bool,
}

impl<T> State<T> {
    /// Takes the offered value, returning the turn to idle.
    fn take(&mut self) -> Option<T> {
        let value = self.slot.take();
        if value.is_some() {
            self.turn = Turn::Idle;
        }
        value
    }
}
