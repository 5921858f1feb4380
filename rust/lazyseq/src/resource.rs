//! Lifecycle of resource-scoped sequences.
//!
//! Every adapter that owns an external resource goes through the same phases on each
//! run:
//!
//! ```text
//! NotStarted -> Acquiring -> AcquireFailed
//!                         -> Streaming -> Exhausted | Errored | StoppedByConsumer
//! ```
//!
//! The resource is released when the run leaves `Streaming`, whichever terminal
//! phase it enters. [`ResourceGuard`] ties the release to scope exit so that it
//! also happens when the consumer panics.

use std::{fs::File, io::BufReader};

use crate::control::Control;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    NotStarted,
    Acquiring,
    /// The resource could not be acquired; nothing was produced and nothing needs
    /// to be released.
    AcquireFailed,
    Streaming,
    /// The resource had no more elements.
    Exhausted,
    /// An error was yielded as the terminal element.
    Errored,
    /// The consumer answered [`Control::Stop`].
    StoppedByConsumer,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Phase::AcquireFailed | Phase::Exhausted | Phase::Errored | Phase::StoppedByConsumer
        )
    }

    /// The phase following a consumer's answer to a streamed element.
    pub fn after(control: Control) -> Phase {
        match control {
            Control::Continue => Phase::Streaming,
            Control::Stop => Phase::StoppedByConsumer,
        }
    }
}

/// An acquired handle that must be given back exactly once.
///
/// The default implementation simply drops the handle, which is enough for
/// types that close themselves on drop.
pub trait Release: Sized {
    fn release(self) {
        drop(self);
    }
}

impl Release for File {}

impl<R: Release> Release for BufReader<R> {
    fn release(self) {
        self.into_inner().release();
    }
}

/// Owns an acquired handle for the duration of a run and releases it on drop.
pub struct ResourceGuard<R: Release> {
    handle: Option<R>,
    label: String,
    phase: Phase,
}

impl<R: Release> ResourceGuard<R> {
    /// Takes ownership of a freshly acquired handle; the run enters `Streaming`.
    pub fn new(label: impl Into<String>, handle: R) -> ResourceGuard<R> {
        ResourceGuard {
            handle: Some(handle),
            label: label.into(),
            phase: Phase::Streaming,
        }
    }

    pub fn handle_mut(&mut self) -> &mut R {
        self.handle
            .as_mut()
            .expect("resource guard holds its handle until dropped")
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Records the terminal phase of the run and releases the handle.
    pub fn finish(mut self, phase: Phase) {
        debug_assert!(phase.is_terminal());
        self.phase = phase;
    }
}

impl<R: Release> Drop for ResourceGuard<R> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.release();
            if self.phase.is_terminal() {
                tracing::debug!(resource = %self.label, phase = ?self.phase, "resource released");
            } else {
                tracing::debug!(resource = %self.label, "resource released while unwinding");
            }
        }
    }
}
