//! Dedicated worker threads.
//!
//! A suspended producer holds on to its thread for as long as it is waiting for demand,
//! so producers are never scheduled on a shared pool: each one gets its own thread,
//! which is released when the producer finishes or is cancelled.

use std::thread::{self, JoinHandle};

/// Thread configuration for a worker.
#[derive(Clone, Debug, Default)]
pub struct WorkerOptions {
    /// Name of the worker thread. Unnamed when `None` or empty.
    pub name: Option<String>,
    /// Stack size in bytes. The platform default when `None`.
    pub stack_size: Option<usize>,
}

/// Spawns `f` on a new thread configured by `options`.
///
/// # Panics
///
/// Panics if the operating system fails to create the thread.
pub fn spawn<F, R>(options: &WorkerOptions, f: F) -> JoinHandle<R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let mut builder = thread::Builder::new();
    if let Some(name) = options.name.as_ref().filter(|name| !name.is_empty()) {
        builder = builder.name(name.clone());
    }
    if let Some(stack_size) = options.stack_size {
        builder = builder.stack_size(stack_size);
    }
    let handle = builder.spawn(f).expect("spawn worker thread");
    tracing::trace!(thread = ?handle.thread().name(), "worker spawned");
    handle
}
