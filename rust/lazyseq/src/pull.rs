//! Push-to-pull conversion.
//!
//! A [`Sequence`] controls its own timing: it calls into the consumer whenever it has
//! produced the next element, and may never finish on its own. [`PullCursor`] turns it
//! around, so that the caller asks for elements one at a time.
//!
//! The producer runs on its own worker thread and is suspended between elements on a
//! single-slot [`handoff`](lazyseq_workflow::handoff) channel:
//!
//! - the worker is started by the first call to `next()`; nothing is produced before
//!   the first element is requested;
//! - after offering an element, the producer blocks until the next one is requested;
//! - exactly one element is in flight at any time, in the producer's own order.
//!
//! Stopping the cursor (explicitly via [`PullCursor::stop`], or by dropping it) makes
//! the consumer callback on the worker side answer [`Control::Stop`], waits for the
//! producer to unwind and joins the worker thread. Resources held by the producer are
//! therefore released before `stop` returns.
//!
//! A producer that ignores [`Control::Stop`] never unwinds, and `stop` blocks for as
//! long as it keeps running.

use std::{any::Any, iter::FusedIterator, thread::JoinHandle};

use lazyseq_workflow::{
    handoff::{self, HandoffReceiver, HandoffSender},
    worker::{self, WorkerOptions},
};

use crate::{control::Control, sequence::Sequence};

/// Default name of pull worker threads.
pub const DEFAULT_PULL_THREAD_NAME: &str = "lazyseq-pull";

/// Worker configuration for a [`PullCursor`].
#[derive(Clone, Debug)]
pub struct PullOptions {
    /// Name given to the worker thread.
    pub thread_name: Option<String>,
    /// Stack size of the worker thread, in bytes. Platform default when `None`.
    pub stack_size: Option<usize>,
}

impl Default for PullOptions {
    fn default() -> Self {
        PullOptions {
            thread_name: Some(DEFAULT_PULL_THREAD_NAME.to_string()),
            stack_size: None,
        }
    }
}

impl PullOptions {
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = Some(name.into());
        self
    }

    pub fn with_stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = Some(stack_size);
        self
    }

    fn worker_options(&self) -> WorkerOptions {
        WorkerOptions {
            name: self.thread_name.clone(),
            stack_size: self.stack_size,
        }
    }
}

/// Converts `seq` into a [`PullCursor`] with default options.
pub fn pull<S>(seq: S) -> PullCursor<S::Item>
where
    S: Sequence + Send + 'static,
    S::Item: Send + 'static,
{
    pull_with(seq, PullOptions::default())
}

/// Converts `seq` into a [`PullCursor`] running on a worker configured by `options`.
pub fn pull_with<S>(seq: S, options: PullOptions) -> PullCursor<S::Item>
where
    S: Sequence + Send + 'static,
    S::Item: Send + 'static,
{
    let producer: Producer<S::Item> = Box::new(move |tx| drive(seq, tx));
    PullCursor {
        state: CursorState::Pending(producer),
        options,
    }
}

/// Worker body: feeds `seq` into the handoff channel, one element per request.
fn drive<S: Sequence>(mut seq: S, tx: HandoffSender<S::Item>) {
    if !tx.wait_demand() {
        tracing::trace!("pull cursor stopped before the first request");
        return;
    }
    seq.iterate(|item| {
        if tx.offer(item).is_err() || !tx.wait_demand() {
            return Control::Stop;
        }
        Control::Continue
    });
    tracing::trace!(cancelled = tx.is_closed(), "pull producer finished");
    // Dropping `tx` marks the channel finished and wakes the puller.
}

type Producer<T> = Box<dyn FnOnce(HandoffSender<T>) + Send + 'static>;

type PanicPayload = Box<dyn Any + Send + 'static>;

enum CursorState<T> {
    /// Not started yet: the first `next()` spawns the worker.
    Pending(Producer<T>),
    Running {
        rx: HandoffReceiver<T>,
        worker: JoinHandle<()>,
    },
    Finished,
}

/// A demand-driven cursor over a push [`Sequence`].
///
/// Obtained from [`pull`], [`pull_with`] or
/// [`SequenceExt::pull`](crate::sequence::SequenceExt::pull). Elements are requested
/// with [`Iterator::next`]: `Some(item)` carries the next element, `None` means the
/// producer has no more elements (it was exhausted, or the cursor was stopped).
///
/// ## Cleanup
///
/// Call [`stop`](Self::stop) to abandon the cursor mid-stream with deterministic
/// cleanup. Dropping the cursor performs the same shutdown, so an abandoned cursor
/// never leaves a suspended worker behind.
///
/// ## Panics
///
/// If the producer panics, the panic is re-raised on the thread calling `next()` or
/// `stop()`. When the cursor is dropped, the panic is logged instead.
pub struct PullCursor<T> {
    state: CursorState<T>,
    options: PullOptions,
}

impl<T: Send + 'static> PullCursor<T> {
    /// Stops the cursor and waits until the producer has unwound.
    ///
    /// Idempotent: stopping a finished or already stopped cursor does nothing. A cursor
    /// that was never pulled is discarded without running the producer at all.
    pub fn stop(&mut self) {
        if let Some(payload) = self.shutdown() {
            std::panic::resume_unwind(payload);
        }
    }

    /// Returns `true` once the cursor has been exhausted or stopped.
    pub fn is_finished(&self) -> bool {
        matches!(self.state, CursorState::Finished)
    }

    fn start(&mut self) {
        if !matches!(self.state, CursorState::Pending(_)) {
            return;
        }
        let CursorState::Pending(producer) =
            std::mem::replace(&mut self.state, CursorState::Finished)
        else {
            return;
        };
        let (tx, rx) = handoff::channel::<T>();
        let worker = worker::spawn(&self.options.worker_options(), move || producer(tx));
        self.state = CursorState::Running { rx, worker };
    }

    /// Closes the channel and joins the worker, returning the producer's panic payload
    /// if it panicked.
    fn shutdown(&mut self) -> Option<PanicPayload> {
        match std::mem::replace(&mut self.state, CursorState::Finished) {
            CursorState::Pending(producer) => {
                drop(producer);
                None
            }
            CursorState::Running { rx, worker } => {
                let stopped_early = !rx.is_finished();
                rx.close();
                let res = worker.join();
                tracing::trace!(stopped_early, "pull worker joined");
                res.err()
            }
            CursorState::Finished => None,
        }
    }
}

impl<T: Send + 'static> Iterator for PullCursor<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.start();
        let item = match &self.state {
            CursorState::Running { rx, .. } => rx.request(),
            CursorState::Pending(_) | CursorState::Finished => return None,
        };
        if item.is_none() {
            self.stop();
        }
        item
    }
}

impl<T: Send + 'static> FusedIterator for PullCursor<T> {}

impl<T> Drop for PullCursor<T> {
    fn drop(&mut self) {
        if let CursorState::Running { rx, worker } =
            std::mem::replace(&mut self.state, CursorState::Finished)
        {
            rx.close();
            if worker.join().is_err() {
                tracing::error!("pull producer panicked; cursor dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use super::{PullOptions, pull, pull_with};
    use crate::{control::Control, sequence::from_fn};

    /// An unbounded producer counting how many elements it pushed and whether it
    /// unwound.
    fn counter(
        produced: Arc<AtomicUsize>,
        unwound: Arc<AtomicUsize>,
    ) -> impl crate::Sequence<Item = usize> + Send + 'static {
        from_fn(move |consumer: &mut dyn FnMut(usize) -> Control| {
            let mut n = 0;
            loop {
                produced.fetch_add(1, Ordering::SeqCst);
                if consumer(n).is_stop() {
                    break;
                }
                n += 1;
            }
            unwound.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_pull_in_order() {
        let seq = from_fn(|consumer: &mut dyn FnMut(u8) -> Control| {
            for b in b"pull" {
                if consumer(*b).is_stop() {
                    return;
                }
            }
        });
        let cursor = pull(seq);
        assert_eq!(cursor.collect::<Vec<_>>(), b"pull".to_vec());
    }

    #[test]
    fn test_pull_is_demand_driven() {
        let produced = Arc::new(AtomicUsize::new(0));
        let unwound = Arc::new(AtomicUsize::new(0));
        let mut cursor = pull(counter(produced.clone(), unwound.clone()));

        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(produced.load(Ordering::SeqCst), 0);

        assert_eq!(cursor.next(), Some(0));
        assert_eq!(cursor.next(), Some(1));
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(produced.load(Ordering::SeqCst), 2);

        cursor.stop();
        assert!(cursor.is_finished());
        assert_eq!(unwound.load(Ordering::SeqCst), 1);
        assert_eq!(produced.load(Ordering::SeqCst), 2);
        assert_eq!(cursor.next(), None);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let produced = Arc::new(AtomicUsize::new(0));
        let unwound = Arc::new(AtomicUsize::new(0));
        let mut cursor = pull(counter(produced, unwound.clone()));
        assert_eq!(cursor.next(), Some(0));
        cursor.stop();
        cursor.stop();
        assert_eq!(unwound.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stop_before_first_request_never_runs_producer() {
        let produced = Arc::new(AtomicUsize::new(0));
        let unwound = Arc::new(AtomicUsize::new(0));
        let mut cursor = pull(counter(produced.clone(), unwound.clone()));
        cursor.stop();
        assert_eq!(cursor.next(), None);
        assert_eq!(produced.load(Ordering::SeqCst), 0);
        assert_eq!(unwound.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_drop_unwinds_producer() {
        let produced = Arc::new(AtomicUsize::new(0));
        let unwound = Arc::new(AtomicUsize::new(0));
        let mut cursor = pull(counter(produced, unwound.clone()));
        assert_eq!(cursor.next(), Some(0));
        drop(cursor);
        assert_eq!(unwound.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_worker_thread_name() {
        let seq = from_fn(|consumer: &mut dyn FnMut(Option<String>) -> Control| {
            let _ = consumer(std::thread::current().name().map(str::to_string));
        });
        let mut cursor = pull_with(seq, PullOptions::default().with_thread_name("ranges"));
        assert_eq!(cursor.next(), Some(Some("ranges".to_string())));
        assert_eq!(cursor.next(), None);
        assert!(cursor.is_finished());
    }

    #[test]
    #[should_panic(expected = "producer failure")]
    fn test_producer_panic_is_propagated() {
        let seq = from_fn(|consumer: &mut dyn FnMut(u32) -> Control| {
            let _ = consumer(1);
            panic!("producer failure");
        });
        let mut cursor = pull(seq);
        assert_eq!(cursor.next(), Some(1));
        let _ = cursor.next();
    }
}
