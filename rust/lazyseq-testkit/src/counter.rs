use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

/// A shared event counter. Clones observe the same count.
#[derive(Clone, Debug, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn new() -> Counter {
        Counter::default()
    }

    /// Increments the count, returning the new value.
    pub fn incr(&self) -> usize {
        self.add(1)
    }

    pub fn add(&self, n: usize) -> usize {
        self.0.fetch_add(n, Ordering::SeqCst) + n
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}
