//! The push-style [`Sequence`] abstraction.
//!
//! A sequence drives its own iteration: given a consumer callback, it feeds the
//! consumer one element at a time until the consumer answers [`Control::Stop`], or
//! until the producer is exhausted or has failed. Fallible sequences use
//! `Item = Result<T, E>`, so each element is either a value or an error, never both.

use std::marker::PhantomData;

use crate::{
    control::Control,
    pull::{PullCursor, PullOptions},
};

/// A producer that pushes elements into a consumer callback.
///
/// Contract for implementors:
/// - the consumer is called zero or more times, in production order;
/// - once the consumer returns [`Control::Stop`], it is never called again, and any
///   resource held by the producer is released before `iterate` returns;
/// - after an error element the producer stops, regardless of the consumer's answer.
///
/// Calling `iterate` again starts a new run. Sequences over pure parameters (numeric
/// progressions) and over re-openable resources (file paths, queries) restart from the
/// beginning; sequences over an already-opened cursor continue where it stands.
pub trait Sequence {
    type Item;

    fn iterate<F>(&mut self, consumer: F)
    where
        F: FnMut(Self::Item) -> Control;
}

impl<S: Sequence + ?Sized> Sequence for &mut S {
    type Item = S::Item;

    fn iterate<F>(&mut self, consumer: F)
    where
        F: FnMut(Self::Item) -> Control,
    {
        (**self).iterate(consumer)
    }
}

impl<S: Sequence + ?Sized> Sequence for Box<S> {
    type Item = S::Item;

    fn iterate<F>(&mut self, consumer: F)
    where
        F: FnMut(Self::Item) -> Control,
    {
        (**self).iterate(consumer)
    }
}

/// Convenience methods available on every [`Sequence`].
pub trait SequenceExt: Sequence {
    /// Runs the sequence to completion, passing each element to `f`.
    fn for_each<F>(&mut self, mut f: F)
    where
        F: FnMut(Self::Item),
    {
        self.iterate(|item| {
            f(item);
            Control::Continue
        });
    }

    /// Runs the sequence to completion and collects all elements.
    ///
    /// Never returns for unbounded sequences; use [`take_vec`](Self::take_vec) instead.
    fn collect_vec(&mut self) -> Vec<Self::Item> {
        let mut items = Vec::new();
        self.for_each(|item| items.push(item));
        items
    }

    /// Collects at most `count` elements, stopping the producer once the limit is
    /// reached. The sequence is not started at all when `count` is zero.
    fn take_vec(&mut self, count: usize) -> Vec<Self::Item> {
        let mut items = Vec::with_capacity(count.min(1024));
        if count == 0 {
            return items;
        }
        self.iterate(|item| {
            items.push(item);
            Control::from(items.len() < count)
        });
        items
    }

    /// Converts the sequence into a demand-driven [`PullCursor`] running on a
    /// dedicated worker thread.
    fn pull(self) -> PullCursor<Self::Item>
    where
        Self: Sized + Send + 'static,
        Self::Item: Send + 'static,
    {
        crate::pull::pull(self)
    }

    /// Same as [`pull`](Self::pull), with explicit worker configuration.
    fn pull_with(self, options: PullOptions) -> PullCursor<Self::Item>
    where
        Self: Sized + Send + 'static,
        Self::Item: Send + 'static,
    {
        crate::pull::pull_with(self, options)
    }
}

impl<S: Sequence + ?Sized> SequenceExt for S {}

/// A sequence backed by a closure that receives the consumer.
///
/// Created by [`from_fn`].
pub struct FromFn<T, F> {
    f: F,
    _item: PhantomData<fn(T)>,
}

/// Builds an ad-hoc [`Sequence`] from a closure.
///
/// The closure is called once per `iterate` with the consumer and must honor the
/// [`Sequence`] contract itself.
///
/// ```
/// use lazyseq::{Control, SequenceExt, from_fn};
///
/// let mut countdown = from_fn(|consumer: &mut dyn FnMut(u32) -> Control| {
///     for n in (1..=3).rev() {
///         if consumer(n).is_stop() {
///             return;
///         }
///     }
/// });
/// assert_eq!(countdown.collect_vec(), vec![3, 2, 1]);
/// ```
pub fn from_fn<T, F>(f: F) -> FromFn<T, F>
where
    F: FnMut(&mut dyn FnMut(T) -> Control),
{
    FromFn {
        f,
        _item: PhantomData,
    }
}

impl<T, F> Sequence for FromFn<T, F>
where
    F: FnMut(&mut dyn FnMut(T) -> Control),
{
    type Item = T;

    fn iterate<C>(&mut self, mut consumer: C)
    where
        C: FnMut(T) -> Control,
    {
        (self.f)(&mut consumer)
    }
}

#[cfg(test)]
mod tests {
    use super::{Sequence, SequenceExt, from_fn};
    use crate::control::Control;

    fn letters() -> impl Sequence<Item = char> {
        from_fn(|consumer: &mut dyn FnMut(char) -> Control| {
            for c in ['a', 'b', 'c', 'd'] {
                if consumer(c).is_stop() {
                    return;
                }
            }
        })
    }

    #[test]
    fn test_collect_vec() {
        assert_eq!(letters().collect_vec(), vec!['a', 'b', 'c', 'd']);
    }

    #[test]
    fn test_take_vec_stops_producer() {
        let mut produced = 0;
        let mut seq = from_fn(|consumer: &mut dyn FnMut(u32) -> Control| {
            let mut n = 0;
            loop {
                produced += 1;
                if consumer(n).is_stop() {
                    return;
                }
                n += 1;
            }
        });
        assert_eq!(seq.take_vec(3), vec![0, 1, 2]);
        assert!(seq.take_vec(0).is_empty());
        drop(seq);
        assert_eq!(produced, 3);
    }

    #[test]
    fn test_consumer_stop_is_final() {
        let mut seen = Vec::new();
        letters().iterate(|c| {
            seen.push(c);
            Control::from(c != 'b')
        });
        assert_eq!(seen, vec!['a', 'b']);
    }

    #[test]
    fn test_iterate_through_mut_ref() {
        let mut seq = letters();
        let by_ref = &mut seq;
        assert_eq!(by_ref.take_vec(2), vec!['a', 'b']);
        assert_eq!(seq.collect_vec().len(), 4);
    }
}
