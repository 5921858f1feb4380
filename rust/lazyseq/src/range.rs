//! Integer progressions.
//!
//! All generators are pure functions of their parameters: they hold no resources and
//! restart from `start` on every `iterate`.
//!
//! Direction is given by the sign of `step`:
//! - `step > 0` counts up from `start`,
//! - `step < 0` counts down from `start`,
//! - `step == 0` yields `start` exactly once.
//!
//! A progression that would overflow the integer type ends instead of wrapping around.

use num_traits::PrimInt;

use crate::{
    control::Control,
    pull::PullOptions,
    sequence::{Sequence, SequenceExt},
};

/// Bounded progression: `start, start + step, ...` while the value is before `end`
/// (`< end` counting up, `> end` counting down).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Range<T> {
    start: T,
    end: T,
    step: T,
}

/// Unbounded progression: `start, start + step, ...` until the consumer stops.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangeInfinite<T> {
    start: T,
    step: T,
}

/// Bounded progression produced by pulling values out of a [`RangeInfinite`] and
/// enforcing the bound on the pulling side.
///
/// Yields exactly what [`Range`] yields for the same parameters. Each `iterate` pulls
/// from a fresh cursor, which is stopped as soon as the bound is crossed or the
/// consumer stops.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangePull<T> {
    start: T,
    end: T,
    step: T,
}

pub fn range<T: PrimInt>(start: T, end: T, step: T) -> Range<T> {
    Range { start, end, step }
}

pub fn range_infinite<T: PrimInt>(start: T, step: T) -> RangeInfinite<T> {
    RangeInfinite { start, step }
}

pub fn range_pull<T: PrimInt>(start: T, end: T, step: T) -> RangePull<T> {
    RangePull { start, end, step }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
    Still,
}

impl Direction {
    fn of<T: PrimInt>(step: T) -> Direction {
        let zero = T::zero();
        if step > zero {
            Direction::Up
        } else if step < zero {
            Direction::Down
        } else {
            Direction::Still
        }
    }

    /// Returns `true` while `value` has not reached `end` in this direction.
    fn before<T: PrimInt>(self, value: T, end: T) -> bool {
        match self {
            Direction::Up => value < end,
            Direction::Down => value > end,
            Direction::Still => true,
        }
    }
}

/// Pushes `start, start + step, ...` while `in_bounds` holds, the consumer continues
/// and the arithmetic does not overflow.
fn progress<T, B, F>(start: T, step: T, mut in_bounds: B, mut consumer: F)
where
    T: PrimInt,
    B: FnMut(T) -> bool,
    F: FnMut(T) -> Control,
{
    if Direction::of(step) == Direction::Still {
        if in_bounds(start) {
            let _ = consumer(start);
        }
        return;
    }

    let mut value = start;
    while in_bounds(value) {
        if consumer(value).is_stop() {
            return;
        }
        match value.checked_add(&step) {
            Some(next) => value = next,
            None => return,
        }
    }
}

impl<T: PrimInt> Range<T> {
    pub fn start(&self) -> T {
        self.start
    }

    pub fn end(&self) -> T {
        self.end
    }

    pub fn step(&self) -> T {
        self.step
    }
}

impl<T: PrimInt> Sequence for Range<T> {
    type Item = T;

    fn iterate<F>(&mut self, consumer: F)
    where
        F: FnMut(T) -> Control,
    {
        let Range { start, end, step } = *self;
        let direction = Direction::of(step);
        progress(start, step, |value| direction.before(value, end), consumer);
    }
}

impl<T: PrimInt> Sequence for RangeInfinite<T> {
    type Item = T;

    fn iterate<F>(&mut self, consumer: F)
    where
        F: FnMut(T) -> Control,
    {
        progress(self.start, self.step, |_| true, consumer);
    }
}

impl<T: PrimInt + Send + 'static> Sequence for RangePull<T> {
    type Item = T;

    fn iterate<F>(&mut self, mut consumer: F)
    where
        F: FnMut(T) -> Control,
    {
        let RangePull { start, end, step } = *self;
        let direction = Direction::of(step);
        let mut cursor = range_infinite(start, step)
            .pull_with(PullOptions::default().with_thread_name("lazyseq-range-pull"));
        for value in cursor.by_ref() {
            if !direction.before(value, end) || consumer(value).is_stop() {
                break;
            }
        }
        cursor.stop();
    }
}
