//! Scripted query backends.

use std::collections::VecDeque;

use lazyseq::query::{CursorError, Query, RowCursor};
use thiserror::Error;

use crate::Counter;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ScriptedError {
    #[error("query rejected: {0}")]
    Rejected(String),
    #[error("fetch failed on call {call}")]
    Fetch { call: usize },
}

/// A cursor yielding a fixed list of rows.
///
/// When `fail_on` is set, the `fail_on`-th call to `next` (one-based) fails with
/// [`ScriptedError::Fetch`] instead of producing a row.
#[derive(Debug)]
pub struct ScriptedCursor<R> {
    rows: VecDeque<R>,
    fail_on: Option<usize>,
    position: usize,
    calls: Counter,
    drops: Counter,
}

impl<R> ScriptedCursor<R> {
    pub fn new(rows: impl IntoIterator<Item = R>) -> ScriptedCursor<R> {
        ScriptedCursor {
            rows: rows.into_iter().collect(),
            fail_on: None,
            position: 0,
            calls: Counter::new(),
            drops: Counter::new(),
        }
    }

    pub fn failing_on(mut self, call: usize) -> ScriptedCursor<R> {
        self.fail_on = Some(call);
        self
    }

    /// Counter of `next` calls.
    pub fn calls(&self) -> Counter {
        self.calls.clone()
    }

    /// Counter incremented when the cursor is dropped.
    pub fn drops(&self) -> Counter {
        self.drops.clone()
    }
}

impl<R> RowCursor for ScriptedCursor<R> {
    type Row = R;
    type Error = ScriptedError;

    fn next(&mut self, row: &mut R) -> Result<(), CursorError<ScriptedError>> {
        self.calls.incr();
        self.position += 1;
        let call = self.position;
        if self.fail_on == Some(call) {
            return Err(ScriptedError::Fetch { call }.into());
        }
        match self.rows.pop_front() {
            Some(next) => {
                *row = next;
                Ok(())
            }
            None => Err(CursorError::Done),
        }
    }
}

impl<R> Drop for ScriptedCursor<R> {
    fn drop(&mut self) {
        self.drops.incr();
    }
}

/// A query handing out a fresh [`ScriptedCursor`] on every execution.
///
/// Clones share their counters.
#[derive(Clone, Debug)]
pub struct ScriptedQuery<R> {
    rows: Vec<R>,
    fail_on: Option<usize>,
    reject: Option<String>,
    reads: Counter,
    calls: Counter,
    drops: Counter,
}

impl<R: Clone> ScriptedQuery<R> {
    pub fn new(rows: impl IntoIterator<Item = R>) -> ScriptedQuery<R> {
        ScriptedQuery {
            rows: rows.into_iter().collect(),
            fail_on: None,
            reject: None,
            reads: Counter::new(),
            calls: Counter::new(),
            drops: Counter::new(),
        }
    }

    /// Every cursor fails on its `call`-th `next` (one-based).
    pub fn failing_on(mut self, call: usize) -> ScriptedQuery<R> {
        self.fail_on = Some(call);
        self
    }

    /// Execution itself fails with [`ScriptedError::Rejected`].
    pub fn rejecting(mut self, message: impl Into<String>) -> ScriptedQuery<R> {
        self.reject = Some(message.into());
        self
    }

    /// Number of executions, failed ones included.
    pub fn reads(&self) -> usize {
        self.reads.get()
    }

    /// Total number of `next` calls over all cursors.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    /// Number of cursors dropped so far.
    pub fn cursors_dropped(&self) -> usize {
        self.drops.get()
    }
}

impl<R: Clone> Query for ScriptedQuery<R> {
    type Cursor = ScriptedCursor<R>;

    fn read(&self) -> Result<ScriptedCursor<R>, ScriptedError> {
        self.reads.incr();
        if let Some(message) = &self.reject {
            return Err(ScriptedError::Rejected(message.clone()));
        }
        Ok(ScriptedCursor {
            rows: self.rows.iter().cloned().collect(),
            fail_on: self.fail_on,
            position: 0,
            calls: self.calls.clone(),
            drops: self.drops.clone(),
        })
    }
}
