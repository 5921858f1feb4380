//! Query-row sequences.
//!
//! A query backend is seen through two traits:
//! - [`Query`]: something that can be executed, producing a cursor;
//! - [`RowCursor`]: a forward-only cursor decoding one row per call, and reporting the
//!   end of the result set with the [`CursorError::Done`] sentinel.
//!
//! [`query_rows`] executes a query on every run and streams its rows; [`rows`] streams
//! the remaining rows of a cursor that was executed elsewhere. Neither surfaces the
//! `Done` sentinel: it ends the run silently.

pub mod memory;

use lazyseq_common::{Error, Result};

use crate::{control::Control, resource::Phase, sequence::Sequence};

/// Outcome of [`RowCursor::next`] other than a decoded row.
#[derive(Debug)]
pub enum CursorError<E> {
    /// No more rows. Not a failure.
    Done,
    /// Rows could not be retrieved or decoded.
    Failed(E),
}

impl<E> From<E> for CursorError<E> {
    fn from(e: E) -> Self {
        CursorError::Failed(e)
    }
}

/// A forward-only cursor over a result set.
pub trait RowCursor {
    type Row;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Decodes the next row into `row`.
    ///
    /// Returns `Err(CursorError::Done)` once the result set is exhausted; calling
    /// `next` again after that keeps returning `Done`.
    fn next(&mut self, row: &mut Self::Row) -> std::result::Result<(), CursorError<Self::Error>>;
}

impl<C: RowCursor + ?Sized> RowCursor for &mut C {
    type Row = C::Row;
    type Error = C::Error;

    fn next(&mut self, row: &mut Self::Row) -> std::result::Result<(), CursorError<Self::Error>> {
        (**self).next(row)
    }
}

impl<C: RowCursor + ?Sized> RowCursor for Box<C> {
    type Row = C::Row;
    type Error = C::Error;

    fn next(&mut self, row: &mut Self::Row) -> std::result::Result<(), CursorError<Self::Error>> {
        (**self).next(row)
    }
}

/// An executable query.
pub trait Query {
    type Cursor: RowCursor;

    /// Executes the query, returning a cursor positioned before the first row.
    fn read(&self) -> std::result::Result<Self::Cursor, <Self::Cursor as RowCursor>::Error>;
}

/// Rows of an already executed cursor.
///
/// Single-shot: the sequence consumes the cursor, so a second run continues where
/// the previous one stopped.
pub struct Rows<C> {
    cursor: C,
    fetched: u64,
    phase: Phase,
}

pub fn rows<C: RowCursor>(cursor: C) -> Rows<C> {
    Rows {
        cursor,
        fetched: 0,
        phase: Phase::NotStarted,
    }
}

impl<C: RowCursor> Rows<C> {
    /// Number of rows delivered so far, over all runs.
    pub fn fetched(&self) -> u64 {
        self.fetched
    }

    /// Phase reached by the most recent run.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn into_inner(self) -> C {
        self.cursor
    }
}

impl<C> Sequence for Rows<C>
where
    C: RowCursor,
    C::Row: Default,
{
    type Item = Result<C::Row>;

    fn iterate<F>(&mut self, mut consumer: F)
    where
        F: FnMut(Self::Item) -> Control,
    {
        self.phase = Phase::Streaming;
        self.phase = stream_rows(&mut self.cursor, &mut self.fetched, &mut consumer);
    }
}

/// Rows of a query executed anew on every run.
///
/// If the query cannot be executed, the run yields a single `Err` with
/// [`ErrorKind::QueryRead`](lazyseq_common::ErrorKind::QueryRead). A retrieval fault
/// after some rows yields those rows, then a single `Err` with
/// [`ErrorKind::QueryFetch`](lazyseq_common::ErrorKind::QueryFetch). The cursor is
/// dropped before the run returns.
pub struct QueryRows<Q> {
    query: Q,
    phase: Phase,
}

pub fn query_rows<Q: Query>(query: Q) -> QueryRows<Q> {
    QueryRows {
        query,
        phase: Phase::NotStarted,
    }
}

impl<Q: Query> QueryRows<Q> {
    pub fn query(&self) -> &Q {
        &self.query
    }

    /// Phase reached by the most recent run.
    pub fn phase(&self) -> Phase {
        self.phase
    }
}

impl<Q> Sequence for QueryRows<Q>
where
    Q: Query,
    <Q::Cursor as RowCursor>::Row: Default,
{
    type Item = Result<<Q::Cursor as RowCursor>::Row>;

    fn iterate<F>(&mut self, mut consumer: F)
    where
        F: FnMut(Self::Item) -> Control,
    {
        self.phase = Phase::Acquiring;
        let mut cursor = match self.query.read() {
            Ok(cursor) => cursor,
            Err(e) => {
                self.phase = Phase::AcquireFailed;
                let _ = consumer(Err(Error::query_read(e)));
                return;
            }
        };

        self.phase = Phase::Streaming;
        let mut fetched = 0;
        self.phase = stream_rows(&mut cursor, &mut fetched, &mut consumer);
        drop(cursor);
        tracing::debug!(rows = fetched, phase = ?self.phase, "query cursor released");
    }
}

/// Streams rows until the cursor is done, fails, or the consumer stops.
///
/// `fetched` counts delivered rows and locates a failure: the faulting row is
/// reported by its zero-based position.
fn stream_rows<C, F>(cursor: &mut C, fetched: &mut u64, consumer: &mut F) -> Phase
where
    C: RowCursor,
    C::Row: Default,
    F: FnMut(Result<C::Row>) -> Control,
{
    loop {
        let mut row = C::Row::default();
        match cursor.next(&mut row) {
            Ok(()) => {
                *fetched += 1;
                let phase = Phase::after(consumer(Ok(row)));
                if phase.is_terminal() {
                    return phase;
                }
            }
            Err(CursorError::Done) => return Phase::Exhausted,
            Err(CursorError::Failed(e)) => {
                let _ = consumer(Err(Error::query_fetch(*fetched, e)));
                return Phase::Errored;
            }
        }
    }
}
