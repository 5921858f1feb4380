//! Lazy sequences over numeric progressions, file content and query cursors.
//!
//! - [`Sequence`]: the push-style producer abstraction. A sequence feeds a consumer
//!   callback one element at a time; the consumer answers [`Control::Continue`] or
//!   [`Control::Stop`].
//! - [`PullCursor`]: demand-driven cursor obtained by converting any `Send` sequence
//!   with [`pull()`] (or [`SequenceExt::pull`]).
//! - [`range`](mod@range): integer progressions ([`range()`], [`range_infinite`], and
//!   [`range_pull`], the pull-converted variant).
//! - [`fs`]: file lines ([`read_lines`]) and scoped file access ([`with_file`]).
//! - [`query`]: rows of a query ([`query_rows`]) or of an executed cursor ([`rows`]).
//!
//! Resource-scoped sequences acquire their resource at the start of each run and
//! release it before the run returns, whether the resource was exhausted, failed, or
//! the consumer stopped early. See [`resource`] for the lifecycle.

pub mod control;
pub mod fs;
pub mod pull;
pub mod query;
pub mod range;
pub mod resource;
pub mod sequence;

pub use control::Control;
pub use fs::{FileScope, LineOptions, Lines, read_lines, with_file};
pub use lazyseq_common::{Error, ErrorKind, Result};
pub use pull::{PullCursor, PullOptions, pull, pull_with};
pub use query::{Query, QueryRows, RowCursor, Rows, query_rows, rows};
pub use range::{Range, RangeInfinite, RangePull, range, range_infinite, range_pull};
pub use resource::Phase;
pub use sequence::{FromFn, Sequence, SequenceExt, from_fn};
