//! Test utilities and helpers for the lazyseq crates.
//!
//! This crate provides:
//! - File fixtures: temporary files with known line content
//! - Resource probes: an in-memory [`Open`](lazyseq::fs::Open) implementation counting
//!   opens and releases, with optional read fault injection
//! - Scripted row cursors and queries that fail at a chosen call
//!
//! # Usage
//!
//! This crate is intended for the integration tests of `lazyseq` and the tools built
//! on top of it.

pub mod counter;
pub mod cursor;
pub mod fixtures;
pub mod open;

pub use counter::Counter;
