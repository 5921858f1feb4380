//! Command implementations for lazyseq-cmd

pub mod lines;
pub mod query;
pub mod range;
