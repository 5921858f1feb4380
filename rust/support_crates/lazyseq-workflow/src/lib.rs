//! Execution utilities backing the pull side of lazy sequences.
//!
//! # Key Components
//!
//! ## Communication Channels
//!
//! - [`handoff`] - Single-slot, demand-driven handoff between one producer thread
//!   and one consumer thread. At most one value is ever in flight.
//!
//! ## Workers
//!
//! - [`worker`] - Named worker thread spawning for producers that need their own
//!   suspendable execution context.

pub mod handoff;
pub mod worker;
