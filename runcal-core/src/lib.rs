//! Core scheduling graph for runcal.
//!
//! This crate holds everything with actual logic: anchor events and the
//! tasks scheduled relative to them, the date resolution and key scheme
//! joining the two, graph construction from tabular sources, and the
//! full-replace calendar sync. The Google API shims live in the CLI and
//! talk to this crate through the contracts in [`source`].

pub mod date;
pub mod error;
pub mod event;
pub mod graph;
pub mod source;
pub mod sync;

pub use error::{RuncalError, RuncalResult};
