//! Core domain types
//!
//! Status snapshots returned by the executor service and the run report the
//! step builds up while it drives a job. Snapshots are overwritten on every
//! poll tick; only the latest value is kept.

pub mod job;
pub mod run;
pub mod scriptless;
