//! Devicelab Core
//!
//! Core types for the devicelab execute step.
//!
//! This crate contains:
//! - Domain types: status snapshots polled from the executor and the final
//!   run report the step publishes
//! - DTOs: the job submission payload sent to the executor service

pub mod domain;
pub mod dto;
