//! Data Transfer Objects for the executor wire protocol
//!
//! These mirror the JSON the executor service expects. Field names follow
//! the service's camelCase convention; optional sections are omitted from
//! the payload entirely rather than sent empty.

pub mod submit;
