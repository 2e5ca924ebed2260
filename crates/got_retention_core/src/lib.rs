//! Shared retention sweep domain primitives.
//!
//! This crate owns the cutoff computation and the request/response
//! contracts of the cleanup task. It intentionally excludes AWS SDK and
//! Lambda runtime concerns.

pub mod contract;
pub mod cutoff;
