//! services/api/src/lib.rs
//!
//! The `api` service as a library, so the binaries and the integration tests
//! share one router.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
