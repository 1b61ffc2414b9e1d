//! Test utilities for the LMS service.
//!
//! Import from `[dev-dependencies]` only; never in production code.

pub mod auth;
