//! Cross-cutting HTTP plumbing for the LMS service: response envelope,
//! health probes, request-id layer, tracing setup and query helpers.

pub mod health;
pub mod middleware;
pub mod response;
pub mod sea_ext;
pub mod serde;
pub mod tracing;
