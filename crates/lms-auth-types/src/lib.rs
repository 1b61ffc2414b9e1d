//! Auth types shared by the LMS service and its test helpers.
//!
//! Provides bearer-token issuance and validation plus `Authorization` header
//! parsing.

pub mod bearer;
pub mod token;
