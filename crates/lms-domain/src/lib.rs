//! Domain types shared across the LMS crates.
//!
//! This crate contains only pure types with no framework dependencies.
//! Every closed vocabulary of the system (roles, statuses, levels, note
//! visibility, file categories) lives here and is parsed exactly once at the
//! HTTP boundary.

pub mod course;
pub mod enrollment;
pub mod file;
pub mod note;
pub mod user;

use thiserror::Error;

/// Error returned when a string is not a member of one of the closed enums.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {value:?}")]
pub struct InvalidValue {
    pub field: &'static str,
    pub value: String,
}

impl InvalidValue {
    pub(crate) fn new(field: &'static str, value: &str) -> Self {
        Self {
            field,
            value: value.to_owned(),
        }
    }
}
