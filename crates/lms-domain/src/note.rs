//! Note visibility.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::InvalidValue;

/// Who may read a note.
///
/// `All` notes are readable by every authenticated caller; `Course` notes
/// only by callers with access to the note's course.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoteVisibility {
    #[default]
    All,
    Course,
}

impl NoteVisibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Course => "COURSE",
        }
    }
}

impl fmt::Display for NoteVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteVisibility {
    type Err = InvalidValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ALL" => Ok(Self::All),
            "COURSE" => Ok(Self::Course),
            _ => Err(InvalidValue::new("visibility", s)),
        }
    }
}
