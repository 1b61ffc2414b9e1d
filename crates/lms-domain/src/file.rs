//! Upload categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::InvalidValue;

/// Category of an uploaded file. Each category maps to one directory under
/// the upload root and one URL prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Notes,
    Assignments,
    Submissions,
}

impl FileCategory {
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Notes => "notes",
            Self::Assignments => "assignments",
            Self::Submissions => "submissions",
        }
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for FileCategory {
    type Err = InvalidValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "notes" => Ok(Self::Notes),
            "assignments" => Ok(Self::Assignments),
            "submissions" => Ok(Self::Submissions),
            _ => Err(InvalidValue::new("file type", s)),
        }
    }
}
