//! Sort vocabulary shared by local processing and upstream requests.

use crate::TypeError;
use serde::{Deserialize, Serialize};

/// Sort direction.
///
/// Every board sorts descending unless told otherwise, so `Desc` is the default.
/// Serialized as `ASC`/`DESC`; deserialized with [`SortDirection::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum SortDirection {
    /// Smallest first.
    Asc,
    /// Largest first.
    #[default]
    Desc,
}

impl SortDirection {
    /// Parse from string representation (case-insensitive).
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            _ => Err(TypeError::InvalidDirection(s.to_string())),
        }
    }

    /// Get string representation, as sent upstream.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// The opposite direction (for column header toggles).
    pub fn toggled(&self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

impl TryFrom<String> for SortDirection {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

/// A sort key: field name plus direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    /// Record field to sort on.
    pub field: String,

    /// Sort direction.
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    /// Create a sort spec.
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// Ascending sort on `field`.
    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    /// Descending sort on `field`.
    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }
}
