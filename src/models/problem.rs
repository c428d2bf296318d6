use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An unresolved issue flagged against a model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    pub id: Uuid,
    pub model_id: Uuid,
    pub category: ProblemCategory,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// What kind of issue a [`Problem`] describes.
///
/// - `Missing`: The model directory no longer exists on disk
/// - `Empty`: The model directory contains no mesh files
/// - `Duplicate`: The same file has been registered more than once
/// - `Inefficient`: A file is stored in a wasteful format (e.g. ASCII STL)
/// - `Other`: Anything else, described by the note
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProblemCategory {
    Missing,
    Empty,
    Duplicate,
    Inefficient,
    Other,
}

impl ProblemCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Empty => "empty",
            Self::Duplicate => "duplicate",
            Self::Inefficient => "inefficient",
            Self::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "missing" => Some(Self::Missing),
            "empty" => Some(Self::Empty),
            "duplicate" => Some(Self::Duplicate),
            "inefficient" => Some(Self::Inefficient),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Input for flagging a problem on a model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProblemInput {
    pub category: ProblemCategory,
    pub note: Option<String>,
}
