use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TaskId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(TaskId)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    pub entry: DateTime<Utc>,
}

impl Task {
    pub fn new(id: TaskId, text: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            text,
            completed: false,
            entry: now,
        }
    }

    /// Key used for duplicate detection: trimmed, Unicode-lowercased.
    /// Internal whitespace is kept as typed.
    pub fn match_key(text: &str) -> String {
        text.trim().to_lowercase()
    }

    pub fn same_text(&self, other: &str) -> bool {
        Self::match_key(&self.text) == Self::match_key(other)
    }
}
