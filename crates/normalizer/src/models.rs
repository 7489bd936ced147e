use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueState {
    Open,
    Closed,
}

/// Labels attached to an issue. Membership is exact and case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet(BTreeSet<String>);

impl LabelSet {
    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }
}

impl<S: Into<String>> FromIterator<S> for LabelSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Column names of a serialized row. Flags share the row object, so no flag
/// may reuse one of these.
pub const ROW_FIELDS: &[&str] = &[
    "id",
    "title",
    "state",
    "created_at",
    "closed_at",
    "comment_count",
    "labels",
    "current_stage",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSubmission {
    pub id: i64,
    pub title: String,
    pub state: IssueState,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub comment_count: i64,
    pub labels: LabelSet,
    pub current_stage: Option<String>,
    #[serde(flatten)]
    pub flags: BTreeMap<String, bool>,
}

impl NormalizedSubmission {
    pub fn is_open(&self) -> bool {
        self.state == IssueState::Open
    }

    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    /// Whole days between creation and close, truncated toward zero.
    pub fn duration_days(&self) -> Option<i64> {
        self.closed_at
            .map(|closed| (closed - self.created_at).num_days())
    }
}
