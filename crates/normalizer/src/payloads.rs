use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::models::{IssueState, LabelSet};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default)]
    pub end_cursor: Option<String>,
}

/// One page of the issues connection. Nodes stay as raw JSON so that a single
/// bad record can be skipped without losing the rest of the page.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueConnection {
    #[serde(default)]
    pub total_count: Option<i64>,
    pub page_info: PageInfo,
    #[serde(default)]
    pub nodes: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountConnection {
    #[serde(default)]
    pub total_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LabelNode {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelConnection {
    #[serde(default)]
    pub total_count: Option<i64>,
    #[serde(default)]
    pub nodes: Vec<Option<LabelNode>>,
}

/// A single issue as received. Missing `labels`, `createdAt` or an unknown
/// `state` make the node fail to deserialize.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuePayload {
    pub number: i64,
    #[serde(default)]
    pub title: String,
    pub state: IssueState,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub comments: CountConnection,
    pub labels: LabelConnection,
}

impl IssuePayload {
    pub fn label_set(&self) -> LabelSet {
        self.labels
            .nodes
            .iter()
            .flatten()
            .map(|node| node.name.clone())
            .collect()
    }

    pub fn comment_count(&self) -> i64 {
        self.comments.total_count.max(0)
    }

    pub fn labels_truncated(&self) -> bool {
        let received = self.labels.nodes.len() as i64;
        self.labels.total_count.is_some_and(|total| total > received)
    }
}
