use std::fmt;
use std::time::Duration;

use common::config::{FetcherConfig, GithubConfig};
use normalizer::IssuePayload;

pub mod graphql;

pub use graphql::{IssueFetcher, ISSUES_QUERY};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    pub owner: String,
    pub name: String,
    pub page_size: u32,
    pub label_limit: u32,
    pub page_delay: Duration,
}

impl FetchSettings {
    pub fn from_config(github: &GithubConfig, fetcher: &FetcherConfig) -> Self {
        Self {
            owner: github.owner.clone(),
            name: github.repo.clone(),
            page_size: fetcher.effective_page_size(),
            label_limit: fetcher.label_limit,
            page_delay: fetcher.page_delay(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IssuePage {
    pub items: Vec<IssuePayload>,
    pub malformed: usize,
    pub truncated_labels: usize,
    pub total_count: Option<i64>,
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    Error(String),
    MissingCursor,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Error(message) => write!(f, "page request failed: {message}"),
            StopReason::MissingCursor => write!(f, "server reported more pages without a cursor"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    pub issues: Vec<IssuePayload>,
    pub pages: usize,
    pub malformed: usize,
    /// Issues with more labels than were requested per node.
    pub truncated_labels: usize,
    pub total_count: Option<i64>,
    pub stopped: Option<StopReason>,
}

impl FetchOutcome {
    pub fn is_complete(&self) -> bool {
        self.stopped.is_none()
    }
}
