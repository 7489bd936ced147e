use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};
use normalizer::{IssueConnection, IssuePayload};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::time::sleep;
use tracing::{info, instrument, warn};

use crate::client::{GithubApiError, GraphqlClient};
use crate::fetcher::{FetchOutcome, FetchSettings, IssuePage, StopReason};
use crate::metrics;

pub const ISSUES_QUERY: &str = r#"
query SubmissionIssues(
  $owner: String!,
  $name: String!,
  $perPage: Int!,
  $labelLimit: Int!,
  $cursor: String
) {
  repository(owner: $owner, name: $name) {
    issues(
      first: $perPage,
      after: $cursor,
      orderBy: { field: CREATED_AT, direction: DESC }
    ) {
      totalCount
      pageInfo {
        hasNextPage
        endCursor
      }
      nodes {
        number
        title
        state
        createdAt
        closedAt
        comments { totalCount }
        labels(first: $labelLimit) {
          totalCount
          nodes { name }
        }
      }
    }
  }
}
"#;

pub struct IssueFetcher {
    client: Arc<dyn GraphqlClient>,
    settings: FetchSettings,
}

impl IssueFetcher {
    pub fn new(client: Arc<dyn GraphqlClient>, settings: FetchSettings) -> Self {
        Self { client, settings }
    }

    pub async fn fetch_page(&self, cursor: Option<&str>) -> Result<IssuePage> {
        let start = Instant::now();
        let response = self
            .client
            .execute(
                ISSUES_QUERY,
                json!({
                    "owner": self.settings.owner,
                    "name": self.settings.name,
                    "perPage": self.settings.page_size as i64,
                    "labelLimit": self.settings.label_limit as i64,
                    "cursor": cursor,
                }),
            )
            .await;
        metrics::FETCH_LATENCY_SECONDS.observe(start.elapsed().as_secs_f64());

        let connection = self.extract_connection(response?)?;
        let mut items = Vec::with_capacity(connection.nodes.len());
        let mut malformed = 0usize;
        let mut truncated_labels = 0usize;
        for node in connection.nodes.into_iter().filter(|node| !node.is_null()) {
            let number = node.get("number").and_then(Value::as_i64);
            match serde_json::from_value::<IssuePayload>(node) {
                Ok(issue) => {
                    if issue.labels_truncated() {
                        truncated_labels += 1;
                        warn!(
                            number = issue.number,
                            total = ?issue.labels.total_count,
                            received = issue.labels.nodes.len(),
                            "label list truncated; stage and flags may be wrong"
                        );
                    }
                    items.push(issue);
                }
                Err(err) => {
                    malformed += 1;
                    metrics::MALFORMED_ISSUES_TOTAL.inc();
                    warn!(number = ?number, error = %err, "skipping malformed issue node");
                }
            }
        }

        Ok(IssuePage {
            items,
            malformed,
            truncated_labels,
            total_count: connection.total_count,
            has_next_page: connection.page_info.has_next_page,
            end_cursor: connection.page_info.end_cursor,
        })
    }

    /// Walks every page, newest issues first. Never fails: a failed page ends
    /// the walk and whatever was gathered so far is returned.
    #[instrument(skip(self), fields(owner = %self.settings.owner, repo = %self.settings.name))]
    pub async fn fetch_all(&self) -> FetchOutcome {
        let mut outcome = FetchOutcome::default();
        let mut cursor: Option<String> = None;

        loop {
            let page = match self.fetch_page(cursor.as_deref()).await {
                Ok(page) => page,
                Err(err) => {
                    metrics::PAGE_FAILURES_TOTAL.inc();
                    warn!(
                        page = outcome.pages + 1,
                        fetched = outcome.issues.len(),
                        error = %format!("{err:#}"),
                        "issue page failed; keeping partial data"
                    );
                    outcome.stopped = Some(StopReason::Error(format!("{err:#}")));
                    break;
                }
            };

            outcome.pages += 1;
            outcome.malformed += page.malformed;
            outcome.truncated_labels += page.truncated_labels;
            if page.total_count.is_some() {
                outcome.total_count = page.total_count;
            }
            metrics::PAGES_FETCHED_TOTAL.inc();
            metrics::ISSUES_FETCHED_TOTAL.inc_by(page.items.len() as u64);
            outcome.issues.extend(page.items);
            info!(
                page = outcome.pages,
                fetched = outcome.issues.len(),
                total = ?outcome.total_count,
                "fetched issue page"
            );

            if !page.has_next_page {
                break;
            }
            match page.end_cursor {
                Some(next) => cursor = Some(next),
                None => {
                    warn!(
                        page = outcome.pages,
                        "more pages reported without an end cursor"
                    );
                    outcome.stopped = Some(StopReason::MissingCursor);
                    break;
                }
            }

            if !self.settings.page_delay.is_zero() {
                sleep(self.settings.page_delay).await;
            }
        }

        outcome
    }

    fn extract_connection(&self, root: Value) -> Result<IssueConnection> {
        let repository = root
            .get("data")
            .and_then(|d| d.get("repository"))
            .ok_or_else(|| anyhow!("missing repository field in GraphQL response"))?;
        if repository.is_null() {
            return Err(GithubApiError::status(
                StatusCode::NOT_FOUND,
                format!("repos/{}/{}", self.settings.owner, self.settings.name),
            )
            .into());
        }
        let issues = repository
            .get("issues")
            .filter(|issues| !issues.is_null())
            .ok_or_else(|| anyhow!("missing issues connection"))?;
        Ok(serde_json::from_value(issues.clone())?)
    }
}
