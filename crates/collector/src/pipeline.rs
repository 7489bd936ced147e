use std::path::Path;
use std::sync::Arc;

use analysis::{DashboardReport, SubmissionTable};
use chrono::Utc;
use common::{AppConfig, AppError, Result};
use normalizer::Classifier;
use tracing::{info, warn};

use crate::client::{GraphqlClient, HttpGraphqlClient};
use crate::fetcher::{FetchSettings, IssueFetcher, StopReason};
use crate::metrics;
use crate::output::{self, DatasetPaths};

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub fetched: usize,
    pub malformed: usize,
    pub stopped: Option<StopReason>,
    pub rows: usize,
    pub dataset: DatasetPaths,
}

pub async fn run(config: &AppConfig) -> Result<RunSummary> {
    let github = &config.github;
    let client = HttpGraphqlClient::new(&github.endpoint, &github.user_agent, github.token())
        .map_err(AppError::http)?;
    if !client.is_authenticated() {
        warn!(
            var = %github.token_env,
            "no GitHub token set; fetching unauthenticated with stricter rate limits"
        );
    }
    run_with_client(config, Arc::new(client)).await
}

pub async fn run_with_client(
    config: &AppConfig,
    client: Arc<dyn GraphqlClient>,
) -> Result<RunSummary> {
    // Bad taxonomy config fails before any request goes out.
    let classifier = Classifier::from_config(&config.classifier)?;
    metrics::LAST_RUN_TIMESTAMP.set(Utc::now().timestamp());

    let fetcher = IssueFetcher::new(
        client,
        FetchSettings::from_config(&config.github, &config.fetcher),
    );
    let outcome = fetcher.fetch_all().await;
    match &outcome.stopped {
        Some(reason) => warn!(
            fetched = outcome.issues.len(),
            total = ?outcome.total_count,
            reason = %reason,
            "building dashboard from partial data"
        ),
        None => info!(
            fetched = outcome.issues.len(),
            pages = outcome.pages,
            "fetched all issues"
        ),
    }

    let table = SubmissionTable::from_issues(classifier, &outcome.issues);
    metrics::SUBMISSIONS_CLASSIFIED.set(table.total() as i64);
    let report = DashboardReport::build(&table);

    let dataset = output::write_dataset(Path::new(&config.output.dir), &table, &report)
        .await
        .map_err(AppError::output)?;
    info!(
        rows = table.total(),
        open = report.open,
        submissions = %dataset.submissions.display(),
        report = %dataset.report.display(),
        "wrote dashboard dataset"
    );

    if let Some(path) = &config.output.metrics_file {
        metrics::write_textfile(Path::new(path))
            .await
            .map_err(AppError::output)?;
    }

    Ok(RunSummary {
        fetched: outcome.issues.len(),
        malformed: outcome.malformed,
        stopped: outcome.stopped,
        rows: table.total(),
        dataset,
    })
}
