use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use prometheus::{
    register_histogram, register_int_counter, register_int_gauge, Encoder, Histogram, IntCounter,
    IntGauge, TextEncoder,
};

pub static PAGES_FETCHED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "dashboard_pages_fetched_total",
        "Issue pages retrieved from the GraphQL API"
    )
    .expect("dashboard pages fetched")
});

pub static PAGE_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "dashboard_page_failures_total",
        "Issue page requests that ended pagination early"
    )
    .expect("dashboard page failures")
});

pub static ISSUES_FETCHED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "dashboard_issues_fetched_total",
        "Issue records accepted from fetched pages"
    )
    .expect("dashboard issues fetched")
});

pub static MALFORMED_ISSUES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "dashboard_malformed_issues_total",
        "Issue nodes skipped because they did not match the expected shape"
    )
    .expect("dashboard malformed issues")
});

pub static FETCH_LATENCY_SECONDS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "dashboard_fetch_latency_seconds",
        "Latency of GraphQL issue page requests",
        vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    )
    .expect("dashboard fetch latency")
});

pub static SUBMISSIONS_CLASSIFIED: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "dashboard_submissions_classified",
        "Rows in the most recently built submission table"
    )
    .expect("dashboard submissions classified")
});

pub static LAST_RUN_TIMESTAMP: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "dashboard_last_run_timestamp_seconds",
        "Unix timestamp when the dashboard run last started"
    )
    .expect("dashboard last run timestamp")
});

pub fn render() -> Result<String> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&prometheus::gather(), &mut buffer)
        .context("encoding metrics")?;
    Ok(String::from_utf8(buffer)?)
}

pub async fn write_textfile(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, render()?)
        .await
        .with_context(|| format!("writing metrics to {}", path.display()))
}
