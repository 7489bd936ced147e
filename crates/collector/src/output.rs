use std::path::{Path, PathBuf};

use analysis::{DashboardReport, SubmissionTable};
use anyhow::{Context, Result};
use serde_json::Value;

pub const SUBMISSIONS_FILE: &str = "submissions.json";
pub const REPORT_FILE: &str = "dashboard.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    pub submissions: PathBuf,
    pub report: PathBuf,
}

pub async fn write_dataset(
    dir: &Path,
    table: &SubmissionTable,
    report: &DashboardReport,
) -> Result<DatasetPaths> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("creating output directory {}", dir.display()))?;

    let paths = DatasetPaths {
        submissions: dir.join(SUBMISSIONS_FILE),
        report: dir.join(REPORT_FILE),
    };
    write_json(&paths.submissions, &serde_json::to_value(table.rows())?).await?;
    write_json(&paths.report, &serde_json::to_value(report)?).await?;
    Ok(paths)
}

async fn write_json(path: &Path, value: &Value) -> Result<()> {
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');
    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("writing {}", path.display()))
}
