use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::buckets::month_start;
use crate::durations::mean;
use crate::table::SubmissionTable;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageCount {
    pub stage: String,
    pub count: usize,
}

/// Stages with no submissions are omitted.
pub fn stage_distribution(table: &SubmissionTable) -> Vec<StageCount> {
    table
        .classifier()
        .taxonomy()
        .stages()
        .iter()
        .map(|stage| StageCount {
            stage: stage.clone(),
            count: table.count_in_stage(stage),
        })
        .filter(|entry| entry.count > 0)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageMatrixRow {
    pub month: NaiveDate,
    pub counts: Vec<usize>,
}

/// Every stage has a column in every row, zero when empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageMatrix {
    pub stages: Vec<String>,
    pub rows: Vec<StageMatrixRow>,
}

impl StageMatrix {
    pub fn get(&self, month: NaiveDate, stage: &str) -> Option<usize> {
        let column = self.stages.iter().position(|s| s == stage)?;
        self.rows
            .iter()
            .find(|row| row.month == month)
            .and_then(|row| row.counts.get(column).copied())
    }
}

pub fn monthly_stage_matrix(table: &SubmissionTable) -> StageMatrix {
    let taxonomy = table.classifier().taxonomy();
    let stages = taxonomy.stages().to_vec();
    let mut months: BTreeMap<NaiveDate, Vec<usize>> = BTreeMap::new();
    for row in table.rows() {
        let stage = row.current_stage.as_deref();
        let Some(column) = stage.and_then(|s| taxonomy.position(s)) else {
            continue;
        };
        let counts = months
            .entry(month_start(row.created_at))
            .or_insert_with(|| vec![0; stages.len()]);
        counts[column] += 1;
    }
    StageMatrix {
        stages,
        rows: months
            .into_iter()
            .map(|(month, counts)| StageMatrixRow { month, counts })
            .collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageDuration {
    pub stage: String,
    pub count: usize,
    pub average_days: Option<f64>,
}

/// Every taxonomy stage is reported, in taxonomy order.
pub fn stage_durations(table: &SubmissionTable) -> Vec<StageDuration> {
    table
        .classifier()
        .taxonomy()
        .stages()
        .iter()
        .map(|stage| {
            let days: Vec<i64> = table
                .rows()
                .iter()
                .filter(|row| row.current_stage.as_deref() == Some(stage.as_str()))
                .filter_map(|row| row.duration_days())
                .collect();
            StageDuration {
                stage: stage.clone(),
                count: days.len(),
                average_days: mean(&days),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{issue, table};

    fn month(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn distribution_follows_taxonomy_and_skips_empty() {
        let table = table(vec![
            issue(1, "2024-01-01", None, &["6/pyOS-approved"]),
            issue(2, "2024-01-02", None, &["2/seeking-reviewers"]),
            issue(3, "2024-01-03", None, &["6/pyOS-approved"]),
            issue(4, "2024-01-04", None, &["bug"]),
        ]);
        let counts: Vec<_> = stage_distribution(&table)
            .into_iter()
            .map(|entry| (entry.stage, entry.count))
            .collect();
        assert_eq!(
            counts,
            vec![
                ("2/seeking-reviewers".to_string(), 1),
                ("6/pyOS-approved".to_string(), 2),
            ]
        );
    }

    #[test]
    fn matrix_is_zero_filled() {
        let table = table(vec![
            issue(1, "2024-03-02", None, &["0/pre-review-checks"]),
            issue(2, "2024-03-29T23:00:00Z", None, &["0/pre-review-checks"]),
            issue(3, "2024-04-01", None, &["9/joss-approved"]),
            issue(4, "2024-05-01", None, &["question"]),
        ]);
        let matrix = monthly_stage_matrix(&table);
        assert_eq!(matrix.stages.len(), 10);
        assert_eq!(matrix.rows.len(), 2);
        assert!(matrix.rows.iter().all(|row| row.counts.len() == 10));
        assert_eq!(matrix.get(month(2024, 3), "0/pre-review-checks"), Some(2));
        assert_eq!(matrix.get(month(2024, 3), "9/joss-approved"), Some(0));
        assert_eq!(matrix.get(month(2024, 4), "9/joss-approved"), Some(1));
        assert_eq!(matrix.get(month(2024, 4), "0/pre-review-checks"), Some(0));
    }

    #[test]
    fn empty_stage_average_is_absent() {
        let table = table(vec![
            issue(1, "2024-01-01", Some("2024-01-11"), &["6/pyOS-approved"]),
            issue(2, "2024-01-01", None, &["2/seeking-reviewers"]),
        ]);
        let durations = stage_durations(&table);
        assert_eq!(durations.len(), 10);

        let stage = |name: &str| durations.iter().find(|d| d.stage == name).unwrap();

        let approved = stage("6/pyOS-approved");
        assert_eq!(approved.count, 1);
        assert_eq!(approved.average_days, Some(10.0));

        let seeking = stage("2/seeking-reviewers");
        assert_eq!(seeking.count, 0);
        assert_eq!(seeking.average_days, None);
    }
}
