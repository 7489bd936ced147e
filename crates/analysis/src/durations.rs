use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use normalizer::{IssueState, NormalizedSubmission};
use serde::Serialize;

use crate::buckets::month_start;
use crate::table::SubmissionTable;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewDuration {
    pub id: i64,
    pub title: String,
    pub stage: Option<String>,
    pub created_at: DateTime<Utc>,
    pub closed_at: DateTime<Utc>,
    pub days: i64,
}

impl ReviewDuration {
    fn from_row(row: &NormalizedSubmission) -> Option<Self> {
        let closed_at = row.closed_at?;
        Some(Self {
            id: row.id,
            title: row.title.clone(),
            stage: row.current_stage.clone(),
            created_at: row.created_at,
            closed_at,
            days: (closed_at - row.created_at).num_days(),
        })
    }
}

pub(crate) fn mean(days: &[i64]) -> Option<f64> {
    if days.is_empty() {
        return None;
    }
    Some(days.iter().sum::<i64>() as f64 / days.len() as f64)
}

fn by_close_date(mut durations: Vec<ReviewDuration>) -> Vec<ReviewDuration> {
    durations.sort_by_key(|d| (d.closed_at, d.id));
    durations
}

/// Completed reviews: closed submissions whose stage is a terminal approval.
/// Ordered by close date.
pub fn review_durations(table: &SubmissionTable) -> Vec<ReviewDuration> {
    let taxonomy = table.classifier().taxonomy();
    let durations = table
        .rows()
        .iter()
        .filter(|row| row.state == IssueState::Closed)
        .filter(|row| {
            row.current_stage
                .as_deref()
                .is_some_and(|stage| taxonomy.is_terminal(stage))
        })
        .filter_map(ReviewDuration::from_row)
        .collect();
    by_close_date(durations)
}

/// Every row with a close timestamp, regardless of state or stage.
pub fn closed_durations(table: &SubmissionTable) -> Vec<ReviewDuration> {
    let durations = table
        .rows()
        .iter()
        .filter_map(ReviewDuration::from_row)
        .collect();
    by_close_date(durations)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationSummary {
    pub count: usize,
    pub mean_days: f64,
    pub median_days: f64,
    pub min_days: i64,
    pub max_days: i64,
}

pub fn review_duration_summary(table: &SubmissionTable) -> Option<DurationSummary> {
    let mut days: Vec<i64> = review_durations(table).iter().map(|d| d.days).collect();
    let mean_days = mean(&days)?;
    days.sort_unstable();
    let mid = days.len() / 2;
    let median_days = if days.len() % 2 == 0 {
        (days[mid - 1] + days[mid]) as f64 / 2.0
    } else {
        days[mid] as f64
    };
    Some(DurationSummary {
        count: days.len(),
        mean_days,
        median_days,
        min_days: days[0],
        max_days: days[days.len() - 1],
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyDuration {
    pub month: NaiveDate,
    pub average_days: f64,
    pub review_count: usize,
}

pub fn monthly_review_durations(table: &SubmissionTable) -> Vec<MonthlyDuration> {
    let mut months: BTreeMap<NaiveDate, Vec<i64>> = BTreeMap::new();
    for row in table.rows() {
        if let Some(days) = row.duration_days() {
            let month = month_start(row.created_at);
            months.entry(month).or_default().push(days);
        }
    }
    months
        .into_iter()
        .filter_map(|(month, days)| {
            mean(&days).map(|average_days| MonthlyDuration {
                month,
                average_days,
                review_count: days.len(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{issue, table};

    #[test]
    fn review_durations_need_closed_terminal_rows() {
        let table = table(vec![
            issue(1, "2024-01-01", Some("2024-01-11"), &["6/pyOS-approved"]),
            issue(2, "2024-01-01", Some("2024-02-01"), &["out-of-scope"]),
            issue(3, "2024-01-01", None, &["9/joss-approved"]),
            issue(4, "2023-06-01", Some("2023-07-01"), &["9/joss-approved"]),
        ]);
        let reviews = review_durations(&table);
        let ids: Vec<_> = reviews.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![4, 1]);
        assert_eq!(reviews[1].days, 10);
        assert_eq!(reviews[0].days, 30);

        let closed: Vec<_> = closed_durations(&table).iter().map(|r| r.id).collect();
        assert_eq!(closed, vec![4, 1, 2]);
    }

    #[test]
    fn summary_reports_median() {
        let table = table(vec![
            issue(1, "2024-01-01", Some("2024-01-03"), &["9/joss-approved"]),
            issue(2, "2024-01-01", Some("2024-01-05"), &["9/joss-approved"]),
            issue(3, "2024-01-01", Some("2024-01-11"), &["6/pyOS-approved"]),
            issue(4, "2024-01-01", Some("2024-01-21"), &["6/pyOS-approved"]),
        ]);
        let summary = review_duration_summary(&table).unwrap();
        assert_eq!(summary.count, 4);
        assert_eq!(summary.median_days, 7.0);
        assert_eq!(summary.mean_days, 9.0);
        assert_eq!(summary.min_days, 2);
        assert_eq!(summary.max_days, 20);
    }

    #[test]
    fn summary_absent_without_reviews() {
        let table = table(vec![issue(1, "2024-01-01", None, &[])]);
        assert_eq!(review_duration_summary(&table), None);
    }

    #[test]
    fn monthly_durations_group_by_creation_month() {
        let table = table(vec![
            issue(1, "2024-01-01", Some("2024-01-11"), &[]),
            issue(2, "2024-01-20", Some("2024-03-10"), &["duplicate"]),
            issue(3, "2024-02-01", None, &[]),
        ]);
        let monthly = monthly_review_durations(&table);
        assert_eq!(monthly.len(), 1);
        let january = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(monthly[0].month, january);
        assert_eq!(monthly[0].review_count, 2);
        assert_eq!(monthly[0].average_days, 30.0);
    }
}
