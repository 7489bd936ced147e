use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;

use crate::table::SubmissionTable;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
    pub month: NaiveDate,
    pub count: usize,
}

pub fn month_start(ts: DateTime<Utc>) -> NaiveDate {
    let date = ts.date_naive();
    date.with_day(1).unwrap_or(date)
}

pub(crate) fn count_by_month<I>(timestamps: I) -> Vec<MonthlyCount>
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let mut buckets: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for ts in timestamps {
        *buckets.entry(month_start(ts)).or_insert(0) += 1;
    }
    buckets
        .into_iter()
        .map(|(month, count)| MonthlyCount { month, count })
        .collect()
}

pub fn monthly_submissions(table: &SubmissionTable) -> Vec<MonthlyCount> {
    count_by_month(table.rows().iter().map(|row| row.created_at))
}

/// Rows without `closed_at` are skipped.
pub fn monthly_completions(table: &SubmissionTable) -> Vec<MonthlyCount> {
    count_by_month(table.rows().iter().filter_map(|row| row.closed_at))
}
