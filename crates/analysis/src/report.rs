use serde::Serialize;

use crate::buckets::{monthly_completions, monthly_submissions, MonthlyCount};
use crate::durations::{
    closed_durations, monthly_review_durations, review_duration_summary, review_durations,
    DurationSummary, MonthlyDuration, ReviewDuration,
};
use crate::flags::{
    affiliation_monthly, affiliation_summary, flag_counts, AffiliationMonth, AffiliationSummary,
    FlagCount,
};
use crate::stages::{
    monthly_stage_matrix, stage_distribution, stage_durations, StageCount, StageDuration,
    StageMatrix,
};
use crate::table::SubmissionTable;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub total: usize,
    pub open: usize,
    pub monthly_submissions: Vec<MonthlyCount>,
    pub monthly_completions: Vec<MonthlyCount>,
    pub stage_distribution: Vec<StageCount>,
    pub flag_counts: Vec<FlagCount>,
    pub stage_matrix: StageMatrix,
    pub stage_durations: Vec<StageDuration>,
    pub review_durations: Vec<ReviewDuration>,
    pub review_duration_summary: Option<DurationSummary>,
    pub closed_durations: Vec<ReviewDuration>,
    pub monthly_review_durations: Vec<MonthlyDuration>,
    pub affiliations: AffiliationSummary,
    pub affiliation_monthly: Vec<AffiliationMonth>,
}

impl DashboardReport {
    pub fn build(table: &SubmissionTable) -> Self {
        let report = Self {
            total: table.total(),
            open: table.open_count(),
            monthly_submissions: monthly_submissions(table),
            monthly_completions: monthly_completions(table),
            stage_distribution: stage_distribution(table),
            flag_counts: flag_counts(table),
            stage_matrix: monthly_stage_matrix(table),
            stage_durations: stage_durations(table),
            review_durations: review_durations(table),
            review_duration_summary: review_duration_summary(table),
            closed_durations: closed_durations(table),
            monthly_review_durations: monthly_review_durations(table),
            affiliations: affiliation_summary(table),
            affiliation_monthly: affiliation_monthly(table),
        };
        tracing::debug!(
            total = report.total,
            open = report.open,
            reviews = report.review_durations.len(),
            "built dashboard report"
        );
        report
    }
}
