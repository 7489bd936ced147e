pub mod buckets;
pub mod durations;
pub mod flags;
pub mod report;
pub mod stages;
pub mod table;

pub use buckets::{month_start, monthly_completions, monthly_submissions, MonthlyCount};
pub use durations::{
    closed_durations, monthly_review_durations, review_duration_summary, review_durations,
    DurationSummary, MonthlyDuration, ReviewDuration,
};
pub use flags::{
    affiliation_monthly, affiliation_summary, flag_counts, AffiliationCount, AffiliationMonth,
    AffiliationSummary, FlagCount,
};
pub use report::DashboardReport;
pub use stages::{
    monthly_stage_matrix, stage_distribution, stage_durations, StageCount, StageDuration,
    StageMatrix, StageMatrixRow,
};
pub use table::SubmissionTable;

#[cfg(test)]
pub(crate) mod fixtures;
