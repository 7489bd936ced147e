use std::collections::BTreeMap;

use chrono::NaiveDate;
use normalizer::NormalizedSubmission;
use serde::Serialize;

use crate::buckets::month_start;
use crate::table::SubmissionTable;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlagCount {
    pub flag: String,
    pub tag: String,
    pub count: usize,
}

pub fn flag_counts(table: &SubmissionTable) -> Vec<FlagCount> {
    table
        .classifier()
        .flags()
        .rules()
        .iter()
        .map(|rule| FlagCount {
            flag: rule.name.clone(),
            tag: rule.tag.clone(),
            count: table
                .rows()
                .iter()
                .filter(|row| row.has_flag(&rule.name))
                .count(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AffiliationCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AffiliationSummary {
    pub affiliations: Vec<AffiliationCount>,
    /// Rows carrying none of the affiliation flags.
    pub neither: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AffiliationMonth {
    pub month: NaiveDate,
    pub affiliations: Vec<AffiliationCount>,
    pub neither: usize,
}

fn summarize<'a, I>(affiliations: &[String], rows: I) -> (Vec<AffiliationCount>, usize)
where
    I: IntoIterator<Item = &'a NormalizedSubmission>,
{
    let mut counts = vec![0usize; affiliations.len()];
    let mut neither = 0usize;
    for row in rows {
        let mut any = false;
        for (slot, name) in counts.iter_mut().zip(affiliations) {
            if row.has_flag(name) {
                *slot += 1;
                any = true;
            }
        }
        if !any {
            neither += 1;
        }
    }
    let counts = affiliations
        .iter()
        .zip(counts)
        .map(|(name, count)| AffiliationCount {
            name: name.clone(),
            count,
        })
        .collect();
    (counts, neither)
}

pub fn affiliation_summary(table: &SubmissionTable) -> AffiliationSummary {
    let (affiliations, neither) = summarize(table.classifier().affiliations(), table.rows());
    AffiliationSummary {
        affiliations,
        neither,
    }
}

pub fn affiliation_monthly(table: &SubmissionTable) -> Vec<AffiliationMonth> {
    let mut months: BTreeMap<NaiveDate, Vec<&NormalizedSubmission>> = BTreeMap::new();
    for row in table.rows() {
        let month = month_start(row.created_at);
        months.entry(month).or_default().push(row);
    }
    months
        .into_iter()
        .map(|(month, rows)| {
            let (affiliations, neither) = summarize(table.classifier().affiliations(), rows);
            AffiliationMonth {
                month,
                affiliations,
                neither,
            }
        })
        .collect()
}
