use common::config::ClassifierConfig;

use crate::models::NormalizedSubmission;
use crate::payloads::IssuePayload;
use crate::taxonomy::{FlagTable, ReviewTaxonomy, TaxonomyError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classifier {
    taxonomy: ReviewTaxonomy,
    flags: FlagTable,
    affiliations: Vec<String>,
}

impl Classifier {
    pub fn new(
        taxonomy: ReviewTaxonomy,
        flags: FlagTable,
        affiliations: Vec<String>,
    ) -> Result<Self, TaxonomyError> {
        if let Some(unknown) = affiliations.iter().find(|name| !flags.contains(name)) {
            return Err(TaxonomyError::UnknownAffiliation(unknown.clone()));
        }
        Ok(Self {
            taxonomy,
            flags,
            affiliations,
        })
    }

    pub fn from_config(config: &ClassifierConfig) -> Result<Self, TaxonomyError> {
        let taxonomy = ReviewTaxonomy::new(config.stages.clone(), config.terminal_stages.clone())?;
        let flags = FlagTable::new(config.flags.clone())?;
        Self::new(taxonomy, flags, config.affiliations.clone())
    }

    pub fn taxonomy(&self) -> &ReviewTaxonomy {
        &self.taxonomy
    }

    pub fn flags(&self) -> &FlagTable {
        &self.flags
    }

    pub fn affiliations(&self) -> &[String] {
        &self.affiliations
    }

    pub fn classify(&self, issue: &IssuePayload) -> NormalizedSubmission {
        let labels = issue.label_set();
        let current_stage = self.taxonomy.classify(&labels).map(str::to_string);
        let flags = self.flags.evaluate(&labels);
        NormalizedSubmission {
            id: issue.number,
            title: issue.title.clone(),
            state: issue.state,
            created_at: issue.created_at,
            closed_at: issue.closed_at,
            comment_count: issue.comment_count(),
            labels,
            current_stage,
            flags,
        }
    }

    pub fn classify_all(&self, issues: &[IssuePayload]) -> Vec<NormalizedSubmission> {
        let rows: Vec<_> = issues.iter().map(|issue| self.classify(issue)).collect();
        tracing::debug!(
            rows = rows.len(),
            staged = rows.iter().filter(|r| r.current_stage.is_some()).count(),
            "classified submissions"
        );
        rows
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            taxonomy: ReviewTaxonomy::default(),
            flags: FlagTable::default(),
            affiliations: ClassifierConfig::default().affiliations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IssueState;
    use common::config::FlagRule;
    use serde_json::json;

    fn issue(labels: &[&str]) -> IssuePayload {
        let nodes: Vec<_> = labels.iter().map(|name| json!({ "name": name })).collect();
        serde_json::from_value(json!({
            "number": 17,
            "title": "submission",
            "state": "CLOSED",
            "createdAt": "2024-01-01T00:00:00Z",
            "closedAt": null,
            "comments": { "totalCount": 3 },
            "labels": { "nodes": nodes }
        }))
        .unwrap()
    }

    #[test]
    fn carries_fields_through() {
        let payload = issue(&["9/joss-approved"]);
        let row = Classifier::default().classify(&payload);
        assert_eq!(row.id, 17);
        assert_eq!(row.state, IssueState::Closed);
        // closed without a close timestamp is passed through as-is
        assert!(row.closed_at.is_none());
        assert_eq!(row.comment_count, 3);
        assert_eq!(row.current_stage.as_deref(), Some("9/joss-approved"));
        assert!(row.labels.contains("9/joss-approved"));
    }

    #[test]
    fn every_flag_is_a_column() {
        let classifier = Classifier::default();
        let row = classifier.classify(&issue(&["New Submission!"]));
        assert_eq!(row.flags.len(), classifier.flags().rules().len());
        assert!(row.has_flag("new_submission"));
        assert!(!row.has_flag("presubmission"));
    }

    #[test]
    fn affiliation_must_name_a_flag() {
        let rules = vec![FlagRule::new("astropy", "astropy")];
        let flags = FlagTable::new(rules).unwrap();
        let taxonomy = ReviewTaxonomy::default();
        let result = Classifier::new(taxonomy, flags, vec!["pangeo".into()]);
        assert_eq!(
            result,
            Err(TaxonomyError::UnknownAffiliation("pangeo".into()))
        );
    }

    #[test]
    fn default_config_builds() {
        let config = ClassifierConfig::default();
        let classifier = Classifier::from_config(&config).unwrap();
        assert_eq!(classifier, Classifier::default());
    }
}
