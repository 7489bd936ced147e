use normalizer::{Classifier, IssuePayload, NormalizedSubmission};

#[derive(Debug, Clone)]
pub struct SubmissionTable {
    classifier: Classifier,
    rows: Vec<NormalizedSubmission>,
}

impl SubmissionTable {
    pub fn new(classifier: Classifier, rows: Vec<NormalizedSubmission>) -> Self {
        Self { classifier, rows }
    }

    pub fn from_issues(classifier: Classifier, issues: &[IssuePayload]) -> Self {
        let rows = classifier.classify_all(issues);
        Self::new(classifier, rows)
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn rows(&self) -> &[NormalizedSubmission] {
        &self.rows
    }

    pub fn total(&self) -> usize {
        self.rows.len()
    }

    pub fn open_count(&self) -> usize {
        self.rows.iter().filter(|row| row.is_open()).count()
    }

    pub fn count_in_stage(&self, stage: &str) -> usize {
        self.rows
            .iter()
            .filter(|row| row.current_stage.as_deref() == Some(stage))
            .count()
    }
}
