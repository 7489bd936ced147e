use std::collections::{BTreeMap, HashSet};

use common::config::{ClassifierConfig, FlagRule};
use common::AppError;
use thiserror::Error;

use crate::models::{LabelSet, ROW_FIELDS};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxonomyError {
    #[error("review taxonomy has no stages")]
    Empty,
    #[error("stage {0:?} appears more than once")]
    DuplicateStage(String),
    #[error("terminal stage {0:?} is not part of the taxonomy")]
    UnknownTerminalStage(String),
    #[error("flag {0:?} is defined more than once")]
    DuplicateFlag(String),
    #[error("flag {0:?} collides with a submission column")]
    ReservedFlagName(String),
    #[error("affiliation {0:?} does not name a flag")]
    UnknownAffiliation(String),
}

impl From<TaxonomyError> for AppError {
    fn from(err: TaxonomyError) -> Self {
        AppError::classifier(err.to_string())
    }
}

/// Ordered review stages. Earlier entries win when a submission carries more
/// than one stage label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewTaxonomy {
    stages: Vec<String>,
    terminal: Vec<String>,
}

impl ReviewTaxonomy {
    pub fn new(stages: Vec<String>, terminal: Vec<String>) -> Result<Self, TaxonomyError> {
        if stages.is_empty() {
            return Err(TaxonomyError::Empty);
        }
        let mut seen = HashSet::new();
        for stage in &stages {
            if !seen.insert(stage.as_str()) {
                return Err(TaxonomyError::DuplicateStage(stage.clone()));
            }
        }
        if let Some(unknown) = terminal.iter().find(|t| !seen.contains(t.as_str())) {
            return Err(TaxonomyError::UnknownTerminalStage(unknown.clone()));
        }
        Ok(Self { stages, terminal })
    }

    pub fn stages(&self) -> &[String] {
        &self.stages
    }

    pub fn is_terminal(&self, stage: &str) -> bool {
        self.terminal.iter().any(|t| t == stage)
    }

    pub fn position(&self, stage: &str) -> Option<usize> {
        self.stages.iter().position(|s| s == stage)
    }

    pub fn classify(&self, labels: &LabelSet) -> Option<&str> {
        self.stages
            .iter()
            .find(|stage| labels.contains(stage))
            .map(String::as_str)
    }
}

impl Default for ReviewTaxonomy {
    fn default() -> Self {
        let config = ClassifierConfig::default();
        Self {
            stages: config.stages,
            terminal: config.terminal_stages,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagTable {
    rules: Vec<FlagRule>,
}

impl FlagTable {
    pub fn new(rules: Vec<FlagRule>) -> Result<Self, TaxonomyError> {
        let mut seen = HashSet::new();
        for rule in &rules {
            if ROW_FIELDS.contains(&rule.name.as_str()) {
                return Err(TaxonomyError::ReservedFlagName(rule.name.clone()));
            }
            if !seen.insert(rule.name.as_str()) {
                return Err(TaxonomyError::DuplicateFlag(rule.name.clone()));
            }
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[FlagRule] {
        &self.rules
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.iter().any(|rule| rule.name == name)
    }

    pub fn evaluate(&self, labels: &LabelSet) -> BTreeMap<String, bool> {
        self.rules
            .iter()
            .map(|rule| (rule.name.clone(), labels.contains(&rule.tag)))
            .collect()
    }
}

impl Default for FlagTable {
    fn default() -> Self {
        Self {
            rules: ClassifierConfig::default().flags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(tags: &[&str]) -> LabelSet {
        tags.iter().copied().collect()
    }

    #[test]
    fn earlier_stage_wins() {
        let taxonomy = ReviewTaxonomy::default();
        let set = labels(&["6/pyOS-approved", "2/seeking-reviewers"]);
        assert_eq!(taxonomy.classify(&set), Some("2/seeking-reviewers"));
    }

    #[test]
    fn no_stage_label_is_none() {
        let taxonomy = ReviewTaxonomy::default();
        assert_eq!(taxonomy.classify(&labels(&["bug", "question"])), None);
    }

    #[test]
    fn precedence_follows_configured_order() {
        let stages = vec!["late".into(), "early".into()];
        let taxonomy = ReviewTaxonomy::new(stages, vec![]).unwrap();
        let set = labels(&["early", "late"]);
        assert_eq!(taxonomy.classify(&set), Some("late"));
    }

    #[test]
    fn rejects_bad_taxonomies() {
        assert_eq!(
            ReviewTaxonomy::new(vec![], vec![]),
            Err(TaxonomyError::Empty)
        );
        assert_eq!(
            ReviewTaxonomy::new(vec!["a".into(), "a".into()], vec![]),
            Err(TaxonomyError::DuplicateStage("a".into()))
        );
        assert_eq!(
            ReviewTaxonomy::new(vec!["a".into()], vec!["b".into()]),
            Err(TaxonomyError::UnknownTerminalStage("b".into()))
        );
    }

    #[test]
    fn flags_are_independent() {
        let table = FlagTable::default();
        let flags = table.evaluate(&labels(&["astropy", "Pangeo"]));
        assert_eq!(flags.get("astropy"), Some(&true));
        assert_eq!(flags.get("pangeo"), Some(&true));
        assert_eq!(flags.get("duplicate"), Some(&false));
        assert_eq!(flags.len(), table.rules().len());
    }

    #[test]
    fn duplicate_flag_names_rejected() {
        let rules = vec![FlagRule::new("a", "x"), FlagRule::new("a", "y")];
        assert_eq!(
            FlagTable::new(rules),
            Err(TaxonomyError::DuplicateFlag("a".into()))
        );
    }

    #[test]
    fn flag_named_like_a_column_rejected() {
        let rules = vec![FlagRule::new("state", "closed")];
        assert_eq!(
            FlagTable::new(rules),
            Err(TaxonomyError::ReservedFlagName("state".into()))
        );
    }
}
