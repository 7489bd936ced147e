use normalizer::{Classifier, IssuePayload};
use serde_json::json;

use crate::table::SubmissionTable;

fn timestamp(value: &str) -> String {
    if value.contains('T') {
        value.to_string()
    } else {
        format!("{value}T00:00:00Z")
    }
}

pub(crate) fn issue(id: i64, created: &str, closed: Option<&str>, labels: &[&str]) -> IssuePayload {
    let nodes: Vec<_> = labels.iter().map(|name| json!({ "name": name })).collect();
    serde_json::from_value(json!({
        "number": id,
        "title": format!("submission {id}"),
        "state": if closed.is_some() { "CLOSED" } else { "OPEN" },
        "createdAt": timestamp(created),
        "closedAt": closed.map(timestamp),
        "comments": { "totalCount": 0 },
        "labels": { "nodes": nodes }
    }))
    .expect("valid issue fixture")
}

pub(crate) fn table(issues: Vec<IssuePayload>) -> SubmissionTable {
    SubmissionTable::from_issues(Classifier::default(), &issues)
}
