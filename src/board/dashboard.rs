use chrono::{DateTime, Utc};
use std::collections::HashMap;

use super::filter::Status;
use crate::model::issue::{Issue, IssueState};
use crate::model::milestone::Milestone;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub open: usize,
    pub in_progress: usize,
    pub closed: usize,
    pub unassigned_open: usize,
    /// Open issues per assignee, busiest first.
    pub per_assignee: Vec<(String, usize)>,
    pub open_milestones: usize,
    pub next_due: Option<(String, DateTime<Utc>)>,
}

pub fn summarize(issues: &[Issue], milestones: &[Milestone], now: DateTime<Utc>) -> Summary {
    let mut summary = Summary {
        open: 0,
        in_progress: 0,
        closed: 0,
        unassigned_open: 0,
        per_assignee: Vec::new(),
        open_milestones: 0,
        next_due: None,
    };
    let mut per_assignee: HashMap<&str, usize> = HashMap::new();

    for issue in issues {
        match Status::of(issue) {
            Status::Open => summary.open += 1,
            Status::InProgress => summary.in_progress += 1,
            Status::Closed => {
                summary.closed += 1;
                continue;
            }
        }
        if issue.assignees.is_empty() {
            summary.unassigned_open += 1;
        }
        for login in &issue.assignees {
            *per_assignee.entry(login.as_str()).or_insert(0) += 1;
        }
    }

    let mut per_assignee: Vec<(String, usize)> = per_assignee
        .into_iter()
        .map(|(login, n)| (login.to_string(), n))
        .collect();
    per_assignee.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    summary.per_assignee = per_assignee;

    let open_milestones: Vec<&Milestone> = milestones
        .iter()
        .filter(|m| m.state == IssueState::Open)
        .collect();
    summary.open_milestones = open_milestones.len();
    summary.next_due = open_milestones
        .iter()
        .filter_map(|m| m.due_on.filter(|due| *due >= now).map(|due| (m.title.clone(), due)))
        .min_by_key(|(_, due)| *due);

    summary
}
