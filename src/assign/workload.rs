use std::collections::HashMap;

use crate::config::TeamMember;
use crate::model::candidate::Candidate;
use crate::model::issue::Issue;

/// Open issues per assignee login.
pub fn open_issue_counts(issues: &[Issue]) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for issue in issues.iter().filter(|i| i.is_open()) {
        for login in &issue.assignees {
            *counts.entry(login.as_str()).or_insert(0) += 1;
        }
    }
    counts
}

/// `open_assigned` as a share of `full_load_issues`, capped at 100.
pub fn workload_percent(open_assigned: usize, full_load_issues: u32) -> f64 {
    let full = f64::from(full_load_issues.max(1));
    (open_assigned as f64 * 100.0 / full).min(100.0)
}

/// One candidate per collaborator, in collaborator order. Skills come from
/// the team roster; a roster `workload` wins over the derived figure.
pub fn build_candidates(
    collaborators: &[String],
    issues: &[Issue],
    team: &[TeamMember],
    full_load_issues: u32,
) -> Vec<Candidate> {
    let counts = open_issue_counts(issues);

    collaborators
        .iter()
        .map(|login| {
            let member = team.iter().find(|m| m.login.eq_ignore_ascii_case(login));
            let derived = workload_percent(
                counts.get(login.as_str()).copied().unwrap_or(0),
                full_load_issues,
            );
            Candidate {
                id: login.clone(),
                skills: member.map(|m| m.skills.clone()).unwrap_or_default(),
                workload: member.and_then(|m| m.workload).unwrap_or(derived),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::issue::IssueState;

    fn issue(number: u64, state: IssueState, assignees: &[&str]) -> Issue {
        Issue {
            number,
            title: format!("Issue {number}"),
            body: None,
            state,
            labels: vec![],
            assignees: assignees.iter().map(|s| s.to_string()).collect(),
            milestone: None,
            url: None,
        }
    }

    fn logins(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn counts_only_open_issues() {
        let issues = vec![
            issue(1, IssueState::Open, &["jane"]),
            issue(2, IssueState::Open, &["jane", "john"]),
            issue(3, IssueState::Closed, &["john"]),
        ];
        let counts = open_issue_counts(&issues);
        assert_eq!(counts.get("jane"), Some(&2));
        assert_eq!(counts.get("john"), Some(&1));
    }

    #[test]
    fn workload_scales_and_caps() {
        assert_eq!(workload_percent(0, 5), 0.0);
        assert_eq!(workload_percent(2, 4), 50.0);
        assert_eq!(workload_percent(9, 4), 100.0);
    }

    #[test]
    fn candidates_follow_collaborator_order_with_roster_skills() {
        let team = vec![
            TeamMember {
                login: "Jane".into(),
                skills: vec!["backend".into(), "api".into()],
                workload: None,
            },
            TeamMember {
                login: "john".into(),
                skills: vec!["frontend".into()],
                workload: Some(75.0),
            },
        ];
        let issues = vec![issue(1, IssueState::Open, &["jane"])];

        let candidates = build_candidates(&logins(&["john", "jane", "sam"]), &issues, &team, 4);

        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0].id, "john");
        assert_eq!(candidates[0].workload, 75.0);
        assert_eq!(candidates[1].skills, vec!["backend", "api"]);
        assert_eq!(candidates[1].workload, 25.0);
        assert!(candidates[2].skills.is_empty());
        assert_eq!(candidates[2].workload, 0.0);
    }
}
