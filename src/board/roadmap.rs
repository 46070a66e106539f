use std::fmt;

use crate::model::issue::IssueState;
use crate::model::milestone::Milestone;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MilestoneStatus {
    Completed,
    InProgress,
    NotStarted,
}

impl fmt::Display for MilestoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MilestoneStatus::Completed => "completed",
            MilestoneStatus::InProgress => "in-progress",
            MilestoneStatus::NotStarted => "not-started",
        };
        f.pad(label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoadmapEntry<'a> {
    pub milestone: &'a Milestone,
    pub progress: u8,
    pub status: MilestoneStatus,
}

/// Closed issues as a whole percentage of all issues, 0 for an empty milestone.
pub fn progress(milestone: &Milestone) -> u8 {
    let total = milestone.open_issues + milestone.closed_issues;
    if total == 0 {
        return 0;
    }
    (milestone.closed_issues as f64 * 100.0 / total as f64).round() as u8
}

pub fn status(milestone: &Milestone) -> MilestoneStatus {
    let total = milestone.open_issues + milestone.closed_issues;
    if milestone.state == IssueState::Closed || (total > 0 && milestone.open_issues == 0) {
        MilestoneStatus::Completed
    } else if milestone.closed_issues > 0 {
        MilestoneStatus::InProgress
    } else {
        MilestoneStatus::NotStarted
    }
}

/// Milestones ordered by due date; undated ones go last in input order.
pub fn build_roadmap(milestones: &[Milestone]) -> Vec<RoadmapEntry<'_>> {
    let mut entries: Vec<RoadmapEntry<'_>> = milestones
        .iter()
        .map(|m| RoadmapEntry {
            milestone: m,
            progress: progress(m),
            status: status(m),
        })
        .collect();
    entries.sort_by_key(|e| (e.milestone.due_on.is_none(), e.milestone.due_on));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn milestone(number: u64, open: u32, closed: u32, due: Option<(i32, u32, u32)>) -> Milestone {
        Milestone {
            number,
            title: format!("M{number}"),
            description: None,
            state: IssueState::Open,
            open_issues: open,
            closed_issues: closed,
            due_on: due.map(|(y, m, d)| Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()),
            url: None,
        }
    }

    #[test]
    fn progress_rounds_and_handles_empty() {
        assert_eq!(progress(&milestone(1, 0, 0, None)), 0);
        assert_eq!(progress(&milestone(1, 1, 2, None)), 67);
        assert_eq!(progress(&milestone(1, 0, 4, None)), 100);
    }

    #[test]
    fn status_from_counts_and_state() {
        assert_eq!(status(&milestone(1, 3, 0, None)), MilestoneStatus::NotStarted);
        assert_eq!(status(&milestone(1, 0, 0, None)), MilestoneStatus::NotStarted);
        assert_eq!(status(&milestone(1, 2, 1, None)), MilestoneStatus::InProgress);
        assert_eq!(status(&milestone(1, 0, 5, None)), MilestoneStatus::Completed);

        let mut closed = milestone(1, 2, 0, None);
        closed.state = IssueState::Closed;
        assert_eq!(status(&closed), MilestoneStatus::Completed);
    }

    #[test]
    fn roadmap_sorts_by_due_date_undated_last() {
        let milestones = vec![
            milestone(1, 1, 0, None),
            milestone(2, 1, 0, Some((2024, 6, 30))),
            milestone(3, 1, 0, Some((2024, 3, 31))),
            milestone(4, 1, 0, None),
        ];
        let order: Vec<u64> = build_roadmap(&milestones)
            .iter()
            .map(|e| e.milestone.number)
            .collect();
        assert_eq!(order, vec![3, 2, 1, 4]);
    }
}
