use std::fmt;
use std::str::FromStr;

use crate::model::issue::Issue;

/// Label that marks an open issue as being worked on.
pub const IN_PROGRESS_LABEL: &str = "in-progress";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Open,
    InProgress,
    Closed,
}

impl Status {
    pub fn of(issue: &Issue) -> Self {
        if !issue.is_open() {
            Status::Closed
        } else if issue.has_label(IN_PROGRESS_LABEL) {
            Status::InProgress
        } else {
            Status::Open
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Open => "open",
            Status::InProgress => "in-progress",
            Status::Closed => "closed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "open" => Ok(Status::Open),
            "in-progress" | "in_progress" | "inprogress" => Ok(Status::InProgress),
            "closed" => Ok(Status::Closed),
            other => Err(format!("Unknown status {other:?}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Reads `high`, `priority: high`, `priority:high` or `priority/high`
    /// style labels. The first recognised label wins.
    pub fn of(issue: &Issue) -> Option<Self> {
        issue.labels.iter().find_map(|label| {
            let label = label.trim().to_ascii_lowercase();
            let level = label
                .strip_prefix("priority")
                .map(|rest| rest.trim_start_matches([':', '/', '-', ' ']))
                .unwrap_or(&label);
            level.parse().ok()
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(format!("Unknown priority {other:?}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AssigneeFilter {
    #[default]
    All,
    Unassigned,
    Login(String),
}

impl FromStr for AssigneeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Err("Assignee filter cannot be empty".into()),
            "all" => Ok(AssigneeFilter::All),
            "unassigned" | "none" => Ok(AssigneeFilter::Unassigned),
            login => Ok(AssigneeFilter::Login(login.trim_start_matches('@').to_string())),
        }
    }
}

/// `None` on a field means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueFilter {
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub assignee: AssigneeFilter,
}

impl IssueFilter {
    pub fn matches(&self, issue: &Issue) -> bool {
        if let Some(status) = self.status {
            if Status::of(issue) != status {
                return false;
            }
        }
        if let Some(priority) = self.priority {
            if Priority::of(issue) != Some(priority) {
                return false;
            }
        }
        match &self.assignee {
            AssigneeFilter::All => true,
            AssigneeFilter::Unassigned => issue.assignees.is_empty(),
            AssigneeFilter::Login(login) => {
                issue.assignees.iter().any(|a| a.eq_ignore_ascii_case(login))
            }
        }
    }

    pub fn apply<'a>(&self, issues: &'a [Issue]) -> Vec<&'a Issue> {
        issues.iter().filter(|i| self.matches(i)).collect()
    }
}
