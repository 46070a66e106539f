use thiserror::Error;

/// Failures of the assignment scorer. Every variant is local to one call and
/// leaves the issue unassigned. An empty candidate list is not an error; it
/// is reported as `NoMatchReason::EmptyCandidateSet`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssignError {
    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: String, reason: String },
}

impl AssignError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AssignError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Failures talking to the issue tracker.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("No repository selected. Run `workboard use <owner/repo>` first")]
    NoRepository,

    #[error("GitHub API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("GitHub request failed: {0}")]
    Http(#[from] reqwest::Error),
}
