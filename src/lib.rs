//! GitHub project board: issues, roadmap, and skill/workload based
//! auto-assignment.

pub mod assign;
pub mod board;
pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod providers;

pub use assign::scorer::{evaluate, rank_candidates, select_assignee, Decision, NoMatchReason};
pub use error::{AssignError, TrackerError};
pub use model::candidate::Candidate;
pub use model::issue::IssueText;
