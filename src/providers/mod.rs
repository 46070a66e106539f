pub mod github;

use async_trait::async_trait;

use crate::error::TrackerError;
use crate::model::issue::{Issue, IssueUpdate, StateFilter};
use crate::model::milestone::Milestone;

pub type TrackerResult<T> = Result<T, TrackerError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoInfo {
    pub full_name: String,
    pub private: bool,
    pub description: Option<String>,
}

/// The issue tracker a workboard talks to. Passed in rather than held
/// globally so assignment logic can run against an in-memory tracker.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    fn name(&self) -> &str;
    async fn current_user(&self) -> TrackerResult<String>;
    async fn list_repositories(&self) -> TrackerResult<Vec<RepoInfo>>;
    async fn list_issues(&self, state: StateFilter) -> TrackerResult<Vec<Issue>>;
    async fn create_issue(&self, title: &str, body: &str, labels: &[String])
        -> TrackerResult<Issue>;
    async fn update_issue(&self, number: u64, update: &IssueUpdate) -> TrackerResult<Issue>;
    async fn assign_issue(&self, number: u64, assignees: &[String]) -> TrackerResult<Issue>;
    async fn list_milestones(&self, state: StateFilter) -> TrackerResult<Vec<Milestone>>;
    async fn create_milestone(
        &self,
        title: &str,
        description: &str,
        due_on: Option<&str>,
    ) -> TrackerResult<Milestone>;
    /// Logins of everyone with access to the repository.
    async fn list_collaborators(&self) -> TrackerResult<Vec<String>>;

    async fn get_issue(&self, number: u64) -> TrackerResult<Option<Issue>> {
        let issues = self.list_issues(StateFilter::All).await?;
        Ok(issues.into_iter().find(|i| i.number == number))
    }
}
