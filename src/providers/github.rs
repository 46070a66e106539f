use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{IssueTracker, RepoInfo, TrackerResult};
use crate::config::{GitHubConfig, DEFAULT_API_URL};
use crate::error::TrackerError;
use crate::model::issue::{Issue, IssueState, IssueUpdate, StateFilter};
use crate::model::milestone::Milestone;

const USER_AGENT: &str = concat!("workboard/", env!("CARGO_PKG_VERSION"));
const PER_PAGE: &str = "100";

/// GitHub REST v3 client scoped to one repository.
pub struct GitHubTracker {
    api_url: String,
    token: String,
    repository: Option<(String, String)>,
    client: reqwest::Client,
}

impl GitHubTracker {
    pub fn new(token: String) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token,
            repository: None,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &GitHubConfig, token: String) -> Self {
        let mut tracker = Self::new(token).with_api_url(config.api_url());
        if let Some((owner, repo)) = config.repository() {
            tracker.set_repository(owner, repo);
        }
        tracker
    }

    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    pub fn set_repository(&mut self, owner: &str, repo: &str) {
        self.repository = Some((owner.to_string(), repo.to_string()));
    }

    fn repo_url(&self, path: &str) -> TrackerResult<String> {
        let (owner, repo) = self.repository.as_ref().ok_or(TrackerError::NoRepository)?;
        Ok(format!(
            "{}/repos/{}/{}{}",
            self.api_url,
            urlencoding::encode(owner),
            urlencoding::encode(repo),
            path
        ))
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header("User-Agent", USER_AGENT)
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> TrackerResult<T> {
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(api_error(status, resp).await);
        }
        Ok(resp.json().await?)
    }
}

async fn api_error(status: StatusCode, resp: reqwest::Response) -> TrackerError {
    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<GhErrorBody>(&text)
        .map(|body| body.message)
        .unwrap_or(text);
    tracing::warn!(status = status.as_u16(), %message, "GitHub API error");
    TrackerError::Api {
        status: status.as_u16(),
        message,
    }
}

#[derive(Deserialize)]
struct GhErrorBody {
    message: String,
}

#[derive(Deserialize)]
struct GhUser {
    login: String,
}

#[derive(Deserialize)]
struct GhRepo {
    full_name: String,
    #[serde(default)]
    private: bool,
    description: Option<String>,
}

#[derive(Deserialize)]
struct GhLabel {
    name: String,
}

#[derive(Deserialize)]
struct GhMilestoneRef {
    title: String,
}

#[derive(Deserialize)]
struct GhIssue {
    number: u64,
    title: String,
    body: Option<String>,
    state: IssueState,
    #[serde(default)]
    labels: Vec<GhLabel>,
    #[serde(default)]
    assignees: Vec<GhUser>,
    milestone: Option<GhMilestoneRef>,
    html_url: Option<String>,
    /// Present when the "issue" is actually a pull request.
    pull_request: Option<serde_json::Value>,
}

impl From<GhIssue> for Issue {
    fn from(issue: GhIssue) -> Self {
        Issue {
            number: issue.number,
            title: issue.title,
            body: issue.body.filter(|b| !b.trim().is_empty()),
            state: issue.state,
            labels: issue.labels.into_iter().map(|l| l.name).collect(),
            assignees: issue.assignees.into_iter().map(|a| a.login).collect(),
            milestone: issue.milestone.map(|m| m.title),
            url: issue.html_url,
        }
    }
}

#[derive(Deserialize)]
struct GhMilestone {
    number: u64,
    title: String,
    description: Option<String>,
    state: IssueState,
    #[serde(default)]
    open_issues: u32,
    #[serde(default)]
    closed_issues: u32,
    due_on: Option<DateTime<Utc>>,
    html_url: Option<String>,
}

impl From<GhMilestone> for Milestone {
    fn from(m: GhMilestone) -> Self {
        Milestone {
            number: m.number,
            title: m.title,
            description: m.description.filter(|d| !d.trim().is_empty()),
            state: m.state,
            open_issues: m.open_issues,
            closed_issues: m.closed_issues,
            due_on: m.due_on,
            url: m.html_url,
        }
    }
}

fn issues_from(raw: Vec<GhIssue>) -> Vec<Issue> {
    raw.into_iter()
        .filter(|i| i.pull_request.is_none())
        .map(Issue::from)
        .collect()
}

#[async_trait]
impl IssueTracker for GitHubTracker {
    fn name(&self) -> &str {
        "GitHub"
    }

    async fn current_user(&self) -> TrackerResult<String> {
        let url = format!("{}/user", self.api_url);
        let user: GhUser = self.send(self.request(Method::GET, &url)).await?;
        Ok(user.login)
    }

    async fn list_repositories(&self) -> TrackerResult<Vec<RepoInfo>> {
        let url = format!("{}/user/repos", self.api_url);
        let req = self
            .request(Method::GET, &url)
            .query(&[("sort", "updated"), ("per_page", PER_PAGE)]);
        let repos: Vec<GhRepo> = self.send(req).await?;
        Ok(repos
            .into_iter()
            .map(|r| RepoInfo {
                full_name: r.full_name,
                private: r.private,
                description: r.description,
            })
            .collect())
    }

    async fn list_issues(&self, state: StateFilter) -> TrackerResult<Vec<Issue>> {
        let url = self.repo_url("/issues")?;
        let req = self
            .request(Method::GET, &url)
            .query(&[("state", state.as_str()), ("per_page", PER_PAGE)]);
        let raw: Vec<GhIssue> = self.send(req).await?;
        let issues = issues_from(raw);
        tracing::debug!(count = issues.len(), %state, "Fetched issues");
        Ok(issues)
    }

    async fn get_issue(&self, number: u64) -> TrackerResult<Option<Issue>> {
        let url = self.repo_url(&format!("/issues/{number}"))?;
        match self.send::<GhIssue>(self.request(Method::GET, &url)).await {
            Ok(issue) if issue.pull_request.is_none() => Ok(Some(issue.into())),
            Ok(_) => Ok(None),
            Err(TrackerError::Api { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_issue(
        &self,
        title: &str,
        body: &str,
        labels: &[String],
    ) -> TrackerResult<Issue> {
        let url = self.repo_url("/issues")?;
        let payload = serde_json::json!({ "title": title, "body": body, "labels": labels });
        let issue: GhIssue = self
            .send(self.request(Method::POST, &url).json(&payload))
            .await?;
        tracing::info!(number = issue.number, "Created issue");
        Ok(issue.into())
    }

    async fn update_issue(&self, number: u64, update: &IssueUpdate) -> TrackerResult<Issue> {
        let url = self.repo_url(&format!("/issues/{number}"))?;
        let issue: GhIssue = self
            .send(self.request(Method::PATCH, &url).json(update))
            .await?;
        tracing::info!(number, "Updated issue");
        Ok(issue.into())
    }

    async fn assign_issue(&self, number: u64, assignees: &[String]) -> TrackerResult<Issue> {
        let url = self.repo_url(&format!("/issues/{number}/assignees"))?;
        let payload = serde_json::json!({ "assignees": assignees });
        let issue: GhIssue = self
            .send(self.request(Method::POST, &url).json(&payload))
            .await?;
        tracing::info!(number, ?assignees, "Assigned issue");
        Ok(issue.into())
    }

    async fn list_milestones(&self, state: StateFilter) -> TrackerResult<Vec<Milestone>> {
        let url = self.repo_url("/milestones")?;
        let req = self
            .request(Method::GET, &url)
            .query(&[("state", state.as_str()), ("per_page", PER_PAGE)]);
        let raw: Vec<GhMilestone> = self.send(req).await?;
        Ok(raw.into_iter().map(Milestone::from).collect())
    }

    async fn create_milestone(
        &self,
        title: &str,
        description: &str,
        due_on: Option<&str>,
    ) -> TrackerResult<Milestone> {
        let url = self.repo_url("/milestones")?;
        let mut payload = serde_json::json!({ "title": title, "description": description });
        if let Some(due_on) = due_on {
            payload["due_on"] = serde_json::Value::String(due_on.to_string());
        }
        let milestone: GhMilestone = self
            .send(self.request(Method::POST, &url).json(&payload))
            .await?;
        tracing::info!(number = milestone.number, "Created milestone");
        Ok(milestone.into())
    }

    async fn list_collaborators(&self) -> TrackerResult<Vec<String>> {
        let url = self.repo_url("/collaborators")?;
        let req = self
            .request(Method::GET, &url)
            .query(&[("per_page", PER_PAGE)]);
        let users: Vec<GhUser> = self.send(req).await?;
        Ok(users.into_iter().map(|u| u.login).collect())
    }
}
