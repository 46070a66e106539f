pub mod log;
pub mod scorer;
pub mod workload;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::config::AppConfig;
use crate::model::candidate::Candidate;
use crate::model::issue::{Issue, IssueText, StateFilter};
use crate::providers::IssueTracker;
use self::log::{AssignmentEvent, AssignmentLog};
use self::scorer::ScoredCandidate;

/// Owned view of a scored candidate, detached from the candidate list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCandidate {
    pub login: String,
    pub matched_skills: Vec<String>,
    pub workload: f64,
    pub skill_match_score: f64,
    pub workload_score: f64,
    pub total_score: f64,
}

impl From<&ScoredCandidate<'_>> for RankedCandidate {
    fn from(scored: &ScoredCandidate<'_>) -> Self {
        Self {
            login: scored.candidate.id.clone(),
            matched_skills: scored.matched_skills.iter().map(|s| s.to_string()).collect(),
            workload: scored.candidate.workload,
            skill_match_score: scored.skill_match_score,
            workload_score: scored.workload_score,
            total_score: scored.total_score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    /// Best first.
    pub ranking: Vec<RankedCandidate>,
    pub assignee: Option<String>,
}

impl Suggestion {
    pub fn from_candidates(issue: &IssueText, candidates: &[Candidate]) -> Result<Self> {
        let ranked = scorer::rank_candidates(issue, candidates)?;
        let assignee = scorer::decide(ranked.first().cloned())
            .assignee()
            .map(|c| c.id.clone());
        let ranking = ranked.iter().map(RankedCandidate::from).collect();
        Ok(Self { ranking, assignee })
    }

    pub fn best(&self) -> Option<&RankedCandidate> {
        self.ranking.first()
    }
}

/// Pulls collaborators and open issues from the tracker and turns them into
/// scoring candidates.
pub async fn gather_candidates(
    tracker: &dyn IssueTracker,
    config: &AppConfig,
) -> Result<Vec<Candidate>> {
    let collaborators = tracker
        .list_collaborators()
        .await
        .with_context(|| format!("Failed to list collaborators from {}", tracker.name()))?;
    let open_issues = tracker
        .list_issues(StateFilter::Open)
        .await
        .with_context(|| format!("Failed to list open issues from {}", tracker.name()))?;

    tracing::debug!(
        tracker = tracker.name(),
        collaborators = collaborators.len(),
        open_issues = open_issues.len(),
        "Gathered assignment inputs"
    );

    Ok(workload::build_candidates(
        &collaborators,
        &open_issues,
        &config.team,
        config.assign.full_load_issues,
    ))
}

/// Ranks the team for free-form issue text without touching the tracker.
pub async fn suggest(
    tracker: &dyn IssueTracker,
    config: &AppConfig,
    issue: &IssueText,
) -> Result<Suggestion> {
    let candidates = gather_candidates(tracker, config).await?;
    Suggestion::from_candidates(issue, &candidates)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignOutcome {
    pub issue_number: u64,
    pub suggestion: Suggestion,
}

impl AssignOutcome {
    pub fn assignee(&self) -> Option<&str> {
        self.suggestion.assignee.as_deref()
    }
}

/// Scores `issue` and, when someone clears the threshold, assigns them.
/// Every decision is appended to `log`.
pub async fn auto_assign_issue(
    tracker: &dyn IssueTracker,
    config: &AppConfig,
    log: &AssignmentLog,
    issue: &Issue,
) -> Result<AssignOutcome> {
    if !issue.is_open() {
        bail!("Issue #{} is closed", issue.number);
    }
    if !issue.assignees.is_empty() {
        bail!(
            "Issue #{} is already assigned to {}",
            issue.number,
            issue.assignees.join(", ")
        );
    }

    let suggestion = suggest(tracker, config, &issue.text()).await?;
    let mut event = AssignmentEvent::new(issue.number, &issue.title, "no_match");
    event.score = suggestion.best().map(|b| b.total_score);

    if let Some(login) = &suggestion.assignee {
        tracker
            .assign_issue(issue.number, std::slice::from_ref(login))
            .await
            .with_context(|| format!("Failed to assign #{} to {login}", issue.number))?;
        tracing::info!(number = issue.number, assignee = %login, "Auto-assigned issue");
        event.event = "assigned".into();
        event.assignee = Some(login.clone());
    } else {
        let message = match suggestion.best() {
            Some(best) => format!(
                "best candidate {} scored {:.1}, threshold {}",
                best.login,
                best.total_score,
                scorer::MATCH_THRESHOLD
            ),
            None => "no collaborators".to_string(),
        };
        tracing::info!(number = issue.number, %message, "No suitable assignee");
        event.message = Some(message);
    }

    if let Err(e) = log.append(&event) {
        tracing::warn!(error = %e, path = %log.path().display(), "Failed to record assignment");
    }

    Ok(AssignOutcome {
        issue_number: issue.number,
        suggestion,
    })
}

pub async fn auto_assign(
    tracker: &dyn IssueTracker,
    config: &AppConfig,
    log: &AssignmentLog,
    number: u64,
) -> Result<AssignOutcome> {
    let issue = tracker
        .get_issue(number)
        .await
        .with_context(|| format!("Failed to fetch issue #{number}"))?
        .with_context(|| format!("Issue #{number} not found"))?;
    auto_assign_issue(tracker, config, log, &issue).await
}
