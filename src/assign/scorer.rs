//! Skill/workload scoring of assignment candidates.
//!
//! Each candidate earns [`SKILL_POINTS`] per skill tag found in the lowercased
//! issue text and `100 - workload` for availability. The two are blended
//! 70/30 and the best candidate is chosen only if it clears
//! [`MATCH_THRESHOLD`]. Everything here is pure; callers apply the result.

use std::cmp::Ordering;

use serde::Serialize;

use crate::error::AssignError;
use crate::model::candidate::{validate_candidates, Candidate};
use crate::model::issue::IssueText;

pub const SKILL_POINTS: f64 = 25.0;
pub const SKILL_WEIGHT: f64 = 0.7;
pub const WORKLOAD_WEIGHT: f64 = 0.3;
/// The best total must be strictly greater than this.
pub const MATCH_THRESHOLD: f64 = 30.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate<'a> {
    pub candidate: &'a Candidate,
    pub matched_skills: Vec<&'a str>,
    pub skill_match_score: f64,
    pub workload_score: f64,
    pub total_score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NoMatchReason<'a> {
    EmptyCandidateSet,
    BelowThreshold { best: ScoredCandidate<'a> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decision<'a> {
    Assigned(ScoredCandidate<'a>),
    NoMatch(NoMatchReason<'a>),
}

impl<'a> Decision<'a> {
    pub fn assignee(&self) -> Option<&'a Candidate> {
        match self {
            Decision::Assigned(scored) => Some(scored.candidate),
            Decision::NoMatch(_) => None,
        }
    }
}

/// Scores one candidate against already-lowercased issue text.
pub fn score_candidate<'a>(issue_text: &str, candidate: &'a Candidate) -> ScoredCandidate<'a> {
    let matched_skills: Vec<&str> = candidate
        .skills
        .iter()
        .filter(|skill| issue_text.contains(&skill.to_lowercase()))
        .map(String::as_str)
        .collect();

    // No cap: five matching tags score 125.
    let skill_match_score = SKILL_POINTS * matched_skills.len() as f64;
    let workload_score = 100.0 - candidate.workload;
    let total_score = SKILL_WEIGHT * skill_match_score + WORKLOAD_WEIGHT * workload_score;

    ScoredCandidate {
        candidate,
        matched_skills,
        skill_match_score,
        workload_score,
        total_score,
    }
}

/// All candidates, best first. Equal totals keep their input order.
pub fn rank_candidates<'a>(
    issue: &IssueText,
    candidates: &'a [Candidate],
) -> Result<Vec<ScoredCandidate<'a>>, AssignError> {
    validate_candidates(candidates)?;

    let issue_text = issue.searchable();
    let mut ranked: Vec<ScoredCandidate<'a>> = candidates
        .iter()
        .map(|c| score_candidate(&issue_text, c))
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| {
        b.total_score
            .partial_cmp(&a.total_score)
            .unwrap_or(Ordering::Equal)
    });
    Ok(ranked)
}

pub fn evaluate<'a>(
    issue: &IssueText,
    candidates: &'a [Candidate],
) -> Result<Decision<'a>, AssignError> {
    let best = rank_candidates(issue, candidates)?.into_iter().next();
    Ok(decide(best))
}

/// Applies the threshold to the top of an existing ranking.
pub fn decide(best: Option<ScoredCandidate<'_>>) -> Decision<'_> {
    let decision = match best {
        None => Decision::NoMatch(NoMatchReason::EmptyCandidateSet),
        Some(top) if top.total_score > MATCH_THRESHOLD => Decision::Assigned(top),
        Some(top) => Decision::NoMatch(NoMatchReason::BelowThreshold { best: top }),
    };

    match &decision {
        Decision::Assigned(top) => tracing::debug!(
            assignee = %top.candidate.id,
            score = top.total_score,
            "Candidate selected"
        ),
        Decision::NoMatch(NoMatchReason::EmptyCandidateSet) => {
            tracing::debug!("No candidates to score")
        }
        Decision::NoMatch(NoMatchReason::BelowThreshold { best }) => tracing::debug!(
            best = %best.candidate.id,
            score = best.total_score,
            threshold = MATCH_THRESHOLD,
            "Best candidate below threshold"
        ),
    }

    decision
}

/// The best candidate for `issue`, or `None` when nobody clears the threshold
/// (including when `candidates` is empty).
pub fn select_assignee<'a>(
    issue: &IssueText,
    candidates: &'a [Candidate],
) -> Result<Option<&'a Candidate>, AssignError> {
    Ok(evaluate(issue, candidates)?.assignee())
}
