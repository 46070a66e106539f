use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::AssignError;

/// A person eligible to take an issue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub id: String,
    pub skills: Vec<String>,
    /// Percentage utilisation, nominally 0..=100. Not clamped.
    pub workload: f64,
}

impl Candidate {
    pub fn new(id: impl Into<String>, skills: &[&str], workload: f64) -> Self {
        Self {
            id: id.into(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            workload,
        }
    }

    pub fn validate(&self) -> Result<(), AssignError> {
        if !self.workload.is_finite() {
            return Err(AssignError::invalid(
                format!("candidate[{}].workload", self.id),
                "must be a finite number",
            ));
        }
        Ok(())
    }
}

/// Checks every candidate and rejects duplicate ids.
pub fn validate_candidates(candidates: &[Candidate]) -> Result<(), AssignError> {
    let mut seen = HashSet::new();
    for candidate in candidates {
        candidate.validate()?;
        if !seen.insert(candidate.id.as_str()) {
            return Err(AssignError::invalid(
                "candidate.id",
                format!("duplicate id {:?}", candidate.id),
            ));
        }
    }
    Ok(())
}

/// Loosely-typed candidate as read from JSON or TOML. Missing fields are
/// reported as `InvalidInput` instead of being defaulted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateRecord {
    pub id: Option<String>,
    pub skills: Option<Vec<String>>,
    pub workload: Option<f64>,
}

impl TryFrom<CandidateRecord> for Candidate {
    type Error = AssignError;

    fn try_from(record: CandidateRecord) -> Result<Self, Self::Error> {
        let id = record
            .id
            .ok_or_else(|| AssignError::invalid("candidate.id", "missing"))?;
        let skills = record
            .skills
            .ok_or_else(|| AssignError::invalid(format!("candidate[{id}].skills"), "missing"))?;
        let workload = record
            .workload
            .ok_or_else(|| AssignError::invalid(format!("candidate[{id}].workload"), "missing"))?;

        let candidate = Candidate {
            id,
            skills,
            workload,
        };
        candidate.validate()?;
        Ok(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_with_all_fields_converts() {
        let record: CandidateRecord =
            serde_json::from_str(r#"{"id":"janedoe","skills":["api"],"workload":50}"#).unwrap();
        let candidate = Candidate::try_from(record).unwrap();
        assert_eq!(candidate.id, "janedoe");
        assert_eq!(candidate.skills, vec!["api"]);
        assert_eq!(candidate.workload, 50.0);
    }

    #[test]
    fn record_missing_workload_is_invalid() {
        let record: CandidateRecord =
            serde_json::from_str(r#"{"id":"janedoe","skills":["api"]}"#).unwrap();
        let err = Candidate::try_from(record).unwrap_err();
        assert!(matches!(err, AssignError::InvalidInput { ref field, .. } if field.contains("workload")));
    }

    #[test]
    fn record_missing_id_is_invalid() {
        let err = Candidate::try_from(CandidateRecord::default()).unwrap_err();
        assert_eq!(err, AssignError::invalid("candidate.id", "missing"));
    }

    #[test]
    fn out_of_range_workload_is_accepted() {
        assert!(Candidate::new("a", &[], 140.0).validate().is_ok());
        assert!(Candidate::new("a", &[], -20.0).validate().is_ok());
    }

    #[test]
    fn nan_workload_is_rejected() {
        assert!(Candidate::new("a", &[], f64::NAN).validate().is_err());
    }

    #[test]
    fn blank_id_and_skill_are_accepted() {
        assert!(Candidate::new("", &["api"], 10.0).validate().is_ok());
        assert!(Candidate::new("a", &["api", ""], 10.0).validate().is_ok());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let candidates = vec![
            Candidate::new("a", &[], 10.0),
            Candidate::new("a", &[], 20.0),
        ];
        let err = validate_candidates(&candidates).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }
}
