use std::sync::Arc;

use workboard::model::candidate::{Candidate, CandidateRecord};
use workboard::model::issue::IssueTextRecord;
use workboard::{evaluate, rank_candidates, select_assignee, AssignError, Decision, IssueText};

fn team() -> Vec<Candidate> {
    vec![
        Candidate::new("johndoe", &["frontend", "react", "mobile"], 75.0),
        Candidate::new("janedoe", &["backend", "security", "api"], 50.0),
        Candidate::new("alexsmith", &["frontend", "ui", "design"], 25.0),
        Candidate::new("sarahjones", &["backend", "database", "performance"], 40.0),
    ]
}

#[test]
fn database_issue_goes_to_database_specialist() {
    let issue = IssueText::new(
        "Optimize database queries",
        "The database queries are slow and need optimization.",
    );
    let team = team();
    let chosen = select_assignee(&issue, &team).unwrap().unwrap();
    // database: 0.7 * 25 + 0.3 * 60 = 35.5
    assert_eq!(chosen.id, "sarahjones");
}

#[test]
fn dark_mode_goes_to_ui_designer() {
    let issue = IssueText::new("Add dark mode support", "Implement dark mode theme for the UI.");
    let team = team();
    let ranked = rank_candidates(&issue, &team).unwrap();
    assert_eq!(ranked[0].candidate.id, "alexsmith");
    assert_eq!(ranked[0].matched_skills, vec!["ui"]);
}

#[test]
fn authentication_issue_has_no_qualified_assignee() {
    let issue = IssueText::new(
        "Implement user authentication",
        "Add user login and registration functionality.",
    );
    let candidates = vec![
        Candidate::new("a", &["frontend", "react"], 75.0),
        Candidate::new("b", &["backend", "api"], 50.0),
    ];
    match evaluate(&issue, &candidates).unwrap() {
        Decision::NoMatch(_) => {}
        other => panic!("expected no match, got {other:?}"),
    }
}

#[test]
fn records_from_json_are_validated() {
    let issue: IssueTextRecord =
        serde_json::from_str(r#"{"title": "Security audit", "description": ""}"#).unwrap();
    let issue = IssueText::try_from(issue).unwrap();

    let records: Vec<CandidateRecord> = serde_json::from_str(
        r#"[{"id": "c", "skills": ["security", "api"], "workload": 50},
            {"id": "d", "skills": ["docs"]}]"#,
    )
    .unwrap();
    let result: Result<Vec<Candidate>, AssignError> =
        records.into_iter().map(Candidate::try_from).collect();
    assert!(matches!(result, Err(AssignError::InvalidInput { .. })));

    let good = vec![Candidate::new("c", &["security", "api"], 50.0)];
    assert_eq!(select_assignee(&issue, &good).unwrap().map(|c| c.id.as_str()), Some("c"));
}

#[test]
fn scoring_is_safe_from_many_threads() {
    let team = Arc::new(team());
    let issue = Arc::new(IssueText::new("Mobile layout", "React navigation drawer"));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let team = Arc::clone(&team);
            let issue = Arc::clone(&issue);
            std::thread::spawn(move || {
                select_assignee(&issue, &team)
                    .unwrap()
                    .map(|c| c.id.clone())
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().as_deref(), Some("johndoe"));
    }
}
