use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::data_dir;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentEvent {
    pub timestamp: String,
    pub issue_number: u64,
    pub issue_title: String,
    /// "assigned" or "no_match"
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AssignmentEvent {
    pub fn new(issue_number: u64, issue_title: &str, event: &str) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            issue_number,
            issue_title: issue_title.to_string(),
            event: event.to_string(),
            assignee: None,
            score: None,
            message: None,
        }
    }
}

/// Append-only JSONL record of auto-assignment decisions.
#[derive(Debug, Clone)]
pub struct AssignmentLog {
    path: PathBuf,
}

impl Default for AssignmentLog {
    fn default() -> Self {
        Self::at(data_dir().join("assignments.jsonl"))
    }
}

impl AssignmentLog {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, event: &AssignmentEvent) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let line = serde_json::to_string(event)?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    /// Most recent `limit` events, oldest first. Unparseable lines are skipped.
    pub fn read(&self, limit: Option<usize>) -> Vec<AssignmentEvent> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(_) => return Vec::new(),
        };

        let mut events: Vec<AssignmentEvent> = contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect();

        if let Some(limit) = limit {
            let len = events.len();
            if len > limit {
                events = events.split_off(len - limit);
            }
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_log_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = AssignmentLog::at(dir.path().join("assignments.jsonl"));
        assert!(log.read(None).is_empty());
    }

    #[test]
    fn append_and_read_with_limit() {
        let dir = tempfile::tempdir().unwrap();
        let log = AssignmentLog::at(dir.path().join("logs").join("assignments.jsonl"));

        for n in 1..=3 {
            let mut event = AssignmentEvent::new(n, &format!("Issue {n}"), "assigned");
            event.assignee = Some("jane".into());
            log.append(&event).unwrap();
        }

        let all = log.read(None);
        assert_eq!(all.len(), 3);

        let last_two = log.read(Some(2));
        let numbers: Vec<u64> = last_two.iter().map(|e| e.issue_number).collect();
        assert_eq!(numbers, vec![2, 3]);
    }

    #[test]
    fn garbage_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assignments.jsonl");
        let log = AssignmentLog::at(&path);
        log.append(&AssignmentEvent::new(1, "First", "no_match")).unwrap();
        let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "not json").unwrap();

        let events = log.read(None);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "no_match");
        assert!(!std::fs::read_to_string(&path).unwrap().contains("\"assignee\""));
    }
}
