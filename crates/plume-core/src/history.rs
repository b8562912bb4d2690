//! In-memory history of results produced during one session.
//!
//! Entries hold text only; attachment bytes never outlive their request.
//! Nothing here survives a process restart.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{CritiqueResult, GenerationResult, Mode};

/// What a history entry recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "result", rename_all = "lowercase")]
pub enum HistoryOutcome {
    Generation(GenerationResult),
    Critique(CritiqueResult),
}

/// One successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    /// UUIDv7, so ids sort by creation time.
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub mode: Mode,
    /// Short human label: the critiqued title, or the generation key points.
    pub headline: String,
    pub outcome: HistoryOutcome,
}

impl HistoryEntry {
    pub fn new(headline: impl Into<String>, outcome: HistoryOutcome) -> Self {
        Self::with_id(Uuid::now_v7(), headline, outcome)
    }

    /// Entry keyed by an id issued elsewhere, e.g. a request correlation id.
    pub fn with_id(id: Uuid, headline: impl Into<String>, outcome: HistoryOutcome) -> Self {
        let mode = match outcome {
            HistoryOutcome::Generation(_) => Mode::Generate,
            HistoryOutcome::Critique(_) => Mode::Critique,
        };
        Self {
            id,
            created_at: Utc::now(),
            mode,
            headline: headline.into(),
            outcome,
        }
    }
}

/// Bounded, most-recent-first history.
#[derive(Debug)]
pub struct SessionHistory {
    capacity: usize,
    entries: Mutex<VecDeque<HistoryEntry>>,
}

impl SessionHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record an entry, evicting the oldest one when full.
    pub fn record(&self, entry: HistoryEntry) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.push_front(entry);
        entries.truncate(self.capacity);
    }

    /// Snapshot, newest first.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.iter().cloned().collect()
    }

    pub fn get(&self, id: Uuid) -> Option<HistoryEntry> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.iter().find(|e| e.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScoreBreakdown;

    fn critique(score: u32) -> HistoryOutcome {
        HistoryOutcome::Critique(CritiqueResult {
            score,
            breakdown: ScoreBreakdown::default(),
            problems: vec![],
            suggestions: vec![],
            rewritten_full_text: String::new(),
            hashtags: vec![],
        })
    }

    #[test]
    fn test_entry_mode_follows_outcome() {
        let entry = HistoryEntry::new("标题", critique(50));
        assert_eq!(entry.mode, Mode::Critique);
        assert_eq!(entry.id.get_version_num(), 7);
    }

    #[test]
    fn test_entry_with_issued_id() {
        let id = Uuid::now_v7();
        let entry = HistoryEntry::with_id(id, "标题", critique(60));
        assert_eq!(entry.id, id);
        assert_eq!(entry.mode, Mode::Critique);
    }

    #[test]
    fn test_history_newest_first_and_bounded() {
        let history = SessionHistory::new(2);
        history.record(HistoryEntry::new("one", critique(1)));
        history.record(HistoryEntry::new("two", critique(2)));
        history.record(HistoryEntry::new("three", critique(3)));

        let headlines: Vec<_> = history.entries().into_iter().map(|e| e.headline).collect();
        assert_eq!(headlines, vec!["three", "two"]);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_history_get_by_id() {
        let history = SessionHistory::new(5);
        let entry = HistoryEntry::new("find me", critique(9));
        let id = entry.id;
        history.record(entry);
        assert_eq!(history.get(id).unwrap().headline, "find me");
        assert!(history.get(Uuid::nil()).is_none());
    }

    #[test]
    fn test_zero_capacity_records_nothing() {
        let history = SessionHistory::new(0);
        history.record(HistoryEntry::new("x", critique(1)));
        assert!(history.is_empty());
    }

    #[test]
    fn test_clear() {
        let history = SessionHistory::new(3);
        history.record(HistoryEntry::new("x", critique(1)));
        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn test_entry_serialization_shape() {
        let entry = HistoryEntry::new("x", critique(42));
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["mode"], "critique");
        assert_eq!(json["outcome"]["kind"], "critique");
        assert_eq!(json["outcome"]["result"]["score"], 42);
    }
}
