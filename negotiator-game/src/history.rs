//! Append-only records of what the player did.
use serde::{Deserialize, Serialize};

use crate::phase::Phase;

/// One scoring event, created exactly once and never altered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub action_label: String,
    pub points: u32,
    pub timestamp_display: String,
    pub phase: Phase,
}

/// Ordered history of scoring events. Entries can be appended, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    pub(crate) fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    #[must_use]
    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn total_points(&self) -> u32 {
        self.entries
            .iter()
            .fold(0, |total, entry| total.saturating_add(entry.points))
    }

    /// The `limit` most recent entries, oldest first.
    #[must_use]
    pub fn recent(&self, limit: usize) -> &[HistoryEntry] {
        let start = self.entries.len().saturating_sub(limit);
        &self.entries[start..]
    }
}

impl<'a> IntoIterator for &'a HistoryLog {
    type Item = &'a HistoryEntry;
    type IntoIter = std::slice::Iter<'a, HistoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Free-text decisions in the order they were made. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChoiceLog {
    choices: Vec<String>,
}

impl ChoiceLog {
    pub(crate) fn push(&mut self, choice: impl Into<String>) {
        self.choices.push(choice.into());
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.choices
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.choices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }
}

impl<'a> IntoIterator for &'a ChoiceLog {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.choices.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(label: &str, points: u32) -> HistoryEntry {
        HistoryEntry {
            action_label: label.to_string(),
            points,
            timestamp_display: "9:00:00 AM".to_string(),
            phase: Phase::Negotiation,
        }
    }

    #[test]
    fn recent_keeps_tail_in_order() {
        let mut log = HistoryLog::default();
        for i in 0..12 {
            log.push(entry(&format!("step {i}"), i));
        }
        let recent = log.recent(10);
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].action_label, "step 2");
        assert_eq!(recent[9].action_label, "step 11");
        assert_eq!(log.recent(50).len(), 12);
    }

    #[test]
    fn total_points_sums_entries() {
        let mut log = HistoryLog::default();
        assert!(log.is_empty());
        log.push(entry("a", 30));
        log.push(entry("b", 0));
        log.push(entry("c", 45));
        assert_eq!(log.total_points(), 75);
        assert_eq!(log.last().map(|e| e.action_label.as_str()), Some("c"));
    }

    #[test]
    fn total_points_saturates() {
        let mut log = HistoryLog::default();
        log.push(entry("a", u32::MAX - 5));
        log.push(entry("b", 10));
        assert_eq!(log.total_points(), u32::MAX);
    }

    #[test]
    fn logs_serialize_as_plain_arrays() {
        let mut choices = ChoiceLog::default();
        choices.push("Cultural adjustment: flexible");
        let json = serde_json::to_string(&choices).unwrap();
        assert_eq!(json, r#"["Cultural adjustment: flexible"]"#);
    }
}
