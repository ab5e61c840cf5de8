use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::types::ClassificationResult;

pub const HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub text: String,
    pub result: ClassificationResult,
    pub timestamp: DateTime<Utc>,
    #[serde(
        rename = "autoGenerated",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub auto_generated: Option<bool>,
}

impl HistoryEntry {
    pub fn new(text: impl Into<String>, result: ClassificationResult) -> Self {
        Self {
            text: text.into(),
            result,
            timestamp: Utc::now(),
            auto_generated: None,
        }
    }

    pub fn auto_generated(mut self) -> Self {
        self.auto_generated = Some(true);
        self
    }

    pub fn is_auto_generated(&self) -> bool {
        self.auto_generated.unwrap_or(false)
    }

    pub fn format_timestamp(&self, tz: &Tz) -> String {
        self.timestamp
            .with_timezone(tz)
            .format("%d/%m/%Y %H:%M:%S")
            .to_string()
    }
}

/// Newest-first log of classifications, never longer than [`HISTORY_LIMIT`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn from_entries(mut entries: Vec<HistoryEntry>) -> Self {
        entries.truncate(HISTORY_LIMIT);
        Self { entries }
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(HISTORY_LIMIT);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
