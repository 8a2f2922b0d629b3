use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome tag attached to each audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogStatus {
    Processing,
    Success,
    Error,
}

impl LogStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub agent: String,
    pub message: String,
    pub status: LogStatus,
    pub timestamp: DateTime<Utc>,
}

/// Append-only audit trail. Ids increase monotonically from 1.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: Vec<LogEntry>,
    next_id: u64,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(
        &mut self,
        agent: impl Into<String>,
        message: impl Into<String>,
        status: LogStatus,
    ) -> &LogEntry {
        self.next_id += 1;
        self.entries.push(LogEntry {
            id: self.next_id,
            agent: agent.into(),
            message: message.into(),
            status,
            timestamp: Utc::now(),
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insertion order, oldest first.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn newest_first(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().rev()
    }

    pub fn query(&self, filter: &LogFilter) -> Vec<LogEntry> {
        self.newest_first()
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> LogStats {
        LogStats::from_entries(&self.entries)
    }

    /// Empty log whose ids continue where this one stops. Merge it back with
    /// [`EventLog::absorb`] before anything else appends here.
    pub fn staging(&self) -> EventLog {
        EventLog {
            entries: Vec::new(),
            next_id: self.next_id,
        }
    }

    /// Appends the entries of a staging log, keeping their ids.
    pub fn absorb(&mut self, staged: EventLog) {
        self.next_id = self.next_id.max(staged.next_id);
        self.entries.extend(staged.entries);
    }

    /// Drops the oldest entries beyond `limit`. Id assignment is unaffected.
    pub fn retain_latest(&mut self, limit: usize) {
        if self.entries.len() > limit {
            let excess = self.entries.len() - limit;
            self.entries.drain(..excess);
        }
    }
}

/// Dashboard-style search over audit entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub agent: Option<String>,
    #[serde(default)]
    pub status: Option<LogStatus>,
}

impl LogFilter {
    pub fn matches(&self, entry: &LogEntry) -> bool {
        let agent = entry.agent.to_lowercase();

        if let Some(search) = non_blank(&self.search) {
            if !entry.message.to_lowercase().contains(&search) && !agent.contains(&search) {
                return false;
            }
        }

        if let Some(wanted) = non_blank(&self.agent) {
            if !agent.contains(&wanted) {
                return false;
            }
        }

        self.status.map_or(true, |status| status == entry.status)
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_lowercase)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogStats {
    pub total: usize,
    pub successful: usize,
    pub errors: usize,
    pub agents: usize,
}

impl LogStats {
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a LogEntry>) -> Self {
        let mut stats = Self::default();
        let mut agents = BTreeSet::new();
        for entry in entries {
            stats.total += 1;
            match entry.status {
                LogStatus::Success => stats.successful += 1,
                LogStatus::Error => stats.errors += 1,
                LogStatus::Processing => {}
            }
            agents.insert(entry.agent.as_str());
        }
        stats.agents = agents.len();
        stats
    }
}
