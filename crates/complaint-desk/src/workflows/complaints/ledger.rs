use std::fmt;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{AgentId, Complaint, ComplaintId, TransitionRecord, ValidationError};
use super::lifecycle::ComplaintStatus;

/// `YYYY-MM` partition key for monthly reporting, derived in UTC.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthKey(String);

impl MonthKey {
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self(format!("{:04}-{:02}", at.year(), at.month()))
    }

    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        let malformed = || ValidationError::MalformedMonth(trimmed.to_string());

        let (year, month) = trimmed.split_once('-').ok_or_else(malformed)?;
        let all_digits = |part: &str| part.bytes().all(|byte| byte.is_ascii_digit());
        if year.len() != 4 || month.len() != 2 || !all_digits(year) || !all_digits(month) {
            return Err(malformed());
        }
        let month_number: u8 = month.parse().map_err(|_| malformed())?;
        if !(1..=12).contains(&month_number) {
            return Err(malformed());
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable scoring fact written once, when a complaint reaches its terminal status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub agent_id: AgentId,
    pub complaint_id: ComplaintId,
    pub from_status: ComplaintStatus,
    pub to_status: ComplaintStatus,
    pub minutes_taken: u64,
    pub time_points: u8,
    pub note_points: u8,
    pub total_points: u8,
    pub note_word_count: u32,
    pub month_key: MonthKey,
    pub changed_at: DateTime<Utc>,
}

/// Turns the closing transition of a complaint into its ledger entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct LedgerWriter;

impl LedgerWriter {
    /// `None` unless `record` moves the complaint into the terminal status.
    pub fn entry_for(&self, complaint: &Complaint, record: &TransitionRecord) -> Option<LedgerEntry> {
        if !record.to.is_terminal() {
            return None;
        }

        Some(LedgerEntry {
            agent_id: record.acting_agent.clone(),
            complaint_id: complaint.id.clone(),
            from_status: record.from,
            to_status: record.to,
            minutes_taken: record.minutes_taken,
            time_points: record.time_points,
            note_points: record.note_points,
            total_points: record.total_points,
            note_word_count: record.note_word_count,
            month_key: MonthKey::from_datetime(record.changed_at),
            changed_at: record.changed_at,
        })
    }
}
