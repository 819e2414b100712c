use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::lifecycle::ComplaintStatus;

const MAX_ID_LEN: usize = 64;

/// Field-level validation failures raised before any write happens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    MissingField { field: &'static str },
    #[error("{field} '{value}' is not a well-formed id (1-64 of A-Z, a-z, 0-9, '-', '_')")]
    MalformedId { field: &'static str, value: String },
    #[error("unknown status '{0}'; expected one of pending, processing, solved, informed")]
    UnknownStatus(String),
    #[error("month '{0}' must be formatted as YYYY-MM")]
    MalformedMonth(String),
    #[error("request body is invalid: {0}")]
    MalformedBody(String),
}

fn is_well_formed(raw: &str) -> bool {
    !raw.is_empty()
        && raw.len() <= MAX_ID_LEN
        && raw
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_')
}

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            /// Trims and checks the raw value against the shared id format.
            pub fn parse(raw: &str) -> Result<Self, ValidationError> {
                Self::parse_field(raw, $field)
            }

            /// Like `parse`, reporting failures against `field`.
            pub fn parse_field(raw: &str, field: &'static str) -> Result<Self, ValidationError> {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(ValidationError::MissingField { field });
                }
                if !is_well_formed(trimmed) {
                    return Err(ValidationError::MalformedId {
                        field,
                        value: trimmed.to_string(),
                    });
                }
                Ok(Self(trimmed.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

opaque_id!(
    /// Identifier wrapper for tracked complaints.
    ComplaintId,
    "complaint_id"
);
opaque_id!(
    /// Identifier of a support agent in the external user directory.
    AgentId,
    "agent_id"
);
opaque_id!(
    /// Reference into one of the external classification catalogs.
    CatalogRef,
    "classification_ref"
);

/// Unique, time-ordered invoice number handed out at intake.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InvoiceNumber(pub String);

impl InvoiceNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Classification references; opaque to this crate beyond their id format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRefs {
    pub problem: CatalogRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_problem: Option<CatalogRef>,
    pub department: CatalogRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_person: Option<CatalogRef>,
}

impl ClassificationRefs {
    /// Format check only; catalog existence is owned by the catalogs themselves.
    pub(crate) fn validate(&self) -> Result<Self, ValidationError> {
        let optional = |value: &Option<CatalogRef>, field: &'static str| {
            value
                .as_ref()
                .map(|reference| CatalogRef::parse_field(&reference.0, field))
                .transpose()
        };

        Ok(Self {
            problem: CatalogRef::parse_field(&self.problem.0, "classification.problem")?,
            sub_problem: optional(&self.sub_problem, "classification.sub_problem")?,
            department: CatalogRef::parse_field(&self.department.0, "classification.department")?,
            responsible_person: optional(
                &self.responsible_person,
                "classification.responsible_person",
            )?,
        })
    }
}

/// Intake payload accepted by `ComplaintService::create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintIntake {
    pub customer: CustomerInfo,
    pub classification: ClassificationRefs,
    pub description: String,
    pub created_by: String,
}

/// Timestamps recorded when the complaint enters each post-intake phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTimestamps {
    pub processing_at: Option<DateTime<Utc>>,
    pub solved_at: Option<DateTime<Utc>>,
    pub informed_at: Option<DateTime<Utc>>,
}

/// One accepted transition, with the points it earned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: ComplaintStatus,
    pub to: ComplaintStatus,
    pub changed_at: DateTime<Utc>,
    pub acting_agent: AgentId,
    pub minutes_taken: u64,
    pub time_points: u8,
    pub note_points: u8,
    pub total_points: u8,
    pub note_word_count: u32,
}

/// A tracked customer complaint.
///
/// Status, phase timestamps and history only change through [`Complaint::apply`],
/// which the service calls after the lifecycle has validated the move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complaint {
    pub id: ComplaintId,
    pub invoice_number: InvoiceNumber,
    pub customer: CustomerInfo,
    pub classification: ClassificationRefs,
    pub created_by: AgentId,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closing_note: Option<String>,
    status: ComplaintStatus,
    phases: PhaseTimestamps,
    status_changed_at: DateTime<Utc>,
    status_history: Vec<TransitionRecord>,
    pub created_at: DateTime<Utc>,
}

impl Complaint {
    pub(crate) fn intake(
        id: ComplaintId,
        invoice_number: InvoiceNumber,
        customer: CustomerInfo,
        classification: ClassificationRefs,
        created_by: AgentId,
        description: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            invoice_number,
            customer,
            classification,
            created_by,
            description,
            closing_note: None,
            status: ComplaintStatus::Pending,
            phases: PhaseTimestamps::default(),
            status_changed_at: created_at,
            status_history: Vec::new(),
            created_at,
        }
    }

    pub fn status(&self) -> ComplaintStatus {
        self.status
    }

    pub fn phases(&self) -> &PhaseTimestamps {
        &self.phases
    }

    pub fn status_changed_at(&self) -> DateTime<Utc> {
        self.status_changed_at
    }

    pub fn history(&self) -> &[TransitionRecord] {
        &self.status_history
    }

    /// When the complaint entered its current status.
    pub fn current_phase_started_at(&self) -> DateTime<Utc> {
        let stamp = match self.status {
            ComplaintStatus::Pending => None,
            ComplaintStatus::Processing => self.phases.processing_at,
            ComplaintStatus::Solved => self.phases.solved_at,
            ComplaintStatus::Informed => self.phases.informed_at,
        };
        stamp.unwrap_or(self.created_at)
    }

    pub(crate) fn apply(&mut self, record: TransitionRecord, closing_note: Option<String>) {
        let at = record.changed_at;
        match record.to {
            ComplaintStatus::Pending => {}
            ComplaintStatus::Processing => self.phases.processing_at = Some(at),
            ComplaintStatus::Solved => self.phases.solved_at = Some(at),
            ComplaintStatus::Informed => self.phases.informed_at = Some(at),
        }
        if closing_note.is_some() {
            self.closing_note = closing_note;
        }
        self.status = record.to;
        self.status_changed_at = at;
        self.status_history.push(record);
    }
}

/// Directory role of a support user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    Agent,
    Supervisor,
    Admin,
}

impl AgentRole {
    pub const fn label(self) -> &'static str {
        match self {
            AgentRole::Agent => "agent",
            AgentRole::Supervisor => "supervisor",
            AgentRole::Admin => "admin",
        }
    }

    /// Roles that appear on the leaderboard.
    pub const fn on_roster(self) -> bool {
        matches!(self, AgentRole::Agent | AgentRole::Supervisor)
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "agent" => Some(Self::Agent),
            "supervisor" => Some(Self::Supervisor),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// Directory entry as resolved from the external user store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub phone: String,
    pub role: AgentRole,
}

/// Number of whitespace-separated words in a note.
pub fn word_count(note: &str) -> u32 {
    note.split_whitespace().count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_trimmed_and_checked() {
        assert_eq!(
            AgentId::parse("  agent-7 ").expect("valid id").as_str(),
            "agent-7"
        );
        assert_eq!(
            AgentId::parse("   "),
            Err(ValidationError::MissingField { field: "agent_id" })
        );
        assert!(matches!(
            ComplaintId::parse("cmp 1"),
            Err(ValidationError::MalformedId {
                field: "complaint_id",
                ..
            })
        ));
        assert!(ComplaintId::parse(&"x".repeat(65)).is_err());
    }

    #[test]
    fn word_count_ignores_repeated_whitespace() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("  called\tthe \n customer  "), 3);
    }
}
