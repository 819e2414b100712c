//! Complaint status lifecycle.
//!
//! Complaints move strictly forward through `Pending -> Processing -> Solved -> Informed`.
//! The adjacency lives in [`FORWARD_TRANSITIONS`]; everything else asks [`validate_transition`].

use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::ValidationError;

/// High level status tracked throughout the complaint workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    Pending,
    Processing,
    Solved,
    Informed,
}

/// Single legal successor for every status; `None` marks the terminal status.
pub const FORWARD_TRANSITIONS: [(ComplaintStatus, Option<ComplaintStatus>); 4] = [
    (ComplaintStatus::Pending, Some(ComplaintStatus::Processing)),
    (ComplaintStatus::Processing, Some(ComplaintStatus::Solved)),
    (ComplaintStatus::Solved, Some(ComplaintStatus::Informed)),
    (ComplaintStatus::Informed, None),
];

impl ComplaintStatus {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Pending,
            Self::Processing,
            Self::Solved,
            Self::Informed,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "pending",
            ComplaintStatus::Processing => "processing",
            ComplaintStatus::Solved => "solved",
            ComplaintStatus::Informed => "informed",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let normalized = raw.trim().to_ascii_lowercase();
        Self::ordered()
            .into_iter()
            .find(|status| status.label() == normalized)
            .ok_or_else(|| ValidationError::UnknownStatus(raw.trim().to_string()))
    }

    /// The one status this status may advance to.
    pub fn next(self) -> Option<Self> {
        FORWARD_TRANSITIONS
            .iter()
            .find(|(from, _)| *from == self)
            .and_then(|(_, next)| *next)
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A move between two adjacent statuses; keys the time-score tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transition {
    pub from: ComplaintStatus,
    pub to: ComplaintStatus,
}

impl Transition {
    pub const fn new(from: ComplaintStatus, to: ComplaintStatus) -> Self {
        Self { from, to }
    }

    pub fn is_terminal(self) -> bool {
        self.to.is_terminal()
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.from, self.to)
    }
}

/// Rejection carrying the precondition the caller needs to self-correct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionRejection {
    #[error("status is terminal: current {current}, no further transitions allowed")]
    Terminal { current: ComplaintStatus },
    #[error("target status must be {allowed_next}, current {current} (requested {requested})")]
    OutOfSequence {
        current: ComplaintStatus,
        allowed_next: ComplaintStatus,
        requested: ComplaintStatus,
    },
}

impl TransitionRejection {
    pub fn current(&self) -> ComplaintStatus {
        match self {
            TransitionRejection::Terminal { current }
            | TransitionRejection::OutOfSequence { current, .. } => *current,
        }
    }

    pub fn allowed_next(&self) -> Option<ComplaintStatus> {
        match self {
            TransitionRejection::Terminal { .. } => None,
            TransitionRejection::OutOfSequence { allowed_next, .. } => Some(*allowed_next),
        }
    }
}

/// Checks `current -> requested` against the adjacency table.
pub fn validate_transition(
    current: ComplaintStatus,
    requested: ComplaintStatus,
) -> Result<Transition, TransitionRejection> {
    match current.next() {
        None => Err(TransitionRejection::Terminal { current }),
        Some(allowed_next) if allowed_next != requested => {
            Err(TransitionRejection::OutOfSequence {
                current,
                allowed_next,
                requested,
            })
        }
        Some(next) => Ok(Transition::new(current, next)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_known_literals_case_insensitively() {
        assert_eq!(
            ComplaintStatus::parse(" Processing "),
            Ok(ComplaintStatus::Processing)
        );
        assert_eq!(
            ComplaintStatus::parse("closed"),
            Err(ValidationError::UnknownStatus("closed".to_string()))
        );
    }

    #[test]
    fn every_status_except_informed_has_one_successor() {
        let successors: Vec<_> = ComplaintStatus::ordered()
            .into_iter()
            .map(ComplaintStatus::next)
            .collect();
        assert_eq!(
            successors,
            vec![
                Some(ComplaintStatus::Processing),
                Some(ComplaintStatus::Solved),
                Some(ComplaintStatus::Informed),
                None,
            ]
        );
    }
}
