//! Complaint intake, status lifecycle, closure scoring and the agent point ledger.
//!
//! Status changes flow through [`ComplaintService::transition`], which validates against the
//! lifecycle table, scores the move and, on closure, writes exactly one ledger entry crediting
//! the acting agent. Reporting reads the ledger through [`Leaderboard`].

pub mod clock;
pub mod domain;
pub mod invoice;
pub mod leaderboard;
pub mod ledger;
pub mod lifecycle;
pub mod memory;
pub mod repository;
pub mod roster;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use clock::{Clock, ManualClock, SystemClock};
pub use domain::{
    Agent, AgentId, AgentRole, CatalogRef, ClassificationRefs, Complaint, ComplaintId,
    ComplaintIntake, CustomerInfo, InvoiceNumber, PhaseTimestamps, TransitionRecord,
    ValidationError,
};
pub use invoice::{InvoiceError, InvoiceSequencer, DEFAULT_INVOICE_PREFIX};
pub use leaderboard::{
    AgentAllTimeSummary, AgentMonthlySummary, Leaderboard, RosterEntry, RosterSummary,
};
pub use ledger::{LedgerEntry, LedgerWriter, MonthKey};
pub use lifecycle::{ComplaintStatus, Transition, TransitionRejection};
pub use memory::{InMemoryAgentDirectory, InMemoryComplaintStore};
pub use repository::{
    AgentDirectory, ComplaintRepository, LedgerQuery, PointLedger, RepositoryError,
};
pub use roster::{write_roster_csv, AgentRosterImporter, RosterImportError};
pub use router::{complaint_router, leaderboard_router, TransitionRequest};
pub use scoring::{note_score, score_transition, time_score, PointsSummary};
pub use service::{
    ComplaintService, ComplaintServiceError, TransitionOutcome, MIN_CLOSING_NOTE_WORDS,
};
