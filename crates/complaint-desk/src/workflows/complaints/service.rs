use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::clock::{Clock, SystemClock};
use super::domain::{
    word_count, AgentId, Complaint, ComplaintId, ComplaintIntake, InvoiceNumber,
    TransitionRecord, ValidationError,
};
use super::invoice::{InvoiceError, InvoiceSequencer};
use super::ledger::LedgerWriter;
use super::lifecycle::{validate_transition, ComplaintStatus, TransitionRejection};
use super::repository::{AgentDirectory, ComplaintRepository, RepositoryError};
use super::scoring::{elapsed_minutes, score_transition, PointsSummary};

/// Minimum number of words in the note that closes a complaint.
pub const MIN_CLOSING_NOTE_WORDS: u32 = 3;

static COMPLAINT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_complaint_id() -> ComplaintId {
    let id = COMPLAINT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ComplaintId(format!("cmp-{id:06}"))
}

/// Service composing the invoice sequencer, lifecycle, scoring and ledger writer.
pub struct ComplaintService<R, D> {
    repository: Arc<R>,
    directory: Arc<D>,
    clock: Arc<dyn Clock>,
    sequencer: InvoiceSequencer,
    ledger_writer: LedgerWriter,
}

/// Result of an accepted transition.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionOutcome {
    pub complaint: Complaint,
    /// Present only when the transition closed the complaint and credited the ledger.
    pub points: Option<PointsSummary>,
}

impl<R, D> ComplaintService<R, D>
where
    R: ComplaintRepository + 'static,
    D: AgentDirectory + 'static,
{
    pub fn new(repository: Arc<R>, directory: Arc<D>, sequencer: InvoiceSequencer) -> Self {
        Self::with_clock(repository, directory, sequencer, Arc::new(SystemClock))
    }

    pub fn with_clock(
        repository: Arc<R>,
        directory: Arc<D>,
        sequencer: InvoiceSequencer,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            directory,
            clock,
            sequencer,
            ledger_writer: LedgerWriter,
        }
    }

    /// Record a new complaint in `Pending` with a fresh invoice number.
    pub fn create(&self, intake: ComplaintIntake) -> Result<Complaint, ComplaintServiceError> {
        let ComplaintIntake {
            mut customer,
            classification,
            description,
            created_by,
        } = intake;

        customer.name = required_text(&customer.name, "customer.name")?;
        customer.phone = required_text(&customer.phone, "customer.phone")?;
        let classification = classification.validate()?;
        let description = required_text(&description, "description")?;
        let creator = AgentId::parse_field(&created_by, "created_by")?;
        self.require_agent(&creator)?;

        let now = self.clock.now();
        let bucket = self.sequencer.bucket_key(now);
        let latest = self.repository.latest_invoice(&bucket)?;
        let invoice = self.sequencer.next(now, latest.as_ref())?;

        let complaint = Complaint::intake(
            next_complaint_id(),
            invoice.clone(),
            customer,
            classification,
            creator,
            description,
            now,
        );

        let complaint_id = complaint.id.clone();
        let stored = self.repository.insert(complaint).map_err(|err| match err {
            RepositoryError::InvoiceTaken => {
                warn!(%invoice, "invoice allocated concurrently");
                ComplaintServiceError::DuplicateInvoice { invoice }
            }
            RepositoryError::Conflict => ComplaintServiceError::Internal(format!(
                "complaint id {complaint_id} is already stored"
            )),
            other => other.into(),
        })?;

        info!(
            complaint_id = %stored.id,
            invoice = %stored.invoice_number,
            created_by = %stored.created_by,
            "complaint registered"
        );
        Ok(stored)
    }

    /// Fetch a complaint for API responses.
    pub fn get(&self, complaint_id: &str) -> Result<Complaint, ComplaintServiceError> {
        let id = ComplaintId::parse(complaint_id)?;
        self.load(&id)
    }

    /// Advance a complaint to `target_status`.
    ///
    /// Checks run in order: status literal, acting agent, complaint lookup, adjacency,
    /// closing note length. Nothing is written unless all of them pass.
    pub fn transition(
        &self,
        complaint_id: &str,
        target_status: &str,
        note: Option<&str>,
        acting_agent_id: Option<&str>,
    ) -> Result<TransitionOutcome, ComplaintServiceError> {
        let target = ComplaintStatus::parse(target_status)?;

        let acting_agent = acting_agent_id.ok_or(ValidationError::MissingField {
            field: "acting_agent_id",
        })?;
        let acting_agent = AgentId::parse_field(acting_agent, "acting_agent_id")?;
        self.require_agent(&acting_agent)?;

        let id = ComplaintId::parse(complaint_id)?;
        let complaint = self.load(&id)?;

        let transition = validate_transition(complaint.status(), target)?;

        let note = note.map(str::trim).filter(|note| !note.is_empty());
        if transition.is_terminal() {
            let actual = note.map(word_count).unwrap_or(0);
            if actual < MIN_CLOSING_NOTE_WORDS {
                return Err(ComplaintServiceError::NoteTooShort {
                    required: MIN_CLOSING_NOTE_WORDS,
                    actual,
                });
            }
        }

        let now = self.clock.now();
        let minutes = elapsed_minutes(complaint.current_phase_started_at(), now);
        let points = score_transition(transition, minutes, note);
        let record = TransitionRecord {
            from: transition.from,
            to: transition.to,
            changed_at: now,
            acting_agent: acting_agent.clone(),
            minutes_taken: points.minutes_taken,
            time_points: points.time_points,
            note_points: points.note_points,
            total_points: points.total_points,
            note_word_count: points.note_word_count,
        };

        let mut updated = complaint;
        let closing_note = note
            .filter(|_| transition.is_terminal())
            .map(str::to_string);
        let ledger_entry = self.ledger_writer.entry_for(&updated, &record);
        updated.apply(record, closing_note);

        let credited = ledger_entry.is_some();
        self.repository
            .commit_transition(&updated, transition.from, ledger_entry)
            .map_err(|err| self.commit_failure(&id, target, err))?;

        info!(
            complaint_id = %updated.id,
            %transition,
            agent = %acting_agent,
            minutes,
            total_points = points.total_points,
            credited,
            "complaint status advanced"
        );

        Ok(TransitionOutcome {
            complaint: updated,
            points: credited.then_some(points),
        })
    }

    fn load(&self, id: &ComplaintId) -> Result<Complaint, ComplaintServiceError> {
        self.repository
            .fetch(id)?
            .ok_or_else(|| ComplaintServiceError::not_found("complaint", id.as_str()))
    }

    fn require_agent(&self, id: &AgentId) -> Result<(), ComplaintServiceError> {
        match self.directory.find(id)? {
            Some(_) => Ok(()),
            None => Err(ComplaintServiceError::not_found("agent", id.as_str())),
        }
    }

    /// The loser of a concurrent transition sees the rejection the winner's status implies.
    fn commit_failure(
        &self,
        id: &ComplaintId,
        target: ComplaintStatus,
        err: RepositoryError,
    ) -> ComplaintServiceError {
        match err {
            RepositoryError::StaleStatus { current } => {
                warn!(complaint_id = %id, %current, %target, "transition lost a race");
                match validate_transition(current, target) {
                    Err(rejection) => rejection.into(),
                    Ok(_) => ComplaintServiceError::Internal(format!(
                        "complaint {id} changed concurrently; resubmit the request"
                    )),
                }
            }
            RepositoryError::Conflict => TransitionRejection::Terminal {
                current: ComplaintStatus::Informed,
            }
            .into(),
            RepositoryError::NotFound => ComplaintServiceError::not_found("complaint", id.as_str()),
            other => other.into(),
        }
    }
}

fn required_text(raw: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField { field });
    }
    Ok(trimmed.to_string())
}

/// Error raised by the complaint and leaderboard services.
#[derive(Debug, thiserror::Error)]
pub enum ComplaintServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },
    #[error("illegal transition: {0}")]
    IllegalTransition(#[from] TransitionRejection),
    #[error("closing note must contain at least {required} words, found {actual}")]
    NoteTooShort { required: u32, actual: u32 },
    #[error("invoice {invoice} was issued concurrently; resubmit the complaint")]
    DuplicateInvoice { invoice: InvoiceNumber },
    #[error("internal error: {0}")]
    Internal(String),
}

impl ComplaintServiceError {
    pub(crate) fn not_found(entity: &'static str, id: &str) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Stable machine-readable error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound { .. } => "not_found",
            Self::IllegalTransition(_) => "illegal_transition",
            Self::NoteTooShort { .. } => "note_too_short",
            Self::DuplicateInvoice { .. } => "duplicate_invoice",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl From<RepositoryError> for ComplaintServiceError {
    fn from(value: RepositoryError) -> Self {
        Self::Internal(value.to_string())
    }
}

impl From<InvoiceError> for ComplaintServiceError {
    fn from(value: InvoiceError) -> Self {
        Self::Internal(value.to_string())
    }
}
