use super::domain::{Agent, AgentId, Complaint, ComplaintId, InvoiceNumber};
use super::ledger::{LedgerEntry, MonthKey};
use super::lifecycle::ComplaintStatus;

/// Storage abstraction for complaints so the service can be exercised in isolation.
pub trait ComplaintRepository: Send + Sync {
    /// Inserts a new complaint. An invoice number already in use is
    /// [`RepositoryError::InvoiceTaken`]; an id already in use is [`RepositoryError::Conflict`].
    fn insert(&self, complaint: Complaint) -> Result<Complaint, RepositoryError>;

    fn fetch(&self, id: &ComplaintId) -> Result<Option<Complaint>, RepositoryError>;

    /// Lexicographically greatest invoice number starting with `bucket_key`.
    fn latest_invoice(&self, bucket_key: &str) -> Result<Option<InvoiceNumber>, RepositoryError>;

    /// Stores the transitioned complaint, conditional on the stored status still being
    /// `expected`, together with its ledger entry when the transition closed it.
    ///
    /// Returns [`RepositoryError::StaleStatus`] if another transition committed first and
    /// [`RepositoryError::Conflict`] if the complaint already has a ledger entry. Nothing is
    /// written on error.
    fn commit_transition(
        &self,
        complaint: &Complaint,
        expected: ComplaintStatus,
        ledger: Option<LedgerEntry>,
    ) -> Result<(), RepositoryError>;
}

/// Read side of the append-only point ledger.
pub trait PointLedger: Send + Sync {
    fn entries(&self, query: &LedgerQuery) -> Result<Vec<LedgerEntry>, RepositoryError>;
}

/// External user directory.
pub trait AgentDirectory: Send + Sync {
    fn find(&self, id: &AgentId) -> Result<Option<Agent>, RepositoryError>;
    fn roster(&self) -> Result<Vec<Agent>, RepositoryError>;
}

/// Ledger filter; `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerQuery {
    pub agent_id: Option<AgentId>,
    pub month: Option<MonthKey>,
}

impl LedgerQuery {
    pub fn for_agent(agent_id: AgentId) -> Self {
        Self {
            agent_id: Some(agent_id),
            month: None,
        }
    }

    pub fn for_month(month: MonthKey) -> Self {
        Self {
            agent_id: None,
            month: Some(month),
        }
    }

    pub fn in_month(mut self, month: MonthKey) -> Self {
        self.month = Some(month);
        self
    }

    pub fn matches(&self, entry: &LedgerEntry) -> bool {
        self.agent_id
            .as_ref()
            .map_or(true, |agent_id| &entry.agent_id == agent_id)
            && self
                .month
                .as_ref()
                .map_or(true, |month| &entry.month_key == month)
    }
}

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("invoice number already issued")]
    InvoiceTaken,
    #[error("record not found")]
    NotFound,
    #[error("status changed concurrently; stored status is now {current}")]
    StaleStatus { current: ComplaintStatus },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
