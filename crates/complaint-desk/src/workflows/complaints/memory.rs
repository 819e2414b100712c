//! Mutex-backed stores used by the service binary, the CLI demo and tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{Agent, AgentId, Complaint, ComplaintId, InvoiceNumber};
use super::ledger::LedgerEntry;
use super::lifecycle::ComplaintStatus;
use super::repository::{
    AgentDirectory, ComplaintRepository, LedgerQuery, PointLedger, RepositoryError,
};

#[derive(Debug, Default)]
struct StoreState {
    complaints: HashMap<ComplaintId, Complaint>,
    invoices: BTreeMap<InvoiceNumber, ComplaintId>,
    ledger: Vec<LedgerEntry>,
    credited: HashSet<ComplaintId>,
}

/// Complaint table, invoice index and point ledger behind one lock, so a closing
/// transition and its ledger row land together.
#[derive(Debug, Default, Clone)]
pub struct InMemoryComplaintStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryComplaintStore {
    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("complaint store mutex poisoned".to_string()))
    }

    pub fn complaint_count(&self) -> usize {
        self.lock().map(|state| state.complaints.len()).unwrap_or(0)
    }

    pub fn ledger_len(&self) -> usize {
        self.lock().map(|state| state.ledger.len()).unwrap_or(0)
    }
}

impl ComplaintRepository for InMemoryComplaintStore {
    fn insert(&self, complaint: Complaint) -> Result<Complaint, RepositoryError> {
        let mut state = self.lock()?;
        if state.invoices.contains_key(&complaint.invoice_number) {
            return Err(RepositoryError::InvoiceTaken);
        }
        if state.complaints.contains_key(&complaint.id) {
            return Err(RepositoryError::Conflict);
        }
        state
            .invoices
            .insert(complaint.invoice_number.clone(), complaint.id.clone());
        state
            .complaints
            .insert(complaint.id.clone(), complaint.clone());
        Ok(complaint)
    }

    fn fetch(&self, id: &ComplaintId) -> Result<Option<Complaint>, RepositoryError> {
        Ok(self.lock()?.complaints.get(id).cloned())
    }

    fn latest_invoice(&self, bucket_key: &str) -> Result<Option<InvoiceNumber>, RepositoryError> {
        let state = self.lock()?;
        let lower = InvoiceNumber(bucket_key.to_string());
        Ok(state
            .invoices
            .range(lower..)
            .take_while(|(invoice, _)| invoice.as_str().starts_with(bucket_key))
            .last()
            .map(|(invoice, _)| invoice.clone()))
    }

    fn commit_transition(
        &self,
        complaint: &Complaint,
        expected: ComplaintStatus,
        ledger: Option<LedgerEntry>,
    ) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        let stored = state
            .complaints
            .get(&complaint.id)
            .ok_or(RepositoryError::NotFound)?;
        if stored.status() != expected {
            return Err(RepositoryError::StaleStatus {
                current: stored.status(),
            });
        }
        if let Some(entry) = &ledger {
            if state.credited.contains(&entry.complaint_id) {
                return Err(RepositoryError::Conflict);
            }
        }

        state
            .complaints
            .insert(complaint.id.clone(), complaint.clone());
        if let Some(entry) = ledger {
            state.credited.insert(entry.complaint_id.clone());
            state.ledger.push(entry);
        }
        Ok(())
    }
}

impl PointLedger for InMemoryComplaintStore {
    fn entries(&self, query: &LedgerQuery) -> Result<Vec<LedgerEntry>, RepositoryError> {
        Ok(self
            .lock()?
            .ledger
            .iter()
            .filter(|entry| query.matches(entry))
            .cloned()
            .collect())
    }
}

/// Directory seeded up front, e.g. from a roster CSV.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAgentDirectory {
    agents: Arc<Mutex<BTreeMap<AgentId, Agent>>>,
}

impl InMemoryAgentDirectory {
    pub fn with_agents(agents: impl IntoIterator<Item = Agent>) -> Self {
        let directory = Self::default();
        for agent in agents {
            directory.upsert(agent);
        }
        directory
    }

    pub fn upsert(&self, agent: Agent) {
        let mut guard = self
            .agents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.insert(agent.id.clone(), agent);
    }
}

impl AgentDirectory for InMemoryAgentDirectory {
    fn find(&self, id: &AgentId) -> Result<Option<Agent>, RepositoryError> {
        let guard = self
            .agents
            .lock()
            .map_err(|_| RepositoryError::Unavailable("agent directory mutex poisoned".to_string()))?;
        Ok(guard.get(id).cloned())
    }

    fn roster(&self) -> Result<Vec<Agent>, RepositoryError> {
        let guard = self
            .agents
            .lock()
            .map_err(|_| RepositoryError::Unavailable("agent directory mutex poisoned".to_string()))?;
        Ok(guard.values().cloned().collect())
    }
}
