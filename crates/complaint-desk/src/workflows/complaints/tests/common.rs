use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::complaints::domain::{
    Agent, AgentId, AgentRole, CatalogRef, ClassificationRefs, Complaint, ComplaintId,
    ComplaintIntake, CustomerInfo, InvoiceNumber,
};
use crate::workflows::complaints::ledger::LedgerEntry;
use crate::workflows::complaints::lifecycle::ComplaintStatus;
use crate::workflows::complaints::repository::{ComplaintRepository, RepositoryError};
use crate::workflows::complaints::{
    complaint_router, leaderboard_router, Clock, ComplaintService, InMemoryAgentDirectory,
    InMemoryComplaintStore, InvoiceSequencer, Leaderboard, ManualClock,
};

pub(super) const CLOSING_NOTE: &str = "Called customer, replaced faulty router";

pub(super) fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 8, 0, 0)
        .single()
        .expect("valid start timestamp")
}

pub(super) fn agent(id: &str, name: &str, role: AgentRole) -> Agent {
    Agent {
        id: AgentId(id.to_string()),
        name: name.to_string(),
        phone: "0811000000".to_string(),
        role,
    }
}

pub(super) fn roster() -> Vec<Agent> {
    vec![
        agent("agent-1", "Rina Putri", AgentRole::Agent),
        agent("agent-2", "Budi Santoso", AgentRole::Agent),
        agent("sup-1", "Dewi Lestari", AgentRole::Supervisor),
        agent("admin-1", "Ops Admin", AgentRole::Admin),
    ]
}

pub(super) fn intake(created_by: &str) -> ComplaintIntake {
    ComplaintIntake {
        customer: CustomerInfo {
            name: "Siti Aminah".to_string(),
            phone: "0812345678".to_string(),
            address: Some("Jl. Melati 4".to_string()),
        },
        classification: ClassificationRefs {
            problem: CatalogRef("prob-internet".to_string()),
            sub_problem: Some(CatalogRef("sub-no-signal".to_string())),
            department: CatalogRef("dept-network".to_string()),
            responsible_person: None,
        },
        description: "No internet since last night".to_string(),
        created_by: created_by.to_string(),
    }
}

pub(super) struct Desk {
    pub(super) service: Arc<ComplaintService<InMemoryComplaintStore, InMemoryAgentDirectory>>,
    pub(super) leaderboard: Arc<Leaderboard<InMemoryComplaintStore, InMemoryAgentDirectory>>,
    pub(super) store: Arc<InMemoryComplaintStore>,
    pub(super) clock: Arc<ManualClock>,
}

impl Desk {
    pub(super) fn advance(&self, minutes: i64) {
        self.clock.advance(Duration::minutes(minutes));
    }

    pub(super) fn ledger(&self) -> Vec<LedgerEntry> {
        use crate::workflows::complaints::repository::{LedgerQuery, PointLedger};
        self.store
            .entries(&LedgerQuery::default())
            .expect("ledger readable")
    }

    /// Creates a complaint and walks it to `Solved` with ten minutes per phase.
    pub(super) fn solved_complaint(&self, agent_id: &str) -> Complaint {
        let complaint = self.service.create(intake(agent_id)).expect("intake succeeds");
        for target in ["processing", "solved"] {
            self.advance(10);
            self.service
                .transition(complaint.id.as_str(), target, None, Some(agent_id))
                .expect("forward transition succeeds");
        }
        self.service
            .get(complaint.id.as_str())
            .expect("complaint stored")
    }

    pub(super) fn close(&self, complaint: &Complaint, agent_id: &str, after_minutes: i64) {
        self.advance(after_minutes);
        self.service
            .transition(
                complaint.id.as_str(),
                "informed",
                Some(CLOSING_NOTE),
                Some(agent_id),
            )
            .expect("closing transition succeeds");
    }
}

pub(super) fn desk() -> Desk {
    let store = Arc::new(InMemoryComplaintStore::default());
    let directory = Arc::new(InMemoryAgentDirectory::with_agents(roster()));
    let clock = Arc::new(ManualClock::new(start()));
    let shared_clock: Arc<dyn Clock> = clock.clone();

    let service = Arc::new(ComplaintService::with_clock(
        store.clone(),
        directory.clone(),
        InvoiceSequencer::default(),
        shared_clock.clone(),
    ));
    let leaderboard = Arc::new(Leaderboard::with_clock(
        store.clone(),
        directory,
        shared_clock,
    ));

    Desk {
        service,
        leaderboard,
        store,
        clock,
    }
}

pub(super) fn desk_router(desk: &Desk) -> axum::Router {
    complaint_router(desk.service.clone()).merge(leaderboard_router(desk.leaderboard.clone()))
}

pub(super) fn service_over<R>(
    repository: R,
) -> ComplaintService<R, InMemoryAgentDirectory>
where
    R: ComplaintRepository + 'static,
{
    ComplaintService::with_clock(
        Arc::new(repository),
        Arc::new(InMemoryAgentDirectory::with_agents(roster())),
        InvoiceSequencer::default(),
        Arc::new(ManualClock::new(start())),
    )
}

/// Empty store whose every insert fails with the wrapped error.
pub(super) struct RejectingInsertStore(pub(super) RepositoryError);

impl ComplaintRepository for RejectingInsertStore {
    fn insert(&self, _complaint: Complaint) -> Result<Complaint, RepositoryError> {
        Err(self.0.clone())
    }

    fn fetch(&self, _id: &ComplaintId) -> Result<Option<Complaint>, RepositoryError> {
        Ok(None)
    }

    fn latest_invoice(&self, _bucket_key: &str) -> Result<Option<InvoiceNumber>, RepositoryError> {
        Ok(None)
    }

    fn commit_transition(
        &self,
        _complaint: &Complaint,
        _expected: ComplaintStatus,
        _ledger: Option<LedgerEntry>,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }
}

/// Serves reads from an inner store but reports that another transition committed
/// `winner_status` first.
pub(super) struct RacingStore {
    pub(super) inner: InMemoryComplaintStore,
    pub(super) winner_status: ComplaintStatus,
}

impl ComplaintRepository for RacingStore {
    fn insert(&self, complaint: Complaint) -> Result<Complaint, RepositoryError> {
        self.inner.insert(complaint)
    }

    fn fetch(&self, id: &ComplaintId) -> Result<Option<Complaint>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn latest_invoice(&self, bucket_key: &str) -> Result<Option<InvoiceNumber>, RepositoryError> {
        self.inner.latest_invoice(bucket_key)
    }

    fn commit_transition(
        &self,
        _complaint: &Complaint,
        _expected: ComplaintStatus,
        _ledger: Option<LedgerEntry>,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::StaleStatus {
            current: self.winner_status,
        })
    }
}

pub(super) struct UnavailableStore;

impl ComplaintRepository for UnavailableStore {
    fn insert(&self, _complaint: Complaint) -> Result<Complaint, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ComplaintId) -> Result<Option<Complaint>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn latest_invoice(&self, _bucket_key: &str) -> Result<Option<InvoiceNumber>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn commit_transition(
        &self,
        _complaint: &Complaint,
        _expected: ComplaintStatus,
        _ledger: Option<LedgerEntry>,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
