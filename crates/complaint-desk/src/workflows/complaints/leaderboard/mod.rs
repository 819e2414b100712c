//! Point aggregation for agent dashboards and the monthly leaderboard.
//!
//! Reads only the ledger and the agent directory; never touches complaints.

pub mod views;

pub use views::{AgentAllTimeSummary, AgentMonthlySummary, RosterEntry, RosterSummary};

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use super::clock::{Clock, SystemClock};
use super::domain::{Agent, AgentId};
use super::ledger::{LedgerEntry, MonthKey};
use super::repository::{AgentDirectory, LedgerQuery, PointLedger};
use super::service::ComplaintServiceError;

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    points: u32,
    count: u32,
    minutes: u64,
}

impl Tally {
    fn add(&mut self, entry: &LedgerEntry) {
        self.points += u32::from(entry.total_points);
        self.count += 1;
        self.minutes += entry.minutes_taken;
    }

    fn avg_minutes(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.minutes as f64 / f64::from(self.count)
        }
    }
}

fn tally<'a>(entries: impl IntoIterator<Item = &'a LedgerEntry>) -> Tally {
    entries.into_iter().fold(Tally::default(), |mut tally, entry| {
        tally.add(entry);
        tally
    })
}

/// Sum, count and average minutes of `entries` falling in `month` for `agent_id`.
pub fn monthly_summary(
    agent_id: &AgentId,
    month: &MonthKey,
    entries: &[LedgerEntry],
) -> AgentMonthlySummary {
    let totals = tally(
        entries
            .iter()
            .filter(|entry| &entry.agent_id == agent_id && &entry.month_key == month),
    );
    AgentMonthlySummary {
        agent_id: agent_id.clone(),
        month_key: month.clone(),
        points: totals.points,
        closed_count: totals.count,
        avg_minutes: totals.avg_minutes(),
    }
}

pub fn all_time_summary(agent_id: &AgentId, entries: &[LedgerEntry]) -> AgentAllTimeSummary {
    let totals = tally(entries.iter().filter(|entry| &entry.agent_id == agent_id));
    AgentAllTimeSummary {
        agent_id: agent_id.clone(),
        total_points: totals.points,
        closed_count: totals.count,
    }
}

/// Left-joins roster agents against the ledger, then ranks them.
pub fn roster_summary(roster: &[Agent], entries: &[LedgerEntry], month: &MonthKey) -> Vec<RosterEntry> {
    let mut all_time: HashMap<&AgentId, Tally> = HashMap::new();
    let mut in_month: HashMap<&AgentId, Tally> = HashMap::new();
    for entry in entries {
        all_time.entry(&entry.agent_id).or_default().add(entry);
        if &entry.month_key == month {
            in_month.entry(&entry.agent_id).or_default().add(entry);
        }
    }

    let mut rows: Vec<RosterEntry> = roster
        .iter()
        .filter(|agent| agent.role.on_roster())
        .map(|agent| {
            let lifetime = all_time.get(&agent.id).copied().unwrap_or_default();
            let month_tally = in_month.get(&agent.id).copied().unwrap_or_default();
            RosterEntry {
                agent_id: agent.id.clone(),
                name: agent.name.clone(),
                role: agent.role,
                total_points_all_time: lifetime.points,
                month_points: month_tally.points,
                month_transitions: month_tally.count,
                month_avg_minutes: month_tally.avg_minutes(),
            }
        })
        .collect();

    rows.sort_by(rank);
    rows
}

fn rank(a: &RosterEntry, b: &RosterEntry) -> Ordering {
    b.month_points
        .cmp(&a.month_points)
        .then_with(|| b.total_points_all_time.cmp(&a.total_points_all_time))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.agent_id.cmp(&b.agent_id))
}

/// Reporting facade over the ledger and the agent directory.
pub struct Leaderboard<L, D> {
    ledger: Arc<L>,
    directory: Arc<D>,
    clock: Arc<dyn Clock>,
}

impl<L, D> Leaderboard<L, D>
where
    L: PointLedger + 'static,
    D: AgentDirectory + 'static,
{
    pub fn new(ledger: Arc<L>, directory: Arc<D>) -> Self {
        Self::with_clock(ledger, directory, Arc::new(SystemClock))
    }

    pub fn with_clock(ledger: Arc<L>, directory: Arc<D>, clock: Arc<dyn Clock>) -> Self {
        Self {
            ledger,
            directory,
            clock,
        }
    }

    /// Requested month, or the current UTC month when absent.
    pub fn resolve_month(&self, month: Option<&str>) -> Result<MonthKey, ComplaintServiceError> {
        match month.map(str::trim).filter(|raw| !raw.is_empty()) {
            Some(raw) => Ok(MonthKey::parse(raw)?),
            None => Ok(MonthKey::from_datetime(self.clock.now())),
        }
    }

    pub fn agent_monthly_summary(
        &self,
        agent_id: &str,
        month: Option<&str>,
    ) -> Result<AgentMonthlySummary, ComplaintServiceError> {
        let agent = self.known_agent(agent_id)?;
        let month = self.resolve_month(month)?;
        let entries = self
            .ledger
            .entries(&LedgerQuery::for_agent(agent.id.clone()).in_month(month.clone()))?;
        Ok(monthly_summary(&agent.id, &month, &entries))
    }

    pub fn agent_all_time_summary(
        &self,
        agent_id: &str,
    ) -> Result<AgentAllTimeSummary, ComplaintServiceError> {
        let agent = self.known_agent(agent_id)?;
        let entries = self.ledger.entries(&LedgerQuery::for_agent(agent.id.clone()))?;
        Ok(all_time_summary(&agent.id, &entries))
    }

    pub fn roster_summary(&self, month: Option<&str>) -> Result<RosterSummary, ComplaintServiceError> {
        let month = self.resolve_month(month)?;
        let roster = self.directory.roster()?;
        let entries = self.ledger.entries(&LedgerQuery::default())?;
        Ok(RosterSummary {
            entries: roster_summary(&roster, &entries, &month),
            month_key: month,
        })
    }

    fn known_agent(&self, agent_id: &str) -> Result<Agent, ComplaintServiceError> {
        let id = AgentId::parse(agent_id)?;
        self.directory
            .find(&id)?
            .ok_or_else(|| ComplaintServiceError::not_found("agent", id.as_str()))
    }
}
