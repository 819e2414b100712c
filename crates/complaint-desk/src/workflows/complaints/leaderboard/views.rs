use serde::Serialize;

use super::super::domain::{AgentId, AgentRole};
use super::super::ledger::MonthKey;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentMonthlySummary {
    pub agent_id: AgentId,
    pub month_key: MonthKey,
    pub points: u32,
    pub closed_count: u32,
    pub avg_minutes: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentAllTimeSummary {
    pub agent_id: AgentId,
    pub total_points: u32,
    pub closed_count: u32,
}

/// One leaderboard row. Agents without ledger rows carry zeros.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterEntry {
    pub agent_id: AgentId,
    pub name: String,
    pub role: AgentRole,
    pub total_points_all_time: u32,
    pub month_points: u32,
    pub month_transitions: u32,
    pub month_avg_minutes: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterSummary {
    pub month_key: MonthKey,
    pub entries: Vec<RosterEntry>,
}
