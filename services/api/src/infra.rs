use complaint_desk::error::AppError;
use complaint_desk::workflows::complaints::lifecycle::validate_transition;
use complaint_desk::workflows::complaints::{
    Agent, AgentId, AgentRole, AgentRosterImporter, ComplaintStatus, InMemoryAgentDirectory,
    Transition,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Directory seeded from a roster CSV, or empty when no roster is configured.
pub(crate) fn load_directory(roster: Option<&Path>) -> Result<InMemoryAgentDirectory, AppError> {
    match roster {
        Some(path) => Ok(InMemoryAgentDirectory::with_agents(
            AgentRosterImporter::from_path(path)?,
        )),
        None => Ok(InMemoryAgentDirectory::default()),
    }
}

pub(crate) fn demo_roster() -> Vec<Agent> {
    [
        ("agent-1", "Rina Putri", "0811000001", AgentRole::Agent),
        ("agent-2", "Budi Santoso", "0811000002", AgentRole::Agent),
        ("sup-1", "Dewi Lestari", "0811000003", AgentRole::Supervisor),
        ("admin-1", "Ops Admin", "0811000004", AgentRole::Admin),
    ]
    .into_iter()
    .map(|(id, name, phone, role)| Agent {
        id: AgentId(id.to_string()),
        name: name.to_string(),
        phone: phone.to_string(),
        role,
    })
    .collect()
}

/// Parses `from:to` into a transition the lifecycle accepts.
pub(crate) fn parse_transition(raw: &str) -> Result<Transition, String> {
    let (from, to) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected <from>:<to>, got '{raw}'"))?;
    let from = ComplaintStatus::parse(from).map_err(|err| err.to_string())?;
    let to = ComplaintStatus::parse(to).map_err(|err| err.to_string())?;
    validate_transition(from, to).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_transition_accepts_forward_moves_only() {
        let transition = parse_transition("Processing:solved").expect("forward move");
        assert_eq!(transition.from, ComplaintStatus::Processing);
        assert_eq!(transition.to, ComplaintStatus::Solved);

        assert!(parse_transition("informed:pending").is_err());
        assert!(parse_transition("processing").is_err());
        assert!(parse_transition("processing:closed").is_err());
    }

    #[test]
    fn missing_roster_yields_empty_directory() {
        use complaint_desk::workflows::complaints::AgentDirectory;

        let directory = load_directory(None).expect("directory builds");
        assert!(directory.roster().expect("roster readable").is_empty());
    }
}
