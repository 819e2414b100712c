use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde::Deserialize;

use super::domain::{Agent, AgentId, AgentRole, ValidationError};
use super::leaderboard::RosterEntry;

#[derive(Debug, thiserror::Error)]
pub enum RosterImportError {
    #[error("failed to open roster file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse roster csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("roster row {row}: {source}")]
    InvalidId {
        row: usize,
        #[source]
        source: ValidationError,
    },
    #[error("roster row {row}: unknown role '{role}'")]
    UnknownRole { row: usize, role: String },
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    id: String,
    name: String,
    #[serde(default)]
    phone: String,
    role: String,
}

/// Loads the agent directory from an `id,name,phone,role` export of the user store.
pub struct AgentRosterImporter;

impl AgentRosterImporter {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Vec<Agent>, RosterImportError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Agent>, RosterImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut agents = Vec::new();

        for (index, record) in csv_reader.deserialize::<RosterRow>().enumerate() {
            let row = record?;
            // header is line 1
            let line = index + 2;
            let id = AgentId::parse(&row.id)
                .map_err(|source| RosterImportError::InvalidId { row: line, source })?;
            let role = AgentRole::parse(&row.role).ok_or_else(|| RosterImportError::UnknownRole {
                row: line,
                role: row.role.clone(),
            })?;

            agents.push(Agent {
                id,
                name: row.name,
                phone: row.phone,
                role,
            });
        }

        Ok(agents)
    }
}

/// Writes leaderboard rows as CSV for payroll consumers.
pub fn write_roster_csv<W: Write>(writer: W, rows: &[RosterEntry]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::complaints::ledger::MonthKey;
    use crate::workflows::complaints::leaderboard::roster_summary;
    use std::io::Cursor;

    const ROSTER: &str = "id,name,phone,role\n\
        agent-1,Rina Putri,0811000001,agent\n\
        sup-1,Dewi Lestari,0811000002,Supervisor\n\
        admin-1,Ops Admin,,admin\n";

    #[test]
    fn imports_roster_rows() {
        let agents = AgentRosterImporter::from_reader(Cursor::new(ROSTER)).expect("roster parses");
        assert_eq!(agents.len(), 3);
        assert_eq!(agents[0].id.as_str(), "agent-1");
        assert_eq!(agents[1].role, AgentRole::Supervisor);
        assert!(agents[2].phone.is_empty());
    }

    #[test]
    fn rejects_unknown_roles_with_line_number() {
        let csv = "id,name,phone,role\nagent-1,Rina,0811,agent\nagent-2,Budi,0812,janitor\n";
        match AgentRosterImporter::from_reader(Cursor::new(csv)) {
            Err(RosterImportError::UnknownRole { row, role }) => {
                assert_eq!(row, 3);
                assert_eq!(role, "janitor");
            }
            other => panic!("expected unknown role, got {other:?}"),
        }
    }

    #[test]
    fn exports_zero_activity_rows() {
        let agents = AgentRosterImporter::from_reader(Cursor::new(ROSTER)).expect("roster parses");
        let month = MonthKey::parse("2026-10").expect("valid month");
        let rows = roster_summary(&agents, &[], &month);

        let mut buffer = Vec::new();
        write_roster_csv(&mut buffer, &rows).expect("csv written");
        let output = String::from_utf8(buffer).expect("utf8");
        let mut lines = output.lines();

        assert_eq!(
            lines.next(),
            Some("agent_id,name,role,total_points_all_time,month_points,month_transitions,month_avg_minutes")
        );
        assert_eq!(lines.next(), Some("sup-1,Dewi Lestari,supervisor,0,0,0,0.0"));
        assert_eq!(lines.next(), Some("agent-1,Rina Putri,agent,0,0,0,0.0"));
        assert_eq!(lines.next(), None);
    }
}
