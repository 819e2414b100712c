use crate::infra::{demo_roster, load_directory};
use chrono::{DateTime, Duration, Utc};
use clap::Args;
use complaint_desk::error::AppError;
use complaint_desk::workflows::complaints::{
    score_transition, write_roster_csv, AgentDirectory, CatalogRef, ClassificationRefs,
    ComplaintIntake, ComplaintService, ComplaintServiceError, CustomerInfo,
    InMemoryAgentDirectory, InMemoryComplaintStore, InvoiceSequencer, Leaderboard, ManualClock,
    RosterSummary, Transition, MIN_CLOSING_NOTE_WORDS,
};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Agent roster CSV (id,name,phone,role). Defaults to a built-in sample roster.
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
    /// Write the resulting leaderboard to this CSV file.
    #[arg(long)]
    pub(crate) export: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Transition to score, e.g. `solved:informed`
    #[arg(long, value_parser = crate::infra::parse_transition)]
    pub(crate) transition: Transition,
    /// Minutes spent in the phase being left
    #[arg(long)]
    pub(crate) minutes: u64,
    /// Closing note text; only weighs in on the final transition
    #[arg(long)]
    pub(crate) note: Option<String>,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        transition,
        minutes,
        note,
    } = args;
    let summary = score_transition(transition, minutes, note.as_deref());

    println!("Transition {transition}");
    println!(
        "- {} min -> {} time points",
        summary.minutes_taken, summary.time_points
    );
    if transition.is_terminal() {
        println!(
            "- closing note: {} words -> {} note points",
            summary.note_word_count, summary.note_points
        );
        if summary.note_word_count < MIN_CLOSING_NOTE_WORDS {
            println!(
                "  note: the desk rejects closing notes under {MIN_CLOSING_NOTE_WORDS} words"
            );
        }
    }
    println!("- total points: {}", summary.total_points);
    Ok(())
}

struct ScriptedComplaint {
    customer: &'static str,
    phone: &'static str,
    description: &'static str,
    problem: &'static str,
    department: &'static str,
    handler: usize,
    closer: usize,
    pickup_minutes: i64,
    solve_minutes: i64,
    notify_minutes: i64,
    rushed_note: Option<&'static str>,
    closing_note: &'static str,
}

const SCRIPT: [ScriptedComplaint; 3] = [
    ScriptedComplaint {
        customer: "Siti Aminah",
        phone: "0812345678",
        description: "No internet since last night",
        problem: "prob-internet",
        department: "dept-network",
        handler: 0,
        closer: 0,
        pickup_minutes: 8,
        solve_minutes: 95,
        notify_minutes: 40,
        rushed_note: None,
        closing_note: "Called customer, confirmed connection restored after modem swap",
    },
    ScriptedComplaint {
        customer: "Andi Wijaya",
        phone: "0813555111",
        description: "Billing shows a double charge for September",
        problem: "prob-billing",
        department: "dept-finance",
        handler: 1,
        closer: 1,
        pickup_minutes: 45,
        solve_minutes: 200,
        notify_minutes: 500,
        rushed_note: None,
        closing_note: "Refund issued, customer informed by phone",
    },
    ScriptedComplaint {
        customer: "Maya Sari",
        phone: "0817222333",
        description: "Technician missed the installation appointment",
        problem: "prob-visit",
        department: "dept-field",
        handler: 0,
        closer: 1,
        pickup_minutes: 5,
        solve_minutes: 30,
        notify_minutes: 120,
        rushed_note: Some("done"),
        closing_note: "Rescheduled visit for Friday morning, customer agreed to the slot",
    },
];

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { roster, export } = args;

    let directory = match roster {
        Some(path) => load_directory(Some(&path))?,
        None => InMemoryAgentDirectory::with_agents(demo_roster()),
    };

    println!("Complaint desk demo");
    let Some(summary) = play_script(directory, Utc::now())? else {
        println!("  Roster has no agents or supervisors; nothing to demo");
        return Ok(());
    };
    render_leaderboard(&summary);

    if let Some(path) = export {
        let file = File::create(&path)?;
        write_roster_csv(file, &summary.entries)?;
        println!("\nLeaderboard exported to {}", path.display());
    }

    Ok(())
}

/// Walks every scripted complaint to `Informed` on a manual clock starting at `start`.
/// Returns `None` when the roster has nobody eligible to handle complaints.
fn play_script(
    directory: InMemoryAgentDirectory,
    start: DateTime<Utc>,
) -> Result<Option<RosterSummary>, AppError> {
    let handlers: Vec<String> = directory
        .roster()
        .map_err(ComplaintServiceError::from)?
        .into_iter()
        .filter(|agent| agent.role.on_roster())
        .map(|agent| agent.id.to_string())
        .collect();
    if handlers.is_empty() {
        return Ok(None);
    }

    let clock = Arc::new(ManualClock::new(start));
    let store = Arc::new(InMemoryComplaintStore::default());
    let directory = Arc::new(directory);
    let service = ComplaintService::with_clock(
        store.clone(),
        directory.clone(),
        InvoiceSequencer::default(),
        clock.clone(),
    );
    let leaderboard = Leaderboard::with_clock(store, directory, clock.clone());

    let mut first_closed = None;
    for scripted in &SCRIPT {
        let handler = handlers[scripted.handler % handlers.len()].as_str();
        let closer = handlers[scripted.closer % handlers.len()].as_str();

        let complaint = service.create(ComplaintIntake {
            customer: CustomerInfo {
                name: scripted.customer.to_string(),
                phone: scripted.phone.to_string(),
                address: None,
            },
            classification: ClassificationRefs {
                problem: CatalogRef(scripted.problem.to_string()),
                sub_problem: None,
                department: CatalogRef(scripted.department.to_string()),
                responsible_person: None,
            },
            description: scripted.description.to_string(),
            created_by: handler.to_string(),
        })?;
        println!(
            "\n- {} logged {} for {}: {}",
            handler, complaint.invoice_number, scripted.customer, scripted.description
        );

        let steps = [
            ("processing", scripted.pickup_minutes, None, handler),
            ("solved", scripted.solve_minutes, Some("fault isolated and fixed"), handler),
        ];
        for (target, minutes, note, agent) in steps {
            clock.advance(Duration::minutes(minutes));
            let outcome = service.transition(complaint.id.as_str(), target, note, Some(agent))?;
            if let Some(record) = outcome.complaint.history().last() {
                println!(
                    "  {} -> {} after {} min by {} ({} time points, not credited)",
                    record.from, record.to, record.minutes_taken, agent, record.time_points
                );
            }
        }

        clock.advance(Duration::minutes(scripted.notify_minutes));
        if let Some(note) = scripted.rushed_note {
            match service.transition(complaint.id.as_str(), "informed", Some(note), Some(closer)) {
                Err(err) => println!("  rejected closing note '{note}': {err}"),
                Ok(_) => println!("  closing note '{note}' unexpectedly accepted"),
            }
        }
        let outcome = service.transition(
            complaint.id.as_str(),
            "informed",
            Some(scripted.closing_note),
            Some(closer),
        )?;
        if let Some(points) = outcome.points {
            println!(
                "  solved -> informed after {} min by {}: time {} + note {} ({} words) = {} points",
                points.minutes_taken,
                closer,
                points.time_points,
                points.note_points,
                points.note_word_count,
                points.total_points
            );
        }
        first_closed.get_or_insert(complaint.id);
    }

    if let Some(id) = first_closed {
        match service.transition(id.as_str(), "processing", None, Some(handlers[0].as_str())) {
            Err(err) => println!("\nReopen attempt on {id} rejected: {err}"),
            Ok(_) => println!("\nReopen attempt on {id} unexpectedly accepted"),
        }
    }

    Ok(Some(leaderboard.roster_summary(None)?))
}

fn render_leaderboard(summary: &RosterSummary) {
    println!("\nLeaderboard for {}", summary.month_key);
    for (rank, row) in summary.entries.iter().enumerate() {
        println!(
            "  {:>2}. {:<18} {:<10} {:>3} pts | {} closed | {:.1} min avg | {} pts all time",
            rank + 1,
            row.name,
            row.role.label(),
            row.month_points,
            row.month_transitions,
            row.month_avg_minutes,
            row.total_points_all_time
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use complaint_desk::workflows::complaints::{Agent, AgentId, AgentRole};

    fn october() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn scripted_demo_credits_closers() {
        let directory = InMemoryAgentDirectory::with_agents(demo_roster());
        let summary = play_script(directory, october())
            .expect("script runs")
            .expect("roster has handlers");

        assert_eq!(summary.month_key.as_str(), "2026-10");
        let rows: Vec<_> = summary
            .entries
            .iter()
            .map(|row| (row.agent_id.as_str(), row.month_points, row.month_transitions))
            .collect();
        assert_eq!(
            rows,
            vec![("agent-2", 7, 2), ("agent-1", 4, 1), ("sup-1", 0, 0)]
        );
    }

    #[test]
    fn admin_only_roster_has_nothing_to_demo() {
        let directory = InMemoryAgentDirectory::with_agents([Agent {
            id: AgentId("admin-1".to_string()),
            name: "Ops Admin".to_string(),
            phone: String::new(),
            role: AgentRole::Admin,
        }]);
        assert!(play_script(directory, october())
            .expect("script runs")
            .is_none());
    }
}
