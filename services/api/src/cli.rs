use crate::demo::{run_demo, run_score, DemoArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use complaint_desk::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Complaint Desk",
    about = "Run the complaint desk service or exercise its scoring from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Walk sample complaints through the lifecycle and print the leaderboard
    Demo(DemoArgs),
    /// Score a single transition without touching any store
    Score(ScoreArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Demo(args) => run_demo(args),
        Command::Score(args) => run_score(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_command_parses_transition_and_note() {
        let cli = Cli::try_parse_from([
            "complaint-desk",
            "score",
            "--transition",
            "solved:informed",
            "--minutes",
            "90",
            "--note",
            "called back and confirmed",
        ])
        .expect("arguments parse");

        match cli.command {
            Some(Command::Score(args)) => {
                assert!(args.transition.is_terminal());
                assert_eq!(args.minutes, 90);
                assert_eq!(args.note.as_deref(), Some("called back and confirmed"));
            }
            other => panic!("expected score command, got {other:?}"),
        }
    }

    #[test]
    fn score_command_rejects_skipped_phase() {
        let result = Cli::try_parse_from([
            "complaint-desk",
            "score",
            "--transition",
            "pending:solved",
            "--minutes",
            "5",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["complaint-desk"]).expect("arguments parse");
        assert!(cli.command.is_none());
    }
}
