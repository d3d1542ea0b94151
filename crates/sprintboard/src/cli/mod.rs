//! CLI argument parsing and command dispatch.
//!
//! The tracker is in-memory, so the CLI drives a whole session per
//! invocation rather than one operation per call.
//!
//! # Commands
//!
//! - `demo`: Scripted walkthrough of tickets, sub-tasks and sprints (default)
//! - `interactive`: Menu-driven session reading from stdin
//! - `workflow`: Print the status transition tables
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format
//! - `--config <PATH>`: Load settings from a YAML file
//!
//! # Example
//!
//! ```bash
//! sprintboard demo
//! sprintboard workflow --type story
//! sprintboard --config sprintboard.yaml interactive
//! ```

mod demo;
mod interactive;
mod types;

pub use interactive::Session;
pub use types::TicketTypeArg;

use crate::config::TrackerConfig;
use crate::domain::{TicketStatus, TicketType};
use crate::output::{self, OutputConfig, OutputMode};
use crate::tracker::Tracker;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

/// Sprintboard - in-memory tickets, sub-tasks and sprints
///
/// Tracks stories, epics and on-call tickets through per-type workflows and
/// plans stories into sprints.
#[derive(Parser, Debug)]
#[command(name = "sprintboard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to a YAML configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the scripted walkthrough
    ///
    /// Creates tickets, drives them through their workflows, plans a sprint
    /// and shows the validation rules rejecting invalid operations.
    Demo,

    /// Start an interactive session
    ///
    /// Presents a numbered menu on stdin for creating tickets, updating
    /// status, adding sub-tasks and managing sprints.
    Interactive,

    /// Show status transition tables
    Workflow(WorkflowArgs),
}

/// Arguments for the workflow command
#[derive(Args, Debug, Clone)]
pub struct WorkflowArgs {
    /// Only show this ticket type
    #[arg(long = "type", short = 't', value_enum)]
    pub ticket_type: Option<TicketTypeArg>,
}

/// Serializable view of one transition table
#[derive(Debug, Serialize)]
struct WorkflowView {
    ticket_type: TicketType,
    final_status: TicketStatus,
    transitions: Vec<TransitionView>,
}

#[derive(Debug, Serialize)]
struct TransitionView {
    from: TicketStatus,
    to: Vec<TicketStatus>,
}

impl WorkflowView {
    fn of(ticket_type: TicketType) -> Self {
        Self {
            ticket_type,
            final_status: ticket_type.final_status(),
            transitions: ticket_type
                .transitions()
                .iter()
                .map(|(from, to)| TransitionView {
                    from: *from,
                    to: to.to_vec(),
                })
                .collect(),
        }
    }
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command against stdin/stdout
    pub async fn execute(&self, config: &TrackerConfig) -> Result<()> {
        let output_mode = OutputMode::from_flag(self.json);
        let output_config = OutputConfig::from_env(config.output.color);
        let stdout = io::stdout();

        match &self.command {
            None | Some(Commands::Demo) => {
                let tracker = Tracker::new();
                let mut out = stdout.lock();
                demo::run(&tracker, config, output_mode, &output_config, &mut out).await
            }
            Some(Commands::Interactive) => {
                let tracker = Tracker::new();
                let stdin = io::stdin();
                let mut session = Session::new(
                    &tracker,
                    config,
                    output_mode,
                    &output_config,
                    stdin.lock(),
                    stdout.lock(),
                );
                session.run().await
            }
            Some(Commands::Workflow(args)) => {
                execute_workflow(args, output_mode, &output_config, &mut stdout.lock())
            }
        }
    }
}

/// Execute the workflow command
pub fn execute_workflow<W: Write>(
    args: &WorkflowArgs,
    output_mode: OutputMode,
    output_config: &OutputConfig,
    out: &mut W,
) -> Result<()> {
    let types: Vec<TicketType> = match args.ticket_type {
        Some(arg) => vec![arg.into()],
        None => TicketType::ALL.to_vec(),
    };

    match output_mode {
        OutputMode::Json => {
            let views: Vec<WorkflowView> = types.into_iter().map(WorkflowView::of).collect();
            output::write_json(out, &views)?;
        }
        OutputMode::Text => {
            for (i, ticket_type) in types.into_iter().enumerate() {
                if i > 0 {
                    writeln!(out)?;
                }
                output::write_workflow(out, ticket_type, output_config)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> OutputConfig {
        OutputConfig { use_colors: false }
    }

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["sprintboard"]).unwrap();
        assert!(!cli.json);
        assert!(cli.config.is_none());
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["sprintboard", "workflow", "--json", "--config", "x.yaml"])
                .unwrap();
        assert!(cli.json);
        assert_eq!(cli.config, Some(PathBuf::from("x.yaml")));
        assert!(matches!(cli.command, Some(Commands::Workflow(_))));
    }

    #[test]
    fn test_parse_workflow_type() {
        let cli = Cli::try_parse_from(["sprintboard", "workflow", "--type", "on-call"]).unwrap();
        let Some(Commands::Workflow(args)) = cli.command else {
            panic!("expected workflow command");
        };
        assert_eq!(args.ticket_type, Some(TicketTypeArg::OnCall));

        assert!(Cli::try_parse_from(["sprintboard", "workflow", "--type", "bug"]).is_err());
    }

    #[test]
    fn test_workflow_text_all_types() {
        let mut out = Vec::new();
        let args = WorkflowArgs { ticket_type: None };
        execute_workflow(&args, OutputMode::Text, &plain(), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("STORY final status: DEPLOYED"));
        assert!(text.contains("EPIC final status: COMPLETED"));
        assert!(text.contains("ON_CALL final status: RESOLVED"));
        assert!(text.contains("  IN_REVIEW -> DEPLOYED, TESTING"));
    }

    #[test]
    fn test_workflow_json_single_type() {
        let mut out = Vec::new();
        let args = WorkflowArgs {
            ticket_type: Some(TicketTypeArg::Story),
        };
        execute_workflow(&args, OutputMode::Json, &plain(), &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
        assert_eq!(value[0]["ticket_type"], "STORY");
        assert_eq!(value[0]["final_status"], "DEPLOYED");
        assert_eq!(value[0]["transitions"][0]["from"], "OPEN");
        assert_eq!(value[0]["transitions"][0]["to"][0], "IN_PROGRESS");
    }
}
