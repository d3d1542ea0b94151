//! Output formatting for CLI commands.
//!
//! This module renders tickets, sub-tasks, sprints and the tracker state
//! either as human-readable text or as JSON for programmatic use. Every
//! writer is generic over [`Write`] so the interactive session can render
//! into any sink.
//!
//! Submodules:
//! - [`color`]: Color and styling helpers (semantic colors)

pub mod color;

use crate::domain::{Sprint, SprintStatistics, SubTask, Ticket, TicketType};
use crate::tracker::SystemState;
use serde::Serialize;
use std::env;
use std::io::{self, Write};

pub use color::{error, success, warning};

use color::{bold, colorize_id, colorize_status, colorize_type, dimmed};

/// Configuration for output formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Build an OutputConfig from the configured preference and environment.
    ///
    /// `NO_COLOR` (any value) disables colors regardless of `prefer_colors`.
    pub fn from_env(prefer_colors: bool) -> Self {
        // https://no-color.org/
        let use_colors = prefer_colors && env::var_os("NO_COLOR").is_none();
        Self { use_colors }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { use_colors: true }
    }
}

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

impl OutputMode {
    /// `Json` when `json` is set, `Text` otherwise.
    pub fn from_flag(json: bool) -> Self {
        if json { OutputMode::Json } else { OutputMode::Text }
    }
}

// ============================================================================
// Text Formatting
// ============================================================================

/// One-line summary of a ticket.
pub fn write_ticket<W: Write + ?Sized>(w: &mut W, ticket: &Ticket, config: &OutputConfig) -> io::Result<()> {
    writeln!(
        w,
        "{} {} [{}] {}  {} {}",
        colorize_id(&format!("#{}", ticket.id), config),
        colorize_type(ticket.ticket_type, config),
        colorize_status(ticket.status, config),
        ticket.title,
        dimmed("assignee:", config),
        ticket.assignee
    )
}

/// One-line summary of a sub-task, indented under its parent.
pub fn write_sub_task<W: Write + ?Sized>(
    w: &mut W,
    sub_task: &SubTask,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(
        w,
        "  {} {} [{}] {}  {} {}  {} v{}",
        dimmed("└─", config),
        colorize_id(&format!("#{}", sub_task.id), config),
        colorize_status(sub_task.status, config),
        sub_task.title,
        dimmed("assignee:", config),
        sub_task.assignee,
        dimmed("version:", config),
        sub_task.version
    )
}

/// One-line summary of a sprint.
pub fn write_sprint<W: Write + ?Sized>(w: &mut W, sprint: &Sprint, config: &OutputConfig) -> io::Result<()> {
    let state = if sprint.active {
        color::warning("active", config)
    } else {
        dimmed("inactive", config)
    };
    writeln!(
        w,
        "{} {} ({})  {} {} .. {}  {} {}",
        colorize_id(&format!("#{}", sprint.id), config),
        sprint.name,
        state,
        dimmed("dates:", config),
        sprint.start_date.format("%Y-%m-%d"),
        sprint.end_date.format("%Y-%m-%d"),
        dimmed("stories:", config),
        sprint.story_count()
    )
}

/// Story counts for a sprint.
pub fn write_statistics<W: Write + ?Sized>(
    w: &mut W,
    stats: &SprintStatistics,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(
        w,
        "{} {}: {} total, {} deployed, {} in progress, {} open",
        bold("Sprint", config),
        colorize_id(&format!("#{}", stats.sprint_id), config),
        stats.total_stories,
        stats.completed_stories,
        stats.in_progress_stories,
        stats.open_stories
    )
}

/// Full tracker state: every ticket with its sub-tasks, then the active
/// sprint with its stories.
pub fn write_system_state<W: Write + ?Sized>(
    w: &mut W,
    state: &SystemState,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(w, "{}", bold("All Tickets:", config))?;
    if state.tickets.is_empty() {
        writeln!(w, "  No tickets.")?;
    }
    for entry in &state.tickets {
        write!(w, "- ")?;
        write_ticket(w, &entry.ticket, config)?;
        for sub_task in &entry.sub_tasks {
            write_sub_task(w, sub_task, config)?;
        }
    }

    writeln!(w)?;
    writeln!(w, "{}", bold("Active Sprint:", config))?;
    match &state.active_sprint {
        Some(sprint) => {
            write!(w, "- ")?;
            write_sprint(w, sprint, config)?;
            for story in &state.active_sprint_stories {
                write!(w, "  {} ", dimmed("└─", config))?;
                write_ticket(w, story, config)?;
            }
        }
        None => writeln!(w, "  No active sprint.")?,
    }
    Ok(())
}

/// Transition table of one ticket type.
pub fn write_workflow<W: Write + ?Sized>(
    w: &mut W,
    ticket_type: TicketType,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(
        w,
        "{} {} {}",
        colorize_type(ticket_type, config),
        dimmed("final status:", config),
        colorize_status(ticket_type.final_status(), config)
    )?;
    for (from, to) in ticket_type.transitions() {
        let targets: Vec<String> = to.iter().map(|s| colorize_status(*s, config)).collect();
        writeln!(
            w,
            "  {} {} {}",
            colorize_status(*from, config),
            dimmed("->", config),
            targets.join(", ")
        )?;
    }
    Ok(())
}

// ============================================================================
// JSON Formatting
// ============================================================================

/// Write any serializable value as pretty JSON.
pub fn write_json<W: Write + ?Sized, T: Serialize + ?Sized>(w: &mut W, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(w, "{}", json)
}
