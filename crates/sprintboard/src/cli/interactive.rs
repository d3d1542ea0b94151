//! Menu-driven session over a line reader.
//!
//! The session is generic over its input and output so tests can drive it
//! with an in-memory script. End of input at any prompt ends the session.

use crate::config::TrackerConfig;
use crate::domain::{NewSprint, NewSubTask, NewTicket, TicketId, TicketStatus, TicketType};
use crate::error::Error;
use crate::output::{self, OutputConfig, OutputMode, color};
use crate::tracker::Tracker;
use anyhow::Result;
use chrono::Utc;
use std::io::{BufRead, Write};
use tracing::debug;

const MENU: &[(&str, &str)] = &[
    ("1", "Create ticket"),
    ("2", "Update ticket status"),
    ("3", "Add sub-task"),
    ("4", "Manage sprint"),
    ("5", "Show system state"),
    ("0", "Exit"),
];

/// Whether the session keeps reading after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Interactive session state.
pub struct Session<'a, R, W> {
    tracker: &'a Tracker,
    config: &'a TrackerConfig,
    output_mode: OutputMode,
    output: &'a OutputConfig,
    input: R,
    out: W,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    /// Create a session reading commands from `input` and writing to `out`.
    pub fn new(
        tracker: &'a Tracker,
        config: &'a TrackerConfig,
        output_mode: OutputMode,
        output: &'a OutputConfig,
        input: R,
        out: W,
    ) -> Self {
        Self {
            tracker,
            config,
            output_mode,
            output,
            input,
            out,
        }
    }

    /// Consume the session and return its output sink.
    pub fn into_output(self) -> W {
        self.out
    }

    /// Run the menu loop until the user exits or input ends.
    pub async fn run(&mut self) -> Result<()> {
        writeln!(
            self.out,
            "{}",
            color::bold("=== Sprintboard Interactive ===", self.output)
        )?;

        loop {
            self.print_menu()?;
            let Some(choice) = self.prompt("Enter choice")? else {
                break;
            };

            let flow = match choice.as_str() {
                "1" => self.create_ticket().await?,
                "2" => self.update_status().await?,
                "3" => self.add_sub_task().await?,
                "4" => self.manage_sprint().await?,
                "5" => self.show_state().await?,
                "0" => Flow::Quit,
                other => {
                    let msg = format!("Invalid choice: {other}");
                    writeln!(self.out, "{}", output::warning(&msg, self.output))?;
                    Flow::Continue
                }
            };
            if flow == Flow::Quit {
                break;
            }
        }

        writeln!(self.out, "Goodbye!")?;
        self.out.flush()?;
        Ok(())
    }

    fn print_menu(&mut self) -> Result<()> {
        writeln!(self.out)?;
        for (key, label) in MENU {
            writeln!(self.out, "{key}. {label}")?;
        }
        Ok(())
    }

    /// Read one trimmed line. `None` means the input is exhausted.
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.out, "{label}: ")?;
        self.out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Prompt until the answer parses, re-asking on invalid input.
    fn prompt_parsed<T>(
        &mut self,
        label: &str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Result<Option<T>> {
        loop {
            let Some(answer) = self.prompt(label)? else {
                return Ok(None);
            };
            if let Some(value) = parse(&answer) {
                return Ok(Some(value));
            }
            let msg = format!("Invalid input: '{answer}'");
            writeln!(self.out, "{}", output::warning(&msg, self.output))?;
        }
    }

    fn prompt_ticket_id(&mut self, label: &str) -> Result<Option<TicketId>> {
        self.prompt_parsed(label, |s| s.parse::<u64>().ok().map(TicketId))
    }

    fn report(&mut self, err: &Error) -> Result<()> {
        let msg = format!("Error: {err}");
        writeln!(self.out, "{}", output::error(&msg, self.output))?;
        Ok(())
    }

    fn not_found(&mut self, id: TicketId) -> Result<()> {
        self.report(&Error::TicketNotFound(id))
    }

    async fn create_ticket(&mut self) -> Result<Flow> {
        let Some(title) = self.prompt("Title")? else {
            return Ok(Flow::Quit);
        };
        let Some(description) = self.prompt("Description")? else {
            return Ok(Flow::Quit);
        };
        let types: Vec<String> = TicketType::ALL
            .iter()
            .enumerate()
            .map(|(i, t)| format!("{} {t}", i + 1))
            .collect();
        let label = format!("Type ({})", types.join(", "));
        let Some(ticket_type) = self.prompt_parsed(&label, |s| {
            s.parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| TicketType::ALL.get(i).copied())
                .or_else(|| s.parse().ok())
        })?
        else {
            return Ok(Flow::Quit);
        };
        let Some(assignee) = self.prompt("Assignee")? else {
            return Ok(Flow::Quit);
        };

        let ticket = self
            .tracker
            .tickets()
            .create_ticket(NewTicket::new(title, description, ticket_type, assignee))
            .await;
        match self.output_mode {
            OutputMode::Json => output::write_json(&mut self.out, &ticket)?,
            OutputMode::Text => {
                write!(self.out, "{} ", output::success("Created", self.output))?;
                output::write_ticket(&mut self.out, &ticket, self.output)?;
            }
        }
        Ok(Flow::Continue)
    }

    async fn update_status(&mut self) -> Result<Flow> {
        let Some(id) = self.prompt_ticket_id("Ticket id")? else {
            return Ok(Flow::Quit);
        };
        let Some(ticket) = self.tracker.tickets().get_ticket(id).await else {
            self.not_found(id)?;
            return Ok(Flow::Continue);
        };

        let next = ticket.ticket_type.valid_next_statuses(ticket.status);
        if next.is_empty() {
            let msg = format!("Ticket {id} is {} and cannot move further", ticket.status);
            writeln!(self.out, "{}", output::warning(&msg, self.output))?;
            return Ok(Flow::Continue);
        }

        writeln!(self.out, "Current status: {}", ticket.status)?;
        for (i, status) in next.iter().enumerate() {
            writeln!(self.out, "{}. {status}", i + 1)?;
        }
        let Some(status) = self.prompt_parsed("New status", |s| {
            s.parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| next.get(i).copied())
                .or_else(|| s.parse::<TicketStatus>().ok())
        })?
        else {
            return Ok(Flow::Quit);
        };

        match self.tracker.tickets().update_ticket_status(id, status).await {
            Ok(true) => {
                let msg = format!("Ticket {id} moved to {status}");
                writeln!(self.out, "{}", output::success(&msg, self.output))?;
            }
            Ok(false) => self.not_found(id)?,
            Err(e) => self.report(&e)?,
        }
        Ok(Flow::Continue)
    }

    async fn add_sub_task(&mut self) -> Result<Flow> {
        let Some(parent_id) = self.prompt_ticket_id("Parent ticket id")? else {
            return Ok(Flow::Quit);
        };
        let Some(title) = self.prompt("Title")? else {
            return Ok(Flow::Quit);
        };
        let Some(description) = self.prompt("Description")? else {
            return Ok(Flow::Quit);
        };
        let Some(assignee) = self.prompt("Assignee")? else {
            return Ok(Flow::Quit);
        };

        let request = NewSubTask::new(parent_id, title, description, assignee);
        match self.tracker.sub_tasks().create_sub_task(request).await {
            Ok(sub_task) => match self.output_mode {
                OutputMode::Json => output::write_json(&mut self.out, &sub_task)?,
                OutputMode::Text => {
                    writeln!(self.out, "{}", output::success("Created sub-task", self.output))?;
                    output::write_sub_task(&mut self.out, &sub_task, self.output)?;
                }
            },
            Err(e) => self.report(&e)?,
        }
        Ok(Flow::Continue)
    }

    /// Create a sprint starting now, start it, and plan every story into it.
    async fn manage_sprint(&mut self) -> Result<Flow> {
        let sprints = self.tracker.sprints();
        let start = Utc::now();
        let Some(end) = self.config.sprint_end(start) else {
            let msg = format!(
                "sprint length of {} days is out of range",
                self.config.sprint_length_days
            );
            self.report(&Error::Config(msg))?;
            return Ok(Flow::Continue);
        };
        let name = format!("Sprint-{}", start.format("%Y-%m-%d"));

        let sprint = match sprints
            .create_sprint(NewSprint::new(name, "Created from interactive session", start, end))
            .await
        {
            Ok(sprint) => sprint,
            Err(e) => {
                self.report(&e)?;
                return Ok(Flow::Continue);
            }
        };
        if let Err(e) = sprints.start_sprint(sprint.id).await {
            self.report(&e)?;
            return Ok(Flow::Continue);
        }

        let stories = self.tracker.tickets().get_tickets_by_type(TicketType::Story).await;
        for story in &stories {
            if let Err(e) = sprints.add_story_to_sprint(sprint.id, story.id).await {
                self.report(&e)?;
            }
        }
        debug!(sprint = %sprint.id, stories = stories.len(), "Planned sprint");

        let Some(sprint) = sprints.get_sprint(sprint.id).await else {
            return Ok(Flow::Continue);
        };
        match self.output_mode {
            OutputMode::Json => output::write_json(&mut self.out, &sprint)?,
            OutputMode::Text => {
                write!(self.out, "{} ", output::success("Started", self.output))?;
                output::write_sprint(&mut self.out, &sprint, self.output)?;
            }
        }
        Ok(Flow::Continue)
    }

    async fn show_state(&mut self) -> Result<Flow> {
        let state = self.tracker.system_state().await;
        match self.output_mode {
            OutputMode::Json => output::write_json(&mut self.out, &state)?,
            OutputMode::Text => output::write_system_state(&mut self.out, &state, self.output)?,
        }
        Ok(Flow::Continue)
    }
}
