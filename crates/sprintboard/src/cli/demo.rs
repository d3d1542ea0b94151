//! Scripted walkthrough of the tracker.
//!
//! Each step only calls the public store operations and renders what comes
//! back. Rejected operations in the validation step are expected and are
//! printed rather than propagated.

use crate::config::TrackerConfig;
use crate::domain::{NewSprint, NewSubTask, NewTicket, TicketId, TicketStatus, TicketType};
use crate::error::Result as TrackerResult;
use crate::output::{self, OutputConfig, OutputMode, color};
use crate::tracker::Tracker;
use anyhow::{Context, Result};
use chrono::Utc;
use std::io::Write;
use tracing::debug;

/// Run the walkthrough on `tracker`.
///
/// In JSON mode the narrative is suppressed and only the final system state
/// is written.
pub async fn run<W: Write>(
    tracker: &Tracker,
    config: &TrackerConfig,
    output_mode: OutputMode,
    output_config: &OutputConfig,
    out: &mut W,
) -> Result<()> {
    let mut sink = std::io::sink();
    let narrative: &mut dyn Write = match output_mode {
        OutputMode::Text => &mut *out,
        OutputMode::Json => &mut sink,
    };

    let mut demo = Demo {
        tracker,
        config,
        output: output_config,
        w: narrative,
    };
    demo.create_tickets().await?;
    demo.status_transitions().await?;
    demo.sub_task_management().await?;
    demo.sprint_management().await?;
    demo.validation_rules().await?;
    demo.system_state().await?;
    writeln!(demo.w, "=== Demo Complete ===")?;

    if output_mode == OutputMode::Json {
        output::write_json(out, &tracker.system_state().await)?;
    }
    Ok(())
}

struct Demo<'a> {
    tracker: &'a Tracker,
    config: &'a TrackerConfig,
    output: &'a OutputConfig,
    w: &'a mut dyn Write,
}

impl Demo<'_> {
    fn heading(&mut self, text: &str) -> Result<()> {
        writeln!(self.w, "{}", color::bold(text, self.output))?;
        writeln!(self.w)?;
        Ok(())
    }

    /// Print the outcome of an operation that the rules should reject.
    fn rule(&mut self, outcome: TrackerResult<bool>) -> Result<()> {
        match outcome {
            Err(e) => writeln!(self.w, "Rule: {}", output::error(&e.to_string(), self.output))?,
            Ok(_) => writeln!(
                self.w,
                "{}",
                output::warning("Operation was unexpectedly accepted", self.output)
            )?,
        }
        Ok(())
    }

    async fn first_of(&self, ticket_type: TicketType) -> Result<TicketId> {
        self.tracker
            .tickets()
            .get_tickets_by_type(ticket_type)
            .await
            .first()
            .map(|t| t.id)
            .with_context(|| format!("demo expects a {ticket_type} ticket"))
    }

    async fn move_ticket(&mut self, id: TicketId, status: TicketStatus) -> Result<()> {
        self.tracker.tickets().update_ticket_status(id, status).await?;
        writeln!(self.w, "  Moved #{id} to {status}")?;
        Ok(())
    }

    async fn create_tickets(&mut self) -> Result<()> {
        self.heading("1. Creating tickets")?;
        let tickets = self.tracker.tickets();

        let requests = [
            NewTicket::new(
                "Implement login feature",
                "Email and password login",
                TicketType::Story,
                "alice",
            ),
            NewTicket::new(
                "Implement signup feature",
                "Self-service account creation",
                TicketType::Story,
                "bob",
            ),
            NewTicket::new(
                "User authentication",
                "Complete user authentication functionality",
                TicketType::Epic,
                "carol",
            ),
            NewTicket::new(
                "Fix production bug",
                "Login page returns 500 for some users",
                TicketType::OnCall,
                "dave",
            ),
        ];
        for request in requests {
            let ticket = tickets.create_ticket(request).await;
            output::write_ticket(&mut *self.w, &ticket, self.output)?;
        }
        writeln!(self.w)?;
        Ok(())
    }

    async fn status_transitions(&mut self) -> Result<()> {
        self.heading("2. Status transitions")?;

        let story = self.first_of(TicketType::Story).await?;
        for status in [
            TicketStatus::InProgress,
            TicketStatus::Testing,
            TicketStatus::InReview,
        ] {
            self.move_ticket(story, status).await?;
        }

        let epic = self.first_of(TicketType::Epic).await?;
        self.move_ticket(epic, TicketStatus::InProgress).await?;

        let on_call = self.first_of(TicketType::OnCall).await?;
        self.move_ticket(on_call, TicketStatus::InProgress).await?;
        self.move_ticket(on_call, TicketStatus::Resolved).await?;

        writeln!(self.w)?;
        Ok(())
    }

    async fn sub_task_management(&mut self) -> Result<()> {
        self.heading("3. Sub-task management")?;
        let sub_tasks = self.tracker.sub_tasks();

        let story = self.first_of(TicketType::Story).await?;
        let design = sub_tasks
            .create_sub_task(NewSubTask::new(story, "Design UI", "Login page mockups", "erin"))
            .await?;
        let implement = sub_tasks
            .create_sub_task(NewSubTask::new(
                story,
                "Implement login",
                "Wire up the auth backend",
                "frank",
            ))
            .await?;
        output::write_sub_task(&mut *self.w, &design, self.output)?;
        output::write_sub_task(&mut *self.w, &implement, self.output)?;

        sub_tasks
            .update_sub_task_status(design.id, TicketStatus::InProgress)
            .await?;
        let next: Vec<String> = sub_tasks
            .get_valid_next_statuses(design.id)
            .await
            .iter()
            .map(ToString::to_string)
            .collect();
        writeln!(
            self.w,
            "  Sub-task #{} is IN_PROGRESS, next allowed: {}",
            design.id,
            next.join(", ")
        )?;

        writeln!(self.w)?;
        Ok(())
    }

    async fn sprint_management(&mut self) -> Result<()> {
        self.heading("4. Sprint management")?;
        let sprints = self.tracker.sprints();

        let start = Utc::now();
        let end = self.config.sprint_end(start).with_context(|| {
            format!(
                "sprint length of {} days is out of range",
                self.config.sprint_length_days
            )
        })?;
        let sprint = sprints
            .create_sprint(NewSprint::new("Sprint 1", "Authentication sprint", start, end))
            .await?;
        sprints.start_sprint(sprint.id).await?;

        for story in self.tracker.tickets().get_tickets_by_type(TicketType::Story).await {
            sprints.add_story_to_sprint(sprint.id, story.id).await?;
        }

        if let Some(active) = sprints.get_active_sprint().await {
            output::write_sprint(&mut *self.w, &active, self.output)?;
        }
        if let Some(stats) = sprints.get_sprint_statistics(sprint.id).await {
            output::write_statistics(&mut *self.w, &stats, self.output)?;
        }

        writeln!(self.w)?;
        Ok(())
    }

    async fn validation_rules(&mut self) -> Result<()> {
        self.heading("5. Validation rules")?;
        let tickets = self.tracker.tickets();
        let sprints = self.tracker.sprints();

        let epic = self.first_of(TicketType::Epic).await?;
        let outcome = sprints.add_story_to_current_sprint(epic).await;
        self.rule(outcome)?;

        let story = self.first_of(TicketType::Story).await?;
        let outcome = tickets.update_ticket_status(story, TicketStatus::Deployed).await;
        self.rule(outcome)?;

        let outcome = tickets.update_ticket_status(epic, TicketStatus::Testing).await;
        self.rule(outcome)?;

        let start = Utc::now();
        let backlog = sprints
            .create_sprint(NewSprint::new("Sprint 2", "Next sprint", start, start))
            .await?;
        let outcome = sprints.start_sprint(backlog.id).await;
        self.rule(outcome)?;

        let outcome = sprints.delete_sprint(self.active_sprint_id().await?).await;
        self.rule(outcome)?;

        writeln!(self.w)?;
        Ok(())
    }

    async fn active_sprint_id(&self) -> Result<crate::domain::SprintId> {
        self.tracker
            .sprints()
            .get_active_sprint()
            .await
            .map(|s| s.id)
            .context("demo expects an active sprint")
    }

    async fn system_state(&mut self) -> Result<()> {
        self.heading("6. Current system state")?;
        let state = self.tracker.system_state().await;
        output::write_system_state(&mut *self.w, &state, self.output)?;
        writeln!(self.w)?;
        debug!(tickets = state.tickets.len(), "Demo finished");
        Ok(())
    }
}
