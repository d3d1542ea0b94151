//! Tracker context wiring the three stores together.
//!
//! # Example
//!
//! ```
//! use sprintboard::domain::{NewTicket, TicketType};
//! use sprintboard::tracker::Tracker;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let tracker = Tracker::new();
//!     tracker
//!         .tickets()
//!         .create_ticket(NewTicket::new("Login", "", TicketType::Story, "alice"))
//!         .await;
//!
//!     let state = tracker.system_state().await;
//!     assert_eq!(state.tickets.len(), 1);
//! }
//! ```

use crate::domain::{Sprint, SubTask, Ticket};
use crate::storage::{SprintStore, SubTaskStore, TicketStore};
use serde::Serialize;
use std::sync::Arc;

/// A ticket together with the sub-tasks that name it as parent.
///
/// Serializes as the ticket alone: its own `sub_tasks` field already carries
/// the synced copies of the same sub-tasks.
#[derive(Debug, Clone, Serialize)]
pub struct TicketWithSubTasks {
    /// The ticket
    #[serde(flatten)]
    pub ticket: Ticket,

    /// Sub-tasks from the sub-task store, in id order
    #[serde(skip)]
    pub sub_tasks: Vec<SubTask>,
}

/// Snapshot of everything the tracker holds.
#[derive(Debug, Clone, Serialize)]
pub struct SystemState {
    /// All tickets, in id order
    pub tickets: Vec<TicketWithSubTasks>,

    /// The active sprint, if any
    pub active_sprint: Option<Sprint>,

    /// Stories of the active sprint that still exist
    pub active_sprint_stories: Vec<Ticket>,
}

/// Ticket, sub-task and sprint stores sharing one ticket store.
#[derive(Debug)]
pub struct Tracker {
    tickets: Arc<TicketStore>,
    sub_tasks: SubTaskStore,
    sprints: SprintStore,
}

impl Tracker {
    /// Create a tracker with empty stores.
    pub fn new() -> Self {
        let tickets = Arc::new(TicketStore::new());
        Self {
            sub_tasks: SubTaskStore::new(tickets.clone()),
            sprints: SprintStore::new(tickets.clone()),
            tickets,
        }
    }

    /// The ticket store.
    pub fn tickets(&self) -> &TicketStore {
        &self.tickets
    }

    /// The sub-task store.
    pub fn sub_tasks(&self) -> &SubTaskStore {
        &self.sub_tasks
    }

    /// The sprint store.
    pub fn sprints(&self) -> &SprintStore {
        &self.sprints
    }

    /// Collect a snapshot of all tickets, their sub-tasks and the active
    /// sprint.
    ///
    /// Each store is read separately, so a snapshot taken during concurrent
    /// writes may mix before and after states across stores.
    pub async fn system_state(&self) -> SystemState {
        let mut tickets = Vec::new();
        for ticket in self.tickets.get_all_tickets().await {
            let sub_tasks = self.sub_tasks.get_sub_tasks_for_ticket(ticket.id).await;
            tickets.push(TicketWithSubTasks { ticket, sub_tasks });
        }

        SystemState {
            tickets,
            active_sprint: self.sprints.get_active_sprint().await,
            active_sprint_stories: self.sprints.get_stories_in_current_sprint().await,
        }
    }

    /// Empty every store and restart all id counters.
    pub async fn reset(&self) {
        self.sprints.clear().await;
        self.sub_tasks.clear().await;
        self.tickets.clear().await;
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewSprint, NewSubTask, NewTicket, TicketId, TicketType};
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_stores_share_tickets() {
        let tracker = Tracker::new();
        let story = tracker
            .tickets()
            .create_ticket(NewTicket::new("Login", "", TicketType::Story, "alice"))
            .await;

        tracker
            .sub_tasks()
            .create_sub_task(NewSubTask::new(story.id, "UI", "", "bob"))
            .await
            .unwrap();
        let sprint = tracker
            .sprints()
            .create_sprint(NewSprint::new(
                "S1",
                "",
                Utc::now(),
                Utc::now() + Duration::days(14),
            ))
            .await
            .unwrap();
        tracker.sprints().start_sprint(sprint.id).await.unwrap();
        tracker
            .sprints()
            .add_story_to_current_sprint(story.id)
            .await
            .unwrap();

        let state = tracker.system_state().await;
        assert_eq!(state.tickets.len(), 1);
        assert_eq!(state.tickets[0].sub_tasks.len(), 1);
        assert_eq!(state.tickets[0].ticket.sub_tasks.len(), 1);
        assert_eq!(state.active_sprint.unwrap().id, sprint.id);
        assert_eq!(state.active_sprint_stories[0].id, story.id);
    }

    #[tokio::test]
    async fn test_state_json_lists_each_sub_task_once() {
        let tracker = Tracker::new();
        let story = tracker
            .tickets()
            .create_ticket(NewTicket::new("Login", "", TicketType::Story, "alice"))
            .await;
        let sub_task = tracker
            .sub_tasks()
            .create_sub_task(NewSubTask::new(story.id, "UI", "", "bob"))
            .await
            .unwrap();

        let json = serde_json::to_value(tracker.system_state().await).unwrap();
        let entry = &json["tickets"][0];
        assert_eq!(entry["id"], story.id.get());
        assert_eq!(entry["sub_tasks"].as_array().unwrap().len(), 1);
        assert_eq!(entry["sub_tasks"][0]["id"], sub_task.id.get());
        assert!(entry.get("sub_task_details").is_none());
        assert_eq!(json.to_string().matches("\"title\":\"UI\"").count(), 1);
    }

    #[tokio::test]
    async fn test_reset() {
        let tracker = Tracker::new();
        tracker
            .tickets()
            .create_ticket(NewTicket::new("a", "", TicketType::Epic, "alice"))
            .await;

        tracker.reset().await;

        let state = tracker.system_state().await;
        assert!(state.tickets.is_empty());
        assert!(state.active_sprint.is_none());
        let next = tracker
            .tickets()
            .create_ticket(NewTicket::new("b", "", TicketType::Epic, "alice"))
            .await;
        assert_eq!(next.id, TicketId(1));
    }
}
