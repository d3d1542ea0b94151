//! Domain types for sprint tracking.
//!
//! This module contains the entities managed by the stores: tickets (stories,
//! epics and on-call tickets), their sub-tasks, and sprints. Entities handed
//! out by a store are snapshots; mutating them never changes store state.

pub mod workflow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Returns the raw numeric value.
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

numeric_id!(
    /// Unique identifier for a ticket
    TicketId
);

numeric_id!(
    /// Unique identifier for a sub-task (separate counter space from tickets)
    SubTaskId
);

numeric_id!(
    /// Unique identifier for a sprint
    SprintId
);

/// Kind of ticket. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketType {
    /// Deliverable user-facing work, the only type allowed in sprints
    Story,

    /// Large body of work
    Epic,

    /// Production incident handled by the on-call rotation
    OnCall,
}

impl TicketType {
    /// All ticket types, in declaration order.
    pub const ALL: [TicketType; 3] = [TicketType::Story, TicketType::Epic, TicketType::OnCall];

    /// Boundary spelling (`STORY`, `EPIC`, `ON_CALL`).
    pub fn as_str(self) -> &'static str {
        match self {
            TicketType::Story => "STORY",
            TicketType::Epic => "EPIC",
            TicketType::OnCall => "ON_CALL",
        }
    }
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        TicketType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| {
                format!("Invalid ticket type: '{s}'. Must be one of: STORY, EPIC, ON_CALL")
            })
    }
}

/// Status shared by tickets and sub-tasks.
///
/// Which statuses a ticket can actually reach depends on its type; see
/// [`workflow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    /// Not started
    Open,

    /// Being worked on
    InProgress,

    /// Under test (stories only)
    Testing,

    /// Under code review (stories only)
    InReview,

    /// Shipped, final status for stories
    Deployed,

    /// Done, final status for epics
    Completed,

    /// Fixed, final status for on-call tickets
    Resolved,
}

impl TicketStatus {
    /// All statuses, in declaration order.
    pub const ALL: [TicketStatus; 7] = [
        TicketStatus::Open,
        TicketStatus::InProgress,
        TicketStatus::Testing,
        TicketStatus::InReview,
        TicketStatus::Deployed,
        TicketStatus::Completed,
        TicketStatus::Resolved,
    ];

    /// Boundary spelling (`OPEN`, `IN_PROGRESS`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            TicketStatus::Open => "OPEN",
            TicketStatus::InProgress => "IN_PROGRESS",
            TicketStatus::Testing => "TESTING",
            TicketStatus::InReview => "IN_REVIEW",
            TicketStatus::Deployed => "DEPLOYED",
            TicketStatus::Completed => "COMPLETED",
            TicketStatus::Resolved => "RESOLVED",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        TicketStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| {
                let allowed: Vec<&str> = TicketStatus::ALL.iter().map(|st| st.as_str()).collect();
                format!("Invalid status: '{s}'. Allowed values: {}", allowed.join(", "))
            })
    }
}

/// A top-level unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    /// Unique identifier
    pub id: TicketId,

    /// Ticket title
    pub title: String,

    /// Ticket description
    pub description: String,

    /// Ticket type
    pub ticket_type: TicketType,

    /// Current status
    pub status: TicketStatus,

    /// Assignee
    pub assignee: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// Comments, oldest first
    pub comments: Vec<String>,

    /// Owned sub-tasks, in creation order.
    ///
    /// The sub-task store keeps these entries current whenever a sub-task
    /// changes, so they always carry the live sub-task status.
    pub sub_tasks: Vec<SubTask>,
}

impl Ticket {
    /// The status that marks this ticket as done.
    pub fn final_status(&self) -> TicketStatus {
        self.ticket_type.final_status()
    }

    /// Returns true when there are no sub-tasks or every sub-task has
    /// reached this ticket's final status.
    pub fn all_sub_tasks_completed(&self) -> bool {
        let final_status = self.final_status();
        self.sub_tasks.iter().all(|st| st.status == final_status)
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// A child unit of work under exactly one ticket.
///
/// Its status is validated against the parent ticket's workflow, not a
/// workflow of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubTask {
    /// Unique identifier
    pub id: SubTaskId,

    /// Parent ticket
    pub parent_id: TicketId,

    /// Sub-task title
    pub title: String,

    /// Sub-task description
    pub description: String,

    /// Current status
    pub status: TicketStatus,

    /// Assignee
    pub assignee: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// Starts at 1, bumped on every mutation
    pub version: u64,
}

impl SubTask {
    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
        self.version += 1;
    }
}

/// A time-boxed container of stories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprint {
    /// Unique identifier
    pub id: SprintId,

    /// Sprint name
    pub name: String,

    /// Sprint description
    pub description: String,

    /// Start of the sprint (never after `end_date`)
    pub start_date: DateTime<Utc>,

    /// End of the sprint
    pub end_date: DateTime<Utc>,

    /// Whether this is the active sprint
    pub active: bool,

    /// Story ticket ids, in insertion order, without duplicates
    pub story_ids: Vec<TicketId>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Sprint {
    /// Returns true if the story is a member of this sprint.
    pub fn contains_story(&self, story_id: TicketId) -> bool {
        self.story_ids.contains(&story_id)
    }

    /// Number of stories in this sprint.
    pub fn story_count(&self) -> usize {
        self.story_ids.len()
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
        self.updated_at = Utc::now();
    }

    pub(crate) fn add_story(&mut self, story_id: TicketId) {
        if !self.contains_story(story_id) {
            self.story_ids.push(story_id);
            self.updated_at = Utc::now();
        }
    }

    pub(crate) fn remove_story(&mut self, story_id: TicketId) {
        self.story_ids.retain(|id| *id != story_id);
        self.updated_at = Utc::now();
    }
}

/// Aggregated story counts for one sprint, computed from live ticket status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SprintStatistics {
    /// The sprint the counts belong to
    pub sprint_id: SprintId,

    /// Stories that still resolve to a ticket
    pub total_stories: usize,

    /// Stories in `DEPLOYED`
    pub completed_stories: usize,

    /// Stories in `IN_PROGRESS`
    pub in_progress_stories: usize,

    /// Stories in `OPEN`
    pub open_stories: usize,
}

/// Data for creating a new ticket
#[derive(Debug, Clone)]
pub struct NewTicket {
    /// Ticket title
    pub title: String,

    /// Ticket description
    pub description: String,

    /// Ticket type
    pub ticket_type: TicketType,

    /// Assignee
    pub assignee: String,
}

impl NewTicket {
    /// Convenience constructor.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        ticket_type: TicketType,
        assignee: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ticket_type,
            assignee: assignee.into(),
        }
    }
}

/// Data for creating a new sub-task
#[derive(Debug, Clone)]
pub struct NewSubTask {
    /// Parent ticket, which must exist
    pub parent_id: TicketId,

    /// Sub-task title
    pub title: String,

    /// Sub-task description
    pub description: String,

    /// Assignee
    pub assignee: String,
}

impl NewSubTask {
    /// Convenience constructor.
    pub fn new(
        parent_id: TicketId,
        title: impl Into<String>,
        description: impl Into<String>,
        assignee: impl Into<String>,
    ) -> Self {
        Self {
            parent_id,
            title: title.into(),
            description: description.into(),
            assignee: assignee.into(),
        }
    }
}

/// Data for creating a new sprint
#[derive(Debug, Clone)]
pub struct NewSprint {
    /// Sprint name
    pub name: String,

    /// Sprint description
    pub description: String,

    /// Sprint start
    pub start_date: DateTime<Utc>,

    /// Sprint end
    pub end_date: DateTime<Utc>,
}

impl NewSprint {
    /// Convenience constructor.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            start_date,
            end_date,
        }
    }
}
