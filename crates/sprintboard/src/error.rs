//! Error types for sprintboard operations.
//!
//! Lookups that miss are not errors: stores report them as `None` or
//! `false`. The variants here are the recoverable failures a caller is
//! expected to render and recover from.

use crate::domain::{SprintId, SubTaskId, TicketId, TicketStatus, TicketType};
use chrono::{DateTime, Utc};
use std::io;
use thiserror::Error;

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request itself is malformed (bad transition, wrong ticket type, ...)
    InvalidArgument,

    /// The request is well-formed but the current state forbids it
    InvalidState,

    /// Configuration or I/O failure outside the domain
    Environment,
}

/// The error type for sprintboard operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Status change not present in the type's transition table.
    #[error("Invalid status transition from {from} to {to} for ticket type {ticket_type}")]
    InvalidTransition {
        /// Workflow the transition was checked against
        ticket_type: TicketType,
        /// Current status
        from: TicketStatus,
        /// Requested status
        to: TicketStatus,
    },

    /// Ticket cannot reach its final status while sub-tasks are open.
    #[error("Cannot close ticket {0} - mark all sub-tasks completed to change status")]
    IncompleteSubTasks(TicketId),

    /// Sub-task creation referenced a ticket that does not exist.
    #[error("Parent ticket not found: {0}")]
    ParentNotFound(TicketId),

    /// Sub-task outlived its parent ticket.
    #[error("Parent ticket not found for sub-task: {0}")]
    OrphanedSubTask(SubTaskId),

    /// Referenced ticket does not exist.
    #[error("Ticket not found: {0}")]
    TicketNotFound(TicketId),

    /// Only stories can be planned into sprints.
    #[error(
        "Only Story tickets can be added to sprints. Ticket {ticket} is of type: {ticket_type}"
    )]
    NotAStory {
        /// Offending ticket
        ticket: TicketId,
        /// Its actual type
        ticket_type: TicketType,
    },

    /// Sprint start is after its end.
    #[error("Start date cannot be after end date ({start} > {end})")]
    InvalidDateRange {
        /// Requested start
        start: DateTime<Utc>,
        /// Requested end
        end: DateTime<Utc>,
    },

    /// A sprint is already running.
    #[error("Cannot start sprint - another sprint is already active: {0}")]
    SprintAlreadyActive(SprintId),

    /// Story is planned into a different sprint.
    #[error("Story {story} is already in sprint {sprint}")]
    StoryInAnotherSprint {
        /// Story being added
        story: TicketId,
        /// Sprint that already holds it
        sprint: SprintId,
    },

    /// Operation needs an active sprint and there is none.
    #[error("No active sprint to add story to")]
    NoActiveSprint,

    /// Active sprints must be ended before deletion.
    #[error("Cannot delete active sprint: {0}")]
    ActiveSprintDeletion(SprintId),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidTransition { .. }
            | Error::ParentNotFound(_)
            | Error::TicketNotFound(_)
            | Error::NotAStory { .. }
            | Error::InvalidDateRange { .. } => ErrorKind::InvalidArgument,
            Error::IncompleteSubTasks(_)
            | Error::OrphanedSubTask(_)
            | Error::SprintAlreadyActive(_)
            | Error::StoryInAnotherSprint { .. }
            | Error::NoActiveSprint
            | Error::ActiveSprintDeletion(_) => ErrorKind::InvalidState,
            Error::Config(_) | Error::Io(_) => ErrorKind::Environment,
        }
    }
}

/// A specialized Result type for sprintboard operations.
pub type Result<T> = std::result::Result<T, Error>;
