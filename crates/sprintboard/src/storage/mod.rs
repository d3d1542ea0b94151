//! In-memory stores for tickets, sub-tasks and sprints.
//!
//! Three stores cooperate:
//!
//! - [`TicketStore`] owns tickets and enforces ticket workflows and
//!   sub-task gated closure. It has no dependencies.
//! - [`SubTaskStore`] owns sub-tasks and validates their status against the
//!   parent ticket's workflow. It keeps the parent's sub-task list current.
//! - [`SprintStore`] owns sprints, the single active sprint and story
//!   membership. It reads tickets to check that members are stories.
//!
//! The dependent stores reach tickets only through the [`TicketAccess`]
//! trait, injected at construction.
//!
//! # Thread Safety
//!
//! Each store keeps its state in an inner struct behind a
//! `tokio::sync::Mutex`. Every operation takes the lock once, validates all
//! preconditions and only then mutates, so a failed call never leaves a
//! store partially changed.
//!
//! Lock order is always dependent store first, then ticket store.
//! [`TicketStore`] never calls into another store while holding its lock.
//!
//! # Example
//!
//! ```
//! use sprintboard::domain::{NewSubTask, NewTicket, TicketStatus, TicketType};
//! use sprintboard::storage::{SubTaskStore, TicketStore};
//! use std::sync::Arc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let tickets = Arc::new(TicketStore::new());
//!     let sub_tasks = SubTaskStore::new(tickets.clone());
//!
//!     let story = tickets
//!         .create_ticket(NewTicket::new("Login", "Login page", TicketType::Story, "alice"))
//!         .await;
//!     sub_tasks
//!         .create_sub_task(NewSubTask::new(story.id, "Design UI", "", "bob"))
//!         .await?;
//!
//!     assert!(tickets.update_ticket_status(story.id, TicketStatus::InProgress).await?);
//!     Ok(())
//! }
//! ```

mod sprints;
mod sub_tasks;
mod tickets;

pub use sprints::SprintStore;
pub use sub_tasks::SubTaskStore;
pub use tickets::TicketStore;

use crate::domain::{SubTask, SubTaskId, Ticket, TicketId};
use async_trait::async_trait;

/// Read/write access to tickets for stores that depend on them.
///
/// [`TicketStore`] is the production implementation. Methods that touch a
/// specific ticket report a missing ticket through their return value
/// instead of failing.
#[async_trait]
pub trait TicketAccess: Send + Sync {
    /// Snapshot of a ticket, or `None` if it does not exist.
    async fn ticket(&self, id: TicketId) -> Option<Ticket>;

    /// Append a sub-task to its parent's list.
    ///
    /// Returns `false` if the parent does not exist.
    async fn attach_sub_task(&self, sub_task: &SubTask) -> bool;

    /// Replace the parent's copy of a sub-task with the given one.
    ///
    /// Returns `false` if the parent does not exist or does not list the
    /// sub-task.
    async fn sync_sub_task(&self, sub_task: &SubTask) -> bool;

    /// Remove a sub-task from its parent's list.
    ///
    /// Returns `false` if the parent does not exist.
    async fn detach_sub_task(&self, parent_id: TicketId, sub_task_id: SubTaskId) -> bool;
}
