//! Sub-task store.
//!
//! Sub-tasks are validated against their parent ticket's workflow. Every
//! mutation is mirrored into the parent's sub-task list through
//! [`TicketAccess`], which is what lets the ticket store gate closure on
//! live sub-task status.

use super::TicketAccess;
use crate::domain::{NewSubTask, SubTask, SubTaskId, TicketId, TicketStatus};
use crate::error::{Error, Result};
use crate::id_generation::IdAllocator;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Owner of all sub-tasks.
pub struct SubTaskStore {
    sub_tasks: Mutex<BTreeMap<SubTaskId, SubTask>>,
    ids: IdAllocator,
    tickets: Arc<dyn TicketAccess>,
}

impl std::fmt::Debug for SubTaskStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubTaskStore")
            .field("next_id", &self.ids.peek())
            .field("tickets", &"<dyn TicketAccess>")
            .finish()
    }
}

impl SubTaskStore {
    /// Create an empty store backed by the given ticket accessor.
    pub fn new(tickets: Arc<dyn TicketAccess>) -> Self {
        Self {
            sub_tasks: Mutex::new(BTreeMap::new()),
            ids: IdAllocator::new(),
            tickets,
        }
    }

    /// Create a sub-task in `OPEN` and append it to its parent ticket.
    ///
    /// # Errors
    ///
    /// Returns `Error::ParentNotFound` if the parent ticket does not exist.
    pub async fn create_sub_task(&self, new_sub_task: NewSubTask) -> Result<SubTask> {
        let mut sub_tasks = self.sub_tasks.lock().await;

        let parent_id = new_sub_task.parent_id;
        if self.tickets.ticket(parent_id).await.is_none() {
            return Err(Error::ParentNotFound(parent_id));
        }

        let now = Utc::now();
        let sub_task = SubTask {
            id: self.ids.allocate(),
            parent_id,
            title: new_sub_task.title,
            description: new_sub_task.description,
            status: TicketStatus::Open,
            assignee: new_sub_task.assignee,
            created_at: now,
            updated_at: now,
            version: 1,
        };

        // The parent can vanish between the lookup and the attach.
        if !self.tickets.attach_sub_task(&sub_task).await {
            return Err(Error::ParentNotFound(parent_id));
        }
        sub_tasks.insert(sub_task.id, sub_task.clone());

        debug!(sub_task = %sub_task.id, parent = %parent_id, "Created sub-task");
        Ok(sub_task)
    }

    /// Get a sub-task by id.
    pub async fn get_sub_task(&self, id: SubTaskId) -> Option<SubTask> {
        self.sub_tasks.lock().await.get(&id).cloned()
    }

    /// All sub-tasks, in id order.
    pub async fn get_all_sub_tasks(&self) -> Vec<SubTask> {
        self.sub_tasks.lock().await.values().cloned().collect()
    }

    /// Sub-tasks whose parent is `ticket_id`, including orphans of a deleted
    /// ticket with that id.
    pub async fn get_sub_tasks_for_ticket(&self, ticket_id: TicketId) -> Vec<SubTask> {
        self.sub_tasks
            .lock()
            .await
            .values()
            .filter(|st| st.parent_id == ticket_id)
            .cloned()
            .collect()
    }

    /// Sub-tasks assigned to exactly `assignee`.
    pub async fn get_sub_tasks_by_assignee(&self, assignee: &str) -> Vec<SubTask> {
        self.sub_tasks
            .lock()
            .await
            .values()
            .filter(|st| st.assignee == assignee)
            .cloned()
            .collect()
    }

    /// Move a sub-task to a new status using its parent's workflow.
    ///
    /// Returns `Ok(false)` if the sub-task does not exist.
    ///
    /// # Errors
    ///
    /// - `Error::OrphanedSubTask` if the parent ticket has been deleted
    /// - `Error::InvalidTransition` if the parent's workflow does not allow
    ///   the move from the sub-task's current status
    pub async fn update_sub_task_status(
        &self,
        id: SubTaskId,
        new_status: TicketStatus,
    ) -> Result<bool> {
        let mut sub_tasks = self.sub_tasks.lock().await;
        let Some(sub_task) = sub_tasks.get_mut(&id) else {
            return Ok(false);
        };

        let Some(parent) = self.tickets.ticket(sub_task.parent_id).await else {
            return Err(Error::OrphanedSubTask(id));
        };

        let parent_type = parent.ticket_type;
        if !parent_type.can_transition(sub_task.status, new_status) {
            return Err(Error::InvalidTransition {
                ticket_type: parent_type,
                from: sub_task.status,
                to: new_status,
            });
        }

        let mut updated = sub_task.clone();
        updated.status = new_status;
        updated.touch();

        // The parent can vanish between the lookup and the sync.
        if !self.tickets.sync_sub_task(&updated).await {
            return Err(Error::OrphanedSubTask(id));
        }

        let previous = std::mem::replace(sub_task, updated).status;
        debug!(
            sub_task = %id,
            from = %previous,
            to = %new_status,
            version = sub_task.version,
            "Updated sub-task status"
        );
        Ok(true)
    }

    /// Reassign a sub-task. Returns `false` if it does not exist.
    ///
    /// Orphaned sub-tasks can still be reassigned.
    pub async fn update_sub_task_assignee(
        &self,
        id: SubTaskId,
        assignee: impl Into<String>,
    ) -> bool {
        let mut sub_tasks = self.sub_tasks.lock().await;
        let Some(sub_task) = sub_tasks.get_mut(&id) else {
            return false;
        };

        sub_task.assignee = assignee.into();
        sub_task.touch();
        if !self.tickets.sync_sub_task(sub_task).await {
            warn!(sub_task = %id, parent = %sub_task.parent_id, "Reassigned orphaned sub-task");
        }

        debug!(sub_task = %id, assignee = %sub_task.assignee, "Updated sub-task assignee");
        true
    }

    /// Remove a sub-task from the store and from its parent, if the parent
    /// still exists. Returns `true` iff the sub-task existed.
    pub async fn delete_sub_task(&self, id: SubTaskId) -> bool {
        let mut sub_tasks = self.sub_tasks.lock().await;
        let Some(sub_task) = sub_tasks.remove(&id) else {
            return false;
        };

        self.tickets.detach_sub_task(sub_task.parent_id, id).await;
        debug!(sub_task = %id, parent = %sub_task.parent_id, "Deleted sub-task");
        true
    }

    /// Statuses the sub-task may move to next under its parent's workflow.
    ///
    /// Empty if the sub-task or its parent does not exist.
    pub async fn get_valid_next_statuses(&self, id: SubTaskId) -> Vec<TicketStatus> {
        let Some(sub_task) = self.get_sub_task(id).await else {
            return Vec::new();
        };
        let Some(parent) = self.tickets.ticket(sub_task.parent_id).await else {
            return Vec::new();
        };

        parent.ticket_type.valid_next_statuses(sub_task.status)
    }

    /// Drop every sub-task, detach them from surviving parents and restart
    /// ids at 1.
    pub async fn clear(&self) {
        let mut sub_tasks = self.sub_tasks.lock().await;
        for (id, sub_task) in std::mem::take(&mut *sub_tasks) {
            self.tickets.detach_sub_task(sub_task.parent_id, id).await;
        }
        self.ids.reset();
    }
}
