//! Ticket store: creation, lookup, workflow validation and gated closure.

use super::TicketAccess;
use crate::domain::{NewTicket, SubTask, SubTaskId, Ticket, TicketId, TicketStatus, TicketType};
use crate::error::{Error, Result};
use crate::id_generation::IdAllocator;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::Mutex;
use tracing::{debug, trace};

/// Owner of all tickets.
///
/// Tickets are kept in id order, so listing operations return them oldest
/// first.
#[derive(Debug, Default)]
pub struct TicketStore {
    tickets: Mutex<BTreeMap<TicketId, Ticket>>,
    ids: IdAllocator,
}

impl TicketStore {
    /// Create an empty store whose first ticket gets id 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ticket in `OPEN` with no comments or sub-tasks.
    pub async fn create_ticket(&self, new_ticket: NewTicket) -> Ticket {
        let mut tickets = self.tickets.lock().await;

        let now = Utc::now();
        let ticket = Ticket {
            id: self.ids.allocate(),
            title: new_ticket.title,
            description: new_ticket.description,
            ticket_type: new_ticket.ticket_type,
            status: TicketStatus::Open,
            assignee: new_ticket.assignee,
            created_at: now,
            updated_at: now,
            comments: Vec::new(),
            sub_tasks: Vec::new(),
        };
        tickets.insert(ticket.id, ticket.clone());

        debug!(ticket = %ticket.id, ticket_type = %ticket.ticket_type, "Created ticket");
        ticket
    }

    /// Get a ticket by id.
    pub async fn get_ticket(&self, id: TicketId) -> Option<Ticket> {
        trace!(ticket = %id, "Looking up ticket");
        self.tickets.lock().await.get(&id).cloned()
    }

    /// All tickets, in id order.
    pub async fn get_all_tickets(&self) -> Vec<Ticket> {
        self.tickets.lock().await.values().cloned().collect()
    }

    /// All tickets of one type, in id order.
    pub async fn get_tickets_by_type(&self, ticket_type: TicketType) -> Vec<Ticket> {
        self.tickets
            .lock()
            .await
            .values()
            .filter(|ticket| ticket.ticket_type == ticket_type)
            .cloned()
            .collect()
    }

    /// Move a ticket to a new status.
    ///
    /// Returns `Ok(false)` if the ticket does not exist.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidTransition` if the ticket's workflow does not allow
    ///   the move from its current status
    /// - `Error::IncompleteSubTasks` if `new_status` is the final status and
    ///   some sub-task has not reached it
    pub async fn update_ticket_status(&self, id: TicketId, new_status: TicketStatus) -> Result<bool> {
        let mut tickets = self.tickets.lock().await;
        let Some(ticket) = tickets.get_mut(&id) else {
            return Ok(false);
        };

        if !ticket.ticket_type.can_transition(ticket.status, new_status) {
            return Err(Error::InvalidTransition {
                ticket_type: ticket.ticket_type,
                from: ticket.status,
                to: new_status,
            });
        }

        if new_status == ticket.final_status() && !ticket.all_sub_tasks_completed() {
            return Err(Error::IncompleteSubTasks(id));
        }

        let previous = ticket.status;
        ticket.status = new_status;
        ticket.touch();

        debug!(ticket = %id, from = %previous, to = %new_status, "Updated ticket status");
        Ok(true)
    }

    /// Reassign a ticket. Returns `false` if the ticket does not exist.
    pub async fn update_ticket_assignee(&self, id: TicketId, assignee: impl Into<String>) -> bool {
        let mut tickets = self.tickets.lock().await;
        let Some(ticket) = tickets.get_mut(&id) else {
            return false;
        };

        ticket.assignee = assignee.into();
        ticket.touch();
        debug!(ticket = %id, assignee = %ticket.assignee, "Updated ticket assignee");
        true
    }

    /// Append a comment. Returns `false` if the ticket does not exist.
    pub async fn add_comment(&self, id: TicketId, text: impl Into<String>) -> bool {
        let mut tickets = self.tickets.lock().await;
        let Some(ticket) = tickets.get_mut(&id) else {
            return false;
        };

        ticket.comments.push(text.into());
        ticket.touch();
        debug!(ticket = %id, comments = ticket.comments.len(), "Added comment");
        true
    }

    /// Remove a ticket. Returns `true` iff it existed.
    ///
    /// Sub-tasks of the ticket stay in the sub-task store and become
    /// orphans.
    pub async fn delete_ticket(&self, id: TicketId) -> bool {
        let removed = self.tickets.lock().await.remove(&id);
        if let Some(ticket) = &removed {
            debug!(ticket = %id, orphaned_sub_tasks = ticket.sub_tasks.len(), "Deleted ticket");
        }
        removed.is_some()
    }

    /// Drop every ticket and restart ids at 1.
    pub async fn clear(&self) {
        let mut tickets = self.tickets.lock().await;
        tickets.clear();
        self.ids.reset();
    }
}

#[async_trait]
impl TicketAccess for TicketStore {
    async fn ticket(&self, id: TicketId) -> Option<Ticket> {
        self.get_ticket(id).await
    }

    async fn attach_sub_task(&self, sub_task: &SubTask) -> bool {
        let mut tickets = self.tickets.lock().await;
        let Some(parent) = tickets.get_mut(&sub_task.parent_id) else {
            return false;
        };

        parent.sub_tasks.push(sub_task.clone());
        parent.touch();
        true
    }

    async fn sync_sub_task(&self, sub_task: &SubTask) -> bool {
        let mut tickets = self.tickets.lock().await;
        let Some(parent) = tickets.get_mut(&sub_task.parent_id) else {
            return false;
        };
        let Some(slot) = parent.sub_tasks.iter_mut().find(|st| st.id == sub_task.id) else {
            return false;
        };

        *slot = sub_task.clone();
        parent.touch();
        true
    }

    async fn detach_sub_task(&self, parent_id: TicketId, sub_task_id: SubTaskId) -> bool {
        let mut tickets = self.tickets.lock().await;
        let Some(parent) = tickets.get_mut(&parent_id) else {
            return false;
        };

        parent.sub_tasks.retain(|st| st.id != sub_task_id);
        parent.touch();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn story(title: &str) -> NewTicket {
        NewTicket::new(title, "Test description", TicketType::Story, "alice")
    }

    async fn drive(store: &TicketStore, id: TicketId, path: &[TicketStatus]) {
        for status in path {
            assert!(store.update_ticket_status(id, *status).await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_create_ticket() {
        let store = TicketStore::new();

        let ticket = store.create_ticket(story("Login")).await;

        assert_eq!(ticket.id, TicketId(1));
        assert_eq!(ticket.status, TicketStatus::Open);
        assert_eq!(ticket.ticket_type, TicketType::Story);
        assert!(ticket.comments.is_empty());
        assert!(ticket.sub_tasks.is_empty());
        assert_eq!(ticket.created_at, ticket.updated_at);
    }

    #[tokio::test]
    async fn test_ids_increase_per_store() {
        let first = TicketStore::new();
        let second = TicketStore::new();

        let a = first.create_ticket(story("a")).await;
        let b = first.create_ticket(story("b")).await;
        let c = second.create_ticket(story("c")).await;

        assert_eq!((a.id, b.id, c.id), (TicketId(1), TicketId(2), TicketId(1)));
    }

    #[tokio::test]
    async fn test_get_missing_ticket() {
        let store = TicketStore::new();
        assert!(store.get_ticket(TicketId(42)).await.is_none());
    }

    #[tokio::test]
    async fn test_listing_returns_snapshots() {
        let store = TicketStore::new();
        let created = store.create_ticket(story("Login")).await;

        let mut all = store.get_all_tickets().await;
        all[0].title = "changed".to_string();
        all.clear();

        let stored = store.get_ticket(created.id).await.unwrap();
        assert_eq!(stored.title, "Login");
        assert_eq!(store.get_all_tickets().await.len(), 1);
    }

    #[tokio::test]
    async fn test_get_tickets_by_type() {
        let store = TicketStore::new();
        store.create_ticket(story("s1")).await;
        store
            .create_ticket(NewTicket::new("e", "", TicketType::Epic, "bob"))
            .await;
        store.create_ticket(story("s2")).await;

        let stories = store.get_tickets_by_type(TicketType::Story).await;
        let titles: Vec<_> = stories.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["s1", "s2"]);
        assert!(store.get_tickets_by_type(TicketType::OnCall).await.is_empty());
    }

    #[tokio::test]
    async fn test_update_status_missing_ticket() {
        let store = TicketStore::new();
        let updated = store
            .update_ticket_status(TicketId(7), TicketStatus::InProgress)
            .await
            .unwrap();
        assert!(!updated);
    }

    #[tokio::test]
    async fn test_invalid_transition_leaves_status() {
        let store = TicketStore::new();
        let ticket = store.create_ticket(story("Login")).await;

        let err = store
            .update_ticket_status(ticket.id, TicketStatus::Testing)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvalidTransition { .. }));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let stored = store.get_ticket(ticket.id).await.unwrap();
        assert_eq!(stored.status, TicketStatus::Open);
    }

    #[tokio::test]
    async fn test_self_transition_rejected() {
        let store = TicketStore::new();
        let ticket = store.create_ticket(story("Login")).await;

        let result = store.update_ticket_status(ticket.id, TicketStatus::Open).await;
        assert!(matches!(result, Err(Error::InvalidTransition { .. })));
    }

    #[tokio::test]
    async fn test_story_full_workflow() {
        let store = TicketStore::new();
        let ticket = store.create_ticket(story("Login")).await;

        drive(
            &store,
            ticket.id,
            &[
                TicketStatus::InProgress,
                TicketStatus::Testing,
                TicketStatus::InReview,
                TicketStatus::Deployed,
            ],
        )
        .await;

        let stored = store.get_ticket(ticket.id).await.unwrap();
        assert_eq!(stored.status, TicketStatus::Deployed);
        assert!(stored.updated_at >= stored.created_at);

        let again = store
            .update_ticket_status(ticket.id, TicketStatus::InReview)
            .await;
        assert!(matches!(again, Err(Error::InvalidTransition { .. })));
    }

    #[tokio::test]
    async fn test_closure_blocked_by_attached_sub_task() {
        let store = TicketStore::new();
        let ticket = store
            .create_ticket(NewTicket::new("Outage", "", TicketType::OnCall, "ops"))
            .await;

        let now = Utc::now();
        let mut sub_task = SubTask {
            id: SubTaskId(1),
            parent_id: ticket.id,
            title: "Rollback".to_string(),
            description: String::new(),
            status: TicketStatus::Open,
            assignee: "ops".to_string(),
            created_at: now,
            updated_at: now,
            version: 1,
        };
        assert!(store.attach_sub_task(&sub_task).await);

        drive(&store, ticket.id, &[TicketStatus::InProgress]).await;
        let err = store
            .update_ticket_status(ticket.id, TicketStatus::Resolved)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::IncompleteSubTasks(id) if id == ticket.id));
        assert_eq!(err.kind(), ErrorKind::InvalidState);

        sub_task.status = TicketStatus::Resolved;
        let before = store.get_ticket(ticket.id).await.unwrap().updated_at;
        std::thread::sleep(std::time::Duration::from_millis(2));
        assert!(store.sync_sub_task(&sub_task).await);
        let synced = store.get_ticket(ticket.id).await.unwrap();
        assert!(synced.updated_at > before);
        assert_eq!(synced.sub_tasks[0].status, TicketStatus::Resolved);
        assert!(
            store
                .update_ticket_status(ticket.id, TicketStatus::Resolved)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_assignee_and_comments() {
        let store = TicketStore::new();
        let ticket = store.create_ticket(story("Login")).await;

        assert!(store.update_ticket_assignee(ticket.id, "bob").await);
        assert!(store.add_comment(ticket.id, "first").await);
        assert!(store.add_comment(ticket.id, "second").await);
        assert!(!store.update_ticket_assignee(TicketId(99), "bob").await);
        assert!(!store.add_comment(TicketId(99), "lost").await);

        let stored = store.get_ticket(ticket.id).await.unwrap();
        assert_eq!(stored.assignee, "bob");
        assert_eq!(stored.comments, vec!["first", "second"]);
        assert!(stored.updated_at >= ticket.updated_at);
    }

    #[tokio::test]
    async fn test_delete_ticket() {
        let store = TicketStore::new();
        let ticket = store.create_ticket(story("Login")).await;

        assert!(store.delete_ticket(ticket.id).await);
        assert!(!store.delete_ticket(ticket.id).await);
        assert!(store.get_ticket(ticket.id).await.is_none());
    }

    #[tokio::test]
    async fn test_access_on_missing_parent() {
        let store = TicketStore::new();
        let now = Utc::now();
        let orphan = SubTask {
            id: SubTaskId(1),
            parent_id: TicketId(5),
            title: "x".to_string(),
            description: String::new(),
            status: TicketStatus::Open,
            assignee: String::new(),
            created_at: now,
            updated_at: now,
            version: 1,
        };

        assert!(!store.attach_sub_task(&orphan).await);
        assert!(!store.sync_sub_task(&orphan).await);
        assert!(!store.detach_sub_task(TicketId(5), SubTaskId(1)).await);
    }

    #[tokio::test]
    async fn test_clear_resets_ids() {
        let store = TicketStore::new();
        store.create_ticket(story("a")).await;
        store.create_ticket(story("b")).await;

        store.clear().await;

        assert!(store.get_all_tickets().await.is_empty());
        assert_eq!(store.create_ticket(story("c")).await.id, TicketId(1));
    }
}
