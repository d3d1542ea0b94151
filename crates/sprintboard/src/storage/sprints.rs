//! Sprint store: the single active sprint and story membership.
//!
//! All sprint state, including the active sprint id, sits behind one lock.
//! The single-active-sprint check and the one-sprint-per-story scan run
//! under that lock together with the mutation they guard, so two racing
//! calls cannot both pass validation.

use super::TicketAccess;
use crate::domain::{
    NewSprint, Sprint, SprintId, SprintStatistics, Ticket, TicketId, TicketStatus, TicketType,
};
use crate::error::{Error, Result};
use crate::id_generation::IdAllocator;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Sprint state guarded by the store lock.
#[derive(Debug, Default)]
struct SprintStoreInner {
    sprints: BTreeMap<SprintId, Sprint>,

    /// The only sprint with `active == true`, if any.
    active: Option<SprintId>,
}

impl SprintStoreInner {
    /// First sprint other than `exclude` that holds the story.
    fn holder_of(&self, story_id: TicketId, exclude: Option<SprintId>) -> Option<&Sprint> {
        self.sprints
            .values()
            .filter(|sprint| Some(sprint.id) != exclude)
            .find(|sprint| sprint.contains_story(story_id))
    }
}

/// Owner of all sprints.
pub struct SprintStore {
    inner: Mutex<SprintStoreInner>,
    ids: IdAllocator,
    tickets: Arc<dyn TicketAccess>,
}

impl std::fmt::Debug for SprintStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SprintStore")
            .field("next_id", &self.ids.peek())
            .field("tickets", &"<dyn TicketAccess>")
            .finish()
    }
}

impl SprintStore {
    /// Create an empty store backed by the given ticket accessor.
    pub fn new(tickets: Arc<dyn TicketAccess>) -> Self {
        Self {
            inner: Mutex::new(SprintStoreInner::default()),
            ids: IdAllocator::new(),
            tickets,
        }
    }

    /// Create an inactive sprint with no stories.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDateRange` if the start is after the end.
    pub async fn create_sprint(&self, new_sprint: NewSprint) -> Result<Sprint> {
        if new_sprint.start_date > new_sprint.end_date {
            return Err(Error::InvalidDateRange {
                start: new_sprint.start_date,
                end: new_sprint.end_date,
            });
        }

        let mut inner = self.inner.lock().await;
        let now = Utc::now();
        let sprint = Sprint {
            id: self.ids.allocate(),
            name: new_sprint.name,
            description: new_sprint.description,
            start_date: new_sprint.start_date,
            end_date: new_sprint.end_date,
            active: false,
            story_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        inner.sprints.insert(sprint.id, sprint.clone());

        debug!(sprint = %sprint.id, name = %sprint.name, "Created sprint");
        Ok(sprint)
    }

    /// Get a sprint by id.
    pub async fn get_sprint(&self, id: SprintId) -> Option<Sprint> {
        self.inner.lock().await.sprints.get(&id).cloned()
    }

    /// All sprints, in id order.
    pub async fn get_all_sprints(&self) -> Vec<Sprint> {
        self.inner.lock().await.sprints.values().cloned().collect()
    }

    /// The active sprint, if one is running.
    pub async fn get_active_sprint(&self) -> Option<Sprint> {
        let inner = self.inner.lock().await;
        inner.active.and_then(|id| inner.sprints.get(&id).cloned())
    }

    /// Make a sprint the active one.
    ///
    /// Returns `Ok(false)` if the sprint does not exist.
    ///
    /// # Errors
    ///
    /// Returns `Error::SprintAlreadyActive` if any sprint, including this
    /// one, is already active.
    pub async fn start_sprint(&self, id: SprintId) -> Result<bool> {
        let mut inner = self.inner.lock().await;
        if !inner.sprints.contains_key(&id) {
            return Ok(false);
        }
        if let Some(active) = inner.active {
            return Err(Error::SprintAlreadyActive(active));
        }

        if let Some(sprint) = inner.sprints.get_mut(&id) {
            sprint.set_active(true);
        }
        inner.active = Some(id);

        debug!(sprint = %id, "Started sprint");
        Ok(true)
    }

    /// Deactivate the active sprint. Returns `false` if none is active.
    pub async fn end_active_sprint(&self) -> bool {
        let mut inner = self.inner.lock().await;
        let Some(active) = inner.active.take() else {
            return false;
        };

        if let Some(sprint) = inner.sprints.get_mut(&active) {
            sprint.set_active(false);
        }

        debug!(sprint = %active, "Ended sprint");
        true
    }

    /// Add a story to a sprint. Adding a story already in the sprint is a
    /// no-op that still returns `Ok(true)`.
    ///
    /// Returns `Ok(false)` if the sprint does not exist.
    ///
    /// # Errors
    ///
    /// - `Error::TicketNotFound` if the story does not exist
    /// - `Error::NotAStory` if the ticket is not a story
    /// - `Error::StoryInAnotherSprint` if any other sprint holds the story
    pub async fn add_story_to_sprint(&self, sprint_id: SprintId, story_id: TicketId) -> Result<bool> {
        let mut inner = self.inner.lock().await;
        self.add_story_locked(&mut inner, sprint_id, story_id).await
    }

    /// Remove a story from a sprint. Removing an absent story is a no-op.
    ///
    /// Returns `false` if the sprint does not exist.
    pub async fn remove_story_from_sprint(&self, sprint_id: SprintId, story_id: TicketId) -> bool {
        let mut inner = self.inner.lock().await;
        Self::remove_story_locked(&mut inner, sprint_id, story_id)
    }

    /// Add a story to the active sprint.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoActiveSprint` if no sprint is active, otherwise the
    /// errors of [`add_story_to_sprint`](Self::add_story_to_sprint).
    pub async fn add_story_to_current_sprint(&self, story_id: TicketId) -> Result<bool> {
        let mut inner = self.inner.lock().await;
        let active = inner.active.ok_or(Error::NoActiveSprint)?;
        self.add_story_locked(&mut inner, active, story_id).await
    }

    /// Remove a story from the active sprint. Returns `false` if no sprint
    /// is active.
    pub async fn remove_story_from_current_sprint(&self, story_id: TicketId) -> bool {
        let mut inner = self.inner.lock().await;
        let Some(active) = inner.active else {
            return false;
        };
        Self::remove_story_locked(&mut inner, active, story_id)
    }

    /// Stories of a sprint that still resolve to tickets, in sprint order.
    ///
    /// Empty if the sprint does not exist.
    pub async fn get_stories_in_sprint(&self, sprint_id: SprintId) -> Vec<Ticket> {
        let story_ids = match self.inner.lock().await.sprints.get(&sprint_id) {
            Some(sprint) => sprint.story_ids.clone(),
            None => return Vec::new(),
        };
        self.resolve_stories(&story_ids).await
    }

    /// Stories of the active sprint. Empty if no sprint is active.
    pub async fn get_stories_in_current_sprint(&self) -> Vec<Ticket> {
        let story_ids = {
            let inner = self.inner.lock().await;
            match inner.active.and_then(|id| inner.sprints.get(&id)) {
                Some(sprint) => sprint.story_ids.clone(),
                None => return Vec::new(),
            }
        };
        self.resolve_stories(&story_ids).await
    }

    /// Delete an inactive sprint.
    ///
    /// Returns `Ok(false)` if the sprint does not exist.
    ///
    /// # Errors
    ///
    /// Returns `Error::ActiveSprintDeletion` if the sprint is active.
    pub async fn delete_sprint(&self, id: SprintId) -> Result<bool> {
        let mut inner = self.inner.lock().await;
        let Some(sprint) = inner.sprints.get(&id) else {
            return Ok(false);
        };
        if sprint.active {
            return Err(Error::ActiveSprintDeletion(id));
        }

        inner.sprints.remove(&id);
        debug!(sprint = %id, "Deleted sprint");
        Ok(true)
    }

    /// Story counts for a sprint, computed from current ticket status.
    ///
    /// `None` if the sprint does not exist.
    pub async fn get_sprint_statistics(&self, id: SprintId) -> Option<SprintStatistics> {
        let story_ids = self.inner.lock().await.sprints.get(&id)?.story_ids.clone();
        let stories = self.resolve_stories(&story_ids).await;

        let count = |status: TicketStatus| stories.iter().filter(|t| t.status == status).count();
        Some(SprintStatistics {
            sprint_id: id,
            total_stories: stories.len(),
            completed_stories: count(TicketStatus::Deployed),
            in_progress_stories: count(TicketStatus::InProgress),
            open_stories: count(TicketStatus::Open),
        })
    }

    /// First sprint, in id order, that holds the story.
    pub async fn find_sprint_containing_story(&self, story_id: TicketId) -> Option<Sprint> {
        self.inner
            .lock()
            .await
            .holder_of(story_id, None)
            .cloned()
    }

    /// Drop every sprint, clear the active sprint and restart ids at 1.
    pub async fn clear(&self) {
        let mut inner = self.inner.lock().await;
        *inner = SprintStoreInner::default();
        self.ids.reset();
    }

    async fn add_story_locked(
        &self,
        inner: &mut SprintStoreInner,
        sprint_id: SprintId,
        story_id: TicketId,
    ) -> Result<bool> {
        if !inner.sprints.contains_key(&sprint_id) {
            return Ok(false);
        }

        let ticket = self
            .tickets
            .ticket(story_id)
            .await
            .ok_or(Error::TicketNotFound(story_id))?;
        if ticket.ticket_type != TicketType::Story {
            return Err(Error::NotAStory {
                ticket: story_id,
                ticket_type: ticket.ticket_type,
            });
        }

        if let Some(holder) = inner.holder_of(story_id, Some(sprint_id)) {
            return Err(Error::StoryInAnotherSprint {
                story: story_id,
                sprint: holder.id,
            });
        }

        if let Some(sprint) = inner.sprints.get_mut(&sprint_id) {
            sprint.add_story(story_id);
        }
        debug!(sprint = %sprint_id, story = %story_id, "Added story to sprint");
        Ok(true)
    }

    fn remove_story_locked(
        inner: &mut SprintStoreInner,
        sprint_id: SprintId,
        story_id: TicketId,
    ) -> bool {
        let Some(sprint) = inner.sprints.get_mut(&sprint_id) else {
            return false;
        };

        sprint.remove_story(story_id);
        debug!(sprint = %sprint_id, story = %story_id, "Removed story from sprint");
        true
    }

    async fn resolve_stories(&self, story_ids: &[TicketId]) -> Vec<Ticket> {
        let mut stories = Vec::with_capacity(story_ids.len());
        for id in story_ids {
            if let Some(ticket) = self.tickets.ticket(*id).await {
                stories.push(ticket);
            }
        }
        stories
    }
}
