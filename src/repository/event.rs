use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::RemoteApi;
use crate::db::{CommentStore, EventStore, RsvpStore, UserStore};
use crate::models::{Comment, Event, EventDto, RsvpState, User};
use crate::utils::error::{AppError, Result};

/// Outcome of one pass over the unsynced events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub attempted: usize,
    pub pushed: usize,
    pub failed: usize,
    /// Rows rewritten locally while their push was in flight. They stay
    /// pending for the next run.
    pub superseded: usize,
}

/// Events, their comments and RSVPs. Writes go to the backend first and
/// always land in the local cache, flagged unsynced when the backend could
/// not be reached.
#[derive(Clone)]
pub struct EventRepository {
    events: EventStore,
    users: UserStore,
    comments: CommentStore,
    rsvps: RsvpStore,
    remote: Arc<dyn RemoteApi>,
}

impl EventRepository {
    pub fn new(pool: SqlitePool, remote: Arc<dyn RemoteApi>) -> Self {
        Self {
            events: EventStore::new(pool.clone()),
            users: UserStore::new(pool.clone()),
            comments: CommentStore::new(pool.clone()),
            rsvps: RsvpStore::new(pool),
            remote,
        }
    }

    pub async fn all_events(&self) -> Result<Vec<Event>> {
        self.events.list().await
    }

    pub async fn event(&self, id: Uuid) -> Result<Option<Event>> {
        self.events.get(id).await
    }

    pub async fn events_created_by(&self, user_id: &str) -> Result<Vec<Event>> {
        self.events.list_by_creator(user_id).await
    }

    pub async fn events_joined_by(&self, user_id: &str) -> Result<Vec<Event>> {
        let ids = self.rsvps.joined_event_ids(user_id).await?;
        self.events.list_by_ids(&ids).await
    }

    pub async fn user(&self, id: &str) -> Result<Option<User>> {
        self.users.get(id).await
    }

    pub async fn pending_count(&self) -> Result<i64> {
        self.events.count_unsynced().await
    }

    /// Stores a new event. The returned copy's `is_synced` tells whether
    /// the backend accepted it.
    pub async fn create(&self, mut event: Event) -> Result<Event> {
        debug!(event_id = %event.id, "Saving new event");

        match self.remote.create_event(&EventDto::from(&event)).await {
            Ok(()) => {
                event.is_synced = true;
                info!(event_id = %event.id, "Event saved on server");
            }
            Err(e) => {
                event.is_synced = false;
                warn!(event_id = %event.id, error = %e, "Could not save event on server, kept offline");
            }
        }

        self.events.upsert(&event).await?;
        Ok(event)
    }

    pub async fn update(&self, mut event: Event) -> Result<Event> {
        match self.remote.update_event(&EventDto::from(&event)).await {
            Ok(()) => {
                event.is_synced = true;
                debug!(event_id = %event.id, "Event updated on server");
            }
            Err(e) => {
                event.is_synced = false;
                warn!(event_id = %event.id, error = %e, "Could not update event on server, kept offline");
            }
        }

        self.events.upsert(&event).await?;
        Ok(event)
    }

    /// Removes an event from the backend and then from the cache. Returns
    /// `false` when the backend could not be reached; the row stays.
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        match self.remote.delete_event(id).await {
            Ok(()) => self.events.delete(id).await,
            // Never pushed, or already gone upstream.
            Err(AppError::NotFound(_)) => {
                debug!(event_id = %id, "Event unknown to server, deleting locally");
                self.events.delete(id).await
            }
            Err(e) => {
                warn!(event_id = %id, error = %e, "Could not delete event on server");
                Ok(false)
            }
        }
    }

    /// Pulls the server's event list into the cache.
    pub async fn refresh(&self) -> Result<u64> {
        let remote_events = match self.remote.list_events().await {
            Ok(events) => events,
            Err(e) => {
                warn!(error = %e, "Failed to refresh events from server");
                return Err(e);
            }
        };

        let events: Vec<Event> = remote_events
            .into_iter()
            .map(EventDto::into_synced)
            .collect();
        let written = self.events.replace_from_remote(&events).await?;
        info!(received = events.len(), written, "Refreshed events from server");
        Ok(written)
    }

    /// Re-sends every unsynced event, oldest first.
    pub async fn sync_events(&self) -> Result<SyncReport> {
        let pending = self.events.list_unsynced().await?;
        let mut report = SyncReport {
            attempted: pending.len(),
            ..SyncReport::default()
        };

        for queued in &pending {
            // Deleted or written through since the listing.
            let event = match self.events.get(queued.id).await? {
                Some(event) if !event.is_synced => event,
                _ => continue,
            };

            match self.push(event).await {
                Ok(sent) => {
                    if self.events.mark_synced_if_unchanged(&sent).await? {
                        report.pushed += 1;
                    } else {
                        debug!(event_id = %sent.id, "Event changed during push, left pending");
                        report.superseded += 1;
                    }
                }
                Err(e) => {
                    warn!(event_id = %queued.id, error = %e, "Event still unsynced");
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    /// Returns the copy the server received.
    async fn push(&self, event: Event) -> Result<Event> {
        match self.remote.create_event(&EventDto::from(&event)).await {
            Ok(()) => Ok(event),
            // The server already has this id: the pending write is an edit.
            // Send what is stored now, not the copy read before the POST.
            Err(e) if e.status() == Some(409) => {
                let current = self.events.get(event.id).await?.unwrap_or(event);
                self.remote.update_event(&EventDto::from(&current)).await?;
                Ok(current)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn comments(&self, event_id: Uuid) -> Result<Vec<Comment>> {
        self.comments.list_for_event(event_id).await
    }

    /// Blank text is dropped.
    pub async fn add_comment(
        &self,
        event_id: Uuid,
        author_id: &str,
        text: &str,
    ) -> Result<Option<Comment>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let comment = Comment::new(event_id, author_id, text);
        self.comments.insert(&comment).await?;
        Ok(Some(comment))
    }

    pub async fn participants(&self, event_id: Uuid) -> Result<Vec<String>> {
        self.rsvps.participants(event_id).await
    }

    pub async fn rsvp_state(&self, event_id: Uuid, user_id: &str) -> Result<RsvpState> {
        let event = self.require(event_id).await?;
        let joined = self.rsvps.is_joined(event_id, user_id).await?;
        let count = self.rsvps.count(event_id).await?;
        Ok(RsvpState::resolve(joined, event.is_full(count)))
    }

    /// Joins or leaves. A full event cannot be joined.
    pub async fn toggle_rsvp(&self, event_id: Uuid, user_id: &str) -> Result<RsvpState> {
        match self.rsvp_state(event_id, user_id).await? {
            RsvpState::Joined => self.rsvps.leave(event_id, user_id).await?,
            RsvpState::NotJoined => self.rsvps.join(event_id, user_id).await?,
            RsvpState::Full => {
                debug!(event_id = %event_id, "Event is full, RSVP unchanged");
                return Ok(RsvpState::Full);
            }
        }
        self.rsvp_state(event_id, user_id).await
    }

    async fn require(&self, id: Uuid) -> Result<Event> {
        self.events
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event with id '{}' was not found", id)))
    }
}
