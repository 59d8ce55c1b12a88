use tokio::sync::watch;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::event::{parse_date, parse_time};
use crate::models::{Event, EventDraft};
use crate::repository::{EventRepository, UserRepository};
use crate::state::StateStore;
use crate::utils::error::{AppError, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Form fields as typed. Conversion happens on submit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventForm {
    pub title: String,
    pub description: String,
    pub game_type: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub max_participants: String,
}

impl EventForm {
    pub fn from_event(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            description: event.description.clone(),
            game_type: event.game_type.clone(),
            date: event.date.format(DATE_FORMAT).to_string(),
            time: event.time.format("%H:%M").to_string(),
            location: event.location.clone(),
            max_participants: event.max_participants.to_string(),
        }
    }

    /// Blank or non-numeric capacity is read as unlimited.
    pub fn to_draft(&self) -> Result<EventDraft> {
        let date = parse_date(&self.date).ok_or_else(|| {
            AppError::ValidationError(format!("Invalid date '{}', expected YYYY-MM-DD", self.date))
        })?;
        let time = parse_time(&self.time).ok_or_else(|| {
            AppError::ValidationError(format!("Invalid time '{}', expected HH:MM", self.time))
        })?;

        Ok(EventDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            game_type: self.game_type.clone(),
            date,
            time,
            location: self.location.clone(),
            max_participants: self.max_participants.trim().parse().unwrap_or(0),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateEventState {
    pub form: EventForm,
    pub editing_id: Option<Uuid>,
    pub is_loading: bool,
    pub event_saved: bool,
    pub saved_event_id: Option<Uuid>,
    /// The save only reached the local cache.
    pub saved_offline: bool,
    pub error_message: Option<String>,
}

pub struct CreateEventViewModel {
    events: EventRepository,
    users: UserRepository,
    state: StateStore<CreateEventState>,
}

impl CreateEventViewModel {
    pub fn new(events: EventRepository, users: UserRepository) -> Self {
        Self {
            events,
            users,
            state: StateStore::default(),
        }
    }

    pub fn state(&self) -> CreateEventState {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<CreateEventState> {
        self.state.subscribe()
    }

    pub fn update_form(&self, edit: impl FnOnce(&mut EventForm)) {
        self.state.update(|s| {
            edit(&mut s.form);
            s.error_message = None;
        });
    }

    /// Prefills the form with a cached event and switches submit to update.
    pub async fn load_for_edit(&self, id: Uuid) {
        self.state.update(|s| s.is_loading = true);

        let result = self.events.event(id).await;
        self.state.update(|s| {
            s.is_loading = false;
            match result {
                Ok(Some(event)) => {
                    s.form = EventForm::from_event(&event);
                    s.editing_id = Some(event.id);
                }
                Ok(None) => s.error_message = Some("Event not found".to_string()),
                Err(e) => s.error_message = Some(e.user_message()),
            }
        });
    }

    pub async fn submit(&self) {
        self.state.update(|s| {
            s.is_loading = true;
            s.error_message = None;
        });

        let result = self.save().await;
        self.state.update(|s| {
            s.is_loading = false;
            match result {
                Ok(event) => {
                    s.event_saved = true;
                    s.saved_event_id = Some(event.id);
                    s.saved_offline = !event.is_synced;
                }
                Err(e) => s.error_message = Some(e.user_message()),
            }
        });
    }

    async fn save(&self) -> Result<Event> {
        let CreateEventState {
            form, editing_id, ..
        } = self.state.snapshot();
        let draft = form.to_draft()?;

        if let Some(id) = editing_id {
            let existing = self
                .events
                .event(id)
                .await?
                .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
            return self.events.update(existing.with_draft(draft)).await;
        }

        let creator = self.users.current_user_id().await?.ok_or_else(|| {
            warn!("Event submitted without a session");
            AppError::AuthError("You need to log in to create events".to_string())
        })?;
        let event = self.events.create(Event::new(draft, creator)).await?;
        info!(event_id = %event.id, synced = event.is_synced, "Event created");
        Ok(event)
    }

    /// Clears the one-shot save flags once the shell has navigated away.
    pub fn reset_navigation_state(&self) {
        self.state.update(|s| {
            s.event_saved = false;
            s.saved_event_id = None;
            s.saved_offline = false;
        });
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use super::*;
    use crate::app::testing::{app, logged_in_app};
    use crate::models::event::fixtures::event;

    fn fill(form: &mut EventForm) {
        form.title = "Torneo Pokemon".to_string();
        form.description = "Formato estándar".to_string();
        form.game_type = "TCG".to_string();
        form.date = "2025-11-08".to_string();
        form.time = "15:30".to_string();
        form.location = "Tienda Ludico".to_string();
        form.max_participants = "12".to_string();
    }

    #[tokio::test]
    async fn test_submit_creates_event() {
        let (app, remote) = logged_in_app().await;
        let vm = app.create_event_view_model();
        vm.update_form(fill);
        vm.submit().await;

        let state = vm.state();
        assert!(state.event_saved);
        assert!(!state.saved_offline);
        let id = state.saved_event_id.unwrap();

        let stored = app.events.event(id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Torneo Pokemon");
        assert_eq!(stored.creator_id, "u-1");
        assert_eq!(stored.max_participants, 12);
        assert_eq!(stored.time, NaiveTime::from_hms_opt(15, 30, 0).unwrap());
        assert_eq!(remote.events().len(), 1);

        vm.reset_navigation_state();
        let state = vm.state();
        assert!(!state.event_saved);
        assert!(state.saved_event_id.is_none());
    }

    #[tokio::test]
    async fn test_submit_offline_is_flagged() {
        let (app, remote) = logged_in_app().await;
        remote.set_offline(true);

        let vm = app.create_event_view_model();
        vm.update_form(|f| {
            fill(f);
            f.max_participants = "many".to_string();
        });
        vm.submit().await;

        let state = vm.state();
        assert!(state.event_saved);
        assert!(state.saved_offline);
        let stored = app.events.event(state.saved_event_id.unwrap()).await.unwrap().unwrap();
        assert_eq!(stored.max_participants, 0);
        assert_eq!(app.events.pending_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unparseable_date_is_reported() {
        let (app, _remote) = logged_in_app().await;
        let vm = app.create_event_view_model();
        vm.update_form(|f| {
            fill(f);
            f.date = "8 de noviembre".to_string();
        });
        vm.submit().await;

        let state = vm.state();
        assert!(!state.event_saved);
        assert!(state.error_message.unwrap().contains("Invalid date"));
        assert!(app.events.all_events().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_requires_session() {
        let (app, _remote) = app().await;
        let vm = app.create_event_view_model();
        vm.update_form(fill);
        vm.submit().await;

        assert!(!vm.state().event_saved);
        assert!(vm.state().error_message.is_some());
    }

    #[tokio::test]
    async fn test_edit_keeps_id_and_creator() {
        let (app, _remote) = logged_in_app().await;
        let original = app
            .events
            .create(event("Catan", "2025-10-03", "u-2"))
            .await
            .unwrap();

        let vm = app.create_event_view_model();
        vm.load_for_edit(original.id).await;
        assert_eq!(vm.state().form.title, "Catan");
        assert_eq!(vm.state().form.time, "18:00");

        vm.update_form(|f| f.title = "Catan: Seafarers".to_string());
        vm.submit().await;
        assert_eq!(vm.state().saved_event_id, Some(original.id));

        let stored = app.events.event(original.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Catan: Seafarers");
        assert_eq!(stored.creator_id, "u-2");
        assert_eq!(app.events.all_events().await.unwrap().len(), 1);
    }

    #[test]
    fn test_time_with_seconds() {
        let form = EventForm {
            date: "2025-11-08".to_string(),
            time: "09:05:30".to_string(),
            ..EventForm::default()
        };
        let draft = form.to_draft().unwrap();
        assert_eq!(draft.time, NaiveTime::from_hms_opt(9, 5, 30).unwrap());
        assert_eq!(draft.max_participants, 0);
    }
}
