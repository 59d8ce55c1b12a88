use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{Comment, Event, RsvpState, User};
use crate::navigation::{NavEvent, Navigator};
use crate::repository::{EventRepository, UserRepository};
use crate::state::StateStore;
use crate::utils::error::{AppError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDetailState {
    pub event: Option<Event>,
    pub host: Option<User>,
    pub comments: Vec<Comment>,
    pub participants: Vec<String>,
    pub new_comment_text: String,
    pub is_user_the_creator: bool,
    pub rsvp_state: RsvpState,
    pub is_loading: bool,
    pub error_message: Option<String>,
}

impl Default for EventDetailState {
    fn default() -> Self {
        Self {
            event: None,
            host: None,
            comments: Vec::new(),
            participants: Vec::new(),
            new_comment_text: String::new(),
            is_user_the_creator: false,
            rsvp_state: RsvpState::NotJoined,
            is_loading: false,
            error_message: None,
        }
    }
}

pub struct EventDetailViewModel {
    event_id: Uuid,
    events: EventRepository,
    users: UserRepository,
    navigator: Navigator,
    state: StateStore<EventDetailState>,
}

impl EventDetailViewModel {
    pub fn new(
        event_id: Uuid,
        events: EventRepository,
        users: UserRepository,
        navigator: Navigator,
    ) -> Self {
        Self {
            event_id,
            events,
            users,
            navigator,
            state: StateStore::default(),
        }
    }

    pub fn state(&self) -> EventDetailState {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<EventDetailState> {
        self.state.subscribe()
    }

    pub async fn load(&self) {
        self.state.update(|s| {
            s.is_loading = true;
            s.error_message = None;
        });

        match self.assemble().await {
            Ok(loaded) => self.state.update(|s| {
                *s = EventDetailState {
                    new_comment_text: std::mem::take(&mut s.new_comment_text),
                    ..loaded
                }
            }),
            Err(e) => {
                warn!(event_id = %self.event_id, error = %e, "Could not load event");
                self.state.update(|s| {
                    s.is_loading = false;
                    s.error_message = Some(e.user_message());
                });
            }
        }
    }

    async fn assemble(&self) -> Result<EventDetailState> {
        let event = self.events.event(self.event_id).await?.ok_or_else(|| {
            AppError::NotFound(format!("Event with id '{}' was not found", self.event_id))
        })?;
        let user_id = self.users.current_user_id().await?;

        let host = self.events.user(&event.creator_id).await?;
        let comments = self.events.comments(event.id).await?;
        let participants = self.events.participants(event.id).await?;
        let rsvp_state = match &user_id {
            Some(uid) => self.events.rsvp_state(event.id, uid).await?,
            None => RsvpState::NotJoined,
        };

        Ok(EventDetailState {
            is_user_the_creator: user_id.as_deref() == Some(event.creator_id.as_str()),
            event: Some(event),
            host,
            comments,
            participants,
            rsvp_state,
            ..EventDetailState::default()
        })
    }

    pub fn on_new_comment_change(&self, text: &str) {
        self.state.update(|s| s.new_comment_text = text.to_string());
    }

    pub async fn submit_comment(&self) {
        let text = self.state.snapshot().new_comment_text;
        let result = match self.users.current_user_id().await {
            Ok(Some(uid)) => self.events.add_comment(self.event_id, &uid, &text).await,
            Ok(None) => Err(AppError::AuthError("You need to log in to comment".to_string())),
            Err(e) => Err(e),
        };

        match result {
            Ok(Some(comment)) => self.state.update(|s| {
                s.comments.push(comment);
                s.new_comment_text.clear();
            }),
            Ok(None) => debug!("Blank comment ignored"),
            Err(e) => self.state.update(|s| s.error_message = Some(e.user_message())),
        }
    }

    pub async fn toggle_rsvp(&self) {
        let result = match self.users.current_user_id().await {
            Ok(Some(uid)) => self.events.toggle_rsvp(self.event_id, &uid).await,
            Ok(None) => Err(AppError::AuthError("You need to log in to join".to_string())),
            Err(e) => Err(e),
        };

        match result {
            Ok(rsvp_state) => {
                let participants = self.events.participants(self.event_id).await;
                self.state.update(|s| {
                    s.rsvp_state = rsvp_state;
                    if let Ok(participants) = participants {
                        s.participants = participants;
                    }
                });
            }
            Err(e) => self.state.update(|s| s.error_message = Some(e.user_message())),
        }
    }

    /// Navigates back once the event is gone.
    pub async fn delete(&self) {
        match self.events.delete(self.event_id).await {
            Ok(true) => self.navigator.navigate(NavEvent::Back),
            Ok(false) => self.state.update(|s| {
                s.error_message = Some("Could not delete the event, try again later".to_string())
            }),
            Err(e) => self.state.update(|s| s.error_message = Some(e.user_message())),
        }
    }

    pub fn edit(&self) {
        self.navigator.navigate(NavEvent::ToEditEvent(self.event_id));
    }

    pub fn share_text(&self) -> Option<String> {
        self.state.snapshot().event.map(|e| e.share_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::logged_in_app;
    use crate::models::event::fixtures::event;

    #[tokio::test]
    async fn test_load_assembles_detail() {
        let (app, remote) = logged_in_app().await;
        remote.seed_user(User {
            id: "u-1".to_string(),
            name: "Ana".to_string(),
            email: "ana@ludico.cl".to_string(),
            location: None,
            avatar_url: None,
        });
        app.users.profile("u-1").await.unwrap();
        let ev = app.events.create(event("Magic", "2025-09-24", "u-1")).await.unwrap();

        let vm = app.event_detail_view_model(ev.id);
        vm.load().await;

        let state = vm.state();
        assert_eq!(state.event, Some(ev.clone()));
        assert_eq!(state.host.unwrap().name, "Ana");
        assert!(state.is_user_the_creator);
        assert_eq!(state.rsvp_state, RsvpState::NotJoined);
        assert!(!state.is_loading);
        assert!(vm.share_text().unwrap().contains("Magic"));
    }

    #[tokio::test]
    async fn test_missing_event() {
        let (app, _remote) = logged_in_app().await;
        let vm = app.event_detail_view_model(Uuid::new_v4());
        vm.load().await;

        let state = vm.state();
        assert!(state.event.is_none());
        assert!(state.error_message.is_some());
        assert!(vm.share_text().is_none());
    }

    #[tokio::test]
    async fn test_comment_and_rsvp() {
        let (app, _remote) = logged_in_app().await;
        let ev = app.events.create(event("Go", "2025-09-24", "u-2")).await.unwrap();
        let vm = app.event_detail_view_model(ev.id);
        vm.load().await;
        assert!(!vm.state().is_user_the_creator);

        vm.on_new_comment_change("   ");
        vm.submit_comment().await;
        assert!(vm.state().comments.is_empty());

        vm.on_new_comment_change("Llevo tablero");
        vm.submit_comment().await;
        let state = vm.state();
        assert_eq!(state.comments.len(), 1);
        assert_eq!(state.comments[0].author_id, "u-1");
        assert!(state.new_comment_text.is_empty());

        vm.toggle_rsvp().await;
        assert_eq!(vm.state().rsvp_state, RsvpState::Joined);
        assert_eq!(vm.state().participants, vec!["u-1".to_string()]);

        vm.toggle_rsvp().await;
        assert_eq!(vm.state().rsvp_state, RsvpState::NotJoined);
        assert!(vm.state().participants.is_empty());
    }

    #[tokio::test]
    async fn test_delete_navigates_back() {
        let (app, remote) = logged_in_app().await;
        let ev = app.events.create(event("Go", "2025-09-24", "u-1")).await.unwrap();
        let mut nav = app.navigator.subscribe();
        let vm = app.event_detail_view_model(ev.id);

        remote.set_offline(true);
        vm.delete().await;
        assert!(vm.state().error_message.is_some());
        assert!(app.events.event(ev.id).await.unwrap().is_some());

        remote.set_offline(false);
        vm.delete().await;
        assert_eq!(nav.recv().await.unwrap(), NavEvent::Back);
        assert!(app.events.event(ev.id).await.unwrap().is_none());
    }
}
