use chrono::{Local, NaiveDate};
use tokio::sync::watch;
use tracing::warn;

use crate::models::{Event, User};
use crate::navigation::{NavEvent, Navigator};
use crate::repository::{EventRepository, UserRepository};
use crate::state::StateStore;
use crate::utils::error::{AppError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProfileTab {
    #[default]
    MyEvents,
    Preferences,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileState {
    pub user: Option<User>,
    pub name: String,
    pub location: String,
    pub is_editing: bool,
    pub selected_tab: ProfileTab,
    pub created_events: Vec<Event>,
    /// Joined events that have not happened yet.
    pub joined_events: Vec<Event>,
    pub past_events: Vec<Event>,
    pub games_played: usize,
    pub is_loading: bool,
    pub error_message: Option<String>,
}

pub struct ProfileViewModel {
    users: UserRepository,
    events: EventRepository,
    navigator: Navigator,
    state: StateStore<ProfileState>,
}

impl ProfileViewModel {
    pub fn new(users: UserRepository, events: EventRepository, navigator: Navigator) -> Self {
        Self {
            users,
            events,
            navigator,
            state: StateStore::default(),
        }
    }

    pub fn state(&self) -> ProfileState {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<ProfileState> {
        self.state.subscribe()
    }

    pub async fn load(&self) {
        self.load_at(Local::now().date_naive()).await;
    }

    async fn load_at(&self, today: NaiveDate) {
        self.state.update(|s| {
            s.is_loading = true;
            s.error_message = None;
        });

        let result = self.gather(today).await;
        self.state.update(|s| {
            s.is_loading = false;
            match result {
                Ok(loaded) => {
                    s.name = loaded.user.as_ref().map(|u| u.name.clone()).unwrap_or_default();
                    s.location = loaded
                        .user
                        .as_ref()
                        .and_then(|u| u.location.clone())
                        .unwrap_or_default();
                    s.user = loaded.user;
                    s.games_played = loaded.past_events.len();
                    s.created_events = loaded.created_events;
                    s.joined_events = loaded.joined_events;
                    s.past_events = loaded.past_events;
                }
                Err(e) => s.error_message = Some(e.user_message()),
            }
        });
    }

    async fn gather(&self, today: NaiveDate) -> Result<ProfileState> {
        let user_id = self.require_user_id().await?;
        let user = self.users.profile(&user_id).await?;
        let created_events = self.events.events_created_by(&user_id).await?;

        let (past_events, joined_events): (Vec<Event>, Vec<Event>) = self
            .events
            .events_joined_by(&user_id)
            .await?
            .into_iter()
            .partition(|e| e.date < today);

        Ok(ProfileState {
            user,
            created_events,
            joined_events,
            past_events,
            ..ProfileState::default()
        })
    }

    pub fn select_tab(&self, tab: ProfileTab) {
        self.state.update(|s| s.selected_tab = tab);
    }

    pub fn on_name_change(&self, name: &str) {
        self.state.update(|s| s.name = name.to_string());
    }

    pub fn on_location_change(&self, location: &str) {
        self.state.update(|s| s.location = location.to_string());
    }

    /// Leaving edit mode saves the profile.
    pub async fn toggle_edit(&self) {
        let was_editing = self.state.snapshot().is_editing;
        if !was_editing {
            self.state.update(|s| s.is_editing = true);
            return;
        }

        match self.save().await {
            Ok(user) => self.state.update(|s| {
                s.is_editing = false;
                s.error_message = None;
                s.user = Some(user);
            }),
            Err(e) => {
                warn!(error = %e, "Could not save profile");
                self.state.update(|s| s.error_message = Some(e.user_message()));
            }
        }
    }

    async fn save(&self) -> Result<User> {
        let state = self.state.snapshot();
        let mut user = match state.user {
            Some(user) => user,
            None => self.users.profile(&self.require_user_id().await?).await?.ok_or_else(
                || AppError::NotFound("Profile not loaded".to_string()),
            )?,
        };

        user.name = state.name.trim().to_string();
        let location = state.location.trim();
        user.location = (!location.is_empty()).then(|| location.to_string());

        self.users.update_profile(&user).await?;
        Ok(user)
    }

    pub async fn logout(&self) {
        if let Err(e) = self.users.logout().await {
            warn!(error = %e, "Logout failed");
            self.state.update(|s| s.error_message = Some(e.user_message()));
            return;
        }
        self.state.update(|s| *s = ProfileState::default());
        self.navigator.navigate(NavEvent::ToLogin);
    }

    async fn require_user_id(&self) -> Result<String> {
        self.users
            .current_user_id()
            .await?
            .ok_or_else(|| AppError::AuthError("Not logged in".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::{app, logged_in_app};
    use crate::models::event::fixtures::event;

    fn ana() -> User {
        User {
            id: "u-1".to_string(),
            name: "Ana".to_string(),
            email: "ana@ludico.cl".to_string(),
            location: Some("Santiago".to_string()),
            avatar_url: None,
        }
    }

    #[tokio::test]
    async fn test_load_splits_joined_events() {
        let (app, remote) = logged_in_app().await;
        remote.seed_user(ana());

        let mine = app.events.create(event("Mine", "2025-06-01", "u-1")).await.unwrap();
        let past = app.events.create(event("Past", "2025-05-01", "u-2")).await.unwrap();
        let next = app.events.create(event("Next", "2025-07-01", "u-2")).await.unwrap();
        app.events.toggle_rsvp(past.id, "u-1").await.unwrap();
        app.events.toggle_rsvp(next.id, "u-1").await.unwrap();

        let vm = app.profile_view_model();
        vm.load_at(NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()).await;

        let state = vm.state();
        assert_eq!(state.name, "Ana");
        assert_eq!(state.location, "Santiago");
        assert_eq!(state.created_events, vec![mine]);
        assert_eq!(state.joined_events, vec![next]);
        assert_eq!(state.past_events, vec![past]);
        assert_eq!(state.games_played, 1);
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_toggle_edit_saves_on_exit() {
        let (app, remote) = logged_in_app().await;
        remote.seed_user(ana());
        let vm = app.profile_view_model();
        vm.load().await;

        vm.select_tab(ProfileTab::Preferences);
        vm.toggle_edit().await;
        assert!(vm.state().is_editing);

        vm.on_name_change("Ana María ");
        vm.on_location_change("");
        vm.toggle_edit().await;

        let state = vm.state();
        assert!(!state.is_editing);
        assert_eq!(state.selected_tab, ProfileTab::Preferences);
        let saved = app.users.profile("u-1").await.unwrap().unwrap();
        assert_eq!(saved.name, "Ana María");
        assert_eq!(saved.location, None);
    }

    #[tokio::test]
    async fn test_failed_save_stays_in_edit_mode() {
        let (app, remote) = logged_in_app().await;
        remote.seed_user(ana());
        let vm = app.profile_view_model();
        vm.load().await;
        vm.toggle_edit().await;

        remote.set_offline(true);
        vm.toggle_edit().await;
        let state = vm.state();
        assert!(state.is_editing);
        assert!(state.error_message.is_some());
    }

    #[tokio::test]
    async fn test_logout_navigates_to_login() {
        let (app, _remote) = logged_in_app().await;
        let mut nav = app.navigator.subscribe();
        let vm = app.profile_view_model();

        vm.logout().await;
        assert_eq!(nav.recv().await.unwrap(), NavEvent::ToLogin);
        assert!(!app.users.is_logged_in().await.unwrap());
    }

    #[tokio::test]
    async fn test_load_without_session() {
        let (app, _remote) = app().await;
        let vm = app.profile_view_model();
        vm.load().await;
        assert_eq!(vm.state().error_message.as_deref(), Some("Not logged in"));
    }
}
