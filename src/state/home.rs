use tokio::sync::watch;
use uuid::Uuid;

use crate::models::Event;
use crate::navigation::{NavEvent, Navigator};
use crate::repository::EventRepository;
use crate::state::StateStore;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HomeState {
    pub events: Vec<Event>,
    pub is_refreshing: bool,
    /// Cached events still waiting for the backend.
    pub pending_sync: i64,
    pub error_message: Option<String>,
}

/// Event feed. Always renders from the local cache.
pub struct HomeViewModel {
    events: EventRepository,
    navigator: Navigator,
    state: StateStore<HomeState>,
}

impl HomeViewModel {
    pub fn new(events: EventRepository, navigator: Navigator) -> Self {
        Self {
            events,
            navigator,
            state: StateStore::default(),
        }
    }

    pub fn state(&self) -> HomeState {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<HomeState> {
        self.state.subscribe()
    }

    pub async fn load(&self) {
        let events = self.events.all_events().await;
        let pending = self.events.pending_count().await;

        self.state.update(|s| match (events, pending) {
            (Ok(events), Ok(pending)) => {
                s.events = events;
                s.pending_sync = pending;
            }
            (Err(e), _) | (_, Err(e)) => s.error_message = Some(e.user_message()),
        });
    }

    /// Pulls from the backend, then re-reads the cache either way.
    pub async fn refresh(&self) {
        self.state.update(|s| {
            s.is_refreshing = true;
            s.error_message = None;
        });

        let result = self.events.refresh().await;
        self.load().await;

        self.state.update(|s| {
            s.is_refreshing = false;
            if let Err(e) = result {
                s.error_message = Some(format!("Could not refresh events: {}", e.user_message()));
            }
        });
    }

    pub fn open_event(&self, id: Uuid) {
        self.navigator.navigate(NavEvent::ToDetail(id));
    }

    pub fn create_event(&self) {
        self.navigator.navigate(NavEvent::ToCreateEvent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::logged_in_app;
    use crate::models::event::fixtures::event;
    use crate::models::EventDto;

    #[tokio::test]
    async fn test_refresh_pulls_remote_events() {
        let (app, remote) = logged_in_app().await;
        let upstream = event("Warhammer", "2025-12-01", "u-9");
        remote.seed_event(EventDto::from(&upstream));

        let vm = app.home_view_model();
        vm.load().await;
        assert!(vm.state().events.is_empty());

        vm.refresh().await;
        let state = vm.state();
        assert!(!state.is_refreshing);
        assert!(state.error_message.is_none());
        assert_eq!(state.events.len(), 1);
        assert_eq!(state.events[0].id, upstream.id);
        assert!(state.events[0].is_synced);
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_cache() {
        let (app, remote) = logged_in_app().await;
        remote.set_offline(true);
        app.events.create(event("Offline", "2025-10-01", "u-1")).await.unwrap();

        let vm = app.home_view_model();
        vm.refresh().await;

        let state = vm.state();
        assert_eq!(state.events.len(), 1);
        assert_eq!(state.pending_sync, 1);
        assert!(state.error_message.unwrap().starts_with("Could not refresh events"));
    }

    #[tokio::test]
    async fn test_navigation() {
        let (app, _remote) = logged_in_app().await;
        let mut nav = app.navigator.subscribe();
        let vm = app.home_view_model();
        let id = Uuid::new_v4();

        vm.open_event(id);
        vm.create_event();
        assert_eq!(nav.recv().await.unwrap(), NavEvent::ToDetail(id));
        assert_eq!(nav.recv().await.unwrap(), NavEvent::ToCreateEvent);
    }
}
