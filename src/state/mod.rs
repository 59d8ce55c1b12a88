//! Per-screen state containers. Each keeps its snapshot in a `watch`
//! channel so a shell can render on every change.

use tokio::sync::watch;

pub mod auth;
pub mod create_event;
pub mod event_detail;
pub mod home;
pub mod profile;
pub mod support;

pub use auth::{AuthState, AuthViewModel};
pub use create_event::{CreateEventState, CreateEventViewModel, EventForm};
pub use event_detail::{EventDetailState, EventDetailViewModel};
pub use home::{HomeState, HomeViewModel};
pub use profile::{ProfileState, ProfileTab, ProfileViewModel};
pub use support::{SupportState, SupportViewModel};

pub struct StateStore<S> {
    tx: watch::Sender<S>,
}

impl<S: Clone> StateStore<S> {
    pub fn new(initial: S) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    pub fn snapshot(&self) -> S {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.tx.subscribe()
    }

    /// Notifies subscribers even when nobody is listening yet.
    pub fn update(&self, modify: impl FnOnce(&mut S)) {
        self.tx.send_modify(modify);
    }
}

impl<S: Clone + Default> Default for StateStore<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}
