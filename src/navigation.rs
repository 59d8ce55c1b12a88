//! Navigation events emitted by the state containers and the routes they
//! lead to.

use tokio::sync::broadcast;
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Detail(Uuid),
    Settings,
    Login,
    Register,
    CreateEvent,
    EditEvent(Uuid),
    Profile,
    Support,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Home => "home".to_string(),
            Route::Detail(id) => format!("detail/{}", id),
            Route::Settings => "settings".to_string(),
            Route::Login => "login".to_string(),
            Route::Register => "register".to_string(),
            Route::CreateEvent => "create_event".to_string(),
            Route::EditEvent(id) => format!("create_event/{}", id),
            Route::Profile => "profile".to_string(),
            Route::Support => "support".to_string(),
        }
    }

    pub fn parse(path: &str) -> Option<Self> {
        let path = path.trim_matches('/');
        let (head, tail) = match path.split_once('/') {
            Some((head, tail)) => (head, Some(tail)),
            None => (path, None),
        };

        match (head, tail) {
            ("home", None) => Some(Route::Home),
            ("settings", None) => Some(Route::Settings),
            ("login", None) => Some(Route::Login),
            ("register", None) => Some(Route::Register),
            ("create_event", None) => Some(Route::CreateEvent),
            ("profile", None) => Some(Route::Profile),
            ("support", None) => Some(Route::Support),
            ("detail", Some(id)) => Uuid::parse_str(id).ok().map(Route::Detail),
            ("create_event", Some(id)) => Uuid::parse_str(id).ok().map(Route::EditEvent),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEvent {
    ToHome,
    ToDetail(Uuid),
    ToSettings,
    ToLogin,
    ToRegister,
    ToCreateEvent,
    ToEditEvent(Uuid),
    ToProfile,
    ToSupport,
    Back,
}

impl NavEvent {
    /// Destination of a forward navigation. `Back` has none.
    pub fn route(&self) -> Option<Route> {
        Some(match self {
            NavEvent::ToHome => Route::Home,
            NavEvent::ToDetail(id) => Route::Detail(*id),
            NavEvent::ToSettings => Route::Settings,
            NavEvent::ToLogin => Route::Login,
            NavEvent::ToRegister => Route::Register,
            NavEvent::ToCreateEvent => Route::CreateEvent,
            NavEvent::ToEditEvent(id) => Route::EditEvent(*id),
            NavEvent::ToProfile => Route::Profile,
            NavEvent::ToSupport => Route::Support,
            NavEvent::Back => return None,
        })
    }
}

/// Fan-out of navigation events to whoever renders the screens.
#[derive(Clone)]
pub struct Navigator {
    tx: broadcast::Sender<NavEvent>,
}

impl Navigator {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NavEvent> {
        self.tx.subscribe()
    }

    pub fn navigate(&self, event: NavEvent) {
        tracing::debug!(?event, "Navigation event");
        if self.tx.send(event).is_err() {
            tracing::debug!("No navigation listener attached");
        }
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

/// Back stack driven by navigation events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavStack {
    stack: Vec<Route>,
}

impl NavStack {
    pub fn new(start: Route) -> Self {
        Self { stack: vec![start] }
    }

    pub fn current(&self) -> &Route {
        // The stack is never empty.
        &self.stack[self.stack.len() - 1]
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Home and Login are roots: reaching them clears the history.
    pub fn apply(&mut self, event: &NavEvent) -> &Route {
        match event.route() {
            None => {
                if self.stack.len() > 1 {
                    self.stack.pop();
                }
            }
            Some(route @ (Route::Home | Route::Login)) => {
                self.stack.clear();
                self.stack.push(route);
            }
            Some(route) => {
                if self.current() != &route {
                    self.stack.push(route);
                }
            }
        }
        self.current()
    }
}
