use tokio::sync::watch;
use tracing::warn;

use crate::navigation::{NavEvent, Navigator};
use crate::repository::UserRepository;
use crate::state::StateStore;
use crate::utils::error::AppError;

pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const USER_EXISTS: &str = "User already exists";
pub const CONNECTION_FAILED: &str = "Connection failed";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub email_error: Option<String>,
    pub password_error: Option<String>,
    pub general_error: Option<String>,
    pub is_loading: bool,
}

/// Login and registration screens.
pub struct AuthViewModel {
    users: UserRepository,
    navigator: Navigator,
    state: StateStore<AuthState>,
}

impl AuthViewModel {
    pub fn new(users: UserRepository, navigator: Navigator) -> Self {
        Self {
            users,
            navigator,
            state: StateStore::default(),
        }
    }

    pub fn state(&self) -> AuthState {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn on_email_change(&self, email: &str) {
        self.state.update(|s| {
            s.email = email.to_string();
            s.email_error = None;
        });
    }

    pub fn on_password_change(&self, password: &str) {
        self.state.update(|s| {
            s.password = password.to_string();
            s.password_error = None;
        });
    }

    pub fn on_confirm_password_change(&self, password: &str) {
        self.state.update(|s| s.confirm_password = password.to_string());
    }

    pub async fn login(&self) {
        let AuthState {
            email, password, ..
        } = self.begin();

        match self.users.login(&email, &password).await {
            Ok(_) => {
                self.state.update(|s| s.is_loading = false);
                self.navigator.navigate(NavEvent::ToHome);
            }
            Err(e) => {
                warn!(error = %e, "Login failed");
                self.state.update(|s| {
                    s.is_loading = false;
                    match &e {
                        AppError::DatabaseError(_) | AppError::MigrationError(_) => {
                            s.general_error = Some(e.user_message())
                        }
                        e if e.is_network() => {
                            s.password_error = Some(CONNECTION_FAILED.to_string())
                        }
                        _ => s.password_error = Some(INVALID_CREDENTIALS.to_string()),
                    }
                });
            }
        }
    }

    pub async fn register(&self) {
        let AuthState {
            email, password, ..
        } = self.begin();

        match self.users.register(&email, &password).await {
            Ok(()) => {
                self.state.update(|s| s.is_loading = false);
                self.navigator.navigate(NavEvent::ToLogin);
            }
            Err(e) => {
                warn!(error = %e, "Registration failed");
                let message = if e.is_network() {
                    CONNECTION_FAILED
                } else {
                    USER_EXISTS
                };
                self.state.update(|s| {
                    s.is_loading = false;
                    s.email_error = Some(message.to_string());
                });
            }
        }
    }

    fn begin(&self) -> AuthState {
        self.state.update(|s| {
            s.is_loading = true;
            s.email_error = None;
            s.password_error = None;
            s.general_error = None;
        });
        self.state.snapshot()
    }
}
