use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::api::RemoteApi;
use crate::db::{SessionStore, UserStore};
use crate::models::{AuthRequest, AuthResponse, User};
use crate::utils::error::Result;

/// Authentication, the persisted session and profile data.
#[derive(Clone)]
pub struct UserRepository {
    session: SessionStore,
    users: UserStore,
    remote: Arc<dyn RemoteApi>,
}

impl UserRepository {
    pub fn new(pool: SqlitePool, remote: Arc<dyn RemoteApi>) -> Self {
        Self {
            session: SessionStore::new(pool.clone()),
            users: UserStore::new(pool),
            remote,
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let auth = self
            .remote
            .login(&AuthRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;

        self.session.save(&auth.token, &auth.user_id).await?;
        self.remote.set_token(Some(auth.token.clone()));
        info!(user_id = %auth.user_id, "Logged in");
        Ok(auth)
    }

    /// Creates the account. The user still has to log in afterwards.
    pub async fn register(&self, email: &str, password: &str) -> Result<()> {
        self.remote
            .register(&AuthRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await
    }

    pub async fn logout(&self) -> Result<()> {
        self.session.clear().await?;
        self.remote.set_token(None);
        info!("Logged out");
        Ok(())
    }

    /// Hands a persisted token back to the remote client. Returns whether
    /// there was one.
    pub async fn restore_session(&self) -> Result<bool> {
        match self.session.token().await? {
            Some(token) => {
                self.remote.set_token(Some(token));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub async fn is_logged_in(&self) -> Result<bool> {
        Ok(self.session.token().await?.is_some())
    }

    pub async fn current_user_id(&self) -> Result<Option<String>> {
        self.session.user_id().await
    }

    /// Fresh from the backend when reachable, otherwise the cached copy.
    pub async fn profile(&self, user_id: &str) -> Result<Option<User>> {
        match self.remote.get_user(user_id).await {
            Ok(user) => {
                self.users.upsert(&user).await?;
                Ok(Some(user))
            }
            Err(e) => {
                warn!(user_id, error = %e, "Could not fetch profile, using cache");
                self.users.get(user_id).await
            }
        }
    }

    pub async fn update_profile(&self, user: &User) -> Result<()> {
        self.remote.update_user(user).await?;
        self.users.upsert(user).await
    }
}
