//! Dependency container: one place that owns the pool, the remote client,
//! the repositories and the navigator, and hands out state containers.

use std::sync::Arc;

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::api::{ApiClient, RemoteApi};
use crate::config::Config;
use crate::db;
use crate::navigation::Navigator;
use crate::repository::{EventRepository, SupportRepository, UserRepository};
use crate::state::{
    AuthViewModel, CreateEventViewModel, EventDetailViewModel, HomeViewModel, ProfileViewModel,
    SupportViewModel,
};
use crate::sync::{Connectivity, SyncHandle, SyncScheduler, TcpProbe};
use crate::utils::error::Result;

#[derive(Clone)]
pub struct App {
    pub config: Config,
    pub pool: SqlitePool,
    pub events: EventRepository,
    pub users: UserRepository,
    pub support: SupportRepository,
    pub navigator: Navigator,
}

impl App {
    /// Opens the cache, connects the HTTP client and restores a previous
    /// login if one was persisted.
    pub async fn build(config: Config) -> Result<Self> {
        let pool = db::connect(&config.database_url).await?;
        let remote: Arc<dyn RemoteApi> =
            Arc::new(ApiClient::new(config.api_url.clone(), config.http_timeout)?);

        let app = Self::with_parts(config, pool, remote);
        if app.users.restore_session().await? {
            tracing::info!("Restored previous session");
        }
        Ok(app)
    }

    pub fn with_parts(config: Config, pool: SqlitePool, remote: Arc<dyn RemoteApi>) -> Self {
        Self {
            events: EventRepository::new(pool.clone(), remote.clone()),
            users: UserRepository::new(pool.clone(), remote.clone()),
            support: SupportRepository::new(remote),
            navigator: Navigator::new(),
            config,
            pool,
        }
    }

    /// Network precondition for the sync loop: the backend port answers.
    pub fn backend_probe(&self) -> Result<TcpProbe> {
        TcpProbe::for_url(&self.config.api_url)
    }

    pub fn start_sync(&self, connectivity: Arc<dyn Connectivity>) -> SyncHandle {
        SyncScheduler::new(
            self.events.clone(),
            connectivity,
            self.config.sync_interval,
        )
        .spawn()
    }

    pub fn auth_view_model(&self) -> AuthViewModel {
        AuthViewModel::new(self.users.clone(), self.navigator.clone())
    }

    pub fn home_view_model(&self) -> HomeViewModel {
        HomeViewModel::new(self.events.clone(), self.navigator.clone())
    }

    pub fn create_event_view_model(&self) -> CreateEventViewModel {
        CreateEventViewModel::new(self.events.clone(), self.users.clone())
    }

    pub fn event_detail_view_model(&self, event_id: Uuid) -> EventDetailViewModel {
        EventDetailViewModel::new(
            event_id,
            self.events.clone(),
            self.users.clone(),
            self.navigator.clone(),
        )
    }

    pub fn profile_view_model(&self) -> ProfileViewModel {
        ProfileViewModel::new(
            self.users.clone(),
            self.events.clone(),
            self.navigator.clone(),
        )
    }

    pub fn support_view_model(&self) -> SupportViewModel {
        SupportViewModel::new(self.support.clone())
    }
}
