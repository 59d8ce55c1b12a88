use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    AuthRequest, AuthResponse, CreateTicketRequest, EventDto, SupportTicketResponse,
    UpdateTicketRequest, User,
};
use crate::utils::error::Result;

pub mod client;

pub use client::ApiClient;

/// The REST backend as seen by the repositories.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Bearer token attached to every subsequent request. `None` signs out.
    fn set_token(&self, token: Option<String>);

    async fn login(&self, request: &AuthRequest) -> Result<AuthResponse>;
    async fn register(&self, request: &AuthRequest) -> Result<()>;

    async fn list_events(&self) -> Result<Vec<EventDto>>;
    async fn create_event(&self, event: &EventDto) -> Result<()>;
    async fn update_event(&self, event: &EventDto) -> Result<()>;
    async fn delete_event(&self, id: Uuid) -> Result<()>;

    async fn get_user(&self, id: &str) -> Result<User>;
    async fn update_user(&self, user: &User) -> Result<()>;

    async fn list_tickets(&self) -> Result<Vec<SupportTicketResponse>>;
    async fn get_ticket(&self, id: &str) -> Result<SupportTicketResponse>;
    async fn create_ticket(&self, request: &CreateTicketRequest) -> Result<SupportTicketResponse>;
    async fn update_ticket(
        &self,
        id: &str,
        request: &UpdateTicketRequest,
    ) -> Result<SupportTicketResponse>;
    async fn delete_ticket(&self, id: &str) -> Result<()>;
}
