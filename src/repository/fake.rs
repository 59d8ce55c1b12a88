//! In-process backend double for repository, sync and view-state tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::api::RemoteApi;
use crate::models::{
    AuthRequest, AuthResponse, CreateTicketRequest, EventDto, SupportTicketResponse,
    UpdateTicketRequest, User,
};
use crate::utils::error::{AppError, Result};

pub const PASSWORD: &str = "secret1";

#[derive(Default)]
struct Inner {
    offline: bool,
    token: Option<String>,
    events: Vec<EventDto>,
    users: HashMap<String, User>,
    accounts: Vec<String>,
    tickets: Vec<SupportTicketResponse>,
    calls: Vec<String>,
}

#[derive(Default)]
pub struct FakeRemote {
    inner: Mutex<Inner>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.inner.lock().unwrap().offline = offline;
    }

    pub fn token(&self) -> Option<String> {
        self.inner.lock().unwrap().token.clone()
    }

    pub fn events(&self) -> Vec<EventDto> {
        self.inner.lock().unwrap().events.clone()
    }

    pub fn seed_event(&self, dto: EventDto) {
        self.inner.lock().unwrap().events.push(dto);
    }

    pub fn seed_user(&self, user: User) {
        self.inner
            .lock()
            .unwrap()
            .users
            .insert(user.id.clone(), user);
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    fn call(&self, name: impl Into<String>) -> Result<std::sync::MutexGuard<'_, Inner>> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(name.into());
        if inner.offline {
            return Err(AppError::RemoteError {
                status: 503,
                message: "offline".to_string(),
            });
        }
        Ok(inner)
    }
}

#[async_trait]
impl RemoteApi for FakeRemote {
    fn set_token(&self, token: Option<String>) {
        self.inner.lock().unwrap().token = token;
    }

    async fn login(&self, request: &AuthRequest) -> Result<AuthResponse> {
        let _inner = self.call("login")?;
        if request.password != PASSWORD {
            return Err(AppError::AuthError("Invalid credentials".to_string()));
        }
        Ok(AuthResponse {
            token: format!("tok-{}", request.email),
            user_id: "u-1".to_string(),
            email: request.email.clone(),
        })
    }

    async fn register(&self, request: &AuthRequest) -> Result<()> {
        let mut inner = self.call("register")?;
        if inner.accounts.contains(&request.email) {
            return Err(AppError::RemoteError {
                status: 409,
                message: "User already exists".to_string(),
            });
        }
        inner.accounts.push(request.email.clone());
        Ok(())
    }

    async fn list_events(&self) -> Result<Vec<EventDto>> {
        let inner = self.call("list_events")?;
        Ok(inner.events.clone())
    }

    async fn create_event(&self, event: &EventDto) -> Result<()> {
        let mut inner = self.call(format!("create_event {}", event.title))?;
        if inner.events.iter().any(|e| e.event_id == event.event_id) {
            return Err(AppError::RemoteError {
                status: 409,
                message: "Event already exists".to_string(),
            });
        }
        inner.events.push(event.clone());
        Ok(())
    }

    async fn update_event(&self, event: &EventDto) -> Result<()> {
        let mut inner = self.call(format!("update_event {}", event.title))?;
        match inner.events.iter_mut().find(|e| e.event_id == event.event_id) {
            Some(existing) => {
                *existing = event.clone();
                Ok(())
            }
            None => Err(AppError::NotFound("Event not found".to_string())),
        }
    }

    async fn delete_event(&self, id: Uuid) -> Result<()> {
        let mut inner = self.call("delete_event")?;
        let before = inner.events.len();
        inner.events.retain(|e| e.event_id != id);
        if inner.events.len() == before {
            return Err(AppError::NotFound("Event not found".to_string()));
        }
        Ok(())
    }

    async fn get_user(&self, id: &str) -> Result<User> {
        let inner = self.call("get_user")?;
        inner
            .users
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        let mut inner = self.call("update_user")?;
        inner.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn list_tickets(&self) -> Result<Vec<SupportTicketResponse>> {
        let inner = self.call("list_tickets")?;
        Ok(inner.tickets.clone())
    }

    async fn get_ticket(&self, id: &str) -> Result<SupportTicketResponse> {
        let inner = self.call("get_ticket")?;
        inner
            .tickets
            .iter()
            .find(|t| t.id.as_deref() == Some(id))
            .cloned()
            .ok_or_else(|| AppError::NotFound("Ticket not found".to_string()))
    }

    async fn create_ticket(&self, request: &CreateTicketRequest) -> Result<SupportTicketResponse> {
        let mut inner = self.call("create_ticket")?;
        let ticket = SupportTicketResponse {
            id: Some((inner.tickets.len() + 1).to_string()),
            contact_email: Some(request.contact_email.clone()),
            subject: Some(request.subject.clone()),
            description: Some(request.description.clone()),
            status: Some("Open".to_string()),
            ..Default::default()
        };
        inner.tickets.push(ticket.clone());
        Ok(ticket)
    }

    async fn update_ticket(
        &self,
        id: &str,
        request: &UpdateTicketRequest,
    ) -> Result<SupportTicketResponse> {
        let mut inner = self.call("update_ticket")?;
        let ticket = inner
            .tickets
            .iter_mut()
            .find(|t| t.id.as_deref() == Some(id))
            .ok_or_else(|| AppError::NotFound("Ticket not found".to_string()))?;
        ticket.subject = Some(request.subject.clone());
        ticket.description = Some(request.description.clone());
        ticket.status = Some(request.status.clone());
        Ok(ticket.clone())
    }

    async fn delete_ticket(&self, id: &str) -> Result<()> {
        let mut inner = self.call("delete_ticket")?;
        let before = inner.tickets.len();
        inner.tickets.retain(|t| t.id.as_deref() != Some(id));
        if inner.tickets.len() == before {
            return Err(AppError::NotFound("Ticket not found".to_string()));
        }
        Ok(())
    }
}
