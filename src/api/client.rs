//! `reqwest` bindings for the Ludico backend.

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::api::RemoteApi;
use crate::models::{
    AuthRequest, AuthResponse, CreateTicketRequest, EventDto, SupportTicketResponse,
    UpdateTicketRequest, User,
};
use crate::utils::error::{AppError, Result};
use crate::utils::response::error_message;

const LOGIN_PATH: &str = "auth/login";
const REGISTER_PATH: &str = "auth/register";
const EVENTS_PATH: &str = "api/v1/events";
const USERS_PATH: &str = "api/v1/users";
const SUPPORT_PATH: &str = "api/v1/support";

pub struct ApiClient {
    client: reqwest::Client,
    base_url: Url,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ludico-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            token: RwLock::new(None),
        })
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::InternalError(format!("Invalid endpoint '{}': {}", path, e)))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let builder = self.client.request(method, self.url(path)?);
        let token = self
            .token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();

        Ok(match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);
        tracing::debug!(status = status.as_u16(), message = %message, "Backend rejected request");
        Err(AppError::from_status(status, message))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(self.request(Method::GET, path)?).await?;
        Ok(response.json().await?)
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(self.request(method, path)?.json(body)).await?;
        Ok(response.json().await?)
    }

    /// For endpoints whose answer body, if any, is not needed.
    async fn send_ignoring_body<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let builder = self.request(method, path)?;
        let builder = match body {
            Some(body) => builder.json(body),
            None => builder,
        };
        self.send(builder).await?;
        Ok(())
    }
}

#[async_trait]
impl RemoteApi for ApiClient {
    fn set_token(&self, token: Option<String>) {
        *self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = token;
    }

    async fn login(&self, request: &AuthRequest) -> Result<AuthResponse> {
        self.send_json(Method::POST, LOGIN_PATH, request).await
    }

    async fn register(&self, request: &AuthRequest) -> Result<()> {
        self.send_ignoring_body(Method::POST, REGISTER_PATH, Some(request))
            .await
    }

    /// Rows that do not decode are skipped so one bad record does not hide
    /// the rest of the listing.
    async fn list_events(&self) -> Result<Vec<EventDto>> {
        let rows: Vec<serde_json::Value> = self.get_json(EVENTS_PATH).await?;
        let total = rows.len();

        let events: Vec<EventDto> = rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value::<EventDto>(row) {
                Ok(event) => Some(event),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable event from server");
                    None
                }
            })
            .collect();

        if events.len() < total {
            tracing::warn!(total, skipped = total - events.len(), "Event listing was partially readable");
        }
        Ok(events)
    }

    async fn create_event(&self, event: &EventDto) -> Result<()> {
        self.send_ignoring_body(Method::POST, EVENTS_PATH, Some(event))
            .await
    }

    async fn update_event(&self, event: &EventDto) -> Result<()> {
        let path = format!("{}/{}", EVENTS_PATH, event.event_id);
        self.send_ignoring_body(Method::PUT, &path, Some(event)).await
    }

    async fn delete_event(&self, id: Uuid) -> Result<()> {
        let path = format!("{}/{}", EVENTS_PATH, id);
        self.send_ignoring_body::<()>(Method::DELETE, &path, None)
            .await
    }

    async fn get_user(&self, id: &str) -> Result<User> {
        self.get_json(&format!("{}/{}", USERS_PATH, id)).await
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        let path = format!("{}/{}", USERS_PATH, user.id);
        self.send_ignoring_body(Method::PUT, &path, Some(user)).await
    }

    async fn list_tickets(&self) -> Result<Vec<SupportTicketResponse>> {
        self.get_json(SUPPORT_PATH).await
    }

    async fn get_ticket(&self, id: &str) -> Result<SupportTicketResponse> {
        self.get_json(&format!("{}/{}", SUPPORT_PATH, id)).await
    }

    async fn create_ticket(&self, request: &CreateTicketRequest) -> Result<SupportTicketResponse> {
        self.send_json(Method::POST, SUPPORT_PATH, request).await
    }

    async fn update_ticket(
        &self,
        id: &str,
        request: &UpdateTicketRequest,
    ) -> Result<SupportTicketResponse> {
        let path = format!("{}/{}", SUPPORT_PATH, id);
        self.send_json(Method::PUT, &path, request).await
    }

    async fn delete_ticket(&self, id: &str) -> Result<()> {
        let path = format!("{}/{}", SUPPORT_PATH, id);
        self.send_ignoring_body::<()>(Method::DELETE, &path, None)
            .await
    }
}
