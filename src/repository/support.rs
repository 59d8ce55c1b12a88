use std::sync::Arc;

use tracing::debug;

use crate::api::RemoteApi;
use crate::models::{CreateTicketRequest, SupportTicket, UpdateTicketRequest};
use crate::utils::error::Result;

/// Support tickets live only on the server.
#[derive(Clone)]
pub struct SupportRepository {
    remote: Arc<dyn RemoteApi>,
}

impl SupportRepository {
    pub fn new(remote: Arc<dyn RemoteApi>) -> Self {
        Self { remote }
    }

    pub async fn create_ticket(
        &self,
        email: &str,
        subject: &str,
        description: &str,
    ) -> Result<SupportTicket> {
        let request = CreateTicketRequest {
            contact_email: email.to_string(),
            subject: subject.to_string(),
            description: description.to_string(),
        };
        let ticket = SupportTicket::from(self.remote.create_ticket(&request).await?);
        debug!(ticket_id = %ticket.id, "Support ticket created");
        Ok(ticket)
    }

    pub async fn all_tickets(&self) -> Result<Vec<SupportTicket>> {
        let tickets = self.remote.list_tickets().await?;
        Ok(tickets.into_iter().map(SupportTicket::from).collect())
    }

    pub async fn ticket(&self, id: &str) -> Result<SupportTicket> {
        Ok(SupportTicket::from(self.remote.get_ticket(id).await?))
    }

    pub async fn update_ticket(
        &self,
        id: &str,
        request: &UpdateTicketRequest,
    ) -> Result<SupportTicket> {
        Ok(SupportTicket::from(
            self.remote.update_ticket(id, request).await?,
        ))
    }

    pub async fn delete_ticket(&self, id: &str) -> Result<()> {
        self.remote.delete_ticket(id).await?;
        debug!(ticket_id = id, "Support ticket deleted");
        Ok(())
    }
}
