use tokio::sync::watch;
use tracing::{info, warn};

use crate::models::{SupportTicket, UpdateTicketRequest, DEFAULT_TICKET_STATUS};
use crate::repository::SupportRepository;
use crate::state::StateStore;
use crate::utils::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportState {
    pub email: String,
    pub subject: String,
    pub description: String,
    pub status: String,
    /// Set while an existing ticket is being edited.
    pub current_id: Option<String>,
    pub tickets: Vec<SupportTicket>,
    pub is_loading: bool,
    pub submission_success: bool,
    pub error_message: Option<String>,
}

impl Default for SupportState {
    fn default() -> Self {
        Self {
            email: String::new(),
            subject: String::new(),
            description: String::new(),
            status: DEFAULT_TICKET_STATUS.to_string(),
            current_id: None,
            tickets: Vec::new(),
            is_loading: false,
            submission_success: false,
            error_message: None,
        }
    }
}

pub struct SupportViewModel {
    support: SupportRepository,
    state: StateStore<SupportState>,
}

impl SupportViewModel {
    pub fn new(support: SupportRepository) -> Self {
        Self {
            support,
            state: StateStore::default(),
        }
    }

    pub fn state(&self) -> SupportState {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<SupportState> {
        self.state.subscribe()
    }

    pub fn on_email_change(&self, email: &str) {
        self.state.update(|s| s.email = email.to_string());
    }

    pub fn on_subject_change(&self, subject: &str) {
        self.state.update(|s| s.subject = subject.to_string());
    }

    pub fn on_description_change(&self, description: &str) {
        self.state.update(|s| s.description = description.to_string());
    }

    pub fn on_status_change(&self, status: &str) {
        self.state.update(|s| s.status = status.to_string());
    }

    pub fn select_ticket_for_edit(&self, ticket: &SupportTicket) {
        self.state.update(|s| {
            s.current_id = Some(ticket.id.clone());
            s.email = ticket.contact_email.clone();
            s.subject = ticket.subject.clone();
            s.description = ticket.description.clone();
            s.status = ticket.status.clone();
            s.submission_success = false;
        });
    }

    pub fn clear_form(&self) {
        self.state.update(clear);
    }

    /// Creates a ticket, or updates the one selected for edit.
    pub async fn submit(&self) {
        self.state.update(|s| {
            s.is_loading = true;
            s.error_message = None;
            s.submission_success = false;
        });

        let form = self.state.snapshot();
        let result: Result<SupportTicket> = match &form.current_id {
            Some(id) => {
                let request = UpdateTicketRequest {
                    subject: form.subject.clone(),
                    description: form.description.clone(),
                    status: form.status.clone(),
                };
                self.support.update_ticket(id, &request).await
            }
            None => {
                self.support
                    .create_ticket(&form.email, &form.subject, &form.description)
                    .await
            }
        };

        match result {
            Ok(ticket) => {
                info!(ticket_id = %ticket.id, "Support ticket saved");
                self.state.update(|s| {
                    clear(s);
                    s.is_loading = false;
                    s.submission_success = true;
                });
                self.fetch_tickets().await;
            }
            Err(e) => {
                warn!(error = %e, "Support ticket not saved");
                self.state.update(|s| {
                    s.is_loading = false;
                    s.error_message = Some(format!("Error: {}", e.user_message()));
                });
            }
        }
    }

    pub async fn delete_ticket(&self, id: &str) {
        match self.support.delete_ticket(id).await {
            Ok(()) => {
                self.state.update(|s| {
                    if s.current_id.as_deref() == Some(id) {
                        clear(s);
                    }
                });
                self.fetch_tickets().await;
            }
            Err(e) => self.state.update(|s| {
                s.error_message = Some(format!("Error deleting ticket: {}", e.user_message()))
            }),
        }
    }

    pub async fn fetch_tickets(&self) {
        match self.support.all_tickets().await {
            Ok(tickets) => self.state.update(|s| s.tickets = tickets),
            Err(e) => self.state.update(|s| {
                s.error_message = Some(format!("Error fetching tickets: {}", e.user_message()))
            }),
        }
    }

    /// The shell has shown the confirmation.
    pub fn on_success_consumed(&self) {
        self.state.update(|s| s.submission_success = false);
    }
}

fn clear(s: &mut SupportState) {
    s.current_id = None;
    s.email.clear();
    s.subject.clear();
    s.description.clear();
    s.status = DEFAULT_TICKET_STATUS.to_string();
}
