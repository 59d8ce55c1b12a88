use serde::{Deserialize, Serialize};

pub const DEFAULT_TICKET_STATUS: &str = "Open";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportTicket {
    pub id: String,
    pub contact_email: String,
    pub subject: String,
    pub description: String,
    pub status: String,
}

/// Ticket as the backend returns it. Any field may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportTicketResponse {
    #[serde(default, deserialize_with = "id_as_string")]
    pub id: Option<String>,
    pub contact_email: Option<String>,
    pub subject: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    pub contact_email: String,
    pub subject: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicketRequest {
    pub subject: String,
    pub description: String,
    pub status: String,
}

impl From<SupportTicketResponse> for SupportTicket {
    fn from(dto: SupportTicketResponse) -> Self {
        Self {
            id: dto.id.unwrap_or_default(),
            contact_email: dto.contact_email.unwrap_or_else(|| "No email".to_string()),
            subject: dto.subject.unwrap_or_else(|| "No subject".to_string()),
            description: dto
                .description
                .unwrap_or_else(|| "No description".to_string()),
            status: dto.status.unwrap_or_else(|| "UNKNOWN".to_string()),
        }
    }
}

// Ticket ids are numeric on some backends and strings on others.
fn id_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
