// src/models/tickets.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "ticket_priority", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "ticket_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, TicketStatus::Resolved | TicketStatus::Closed)
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    #[schema(example = "Kontaktformular sendet keine Mails")]
    pub subject: String,
    pub description: Option<String>,
    pub priority: TicketPriority,
    pub status: TicketStatus,
    pub customer_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
    // Gravação de áudio anexada (upload fica no storage externo)
    #[schema(example = "https://files.agentur.de/audio/4711.webm")]
    pub audio_url: Option<String>,
    pub created_by: Uuid,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Só aceita URLs absolutas http(s).
pub fn validate_http_url(value: &str) -> Result<(), ValidationError> {
    match url::Url::parse(value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => Ok(()),
        _ => {
            let mut err = ValidationError::new("url");
            err.message = Some("invalid_url".into());
            Err(err)
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketPayload {
    #[validate(length(min = 3, message = "subject_too_short"))]
    pub subject: String,
    pub description: Option<String>,
    #[serde(default = "default_priority")]
    pub priority: TicketPriority,
    pub customer_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
    #[validate(custom(function = "validate_http_url"))]
    pub audio_url: Option<String>,
}

fn default_priority() -> TicketPriority {
    TicketPriority::Medium
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TicketListQuery {
    pub status: Option<TicketStatus>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicketStatusPayload {
    pub status: TicketStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_url_must_be_absolute_http() {
        assert!(validate_http_url("https://files.agentur.de/a.webm").is_ok());
        assert!(validate_http_url("ftp://files.agentur.de/a.webm").is_err());
        assert!(validate_http_url("/relative/a.webm").is_err());
    }

    #[test]
    fn payload_without_audio_is_valid() {
        let payload = TicketPayload {
            subject: "Server down".into(),
            description: None,
            priority: TicketPriority::Urgent,
            customer_id: None,
            assignee_id: None,
            audio_url: None,
        };
        assert!(payload.validate().is_ok());
    }
}
