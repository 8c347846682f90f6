// src/models/mail.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidateEmail, ValidationError};

use crate::models::team::Department;

pub const CUSTOMER_NAME_PLACEHOLDER: &str = "customer_name";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "email_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmailStatus {
    Sent,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "mail_provider", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MailProvider {
    Google,
    Microsoft,
}

// E-mail registrado (enviado ou com falha)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Email {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub sent_by: Uuid,
    pub department: Department,
    #[schema(example = "sales@agentur.de")]
    pub from_address: String,
    pub to_addresses: Vec<String>,
    pub cc_addresses: Vec<String>,
    pub subject: String,
    pub body: String,
    pub customer_id: Option<Uuid>,
    pub status: EmailStatus,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Mensagem pronta para o transporte
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Remetente por departamento (MAIL_FROM_<DEPARTAMENTO>).
#[derive(Debug, Clone)]
pub struct SenderDirectory {
    senders: HashMap<Department, String>,
}

impl SenderDirectory {
    pub fn new(senders: HashMap<Department, String>) -> Self {
        Self { senders }
    }

    #[cfg(test)]
    pub fn with_defaults() -> Self {
        let senders = Department::ALL
            .into_iter()
            .map(|d| (d, format!("{}@agency.local", d.as_str())))
            .collect();
        Self { senders }
    }

    pub fn sender_for(&self, department: Department) -> Option<&str> {
        self.senders.get(&department).map(String::as_str)
    }
}

/// Substitui `{{customer_name}}` (com ou sem espaços internos).
/// Outros placeholders ficam como estão.
pub fn render_template(text: &str, values: &HashMap<&str, String>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 2..];
        match after_open.find("}}") {
            Some(close) => {
                let name = after_open[..close].trim();
                match values.get(name) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[open..open + 2 + close + 2]),
                }
                rest = &after_open[close + 2..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

// Valida como será enviado: o envio apara os espaços das pontas
fn validate_address_list(list: &[String]) -> Result<(), ValidationError> {
    if list.iter().all(|addr| addr.trim().validate_email()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("email");
        err.message = Some("invalid_email".into());
        Err(err)
    }
}

fn validate_recipients(list: &[String]) -> Result<(), ValidationError> {
    if list.is_empty() {
        let mut err = ValidationError::new("length");
        err.message = Some("at_least_one_recipient".into());
        return Err(err);
    }
    validate_address_list(list)
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComposeEmailPayload {
    pub department: Department,
    #[validate(custom(function = "validate_recipients"))]
    #[schema(example = json!(["info@baeckerei-schulz.de"]))]
    pub to: Vec<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_address_list"))]
    pub cc: Vec<String>,
    #[validate(length(min = 1, max = 200, message = "invalid_subject"))]
    #[schema(example = "Ihr Monatsreport, {{customer_name}}")]
    pub subject: String,
    #[validate(length(min = 1, message = "required"))]
    pub body: String,
    pub customer_id: Option<Uuid>,
}

// --- VÍNCULO DE CONTA (OAuth) ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LinkedMailAccount {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub provider: MailProvider,
    // Código de autorização recebido; a troca por tokens é feita fora daqui
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub authorization_code: String,
    pub linked_at: DateTime<Utc>,
}

// Conteúdo assinado do parâmetro `state`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OAuthStateClaims {
    pub sub: Uuid,
    pub tenant_id: Uuid,
    pub provider: MailProvider,
    pub exp: usize,
    pub iat: usize,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OAuthStartPayload {
    pub provider: MailProvider,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OAuthStartResponse {
    pub state: String,
    pub expires_in_secs: i64,
}

// Query da URL de retorno; o provedor pode mandar `error` no lugar de `code`
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(name: &str) -> HashMap<&'static str, String> {
        HashMap::from([(CUSTOMER_NAME_PLACEHOLDER, name.to_string())])
    }

    #[test]
    fn customer_name_is_rendered() {
        let out = render_template("Hallo {{customer_name}}, danke! ({{ customer_name }})", &values("Bäckerei Schulz"));
        assert_eq!(out, "Hallo Bäckerei Schulz, danke! (Bäckerei Schulz)");
    }

    #[test]
    fn unknown_and_broken_placeholders_stay() {
        let out = render_template("{{unknown}} and {{customer_name", &values("X"));
        assert_eq!(out, "{{unknown}} and {{customer_name");
    }

    #[test]
    fn every_department_has_a_default_sender() {
        let dir = SenderDirectory::with_defaults();
        for d in Department::ALL {
            assert!(dir.sender_for(d).is_some());
        }
        assert_eq!(dir.sender_for(Department::Sales), Some("sales@agency.local"));
    }

    #[test]
    fn all_addresses_are_validated() {
        let payload = ComposeEmailPayload {
            department: Department::Support,
            to: vec!["ok@kunde.de".into()],
            cc: vec!["not-an-address".into()],
            subject: "Hi".into(),
            body: "Body".into(),
            customer_id: None,
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("cc"));

        let empty = ComposeEmailPayload {
            to: vec![],
            cc: vec![],
            ..payload
        };
        assert!(empty.validate().unwrap_err().field_errors().contains_key("to"));
    }

    #[test]
    fn surrounding_spaces_do_not_reject_an_address() {
        let payload = ComposeEmailPayload {
            department: Department::Sales,
            to: vec![" info@x.de ".into()],
            cc: vec!["\tbuero@x.de".into()],
            subject: "Angebot".into(),
            body: "Anbei".into(),
            customer_id: None,
        };
        assert!(payload.validate().is_ok());

        let inner_space = ComposeEmailPayload {
            to: vec!["in fo@x.de".into()],
            ..payload
        };
        assert!(inner_space.validate().is_err());
    }
}
