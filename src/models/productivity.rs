// src/models/productivity.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- TODOS (pessoais, por usuário) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "todo_priority", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TodoPriority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub owner_id: Uuid,
    #[schema(example = "Angebot an Café Hafenblick schicken")]
    pub title: String,
    pub priority: TodoPriority,
    pub completed: bool,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodoPayload {
    #[validate(length(min = 1, max = 200, message = "invalid_length"))]
    pub title: String,
    #[serde(default = "default_todo_priority")]
    pub priority: TodoPriority,
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed: bool,
}

fn default_todo_priority() -> TodoPriority {
    TodoPriority::Medium
}

// --- CONEXÕES (Agenda de contatos da agência) ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    #[schema(example = "Lena Vogt")]
    pub name: String,
    #[schema(example = "Druckerei Vogt")]
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionPayload {
    #[validate(length(min = 2, message = "name_too_short"))]
    pub name: String,
    pub company: Option<String>,
    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}
