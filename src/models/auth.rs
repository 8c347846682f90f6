// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::team::MemberRole;

// Usuário vindo do banco
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    #[schema(example = "anna@agentur.de")]
    pub email: String,
    #[schema(example = "Anna Becker")]
    pub display_name: String,

    #[serde(skip_serializing)] // Nunca sai na resposta
    #[schema(ignore)]
    pub password_hash: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(email(message = "invalid_email"))]
    #[schema(example = "anna@agentur.de")]
    pub email: String,

    #[validate(length(min = 8, message = "password_too_short"))]
    #[schema(example = "s3cret-pass")]
    pub password: String,

    #[validate(length(min = 2, message = "name_too_short"))]
    #[schema(example = "Anna Becker")]
    pub display_name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginUserPayload {
    #[validate(email(message = "invalid_email"))]
    pub email: String,
    #[validate(length(min = 1, message = "required"))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

// As agências às quais o usuário pertence (GET /api/users/me/tenants)
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserTenant {
    pub id: Uuid,
    #[schema(example = "Agentur Nord")]
    pub name: String,
    pub role: MemberRole,
}

// Conteúdo do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // ID do usuário
    pub exp: usize, // Expira em
    pub iat: usize, // Emitido em
}
