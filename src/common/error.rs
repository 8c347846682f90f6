// src/common/error.rs

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{
    common::i18n::I18nStore,
    middleware::i18n::Locale,
    models::team::AppModule,
};

// Erro de domínio. Os handlers convertem para ApiError com `to_api_error`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Validações que não cabem no `validator` (ex: datas cruzadas, layout)
    #[error("Campos inválidos: {0:?}")]
    FieldErrors(HashMap<String, String>),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Cabeçalho X-Tenant-ID ausente")]
    TenantHeaderMissing,

    #[error("Cabeçalho X-Tenant-ID inválido")]
    TenantHeaderInvalid,

    #[error("Sem acesso à agência")]
    TenantAccessDenied,

    #[error("Sem acesso ao módulo {0:?}")]
    ModuleAccessDenied(AppModule),

    #[error("A agência precisa de pelo menos um administrador ativo")]
    LastAdminRequired,

    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(String),

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// O corpo de erro que o cliente recebe.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    /// Status HTTP e chave de tradução de cada variante.
    fn status_and_key(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::ValidationError(_) | AppError::FieldErrors(_) => {
                (StatusCode::BAD_REQUEST, "error.validation")
            }
            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "error.email_exists"),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "error.invalid_credentials"),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "error.invalid_token"),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "error.user_not_found"),
            AppError::TenantHeaderMissing => (StatusCode::BAD_REQUEST, "error.tenant_header_missing"),
            AppError::TenantHeaderInvalid => (StatusCode::BAD_REQUEST, "error.tenant_header_invalid"),
            AppError::TenantAccessDenied => (StatusCode::FORBIDDEN, "error.tenant_access_denied"),
            AppError::ModuleAccessDenied(_) => (StatusCode::FORBIDDEN, "error.module_access_denied"),
            AppError::LastAdminRequired => (StatusCode::CONFLICT, "error.last_admin"),
            AppError::ResourceNotFound(_) => (StatusCode::NOT_FOUND, "error.not_found"),
            AppError::UniqueConstraintViolation(_) => (StatusCode::CONFLICT, "error.conflict"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "error.internal"),
        }
    }

    pub fn to_api_error(self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let (status, key) = self.status_and_key();
        let lang = locale.language();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("🔥 Erro Interno do Servidor: {:?}", self);
        }

        let details = match &self {
            AppError::ValidationError(errors) => {
                let mut details: HashMap<String, Vec<String>> = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let codes = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), codes);
                }
                Some(json!(details))
            }
            AppError::FieldErrors(errors) => {
                let details: HashMap<&String, Vec<&String>> =
                    errors.iter().map(|(field, code)| (field, vec![code])).collect();
                Some(json!(details))
            }
            _ => None,
        };

        let message = match &self {
            AppError::ModuleAccessDenied(module) => {
                format!("{} ({})", i18n.translate(lang, key), module.as_str())
            }
            AppError::ResourceNotFound(what) | AppError::UniqueConstraintViolation(what) => {
                format!("{}: {}", i18n.translate(lang, key), what)
            }
            _ => i18n.translate(lang, key),
        };

        ApiError {
            status,
            error: message,
            details,
        }
    }
}

// Usado quando não há Locale disponível (ex: rotas sem extrator de idioma).
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default(), &I18nStore::new())
            .into_response()
    }
}

/// Converte violação de unicidade em erro amigável; o resto vira DatabaseError.
pub fn map_unique_violation(e: sqlx::Error, message: impl FnOnce() -> String) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::UniqueConstraintViolation(message());
        }
    }
    e.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{ValidationError, ValidationErrors};

    fn locale(lang: &str) -> Locale {
        Locale(lang.to_string())
    }

    #[test]
    fn validation_errors_carry_field_codes() {
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("email");
        err.message = Some("invalid_email".into());
        errors.add("contactEmail", err);

        let api = AppError::ValidationError(errors).to_api_error(&locale("en"), &I18nStore::new());

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.expect("details");
        assert_eq!(details["contactEmail"][0], "invalid_email");
    }

    #[test]
    fn module_denial_names_the_module() {
        let api = AppError::ModuleAccessDenied(AppModule::Coupons)
            .to_api_error(&locale("en"), &I18nStore::new());

        assert_eq!(api.status, StatusCode::FORBIDDEN);
        assert!(api.error.contains("coupons"));
    }

    #[test]
    fn internal_errors_hide_details() {
        let api = AppError::InternalServerError(anyhow::anyhow!("pool exploded"))
            .to_api_error(&locale("de"), &I18nStore::new());

        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.error.contains("pool"));
        assert!(api.details.is_none());
    }

    #[test]
    fn messages_follow_the_locale() {
        let store = I18nStore::new();
        let en = AppError::InvalidToken.to_api_error(&locale("en"), &store);
        let de = AppError::InvalidToken.to_api_error(&locale("de"), &store);

        assert_eq!(en.status, StatusCode::UNAUTHORIZED);
        assert_ne!(en.error, de.error);
    }
}
