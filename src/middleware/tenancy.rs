// src/middleware/tenancy.rs

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use uuid::Uuid;

use crate::{common::error::AppError, models::team::TeamMember};

// O nome do nosso cabeçalho HTTP customizado
pub const TENANT_ID_HEADER: &str = "x-tenant-id";

// A agência que o usuário quer acessar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantContext(pub Uuid);

impl TenantContext {
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AppError> {
        let value = headers
            .get(TENANT_ID_HEADER)
            .ok_or(AppError::TenantHeaderMissing)?;

        let value_str = value.to_str().map_err(|_| AppError::TenantHeaderInvalid)?;

        Uuid::parse_str(value_str.trim())
            .map(TenantContext)
            .map_err(|_| AppError::TenantHeaderInvalid)
    }
}

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // O tenant_guard já validou; sem ele, lê direto do cabeçalho
        match parts.extensions.get::<TenantContext>() {
            Some(ctx) => Ok(*ctx),
            None => TenantContext::from_headers(&parts.headers),
        }
    }
}

// Vínculo do usuário com a agência (papel e módulos)
#[derive(Debug, Clone)]
pub struct CurrentMember(pub TeamMember);

impl<S> FromRequestParts<S> for CurrentMember
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentMember>()
            .cloned()
            .ok_or(AppError::TenantAccessDenied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(v) = value {
            headers.insert(TENANT_ID_HEADER, HeaderValue::from_str(v).unwrap());
        }
        headers
    }

    #[test]
    fn valid_uuid_is_accepted() {
        let id = Uuid::new_v4();
        let ctx = TenantContext::from_headers(&headers(Some(&id.to_string()))).unwrap();
        assert_eq!(ctx.0, id);
    }

    #[test]
    fn missing_and_malformed_headers_differ() {
        assert!(matches!(
            TenantContext::from_headers(&headers(None)),
            Err(AppError::TenantHeaderMissing)
        ));
        assert!(matches!(
            TenantContext::from_headers(&headers(Some("agentur-nord"))),
            Err(AppError::TenantHeaderInvalid)
        ));
    }
}
