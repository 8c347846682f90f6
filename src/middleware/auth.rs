// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        tenancy::{CurrentMember, TenantContext},
    },
    models::auth::User,
};

// Usuário autenticado, colocado nas extensions pelo auth_guard
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::InvalidToken)
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<Authorization<Bearer>, AppError> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .ok_or(AppError::InvalidToken)
}

/// Lê o `Authorization: Bearer` e carrega o usuário do token.
async fn authenticate(app_state: &AppState, headers: &HeaderMap) -> Result<User, AppError> {
    let bearer = bearer_token(headers)?;
    app_state.auth_service.validate_token(bearer.token()).await
}

// Rotas que só exigem login (ex: /api/users, /api/tenants)
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let locale = Locale::from_headers(request.headers());

    let user = authenticate(&app_state, request.headers())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    request.extensions_mut().insert(AuthenticatedUser(user));
    Ok(next.run(request).await)
}

// Rotas de uma agência: login + X-Tenant-ID + membro ativo
pub async fn tenant_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let locale = Locale::from_headers(request.headers());
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    // Token e cabeçalho são checados antes de qualquer consulta
    let claims = bearer_token(request.headers())
        .and_then(|bearer| app_state.auth_service.decode_claims(bearer.token()))
        .map_err(to_api)?;
    let tenant = TenantContext::from_headers(request.headers()).map_err(to_api)?;

    let user = app_state.auth_service.load_user(claims.sub).await.map_err(to_api)?;

    let member = app_state
        .team_service
        .find_active_member(tenant.0, user.id)
        .await
        .map_err(to_api)?
        .ok_or_else(|| {
            tracing::warn!("🚫 Usuário {} sem acesso à agência {}", user.id, tenant.0);
            to_api(AppError::TenantAccessDenied)
        })?;

    let extensions = request.extensions_mut();
    extensions.insert(AuthenticatedUser(user));
    extensions.insert(tenant);
    extensions.insert(CurrentMember(member));

    Ok(next.run(request).await)
}
