// src/handlers/mail.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{MailModule, RequireModule},
        tenancy::TenantContext,
    },
    models::mail::{
        ComposeEmailPayload, Email, LinkedMailAccount, OAuthCallbackQuery, OAuthStartPayload, OAuthStartResponse,
    },
};

// POST /api/mail/send
#[utoipa::path(
    post,
    path = "/api/mail/send",
    tag = "Mail",
    request_body = ComposeEmailPayload,
    responses(
        (status = 201, description = "E-mail gravado (SENT ou FAILED)", body = Email),
        (status = 400, description = "Destinatários inválidos ou departamento sem remetente")
    ),
    params(("x-tenant-id" = Uuid, Header, description = "ID da agência")),
    security(("api_jwt" = []))
)]
pub async fn send_email(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireModule<MailModule>,
    Json(payload): Json<ComposeEmailPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let email = app_state
        .mail_service
        .compose(tenant.0, user.id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(email)))
}

// GET /api/mail/emails
#[utoipa::path(
    get,
    path = "/api/mail/emails",
    tag = "Mail",
    responses((status = 200, description = "Histórico de envios", body = Vec<Email>)),
    params(("x-tenant-id" = Uuid, Header, description = "ID da agência")),
    security(("api_jwt" = []))
)]
pub async fn list_emails(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<MailModule>,
) -> Result<Json<Vec<Email>>, ApiError> {
    let emails = app_state
        .mail_service
        .list_emails(tenant.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(emails))
}

// GET /api/mail/accounts
#[utoipa::path(
    get,
    path = "/api/mail/accounts",
    tag = "Mail",
    responses((status = 200, description = "Contas vinculadas do usuário", body = Vec<LinkedMailAccount>)),
    params(("x-tenant-id" = Uuid, Header, description = "ID da agência")),
    security(("api_jwt" = []))
)]
pub async fn list_accounts(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireModule<MailModule>,
) -> Result<Json<Vec<LinkedMailAccount>>, ApiError> {
    let accounts = app_state
        .mail_service
        .list_accounts(tenant.0, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(accounts))
}

// POST /api/integrations/mail/oauth/start
#[utoipa::path(
    post,
    path = "/api/integrations/mail/oauth/start",
    tag = "Mail",
    request_body = OAuthStartPayload,
    responses((status = 200, description = "State assinado para a URL do provedor", body = OAuthStartResponse)),
    params(("x-tenant-id" = Uuid, Header, description = "ID da agência")),
    security(("api_jwt" = []))
)]
pub async fn start_oauth(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireModule<MailModule>,
    Json(payload): Json<OAuthStartPayload>,
) -> Result<Json<OAuthStartResponse>, ApiError> {
    let response = app_state
        .mail_service
        .issue_oauth_state(user.id, tenant.0, payload.provider)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(response))
}

// GET /api/integrations/mail/oauth/callback
// Rota pública: quem chega aqui é o navegador voltando do provedor.
#[utoipa::path(
    get,
    path = "/api/integrations/mail/oauth/callback",
    tag = "Mail",
    responses((status = 303, description = "Redireciona para /settings/mail?linked=success|error")),
    params(OAuthCallbackQuery)
)]
pub async fn oauth_callback(
    State(app_state): State<AppState>,
    Query(query): Query<OAuthCallbackQuery>,
) -> Redirect {
    let target = app_state.mail_service.handle_oauth_callback(&query).await;
    Redirect::to(&target)
}
