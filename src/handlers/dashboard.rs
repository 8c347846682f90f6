// src/handlers/dashboard.rs

use axum::{extract::State, Json};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{DashboardModule, RequireModule},
        tenancy::TenantContext,
    },
    models::dashboard::{DashboardLayout, DashboardSummary, SaveLayoutPayload},
};

// GET /api/dashboard/summary
#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Contadores do mês corrente", body = DashboardSummary),
        (status = 401, description = "Não autorizado"),
        (status = 403, description = "Sem acesso ao módulo")
    ),
    params(("x-tenant-id" = Uuid, Header, description = "ID da agência")),
    security(("api_jwt" = []))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<DashboardModule>,
) -> Result<Json<DashboardSummary>, ApiError> {
    let summary = app_state
        .dashboard_service
        .get_summary(tenant.0, Utc::now().date_naive())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(summary))
}

// GET /api/dashboard/layout
#[utoipa::path(
    get,
    path = "/api/dashboard/layout",
    tag = "Dashboard",
    responses((status = 200, description = "Layout salvo ou o padrão", body = DashboardLayout)),
    params(("x-tenant-id" = Uuid, Header, description = "ID da agência")),
    security(("api_jwt" = []))
)]
pub async fn get_layout(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireModule<DashboardModule>,
) -> Result<Json<DashboardLayout>, ApiError> {
    let layout = app_state
        .dashboard_service
        .get_layout(tenant.0, user.id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(layout))
}

// PUT /api/dashboard/layout
#[utoipa::path(
    put,
    path = "/api/dashboard/layout",
    tag = "Dashboard",
    request_body = SaveLayoutPayload,
    responses(
        (status = 200, description = "Layout salvo", body = DashboardLayout),
        (status = 400, description = "Widget desconhecido, repetido ou com tamanho inválido")
    ),
    params(("x-tenant-id" = Uuid, Header, description = "ID da agência")),
    security(("api_jwt" = []))
)]
pub async fn save_layout(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireModule<DashboardModule>,
    Json(payload): Json<SaveLayoutPayload>,
) -> Result<Json<DashboardLayout>, ApiError> {
    let layout = app_state
        .dashboard_service
        .save_layout(tenant.0, user.id, payload.widgets)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(layout))
}
