// src/handlers/marketing.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{MarketingModule, RequireModule},
        tenancy::TenantContext,
    },
    models::marketing::{
        CalendarQuery, ContentItem, ContentItemPayload, GeoHit, GeoSearchQuery, MarketingEvent,
        ScheduleEventPayload, TakeContentQuery, UpdateEventStatusPayload,
    },
};

// =============================================================================
//  ÁREA 1: POOL DE CONTEÚDO
// =============================================================================

// POST /api/marketing/content
#[utoipa::path(
    post,
    path = "/api/marketing/content",
    tag = "Marketing",
    request_body = ContentItemPayload,
    responses((status = 201, description = "Conteúdo adicionado ao pool", body = ContentItem)),
    params(("x-tenant-id" = Uuid, Header, description = "ID da agência")),
    security(("api_jwt" = []))
)]
pub async fn create_content(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<MarketingModule>,
    Json(payload): Json<ContentItemPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let item = app_state
        .marketing_service
        .create_content(tenant.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(item)))
}

// GET /api/marketing/content
#[utoipa::path(
    get,
    path = "/api/marketing/content",
    tag = "Marketing",
    responses((status = 200, description = "Pool de conteúdo", body = Vec<ContentItem>)),
    params(("x-tenant-id" = Uuid, Header, description = "ID da agência")),
    security(("api_jwt" = []))
)]
pub async fn list_content(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<MarketingModule>,
) -> Result<Json<Vec<ContentItem>>, ApiError> {
    let items = app_state
        .marketing_service
        .list_content(tenant.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(items))
}

// PUT /api/marketing/content/{id}
#[utoipa::path(
    put,
    path = "/api/marketing/content/{id}",
    tag = "Marketing",
    request_body = ContentItemPayload,
    responses(
        (status = 200, description = "Conteúdo atualizado", body = ContentItem),
        (status = 404, description = "Conteúdo não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do conteúdo"),
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_content(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<MarketingModule>,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<ContentItemPayload>,
) -> Result<Json<ContentItem>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let item = app_state
        .marketing_service
        .update_content(tenant.0, item_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(item))
}

// DELETE /api/marketing/content/{id}
#[utoipa::path(
    delete,
    path = "/api/marketing/content/{id}",
    tag = "Marketing",
    responses(
        (status = 204, description = "Conteúdo removido"),
        (status = 404, description = "Conteúdo não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do conteúdo"),
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_content(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<MarketingModule>,
    Path(item_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .marketing_service
        .delete_content(tenant.0, item_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/marketing/content/take
#[utoipa::path(
    post,
    path = "/api/marketing/content/take",
    tag = "Marketing",
    responses(
        (status = 200, description = "Próximo conteúdo não usado, agora marcado como usado", body = ContentItem),
        (status = 404, description = "Pool vazio")
    ),
    params(
        TakeContentQuery,
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn take_next_content(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<MarketingModule>,
    Query(query): Query<TakeContentQuery>,
) -> Result<Json<ContentItem>, ApiError> {
    let item = app_state
        .marketing_service
        .take_next_content(tenant.0, query.channel)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(item))
}

// =============================================================================
//  ÁREA 2: CALENDÁRIO
// =============================================================================

// POST /api/marketing/events
#[utoipa::path(
    post,
    path = "/api/marketing/events",
    tag = "Marketing",
    request_body = ScheduleEventPayload,
    responses(
        (status = 201, description = "Evento agendado", body = MarketingEvent),
        (status = 400, description = "Fim antes do início")
    ),
    params(("x-tenant-id" = Uuid, Header, description = "ID da agência")),
    security(("api_jwt" = []))
)]
pub async fn schedule_event(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<MarketingModule>,
    Json(payload): Json<ScheduleEventPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let event = app_state
        .marketing_service
        .schedule_event(tenant.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(event)))
}

// GET /api/marketing/events
#[utoipa::path(
    get,
    path = "/api/marketing/events",
    tag = "Marketing",
    responses((status = 200, description = "Eventos que tocam o intervalo", body = Vec<MarketingEvent>)),
    params(
        CalendarQuery,
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_events(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<MarketingModule>,
    Query(range): Query<CalendarQuery>,
) -> Result<Json<Vec<MarketingEvent>>, ApiError> {
    let events = app_state
        .marketing_service
        .list_events(tenant.0, &range)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(events))
}

// PATCH /api/marketing/events/{id}/status
#[utoipa::path(
    patch,
    path = "/api/marketing/events/{id}/status",
    tag = "Marketing",
    request_body = UpdateEventStatusPayload,
    responses(
        (status = 200, description = "Status alterado", body = MarketingEvent),
        (status = 404, description = "Evento não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do evento"),
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_event_status(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<MarketingModule>,
    Path(event_id): Path<Uuid>,
    Json(payload): Json<UpdateEventStatusPayload>,
) -> Result<Json<MarketingEvent>, ApiError> {
    let event = app_state
        .marketing_service
        .update_event_status(tenant.0, event_id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(event))
}

// DELETE /api/marketing/events/{id}
#[utoipa::path(
    delete,
    path = "/api/marketing/events/{id}",
    tag = "Marketing",
    responses(
        (status = 204, description = "Evento removido"),
        (status = 404, description = "Evento não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do evento"),
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_event(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<MarketingModule>,
    Path(event_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .marketing_service
        .delete_event(tenant.0, event_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ÁREA 3: GEOMARKETING
// =============================================================================

// GET /api/marketing/geo/search
#[utoipa::path(
    get,
    path = "/api/marketing/geo/search",
    tag = "Marketing",
    responses(
        (status = 200, description = "Empresas no raio, mais próximas primeiro", body = Vec<GeoHit>),
        (status = 400, description = "Coordenadas ou raio inválidos")
    ),
    params(
        GeoSearchQuery,
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn geo_search(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<MarketingModule>,
    Query(query): Query<GeoSearchQuery>,
) -> Result<Json<Vec<GeoHit>>, ApiError> {
    query
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let hits = app_state
        .marketing_service
        .search_nearby(tenant.0, &query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(hits))
}
