// src/handlers/tickets.rs

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
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{RequireModule, TicketsModule},
        tenancy::TenantContext,
    },
    models::tickets::{Ticket, TicketListQuery, TicketPayload, UpdateTicketStatusPayload},
};

// POST /api/tickets
#[utoipa::path(
    post,
    path = "/api/tickets",
    tag = "Tickets",
    request_body = TicketPayload,
    responses(
        (status = 201, description = "Ticket aberto", body = Ticket),
        (status = 400, description = "Dados inválidos")
    ),
    params(("x-tenant-id" = Uuid, Header, description = "ID da agência")),
    security(("api_jwt" = []))
)]
pub async fn create_ticket(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireModule<TicketsModule>,
    Json(payload): Json<TicketPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let ticket = app_state
        .ticket_service
        .create(tenant.0, user.id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(ticket)))
}

// GET /api/tickets
#[utoipa::path(
    get,
    path = "/api/tickets",
    tag = "Tickets",
    responses((status = 200, description = "Tickets (opcionalmente por status)", body = Vec<Ticket>)),
    params(
        TicketListQuery,
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_tickets(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<TicketsModule>,
    Query(query): Query<TicketListQuery>,
) -> Result<Json<Vec<Ticket>>, ApiError> {
    let tickets = app_state
        .ticket_service
        .list(tenant.0, query.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(tickets))
}

// GET /api/tickets/{id}
#[utoipa::path(
    get,
    path = "/api/tickets/{id}",
    tag = "Tickets",
    responses(
        (status = 200, description = "Ticket", body = Ticket),
        (status = 404, description = "Ticket não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do ticket"),
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_ticket(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<TicketsModule>,
    Path(ticket_id): Path<Uuid>,
) -> Result<Json<Ticket>, ApiError> {
    let ticket = app_state
        .ticket_service
        .get(tenant.0, ticket_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(ticket))
}

// PUT /api/tickets/{id}
#[utoipa::path(
    put,
    path = "/api/tickets/{id}",
    tag = "Tickets",
    request_body = TicketPayload,
    responses(
        (status = 200, description = "Ticket atualizado", body = Ticket),
        (status = 404, description = "Ticket não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do ticket"),
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_ticket(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<TicketsModule>,
    Path(ticket_id): Path<Uuid>,
    Json(payload): Json<TicketPayload>,
) -> Result<Json<Ticket>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let ticket = app_state
        .ticket_service
        .update(tenant.0, ticket_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(ticket))
}

// PATCH /api/tickets/{id}/status
#[utoipa::path(
    patch,
    path = "/api/tickets/{id}/status",
    tag = "Tickets",
    request_body = UpdateTicketStatusPayload,
    responses(
        (status = 200, description = "Status alterado", body = Ticket),
        (status = 404, description = "Ticket não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do ticket"),
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_ticket_status(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<TicketsModule>,
    Path(ticket_id): Path<Uuid>,
    Json(payload): Json<UpdateTicketStatusPayload>,
) -> Result<Json<Ticket>, ApiError> {
    let ticket = app_state
        .ticket_service
        .update_status(tenant.0, ticket_id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(ticket))
}

// DELETE /api/tickets/{id}
#[utoipa::path(
    delete,
    path = "/api/tickets/{id}",
    tag = "Tickets",
    responses(
        (status = 204, description = "Ticket removido"),
        (status = 404, description = "Ticket não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do ticket"),
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_ticket(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<TicketsModule>,
    Path(ticket_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .ticket_service
        .delete(tenant.0, ticket_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
