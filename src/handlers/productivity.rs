// src/handlers/productivity.rs

use axum::{
    extract::{Path, State},
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
        rbac::{ConnectionsModule, RequireModule, TodosModule},
        tenancy::TenantContext,
    },
    models::productivity::{Connection, ConnectionPayload, Todo, TodoPayload},
};

// =============================================================================
//  TODOS (sempre do usuário logado)
// =============================================================================

// POST /api/todos
#[utoipa::path(
    post,
    path = "/api/todos",
    tag = "Productivity",
    request_body = TodoPayload,
    responses((status = 201, description = "Todo criado", body = Todo)),
    params(("x-tenant-id" = Uuid, Header, description = "ID da agência")),
    security(("api_jwt" = []))
)]
pub async fn create_todo(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireModule<TodosModule>,
    Json(payload): Json<TodoPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let todo = app_state
        .productivity_service
        .create_todo(tenant.0, user.id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(todo)))
}

// GET /api/todos
#[utoipa::path(
    get,
    path = "/api/todos",
    tag = "Productivity",
    responses((status = 200, description = "Meus todos", body = Vec<Todo>)),
    params(("x-tenant-id" = Uuid, Header, description = "ID da agência")),
    security(("api_jwt" = []))
)]
pub async fn list_todos(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireModule<TodosModule>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = app_state
        .productivity_service
        .list_todos(tenant.0, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(todos))
}

// PUT /api/todos/{id}
#[utoipa::path(
    put,
    path = "/api/todos/{id}",
    tag = "Productivity",
    request_body = TodoPayload,
    responses(
        (status = 200, description = "Todo atualizado", body = Todo),
        (status = 404, description = "Todo não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do todo"),
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_todo(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireModule<TodosModule>,
    Path(todo_id): Path<Uuid>,
    Json(payload): Json<TodoPayload>,
) -> Result<Json<Todo>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let todo = app_state
        .productivity_service
        .update_todo(tenant.0, user.id, todo_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(todo))
}

// POST /api/todos/{id}/toggle
#[utoipa::path(
    post,
    path = "/api/todos/{id}/toggle",
    tag = "Productivity",
    responses(
        (status = 200, description = "Concluído <-> pendente", body = Todo),
        (status = 404, description = "Todo não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do todo"),
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn toggle_todo(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireModule<TodosModule>,
    Path(todo_id): Path<Uuid>,
) -> Result<Json<Todo>, ApiError> {
    let todo = app_state
        .productivity_service
        .toggle_todo(tenant.0, user.id, todo_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(todo))
}

// DELETE /api/todos/{id}
#[utoipa::path(
    delete,
    path = "/api/todos/{id}",
    tag = "Productivity",
    responses(
        (status = 204, description = "Todo removido"),
        (status = 404, description = "Todo não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do todo"),
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_todo(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireModule<TodosModule>,
    Path(todo_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .productivity_service
        .delete_todo(tenant.0, user.id, todo_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  CONEXÕES (contatos de negócio)
// =============================================================================

// POST /api/connections
#[utoipa::path(
    post,
    path = "/api/connections",
    tag = "Productivity",
    request_body = ConnectionPayload,
    responses((status = 201, description = "Contato criado", body = Connection)),
    params(("x-tenant-id" = Uuid, Header, description = "ID da agência")),
    security(("api_jwt" = []))
)]
pub async fn create_connection(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<ConnectionsModule>,
    Json(payload): Json<ConnectionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let connection = app_state
        .productivity_service
        .create_connection(tenant.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(connection)))
}

// GET /api/connections
#[utoipa::path(
    get,
    path = "/api/connections",
    tag = "Productivity",
    responses((status = 200, description = "Contatos", body = Vec<Connection>)),
    params(("x-tenant-id" = Uuid, Header, description = "ID da agência")),
    security(("api_jwt" = []))
)]
pub async fn list_connections(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<ConnectionsModule>,
) -> Result<Json<Vec<Connection>>, ApiError> {
    let connections = app_state
        .productivity_service
        .list_connections(tenant.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(connections))
}

// PUT /api/connections/{id}
#[utoipa::path(
    put,
    path = "/api/connections/{id}",
    tag = "Productivity",
    request_body = ConnectionPayload,
    responses(
        (status = 200, description = "Contato atualizado", body = Connection),
        (status = 404, description = "Contato não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do contato"),
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_connection(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<ConnectionsModule>,
    Path(connection_id): Path<Uuid>,
    Json(payload): Json<ConnectionPayload>,
) -> Result<Json<Connection>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let connection = app_state
        .productivity_service
        .update_connection(tenant.0, connection_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(connection))
}

// DELETE /api/connections/{id}
#[utoipa::path(
    delete,
    path = "/api/connections/{id}",
    tag = "Productivity",
    responses(
        (status = 204, description = "Contato removido"),
        (status = 404, description = "Contato não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do contato"),
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_connection(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<ConnectionsModule>,
    Path(connection_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .productivity_service
        .delete_connection(tenant.0, connection_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
