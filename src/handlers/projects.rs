// src/handlers/projects.rs

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
        i18n::Locale,
        rbac::{ProjectsModule, RequireModule},
        tenancy::TenantContext,
    },
    models::projects::{Project, ProjectPayload, ProjectTimeline, Task, TaskPayload, UpdateTaskStatusPayload},
};

// =============================================================================
//  PROJETOS
// =============================================================================

// POST /api/projects
#[utoipa::path(
    post,
    path = "/api/projects",
    tag = "Projects",
    request_body = ProjectPayload,
    responses(
        (status = 201, description = "Projeto criado", body = Project),
        (status = 400, description = "Dados inválidos")
    ),
    params(("x-tenant-id" = Uuid, Header, description = "ID da agência")),
    security(("api_jwt" = []))
)]
pub async fn create_project(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<ProjectsModule>,
    Json(payload): Json<ProjectPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let project = app_state
        .project_service
        .create_project(tenant.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(project)))
}

// GET /api/projects
#[utoipa::path(
    get,
    path = "/api/projects",
    tag = "Projects",
    responses((status = 200, description = "Lista de projetos", body = Vec<Project>)),
    params(("x-tenant-id" = Uuid, Header, description = "ID da agência")),
    security(("api_jwt" = []))
)]
pub async fn list_projects(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<ProjectsModule>,
) -> Result<Json<Vec<Project>>, ApiError> {
    let projects = app_state
        .project_service
        .list_projects(tenant.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(projects))
}

// GET /api/projects/{id}
#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    tag = "Projects",
    responses(
        (status = 200, description = "Projeto", body = Project),
        (status = 404, description = "Projeto não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do projeto"),
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_project(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<ProjectsModule>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Project>, ApiError> {
    let project = app_state
        .project_service
        .get_project(tenant.0, project_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(project))
}

// PUT /api/projects/{id}
#[utoipa::path(
    put,
    path = "/api/projects/{id}",
    tag = "Projects",
    request_body = ProjectPayload,
    responses(
        (status = 200, description = "Projeto atualizado", body = Project),
        (status = 404, description = "Projeto não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do projeto"),
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_project(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<ProjectsModule>,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<ProjectPayload>,
) -> Result<Json<Project>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let project = app_state
        .project_service
        .update_project(tenant.0, project_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(project))
}

// DELETE /api/projects/{id}
#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    tag = "Projects",
    responses(
        (status = 204, description = "Projeto e tarefas removidos"),
        (status = 404, description = "Projeto não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do projeto"),
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_project(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<ProjectsModule>,
    Path(project_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .project_service
        .delete_project(tenant.0, project_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/projects/{id}/timeline
#[utoipa::path(
    get,
    path = "/api/projects/{id}/timeline",
    tag = "Projects",
    responses(
        (status = 200, description = "Linha do tempo (Gantt)", body = ProjectTimeline),
        (status = 404, description = "Projeto não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do projeto"),
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_timeline(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<ProjectsModule>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<ProjectTimeline>, ApiError> {
    let timeline = app_state
        .project_service
        .timeline(tenant.0, project_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(timeline))
}

// =============================================================================
//  TAREFAS
// =============================================================================

// POST /api/projects/{id}/tasks
#[utoipa::path(
    post,
    path = "/api/projects/{id}/tasks",
    tag = "Projects",
    request_body = TaskPayload,
    responses(
        (status = 201, description = "Tarefa criada", body = Task),
        (status = 404, description = "Projeto não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do projeto"),
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_task(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<ProjectsModule>,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<TaskPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let task = app_state
        .project_service
        .create_task(tenant.0, project_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(task)))
}

// GET /api/projects/{id}/tasks
#[utoipa::path(
    get,
    path = "/api/projects/{id}/tasks",
    tag = "Projects",
    responses((status = 200, description = "Tarefas do projeto", body = Vec<Task>)),
    params(
        ("id" = Uuid, Path, description = "ID do projeto"),
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_tasks(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<ProjectsModule>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = app_state
        .project_service
        .list_tasks(tenant.0, project_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(tasks))
}

// PUT /api/tasks/{id}
#[utoipa::path(
    put,
    path = "/api/tasks/{id}",
    tag = "Projects",
    request_body = TaskPayload,
    responses(
        (status = 200, description = "Tarefa atualizada", body = Task),
        (status = 404, description = "Tarefa não encontrada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da tarefa"),
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_task(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<ProjectsModule>,
    Path(task_id): Path<Uuid>,
    Json(payload): Json<TaskPayload>,
) -> Result<Json<Task>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let task = app_state
        .project_service
        .update_task(tenant.0, task_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(task))
}

// PATCH /api/tasks/{id}/status
#[utoipa::path(
    patch,
    path = "/api/tasks/{id}/status",
    tag = "Projects",
    request_body = UpdateTaskStatusPayload,
    responses(
        (status = 200, description = "Tarefa movida no quadro", body = Task),
        (status = 404, description = "Tarefa não encontrada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da tarefa"),
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_task_status(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<ProjectsModule>,
    Path(task_id): Path<Uuid>,
    Json(payload): Json<UpdateTaskStatusPayload>,
) -> Result<Json<Task>, ApiError> {
    let task = app_state
        .project_service
        .update_task_status(tenant.0, task_id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(task))
}

// DELETE /api/tasks/{id}
#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    tag = "Projects",
    responses(
        (status = 204, description = "Tarefa removida"),
        (status = 404, description = "Tarefa não encontrada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da tarefa"),
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_task(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<ProjectsModule>,
    Path(task_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .project_service
        .delete_task(tenant.0, task_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
