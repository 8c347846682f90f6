// src/handlers/team.rs

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
        rbac::{RequireModule, TeamModule},
        tenancy::{CurrentMember, TenantContext},
    },
    models::team::{AddMemberPayload, CreateTenantPayload, TeamMember, Tenant, UpdatePermissionsPayload},
};

// POST /api/tenants
#[utoipa::path(
    post,
    path = "/api/tenants",
    tag = "Team",
    request_body = CreateTenantPayload,
    responses(
        (status = 201, description = "Agência criada; o criador vira Admin", body = Tenant),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_tenant(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateTenantPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let tenant = app_state
        .team_service
        .create_tenant_with_owner(payload.name.trim(), user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(tenant)))
}

// GET /api/team/me
#[utoipa::path(
    get,
    path = "/api/team/me",
    tag = "Team",
    responses(
        (status = 200, description = "Meu vínculo com a agência (papel e módulos)", body = TeamMember)
    ),
    params(("x-tenant-id" = Uuid, Header, description = "ID da agência")),
    security(("api_jwt" = []))
)]
pub async fn get_my_membership(CurrentMember(member): CurrentMember) -> Json<TeamMember> {
    Json(member)
}

// GET /api/team/members
#[utoipa::path(
    get,
    path = "/api/team/members",
    tag = "Team",
    responses(
        (status = 200, description = "Membros da agência", body = Vec<TeamMember>),
        (status = 403, description = "Sem acesso ao módulo team")
    ),
    params(("x-tenant-id" = Uuid, Header, description = "ID da agência")),
    security(("api_jwt" = []))
)]
pub async fn list_members(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<TeamModule>,
) -> Result<Json<Vec<TeamMember>>, ApiError> {
    let members = app_state
        .team_service
        .list_members(tenant.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(members))
}

// POST /api/team/members
#[utoipa::path(
    post,
    path = "/api/team/members",
    tag = "Team",
    request_body = AddMemberPayload,
    responses(
        (status = 201, description = "Membro adicionado", body = TeamMember),
        (status = 404, description = "Usuário não registrado"),
        (status = 409, description = "Já é membro")
    ),
    params(("x-tenant-id" = Uuid, Header, description = "ID da agência")),
    security(("api_jwt" = []))
)]
pub async fn add_member(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<TeamModule>,
    Json(payload): Json<AddMemberPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let member = app_state
        .team_service
        .add_member(tenant.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(member)))
}

// PUT /api/team/members/{id}/permissions
#[utoipa::path(
    put,
    path = "/api/team/members/{id}/permissions",
    tag = "Team",
    request_body = UpdatePermissionsPayload,
    responses(
        (status = 200, description = "Permissões atualizadas", body = TeamMember),
        (status = 409, description = "Removeria o último administrador")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do membro"),
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_permissions(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<TeamModule>,
    Path(member_id): Path<Uuid>,
    Json(payload): Json<UpdatePermissionsPayload>,
) -> Result<Json<TeamMember>, ApiError> {
    let member = app_state
        .team_service
        .update_permissions(tenant.0, member_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(member))
}

// DELETE /api/team/members/{id}
#[utoipa::path(
    delete,
    path = "/api/team/members/{id}",
    tag = "Team",
    responses(
        (status = 204, description = "Membro desativado"),
        (status = 409, description = "Removeria o último administrador")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do membro"),
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn deactivate_member(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<TeamModule>,
    Path(member_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .team_service
        .deactivate_member(tenant.0, member_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
