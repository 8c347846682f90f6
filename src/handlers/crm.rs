// src/handlers/crm.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{CrmModule, RequireModule},
        tenancy::TenantContext,
    },
    models::crm::{
        CreateCustomerPayload, Customer, CustomerDetail, CustomerListQuery, CustomerService,
        ImportProspectsPayload, ImportSummary, ServicesDueQuery, UpdateCustomerPayload,
        UpdateServiceStatusPayload,
    },
};

// =============================================================================
//  ÁREA 1: CLIENTES
// =============================================================================

// POST /api/crm/customers
#[utoipa::path(
    post,
    path = "/api/crm/customers",
    tag = "CRM",
    request_body = CreateCustomerPayload,
    responses(
        (status = 201, description = "Cliente criado com os serviços do plano", body = CustomerDetail),
        (status = 400, description = "Dados inválidos")
    ),
    params(("x-tenant-id" = Uuid, Header, description = "ID da agência")),
    security(("api_jwt" = []))
)]
pub async fn create_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<CrmModule>,
    Json(payload): Json<CreateCustomerPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let detail = app_state
        .crm_service
        .create_customer(tenant.0, &payload, Utc::now().date_naive())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(detail)))
}

// GET /api/crm/customers
#[utoipa::path(
    get,
    path = "/api/crm/customers",
    tag = "CRM",
    responses((status = 200, description = "Lista de clientes", body = Vec<Customer>)),
    params(
        CustomerListQuery,
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_customers(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<CrmModule>,
    Query(query): Query<CustomerListQuery>,
) -> Result<Json<Vec<Customer>>, ApiError> {
    let customers = app_state
        .crm_service
        .list_customers(tenant.0, query.search.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(customers))
}

// GET /api/crm/customers/{id}
#[utoipa::path(
    get,
    path = "/api/crm/customers/{id}",
    tag = "CRM",
    responses(
        (status = 200, description = "Cliente com serviços", body = CustomerDetail),
        (status = 404, description = "Cliente não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do cliente"),
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<CrmModule>,
    Path(customer_id): Path<Uuid>,
) -> Result<Json<CustomerDetail>, ApiError> {
    let detail = app_state
        .crm_service
        .get_customer(tenant.0, customer_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(detail))
}

// PUT /api/crm/customers/{id}
#[utoipa::path(
    put,
    path = "/api/crm/customers/{id}",
    tag = "CRM",
    request_body = UpdateCustomerPayload,
    responses(
        (status = 200, description = "Cliente atualizado", body = Customer),
        (status = 404, description = "Cliente não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do cliente"),
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<CrmModule>,
    Path(customer_id): Path<Uuid>,
    Json(payload): Json<UpdateCustomerPayload>,
) -> Result<Json<Customer>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let customer = app_state
        .crm_service
        .update_customer(tenant.0, customer_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(customer))
}

// DELETE /api/crm/customers/{id}
#[utoipa::path(
    delete,
    path = "/api/crm/customers/{id}",
    tag = "CRM",
    responses(
        (status = 204, description = "Cliente removido"),
        (status = 404, description = "Cliente não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do cliente"),
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<CrmModule>,
    Path(customer_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .crm_service
        .delete_customer(tenant.0, customer_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ÁREA 2: SERVIÇOS RECORRENTES
// =============================================================================

// PATCH /api/crm/services/{id}/status
#[utoipa::path(
    patch,
    path = "/api/crm/services/{id}/status",
    tag = "CRM",
    request_body = UpdateServiceStatusPayload,
    responses(
        (status = 200, description = "Status alterado", body = CustomerService),
        (status = 404, description = "Serviço não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do serviço"),
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_service_status(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<CrmModule>,
    Path(service_id): Path<Uuid>,
    Json(payload): Json<UpdateServiceStatusPayload>,
) -> Result<Json<CustomerService>, ApiError> {
    let service = app_state
        .crm_service
        .update_service_status(tenant.0, service_id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(service))
}

// POST /api/crm/services/{id}/complete
#[utoipa::path(
    post,
    path = "/api/crm/services/{id}/complete",
    tag = "CRM",
    responses(
        (status = 200, description = "Execução registrada; próximo vencimento calculado", body = CustomerService),
        (status = 400, description = "Serviço não está ativo"),
        (status = 404, description = "Serviço não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do serviço"),
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn complete_service(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<CrmModule>,
    Path(service_id): Path<Uuid>,
) -> Result<Json<CustomerService>, ApiError> {
    let service = app_state
        .crm_service
        .complete_service(tenant.0, service_id, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(service))
}

// GET /api/crm/services/due
#[utoipa::path(
    get,
    path = "/api/crm/services/due",
    tag = "CRM",
    responses((status = 200, description = "Serviços ativos vencendo até a data", body = Vec<CustomerService>)),
    params(
        ServicesDueQuery,
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn services_due(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<CrmModule>,
    Query(query): Query<ServicesDueQuery>,
) -> Result<Json<Vec<CustomerService>>, ApiError> {
    let until = query.until.unwrap_or_else(|| Utc::now().date_naive());

    let services = app_state
        .crm_service
        .services_due(tenant.0, until)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(services))
}

// =============================================================================
//  ÁREA 3: PROSPECTS
// =============================================================================

// POST /api/crm/prospects/import
#[utoipa::path(
    post,
    path = "/api/crm/prospects/import",
    tag = "CRM",
    request_body = ImportProspectsPayload,
    responses(
        (status = 200, description = "Importação concluída; duplicados ignorados", body = ImportSummary),
        (status = 400, description = "Dados inválidos")
    ),
    params(("x-tenant-id" = Uuid, Header, description = "ID da agência")),
    security(("api_jwt" = []))
)]
pub async fn import_prospects(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<CrmModule>,
    Json(payload): Json<ImportProspectsPayload>,
) -> Result<Json<ImportSummary>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let summary = app_state
        .crm_service
        .import_prospects(tenant.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(summary))
}
