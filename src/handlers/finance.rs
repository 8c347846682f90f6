// src/handlers/finance.rs

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
        rbac::{FinanceModule, RequireModule},
        tenancy::TenantContext,
    },
    models::finance::{Expense, ExpensePayload, ExpenseRangeQuery, MonthlyExpenseTotal},
};

// POST /api/finance/expenses
#[utoipa::path(
    post,
    path = "/api/finance/expenses",
    tag = "Finance",
    request_body = ExpensePayload,
    responses(
        (status = 201, description = "Despesa lançada", body = Expense),
        (status = 400, description = "Dados inválidos")
    ),
    params(("x-tenant-id" = Uuid, Header, description = "ID da agência")),
    security(("api_jwt" = []))
)]
pub async fn create_expense(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireModule<FinanceModule>,
    Json(payload): Json<ExpensePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let expense = app_state
        .finance_service
        .create_expense(tenant.0, user.id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(expense)))
}

// GET /api/finance/expenses
#[utoipa::path(
    get,
    path = "/api/finance/expenses",
    tag = "Finance",
    responses((status = 200, description = "Despesas no período", body = Vec<Expense>)),
    params(
        ExpenseRangeQuery,
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_expenses(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<FinanceModule>,
    Query(range): Query<ExpenseRangeQuery>,
) -> Result<Json<Vec<Expense>>, ApiError> {
    let expenses = app_state
        .finance_service
        .list_expenses(tenant.0, range.from, range.to)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(expenses))
}

// PUT /api/finance/expenses/{id}
#[utoipa::path(
    put,
    path = "/api/finance/expenses/{id}",
    tag = "Finance",
    request_body = ExpensePayload,
    responses(
        (status = 200, description = "Despesa atualizada", body = Expense),
        (status = 404, description = "Despesa não encontrada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da despesa"),
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_expense(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<FinanceModule>,
    Path(expense_id): Path<Uuid>,
    Json(payload): Json<ExpensePayload>,
) -> Result<Json<Expense>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let expense = app_state
        .finance_service
        .update_expense(tenant.0, expense_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(expense))
}

// DELETE /api/finance/expenses/{id}
#[utoipa::path(
    delete,
    path = "/api/finance/expenses/{id}",
    tag = "Finance",
    responses(
        (status = 204, description = "Despesa removida"),
        (status = 404, description = "Despesa não encontrada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da despesa"),
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_expense(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<FinanceModule>,
    Path(expense_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .finance_service
        .delete_expense(tenant.0, expense_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/finance/expenses/monthly
#[utoipa::path(
    get,
    path = "/api/finance/expenses/monthly",
    tag = "Finance",
    responses((status = 200, description = "Totais por mês (YYYY-MM)", body = Vec<MonthlyExpenseTotal>)),
    params(
        ExpenseRangeQuery,
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn monthly_totals(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<FinanceModule>,
    Query(range): Query<ExpenseRangeQuery>,
) -> Result<Json<Vec<MonthlyExpenseTotal>>, ApiError> {
    let totals = app_state
        .finance_service
        .monthly_totals(tenant.0, range.from, range.to)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(totals))
}
