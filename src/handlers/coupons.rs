// src/handlers/coupons.rs

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    db::coupon_repo::Redeemer,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{CouponsModule, RequireModule},
        tenancy::TenantContext,
    },
    models::coupons::{
        Coupon, CouponListQuery, CouponLookup, CreateCouponPayload, GenerateCouponsPayload, RedeemCouponPayload,
        RedemptionOutcome, RedemptionRejection, RedemptionResponse, ScanRedeemPayload,
    },
    services::coupon_service::redemption_response,
};

// Cada resultado do resgate tem o seu status HTTP; o corpo sempre diz o motivo
fn outcome_status(outcome: &RedemptionOutcome) -> StatusCode {
    match outcome {
        RedemptionOutcome::Redeemed(_) => StatusCode::OK,
        RedemptionOutcome::Rejected(RedemptionRejection::NotFound) => StatusCode::NOT_FOUND,
        RedemptionOutcome::Rejected(RedemptionRejection::AlreadyRedeemed) => StatusCode::CONFLICT,
        RedemptionOutcome::Rejected(RedemptionRejection::Expired) => StatusCode::GONE,
    }
}

fn redemption_reply(outcome: RedemptionOutcome, locale: &Locale, app_state: &AppState) -> Response {
    let status = outcome_status(&outcome);
    let body = redemption_response(outcome, locale.language(), &app_state.i18n_store);
    (status, Json(body)).into_response()
}

// =============================================================================
//  ÁREA 1: CRIAÇÃO E GESTÃO
// =============================================================================

// POST /api/coupons
#[utoipa::path(
    post,
    path = "/api/coupons",
    tag = "Coupons",
    request_body = CreateCouponPayload,
    responses(
        (status = 201, description = "Cupom criado", body = Coupon),
        (status = 409, description = "Código já existe")
    ),
    params(("x-tenant-id" = Uuid, Header, description = "ID da agência")),
    security(("api_jwt" = []))
)]
pub async fn create_coupon(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<CouponsModule>,
    Json(payload): Json<CreateCouponPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let coupon = app_state
        .coupon_service
        .create(tenant.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(coupon)))
}

// POST /api/coupons/generate
#[utoipa::path(
    post,
    path = "/api/coupons/generate",
    tag = "Coupons",
    request_body = GenerateCouponsPayload,
    responses(
        (status = 201, description = "Lote gerado (PREFIXO-XXXXXXXX)", body = Vec<Coupon>),
        (status = 400, description = "Quantidade ou prefixo inválidos")
    ),
    params(("x-tenant-id" = Uuid, Header, description = "ID da agência")),
    security(("api_jwt" = []))
)]
pub async fn generate_coupons(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<CouponsModule>,
    Json(payload): Json<GenerateCouponsPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let coupons = app_state
        .coupon_service
        .generate(tenant.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(coupons)))
}

// GET /api/coupons
#[utoipa::path(
    get,
    path = "/api/coupons",
    tag = "Coupons",
    responses((status = 200, description = "Cupons (status efetivo)", body = Vec<Coupon>)),
    params(
        CouponListQuery,
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_coupons(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<CouponsModule>,
    Query(query): Query<CouponListQuery>,
) -> Result<Json<Vec<Coupon>>, ApiError> {
    let coupons = app_state
        .coupon_service
        .list(tenant.0, &query, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(coupons))
}

// GET /api/coupons/{id}
#[utoipa::path(
    get,
    path = "/api/coupons/{id}",
    tag = "Coupons",
    responses(
        (status = 200, description = "Cupom", body = Coupon),
        (status = 404, description = "Cupom não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do cupom"),
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_coupon(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<CouponsModule>,
    Path(coupon_id): Path<Uuid>,
) -> Result<Json<Coupon>, ApiError> {
    let coupon = app_state
        .coupon_service
        .get(tenant.0, coupon_id, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(coupon))
}

// DELETE /api/coupons/{id}
#[utoipa::path(
    delete,
    path = "/api/coupons/{id}",
    tag = "Coupons",
    responses(
        (status = 204, description = "Cupom removido"),
        (status = 404, description = "Não existe ou já foi resgatado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do cupom"),
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_coupon(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<CouponsModule>,
    Path(coupon_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .coupon_service
        .delete(tenant.0, coupon_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ÁREA 2: BUSCA E RESGATE
// =============================================================================

// GET /api/coupons/lookup/{code}
#[utoipa::path(
    get,
    path = "/api/coupons/lookup/{code}",
    tag = "Coupons",
    responses((status = 200, description = "Encontrado? Resgatável? Por quê?", body = CouponLookup)),
    params(
        ("code" = String, Path, description = "Código exato (maiúsculas/minúsculas indiferentes)"),
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn lookup_coupon(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<CouponsModule>,
    Path(code): Path<String>,
) -> Result<Json<CouponLookup>, ApiError> {
    let lookup = app_state
        .coupon_service
        .lookup(tenant.0, &code, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(lookup))
}

// POST /api/coupons/redeem
#[utoipa::path(
    post,
    path = "/api/coupons/redeem",
    tag = "Coupons",
    request_body = RedeemCouponPayload,
    responses(
        (status = 200, description = "Resgatado", body = RedemptionResponse),
        (status = 404, description = "Código não existe", body = RedemptionResponse),
        (status = 409, description = "Já resgatado", body = RedemptionResponse),
        (status = 410, description = "Expirado", body = RedemptionResponse)
    ),
    params(("x-tenant-id" = Uuid, Header, description = "ID da agência")),
    security(("api_jwt" = []))
)]
pub async fn redeem_coupon(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireModule<CouponsModule>,
    Json(payload): Json<RedeemCouponPayload>,
) -> Result<Response, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let redeemer = Redeemer {
        name: payload.redeemer_name.trim(),
        contact: payload.redeemer_contact.trim(),
        channel: payload.channel,
        redeemed_by: Some(user.id),
    };

    let outcome = app_state
        .coupon_service
        .redeem(tenant.0, &payload.code, &redeemer, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(redemption_reply(outcome, &locale, &app_state))
}

// POST /api/coupons/scan
#[utoipa::path(
    post,
    path = "/api/coupons/scan",
    tag = "Coupons",
    request_body = ScanRedeemPayload,
    responses(
        (status = 200, description = "Resgatado via QR", body = RedemptionResponse),
        (status = 404, description = "QR sem código válido", body = RedemptionResponse),
        (status = 409, description = "Já resgatado", body = RedemptionResponse),
        (status = 410, description = "Expirado", body = RedemptionResponse)
    ),
    params(("x-tenant-id" = Uuid, Header, description = "ID da agência")),
    security(("api_jwt" = []))
)]
pub async fn scan_and_redeem(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequireModule<CouponsModule>,
    Json(payload): Json<ScanRedeemPayload>,
) -> Result<Response, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let outcome = app_state
        .coupon_service
        .scan_and_redeem(tenant.0, &payload, user.id, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(redemption_reply(outcome, &locale, &app_state))
}

// =============================================================================
//  ÁREA 3: QR E VOUCHER
// =============================================================================

// GET /api/coupons/{id}/qr
#[utoipa::path(
    get,
    path = "/api/coupons/{id}/qr",
    tag = "Coupons",
    responses(
        (status = 200, description = "PNG com a URL de resgate", content_type = "image/png"),
        (status = 404, description = "Cupom não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do cupom"),
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn coupon_qr(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<CouponsModule>,
    Path(coupon_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let coupon = app_state
        .coupon_service
        .get(tenant.0, coupon_id, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let png = app_state
        .document_service
        .coupon_qr_png(&coupon.code)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

// GET /api/coupons/{id}/voucher
#[utoipa::path(
    get,
    path = "/api/coupons/{id}/voucher",
    tag = "Coupons",
    responses(
        (status = 200, description = "Voucher em PDF", content_type = "application/pdf"),
        (status = 404, description = "Cupom não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do cupom"),
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn coupon_voucher(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<CouponsModule>,
    Path(coupon_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let now = Utc::now();
    let coupon = app_state
        .coupon_service
        .get(tenant.0, coupon_id, now)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    // genpdf é síncrono e pesado: fora do runtime
    let documents = app_state.document_service.clone();
    let i18n = app_state.i18n_store.clone();
    let lang = locale.language().to_string();
    let code = coupon.code.clone();

    let pdf_bytes = tokio::task::spawn_blocking(move || documents.coupon_voucher_pdf(&coupon, now, &lang, &i18n))
        .await
        .map_err(|e| AppError::InternalServerError(anyhow::anyhow!("Falha na task do PDF: {}", e)))
        .and_then(|result| result)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    // Configura os Headers para o navegador baixar o PDF
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"voucher_{}.pdf\"", code)),
    ];

    Ok((headers, pdf_bytes).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_rejection_has_its_own_status() {
        let statuses = [
            RedemptionRejection::NotFound,
            RedemptionRejection::AlreadyRedeemed,
            RedemptionRejection::Expired,
        ]
        .map(|r| outcome_status(&RedemptionOutcome::Rejected(r)));

        assert_eq!(statuses, [StatusCode::NOT_FOUND, StatusCode::CONFLICT, StatusCode::GONE]);
    }
}
