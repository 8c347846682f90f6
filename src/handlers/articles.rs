// src/handlers/articles.rs

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
        rbac::{ArticlesModule, RequireModule},
        tenancy::TenantContext,
    },
    models::articles::{Article, ArticlePayload},
};

// O preço bruto formatado segue o Accept-Language

// POST /api/articles
#[utoipa::path(
    post,
    path = "/api/articles",
    tag = "Articles",
    request_body = ArticlePayload,
    responses(
        (status = 201, description = "Artigo criado", body = Article),
        (status = 409, description = "SKU já existe")
    ),
    params(("x-tenant-id" = Uuid, Header, description = "ID da agência")),
    security(("api_jwt" = []))
)]
pub async fn create_article(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<ArticlesModule>,
    Json(payload): Json<ArticlePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let article = app_state
        .article_service
        .create(tenant.0, &payload, locale.language())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(article)))
}

// GET /api/articles
#[utoipa::path(
    get,
    path = "/api/articles",
    tag = "Articles",
    responses((status = 200, description = "Catálogo de artigos", body = Vec<Article>)),
    params(("x-tenant-id" = Uuid, Header, description = "ID da agência")),
    security(("api_jwt" = []))
)]
pub async fn list_articles(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<ArticlesModule>,
) -> Result<Json<Vec<Article>>, ApiError> {
    let articles = app_state
        .article_service
        .list(tenant.0, locale.language())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(articles))
}

// GET /api/articles/{id}
#[utoipa::path(
    get,
    path = "/api/articles/{id}",
    tag = "Articles",
    responses(
        (status = 200, description = "Artigo", body = Article),
        (status = 404, description = "Artigo não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do artigo"),
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_article(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<ArticlesModule>,
    Path(article_id): Path<Uuid>,
) -> Result<Json<Article>, ApiError> {
    let article = app_state
        .article_service
        .get(tenant.0, article_id, locale.language())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(article))
}

// PUT /api/articles/{id}
#[utoipa::path(
    put,
    path = "/api/articles/{id}",
    tag = "Articles",
    request_body = ArticlePayload,
    responses(
        (status = 200, description = "Artigo atualizado", body = Article),
        (status = 404, description = "Artigo não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do artigo"),
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_article(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<ArticlesModule>,
    Path(article_id): Path<Uuid>,
    Json(payload): Json<ArticlePayload>,
) -> Result<Json<Article>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let article = app_state
        .article_service
        .update(tenant.0, article_id, &payload, locale.language())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(article))
}

// DELETE /api/articles/{id}
#[utoipa::path(
    delete,
    path = "/api/articles/{id}",
    tag = "Articles",
    responses(
        (status = 204, description = "Artigo removido"),
        (status = 404, description = "Artigo não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do artigo"),
        ("x-tenant-id" = Uuid, Header, description = "ID da agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_article(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireModule<ArticlesModule>,
    Path(article_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .article_service
        .delete(tenant.0, article_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
