// src/db/article_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::articles::{ArticlePayload, ArticleRow},
};

const ARTICLE_COLUMNS: &str =
    "id, tenant_id, name, sku, description, price_net, tax_rate, created_at, updated_at";

#[derive(Clone)]
pub struct ArticleRepository {
    pool: PgPool,
}

impl ArticleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, tenant_id: Uuid, a: &ArticlePayload) -> Result<ArticleRow, AppError> {
        let sql = format!(
            "INSERT INTO articles (tenant_id, name, sku, description, price_net, tax_rate)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {ARTICLE_COLUMNS}"
        );
        sqlx::query_as::<_, ArticleRow>(&sql)
            .bind(tenant_id)
            .bind(&a.name)
            .bind(a.sku.as_deref())
            .bind(a.description.as_deref())
            .bind(a.price_net)
            .bind(a.tax_rate)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, || format!("SKU '{}'", a.sku.as_deref().unwrap_or_default())))
    }

    pub async fn list(&self, tenant_id: Uuid) -> Result<Vec<ArticleRow>, AppError> {
        let sql = format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE tenant_id = $1 ORDER BY name ASC");
        let rows = sqlx::query_as::<_, ArticleRow>(&sql)
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<ArticleRow>, AppError> {
        let sql = format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE tenant_id = $1 AND id = $2");
        let row = sqlx::query_as::<_, ArticleRow>(&sql)
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn update(&self, tenant_id: Uuid, id: Uuid, a: &ArticlePayload) -> Result<Option<ArticleRow>, AppError> {
        let sql = format!(
            "UPDATE articles
             SET name = $3, sku = $4, description = $5, price_net = $6, tax_rate = $7, updated_at = NOW()
             WHERE tenant_id = $1 AND id = $2
             RETURNING {ARTICLE_COLUMNS}"
        );
        sqlx::query_as::<_, ArticleRow>(&sql)
            .bind(tenant_id)
            .bind(id)
            .bind(&a.name)
            .bind(a.sku.as_deref())
            .bind(a.description.as_deref())
            .bind(a.price_net)
            .bind(a.tax_rate)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, || format!("SKU '{}'", a.sku.as_deref().unwrap_or_default())))
    }

    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM articles WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
