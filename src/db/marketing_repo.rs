// src/db/marketing_repo.rs

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::marketing::{
        ContentItem, ContentItemPayload, EventStatus, MarketingChannel, MarketingEvent,
        ScheduleEventPayload,
    },
};

const CONTENT_COLUMNS: &str = "id, tenant_id, title, body, channel, tags, used_at, created_at";

const EVENT_COLUMNS: &str =
    "id, tenant_id, title, channel, status, starts_at, ends_at, content_item_id, customer_id, created_at";

#[derive(Clone)]
pub struct MarketingRepository {
    pool: PgPool,
}

impl MarketingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  POOL DE CONTEÚDO
    // =========================================================================

    pub async fn create_content(&self, tenant_id: Uuid, c: &ContentItemPayload) -> Result<ContentItem, AppError> {
        let sql = format!(
            "INSERT INTO content_items (tenant_id, title, body, channel, tags)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {CONTENT_COLUMNS}"
        );
        let item = sqlx::query_as::<_, ContentItem>(&sql)
            .bind(tenant_id)
            .bind(&c.title)
            .bind(&c.body)
            .bind(c.channel)
            .bind(&c.tags)
            .fetch_one(&self.pool)
            .await?;
        Ok(item)
    }

    // Não usados primeiro (na ordem de chegada), depois os já usados
    pub async fn list_content(&self, tenant_id: Uuid) -> Result<Vec<ContentItem>, AppError> {
        let sql = format!(
            "SELECT {CONTENT_COLUMNS} FROM content_items
             WHERE tenant_id = $1
             ORDER BY (used_at IS NOT NULL) ASC, created_at ASC"
        );
        let items = sqlx::query_as::<_, ContentItem>(&sql)
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    pub async fn update_content(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        c: &ContentItemPayload,
    ) -> Result<Option<ContentItem>, AppError> {
        let sql = format!(
            "UPDATE content_items SET title = $3, body = $4, channel = $5, tags = $6
             WHERE tenant_id = $1 AND id = $2
             RETURNING {CONTENT_COLUMNS}"
        );
        let item = sqlx::query_as::<_, ContentItem>(&sql)
            .bind(tenant_id)
            .bind(id)
            .bind(&c.title)
            .bind(&c.body)
            .bind(c.channel)
            .bind(&c.tags)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    pub async fn delete_content(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM content_items WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Pega o item não usado mais antigo e marca como usado, num único comando.
    /// SKIP LOCKED: duas chamadas simultâneas nunca recebem o mesmo item.
    pub async fn take_next_content(
        &self,
        tenant_id: Uuid,
        channel: Option<MarketingChannel>,
    ) -> Result<Option<ContentItem>, AppError> {
        let sql = format!(
            "UPDATE content_items SET used_at = NOW()
             WHERE id = (
                 SELECT id FROM content_items
                 WHERE tenant_id = $1 AND used_at IS NULL
                   AND ($2::marketing_channel IS NULL OR channel = $2)
                 ORDER BY created_at ASC
                 LIMIT 1
                 FOR UPDATE SKIP LOCKED
             )
             RETURNING {CONTENT_COLUMNS}"
        );
        let item = sqlx::query_as::<_, ContentItem>(&sql)
            .bind(tenant_id)
            .bind(channel)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    // =========================================================================
    //  CALENDÁRIO
    // =========================================================================

    pub async fn create_event(&self, tenant_id: Uuid, e: &ScheduleEventPayload) -> Result<MarketingEvent, AppError> {
        let sql = format!(
            "INSERT INTO marketing_events (tenant_id, title, channel, starts_at, ends_at, content_item_id, customer_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {EVENT_COLUMNS}"
        );
        let event = sqlx::query_as::<_, MarketingEvent>(&sql)
            .bind(tenant_id)
            .bind(&e.title)
            .bind(e.channel)
            .bind(e.starts_at)
            .bind(e.ends_at)
            .bind(e.content_item_id)
            .bind(e.customer_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(event)
    }

    /// Eventos que tocam o intervalo [from, to].
    pub async fn list_events(
        &self,
        tenant_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<MarketingEvent>, AppError> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM marketing_events
             WHERE tenant_id = $1
               AND starts_at <= $3
               AND COALESCE(ends_at, starts_at) >= $2
             ORDER BY starts_at ASC"
        );
        let events = sqlx::query_as::<_, MarketingEvent>(&sql)
            .bind(tenant_id)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;
        Ok(events)
    }

    pub async fn update_event_status(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        status: EventStatus,
    ) -> Result<Option<MarketingEvent>, AppError> {
        let sql = format!(
            "UPDATE marketing_events SET status = $3
             WHERE tenant_id = $1 AND id = $2
             RETURNING {EVENT_COLUMNS}"
        );
        let event = sqlx::query_as::<_, MarketingEvent>(&sql)
            .bind(tenant_id)
            .bind(id)
            .bind(status)
            .fetch_optional(&self.pool)
            .await?;
        Ok(event)
    }

    pub async fn delete_event(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM marketing_events WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
