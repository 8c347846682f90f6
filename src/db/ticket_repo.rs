// src/db/ticket_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::tickets::{Ticket, TicketPayload, TicketStatus},
};

const TICKET_COLUMNS: &str = "id, tenant_id, subject, description, priority, status, customer_id, \
     assignee_id, audio_url, created_by, resolved_at, created_at, updated_at";

#[derive(Clone)]
pub struct TicketRepository {
    pool: PgPool,
}

impl TicketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, tenant_id: Uuid, created_by: Uuid, t: &TicketPayload) -> Result<Ticket, AppError> {
        let sql = format!(
            "INSERT INTO tickets (tenant_id, subject, description, priority, customer_id, assignee_id, audio_url, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {TICKET_COLUMNS}"
        );
        let ticket = sqlx::query_as::<_, Ticket>(&sql)
            .bind(tenant_id)
            .bind(&t.subject)
            .bind(t.description.as_deref())
            .bind(t.priority)
            .bind(t.customer_id)
            .bind(t.assignee_id)
            .bind(t.audio_url.as_deref())
            .bind(created_by)
            .fetch_one(&self.pool)
            .await?;
        Ok(ticket)
    }

    // Abertos primeiro, depois por prioridade (URGENT > ... > LOW)
    pub async fn list(&self, tenant_id: Uuid, status: Option<TicketStatus>) -> Result<Vec<Ticket>, AppError> {
        let sql = format!(
            "SELECT {TICKET_COLUMNS} FROM tickets
             WHERE tenant_id = $1 AND ($2::ticket_status IS NULL OR status = $2)
             ORDER BY (status IN ('RESOLVED', 'CLOSED')) ASC, priority DESC, created_at DESC"
        );
        let tickets = sqlx::query_as::<_, Ticket>(&sql)
            .bind(tenant_id)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;
        Ok(tickets)
    }

    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Ticket>, AppError> {
        let sql = format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE tenant_id = $1 AND id = $2");
        let ticket = sqlx::query_as::<_, Ticket>(&sql)
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(ticket)
    }

    pub async fn update(&self, tenant_id: Uuid, id: Uuid, t: &TicketPayload) -> Result<Option<Ticket>, AppError> {
        let sql = format!(
            "UPDATE tickets
             SET subject = $3, description = $4, priority = $5, customer_id = $6,
                 assignee_id = $7, audio_url = $8, updated_at = NOW()
             WHERE tenant_id = $1 AND id = $2
             RETURNING {TICKET_COLUMNS}"
        );
        let ticket = sqlx::query_as::<_, Ticket>(&sql)
            .bind(tenant_id)
            .bind(id)
            .bind(&t.subject)
            .bind(t.description.as_deref())
            .bind(t.priority)
            .bind(t.customer_id)
            .bind(t.assignee_id)
            .bind(t.audio_url.as_deref())
            .fetch_optional(&self.pool)
            .await?;
        Ok(ticket)
    }

    /// `resolved_at` é gravado ao entrar em RESOLVED/CLOSED e limpo ao reabrir.
    pub async fn update_status(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        status: TicketStatus,
    ) -> Result<Option<Ticket>, AppError> {
        let sql = format!(
            "UPDATE tickets
             SET status = $3,
                 resolved_at = CASE
                     WHEN $4 THEN COALESCE(resolved_at, NOW())
                     ELSE NULL
                 END,
                 updated_at = NOW()
             WHERE tenant_id = $1 AND id = $2
             RETURNING {TICKET_COLUMNS}"
        );
        let ticket = sqlx::query_as::<_, Ticket>(&sql)
            .bind(tenant_id)
            .bind(id)
            .bind(status)
            .bind(status.is_finished())
            .fetch_optional(&self.pool)
            .await?;
        Ok(ticket)
    }

    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tickets WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
