// src/db/mail_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        mail::{Email, EmailStatus, LinkedMailAccount, MailProvider, OutgoingMail},
        team::Department,
    },
};

const EMAIL_COLUMNS: &str = "id, tenant_id, sent_by, department, from_address, to_addresses, cc_addresses, \
     subject, body, customer_id, status, error_message, created_at";

#[derive(Clone)]
pub struct MailRepository {
    pool: PgPool,
}

impl MailRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn record_email(
        &self,
        tenant_id: Uuid,
        sent_by: Uuid,
        department: Department,
        mail: &OutgoingMail,
        customer_id: Option<Uuid>,
        status: EmailStatus,
        error_message: Option<&str>,
    ) -> Result<Email, AppError> {
        let sql = format!(
            "INSERT INTO emails
                (tenant_id, sent_by, department, from_address, to_addresses, cc_addresses,
                 subject, body, customer_id, status, error_message)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {EMAIL_COLUMNS}"
        );
        let email = sqlx::query_as::<_, Email>(&sql)
            .bind(tenant_id)
            .bind(sent_by)
            .bind(department)
            .bind(&mail.from)
            .bind(&mail.to)
            .bind(&mail.cc)
            .bind(&mail.subject)
            .bind(&mail.body)
            .bind(customer_id)
            .bind(status)
            .bind(error_message)
            .fetch_one(&self.pool)
            .await?;
        Ok(email)
    }

    pub async fn list_emails(&self, tenant_id: Uuid, limit: i64) -> Result<Vec<Email>, AppError> {
        let sql = format!(
            "SELECT {EMAIL_COLUMNS} FROM emails
             WHERE tenant_id = $1
             ORDER BY created_at DESC
             LIMIT $2"
        );
        let emails = sqlx::query_as::<_, Email>(&sql)
            .bind(tenant_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(emails)
    }

    /// Um vínculo por (agência, usuário, provedor); relinkar substitui o código.
    pub async fn upsert_account(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        provider: MailProvider,
        authorization_code: &str,
    ) -> Result<LinkedMailAccount, AppError> {
        let account = sqlx::query_as::<_, LinkedMailAccount>(
            r#"
            INSERT INTO mail_accounts (tenant_id, user_id, provider, authorization_code)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (tenant_id, user_id, provider)
            DO UPDATE SET authorization_code = EXCLUDED.authorization_code, linked_at = NOW()
            RETURNING id, tenant_id, user_id, provider, authorization_code, linked_at
            "#,
        )
        .bind(tenant_id)
        .bind(user_id)
        .bind(provider)
        .bind(authorization_code)
        .fetch_one(&self.pool)
        .await?;
        Ok(account)
    }

    pub async fn list_accounts(&self, tenant_id: Uuid, user_id: Uuid) -> Result<Vec<LinkedMailAccount>, AppError> {
        let accounts = sqlx::query_as::<_, LinkedMailAccount>(
            r#"
            SELECT id, tenant_id, user_id, provider, authorization_code, linked_at
            FROM mail_accounts
            WHERE tenant_id = $1 AND user_id = $2
            ORDER BY linked_at DESC
            "#,
        )
        .bind(tenant_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(accounts)
    }
}
