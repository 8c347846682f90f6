// src/db/crm_repo.rs

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{types::Json, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        crm::{
            Customer, CustomerPlan, CustomerService, PlanServiceTemplate, Prospect, ProspectInput,
            ServiceStatus,
        },
        marketing::GeoBox,
    },
};

const CUSTOMER_COLUMNS: &str =
    "id, tenant_id, name, contact_email, phone, plan, usage, notes, created_at, updated_at";

const SERVICE_COLUMNS: &str = "id, tenant_id, customer_id, service_key, name, status, frequency, \
     next_due_date, last_completed_at, created_at";

const PROSPECT_COLUMNS: &str =
    "id, tenant_id, name, address, category, latitude, longitude, email, phone, website, created_at";

#[derive(Clone)]
pub struct CrmRepository {
    pool: PgPool,
}

impl CrmRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CLIENTES
    // =========================================================================

    pub async fn create_customer<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        name: &str,
        contact_email: &str,
        phone: Option<&str>,
        plan: CustomerPlan,
        usage: BTreeMap<String, i64>,
        notes: Option<&str>,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO customers (tenant_id, name, contact_email, phone, plan, usage, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {CUSTOMER_COLUMNS}"
        );
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(tenant_id)
            .bind(name)
            .bind(contact_email)
            .bind(phone)
            .bind(plan)
            .bind(Json(usage))
            .bind(notes)
            .fetch_one(executor)
            .await?;
        Ok(customer)
    }

    /// Lista os clientes; `search` filtra por nome ou e-mail (ILIKE).
    pub async fn list_customers(
        &self,
        tenant_id: Uuid,
        search: Option<&str>,
    ) -> Result<Vec<Customer>, AppError> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s.replace('%', "\\%").replace('_', "\\_")));

        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers
             WHERE tenant_id = $1
               AND ($2::text IS NULL OR name ILIKE $2 OR contact_email ILIKE $2)
             ORDER BY name ASC"
        );
        let customers = sqlx::query_as::<_, Customer>(&sql)
            .bind(tenant_id)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;
        Ok(customers)
    }

    pub async fn find_customer<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE tenant_id = $1 AND id = $2");
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(tenant_id)
            .bind(customer_id)
            .fetch_optional(executor)
            .await?;
        Ok(customer)
    }

    pub async fn update_customer(
        &self,
        tenant_id: Uuid,
        customer_id: Uuid,
        name: &str,
        contact_email: &str,
        phone: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Option<Customer>, AppError> {
        let sql = format!(
            "UPDATE customers
             SET name = $3, contact_email = $4, phone = $5, notes = $6, updated_at = NOW()
             WHERE tenant_id = $1 AND id = $2
             RETURNING {CUSTOMER_COLUMNS}"
        );
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(tenant_id)
            .bind(customer_id)
            .bind(name)
            .bind(contact_email)
            .bind(phone)
            .bind(notes)
            .fetch_optional(&self.pool)
            .await?;
        Ok(customer)
    }

    // Serviços caem junto (ON DELETE CASCADE)
    pub async fn delete_customer(&self, tenant_id: Uuid, customer_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM customers WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(customer_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// +1 no contador de uso do serviço (cria a chave se faltar).
    pub async fn increment_usage<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        customer_id: Uuid,
        service_key: &str,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE customers
            SET usage = jsonb_set(
                    usage,
                    ARRAY[$3],
                    to_jsonb(COALESCE((usage ->> $3)::bigint, 0) + 1)
                ),
                updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(customer_id)
        .bind(service_key)
        .execute(executor)
        .await?;
        Ok(())
    }

    // =========================================================================
    //  SERVIÇOS DO CLIENTE
    // =========================================================================

    pub async fn insert_service<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        customer_id: Uuid,
        template: &PlanServiceTemplate,
        next_due_date: Option<NaiveDate>,
    ) -> Result<CustomerService, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO customer_services (tenant_id, customer_id, service_key, name, frequency, next_due_date)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {SERVICE_COLUMNS}"
        );
        let service = sqlx::query_as::<_, CustomerService>(&sql)
            .bind(tenant_id)
            .bind(customer_id)
            .bind(template.key)
            .bind(template.name)
            .bind(template.frequency)
            .bind(next_due_date)
            .fetch_one(executor)
            .await?;
        Ok(service)
    }

    pub async fn list_services(
        &self,
        tenant_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Vec<CustomerService>, AppError> {
        let sql = format!(
            "SELECT {SERVICE_COLUMNS} FROM customer_services
             WHERE tenant_id = $1 AND customer_id = $2
             ORDER BY created_at ASC, name ASC"
        );
        let services = sqlx::query_as::<_, CustomerService>(&sql)
            .bind(tenant_id)
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(services)
    }

    /// Lê e trava o serviço para a conclusão de uma ocorrência.
    pub async fn lock_service<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        service_id: Uuid,
    ) -> Result<Option<CustomerService>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {SERVICE_COLUMNS} FROM customer_services
             WHERE tenant_id = $1 AND id = $2
             FOR UPDATE"
        );
        let service = sqlx::query_as::<_, CustomerService>(&sql)
            .bind(tenant_id)
            .bind(service_id)
            .fetch_optional(executor)
            .await?;
        Ok(service)
    }

    pub async fn update_service_status(
        &self,
        tenant_id: Uuid,
        service_id: Uuid,
        status: ServiceStatus,
    ) -> Result<Option<CustomerService>, AppError> {
        let sql = format!(
            "UPDATE customer_services SET status = $3
             WHERE tenant_id = $1 AND id = $2
             RETURNING {SERVICE_COLUMNS}"
        );
        let service = sqlx::query_as::<_, CustomerService>(&sql)
            .bind(tenant_id)
            .bind(service_id)
            .bind(status)
            .fetch_optional(&self.pool)
            .await?;
        Ok(service)
    }

    pub async fn record_completion<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        service_id: Uuid,
        completed_at: DateTime<Utc>,
        next_due_date: Option<NaiveDate>,
        status: ServiceStatus,
    ) -> Result<CustomerService, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE customer_services
             SET last_completed_at = $3, next_due_date = $4, status = $5
             WHERE tenant_id = $1 AND id = $2
             RETURNING {SERVICE_COLUMNS}"
        );
        let service = sqlx::query_as::<_, CustomerService>(&sql)
            .bind(tenant_id)
            .bind(service_id)
            .bind(completed_at)
            .bind(next_due_date)
            .bind(status)
            .fetch_one(executor)
            .await?;
        Ok(service)
    }

    /// Serviços ativos com vencimento até `until` (inclusive), mais antigos primeiro.
    pub async fn services_due(
        &self,
        tenant_id: Uuid,
        until: NaiveDate,
    ) -> Result<Vec<CustomerService>, AppError> {
        let sql = format!(
            "SELECT {SERVICE_COLUMNS} FROM customer_services
             WHERE tenant_id = $1 AND status = 'ACTIVE'
               AND next_due_date IS NOT NULL AND next_due_date <= $2
             ORDER BY next_due_date ASC, name ASC"
        );
        let services = sqlx::query_as::<_, CustomerService>(&sql)
            .bind(tenant_id)
            .bind(until)
            .fetch_all(&self.pool)
            .await?;
        Ok(services)
    }

    // =========================================================================
    //  PROSPECTS
    // =========================================================================

    /// false = já existia (mesmo nome e endereço), nada foi inserido.
    pub async fn insert_prospect<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        input: &ProspectInput,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            INSERT INTO prospects
                (tenant_id, name, address, category, latitude, longitude, email, phone, website)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (tenant_id, name, address) DO NOTHING
            "#,
        )
        .bind(tenant_id)
        .bind(input.name.trim())
        .bind(input.address.trim())
        .bind(input.category.as_deref())
        .bind(input.latitude)
        .bind(input.longitude)
        .bind(input.email.as_deref())
        .bind(input.phone.as_deref())
        .bind(input.website.as_deref())
        .execute(executor)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Pré-filtro retangular (uma ou duas faixas de longitude); o raio exato é aplicado depois.
    #[tracing::instrument(name = "Fetch prospects in bounding box", skip(self))]
    pub async fn prospects_in_box(
        &self,
        tenant_id: Uuid,
        bbox: &GeoBox,
        category: Option<&str>,
    ) -> Result<Vec<Prospect>, AppError> {
        let sql = format!(
            "SELECT {PROSPECT_COLUMNS} FROM prospects
             WHERE tenant_id = $1
               AND latitude BETWEEN $2 AND $3
               AND (longitude BETWEEN $4 AND $5 OR longitude BETWEEN $6 AND $7)
               AND ($8::text IS NULL OR category = $8)"
        );
        let [(a_min, a_max), (b_min, b_max)] = bbox.lon_ranges;
        let prospects = sqlx::query_as::<_, Prospect>(&sql)
            .bind(tenant_id)
            .bind(bbox.lat_min)
            .bind(bbox.lat_max)
            .bind(a_min)
            .bind(a_max)
            .bind(b_min)
            .bind(b_max)
            .bind(category)
            .fetch_all(&self.pool)
            .await?;
        Ok(prospects)
    }
}
