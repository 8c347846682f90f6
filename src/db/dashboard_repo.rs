// src/db/dashboard_repo.rs

use chrono::NaiveDate;
use sqlx::{types::Json, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        dashboard::{DashboardSummary, WidgetPlacement},
        finance::CurrencyTotal,
    },
};

/// Transação somente leitura em REPEATABLE READ: todas as consultas veem o mesmo snapshot.
/// Em READ COMMITTED cada SELECT enxergaria os commits feitos entre um e outro.
pub async fn begin_snapshot(pool: &PgPool) -> Result<Transaction<'static, Postgres>, AppError> {
    let mut tx = pool.begin().await?;
    // Precisa ser o primeiro comando da transação
    sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
        .execute(&mut *tx)
        .await?;
    Ok(tx)
}

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // 1. Cards do topo
    pub async fn get_summary(
        &self,
        tenant_id: Uuid,
        month_start: NaiveDate,
        month_end: NaiveDate,
    ) -> Result<DashboardSummary, AppError> {
        let mut tx = begin_snapshot(&self.pool).await?;

        let open_tickets: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM tickets WHERE tenant_id = $1 AND status IN ('OPEN', 'IN_PROGRESS')",
        )
        .bind(tenant_id)
        .fetch_one(&mut *tx)
        .await?;

        let active_projects: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM projects WHERE tenant_id = $1 AND status = 'ACTIVE'",
        )
        .bind(tenant_id)
        .fetch_one(&mut *tx)
        .await?;

        // Só os resgatáveis agora (vencidos não contam)
        let active_coupons: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM coupons
            WHERE tenant_id = $1 AND status = 'ACTIVE'
              AND (expires_at IS NULL OR expires_at > NOW())
            "#,
        )
        .bind(tenant_id)
        .fetch_one(&mut *tx)
        .await?;

        let customers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers WHERE tenant_id = $1")
            .bind(tenant_id)
            .fetch_one(&mut *tx)
            .await?;

        let expenses_this_month = sqlx::query_as::<_, CurrencyTotal>(
            r#"
            SELECT currency::text AS currency, SUM(amount) AS total
            FROM expenses
            WHERE tenant_id = $1 AND spent_on BETWEEN $2 AND $3
            GROUP BY currency
            ORDER BY currency
            "#,
        )
        .bind(tenant_id)
        .bind(month_start)
        .bind(month_end)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(DashboardSummary {
            open_tickets,
            active_projects,
            active_coupons,
            customers,
            expenses_this_month,
        })
    }

    // 2. Layout por (usuário, agência)
    pub async fn find_layout(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Vec<WidgetPlacement>>, AppError> {
        let widgets: Option<Json<Vec<WidgetPlacement>>> = sqlx::query_scalar(
            "SELECT widgets FROM dashboard_layouts WHERE tenant_id = $1 AND user_id = $2",
        )
        .bind(tenant_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(widgets.map(|Json(w)| w))
    }

    pub async fn save_layout(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        widgets: &[WidgetPlacement],
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO dashboard_layouts (tenant_id, user_id, widgets)
            VALUES ($1, $2, $3)
            ON CONFLICT (tenant_id, user_id)
            DO UPDATE SET widgets = EXCLUDED.widgets, updated_at = NOW()
            "#,
        )
        .bind(tenant_id)
        .bind(user_id)
        .bind(Json(widgets))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "precisa de Postgres (DATABASE_URL)"]
    async fn summary_reads_from_a_repeatable_read_snapshot(pool: PgPool) {
        let mut tx = begin_snapshot(&pool).await.unwrap();
        let level: String = sqlx::query_scalar("SELECT current_setting('transaction_isolation')")
            .fetch_one(&mut *tx)
            .await
            .unwrap();
        let read_only: String = sqlx::query_scalar("SELECT current_setting('transaction_read_only')")
            .fetch_one(&mut *tx)
            .await
            .unwrap();
        tx.rollback().await.unwrap();

        assert_eq!(level, "repeatable read");
        assert_eq!(read_only, "on");
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "precisa de Postgres (DATABASE_URL)"]
    async fn summary_splits_expenses_by_currency(pool: PgPool) {
        let tenant: Uuid = sqlx::query_scalar("INSERT INTO tenants (name) VALUES ('Agentur') RETURNING id")
            .fetch_one(&pool)
            .await
            .unwrap();
        let user: Uuid = sqlx::query_scalar(
            "INSERT INTO users (email, display_name, password_hash) VALUES ('a@x.de', 'Anna', 'x') RETURNING id",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        for (amount, currency) in [("10.00", "EUR"), ("5.00", "USD")] {
            sqlx::query(
                "INSERT INTO expenses (tenant_id, description, category, amount, currency, spent_on, created_by)
                 VALUES ($1, 'Hosting', 'software', $2::numeric, $3, '2026-10-05', $4)",
            )
            .bind(tenant)
            .bind(amount)
            .bind(currency)
            .bind(user)
            .execute(&pool)
            .await
            .unwrap();
        }

        let repo = DashboardRepository::new(pool);
        let start = NaiveDate::from_ymd_opt(2026, 10, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 10, 31).unwrap();
        let summary = repo.get_summary(tenant, start, end).await.unwrap();

        let currencies: Vec<&str> = summary.expenses_this_month.iter().map(|t| t.currency.as_str()).collect();
        assert_eq!(currencies, vec!["EUR", "USD"]);
    }
}
