// src/db/finance_repo.rs

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::finance::{Expense, ExpensePayload, MonthlyExpenseTotal},
};

const EXPENSE_COLUMNS: &str =
    "id, tenant_id, description, category, amount, currency, spent_on, created_by, created_at";

#[derive(Clone)]
pub struct FinanceRepository {
    pool: PgPool,
}

impl FinanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_expense(
        &self,
        tenant_id: Uuid,
        created_by: Uuid,
        e: &ExpensePayload,
    ) -> Result<Expense, AppError> {
        let sql = format!(
            "INSERT INTO expenses (tenant_id, description, category, amount, currency, spent_on, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {EXPENSE_COLUMNS}"
        );
        let expense = sqlx::query_as::<_, Expense>(&sql)
            .bind(tenant_id)
            .bind(&e.description)
            .bind(&e.category)
            .bind(e.amount)
            .bind(e.currency.to_uppercase())
            .bind(e.spent_on)
            .bind(created_by)
            .fetch_one(&self.pool)
            .await?;
        Ok(expense)
    }

    /// Intervalo fechado; limites ausentes não filtram.
    pub async fn list_expenses(
        &self,
        tenant_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Expense>, AppError> {
        let sql = format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses
             WHERE tenant_id = $1
               AND ($2::date IS NULL OR spent_on >= $2)
               AND ($3::date IS NULL OR spent_on <= $3)
             ORDER BY spent_on DESC, created_at DESC"
        );
        let expenses = sqlx::query_as::<_, Expense>(&sql)
            .bind(tenant_id)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;
        Ok(expenses)
    }

    pub async fn update_expense(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        e: &ExpensePayload,
    ) -> Result<Option<Expense>, AppError> {
        let sql = format!(
            "UPDATE expenses
             SET description = $3, category = $4, amount = $5, currency = $6, spent_on = $7
             WHERE tenant_id = $1 AND id = $2
             RETURNING {EXPENSE_COLUMNS}"
        );
        let expense = sqlx::query_as::<_, Expense>(&sql)
            .bind(tenant_id)
            .bind(id)
            .bind(&e.description)
            .bind(&e.category)
            .bind(e.amount)
            .bind(e.currency.to_uppercase())
            .bind(e.spent_on)
            .fetch_optional(&self.pool)
            .await?;
        Ok(expense)
    }

    pub async fn delete_expense(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM expenses WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // Soma por (mês "YYYY-MM", moeda), mais recente primeiro
    pub async fn monthly_totals(
        &self,
        tenant_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<MonthlyExpenseTotal>, AppError> {
        let totals = sqlx::query_as::<_, MonthlyExpenseTotal>(
            r#"
            SELECT to_char(date_trunc('month', spent_on), 'YYYY-MM') AS month,
                   currency::text AS currency,
                   COALESCE(SUM(amount), 0) AS total
            FROM expenses
            WHERE tenant_id = $1
              AND ($2::date IS NULL OR spent_on >= $2)
              AND ($3::date IS NULL OR spent_on <= $3)
            GROUP BY 1, 2
            ORDER BY 1 DESC, 2
            "#,
        )
        .bind(tenant_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(totals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn expense(amount: Decimal, currency: &str, spent_on: NaiveDate) -> ExpensePayload {
        ExpensePayload {
            description: "Hosting".into(),
            category: "software".into(),
            amount,
            currency: currency.into(),
            spent_on,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "precisa de Postgres (DATABASE_URL)"]
    async fn monthly_totals_keep_currencies_apart(pool: PgPool) {
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

        let repo = FinanceRepository::new(pool);
        let day = NaiveDate::from_ymd_opt(2026, 10, 5).unwrap();
        repo.create_expense(tenant, user, &expense(Decimal::new(1000, 2), "EUR", day)).await.unwrap();
        repo.create_expense(tenant, user, &expense(Decimal::new(250, 2), "eur", day)).await.unwrap();
        repo.create_expense(tenant, user, &expense(Decimal::new(500, 2), "USD", day)).await.unwrap();

        let totals = repo.monthly_totals(tenant, None, None).await.unwrap();
        let pairs: Vec<(&str, &str, Decimal)> = totals
            .iter()
            .map(|t| (t.month.as_str(), t.currency.as_str(), t.total))
            .collect();
        assert_eq!(
            pairs,
            vec![("2026-10", "EUR", Decimal::new(1250, 2)), ("2026-10", "USD", Decimal::new(500, 2))]
        );
    }
}
