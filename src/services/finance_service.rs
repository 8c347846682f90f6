// src/services/finance_service.rs

use chrono::{Datelike, Months, NaiveDate};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::FinanceRepository,
    models::{
        events::{ChangeEvent, EntityKind},
        finance::{Expense, ExpensePayload, MonthlyExpenseTotal},
    },
    services::events::EventBus,
};

/// Primeiro e último dia do mês de `day`.
pub fn month_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = day.with_day(1).unwrap_or(day);
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(day);
    (first, last)
}

#[derive(Clone)]
pub struct FinanceService {
    repo: FinanceRepository,
    events: EventBus,
}

impl FinanceService {
    pub fn new(repo: FinanceRepository, events: EventBus) -> Self {
        Self { repo, events }
    }

    pub async fn create_expense(
        &self,
        tenant_id: Uuid,
        created_by: Uuid,
        payload: &ExpensePayload,
    ) -> Result<Expense, AppError> {
        let expense = self.repo.create_expense(tenant_id, created_by, payload).await?;
        tracing::info!("💸 Despesa '{}' de {} {} lançada", expense.description, expense.amount, expense.currency);
        self.events
            .publish(ChangeEvent::created(tenant_id, EntityKind::Expense, expense.id));
        Ok(expense)
    }

    pub async fn list_expenses(
        &self,
        tenant_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Expense>, AppError> {
        self.repo.list_expenses(tenant_id, from, to).await
    }

    pub async fn update_expense(&self, tenant_id: Uuid, id: Uuid, payload: &ExpensePayload) -> Result<Expense, AppError> {
        let expense = self
            .repo
            .update_expense(tenant_id, id, payload)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("expense".into()))?;
        self.events
            .publish(ChangeEvent::updated(tenant_id, EntityKind::Expense, expense.id));
        Ok(expense)
    }

    pub async fn delete_expense(&self, tenant_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_expense(tenant_id, id).await? {
            return Err(AppError::ResourceNotFound("expense".into()));
        }
        self.events
            .publish(ChangeEvent::deleted(tenant_id, EntityKind::Expense, id));
        Ok(())
    }

    pub async fn monthly_totals(
        &self,
        tenant_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<MonthlyExpenseTotal>, AppError> {
        self.repo.monthly_totals(tenant_id, from, to).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_bounds_cover_whole_month() {
        assert_eq!(month_bounds(date(2026, 2, 14)), (date(2026, 2, 1), date(2026, 2, 28)));
        assert_eq!(month_bounds(date(2028, 2, 29)), (date(2028, 2, 1), date(2028, 2, 29)));
        assert_eq!(month_bounds(date(2026, 12, 31)), (date(2026, 12, 1), date(2026, 12, 31)));
    }
}
