// src/services/dashboard_service.rs

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::DashboardRepository,
    models::{
        dashboard::{DashboardLayout, DashboardSummary, WidgetPlacement},
        events::{ChangeEvent, EntityKind},
    },
    services::{events::EventBus, finance_service::month_bounds},
};

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
    events: EventBus,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository, events: EventBus) -> Self {
        Self { repo, events }
    }

    pub async fn get_summary(&self, tenant_id: Uuid, today: NaiveDate) -> Result<DashboardSummary, AppError> {
        let (month_start, month_end) = month_bounds(today);
        self.repo.get_summary(tenant_id, month_start, month_end).await
    }

    /// Sem layout salvo, devolve o padrão (customized = false).
    pub async fn get_layout(&self, tenant_id: Uuid, user_id: Uuid) -> Result<DashboardLayout, AppError> {
        let layout = match self.repo.find_layout(tenant_id, user_id).await? {
            Some(widgets) => DashboardLayout { widgets, customized: true },
            None => DashboardLayout::default_layout(),
        };
        Ok(layout)
    }

    pub async fn save_layout(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        widgets: Vec<WidgetPlacement>,
    ) -> Result<DashboardLayout, AppError> {
        DashboardLayout::validate_widgets(&widgets).map_err(AppError::FieldErrors)?;

        self.repo.save_layout(tenant_id, user_id, &widgets).await?;

        tracing::debug!("🧩 Layout do dashboard salvo ({} widgets)", widgets.len());
        // O id do evento é o usuário dono do layout
        self.events
            .publish(ChangeEvent::updated(tenant_id, EntityKind::DashboardLayout, user_id));
        Ok(DashboardLayout { widgets, customized: true })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    #[tokio::test]
    async fn invalid_layout_is_rejected_before_touching_the_database() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/never_used")
            .unwrap();
        let svc = DashboardService::new(DashboardRepository::new(pool), EventBus::default());

        let widgets = vec![WidgetPlacement {
            widget: "todos".into(),
            x: 0,
            y: 0,
            w: 0,
            h: 2,
        }];
        let err = svc
            .save_layout(Uuid::new_v4(), Uuid::new_v4(), widgets)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::FieldErrors(ref f) if f["widgets[0].size"] == "must_be_positive"));
    }
}
