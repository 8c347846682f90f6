// src/services/crm_service.rs

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CrmRepository,
    models::{
        crm::{
            CreateCustomerPayload, Customer, CustomerDetail, CustomerService, ImportProspectsPayload,
            ImportSummary, ServiceFrequency, ServiceStatus, UpdateCustomerPayload,
        },
        events::{ChangeEvent, EntityKind},
    },
    services::events::EventBus,
};

/// Resultado de concluir uma ocorrência: próximo vencimento e novo status.
/// Recorrentes avançam a partir do vencimento atual (mantém o ritmo do calendário);
/// `Once` termina como `Completed`.
pub fn completion_outcome(
    frequency: ServiceFrequency,
    current_due: Option<NaiveDate>,
    today: NaiveDate,
) -> (Option<NaiveDate>, ServiceStatus) {
    match frequency {
        ServiceFrequency::Once => (None, ServiceStatus::Completed),
        recurring => {
            let base = current_due.unwrap_or(today);
            (recurring.advance(base), ServiceStatus::Active)
        }
    }
}

#[derive(Clone)]
pub struct CrmService {
    repo: CrmRepository,
    events: EventBus,
    pool: PgPool,
}

impl CrmService {
    pub fn new(repo: CrmRepository, events: EventBus, pool: PgPool) -> Self {
        Self { repo, events, pool }
    }

    // =========================================================================
    //  1. CLIENTES
    // =========================================================================

    /// Cria o cliente e provisiona os serviços do plano, tudo ou nada.
    pub async fn create_customer(
        &self,
        tenant_id: Uuid,
        payload: &CreateCustomerPayload,
        today: NaiveDate,
    ) -> Result<CustomerDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let customer = self
            .repo
            .create_customer(
                &mut *tx,
                tenant_id,
                payload.name.trim(),
                payload.contact_email.trim(),
                payload.phone.as_deref(),
                payload.plan,
                payload.plan.initial_usage(),
                payload.notes.as_deref(),
            )
            .await?;

        let mut services = Vec::with_capacity(payload.plan.template().len());
        for template in payload.plan.template() {
            let service = self
                .repo
                .insert_service(&mut *tx, tenant_id, customer.id, template, Some(today))
                .await?;
            services.push(service);
        }

        tx.commit().await?;

        tracing::info!(
            "🧾 Cliente '{}' criado no plano {:?} com {} serviço(s)",
            customer.name,
            customer.plan,
            services.len()
        );
        self.events
            .publish(ChangeEvent::created(tenant_id, EntityKind::Customer, customer.id));

        Ok(CustomerDetail { customer, services })
    }

    pub async fn list_customers(&self, tenant_id: Uuid, search: Option<&str>) -> Result<Vec<Customer>, AppError> {
        self.repo.list_customers(tenant_id, search).await
    }

    pub async fn get_customer(&self, tenant_id: Uuid, customer_id: Uuid) -> Result<CustomerDetail, AppError> {
        let customer = self
            .repo
            .find_customer(&self.pool, tenant_id, customer_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("customer".into()))?;
        let services = self.repo.list_services(tenant_id, customer_id).await?;
        Ok(CustomerDetail { customer, services })
    }

    pub async fn update_customer(
        &self,
        tenant_id: Uuid,
        customer_id: Uuid,
        payload: &UpdateCustomerPayload,
    ) -> Result<Customer, AppError> {
        let customer = self
            .repo
            .update_customer(
                tenant_id,
                customer_id,
                payload.name.trim(),
                payload.contact_email.trim(),
                payload.phone.as_deref(),
                payload.notes.as_deref(),
            )
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("customer".into()))?;

        self.events
            .publish(ChangeEvent::updated(tenant_id, EntityKind::Customer, customer.id));
        Ok(customer)
    }

    pub async fn delete_customer(&self, tenant_id: Uuid, customer_id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_customer(tenant_id, customer_id).await? {
            return Err(AppError::ResourceNotFound("customer".into()));
        }
        tracing::info!("🗑️ Cliente {} removido", customer_id);
        self.events
            .publish(ChangeEvent::deleted(tenant_id, EntityKind::Customer, customer_id));
        Ok(())
    }

    // =========================================================================
    //  2. SERVIÇOS
    // =========================================================================

    pub async fn update_service_status(
        &self,
        tenant_id: Uuid,
        service_id: Uuid,
        status: ServiceStatus,
    ) -> Result<CustomerService, AppError> {
        let service = self
            .repo
            .update_service_status(tenant_id, service_id, status)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("service".into()))?;

        self.events
            .publish(ChangeEvent::updated(tenant_id, EntityKind::CustomerService, service.id));
        Ok(service)
    }

    /// Conclui uma ocorrência: +1 no uso do cliente e avança o vencimento.
    pub async fn complete_service(
        &self,
        tenant_id: Uuid,
        service_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<CustomerService, AppError> {
        let mut tx = self.pool.begin().await?;

        let service = self
            .repo
            .lock_service(&mut *tx, tenant_id, service_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("service".into()))?;

        if service.status != ServiceStatus::Active {
            tracing::warn!("⚠️ Conclusão recusada: serviço {} está {:?}", service.id, service.status);
            return Err(AppError::FieldErrors(HashMap::from([(
                "status".to_string(),
                "service_not_active".to_string(),
            )])));
        }

        let (next_due, status) = completion_outcome(service.frequency, service.next_due_date, now.date_naive());

        self.repo
            .increment_usage(&mut *tx, tenant_id, service.customer_id, &service.service_key)
            .await?;

        let updated = self
            .repo
            .record_completion(&mut *tx, tenant_id, service.id, now, next_due, status)
            .await?;

        tx.commit().await?;

        tracing::info!("✅ Serviço '{}' concluído; próximo vencimento {:?}", updated.name, updated.next_due_date);
        self.events
            .publish(ChangeEvent::updated(tenant_id, EntityKind::CustomerService, updated.id));
        Ok(updated)
    }

    pub async fn services_due(&self, tenant_id: Uuid, until: NaiveDate) -> Result<Vec<CustomerService>, AppError> {
        self.repo.services_due(tenant_id, until).await
    }

    // =========================================================================
    //  3. IMPORTAÇÃO DE PROSPECTS
    // =========================================================================

    /// Importa em uma transação; duplicados (nome + endereço) são pulados.
    pub async fn import_prospects(
        &self,
        tenant_id: Uuid,
        payload: &ImportProspectsPayload,
    ) -> Result<ImportSummary, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut summary = ImportSummary { imported: 0, skipped: 0 };

        for input in &payload.prospects {
            if self.repo.insert_prospect(&mut *tx, tenant_id, input).await? {
                summary.imported += 1;
            } else {
                summary.skipped += 1;
            }
        }

        tx.commit().await?;

        tracing::info!(
            "📥 Importação de prospects: {} novo(s), {} duplicado(s)",
            summary.imported,
            summary.skipped
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    #[test]
    fn once_services_complete_for_good() {
        let (next, status) = completion_outcome(ServiceFrequency::Once, Some(date(3, 1)), date(3, 5));
        assert_eq!(next, None);
        assert_eq!(status, ServiceStatus::Completed);
    }

    #[test]
    fn recurring_services_keep_their_cadence() {
        // Concluído com atraso: o próximo vencimento parte do vencimento, não de hoje
        let (next, status) = completion_outcome(ServiceFrequency::Monthly, Some(date(3, 1)), date(3, 9));
        assert_eq!(next, Some(date(4, 1)));
        assert_eq!(status, ServiceStatus::Active);
    }

    #[test]
    fn missing_due_date_starts_from_today() {
        let (next, _) = completion_outcome(ServiceFrequency::Weekly, None, date(3, 9));
        assert_eq!(next, Some(date(3, 16)));
    }
}
