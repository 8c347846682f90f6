// src/services/marketing_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{reference_repo::TenantRef, CrmRepository, MarketingRepository, ReferenceRepository},
    models::{
        events::{ChangeEvent, EntityKind},
        marketing::{
            bounding_box, rank_by_distance, CalendarQuery, ContentItem, ContentItemPayload, EventStatus,
            GeoHit, GeoSearchQuery, MarketingChannel, MarketingEvent, ScheduleEventPayload,
        },
    },
    services::events::EventBus,
};

#[derive(Clone)]
pub struct MarketingService {
    repo: MarketingRepository,
    crm_repo: CrmRepository,
    references: ReferenceRepository,
    events: EventBus,
}

fn event_refs(payload: &ScheduleEventPayload) -> [(&'static str, Option<TenantRef>); 2] {
    [
        ("contentItemId", payload.content_item_id.map(TenantRef::ContentItem)),
        ("customerId", payload.customer_id.map(TenantRef::Customer)),
    ]
}

impl MarketingService {
    pub fn new(
        repo: MarketingRepository,
        crm_repo: CrmRepository,
        references: ReferenceRepository,
        events: EventBus,
    ) -> Self {
        Self { repo, crm_repo, references, events }
    }

    // =========================================================================
    //  POOL DE CONTEÚDO
    // =========================================================================

    pub async fn create_content(&self, tenant_id: Uuid, payload: &ContentItemPayload) -> Result<ContentItem, AppError> {
        let item = self.repo.create_content(tenant_id, payload).await?;
        self.events
            .publish(ChangeEvent::created(tenant_id, EntityKind::ContentItem, item.id));
        Ok(item)
    }

    pub async fn list_content(&self, tenant_id: Uuid) -> Result<Vec<ContentItem>, AppError> {
        self.repo.list_content(tenant_id).await
    }

    pub async fn update_content(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        payload: &ContentItemPayload,
    ) -> Result<ContentItem, AppError> {
        let item = self
            .repo
            .update_content(tenant_id, id, payload)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("content item".into()))?;
        self.events
            .publish(ChangeEvent::updated(tenant_id, EntityKind::ContentItem, item.id));
        Ok(item)
    }

    pub async fn delete_content(&self, tenant_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_content(tenant_id, id).await? {
            return Err(AppError::ResourceNotFound("content item".into()));
        }
        self.events
            .publish(ChangeEvent::deleted(tenant_id, EntityKind::ContentItem, id));
        Ok(())
    }

    /// Próximo item não usado (mais antigo primeiro); pool vazio = 404.
    pub async fn take_next_content(
        &self,
        tenant_id: Uuid,
        channel: Option<MarketingChannel>,
    ) -> Result<ContentItem, AppError> {
        let item = self
            .repo
            .take_next_content(tenant_id, channel)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("unused content item".into()))?;

        tracing::info!("📝 Conteúdo '{}' retirado do pool", item.title);
        self.events
            .publish(ChangeEvent::updated(tenant_id, EntityKind::ContentItem, item.id));
        Ok(item)
    }

    // =========================================================================
    //  CALENDÁRIO
    // =========================================================================

    pub async fn schedule_event(&self, tenant_id: Uuid, payload: &ScheduleEventPayload) -> Result<MarketingEvent, AppError> {
        self.references.verify(tenant_id, &event_refs(payload)).await?;
        let event = self.repo.create_event(tenant_id, payload).await?;
        tracing::info!("📅 Evento '{}' agendado para {}", event.title, event.starts_at);
        self.events
            .publish(ChangeEvent::created(tenant_id, EntityKind::MarketingEvent, event.id));
        Ok(event)
    }

    pub async fn list_events(&self, tenant_id: Uuid, range: &CalendarQuery) -> Result<Vec<MarketingEvent>, AppError> {
        if range.to < range.from {
            return Err(AppError::FieldErrors(
                [("to".to_string(), "end_before_start".to_string())].into(),
            ));
        }
        self.repo.list_events(tenant_id, range.from, range.to).await
    }

    pub async fn update_event_status(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        status: EventStatus,
    ) -> Result<MarketingEvent, AppError> {
        let event = self
            .repo
            .update_event_status(tenant_id, id, status)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("marketing event".into()))?;
        self.events
            .publish(ChangeEvent::updated(tenant_id, EntityKind::MarketingEvent, event.id));
        Ok(event)
    }

    pub async fn delete_event(&self, tenant_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_event(tenant_id, id).await? {
            return Err(AppError::ResourceNotFound("marketing event".into()));
        }
        self.events
            .publish(ChangeEvent::deleted(tenant_id, EntityKind::MarketingEvent, id));
        Ok(())
    }

    // =========================================================================
    //  GEOMARKETING
    // =========================================================================

    pub async fn search_nearby(&self, tenant_id: Uuid, query: &GeoSearchQuery) -> Result<Vec<GeoHit>, AppError> {
        let bbox = bounding_box(query.lat, query.lon, query.radius_km);
        let category = query.category.as_deref().map(str::trim).filter(|c| !c.is_empty());

        let candidates = self.crm_repo.prospects_in_box(tenant_id, &bbox, category).await?;
        let hits = rank_by_distance(candidates, query.lat, query.lon, query.radius_km);

        tracing::debug!("🗺️ {} empresa(s) em {} km", hits.len(), query.radius_km);
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn scheduled_event_checks_content_and_customer() {
        let (content, customer) = (Uuid::new_v4(), Uuid::new_v4());
        let payload = ScheduleEventPayload {
            title: "Herbstaktion".into(),
            channel: MarketingChannel::Social,
            starts_at: Utc::now(),
            ends_at: None,
            content_item_id: Some(content),
            customer_id: Some(customer),
        };
        assert_eq!(
            event_refs(&payload),
            [
                ("contentItemId", Some(TenantRef::ContentItem(content))),
                ("customerId", Some(TenantRef::Customer(customer))),
            ]
        );
    }
}
