// src/services/ticket_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{reference_repo::TenantRef, ReferenceRepository, TicketRepository},
    models::{
        events::{ChangeEvent, EntityKind},
        tickets::{Ticket, TicketPayload, TicketStatus},
    },
    services::events::EventBus,
};

#[derive(Clone)]
pub struct TicketService {
    repo: TicketRepository,
    references: ReferenceRepository,
    events: EventBus,
}

fn ticket_refs(payload: &TicketPayload) -> [(&'static str, Option<TenantRef>); 2] {
    [
        ("customerId", payload.customer_id.map(TenantRef::Customer)),
        ("assigneeId", payload.assignee_id.map(TenantRef::ActiveMember)),
    ]
}

impl TicketService {
    pub fn new(repo: TicketRepository, references: ReferenceRepository, events: EventBus) -> Self {
        Self { repo, references, events }
    }

    pub async fn create(&self, tenant_id: Uuid, created_by: Uuid, payload: &TicketPayload) -> Result<Ticket, AppError> {
        self.references.verify(tenant_id, &ticket_refs(payload)).await?;
        let ticket = self.repo.create(tenant_id, created_by, payload).await?;
        tracing::info!("🎫 Ticket '{}' aberto ({:?})", ticket.subject, ticket.priority);
        self.events
            .publish(ChangeEvent::created(tenant_id, EntityKind::Ticket, ticket.id));
        Ok(ticket)
    }

    pub async fn list(&self, tenant_id: Uuid, status: Option<TicketStatus>) -> Result<Vec<Ticket>, AppError> {
        self.repo.list(tenant_id, status).await
    }

    pub async fn get(&self, tenant_id: Uuid, id: Uuid) -> Result<Ticket, AppError> {
        self.repo
            .find(tenant_id, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("ticket".into()))
    }

    pub async fn update(&self, tenant_id: Uuid, id: Uuid, payload: &TicketPayload) -> Result<Ticket, AppError> {
        self.references.verify(tenant_id, &ticket_refs(payload)).await?;
        let ticket = self
            .repo
            .update(tenant_id, id, payload)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("ticket".into()))?;
        self.events
            .publish(ChangeEvent::updated(tenant_id, EntityKind::Ticket, ticket.id));
        Ok(ticket)
    }

    pub async fn update_status(&self, tenant_id: Uuid, id: Uuid, status: TicketStatus) -> Result<Ticket, AppError> {
        let ticket = self
            .repo
            .update_status(tenant_id, id, status)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("ticket".into()))?;
        tracing::info!("🎫 Ticket {} agora {:?}", ticket.id, ticket.status);
        self.events
            .publish(ChangeEvent::updated(tenant_id, EntityKind::Ticket, ticket.id));
        Ok(ticket)
    }

    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(tenant_id, id).await? {
            return Err(AppError::ResourceNotFound("ticket".into()));
        }
        self.events
            .publish(ChangeEvent::deleted(tenant_id, EntityKind::Ticket, id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tickets::TicketPriority;

    #[test]
    fn ticket_checks_customer_and_assignee() {
        let payload = TicketPayload {
            subject: "Login kaputt".into(),
            description: None,
            priority: TicketPriority::High,
            customer_id: None,
            assignee_id: Some(Uuid::nil()),
            audio_url: None,
        };
        let refs = ticket_refs(&payload);
        assert_eq!(refs[0], ("customerId", None));
        assert_eq!(refs[1], ("assigneeId", Some(TenantRef::ActiveMember(Uuid::nil()))));
    }
}
