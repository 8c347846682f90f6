// src/models/events.rs

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::team::AppModule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Member,
    Customer,
    CustomerService,
    Prospect,
    Project,
    Task,
    Ticket,
    Expense,
    Article,
    Todo,
    Connection,
    ContentItem,
    MarketingEvent,
    Coupon,
    Email,
    DashboardLayout,
}

impl EntityKind {
    /// Módulo que o membro precisa ter para receber eventos desta entidade.
    pub fn module(self) -> AppModule {
        match self {
            EntityKind::Member => AppModule::Team,
            EntityKind::Customer | EntityKind::CustomerService | EntityKind::Prospect => AppModule::Crm,
            EntityKind::Project | EntityKind::Task => AppModule::Projects,
            EntityKind::Ticket => AppModule::Tickets,
            EntityKind::Expense => AppModule::Finance,
            EntityKind::Article => AppModule::Articles,
            EntityKind::Todo => AppModule::Todos,
            EntityKind::Connection => AppModule::Connections,
            EntityKind::ContentItem | EntityKind::MarketingEvent => AppModule::Marketing,
            EntityKind::Coupon => AppModule::Coupons,
            EntityKind::Email => AppModule::Mail,
            EntityKind::DashboardLayout => AppModule::Dashboard,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Created,
    Updated,
    Deleted,
}

// O que o SSE entrega: só o suficiente para o cliente recarregar a lista
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub entity: EntityKind,
    pub action: ChangeAction,
    pub id: Uuid,
}

impl ChangeEvent {
    pub fn new(tenant_id: Uuid, entity: EntityKind, action: ChangeAction, id: Uuid) -> Self {
        Self { tenant_id, entity, action, id }
    }

    pub fn created(tenant_id: Uuid, entity: EntityKind, id: Uuid) -> Self {
        Self::new(tenant_id, entity, ChangeAction::Created, id)
    }

    pub fn updated(tenant_id: Uuid, entity: EntityKind, id: Uuid) -> Self {
        Self::new(tenant_id, entity, ChangeAction::Updated, id)
    }

    pub fn deleted(tenant_id: Uuid, entity: EntityKind, id: Uuid) -> Self {
        Self::new(tenant_id, entity, ChangeAction::Deleted, id)
    }

    // Nome do evento SSE, ex: "coupon.updated"
    pub fn event_name(&self) -> String {
        let entity = serde_json::to_value(self.entity)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        let action = match self.action {
            ChangeAction::Created => "created",
            ChangeAction::Updated => "updated",
            ChangeAction::Deleted => "deleted",
        };
        format!("{entity}.{action}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_name_joins_entity_and_action() {
        let ev = ChangeEvent::updated(Uuid::new_v4(), EntityKind::MarketingEvent, Uuid::new_v4());
        assert_eq!(ev.event_name(), "marketing_event.updated");
    }

    #[test]
    fn entities_belong_to_the_module_that_guards_their_routes() {
        assert_eq!(EntityKind::Coupon.module(), AppModule::Coupons);
        assert_eq!(EntityKind::CustomerService.module(), AppModule::Crm);
        assert_eq!(EntityKind::Task.module(), AppModule::Projects);
        assert_eq!(EntityKind::MarketingEvent.module(), AppModule::Marketing);
        assert_eq!(EntityKind::Expense.module(), AppModule::Finance);
        assert_eq!(EntityKind::Member.module(), AppModule::Team);
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let ev = ChangeEvent::created(Uuid::nil(), EntityKind::Coupon, Uuid::nil());
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["entity"], "coupon");
        assert_eq!(json["action"], "created");
        assert!(json.get("tenantId").is_some());
    }
}
