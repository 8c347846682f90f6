// src/services/productivity_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ProductivityRepository,
    models::{
        events::{ChangeEvent, EntityKind},
        productivity::{Connection, ConnectionPayload, Todo, TodoPayload},
    },
    services::events::EventBus,
};

#[derive(Clone)]
pub struct ProductivityService {
    repo: ProductivityRepository,
    events: EventBus,
}

impl ProductivityService {
    pub fn new(repo: ProductivityRepository, events: EventBus) -> Self {
        Self { repo, events }
    }

    // --- TODOS: o dono é sempre o usuário autenticado ---

    pub async fn create_todo(&self, tenant_id: Uuid, owner_id: Uuid, payload: &TodoPayload) -> Result<Todo, AppError> {
        let todo = self.repo.create_todo(tenant_id, owner_id, payload).await?;
        self.events
            .publish(ChangeEvent::created(tenant_id, EntityKind::Todo, todo.id));
        Ok(todo)
    }

    pub async fn list_todos(&self, tenant_id: Uuid, owner_id: Uuid) -> Result<Vec<Todo>, AppError> {
        self.repo.list_todos(tenant_id, owner_id).await
    }

    pub async fn update_todo(
        &self,
        tenant_id: Uuid,
        owner_id: Uuid,
        id: Uuid,
        payload: &TodoPayload,
    ) -> Result<Todo, AppError> {
        let todo = self
            .repo
            .update_todo(tenant_id, owner_id, id, payload)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("todo".into()))?;
        self.events
            .publish(ChangeEvent::updated(tenant_id, EntityKind::Todo, todo.id));
        Ok(todo)
    }

    pub async fn toggle_todo(&self, tenant_id: Uuid, owner_id: Uuid, id: Uuid) -> Result<Todo, AppError> {
        let todo = self
            .repo
            .toggle_todo(tenant_id, owner_id, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("todo".into()))?;
        self.events
            .publish(ChangeEvent::updated(tenant_id, EntityKind::Todo, todo.id));
        Ok(todo)
    }

    pub async fn delete_todo(&self, tenant_id: Uuid, owner_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_todo(tenant_id, owner_id, id).await? {
            return Err(AppError::ResourceNotFound("todo".into()));
        }
        self.events
            .publish(ChangeEvent::deleted(tenant_id, EntityKind::Todo, id));
        Ok(())
    }

    // --- CONEXÕES ---

    pub async fn create_connection(&self, tenant_id: Uuid, payload: &ConnectionPayload) -> Result<Connection, AppError> {
        let connection = self.repo.create_connection(tenant_id, payload).await?;
        self.events
            .publish(ChangeEvent::created(tenant_id, EntityKind::Connection, connection.id));
        Ok(connection)
    }

    pub async fn list_connections(&self, tenant_id: Uuid) -> Result<Vec<Connection>, AppError> {
        self.repo.list_connections(tenant_id).await
    }

    pub async fn update_connection(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        payload: &ConnectionPayload,
    ) -> Result<Connection, AppError> {
        let connection = self
            .repo
            .update_connection(tenant_id, id, payload)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("connection".into()))?;
        self.events
            .publish(ChangeEvent::updated(tenant_id, EntityKind::Connection, connection.id));
        Ok(connection)
    }

    pub async fn delete_connection(&self, tenant_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_connection(tenant_id, id).await? {
            return Err(AppError::ResourceNotFound("connection".into()));
        }
        self.events
            .publish(ChangeEvent::deleted(tenant_id, EntityKind::Connection, id));
        Ok(())
    }
}
