// src/services/project_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{reference_repo::TenantRef, ProjectRepository, ReferenceRepository},
    models::{
        events::{ChangeEvent, EntityKind},
        projects::{Project, ProjectPayload, ProjectTimeline, Task, TaskPayload, TaskStatus},
    },
    services::events::EventBus,
};

#[derive(Clone)]
pub struct ProjectService {
    repo: ProjectRepository,
    references: ReferenceRepository,
    events: EventBus,
}

// Ids de outras tabelas que o payload traz, com o nome do campo para o erro
fn project_refs(payload: &ProjectPayload) -> [(&'static str, Option<TenantRef>); 1] {
    [("customerId", payload.customer_id.map(TenantRef::Customer))]
}

fn task_refs(payload: &TaskPayload) -> [(&'static str, Option<TenantRef>); 1] {
    [("assigneeId", payload.assignee_id.map(TenantRef::ActiveMember))]
}

impl ProjectService {
    pub fn new(repo: ProjectRepository, references: ReferenceRepository, events: EventBus) -> Self {
        Self { repo, references, events }
    }

    pub async fn create_project(&self, tenant_id: Uuid, payload: &ProjectPayload) -> Result<Project, AppError> {
        self.references.verify(tenant_id, &project_refs(payload)).await?;
        let project = self.repo.create_project(tenant_id, payload).await?;
        tracing::info!("📁 Projeto '{}' criado", project.name);
        self.events
            .publish(ChangeEvent::created(tenant_id, EntityKind::Project, project.id));
        Ok(project)
    }

    pub async fn list_projects(&self, tenant_id: Uuid) -> Result<Vec<Project>, AppError> {
        self.repo.list_projects(tenant_id).await
    }

    pub async fn get_project(&self, tenant_id: Uuid, project_id: Uuid) -> Result<Project, AppError> {
        self.repo
            .find_project(tenant_id, project_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("project".into()))
    }

    pub async fn update_project(
        &self,
        tenant_id: Uuid,
        project_id: Uuid,
        payload: &ProjectPayload,
    ) -> Result<Project, AppError> {
        self.references.verify(tenant_id, &project_refs(payload)).await?;
        let project = self
            .repo
            .update_project(tenant_id, project_id, payload)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("project".into()))?;
        self.events
            .publish(ChangeEvent::updated(tenant_id, EntityKind::Project, project.id));
        Ok(project)
    }

    pub async fn delete_project(&self, tenant_id: Uuid, project_id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_project(tenant_id, project_id).await? {
            return Err(AppError::ResourceNotFound("project".into()));
        }
        self.events
            .publish(ChangeEvent::deleted(tenant_id, EntityKind::Project, project_id));
        Ok(())
    }

    // --- TAREFAS ---

    pub async fn create_task(&self, tenant_id: Uuid, project_id: Uuid, payload: &TaskPayload) -> Result<Task, AppError> {
        // Garante que o projeto é desta agência antes de pendurar a tarefa
        self.get_project(tenant_id, project_id).await?;
        self.references.verify(tenant_id, &task_refs(payload)).await?;
        let task = self.repo.create_task(tenant_id, project_id, payload).await?;
        self.events
            .publish(ChangeEvent::created(tenant_id, EntityKind::Task, task.id));
        Ok(task)
    }

    pub async fn list_tasks(&self, tenant_id: Uuid, project_id: Uuid) -> Result<Vec<Task>, AppError> {
        self.get_project(tenant_id, project_id).await?;
        self.repo.list_tasks(tenant_id, project_id).await
    }

    pub async fn update_task(&self, tenant_id: Uuid, task_id: Uuid, payload: &TaskPayload) -> Result<Task, AppError> {
        self.references.verify(tenant_id, &task_refs(payload)).await?;
        let task = self
            .repo
            .update_task(tenant_id, task_id, payload)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("task".into()))?;
        self.events
            .publish(ChangeEvent::updated(tenant_id, EntityKind::Task, task.id));
        Ok(task)
    }

    pub async fn update_task_status(&self, tenant_id: Uuid, task_id: Uuid, status: TaskStatus) -> Result<Task, AppError> {
        let task = self
            .repo
            .update_task_status(tenant_id, task_id, status)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("task".into()))?;
        self.events
            .publish(ChangeEvent::updated(tenant_id, EntityKind::Task, task.id));
        Ok(task)
    }

    pub async fn delete_task(&self, tenant_id: Uuid, task_id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_task(tenant_id, task_id).await? {
            return Err(AppError::ResourceNotFound("task".into()));
        }
        self.events
            .publish(ChangeEvent::deleted(tenant_id, EntityKind::Task, task_id));
        Ok(())
    }

    pub async fn timeline(&self, tenant_id: Uuid, project_id: Uuid) -> Result<ProjectTimeline, AppError> {
        let project = self.get_project(tenant_id, project_id).await?;
        let tasks = self.repo.list_tasks(tenant_id, project_id).await?;
        Ok(ProjectTimeline::build(&project, &tasks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::projects::ProjectStatus;

    #[test]
    fn project_customer_is_checked_as_customer() {
        let customer = Uuid::new_v4();
        let payload = ProjectPayload {
            name: "Relaunch".into(),
            description: None,
            status: ProjectStatus::Planned,
            customer_id: Some(customer),
            start_date: None,
            end_date: None,
        };
        assert_eq!(project_refs(&payload), [("customerId", Some(TenantRef::Customer(customer)))]);
    }

    #[test]
    fn task_assignee_must_be_an_active_member() {
        let user = Uuid::new_v4();
        let payload = TaskPayload {
            title: "Briefing".into(),
            description: None,
            status: TaskStatus::Todo,
            assignee_id: Some(user),
            start_date: None,
            due_date: None,
        };
        assert_eq!(task_refs(&payload), [("assigneeId", Some(TenantRef::ActiveMember(user)))]);
    }
}
