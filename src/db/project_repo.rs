// src/db/project_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::projects::{Project, ProjectPayload, Task, TaskPayload, TaskStatus},
};

const PROJECT_COLUMNS: &str =
    "id, tenant_id, name, description, status, customer_id, start_date, end_date, created_at, updated_at";

const TASK_COLUMNS: &str = "id, tenant_id, project_id, title, description, status, assignee_id, \
     start_date, due_date, created_at, updated_at";

#[derive(Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_project(&self, tenant_id: Uuid, p: &ProjectPayload) -> Result<Project, AppError> {
        let sql = format!(
            "INSERT INTO projects (tenant_id, name, description, status, customer_id, start_date, end_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {PROJECT_COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&sql)
            .bind(tenant_id)
            .bind(&p.name)
            .bind(p.description.as_deref())
            .bind(p.status)
            .bind(p.customer_id)
            .bind(p.start_date)
            .bind(p.end_date)
            .fetch_one(&self.pool)
            .await?;
        Ok(project)
    }

    pub async fn list_projects(&self, tenant_id: Uuid) -> Result<Vec<Project>, AppError> {
        let sql = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects
             WHERE tenant_id = $1
             ORDER BY start_date ASC NULLS LAST, name ASC"
        );
        let projects = sqlx::query_as::<_, Project>(&sql)
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(projects)
    }

    pub async fn find_project(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Project>, AppError> {
        let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE tenant_id = $1 AND id = $2");
        let project = sqlx::query_as::<_, Project>(&sql)
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(project)
    }

    pub async fn update_project(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        p: &ProjectPayload,
    ) -> Result<Option<Project>, AppError> {
        let sql = format!(
            "UPDATE projects
             SET name = $3, description = $4, status = $5, customer_id = $6,
                 start_date = $7, end_date = $8, updated_at = NOW()
             WHERE tenant_id = $1 AND id = $2
             RETURNING {PROJECT_COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&sql)
            .bind(tenant_id)
            .bind(id)
            .bind(&p.name)
            .bind(p.description.as_deref())
            .bind(p.status)
            .bind(p.customer_id)
            .bind(p.start_date)
            .bind(p.end_date)
            .fetch_optional(&self.pool)
            .await?;
        Ok(project)
    }

    pub async fn delete_project(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM projects WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  TAREFAS
    // =========================================================================

    pub async fn create_task(
        &self,
        tenant_id: Uuid,
        project_id: Uuid,
        t: &TaskPayload,
    ) -> Result<Task, AppError> {
        let sql = format!(
            "INSERT INTO tasks (tenant_id, project_id, title, description, status, assignee_id, start_date, due_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {TASK_COLUMNS}"
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(tenant_id)
            .bind(project_id)
            .bind(&t.title)
            .bind(t.description.as_deref())
            .bind(t.status)
            .bind(t.assignee_id)
            .bind(t.start_date)
            .bind(t.due_date)
            .fetch_one(&self.pool)
            .await?;
        Ok(task)
    }

    pub async fn list_tasks(&self, tenant_id: Uuid, project_id: Uuid) -> Result<Vec<Task>, AppError> {
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE tenant_id = $1 AND project_id = $2
             ORDER BY start_date ASC NULLS LAST, created_at ASC"
        );
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(tenant_id)
            .bind(project_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }

    pub async fn update_task(
        &self,
        tenant_id: Uuid,
        task_id: Uuid,
        t: &TaskPayload,
    ) -> Result<Option<Task>, AppError> {
        let sql = format!(
            "UPDATE tasks
             SET title = $3, description = $4, status = $5, assignee_id = $6,
                 start_date = $7, due_date = $8, updated_at = NOW()
             WHERE tenant_id = $1 AND id = $2
             RETURNING {TASK_COLUMNS}"
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(tenant_id)
            .bind(task_id)
            .bind(&t.title)
            .bind(t.description.as_deref())
            .bind(t.status)
            .bind(t.assignee_id)
            .bind(t.start_date)
            .bind(t.due_date)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    pub async fn update_task_status(
        &self,
        tenant_id: Uuid,
        task_id: Uuid,
        status: TaskStatus,
    ) -> Result<Option<Task>, AppError> {
        let sql = format!(
            "UPDATE tasks SET status = $3, updated_at = NOW()
             WHERE tenant_id = $1 AND id = $2
             RETURNING {TASK_COLUMNS}"
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(tenant_id)
            .bind(task_id)
            .bind(status)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    pub async fn delete_task(&self, tenant_id: Uuid, task_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(task_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
