// src/db/productivity_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::productivity::{Connection, ConnectionPayload, Todo, TodoPayload},
};

const TODO_COLUMNS: &str =
    "id, tenant_id, owner_id, title, priority, completed, due_date, created_at, updated_at";

const CONNECTION_COLUMNS: &str =
    "id, tenant_id, name, company, email, phone, notes, created_at, updated_at";

#[derive(Clone)]
pub struct ProductivityRepository {
    pool: PgPool,
}

impl ProductivityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  TODOS (sempre do próprio usuário)
    // =========================================================================

    pub async fn create_todo(&self, tenant_id: Uuid, owner_id: Uuid, t: &TodoPayload) -> Result<Todo, AppError> {
        let sql = format!(
            "INSERT INTO todos (tenant_id, owner_id, title, priority, completed, due_date)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {TODO_COLUMNS}"
        );
        let todo = sqlx::query_as::<_, Todo>(&sql)
            .bind(tenant_id)
            .bind(owner_id)
            .bind(&t.title)
            .bind(t.priority)
            .bind(t.completed)
            .bind(t.due_date)
            .fetch_one(&self.pool)
            .await?;
        Ok(todo)
    }

    // Pendentes primeiro, depois por prazo
    pub async fn list_todos(&self, tenant_id: Uuid, owner_id: Uuid) -> Result<Vec<Todo>, AppError> {
        let sql = format!(
            "SELECT {TODO_COLUMNS} FROM todos
             WHERE tenant_id = $1 AND owner_id = $2
             ORDER BY completed ASC, due_date ASC NULLS LAST, priority DESC, created_at ASC"
        );
        let todos = sqlx::query_as::<_, Todo>(&sql)
            .bind(tenant_id)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(todos)
    }

    pub async fn update_todo(
        &self,
        tenant_id: Uuid,
        owner_id: Uuid,
        id: Uuid,
        t: &TodoPayload,
    ) -> Result<Option<Todo>, AppError> {
        let sql = format!(
            "UPDATE todos
             SET title = $4, priority = $5, completed = $6, due_date = $7, updated_at = NOW()
             WHERE tenant_id = $1 AND owner_id = $2 AND id = $3
             RETURNING {TODO_COLUMNS}"
        );
        let todo = sqlx::query_as::<_, Todo>(&sql)
            .bind(tenant_id)
            .bind(owner_id)
            .bind(id)
            .bind(&t.title)
            .bind(t.priority)
            .bind(t.completed)
            .bind(t.due_date)
            .fetch_optional(&self.pool)
            .await?;
        Ok(todo)
    }

    pub async fn toggle_todo(&self, tenant_id: Uuid, owner_id: Uuid, id: Uuid) -> Result<Option<Todo>, AppError> {
        let sql = format!(
            "UPDATE todos SET completed = NOT completed, updated_at = NOW()
             WHERE tenant_id = $1 AND owner_id = $2 AND id = $3
             RETURNING {TODO_COLUMNS}"
        );
        let todo = sqlx::query_as::<_, Todo>(&sql)
            .bind(tenant_id)
            .bind(owner_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(todo)
    }

    pub async fn delete_todo(&self, tenant_id: Uuid, owner_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM todos WHERE tenant_id = $1 AND owner_id = $2 AND id = $3")
            .bind(tenant_id)
            .bind(owner_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  CONEXÕES
    // =========================================================================

    pub async fn create_connection(&self, tenant_id: Uuid, c: &ConnectionPayload) -> Result<Connection, AppError> {
        let sql = format!(
            "INSERT INTO connections (tenant_id, name, company, email, phone, notes)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {CONNECTION_COLUMNS}"
        );
        let connection = sqlx::query_as::<_, Connection>(&sql)
            .bind(tenant_id)
            .bind(&c.name)
            .bind(c.company.as_deref())
            .bind(c.email.as_deref())
            .bind(c.phone.as_deref())
            .bind(c.notes.as_deref())
            .fetch_one(&self.pool)
            .await?;
        Ok(connection)
    }

    pub async fn list_connections(&self, tenant_id: Uuid) -> Result<Vec<Connection>, AppError> {
        let sql = format!("SELECT {CONNECTION_COLUMNS} FROM connections WHERE tenant_id = $1 ORDER BY name ASC");
        let connections = sqlx::query_as::<_, Connection>(&sql)
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(connections)
    }

    pub async fn update_connection(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        c: &ConnectionPayload,
    ) -> Result<Option<Connection>, AppError> {
        let sql = format!(
            "UPDATE connections
             SET name = $3, company = $4, email = $5, phone = $6, notes = $7, updated_at = NOW()
             WHERE tenant_id = $1 AND id = $2
             RETURNING {CONNECTION_COLUMNS}"
        );
        let connection = sqlx::query_as::<_, Connection>(&sql)
            .bind(tenant_id)
            .bind(id)
            .bind(&c.name)
            .bind(c.company.as_deref())
            .bind(c.email.as_deref())
            .bind(c.phone.as_deref())
            .bind(c.notes.as_deref())
            .fetch_optional(&self.pool)
            .await?;
        Ok(connection)
    }

    pub async fn delete_connection(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM connections WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
