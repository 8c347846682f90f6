// src/db/team_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::team::{Department, MemberRole, Tenant, TeamMember, TeamMemberRow},
};

const MEMBER_COLUMNS: &str = r#"
    m.id, m.tenant_id, m.user_id, u.email, u.display_name,
    m.role, m.department, m.modules, m.is_active, m.created_at
"#;

#[derive(Clone)]
pub struct TeamRepository {
    pool: PgPool,
}

impl TeamRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_tenant<'e, E>(&self, executor: E, name: &str) -> Result<Tenant, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            INSERT INTO tenants (name)
            VALUES ($1)
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(name)
        .fetch_one(executor)
        .await?;
        Ok(tenant)
    }

    /// Vincula um usuário à agência. Retorna só o id; a leitura completa
    /// vem de `find_member_by_id` (precisa do JOIN com users).
    pub async fn insert_member<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        user_id: Uuid,
        role: MemberRole,
        department: Option<Department>,
        modules: &[String],
    ) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO tenant_members (tenant_id, user_id, role, department, modules)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(tenant_id)
        .bind(user_id)
        .bind(role)
        .bind(department)
        .bind(modules)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            crate::common::error::map_unique_violation(e, || {
                "user is already a member of this tenant".to_string()
            })
        })?;
        Ok(id)
    }

    /// Membro ATIVO de um usuário numa agência (usado pelo tenant_guard).
    #[tracing::instrument(name = "Fetch active membership", skip(self))]
    pub async fn find_active_member(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<TeamMember>, AppError> {
        let sql = format!(
            "SELECT {MEMBER_COLUMNS} FROM tenant_members m
             INNER JOIN users u ON u.id = m.user_id
             WHERE m.tenant_id = $1 AND m.user_id = $2 AND m.is_active = TRUE"
        );
        let row = sqlx::query_as::<_, TeamMemberRow>(&sql)
            .bind(tenant_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(TeamMember::from))
    }

    pub async fn find_member_by_id<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        member_id: Uuid,
    ) -> Result<Option<TeamMember>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {MEMBER_COLUMNS} FROM tenant_members m
             INNER JOIN users u ON u.id = m.user_id
             WHERE m.tenant_id = $1 AND m.id = $2"
        );
        let row = sqlx::query_as::<_, TeamMemberRow>(&sql)
            .bind(tenant_id)
            .bind(member_id)
            .fetch_optional(executor)
            .await?;
        Ok(row.map(TeamMember::from))
    }

    pub async fn list_members(&self, tenant_id: Uuid) -> Result<Vec<TeamMember>, AppError> {
        let sql = format!(
            "SELECT {MEMBER_COLUMNS} FROM tenant_members m
             INNER JOIN users u ON u.id = m.user_id
             WHERE m.tenant_id = $1
             ORDER BY m.is_active DESC, u.display_name ASC"
        );
        let rows = sqlx::query_as::<_, TeamMemberRow>(&sql)
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(TeamMember::from).collect())
    }

    /// Trava as linhas de admins ativos e devolve quantos são.
    /// Chamado dentro da transação antes de rebaixar/desativar alguém.
    pub async fn lock_active_admins<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<Vec<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM tenant_members
            WHERE tenant_id = $1 AND role = 'ADMIN' AND is_active = TRUE
            FOR UPDATE
            "#,
        )
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;
        Ok(ids)
    }

    pub async fn update_permissions<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        member_id: Uuid,
        role: MemberRole,
        department: Option<Department>,
        modules: &[String],
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE tenant_members
            SET role = $3, department = $4, modules = $5
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(member_id)
        .bind(role)
        .bind(department)
        .bind(modules)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn set_active<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        member_id: Uuid,
        is_active: bool,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE tenant_members SET is_active = $3 WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id)
        .bind(member_id)
        .bind(is_active)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
