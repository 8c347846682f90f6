// src/services/team_service.rs

use std::collections::BTreeSet;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{TeamRepository, UserRepository},
    models::{
        events::{ChangeEvent, EntityKind},
        team::{
            modules_to_strings, AddMemberPayload, AppModule, MemberRole, TeamMember, Tenant,
            UpdatePermissionsPayload,
        },
    },
    services::events::EventBus,
};

/// Regra do último admin: depois da mudança ainda precisa haver um admin ativo.
/// `active_admins` = ids travados na transação; `stays_admin` = o membro continua
/// admin ativo após a operação.
pub fn ensure_admin_remains(
    active_admins: &[Uuid],
    member: &TeamMember,
    stays_admin: bool,
) -> Result<(), AppError> {
    let is_active_admin = active_admins.contains(&member.id);
    if is_active_admin && !stays_admin && active_admins.len() <= 1 {
        return Err(AppError::LastAdminRequired);
    }
    Ok(())
}

#[derive(Clone)]
pub struct TeamService {
    team_repo: TeamRepository,
    user_repo: UserRepository,
    events: EventBus,
    pool: PgPool,
}

impl TeamService {
    pub fn new(team_repo: TeamRepository, user_repo: UserRepository, events: EventBus, pool: PgPool) -> Self {
        Self { team_repo, user_repo, events, pool }
    }

    /// Cria a agência e, na mesma transação, torna o criador ADMIN com todos os módulos.
    pub async fn create_tenant_with_owner(&self, name: &str, owner_id: Uuid) -> Result<Tenant, AppError> {
        let all_modules: BTreeSet<AppModule> = AppModule::ALL.into_iter().collect();

        let mut tx = self.pool.begin().await?;

        let tenant = self.team_repo.create_tenant(&mut *tx, name.trim()).await?;

        self.team_repo
            .insert_member(
                &mut *tx,
                tenant.id,
                owner_id,
                MemberRole::Admin,
                None,
                &modules_to_strings(&all_modules),
            )
            .await?;

        tx.commit().await?;

        tracing::info!("🏢 Agência '{}' criada ({}) pelo usuário {}", tenant.name, tenant.id, owner_id);
        Ok(tenant)
    }

    pub async fn find_active_member(&self, tenant_id: Uuid, user_id: Uuid) -> Result<Option<TeamMember>, AppError> {
        self.team_repo.find_active_member(tenant_id, user_id).await
    }

    pub async fn list_members(&self, tenant_id: Uuid) -> Result<Vec<TeamMember>, AppError> {
        self.team_repo.list_members(tenant_id).await
    }

    /// Adiciona um usuário JÁ registrado (busca por e-mail).
    pub async fn add_member(&self, tenant_id: Uuid, payload: &AddMemberPayload) -> Result<TeamMember, AppError> {
        let user = self
            .user_repo
            .find_by_email(&payload.email)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let mut tx = self.pool.begin().await?;

        let member_id = self
            .team_repo
            .insert_member(
                &mut *tx,
                tenant_id,
                user.id,
                payload.role,
                payload.department,
                &modules_to_strings(&payload.modules),
            )
            .await?;

        let member = self
            .team_repo
            .find_member_by_id(&mut *tx, tenant_id, member_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("member".into()))?;

        tx.commit().await?;

        tracing::info!("👥 {} entrou na agência {} como {:?}", member.email, tenant_id, member.role);
        self.events
            .publish(ChangeEvent::created(tenant_id, EntityKind::Member, member.id));
        Ok(member)
    }

    pub async fn update_permissions(
        &self,
        tenant_id: Uuid,
        member_id: Uuid,
        payload: &UpdatePermissionsPayload,
    ) -> Result<TeamMember, AppError> {
        let mut tx = self.pool.begin().await?;

        // Trava os admins antes de ler o alvo: duas rebaixas simultâneas não passam juntas
        let active_admins = self.team_repo.lock_active_admins(&mut *tx, tenant_id).await?;

        let member = self
            .team_repo
            .find_member_by_id(&mut *tx, tenant_id, member_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("member".into()))?;

        ensure_admin_remains(&active_admins, &member, payload.role == MemberRole::Admin)?;

        self.team_repo
            .update_permissions(
                &mut *tx,
                tenant_id,
                member_id,
                payload.role,
                payload.department,
                &modules_to_strings(&payload.modules),
            )
            .await?;

        let updated = self
            .team_repo
            .find_member_by_id(&mut *tx, tenant_id, member_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("member".into()))?;

        tx.commit().await?;

        tracing::info!("🔑 Permissões de {} atualizadas: {:?} {:?}", updated.email, updated.role, updated.modules);
        self.events
            .publish(ChangeEvent::updated(tenant_id, EntityKind::Member, member_id));
        Ok(updated)
    }

    pub async fn deactivate_member(&self, tenant_id: Uuid, member_id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let active_admins = self.team_repo.lock_active_admins(&mut *tx, tenant_id).await?;

        let member = self
            .team_repo
            .find_member_by_id(&mut *tx, tenant_id, member_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("member".into()))?;

        ensure_admin_remains(&active_admins, &member, false)?;

        self.team_repo.set_active(&mut *tx, tenant_id, member_id, false).await?;
        tx.commit().await?;

        tracing::info!("🚫 Membro {} desativado na agência {}", member.email, tenant_id);
        self.events
            .publish(ChangeEvent::updated(tenant_id, EntityKind::Member, member_id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn member(role: MemberRole) -> TeamMember {
        TeamMember {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            email: "a@b.de".into(),
            display_name: "A".into(),
            role,
            department: None,
            modules: BTreeSet::new(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn sole_admin_cannot_step_down() {
        let admin = member(MemberRole::Admin);
        let err = ensure_admin_remains(&[admin.id], &admin, false).unwrap_err();
        assert!(matches!(err, AppError::LastAdminRequired));
        // Continuar admin (só mexer em módulos) é permitido
        assert!(ensure_admin_remains(&[admin.id], &admin, true).is_ok());
    }

    #[test]
    fn one_of_two_admins_can_step_down() {
        let admin = member(MemberRole::Admin);
        let other = Uuid::new_v4();
        assert!(ensure_admin_remains(&[admin.id, other], &admin, false).is_ok());
    }

    #[test]
    fn non_admins_are_never_blocked() {
        let admin_id = Uuid::new_v4();
        let employee = member(MemberRole::Employee);
        assert!(ensure_admin_remains(&[admin_id], &employee, false).is_ok());
    }
}
