// src/models/team.rs

use std::{collections::BTreeSet, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- ENUMS ---

/// Módulos da aplicação. Conjunto fechado: um nome desconhecido nem desserializa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AppModule {
    Dashboard,
    Crm,
    Projects,
    Tickets,
    Finance,
    Articles,
    Todos,
    Connections,
    Marketing,
    Coupons,
    Mail,
    Team,
}

impl AppModule {
    pub const ALL: [AppModule; 12] = [
        AppModule::Dashboard,
        AppModule::Crm,
        AppModule::Projects,
        AppModule::Tickets,
        AppModule::Finance,
        AppModule::Articles,
        AppModule::Todos,
        AppModule::Connections,
        AppModule::Marketing,
        AppModule::Coupons,
        AppModule::Mail,
        AppModule::Team,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppModule::Dashboard => "dashboard",
            AppModule::Crm => "crm",
            AppModule::Projects => "projects",
            AppModule::Tickets => "tickets",
            AppModule::Finance => "finance",
            AppModule::Articles => "articles",
            AppModule::Todos => "todos",
            AppModule::Connections => "connections",
            AppModule::Marketing => "marketing",
            AppModule::Coupons => "coupons",
            AppModule::Mail => "mail",
            AppModule::Team => "team",
        }
    }
}

impl fmt::Display for AppModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownModule(pub String);

impl FromStr for AppModule {
    type Err = UnknownModule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AppModule::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownModule(s.to_string()))
    }
}

// Mapeia o CREATE TYPE member_role do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "member_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberRole {
    Admin,
    Manager,
    Employee,
}

// Departamentos (também definem a conta remetente de e-mail)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "department", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Department {
    Sales,
    Support,
    Marketing,
    Accounting,
}

impl Department {
    pub const ALL: [Department; 4] = [
        Department::Sales,
        Department::Support,
        Department::Marketing,
        Department::Accounting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Sales => "sales",
            Department::Support => "support",
            Department::Marketing => "marketing",
            Department::Accounting => "accounting",
        }
    }
}

// --- TENANT (A Agência) ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,
    #[schema(example = "Agentur Nord")]
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- MEMBRO DA EQUIPE ---

// Linha crua do banco: módulos ficam em TEXT[]
#[derive(Debug, Clone, FromRow)]
pub struct TeamMemberRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: MemberRole,
    pub department: Option<Department>,
    pub modules: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: MemberRole,
    pub department: Option<Department>,
    pub modules: BTreeSet<AppModule>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<TeamMemberRow> for TeamMember {
    fn from(row: TeamMemberRow) -> Self {
        // Strings antigas/desconhecidas no banco são descartadas, nunca concedem acesso
        let modules = row
            .modules
            .iter()
            .filter_map(|m| match m.parse::<AppModule>() {
                Ok(module) => Some(module),
                Err(UnknownModule(name)) => {
                    tracing::warn!("⚠️ Módulo desconhecido '{}' ignorado para o membro {}", name, row.id);
                    None
                }
            })
            .collect();

        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            user_id: row.user_id,
            email: row.email,
            display_name: row.display_name,
            role: row.role,
            department: row.department,
            modules,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

impl TeamMember {
    pub fn can_access(&self, module: AppModule) -> bool {
        self.is_active && (self.role == MemberRole::Admin || self.modules.contains(&module))
    }
}

pub fn modules_to_strings(modules: &BTreeSet<AppModule>) -> Vec<String> {
    modules.iter().map(|m| m.as_str().to_string()).collect()
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantPayload {
    #[validate(length(min = 2, message = "name_too_short"))]
    #[schema(example = "Agentur Nord")]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberPayload {
    #[validate(email(message = "invalid_email"))]
    #[schema(example = "jonas@agentur.de")]
    pub email: String,
    pub role: MemberRole,
    pub department: Option<Department>,
    #[serde(default)]
    #[schema(example = json!(["crm", "coupons"]))]
    pub modules: BTreeSet<AppModule>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePermissionsPayload {
    pub role: MemberRole,
    pub department: Option<Department>,
    #[schema(example = json!(["crm", "projects", "tickets"]))]
    pub modules: BTreeSet<AppModule>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(role: MemberRole, modules: &[AppModule]) -> TeamMember {
        TeamMember {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            email: "x@y.de".into(),
            display_name: "X".into(),
            role,
            department: None,
            modules: modules.iter().copied().collect(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn admin_sees_everything() {
        let admin = member(MemberRole::Admin, &[]);
        assert!(AppModule::ALL.iter().all(|m| admin.can_access(*m)));
    }

    #[test]
    fn employee_only_sees_granted_modules() {
        let employee = member(MemberRole::Employee, &[AppModule::Crm]);
        assert!(employee.can_access(AppModule::Crm));
        assert!(!employee.can_access(AppModule::Coupons));
    }

    #[test]
    fn inactive_member_sees_nothing() {
        let mut admin = member(MemberRole::Admin, &[]);
        admin.is_active = false;
        assert!(!admin.can_access(AppModule::Dashboard));
    }

    #[test]
    fn unknown_module_names_are_rejected() {
        let parsed: Result<BTreeSet<AppModule>, _> = serde_json::from_str(r#"["crm", "cupons"]"#);
        assert!(parsed.is_err());
        assert_eq!("coupons".parse::<AppModule>(), Ok(AppModule::Coupons));
    }

    #[test]
    fn stale_db_modules_are_dropped() {
        let row = TeamMemberRow {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            email: "x@y.de".into(),
            display_name: "X".into(),
            role: MemberRole::Employee,
            department: Some(Department::Sales),
            modules: vec!["crm".into(), "legacy_reports".into()],
            is_active: true,
            created_at: Utc::now(),
        };
        let member = TeamMember::from(row);
        assert_eq!(member.modules.len(), 1);
        assert!(member.can_access(AppModule::Crm));
    }
}
