// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{i18n::Locale, tenancy::CurrentMember},
    models::team::AppModule,
};

/// 1. O que é um módulo protegido
pub trait ModuleDef: Send + Sync + 'static {
    const MODULE: AppModule;
}

/// 2. O extrator (guardião). Exige o tenant_guard antes.
pub struct RequireModule<M>(pub PhantomData<M>);

impl<M, S> FromRequestParts<S> for RequireModule<M>
where
    M: ModuleDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let locale = Locale::from_headers(&parts.headers);

        let member = parts
            .extensions
            .get::<CurrentMember>()
            .ok_or_else(|| AppError::TenantAccessDenied.to_api_error(&locale, &app_state.i18n_store))?;

        if !member.0.can_access(M::MODULE) {
            tracing::warn!("🚫 Membro {} sem acesso ao módulo '{}'", member.0.id, M::MODULE);
            return Err(AppError::ModuleAccessDenied(M::MODULE).to_api_error(&locale, &app_state.i18n_store));
        }

        Ok(RequireModule(PhantomData))
    }
}

// ---
// MÓDULOS (TIPOS)
// ---

pub struct DashboardModule;
impl ModuleDef for DashboardModule {
    const MODULE: AppModule = AppModule::Dashboard;
}

pub struct CrmModule;
impl ModuleDef for CrmModule {
    const MODULE: AppModule = AppModule::Crm;
}

pub struct ProjectsModule;
impl ModuleDef for ProjectsModule {
    const MODULE: AppModule = AppModule::Projects;
}

pub struct TicketsModule;
impl ModuleDef for TicketsModule {
    const MODULE: AppModule = AppModule::Tickets;
}

pub struct FinanceModule;
impl ModuleDef for FinanceModule {
    const MODULE: AppModule = AppModule::Finance;
}

pub struct ArticlesModule;
impl ModuleDef for ArticlesModule {
    const MODULE: AppModule = AppModule::Articles;
}

pub struct TodosModule;
impl ModuleDef for TodosModule {
    const MODULE: AppModule = AppModule::Todos;
}

pub struct ConnectionsModule;
impl ModuleDef for ConnectionsModule {
    const MODULE: AppModule = AppModule::Connections;
}

pub struct MarketingModule;
impl ModuleDef for MarketingModule {
    const MODULE: AppModule = AppModule::Marketing;
}

pub struct CouponsModule;
impl ModuleDef for CouponsModule {
    const MODULE: AppModule = AppModule::Coupons;
}

pub struct MailModule;
impl ModuleDef for MailModule {
    const MODULE: AppModule = AppModule::Mail;
}

pub struct TeamModule;
impl ModuleDef for TeamModule {
    const MODULE: AppModule = AppModule::Team;
}
