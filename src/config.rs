// src/config.rs

use std::{collections::HashMap, env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{
        ArticleRepository, CouponRepository, CrmRepository, DashboardRepository, FinanceRepository,
        MailRepository, MarketingRepository, ProductivityRepository, ProjectRepository, ReferenceRepository,
        TeamRepository, TicketRepository, UserRepository,
    },
    models::{mail::SenderDirectory, team::Department},
    services::{
        article_service::ArticleService,
        auth::AuthService,
        coupon_service::CouponService,
        crm_service::CrmService,
        dashboard_service::DashboardService,
        document_service::DocumentService,
        events::EventBus,
        finance_service::FinanceService,
        mail_service::{LogTransport, MailService, MailTransport},
        marketing_service::MarketingService,
        productivity_service::ProductivityService,
        project_service::ProjectService,
        team_service::TeamService,
        ticket_service::TicketService,
    },
};

// Variáveis lidas do ambiente (.env em desenvolvimento)
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub frontend_url: String,
    pub public_base_url: String,
    pub fonts_dir: String,
    pub mail_senders: HashMap<Department, String>,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let db_max_connections = var_or("DB_MAX_CONNECTIONS", "5")
            .parse()
            .context("DB_MAX_CONNECTIONS deve ser um número")?;

        // MAIL_FROM_SALES, MAIL_FROM_SUPPORT, ...
        let mail_senders = Department::ALL
            .into_iter()
            .map(|d| {
                let key = format!("MAIL_FROM_{}", d.as_str().to_uppercase());
                (d, var_or(&key, &format!("{}@agency.local", d.as_str())))
            })
            .collect();

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr: var_or("BIND_ADDR", "0.0.0.0:3000"),
            db_max_connections,
            frontend_url: var_or("FRONTEND_URL", "http://localhost:5173"),
            public_base_url: var_or("PUBLIC_BASE_URL", "http://localhost:3000"),
            fonts_dir: var_or("FONTS_DIR", "./fonts"),
            mail_senders,
        })
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub i18n_store: Arc<I18nStore>,
    pub events: EventBus,

    pub auth_service: AuthService,
    pub team_service: TeamService,
    pub crm_service: CrmService,
    pub project_service: ProjectService,
    pub ticket_service: TicketService,
    pub finance_service: FinanceService,
    pub article_service: ArticleService,
    pub productivity_service: ProductivityService,
    pub marketing_service: MarketingService,
    pub coupon_service: CouponService,
    pub document_service: DocumentService,
    pub mail_service: MailService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::from_pool(db_pool, config, Arc::new(LogTransport)))
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_pool(db_pool: PgPool, config: Config, transport: Arc<dyn MailTransport>) -> Self {
        let events = EventBus::default();

        let user_repo = UserRepository::new(db_pool.clone());
        let team_repo = TeamRepository::new(db_pool.clone());
        let crm_repo = CrmRepository::new(db_pool.clone());
        let references = ReferenceRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo.clone(), config.jwt_secret.clone(), db_pool.clone());
        let team_service = TeamService::new(team_repo, user_repo, events.clone(), db_pool.clone());
        let crm_service = CrmService::new(crm_repo.clone(), events.clone(), db_pool.clone());
        let project_service =
            ProjectService::new(ProjectRepository::new(db_pool.clone()), references.clone(), events.clone());
        let ticket_service =
            TicketService::new(TicketRepository::new(db_pool.clone()), references.clone(), events.clone());
        let finance_service = FinanceService::new(FinanceRepository::new(db_pool.clone()), events.clone());
        let article_service = ArticleService::new(ArticleRepository::new(db_pool.clone()), events.clone());
        let productivity_service =
            ProductivityService::new(ProductivityRepository::new(db_pool.clone()), events.clone());
        let marketing_service = MarketingService::new(
            MarketingRepository::new(db_pool.clone()),
            crm_repo.clone(),
            references.clone(),
            events.clone(),
        );
        let coupon_service =
            CouponService::new(CouponRepository::new(db_pool.clone()), references, events.clone(), db_pool.clone());
        let document_service = DocumentService::new(config.fonts_dir.clone(), config.public_base_url.clone());
        let mail_service = MailService::new(
            MailRepository::new(db_pool.clone()),
            crm_repo,
            SenderDirectory::new(config.mail_senders.clone()),
            transport,
            events.clone(),
            &config.jwt_secret,
            config.frontend_url.clone(),
            db_pool.clone(),
        );
        let dashboard_service = DashboardService::new(DashboardRepository::new(db_pool.clone()), events.clone());

        Self {
            db_pool,
            config: Arc::new(config),
            i18n_store: Arc::new(I18nStore::new()),
            events,
            auth_service,
            team_service,
            crm_service,
            project_service,
            ticket_service,
            finance_service,
            article_service,
            productivity_service,
            marketing_service,
            coupon_service,
            document_service,
            mail_service,
            dashboard_service,
        }
    }
}

#[cfg(test)]
pub mod test_support {
    use super::*;

    pub fn test_config() -> Config {
        Config {
            database_url: "postgres://localhost/never_used".into(),
            jwt_secret: "test-secret".into(),
            bind_addr: "127.0.0.1:0".into(),
            db_max_connections: 1,
            frontend_url: "http://localhost:5173".into(),
            public_base_url: "https://agentur.de".into(),
            fonts_dir: "./fonts".into(),
            mail_senders: Department::ALL
                .into_iter()
                .map(|d| (d, format!("{}@agentur.de", d.as_str())))
                .collect(),
        }
    }

    /// Estado com pool preguiçoso: serve para rotas que nunca chegam ao banco.
    pub fn lazy_state() -> AppState {
        let config = test_config();
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .expect("URL de teste válida");
        AppState::from_pool(pool, config, Arc::new(LogTransport))
    }
}
