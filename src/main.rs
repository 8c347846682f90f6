//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post, put},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Config};
use crate::middleware::auth::{auth_guard, tenant_guard};

// Rotas de uma agência (X-Tenant-ID + membro ativo); o módulo é checado em cada handler
fn tenant_routes() -> Router<AppState> {
    let team = Router::new()
        .route("/team/me", get(handlers::team::get_my_membership))
        .route(
            "/team/members",
            get(handlers::team::list_members).post(handlers::team::add_member),
        )
        .route("/team/members/{id}", axum::routing::delete(handlers::team::deactivate_member))
        .route("/team/members/{id}/permissions", put(handlers::team::update_permissions));

    let crm = Router::new()
        .route(
            "/crm/customers",
            post(handlers::crm::create_customer).get(handlers::crm::list_customers),
        )
        .route(
            "/crm/customers/{id}",
            get(handlers::crm::get_customer)
                .put(handlers::crm::update_customer)
                .delete(handlers::crm::delete_customer),
        )
        .route("/crm/services/due", get(handlers::crm::services_due))
        .route("/crm/services/{id}/status", patch(handlers::crm::update_service_status))
        .route("/crm/services/{id}/complete", post(handlers::crm::complete_service))
        .route("/crm/prospects/import", post(handlers::crm::import_prospects));

    let projects = Router::new()
        .route(
            "/projects",
            post(handlers::projects::create_project).get(handlers::projects::list_projects),
        )
        .route(
            "/projects/{id}",
            get(handlers::projects::get_project)
                .put(handlers::projects::update_project)
                .delete(handlers::projects::delete_project),
        )
        .route("/projects/{id}/timeline", get(handlers::projects::get_timeline))
        .route(
            "/projects/{id}/tasks",
            post(handlers::projects::create_task).get(handlers::projects::list_tasks),
        )
        .route(
            "/tasks/{id}",
            put(handlers::projects::update_task).delete(handlers::projects::delete_task),
        )
        .route("/tasks/{id}/status", patch(handlers::projects::update_task_status));

    let tickets = Router::new()
        .route(
            "/tickets",
            post(handlers::tickets::create_ticket).get(handlers::tickets::list_tickets),
        )
        .route(
            "/tickets/{id}",
            get(handlers::tickets::get_ticket)
                .put(handlers::tickets::update_ticket)
                .delete(handlers::tickets::delete_ticket),
        )
        .route("/tickets/{id}/status", patch(handlers::tickets::update_ticket_status));

    let finance = Router::new()
        .route(
            "/finance/expenses",
            post(handlers::finance::create_expense).get(handlers::finance::list_expenses),
        )
        .route("/finance/expenses/monthly", get(handlers::finance::monthly_totals))
        .route(
            "/finance/expenses/{id}",
            put(handlers::finance::update_expense).delete(handlers::finance::delete_expense),
        );

    let articles = Router::new()
        .route(
            "/articles",
            post(handlers::articles::create_article).get(handlers::articles::list_articles),
        )
        .route(
            "/articles/{id}",
            get(handlers::articles::get_article)
                .put(handlers::articles::update_article)
                .delete(handlers::articles::delete_article),
        );

    let productivity = Router::new()
        .route(
            "/todos",
            post(handlers::productivity::create_todo).get(handlers::productivity::list_todos),
        )
        .route(
            "/todos/{id}",
            put(handlers::productivity::update_todo).delete(handlers::productivity::delete_todo),
        )
        .route("/todos/{id}/toggle", post(handlers::productivity::toggle_todo))
        .route(
            "/connections",
            post(handlers::productivity::create_connection).get(handlers::productivity::list_connections),
        )
        .route(
            "/connections/{id}",
            put(handlers::productivity::update_connection).delete(handlers::productivity::delete_connection),
        );

    let marketing = Router::new()
        .route(
            "/marketing/content",
            post(handlers::marketing::create_content).get(handlers::marketing::list_content),
        )
        .route("/marketing/content/take", post(handlers::marketing::take_next_content))
        .route(
            "/marketing/content/{id}",
            put(handlers::marketing::update_content).delete(handlers::marketing::delete_content),
        )
        .route(
            "/marketing/events",
            post(handlers::marketing::schedule_event).get(handlers::marketing::list_events),
        )
        .route("/marketing/events/{id}", axum::routing::delete(handlers::marketing::delete_event))
        .route("/marketing/events/{id}/status", patch(handlers::marketing::update_event_status))
        .route("/marketing/geo/search", get(handlers::marketing::geo_search));

    let coupons = Router::new()
        .route(
            "/coupons",
            post(handlers::coupons::create_coupon).get(handlers::coupons::list_coupons),
        )
        .route("/coupons/generate", post(handlers::coupons::generate_coupons))
        .route("/coupons/redeem", post(handlers::coupons::redeem_coupon))
        .route("/coupons/scan", post(handlers::coupons::scan_and_redeem))
        .route("/coupons/lookup/{code}", get(handlers::coupons::lookup_coupon))
        .route(
            "/coupons/{id}",
            get(handlers::coupons::get_coupon).delete(handlers::coupons::delete_coupon),
        )
        .route("/coupons/{id}/qr", get(handlers::coupons::coupon_qr))
        .route("/coupons/{id}/voucher", get(handlers::coupons::coupon_voucher));

    let mail = Router::new()
        .route("/mail/send", post(handlers::mail::send_email))
        .route("/mail/emails", get(handlers::mail::list_emails))
        .route("/mail/accounts", get(handlers::mail::list_accounts))
        .route("/integrations/mail/oauth/start", post(handlers::mail::start_oauth));

    let dashboard = Router::new()
        .route("/dashboard/summary", get(handlers::dashboard::get_summary))
        .route(
            "/dashboard/layout",
            get(handlers::dashboard::get_layout).put(handlers::dashboard::save_layout),
        );

    Router::new()
        .merge(team)
        .merge(crm)
        .merge(projects)
        .merge(tickets)
        .merge(finance)
        .merge(articles)
        .merge(productivity)
        .merge(marketing)
        .merge(coupons)
        .merge(mail)
        .merge(dashboard)
        .route("/events", get(handlers::events::stream_events))
}

pub fn build_router(app_state: AppState) -> Router {
    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Só login, sem agência
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route("/me/tenants", get(handlers::auth::get_my_tenants))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let tenancy_routes = Router::new()
        .route("/", post(handlers::team::create_tenant))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let agency_routes = tenant_routes()
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), tenant_guard));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        // O navegador volta do provedor sem token: o `state` assinado identifica o usuário
        .route(
            "/api/integrations/mail/oauth/callback",
            get(handlers::mail::oauth_callback),
        )
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/tenants", tenancy_routes)
        .nest("/api", agency_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;
    let bind_addr = config.bind_addr.clone();
    let app_state = AppState::new(config).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let app = build_router(app_state);

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_support::lazy_state;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;
    use uuid::Uuid;

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn health_answers_ok() {
        let app = build_router(lazy_state());
        let response = app
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "OK");
    }

    #[tokio::test]
    async fn tenant_routes_reject_missing_token() {
        let app = build_router(lazy_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/coupons")
                    .header("x-tenant-id", Uuid::new_v4().to_string())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn tenant_routes_reject_missing_tenant_header() {
        let state = lazy_state();
        let token = state.auth_service.create_token(Uuid::new_v4()).unwrap();
        let app = build_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/crm/customers")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn tenant_routes_reject_malformed_tenant_header() {
        let state = lazy_state();
        let token = state.auth_service.create_token(Uuid::new_v4()).unwrap();
        let app = build_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/dashboard/summary")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .header("x-tenant-id", "not-a-uuid")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn oauth_callback_without_state_redirects_to_error() {
        let app = build_router(lazy_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/integrations/mail/oauth/callback?code=abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers()[header::LOCATION].to_str().unwrap();
        assert_eq!(location, "http://localhost:5173/settings/mail?linked=error");
    }
}
