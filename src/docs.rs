// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth / Users ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,
        handlers::auth::get_my_tenants,

        // --- Team ---
        handlers::team::create_tenant,
        handlers::team::get_my_membership,
        handlers::team::list_members,
        handlers::team::add_member,
        handlers::team::update_permissions,
        handlers::team::deactivate_member,

        // --- CRM ---
        handlers::crm::create_customer,
        handlers::crm::list_customers,
        handlers::crm::get_customer,
        handlers::crm::update_customer,
        handlers::crm::delete_customer,
        handlers::crm::update_service_status,
        handlers::crm::complete_service,
        handlers::crm::services_due,
        handlers::crm::import_prospects,

        // --- Projects ---
        handlers::projects::create_project,
        handlers::projects::list_projects,
        handlers::projects::get_project,
        handlers::projects::update_project,
        handlers::projects::delete_project,
        handlers::projects::get_timeline,
        handlers::projects::create_task,
        handlers::projects::list_tasks,
        handlers::projects::update_task,
        handlers::projects::update_task_status,
        handlers::projects::delete_task,

        // --- Tickets ---
        handlers::tickets::create_ticket,
        handlers::tickets::list_tickets,
        handlers::tickets::get_ticket,
        handlers::tickets::update_ticket,
        handlers::tickets::update_ticket_status,
        handlers::tickets::delete_ticket,

        // --- Finance ---
        handlers::finance::create_expense,
        handlers::finance::list_expenses,
        handlers::finance::update_expense,
        handlers::finance::delete_expense,
        handlers::finance::monthly_totals,

        // --- Articles ---
        handlers::articles::create_article,
        handlers::articles::list_articles,
        handlers::articles::get_article,
        handlers::articles::update_article,
        handlers::articles::delete_article,

        // --- Productivity ---
        handlers::productivity::create_todo,
        handlers::productivity::list_todos,
        handlers::productivity::update_todo,
        handlers::productivity::toggle_todo,
        handlers::productivity::delete_todo,
        handlers::productivity::create_connection,
        handlers::productivity::list_connections,
        handlers::productivity::update_connection,
        handlers::productivity::delete_connection,

        // --- Marketing ---
        handlers::marketing::create_content,
        handlers::marketing::list_content,
        handlers::marketing::update_content,
        handlers::marketing::delete_content,
        handlers::marketing::take_next_content,
        handlers::marketing::schedule_event,
        handlers::marketing::list_events,
        handlers::marketing::update_event_status,
        handlers::marketing::delete_event,
        handlers::marketing::geo_search,

        // --- Coupons ---
        handlers::coupons::create_coupon,
        handlers::coupons::generate_coupons,
        handlers::coupons::list_coupons,
        handlers::coupons::get_coupon,
        handlers::coupons::delete_coupon,
        handlers::coupons::lookup_coupon,
        handlers::coupons::redeem_coupon,
        handlers::coupons::scan_and_redeem,
        handlers::coupons::coupon_qr,
        handlers::coupons::coupon_voucher,

        // --- Mail ---
        handlers::mail::send_email,
        handlers::mail::list_emails,
        handlers::mail::list_accounts,
        handlers::mail::start_oauth,
        handlers::mail::oauth_callback,

        // --- Dashboard ---
        handlers::dashboard::get_summary,
        handlers::dashboard::get_layout,
        handlers::dashboard::save_layout,

        // --- Events ---
        handlers::events::stream_events,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::UserTenant,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Team ---
            models::team::AppModule,
            models::team::MemberRole,
            models::team::Department,
            models::team::Tenant,
            models::team::TeamMember,
            models::team::CreateTenantPayload,
            models::team::AddMemberPayload,
            models::team::UpdatePermissionsPayload,

            // --- CRM ---
            models::crm::CustomerPlan,
            models::crm::ServiceFrequency,
            models::crm::ServiceStatus,
            models::crm::Customer,
            models::crm::CustomerService,
            models::crm::CustomerDetail,
            models::crm::Prospect,
            models::crm::CreateCustomerPayload,
            models::crm::UpdateCustomerPayload,
            models::crm::UpdateServiceStatusPayload,
            models::crm::ProspectInput,
            models::crm::ImportProspectsPayload,
            models::crm::ImportSummary,

            // --- Projects ---
            models::projects::ProjectStatus,
            models::projects::TaskStatus,
            models::projects::Project,
            models::projects::Task,
            models::projects::ProjectPayload,
            models::projects::TaskPayload,
            models::projects::UpdateTaskStatusPayload,
            models::projects::TimelineBar,
            models::projects::ProjectTimeline,

            // --- Tickets ---
            models::tickets::TicketPriority,
            models::tickets::TicketStatus,
            models::tickets::Ticket,
            models::tickets::TicketPayload,
            models::tickets::UpdateTicketStatusPayload,

            // --- Finance ---
            models::finance::Expense,
            models::finance::MonthlyExpenseTotal,
            models::finance::CurrencyTotal,
            models::finance::ExpensePayload,

            // --- Articles ---
            models::articles::Article,
            models::articles::ArticlePayload,

            // --- Productivity ---
            models::productivity::TodoPriority,
            models::productivity::Todo,
            models::productivity::TodoPayload,
            models::productivity::Connection,
            models::productivity::ConnectionPayload,

            // --- Marketing ---
            models::marketing::MarketingChannel,
            models::marketing::EventStatus,
            models::marketing::ContentItem,
            models::marketing::ContentItemPayload,
            models::marketing::MarketingEvent,
            models::marketing::ScheduleEventPayload,
            models::marketing::UpdateEventStatusPayload,
            models::marketing::GeoHit,

            // --- Coupons ---
            models::coupons::CouponStatus,
            models::coupons::RedemptionChannel,
            models::coupons::Coupon,
            models::coupons::RedemptionRejection,
            models::coupons::RedemptionResponse,
            models::coupons::CouponLookup,
            models::coupons::CreateCouponPayload,
            models::coupons::GenerateCouponsPayload,
            models::coupons::RedeemCouponPayload,
            models::coupons::ScanRedeemPayload,

            // --- Mail ---
            models::mail::EmailStatus,
            models::mail::MailProvider,
            models::mail::Email,
            models::mail::ComposeEmailPayload,
            models::mail::LinkedMailAccount,
            models::mail::OAuthStartPayload,
            models::mail::OAuthStartResponse,

            // --- Dashboard ---
            models::dashboard::WidgetPlacement,
            models::dashboard::DashboardLayout,
            models::dashboard::SaveLayoutPayload,
            models::dashboard::DashboardSummary,

            // --- Events ---
            models::events::EntityKind,
            models::events::ChangeAction,
            models::events::ChangeEvent,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação, registro e dados do usuário"),
        (name = "Team", description = "Agências, membros e permissões por módulo"),
        (name = "CRM", description = "Clientes, planos, serviços recorrentes e prospects"),
        (name = "Projects", description = "Projetos, tarefas e linha do tempo"),
        (name = "Tickets", description = "Chamados de suporte"),
        (name = "Finance", description = "Despesas e totais mensais"),
        (name = "Articles", description = "Catálogo de artigos com preço bruto"),
        (name = "Productivity", description = "Todos pessoais e contatos de negócio"),
        (name = "Marketing", description = "Pool de conteúdo, calendário e geomarketing"),
        (name = "Coupons", description = "Cupons, resgate, QR e vouchers"),
        (name = "Mail", description = "Envio por departamento e vínculo de contas"),
        (name = "Dashboard", description = "Indicadores e layout de widgets"),
        (name = "Events", description = "Atualizações ao vivo (SSE)")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_coupon_redemption_and_jwt_scheme() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/coupons/redeem"));
        assert!(doc.paths.paths.contains_key("/api/integrations/mail/oauth/callback"));

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("api_jwt"));
    }
}
