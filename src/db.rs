pub mod user_repo;
pub use user_repo::UserRepository;
pub mod team_repo;
pub use team_repo::TeamRepository;
pub mod crm_repo;
pub use crm_repo::CrmRepository;
pub mod project_repo;
pub use project_repo::ProjectRepository;
pub mod ticket_repo;
pub use ticket_repo::TicketRepository;
pub mod finance_repo;
pub use finance_repo::FinanceRepository;
pub mod article_repo;
pub use article_repo::ArticleRepository;
pub mod productivity_repo;
pub use productivity_repo::ProductivityRepository;
pub mod marketing_repo;
pub use marketing_repo::MarketingRepository;
pub mod coupon_repo;
pub use coupon_repo::CouponRepository;
pub mod mail_repo;
pub use mail_repo::MailRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
pub mod reference_repo;
pub use reference_repo::ReferenceRepository;
