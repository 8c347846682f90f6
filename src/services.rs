pub mod auth;
pub mod events;
pub mod team_service;
pub mod crm_service;
pub mod project_service;
pub mod ticket_service;
pub mod finance_service;
pub mod article_service;
pub mod productivity_service;
pub mod marketing_service;
pub mod coupon_service;
pub mod document_service;
pub mod mail_service;
pub mod dashboard_service;
