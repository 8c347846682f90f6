pub mod auth;
pub mod team;
pub mod crm;
pub mod projects;
pub mod tickets;
pub mod finance;
pub mod articles;
pub mod productivity;
pub mod marketing;
pub mod coupons;
pub mod mail;
pub mod dashboard;
pub mod events;
