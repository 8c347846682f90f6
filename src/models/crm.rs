// src/models/crm.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "customer_plan", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerPlan {
    Basic,
    Standard,
    Premium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "service_frequency", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceFrequency {
    Once,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl ServiceFrequency {
    /// Próxima data depois de `from`. `Once` não se repete (None).
    pub fn advance(&self, from: NaiveDate) -> Option<NaiveDate> {
        match self {
            ServiceFrequency::Once => None,
            ServiceFrequency::Weekly => from.checked_add_days(chrono::Days::new(7)),
            ServiceFrequency::Monthly => from.checked_add_months(Months::new(1)),
            ServiceFrequency::Quarterly => from.checked_add_months(Months::new(3)),
            ServiceFrequency::Yearly => from.checked_add_months(Months::new(12)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "service_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceStatus {
    Active,
    Paused,
    Completed,
    Cancelled,
}

// --- MODELO DE PLANO (O Molde) ---

/// Um serviço que o plano provisiona automaticamente.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanServiceTemplate {
    pub key: &'static str, // chave do contador de uso
    pub name: &'static str,
    pub frequency: ServiceFrequency,
}

const BASIC_SERVICES: &[PlanServiceTemplate] = &[
    PlanServiceTemplate { key: "website_maintenance", name: "Website-Wartung", frequency: ServiceFrequency::Monthly },
    PlanServiceTemplate { key: "social_media_post", name: "Social-Media-Beitrag", frequency: ServiceFrequency::Weekly },
];

const STANDARD_SERVICES: &[PlanServiceTemplate] = &[
    PlanServiceTemplate { key: "website_maintenance", name: "Website-Wartung", frequency: ServiceFrequency::Monthly },
    PlanServiceTemplate { key: "social_media_post", name: "Social-Media-Beitrag", frequency: ServiceFrequency::Weekly },
    PlanServiceTemplate { key: "seo_report", name: "SEO-Report", frequency: ServiceFrequency::Monthly },
    PlanServiceTemplate { key: "newsletter", name: "Newsletter", frequency: ServiceFrequency::Monthly },
];

const PREMIUM_SERVICES: &[PlanServiceTemplate] = &[
    PlanServiceTemplate { key: "website_maintenance", name: "Website-Wartung", frequency: ServiceFrequency::Monthly },
    PlanServiceTemplate { key: "social_media_post", name: "Social-Media-Beitrag", frequency: ServiceFrequency::Weekly },
    PlanServiceTemplate { key: "seo_report", name: "SEO-Report", frequency: ServiceFrequency::Monthly },
    PlanServiceTemplate { key: "newsletter", name: "Newsletter", frequency: ServiceFrequency::Monthly },
    PlanServiceTemplate { key: "strategy_workshop", name: "Strategie-Workshop", frequency: ServiceFrequency::Quarterly },
    PlanServiceTemplate { key: "annual_planning", name: "Jahresplanung", frequency: ServiceFrequency::Yearly },
    PlanServiceTemplate { key: "photo_shoot", name: "Fotoshooting", frequency: ServiceFrequency::Once },
];

impl CustomerPlan {
    pub fn template(&self) -> &'static [PlanServiceTemplate] {
        match self {
            CustomerPlan::Basic => BASIC_SERVICES,
            CustomerPlan::Standard => STANDARD_SERVICES,
            CustomerPlan::Premium => PREMIUM_SERVICES,
        }
    }

    /// Contadores de uso zerados, um por serviço do plano.
    pub fn initial_usage(&self) -> BTreeMap<String, i64> {
        self.template()
            .iter()
            .map(|t| (t.key.to_string(), 0))
            .collect()
    }
}

// --- CLIENTE ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    #[schema(example = "Bäckerei Schulz")]
    pub name: String,
    #[schema(example = "info@baeckerei-schulz.de")]
    pub contact_email: String,
    pub phone: Option<String>,
    pub plan: CustomerPlan,
    // { "seo_report": 3, "newsletter": 1 }
    #[schema(value_type = Object, example = json!({"seo_report": 3}))]
    pub usage: Json<BTreeMap<String, i64>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerService {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub customer_id: Uuid,
    #[schema(example = "seo_report")]
    pub service_key: String,
    #[schema(example = "SEO-Report")]
    pub name: String,
    pub status: ServiceStatus,
    pub frequency: ServiceFrequency,
    pub next_due_date: Option<NaiveDate>,
    pub last_completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetail {
    #[serde(flatten)]
    pub customer: Customer,
    pub services: Vec<CustomerService>,
}

// --- PROSPECTS (Geomarketing / Importação) ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Prospect {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    #[schema(example = "Café Hafenblick")]
    pub name: String,
    #[schema(example = "Hafenstraße 4, 24103 Kiel")]
    pub address: String,
    #[schema(example = "gastronomy")]
    pub category: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerPayload {
    #[validate(length(min = 2, message = "name_too_short"))]
    #[schema(example = "Bäckerei Schulz")]
    pub name: String,

    #[validate(email(message = "invalid_email"))]
    #[schema(example = "info@baeckerei-schulz.de")]
    pub contact_email: String,

    pub phone: Option<String>,

    #[schema(example = "STANDARD")]
    pub plan: CustomerPlan,

    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomerPayload {
    #[validate(length(min = 2, message = "name_too_short"))]
    pub name: String,
    #[validate(email(message = "invalid_email"))]
    pub contact_email: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceStatusPayload {
    pub status: ServiceStatus,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProspectInput {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    #[validate(length(min = 1, message = "required"))]
    pub address: String,
    pub category: Option<String>,
    #[validate(range(min = -90.0, max = 90.0, message = "invalid_latitude"))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "invalid_longitude"))]
    pub longitude: f64,
    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportProspectsPayload {
    #[validate(length(min = 1, max = 5000, message = "invalid_batch_size"), nested)]
    pub prospects: Vec<ProspectInput>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CustomerListQuery {
    // Busca parcial em nome ou e-mail
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ServicesDueQuery {
    // Inclusive; padrão = hoje
    pub until: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub imported: u64,
    pub skipped: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn higher_plans_include_lower_plan_services() {
        let keys = |p: CustomerPlan| p.template().iter().map(|t| t.key).collect::<Vec<_>>();
        for key in keys(CustomerPlan::Basic) {
            assert!(keys(CustomerPlan::Standard).contains(&key));
        }
        for key in keys(CustomerPlan::Standard) {
            assert!(keys(CustomerPlan::Premium).contains(&key));
        }
    }

    #[test]
    fn initial_usage_is_zero_for_every_service() {
        let usage = CustomerPlan::Premium.initial_usage();
        assert_eq!(usage.len(), CustomerPlan::Premium.template().len());
        assert!(usage.values().all(|v| *v == 0));
    }

    #[test]
    fn frequencies_advance_calendar_aware() {
        assert_eq!(ServiceFrequency::Weekly.advance(date(2026, 1, 28)), Some(date(2026, 2, 4)));
        // 31 de janeiro + 1 mês => último dia de fevereiro
        assert_eq!(ServiceFrequency::Monthly.advance(date(2026, 1, 31)), Some(date(2026, 2, 28)));
        assert_eq!(ServiceFrequency::Quarterly.advance(date(2026, 11, 15)), Some(date(2027, 2, 15)));
        assert_eq!(ServiceFrequency::Yearly.advance(date(2028, 2, 29)), Some(date(2029, 2, 28)));
        assert_eq!(ServiceFrequency::Once.advance(date(2026, 1, 1)), None);
    }
}
