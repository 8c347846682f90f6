// src/models/articles.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::common::money::{format_eur, gross_price};
use crate::models::finance::validate_not_negative;

#[derive(Debug, Clone, FromRow)]
pub struct ArticleRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub price_net: Decimal,
    pub tax_rate: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// O que sai na API: inclui o preço bruto já calculado e formatado
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: Uuid,
    #[schema(example = "Landingpage Basic")]
    pub name: String,
    pub sku: Option<String>,
    pub description: Option<String>,
    #[schema(example = "100.00")]
    pub price_net: Decimal,
    #[schema(example = "19")]
    pub tax_rate: Decimal,
    #[schema(example = "119.00")]
    pub price_gross: Decimal,
    #[schema(example = "119,00 €")]
    pub price_gross_formatted: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Article {
    pub fn from_row(row: ArticleRow, lang: &str) -> Self {
        let price_gross = gross_price(row.price_net, row.tax_rate);
        Self {
            id: row.id,
            name: row.name,
            sku: row.sku,
            description: row.description,
            price_net: row.price_net,
            tax_rate: row.tax_rate,
            price_gross,
            price_gross_formatted: format_eur(price_gross, lang),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn validate_tax_rate(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() || *val > Decimal::ONE_HUNDRED {
        let mut err = ValidationError::new("range");
        err.message = Some("invalid_tax_rate".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePayload {
    #[validate(length(min = 2, message = "name_too_short"))]
    pub name: String,
    pub sku: Option<String>,
    pub description: Option<String>,
    #[validate(custom(function = "validate_not_negative"))]
    pub price_net: Decimal,
    #[validate(custom(function = "validate_tax_rate"))]
    pub tax_rate: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(net: i64, tax: i64) -> ArticleRow {
        ArticleRow {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            name: "Landingpage".into(),
            sku: None,
            description: None,
            price_net: Decimal::new(net, 0),
            tax_rate: Decimal::new(tax, 0),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn article_carries_gross_price_in_eur() {
        let article = Article::from_row(row(100, 19), "de");
        assert_eq!(article.price_gross, Decimal::new(11900, 2));
        assert_eq!(article.price_gross_formatted, "119,00 €");
    }

    #[test]
    fn tax_rate_must_be_a_percentage() {
        let payload = |tax: i64| ArticlePayload {
            name: "Logo".into(),
            sku: None,
            description: None,
            price_net: Decimal::new(250, 0),
            tax_rate: Decimal::new(tax, 0),
        };
        assert!(payload(7).validate().is_ok());
        assert!(payload(101).validate().is_err());
        assert!(payload(-1).validate().is_err());
    }
}
