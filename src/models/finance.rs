// src/models/finance.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    #[schema(example = "Adobe Creative Cloud")]
    pub description: String,
    #[schema(example = "software")]
    pub category: String,
    #[schema(example = "59.99")]
    pub amount: Decimal,
    #[schema(example = "EUR")]
    pub currency: String,
    pub spent_on: NaiveDate,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

// Moedas diferentes nunca são somadas juntas
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyExpenseTotal {
    #[schema(example = "2026-10")]
    pub month: String,
    #[schema(example = "EUR")]
    pub currency: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyTotal {
    #[schema(example = "EUR")]
    pub currency: String,
    pub total: Decimal,
}

pub fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("must_not_be_negative".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpensePayload {
    #[validate(length(min = 2, message = "description_too_short"))]
    pub description: String,
    #[validate(length(min = 1, message = "required"))]
    pub category: String,
    #[validate(custom(function = "validate_not_negative"))]
    pub amount: Decimal,
    #[validate(length(equal = 3, message = "invalid_currency"))]
    #[serde(default = "default_currency")]
    pub currency: String,
    pub spent_on: NaiveDate,
}

fn default_currency() -> String {
    "EUR".to_string()
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ExpenseRangeQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_amounts_are_rejected() {
        assert!(validate_not_negative(&Decimal::new(-1, 2)).is_err());
        assert!(validate_not_negative(&Decimal::ZERO).is_ok());
        assert!(validate_not_negative(&Decimal::new(5999, 2)).is_ok());
    }

    #[test]
    fn monthly_total_names_its_currency() {
        let total = MonthlyExpenseTotal {
            month: "2026-10".into(),
            currency: "USD".into(),
            total: Decimal::new(500, 2),
        };
        let json = serde_json::to_value(&total).unwrap();
        assert_eq!(json["month"], "2026-10");
        assert_eq!(json["currency"], "USD");
    }
}
