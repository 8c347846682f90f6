// src/models/coupons.rs

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::finance::validate_not_negative;

// --- ESTADOS ---
// ACTIVE -> REDEEMED (terminal)
// ACTIVE -> EXPIRED  (derivado: expires_at <= agora, sem transição gravada)

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "coupon_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CouponStatus {
    Active,
    Redeemed,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "redemption_channel", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RedemptionChannel {
    // Cliente digitou o código na landing page
    Web,
    // Admin escaneou o QR na loja
    Scan,
    Phone,
    Email,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    #[schema(example = "SUMMER10")]
    pub code: String,
    #[schema(example = "10.00")]
    pub value: Decimal,
    pub description: Option<String>,
    pub campaign_id: Option<Uuid>,
    pub status: CouponStatus,
    pub expires_at: Option<DateTime<Utc>>,
    pub redeemed_at: Option<DateTime<Utc>>,
    pub redeemer_name: Option<String>,
    pub redeemer_contact: Option<String>,
    pub redemption_channel: Option<RedemptionChannel>,
    pub redeemed_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Coupon {
    /// O status gravado só muda no resgate; a expiração é calculada na leitura.
    pub fn effective_status(&self, now: DateTime<Utc>) -> CouponStatus {
        match self.status {
            CouponStatus::Active if self.expires_at.is_some_and(|exp| exp <= now) => {
                CouponStatus::Expired
            }
            status => status,
        }
    }

    /// Pode ser resgatado agora? Err com o motivo, nunca um erro genérico.
    pub fn check_redeemable(&self, now: DateTime<Utc>) -> Result<(), RedemptionRejection> {
        match self.effective_status(now) {
            CouponStatus::Active => Ok(()),
            CouponStatus::Redeemed => Err(RedemptionRejection::AlreadyRedeemed),
            CouponStatus::Expired => Err(RedemptionRejection::Expired),
        }
    }

    /// Cópia com o status efetivo, para respostas de leitura.
    pub fn as_of(mut self, now: DateTime<Utc>) -> Self {
        self.status = self.effective_status(now);
        self
    }
}

// --- RESULTADO DO RESGATE ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RedemptionRejection {
    NotFound,
    AlreadyRedeemed,
    Expired,
}

impl RedemptionRejection {
    pub fn message_key(&self) -> &'static str {
        match self {
            RedemptionRejection::NotFound => "coupon.not_found",
            RedemptionRejection::AlreadyRedeemed => "coupon.already_redeemed",
            RedemptionRejection::Expired => "coupon.expired",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RedemptionOutcome {
    Redeemed(Coupon),
    Rejected(RedemptionRejection),
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionResponse {
    pub redeemed: bool,
    // "redeemed" | "not_found" | "already_redeemed" | "expired"
    #[schema(example = "redeemed")]
    pub outcome: String,
    #[schema(example = "Coupon redeemed.")]
    pub message: String,
    pub coupon: Option<Coupon>,
}

// Resultado da busca: "não existe" é diferente de "existe mas não resgatável"
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CouponLookup {
    pub found: bool,
    pub redeemable: bool,
    pub reason: Option<RedemptionRejection>,
    pub coupon: Option<Coupon>,
}

impl CouponLookup {
    pub fn evaluate(coupon: Option<Coupon>, now: DateTime<Utc>) -> Self {
        match coupon {
            None => Self {
                found: false,
                redeemable: false,
                reason: Some(RedemptionRejection::NotFound),
                coupon: None,
            },
            Some(c) => {
                let reason = c.check_redeemable(now).err();
                Self {
                    found: true,
                    redeemable: reason.is_none(),
                    reason,
                    coupon: Some(c.as_of(now)),
                }
            }
        }
    }
}

// --- CÓDIGOS ---

// Sem 0/O, 1/I/L: o código é lido em voz alta e digitado à mão
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
pub const CODE_RANDOM_LEN: usize = 8;

pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// `PREFIX-XXXXXXXX` (ou só `XXXXXXXX` sem prefixo).
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R, prefix: Option<&str>) -> String {
    let random: String = (0..CODE_RANDOM_LEN)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect();

    match prefix.map(normalize_code).filter(|p| !p.is_empty()) {
        Some(p) => format!("{p}-{random}"),
        None => random,
    }
}

/// O QR pode conter o código puro ou uma URL com `?code=...`.
pub fn extract_code_from_scan(payload: &str) -> Option<String> {
    let trimmed = payload.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(parsed) = url::Url::parse(trimmed) {
        if parsed.has_host() {
            return parsed
                .query_pairs()
                .find(|(key, _)| key == "code")
                .map(|(_, value)| normalize_code(&value))
                .filter(|code| !code.is_empty());
        }
    }

    Some(normalize_code(trimmed))
}

// O prefixo entra no código antes do '-': só ASCII, para o código gerado continuar válido
fn validate_code_prefix(prefix: &str) -> Result<(), ValidationError> {
    if prefix.trim().chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        let mut err = ValidationError::new("prefix");
        err.message = Some("invalid_prefix".into());
        Err(err)
    }
}

fn validate_code_format(code: &str) -> Result<(), ValidationError> {
    let ok = code.len() >= 4
        && code.len() <= 40
        && code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        let mut err = ValidationError::new("code");
        err.message = Some("invalid_coupon_code".into());
        Err(err)
    }
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCouponPayload {
    #[validate(custom(function = "validate_code_format"))]
    #[schema(example = "SUMMER10")]
    pub code: String,
    #[validate(custom(function = "validate_not_negative"))]
    pub value: Decimal,
    pub description: Option<String>,
    pub campaign_id: Option<Uuid>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCouponsPayload {
    #[validate(range(min = 1, max = 1000, message = "invalid_count"))]
    #[schema(example = 50)]
    pub count: u32,
    #[validate(length(max = 12, message = "prefix_too_long"), custom(function = "validate_code_prefix"))]
    #[schema(example = "HERBST")]
    pub prefix: Option<String>,
    #[validate(custom(function = "validate_not_negative"))]
    pub value: Decimal,
    pub description: Option<String>,
    pub campaign_id: Option<Uuid>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RedeemCouponPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "SUMMER10")]
    pub code: String,
    #[validate(length(min = 2, message = "name_too_short"))]
    #[schema(example = "Maria Schulz")]
    pub redeemer_name: String,
    #[validate(length(min = 3, message = "required"))]
    #[schema(example = "maria@example.org")]
    pub redeemer_contact: String,
    pub channel: RedemptionChannel,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScanRedeemPayload {
    // Texto bruto decodificado do QR
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "https://agentur.de/redeem?code=SUMMER10")]
    pub scanned: String,
    #[validate(length(min = 2, message = "name_too_short"))]
    pub redeemer_name: String,
    #[validate(length(min = 3, message = "required"))]
    pub redeemer_contact: String,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CouponListQuery {
    pub status: Option<CouponStatus>,
    pub campaign_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rand::{rngs::StdRng, SeedableRng};

    fn coupon(status: CouponStatus, expires_at: Option<DateTime<Utc>>) -> Coupon {
        Coupon {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            code: "SUMMER10".into(),
            value: Decimal::new(10, 0),
            description: None,
            campaign_id: None,
            status,
            expires_at,
            redeemed_at: None,
            redeemer_name: None,
            redeemer_contact: None,
            redemption_channel: None,
            redeemed_by: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn unknown_code_is_not_found() {
        let lookup = CouponLookup::evaluate(None, Utc::now());
        assert!(!lookup.found);
        assert_eq!(lookup.reason, Some(RedemptionRejection::NotFound));
    }

    #[test]
    fn active_without_expiry_is_redeemable() {
        let c = coupon(CouponStatus::Active, None);
        assert_eq!(c.check_redeemable(Utc::now()), Ok(()));
        let lookup = CouponLookup::evaluate(Some(c), Utc::now());
        assert!(lookup.found && lookup.redeemable);
    }

    #[test]
    fn redeemed_is_absorbing() {
        let c = coupon(CouponStatus::Redeemed, Some(Utc::now() - Duration::days(3)));
        // Mesmo vencido, continua REDEEMED
        assert_eq!(c.effective_status(Utc::now()), CouponStatus::Redeemed);
        assert_eq!(c.check_redeemable(Utc::now()), Err(RedemptionRejection::AlreadyRedeemed));
    }

    #[test]
    fn active_past_expiry_is_treated_as_expired() {
        let now = Utc::now();
        let c = coupon(CouponStatus::Active, Some(now - Duration::days(1)));

        assert_eq!(c.status, CouponStatus::Active);
        assert_eq!(c.effective_status(now), CouponStatus::Expired);
        assert_eq!(c.check_redeemable(now), Err(RedemptionRejection::Expired));

        let lookup = CouponLookup::evaluate(Some(c), now);
        assert!(lookup.found);
        assert!(!lookup.redeemable);
        assert_eq!(lookup.coupon.unwrap().status, CouponStatus::Expired);
    }

    #[test]
    fn expiry_instant_itself_is_expired() {
        let now = Utc::now();
        let c = coupon(CouponStatus::Active, Some(now));
        assert_eq!(c.check_redeemable(now), Err(RedemptionRejection::Expired));
        let future = coupon(CouponStatus::Active, Some(now + Duration::seconds(1)));
        assert_eq!(future.check_redeemable(now), Ok(()));
    }

    #[test]
    fn generated_codes_use_prefix_and_safe_alphabet() {
        let mut rng = StdRng::seed_from_u64(7);
        let code = generate_code(&mut rng, Some(" herbst "));
        let (prefix, random) = code.split_once('-').unwrap();

        assert_eq!(prefix, "HERBST");
        assert_eq!(random.len(), CODE_RANDOM_LEN);
        assert!(random.bytes().all(|b| CODE_ALPHABET.contains(&b)));
        assert!(!generate_code(&mut rng, None).contains('-'));
    }

    fn generate_payload(prefix: &str) -> GenerateCouponsPayload {
        GenerateCouponsPayload {
            count: 3,
            prefix: Some(prefix.into()),
            value: Decimal::new(1000, 2),
            description: None,
            campaign_id: None,
            expires_at: None,
        }
    }

    #[test]
    fn prefix_with_spaces_or_symbols_is_rejected() {
        for bad in ["Herbst 25!", "HERBST-25", "straße"] {
            let errors = generate_payload(bad).validate().unwrap_err();
            assert!(errors.field_errors().contains_key("prefix"), "{bad} deveria ser rejeitado");
        }
        assert!(generate_payload(" herbst_25 ").validate().is_ok());
    }

    #[test]
    fn accepted_prefixes_produce_valid_codes() {
        let mut rng = StdRng::seed_from_u64(11);
        for prefix in ["herbst_25", "X", "SOMMER2026AB"] {
            assert!(generate_payload(prefix).validate().is_ok());
            let code = generate_code(&mut rng, Some(prefix));
            assert!(validate_code_format(&code).is_ok(), "{code} deveria ser válido");
        }
    }

    #[test]
    fn scan_accepts_bare_codes_and_urls() {
        assert_eq!(extract_code_from_scan(" summer10 "), Some("SUMMER10".into()));
        assert_eq!(
            extract_code_from_scan("https://agentur.de/redeem?utm=qr&code=summer10"),
            Some("SUMMER10".into())
        );
        assert_eq!(extract_code_from_scan("https://agentur.de/redeem?utm=qr"), None);
        assert_eq!(extract_code_from_scan("   "), None);
    }

    #[test]
    fn code_format_is_checked() {
        assert!(validate_code_format("SUMMER10").is_ok());
        assert!(validate_code_format("HERBST-AB12CD34").is_ok());
        assert!(validate_code_format("ab").is_err());
        assert!(validate_code_format("SUMMER 10").is_err());
    }
}
