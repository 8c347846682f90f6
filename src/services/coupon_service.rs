// src/services/coupon_service.rs

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{error::AppError, i18n::I18nStore},
    db::{
        coupon_repo::{NewCoupon, Redeemer},
        reference_repo::TenantRef,
        CouponRepository, ReferenceRepository,
    },
    models::{
        coupons::{
            extract_code_from_scan, generate_code, normalize_code, Coupon, CouponListQuery, CouponLookup,
            CreateCouponPayload, GenerateCouponsPayload, RedemptionChannel, RedemptionOutcome,
            RedemptionRejection, RedemptionResponse, ScanRedeemPayload,
        },
        events::{ChangeEvent, EntityKind},
    },
    services::events::EventBus,
};

// Tentativas por código antes de desistir do lote
const MAX_CODE_ATTEMPTS: usize = 5;

/// Converte o resultado do resgate no corpo da resposta, já traduzido.
pub fn redemption_response(outcome: RedemptionOutcome, lang: &str, i18n: &I18nStore) -> RedemptionResponse {
    match outcome {
        RedemptionOutcome::Redeemed(coupon) => RedemptionResponse {
            redeemed: true,
            outcome: "redeemed".to_string(),
            message: i18n.translate(lang, "coupon.redeemed"),
            coupon: Some(coupon),
        },
        RedemptionOutcome::Rejected(reason) => {
            let outcome = serde_json::to_value(reason)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default();
            RedemptionResponse {
                redeemed: false,
                outcome,
                message: i18n.translate(lang, reason.message_key()),
                coupon: None,
            }
        }
    }
}

#[derive(Clone)]
pub struct CouponService {
    repo: CouponRepository,
    references: ReferenceRepository,
    events: EventBus,
    pool: PgPool,
}

// A campanha de um cupom é um evento de marketing da mesma agência
fn campaign_ref(campaign_id: Option<Uuid>) -> [(&'static str, Option<TenantRef>); 1] {
    [("campaignId", campaign_id.map(TenantRef::MarketingEvent))]
}

impl CouponService {
    pub fn new(repo: CouponRepository, references: ReferenceRepository, events: EventBus, pool: PgPool) -> Self {
        Self { repo, references, events, pool }
    }

    // =========================================================================
    //  CRIAÇÃO
    // =========================================================================

    pub async fn create(&self, tenant_id: Uuid, payload: &CreateCouponPayload) -> Result<Coupon, AppError> {
        self.references.verify(tenant_id, &campaign_ref(payload.campaign_id)).await?;
        let code = normalize_code(&payload.code);
        let new = NewCoupon {
            code: &code,
            value: payload.value,
            description: payload.description.as_deref(),
            campaign_id: payload.campaign_id,
            expires_at: payload.expires_at,
        };

        let coupon = self
            .repo
            .insert_if_absent(&self.pool, tenant_id, &new)
            .await?
            .ok_or_else(|| AppError::UniqueConstraintViolation(format!("coupon code '{code}'")))?;

        tracing::info!("🎟️ Cupom '{}' criado", coupon.code);
        self.events
            .publish(ChangeEvent::created(tenant_id, EntityKind::Coupon, coupon.id));
        Ok(coupon)
    }

    /// Gera o lote inteiro numa transação: ou todos os códigos entram, ou nenhum.
    pub async fn generate(&self, tenant_id: Uuid, payload: &GenerateCouponsPayload) -> Result<Vec<Coupon>, AppError> {
        self.references.verify(tenant_id, &campaign_ref(payload.campaign_id)).await?;
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(payload.count as usize);

        for _ in 0..payload.count {
            let mut inserted = None;

            for _ in 0..MAX_CODE_ATTEMPTS {
                // O ThreadRng não pode atravessar o await
                let code = generate_code(&mut rand::thread_rng(), payload.prefix.as_deref());
                let new = NewCoupon {
                    code: &code,
                    value: payload.value,
                    description: payload.description.as_deref(),
                    campaign_id: payload.campaign_id,
                    expires_at: payload.expires_at,
                };

                inserted = self.repo.insert_if_absent(&mut *tx, tenant_id, &new).await?;
                if inserted.is_some() {
                    break;
                }
                tracing::debug!("Colisão de código '{}', gerando outro", code);
            }

            let coupon = inserted.ok_or_else(|| {
                AppError::UniqueConstraintViolation("could not generate a unique coupon code".into())
            })?;
            created.push(coupon);
        }

        tx.commit().await?;

        tracing::info!("🎟️ {} cupom(ns) gerado(s)", created.len());
        for coupon in &created {
            self.events
                .publish(ChangeEvent::created(tenant_id, EntityKind::Coupon, coupon.id));
        }
        Ok(created)
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    pub async fn lookup(&self, tenant_id: Uuid, raw_code: &str, now: DateTime<Utc>) -> Result<CouponLookup, AppError> {
        let code = normalize_code(raw_code);
        let coupon = self.repo.find_by_code(tenant_id, &code).await?;
        Ok(CouponLookup::evaluate(coupon, now))
    }

    pub async fn list(
        &self,
        tenant_id: Uuid,
        query: &CouponListQuery,
        now: DateTime<Utc>,
    ) -> Result<Vec<Coupon>, AppError> {
        let coupons = self
            .repo
            .list(tenant_id, query.status, query.campaign_id, now)
            .await?;
        Ok(coupons.into_iter().map(|c| c.as_of(now)).collect())
    }

    pub async fn get(&self, tenant_id: Uuid, id: Uuid, now: DateTime<Utc>) -> Result<Coupon, AppError> {
        self.repo
            .find_by_id(tenant_id, id)
            .await?
            .map(|c| c.as_of(now))
            .ok_or_else(|| AppError::ResourceNotFound("coupon".into()))
    }

    /// Cupom resgatado é histórico e não pode ser apagado.
    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_unredeemed(tenant_id, id).await? {
            return Err(AppError::ResourceNotFound("unredeemed coupon".into()));
        }
        self.events
            .publish(ChangeEvent::deleted(tenant_id, EntityKind::Coupon, id));
        Ok(())
    }

    // =========================================================================
    //  RESGATE
    // =========================================================================

    /// Busca travando a linha, checa o status efetivo e grava o resgate.
    /// Rejeições não são erros: voltam como `RedemptionOutcome::Rejected`.
    pub async fn redeem(
        &self,
        tenant_id: Uuid,
        raw_code: &str,
        redeemer: &Redeemer<'_>,
        now: DateTime<Utc>,
    ) -> Result<RedemptionOutcome, AppError> {
        let code = normalize_code(raw_code);
        let mut tx = self.pool.begin().await?;

        let Some(coupon) = self.repo.lock_by_code(&mut *tx, tenant_id, &code).await? else {
            tracing::warn!("⛔ Resgate recusado: código '{}' não existe", code);
            return Ok(RedemptionOutcome::Rejected(RedemptionRejection::NotFound));
        };

        if let Err(reason) = coupon.check_redeemable(now) {
            tracing::warn!("⛔ Resgate recusado para '{}': {:?}", code, reason);
            return Ok(RedemptionOutcome::Rejected(reason));
        }

        let Some(redeemed) = self
            .repo
            .mark_redeemed(&mut *tx, tenant_id, coupon.id, now, redeemer)
            .await?
        else {
            // A linha estava travada; só chega aqui se o guard do UPDATE discordar
            tracing::warn!("⛔ Resgate de '{}' não alterou nenhuma linha", code);
            return Ok(RedemptionOutcome::Rejected(RedemptionRejection::AlreadyRedeemed));
        };

        tx.commit().await?;

        tracing::info!(
            "✅ Cupom '{}' resgatado por {} via {:?}",
            redeemed.code,
            redeemer.name,
            redeemer.channel
        );
        self.events
            .publish(ChangeEvent::updated(tenant_id, EntityKind::Coupon, redeemed.id));
        Ok(RedemptionOutcome::Redeemed(redeemed))
    }

    /// Texto do QR -> código -> mesmo fluxo de resgate (canal Scan).
    pub async fn scan_and_redeem(
        &self,
        tenant_id: Uuid,
        payload: &ScanRedeemPayload,
        scanned_by: Uuid,
        now: DateTime<Utc>,
    ) -> Result<RedemptionOutcome, AppError> {
        let Some(code) = extract_code_from_scan(&payload.scanned) else {
            tracing::warn!("⛔ QR lido sem código utilizável");
            return Ok(RedemptionOutcome::Rejected(RedemptionRejection::NotFound));
        };

        let redeemer = Redeemer {
            name: payload.redeemer_name.trim(),
            contact: payload.redeemer_contact.trim(),
            channel: RedemptionChannel::Scan,
            redeemed_by: Some(scanned_by),
        };
        self.redeem(tenant_id, &code, &redeemer, now).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::coupons::CouponStatus;
    use rust_decimal::Decimal;

    fn redeemed_coupon() -> Coupon {
        Coupon {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            code: "SUMMER10".into(),
            value: Decimal::new(10, 0),
            description: None,
            campaign_id: None,
            status: CouponStatus::Redeemed,
            expires_at: None,
            redeemed_at: Some(Utc::now()),
            redeemer_name: Some("Maria".into()),
            redeemer_contact: Some("maria@example.org".into()),
            redemption_channel: Some(RedemptionChannel::Web),
            redeemed_by: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn success_response_carries_the_coupon() {
        let store = I18nStore::new();
        let response = redemption_response(RedemptionOutcome::Redeemed(redeemed_coupon()), "de", &store);

        assert!(response.redeemed);
        assert_eq!(response.outcome, "redeemed");
        assert_eq!(response.message, "Gutschein eingelöst.");
        assert_eq!(response.coupon.map(|c| c.code), Some("SUMMER10".to_string()));
    }

    #[test]
    fn rejections_are_distinguishable() {
        let store = I18nStore::new();
        let cases = [
            (RedemptionRejection::NotFound, "not_found"),
            (RedemptionRejection::AlreadyRedeemed, "already_redeemed"),
            (RedemptionRejection::Expired, "expired"),
        ];

        for (reason, expected) in cases {
            let response = redemption_response(RedemptionOutcome::Rejected(reason), "en", &store);
            assert!(!response.redeemed);
            assert_eq!(response.outcome, expected);
            assert!(response.coupon.is_none());
            assert_eq!(response.message, store.translate("en", reason.message_key()));
        }
    }

    #[test]
    fn expired_message_is_localized() {
        let store = I18nStore::new();
        let response =
            redemption_response(RedemptionOutcome::Rejected(RedemptionRejection::Expired), "pt", &store);
        assert_eq!(response.message, "Este cupom expirou.");
    }

    // --- Com banco ---

    fn db_service(pool: &PgPool) -> CouponService {
        CouponService::new(
            CouponRepository::new(pool.clone()),
            ReferenceRepository::new(pool.clone()),
            EventBus::default(),
            pool.clone(),
        )
    }

    async fn seed_tenant(pool: &PgPool) -> Uuid {
        sqlx::query_scalar("INSERT INTO tenants (name) VALUES ('Agentur') RETURNING id")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    fn new_coupon(code: &str, campaign_id: Option<Uuid>) -> CreateCouponPayload {
        CreateCouponPayload {
            code: code.into(),
            value: Decimal::new(1000, 2),
            description: None,
            campaign_id,
            expires_at: None,
        }
    }

    fn at_counter(name: &str) -> Redeemer<'_> {
        Redeemer {
            name,
            contact: "kasse@laden.de",
            channel: RedemptionChannel::Web,
            redeemed_by: None,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "precisa de Postgres (DATABASE_URL)"]
    async fn second_redeem_is_rejected_and_keeps_first_redeemer(pool: PgPool) {
        let tenant = seed_tenant(&pool).await;
        let svc = db_service(&pool);
        svc.create(tenant, &new_coupon("summer10", None)).await.unwrap();

        let first = svc.redeem(tenant, " summer10 ", &at_counter("Maria"), Utc::now()).await.unwrap();
        assert!(matches!(first, RedemptionOutcome::Redeemed(ref c) if c.status == CouponStatus::Redeemed));

        let second = svc.redeem(tenant, "SUMMER10", &at_counter("Jonas"), Utc::now()).await.unwrap();
        assert_eq!(second, RedemptionOutcome::Rejected(RedemptionRejection::AlreadyRedeemed));

        let lookup = svc.lookup(tenant, "SUMMER10", Utc::now()).await.unwrap();
        let stored = lookup.coupon.unwrap();
        assert_eq!(stored.redeemer_name.as_deref(), Some("Maria"));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "precisa de Postgres (DATABASE_URL)"]
    async fn concurrent_redeems_let_exactly_one_through(pool: PgPool) {
        let tenant = seed_tenant(&pool).await;
        let svc = db_service(&pool);
        svc.create(tenant, &new_coupon("RACE2026", None)).await.unwrap();

        let now = Utc::now();
        let (maria, jonas) = (at_counter("Maria"), at_counter("Jonas"));
        let (a, b) = tokio::join!(
            svc.redeem(tenant, "RACE2026", &maria, now),
            svc.redeem(tenant, "RACE2026", &jonas, now),
        );
        let outcomes = [a.unwrap(), b.unwrap()];

        let redeemed = outcomes
            .iter()
            .filter(|o| matches!(o, RedemptionOutcome::Redeemed(_)))
            .count();
        assert_eq!(redeemed, 1);
        assert!(outcomes.contains(&RedemptionOutcome::Rejected(RedemptionRejection::AlreadyRedeemed)));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "precisa de Postgres (DATABASE_URL)"]
    async fn campaign_of_another_agency_is_refused(pool: PgPool) {
        let mine = seed_tenant(&pool).await;
        let theirs = seed_tenant(&pool).await;
        let foreign_campaign: Uuid = sqlx::query_scalar(
            "INSERT INTO marketing_events (tenant_id, title, channel, starts_at) VALUES ($1, 'Herbst', 'SOCIAL', NOW()) RETURNING id",
        )
        .bind(theirs)
        .fetch_one(&pool)
        .await
        .unwrap();

        let err = db_service(&pool)
            .create(mine, &new_coupon("HERBST1", Some(foreign_campaign)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::FieldErrors(ref f) if f["campaignId"] == "not_found_in_tenant"));
    }
}
