// src/db/coupon_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::coupons::{Coupon, CouponStatus, RedemptionChannel},
};

const COUPON_COLUMNS: &str = "id, tenant_id, code, value, description, campaign_id, status, expires_at, \
     redeemed_at, redeemer_name, redeemer_contact, redemption_channel, redeemed_by, created_at";

// Dados comuns de um novo cupom
pub struct NewCoupon<'a> {
    pub code: &'a str,
    pub value: Decimal,
    pub description: Option<&'a str>,
    pub campaign_id: Option<Uuid>,
    pub expires_at: Option<DateTime<Utc>>,
}

pub struct Redeemer<'a> {
    pub name: &'a str,
    pub contact: &'a str,
    pub channel: RedemptionChannel,
    pub redeemed_by: Option<Uuid>,
}

#[derive(Clone)]
pub struct CouponRepository {
    pool: PgPool,
}

impl CouponRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// None = o código já existe nesta agência.
    #[tracing::instrument(name = "Insert coupon", skip(self, executor, coupon), fields(code = coupon.code))]
    pub async fn insert_if_absent<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        coupon: &NewCoupon<'_>,
    ) -> Result<Option<Coupon>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO coupons (tenant_id, code, value, description, campaign_id, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (tenant_id, code) DO NOTHING
             RETURNING {COUPON_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Coupon>(&sql)
            .bind(tenant_id)
            .bind(coupon.code)
            .bind(coupon.value)
            .bind(coupon.description)
            .bind(coupon.campaign_id)
            .bind(coupon.expires_at)
            .fetch_optional(executor)
            .await?;
        Ok(inserted)
    }

    pub async fn find_by_code(&self, tenant_id: Uuid, code: &str) -> Result<Option<Coupon>, AppError> {
        let sql = format!("SELECT {COUPON_COLUMNS} FROM coupons WHERE tenant_id = $1 AND code = $2");
        let coupon = sqlx::query_as::<_, Coupon>(&sql)
            .bind(tenant_id)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(coupon)
    }

    pub async fn find_by_id(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Coupon>, AppError> {
        let sql = format!("SELECT {COUPON_COLUMNS} FROM coupons WHERE tenant_id = $1 AND id = $2");
        let coupon = sqlx::query_as::<_, Coupon>(&sql)
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(coupon)
    }

    /// Lê o cupom travando a linha até o fim da transação.
    pub async fn lock_by_code<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        code: &str,
    ) -> Result<Option<Coupon>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {COUPON_COLUMNS} FROM coupons
             WHERE tenant_id = $1 AND code = $2
             FOR UPDATE"
        );
        let coupon = sqlx::query_as::<_, Coupon>(&sql)
            .bind(tenant_id)
            .bind(code)
            .fetch_optional(executor)
            .await?;
        Ok(coupon)
    }

    /// ACTIVE -> REDEEMED. O WHERE repete a checagem: sem linha = nada mudou.
    pub async fn mark_redeemed<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        coupon_id: Uuid,
        now: DateTime<Utc>,
        redeemer: &Redeemer<'_>,
    ) -> Result<Option<Coupon>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE coupons
             SET status = 'REDEEMED', redeemed_at = $3, redeemer_name = $4,
                 redeemer_contact = $5, redemption_channel = $6, redeemed_by = $7
             WHERE tenant_id = $1 AND id = $2
               AND status = 'ACTIVE'
               AND (expires_at IS NULL OR expires_at > $3)
             RETURNING {COUPON_COLUMNS}"
        );
        let coupon = sqlx::query_as::<_, Coupon>(&sql)
            .bind(tenant_id)
            .bind(coupon_id)
            .bind(now)
            .bind(redeemer.name)
            .bind(redeemer.contact)
            .bind(redeemer.channel)
            .bind(redeemer.redeemed_by)
            .fetch_optional(executor)
            .await?;
        Ok(coupon)
    }

    /// Filtra pelo status EFETIVO (ACTIVE vencido conta como EXPIRED).
    pub async fn list(
        &self,
        tenant_id: Uuid,
        status: Option<CouponStatus>,
        campaign_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Coupon>, AppError> {
        let sql = format!(
            "SELECT {COUPON_COLUMNS} FROM coupons
             WHERE tenant_id = $1
               AND ($3::uuid IS NULL OR campaign_id = $3)
               AND (
                   $2::coupon_status IS NULL
                   OR ($2 = 'REDEEMED' AND status = 'REDEEMED')
                   OR ($2 = 'ACTIVE' AND status = 'ACTIVE' AND (expires_at IS NULL OR expires_at > $4))
                   OR ($2 = 'EXPIRED' AND (status = 'EXPIRED' OR (status = 'ACTIVE' AND expires_at <= $4)))
               )
             ORDER BY created_at DESC, code ASC"
        );
        let coupons = sqlx::query_as::<_, Coupon>(&sql)
            .bind(tenant_id)
            .bind(status)
            .bind(campaign_id)
            .bind(now)
            .fetch_all(&self.pool)
            .await?;
        Ok(coupons)
    }

    pub async fn delete_unredeemed(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "DELETE FROM coupons WHERE tenant_id = $1 AND id = $2 AND status <> 'REDEEMED'",
        )
        .bind(tenant_id)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
