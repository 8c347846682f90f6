// src/db/reference_repo.rs

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;

/// Ids vindos do payload que apontam para outra tabela da mesma agência.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantRef {
    Customer(Uuid),
    // Responsável: usuário com vínculo ativo na agência
    ActiveMember(Uuid),
    MarketingEvent(Uuid),
    ContentItem(Uuid),
}

impl TenantRef {
    fn id(&self) -> Uuid {
        match self {
            TenantRef::Customer(id)
            | TenantRef::ActiveMember(id)
            | TenantRef::MarketingEvent(id)
            | TenantRef::ContentItem(id) => *id,
        }
    }

    // $1 = tenant_id, $2 = id
    fn exists_sql(&self) -> &'static str {
        match self {
            TenantRef::Customer(_) => "SELECT EXISTS(SELECT 1 FROM customers WHERE tenant_id = $1 AND id = $2)",
            TenantRef::ActiveMember(_) => {
                "SELECT EXISTS(SELECT 1 FROM tenant_members WHERE tenant_id = $1 AND user_id = $2 AND is_active)"
            }
            TenantRef::MarketingEvent(_) => {
                "SELECT EXISTS(SELECT 1 FROM marketing_events WHERE tenant_id = $1 AND id = $2)"
            }
            TenantRef::ContentItem(_) => "SELECT EXISTS(SELECT 1 FROM content_items WHERE tenant_id = $1 AND id = $2)",
        }
    }
}

/// Campos cujo id não pertence à agência viram erro 400 por campo.
pub fn reference_errors(missing: &[&str]) -> Result<(), AppError> {
    if missing.is_empty() {
        return Ok(());
    }
    let errors: HashMap<String, String> = missing
        .iter()
        .map(|field| (field.to_string(), "not_found_in_tenant".to_string()))
        .collect();
    Err(AppError::FieldErrors(errors))
}

#[derive(Clone)]
pub struct ReferenceRepository {
    pool: PgPool,
}

impl ReferenceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Checa cada (campo, referência) preenchida contra a agência.
    #[tracing::instrument(name = "Verify tenant references", skip(self, refs))]
    pub async fn verify(&self, tenant_id: Uuid, refs: &[(&'static str, Option<TenantRef>)]) -> Result<(), AppError> {
        let mut missing = Vec::new();

        for (field, reference) in refs {
            let Some(reference) = reference else { continue };
            let exists: bool = sqlx::query_scalar(reference.exists_sql())
                .bind(tenant_id)
                .bind(reference.id())
                .fetch_one(&self.pool)
                .await?;
            if !exists {
                tracing::warn!("🚫 {} {} não pertence à agência {}", field, reference.id(), tenant_id);
                missing.push(*field);
            }
        }

        reference_errors(&missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_missing_reference_is_ok() {
        assert!(reference_errors(&[]).is_ok());
    }

    #[test]
    fn each_foreign_field_is_reported() {
        match reference_errors(&["customerId", "assigneeId"]) {
            Err(AppError::FieldErrors(errors)) => {
                assert_eq!(errors.len(), 2);
                assert_eq!(errors["customerId"], "not_found_in_tenant");
                assert_eq!(errors["assigneeId"], "not_found_in_tenant");
            }
            other => panic!("esperava FieldErrors, veio {other:?}"),
        }
    }

    #[test]
    fn every_lookup_is_scoped_by_tenant() {
        let id = Uuid::new_v4();
        for r in [
            TenantRef::Customer(id),
            TenantRef::ActiveMember(id),
            TenantRef::MarketingEvent(id),
            TenantRef::ContentItem(id),
        ] {
            assert!(r.exists_sql().contains("tenant_id = $1"));
            assert_eq!(r.id(), id);
        }
        assert!(TenantRef::ActiveMember(id).exists_sql().contains("is_active"));
    }

    async fn seed_tenant(pool: &PgPool, name: &str) -> Uuid {
        sqlx::query_scalar("INSERT INTO tenants (name) VALUES ($1) RETURNING id")
            .bind(name)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "precisa de Postgres (DATABASE_URL)"]
    async fn customer_of_another_agency_is_rejected(pool: PgPool) {
        let mine = seed_tenant(&pool, "Agentur Nord").await;
        let theirs = seed_tenant(&pool, "Agentur Süd").await;
        let foreign_customer: Uuid = sqlx::query_scalar(
            "INSERT INTO customers (tenant_id, name, contact_email, plan) VALUES ($1, 'Bäckerei', 'b@x.de', 'BASIC') RETURNING id",
        )
        .bind(theirs)
        .fetch_one(&pool)
        .await
        .unwrap();

        let repo = ReferenceRepository::new(pool);
        let refs = [("customerId", Some(TenantRef::Customer(foreign_customer)))];

        assert!(repo.verify(theirs, &refs).await.is_ok());
        match repo.verify(mine, &refs).await {
            Err(AppError::FieldErrors(errors)) => assert_eq!(errors["customerId"], "not_found_in_tenant"),
            other => panic!("esperava FieldErrors, veio {other:?}"),
        }
    }
}
