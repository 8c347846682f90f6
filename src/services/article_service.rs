// src/services/article_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ArticleRepository,
    models::{
        articles::{Article, ArticlePayload},
        events::{ChangeEvent, EntityKind},
    },
    services::events::EventBus,
};

// Todas as leituras recebem o idioma: o preço bruto formatado depende dele
#[derive(Clone)]
pub struct ArticleService {
    repo: ArticleRepository,
    events: EventBus,
}

impl ArticleService {
    pub fn new(repo: ArticleRepository, events: EventBus) -> Self {
        Self { repo, events }
    }

    pub async fn create(&self, tenant_id: Uuid, payload: &ArticlePayload, lang: &str) -> Result<Article, AppError> {
        let row = self.repo.create(tenant_id, payload).await?;
        self.events
            .publish(ChangeEvent::created(tenant_id, EntityKind::Article, row.id));
        Ok(Article::from_row(row, lang))
    }

    pub async fn list(&self, tenant_id: Uuid, lang: &str) -> Result<Vec<Article>, AppError> {
        let rows = self.repo.list(tenant_id).await?;
        Ok(rows.into_iter().map(|row| Article::from_row(row, lang)).collect())
    }

    pub async fn get(&self, tenant_id: Uuid, id: Uuid, lang: &str) -> Result<Article, AppError> {
        self.repo
            .find(tenant_id, id)
            .await?
            .map(|row| Article::from_row(row, lang))
            .ok_or_else(|| AppError::ResourceNotFound("article".into()))
    }

    pub async fn update(&self, tenant_id: Uuid, id: Uuid, payload: &ArticlePayload, lang: &str) -> Result<Article, AppError> {
        let row = self
            .repo
            .update(tenant_id, id, payload)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("article".into()))?;
        self.events
            .publish(ChangeEvent::updated(tenant_id, EntityKind::Article, row.id));
        Ok(Article::from_row(row, lang))
    }

    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(tenant_id, id).await? {
            return Err(AppError::ResourceNotFound("article".into()));
        }
        self.events
            .publish(ChangeEvent::deleted(tenant_id, EntityKind::Article, id));
        Ok(())
    }
}
