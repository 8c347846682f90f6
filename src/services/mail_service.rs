// src/services/mail_service.rs

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CrmRepository, MailRepository},
    models::{
        events::{ChangeEvent, EntityKind},
        mail::{
            render_template, ComposeEmailPayload, Email, EmailStatus, LinkedMailAccount, MailProvider,
            OAuthCallbackQuery, OAuthStartResponse, OAuthStateClaims, OutgoingMail, SenderDirectory,
            CUSTOMER_NAME_PLACEHOLDER,
        },
    },
    services::events::EventBus,
};

const OAUTH_STATE_TTL_SECS: i64 = 600;
const EMAIL_LIST_LIMIT: i64 = 200;

/// Entrega de e-mail. O relay real (SMTP, API do provedor) fica fora do backend.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> anyhow::Result<()>;
}

// Transporte padrão: só registra no log
pub struct LogTransport;

#[async_trait]
impl MailTransport for LogTransport {
    async fn send(&self, mail: &OutgoingMail) -> anyhow::Result<()> {
        tracing::info!(
            from = %mail.from,
            to = ?mail.to,
            cc = ?mail.cc,
            "📨 E-mail entregue ao log: {}",
            mail.subject
        );
        Ok(())
    }
}

/// Monta a mensagem final: remetente do departamento e placeholders resolvidos.
pub fn prepare_mail(
    senders: &SenderDirectory,
    payload: &ComposeEmailPayload,
    customer_name: Option<&str>,
) -> Result<OutgoingMail, AppError> {
    let from = senders.sender_for(payload.department).ok_or_else(|| {
        AppError::FieldErrors([("department".to_string(), "no_sender_account".to_string())].into())
    })?;

    let mut values = HashMap::new();
    if let Some(name) = customer_name {
        values.insert(CUSTOMER_NAME_PLACEHOLDER, name.to_string());
    }

    let clean = |list: &[String]| list.iter().map(|a| a.trim().to_string()).collect::<Vec<_>>();

    Ok(OutgoingMail {
        from: from.to_string(),
        to: clean(&payload.to),
        cc: clean(&payload.cc),
        subject: render_template(&payload.subject, &values),
        body: render_template(&payload.body, &values),
    })
}

#[derive(Clone)]
pub struct MailService {
    repo: MailRepository,
    crm_repo: CrmRepository,
    senders: Arc<SenderDirectory>,
    transport: Arc<dyn MailTransport>,
    events: EventBus,
    // Chave própria para o `state`: não serve como token de login
    state_secret: String,
    frontend_url: String,
    pool: PgPool,
}

impl MailService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        repo: MailRepository,
        crm_repo: CrmRepository,
        senders: SenderDirectory,
        transport: Arc<dyn MailTransport>,
        events: EventBus,
        jwt_secret: &str,
        frontend_url: impl Into<String>,
        pool: PgPool,
    ) -> Self {
        Self {
            repo,
            crm_repo,
            senders: Arc::new(senders),
            transport,
            events,
            state_secret: format!("{jwt_secret}:mail-oauth-state"),
            frontend_url: frontend_url.into(),
            pool,
        }
    }

    // =========================================================================
    //  ENVIO
    // =========================================================================

    /// Falha de entrega não é erro HTTP: o e-mail fica gravado como FAILED.
    pub async fn compose(
        &self,
        tenant_id: Uuid,
        sent_by: Uuid,
        payload: &ComposeEmailPayload,
    ) -> Result<Email, AppError> {
        let customer_name = match payload.customer_id {
            Some(customer_id) => {
                let customer = self
                    .crm_repo
                    .find_customer(&self.pool, tenant_id, customer_id)
                    .await?
                    .ok_or_else(|| AppError::ResourceNotFound("customer".into()))?;
                Some(customer.name)
            }
            None => None,
        };

        let mail = prepare_mail(&self.senders, payload, customer_name.as_deref())?;

        let (status, error_message) = match self.transport.send(&mail).await {
            Ok(()) => (EmailStatus::Sent, None),
            Err(e) => {
                tracing::warn!("⚠️ Falha ao enviar e-mail '{}': {}", mail.subject, e);
                (EmailStatus::Failed, Some(e.to_string()))
            }
        };

        let email = self
            .repo
            .record_email(
                tenant_id,
                sent_by,
                payload.department,
                &mail,
                payload.customer_id,
                status,
                error_message.as_deref(),
            )
            .await?;

        tracing::info!("✉️ E-mail {:?} de {} para {} destinatário(s)", status, mail.from, mail.to.len());
        self.events
            .publish(ChangeEvent::created(tenant_id, EntityKind::Email, email.id));
        Ok(email)
    }

    pub async fn list_emails(&self, tenant_id: Uuid) -> Result<Vec<Email>, AppError> {
        self.repo.list_emails(tenant_id, EMAIL_LIST_LIMIT).await
    }

    // =========================================================================
    //  VÍNCULO DE CONTA (OAuth)
    // =========================================================================

    pub fn issue_oauth_state(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
        provider: MailProvider,
    ) -> Result<OAuthStartResponse, AppError> {
        let now = Utc::now();
        let claims = OAuthStateClaims {
            sub: user_id,
            tenant_id,
            provider,
            exp: (now.timestamp() + OAUTH_STATE_TTL_SECS) as usize,
            iat: now.timestamp() as usize,
        };

        let state = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.state_secret.as_ref()),
        )?;

        Ok(OAuthStartResponse {
            state,
            expires_in_secs: OAUTH_STATE_TTL_SECS,
        })
    }

    pub fn verify_oauth_state(&self, state: &str) -> Result<OAuthStateClaims, AppError> {
        decode::<OAuthStateClaims>(
            state,
            &DecodingKey::from_secret(self.state_secret.as_ref()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| AppError::InvalidToken)
    }

    fn settings_redirect(&self, outcome: &str) -> String {
        format!(
            "{}/settings/mail?linked={outcome}",
            self.frontend_url.trim_end_matches('/')
        )
    }

    /// Retorno do provedor. Sempre devolve a URL de redirecionamento para o frontend.
    pub async fn handle_oauth_callback(&self, query: &OAuthCallbackQuery) -> String {
        match self.link_account(query).await {
            Ok(account) => {
                tracing::info!(
                    "🔗 Conta {:?} vinculada para o usuário {}",
                    account.provider,
                    account.user_id
                );
                self.settings_redirect("success")
            }
            Err(e) => {
                tracing::warn!("🔗 Vínculo de conta recusado: {}", e);
                self.settings_redirect("error")
            }
        }
    }

    async fn link_account(&self, query: &OAuthCallbackQuery) -> Result<LinkedMailAccount, AppError> {
        if let Some(provider_error) = &query.error {
            return Err(AppError::FieldErrors(
                [("error".to_string(), provider_error.clone())].into(),
            ));
        }

        let state = query.state.as_deref().ok_or(AppError::InvalidToken)?;
        let claims = self.verify_oauth_state(state)?;

        let code = query
            .code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::FieldErrors([("code".to_string(), "required".to_string())].into()))?;

        self.repo
            .upsert_account(claims.tenant_id, claims.sub, claims.provider, code)
            .await
    }

    pub async fn list_accounts(&self, tenant_id: Uuid, user_id: Uuid) -> Result<Vec<LinkedMailAccount>, AppError> {
        self.repo.list_accounts(tenant_id, user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::team::Department;
    use sqlx::postgres::PgPoolOptions;
    use validator::Validate;

    fn service(secret: &str) -> MailService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/never_used")
            .unwrap();
        MailService::new(
            MailRepository::new(pool.clone()),
            CrmRepository::new(pool.clone()),
            SenderDirectory::with_defaults(),
            Arc::new(LogTransport),
            EventBus::default(),
            secret,
            "http://localhost:5173/",
            pool,
        )
    }

    fn payload(department: Department) -> ComposeEmailPayload {
        ComposeEmailPayload {
            department,
            to: vec![" info@baeckerei-schulz.de ".into()],
            cc: vec![],
            subject: "Report für {{customer_name}}".into(),
            body: "Hallo {{ customer_name }},\nanbei der Report.".into(),
            customer_id: None,
        }
    }

    #[test]
    fn mail_uses_department_sender_and_customer_name() {
        let mail = prepare_mail(&SenderDirectory::with_defaults(), &payload(Department::Marketing), Some("Schulz"))
            .unwrap();
        assert_eq!(mail.from, "marketing@agency.local");
        assert_eq!(mail.to, vec!["info@baeckerei-schulz.de".to_string()]);
        assert_eq!(mail.subject, "Report für Schulz");
        assert!(mail.body.starts_with("Hallo Schulz,"));
    }

    #[test]
    fn placeholders_stay_without_customer() {
        let mail = prepare_mail(&SenderDirectory::with_defaults(), &payload(Department::Sales), None).unwrap();
        assert_eq!(mail.subject, "Report für {{customer_name}}");
    }

    #[test]
    fn padded_addresses_pass_validation_and_go_out_trimmed() {
        let mut padded = payload(Department::Sales);
        padded.to = vec![" info@x.de ".into()];
        assert!(padded.validate().is_ok());

        let mail = prepare_mail(&SenderDirectory::with_defaults(), &padded, None).unwrap();
        assert_eq!(mail.to, vec!["info@x.de".to_string()]);
    }

    #[test]
    fn department_without_sender_is_rejected() {
        let senders = SenderDirectory::new(HashMap::new());
        let err = prepare_mail(&senders, &payload(Department::Support), None).unwrap_err();
        assert!(matches!(err, AppError::FieldErrors(ref f) if f["department"] == "no_sender_account"));
    }

    #[tokio::test]
    async fn oauth_state_round_trips() {
        let svc = service("secret");
        let (user, tenant) = (Uuid::new_v4(), Uuid::new_v4());
        let start = svc.issue_oauth_state(user, tenant, MailProvider::Google).unwrap();

        let claims = svc.verify_oauth_state(&start.state).unwrap();
        assert_eq!(claims.sub, user);
        assert_eq!(claims.tenant_id, tenant);
        assert_eq!(claims.provider, MailProvider::Google);
        assert!(service("other").verify_oauth_state(&start.state).is_err());
    }

    #[tokio::test]
    async fn callback_errors_redirect_to_error_page() {
        let svc = service("secret");

        let denied = OAuthCallbackQuery {
            code: None,
            state: None,
            error: Some("access_denied".into()),
        };
        assert_eq!(
            svc.handle_oauth_callback(&denied).await,
            "http://localhost:5173/settings/mail?linked=error"
        );

        let forged = OAuthCallbackQuery {
            code: Some("abc".into()),
            state: Some("not-a-jwt".into()),
            error: None,
        };
        assert!(svc.handle_oauth_callback(&forged).await.ends_with("linked=error"));
    }
}
