// src/common/i18n.rs

use std::collections::HashMap;

pub const DEFAULT_LANGUAGE: &str = "en";
pub const SUPPORTED_LANGUAGES: [&str; 3] = ["en", "de", "pt"];

// (idioma, chave, mensagem)
const MESSAGES: &[(&str, &str, &str)] = &[
    // --- en ---
    ("en", "error.validation", "One or more fields are invalid."),
    ("en", "error.email_exists", "This e-mail is already in use."),
    ("en", "error.invalid_credentials", "Invalid e-mail or password."),
    ("en", "error.invalid_token", "Authentication token is invalid or missing."),
    ("en", "error.user_not_found", "User not found."),
    ("en", "error.tenant_header_missing", "The X-Tenant-ID header is required."),
    ("en", "error.tenant_header_invalid", "The X-Tenant-ID header is not a valid UUID."),
    ("en", "error.tenant_access_denied", "You are not an active member of this agency."),
    ("en", "error.module_access_denied", "You do not have access to this module"),
    ("en", "error.last_admin", "The agency needs at least one active administrator."),
    ("en", "error.not_found", "Not found"),
    ("en", "error.conflict", "Already exists"),
    ("en", "error.internal", "An unexpected error occurred."),
    ("en", "coupon.redeemed", "Coupon redeemed."),
    ("en", "coupon.not_found", "No coupon exists with this code."),
    ("en", "coupon.already_redeemed", "This coupon has already been redeemed."),
    ("en", "coupon.expired", "This coupon has expired."),
    ("en", "voucher.title", "Voucher"),
    ("en", "voucher.value", "Value"),
    ("en", "voucher.code", "Code"),
    ("en", "voucher.valid_until", "Valid until"),
    ("en", "voucher.no_expiry", "No expiry date"),
    ("en", "voucher.status", "Status"),
    // --- de ---
    ("de", "error.validation", "Ein oder mehrere Felder sind ungültig."),
    ("de", "error.email_exists", "Diese E-Mail-Adresse wird bereits verwendet."),
    ("de", "error.invalid_credentials", "E-Mail oder Passwort ist falsch."),
    ("de", "error.invalid_token", "Das Anmeldetoken ist ungültig oder fehlt."),
    ("de", "error.user_not_found", "Benutzer nicht gefunden."),
    ("de", "error.tenant_header_missing", "Der Header X-Tenant-ID ist erforderlich."),
    ("de", "error.tenant_header_invalid", "Der Header X-Tenant-ID ist keine gültige UUID."),
    ("de", "error.tenant_access_denied", "Sie sind kein aktives Mitglied dieser Agentur."),
    ("de", "error.module_access_denied", "Sie haben keinen Zugriff auf dieses Modul"),
    ("de", "error.last_admin", "Die Agentur benötigt mindestens einen aktiven Administrator."),
    ("de", "error.not_found", "Nicht gefunden"),
    ("de", "error.conflict", "Existiert bereits"),
    ("de", "error.internal", "Ein unerwarteter Fehler ist aufgetreten."),
    ("de", "coupon.redeemed", "Gutschein eingelöst."),
    ("de", "coupon.not_found", "Es gibt keinen Gutschein mit diesem Code."),
    ("de", "coupon.already_redeemed", "Dieser Gutschein wurde bereits eingelöst."),
    ("de", "coupon.expired", "Dieser Gutschein ist abgelaufen."),
    ("de", "voucher.title", "Gutschein"),
    ("de", "voucher.value", "Wert"),
    ("de", "voucher.code", "Code"),
    ("de", "voucher.valid_until", "Gültig bis"),
    ("de", "voucher.no_expiry", "Unbefristet"),
    ("de", "voucher.status", "Status"),
    // --- pt ---
    ("pt", "error.validation", "Um ou mais campos são inválidos."),
    ("pt", "error.email_exists", "Este e-mail já está em uso."),
    ("pt", "error.invalid_credentials", "E-mail ou senha inválidos."),
    ("pt", "error.invalid_token", "Token de autenticação inválido ou ausente."),
    ("pt", "error.user_not_found", "Usuário não encontrado."),
    ("pt", "error.tenant_header_missing", "O cabeçalho X-Tenant-ID é obrigatório."),
    ("pt", "error.tenant_header_invalid", "Cabeçalho X-Tenant-ID inválido (não é um UUID)."),
    ("pt", "error.tenant_access_denied", "Você não é membro ativo desta agência."),
    ("pt", "error.module_access_denied", "Você não tem acesso a este módulo"),
    ("pt", "error.last_admin", "A agência precisa de pelo menos um administrador ativo."),
    ("pt", "error.not_found", "Não encontrado"),
    ("pt", "error.conflict", "Já existe"),
    ("pt", "error.internal", "Ocorreu um erro inesperado."),
    ("pt", "coupon.redeemed", "Cupom resgatado."),
    ("pt", "coupon.not_found", "Nenhum cupom com este código."),
    ("pt", "coupon.already_redeemed", "Este cupom já foi resgatado."),
    ("pt", "coupon.expired", "Este cupom expirou."),
    ("pt", "voucher.title", "Vale"),
    ("pt", "voucher.value", "Valor"),
    ("pt", "voucher.code", "Código"),
    ("pt", "voucher.valid_until", "Válido até"),
    ("pt", "voucher.no_expiry", "Sem data de validade"),
    ("pt", "voucher.status", "Situação"),
];

/// Catálogo de mensagens em memória, montado uma vez no AppState.
#[derive(Debug, Clone)]
pub struct I18nStore {
    // chave composta "idioma:chave"
    messages: HashMap<String, &'static str>,
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

impl I18nStore {
    pub fn new() -> Self {
        let messages = MESSAGES
            .iter()
            .map(|(lang, key, text)| (format!("{lang}:{key}"), *text))
            .collect();
        Self { messages }
    }

    /// Idioma pedido -> inglês -> a própria chave.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.messages
            .get(&format!("{lang}:{key}"))
            .or_else(|| self.messages.get(&format!("{DEFAULT_LANGUAGE}:{key}")))
            .map(|text| text.to_string())
            .unwrap_or_else(|| key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_key_exists_in_every_language() {
        let store = I18nStore::new();
        for (_, key, _) in MESSAGES.iter().filter(|(l, _, _)| *l == DEFAULT_LANGUAGE) {
            for lang in SUPPORTED_LANGUAGES {
                assert!(
                    store.messages.contains_key(&format!("{lang}:{key}")),
                    "missing {key} for {lang}"
                );
            }
        }
    }

    #[test]
    fn falls_back_to_english_then_key() {
        let store = I18nStore::new();
        assert_eq!(store.translate("fr", "coupon.expired"), "This coupon has expired.");
        assert_eq!(store.translate("de", "no.such.key"), "no.such.key");
    }
}
