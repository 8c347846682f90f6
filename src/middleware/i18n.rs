// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};

use crate::common::i18n::{DEFAULT_LANGUAGE, SUPPORTED_LANGUAGES};

// Extrator de idioma (Accept-Language). Sempre resolve para um idioma suportado.
#[derive(Debug, Clone)]
pub struct Locale(pub String);

impl Default for Locale {
    fn default() -> Self {
        Locale(DEFAULT_LANGUAGE.to_string())
    }
}

impl Locale {
    pub fn language(&self) -> &str {
        &self.0
    }

    /// "de-DE;q=0.9, en" -> "de". Idiomas não suportados são ignorados.
    pub fn from_header(header_str: &str) -> Self {
        accept_language::parse(header_str)
            .iter()
            .map(|tag| tag.split('-').next().unwrap_or(tag).to_lowercase())
            .find(|lang| SUPPORTED_LANGUAGES.contains(&lang.as_str()))
            .map(Locale)
            .unwrap_or_default()
    }

    // Para middlewares, que recebem a requisição inteira e não um extrator
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .map(Locale::from_header)
            .unwrap_or_default()
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Locale::from_headers(&parts.headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_first_supported_language() {
        assert_eq!(Locale::from_header("de-DE,de;q=0.9,en;q=0.8").language(), "de");
        assert_eq!(Locale::from_header("fr-FR, pt-BR;q=0.7").language(), "pt");
    }

    #[test]
    fn unsupported_or_empty_falls_back_to_english() {
        assert_eq!(Locale::from_header("ja").language(), "en");
        assert_eq!(Locale::from_header("").language(), "en");
    }
}
