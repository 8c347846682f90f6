// src/services/document_service.rs

use chrono::{DateTime, Utc};
use genpdf::{elements, style, Alignment, Element};
use image::{DynamicImage, ImageOutputFormat, Luma};
use qrcode::QrCode;

use crate::{
    common::{error::AppError, i18n::I18nStore, money::format_eur},
    models::coupons::{Coupon, CouponStatus},
};

fn internal(e: impl std::fmt::Display) -> AppError {
    AppError::InternalServerError(anyhow::Error::msg(e.to_string()))
}

/// QR codes e vouchers em PDF dos cupons.
#[derive(Clone)]
pub struct DocumentService {
    fonts_dir: String,
    public_base_url: String,
}

impl DocumentService {
    pub fn new(fonts_dir: impl Into<String>, public_base_url: impl Into<String>) -> Self {
        Self {
            fonts_dir: fonts_dir.into(),
            public_base_url: public_base_url.into(),
        }
    }

    /// URL que o QR carrega; o scan extrai o `code` de volta.
    pub fn redeem_url(&self, code: &str) -> Result<String, AppError> {
        let base = format!("{}/redeem", self.public_base_url.trim_end_matches('/'));
        let url = url::Url::parse_with_params(&base, &[("code", code)]).map_err(internal)?;
        Ok(url.into())
    }

    fn qr_image(&self, code: &str) -> Result<DynamicImage, AppError> {
        let qr = QrCode::new(self.redeem_url(code)?.as_bytes()).map_err(internal)?;
        let buffer = qr.render::<Luma<u8>>().min_dimensions(240, 240).build();
        Ok(DynamicImage::ImageLuma8(buffer))
    }

    pub fn coupon_qr_png(&self, code: &str) -> Result<Vec<u8>, AppError> {
        let image = self.qr_image(code)?;
        let mut png = Vec::new();
        image.write_to(&mut png, ImageOutputFormat::Png).map_err(internal)?;
        Ok(png)
    }

    /// Voucher imprimível: código, valor, validade e o QR de resgate.
    pub fn coupon_voucher_pdf(
        &self,
        coupon: &Coupon,
        now: DateTime<Utc>,
        lang: &str,
        i18n: &I18nStore,
    ) -> Result<Vec<u8>, AppError> {
        let t = |key: &str| i18n.translate(lang, key);

        // Fontes em FONTS_DIR (Roboto-Regular.ttf, Roboto-Bold.ttf, ...)
        let font_family = genpdf::fonts::from_files(&self.fonts_dir, "Roboto", None)
            .map_err(|_| AppError::FontNotFound(format!("Roboto em {}", self.fonts_dir)))?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(format!("{} {}", t("voucher.title"), coupon.code));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(15);
        doc.set_page_decorator(decorator);

        let mut title = elements::Paragraph::new(t("voucher.title").to_uppercase());
        title.set_alignment(Alignment::Center);
        doc.push(title.styled(style::Style::new().bold().with_font_size(24)));
        doc.push(elements::Break::new(1.5));

        let mut value = elements::Paragraph::new(format_eur(coupon.value, lang));
        value.set_alignment(Alignment::Center);
        doc.push(value.styled(style::Style::new().bold().with_font_size(32)));

        if let Some(description) = &coupon.description {
            let mut text = elements::Paragraph::new(description.as_str());
            text.set_alignment(Alignment::Center);
            doc.push(text.styled(style::Style::new().italic().with_font_size(11)));
        }
        doc.push(elements::Break::new(2));

        let mut table = elements::TableLayout::new(vec![1, 2]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(false, true, false));
        let bold = style::Style::new().bold();

        let validity = match coupon.expires_at {
            Some(exp) => exp.format("%d.%m.%Y %H:%M UTC").to_string(),
            None => t("voucher.no_expiry"),
        };
        let status = match coupon.effective_status(now) {
            CouponStatus::Active => "ACTIVE",
            CouponStatus::Redeemed => "REDEEMED",
            CouponStatus::Expired => "EXPIRED",
        };

        for (label, content) in [
            (t("voucher.code"), coupon.code.clone()),
            (t("voucher.value"), format_eur(coupon.value, lang)),
            (t("voucher.valid_until"), validity),
            (t("voucher.status"), status.to_string()),
        ] {
            table
                .row()
                .element(elements::Paragraph::new(label).styled(bold))
                .element(elements::Paragraph::new(content))
                .push()
                .map_err(internal)?;
        }
        doc.push(table);
        doc.push(elements::Break::new(2));

        let qr = elements::Image::from_dynamic_image(self.qr_image(&coupon.code)?)
            .map_err(internal)?
            .with_alignment(Alignment::Center)
            .with_scale(genpdf::Scale::new(0.8, 0.8));
        doc.push(qr);

        doc.push(elements::Break::new(1));
        let mut link = elements::Paragraph::new(self.redeem_url(&coupon.code)?);
        link.set_alignment(Alignment::Center);
        doc.push(link.styled(style::Style::new().with_font_size(8)));

        let mut buffer = Vec::new();
        doc.render(&mut buffer).map_err(internal)?;

        tracing::debug!("🧾 Voucher do cupom '{}' gerado ({} bytes)", coupon.code, buffer.len());
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::coupons::extract_code_from_scan;

    fn service() -> DocumentService {
        DocumentService::new("./fonts", "https://agentur.example/")
    }

    #[test]
    fn redeem_url_round_trips_through_scan() {
        let url = service().redeem_url("HERBST-AB23CD45").unwrap();
        assert_eq!(url, "https://agentur.example/redeem?code=HERBST-AB23CD45");
        assert_eq!(extract_code_from_scan(&url), Some("HERBST-AB23CD45".to_string()));
    }

    #[test]
    fn qr_png_has_png_signature() {
        let png = service().coupon_qr_png("SUMMER10").unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
    }

    #[test]
    fn missing_fonts_are_reported() {
        let svc = DocumentService::new("./no-such-fonts-dir", "http://localhost:3000");
        let coupon = Coupon {
            id: uuid::Uuid::new_v4(),
            tenant_id: uuid::Uuid::new_v4(),
            code: "SUMMER10".into(),
            value: rust_decimal::Decimal::new(10, 0),
            description: None,
            campaign_id: None,
            status: CouponStatus::Active,
            expires_at: None,
            redeemed_at: None,
            redeemer_name: None,
            redeemer_contact: None,
            redemption_channel: None,
            redeemed_by: None,
            created_at: Utc::now(),
        };
        let result = svc.coupon_voucher_pdf(&coupon, Utc::now(), "de", &I18nStore::new());
        assert!(matches!(result, Err(AppError::FontNotFound(_))));
    }
}
