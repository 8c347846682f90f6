// src/models/marketing.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::crm::Prospect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "marketing_channel", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketingChannel {
    Email,
    Social,
    Print,
    Web,
    Event,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "event_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Planned,
    Published,
    Cancelled,
}

// --- POOL DE CONTEÚDO ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    #[schema(example = "Herbstaktion: 10% auf alle Brote")]
    pub title: String,
    pub body: String,
    pub channel: MarketingChannel,
    #[schema(example = json!(["herbst", "rabatt"]))]
    pub tags: Vec<String>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContentItemPayload {
    #[validate(length(min = 2, message = "title_too_short"))]
    pub title: String,
    #[validate(length(min = 1, message = "required"))]
    pub body: String,
    pub channel: MarketingChannel,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TakeContentQuery {
    pub channel: Option<MarketingChannel>,
}

// --- CALENDÁRIO ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarketingEvent {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    #[schema(example = "Instagram-Post Herbstaktion")]
    pub title: String,
    pub channel: MarketingChannel,
    pub status: EventStatus,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub content_item_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

fn validate_event_window(p: &ScheduleEventPayload) -> Result<(), ValidationError> {
    if let Some(ends_at) = p.ends_at {
        if ends_at < p.starts_at {
            let mut err = ValidationError::new("date_range");
            err.message = Some("end_before_start".into());
            return Err(err);
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_event_window", skip_on_field_errors = false))]
pub struct ScheduleEventPayload {
    #[validate(length(min = 2, message = "title_too_short"))]
    pub title: String,
    pub channel: MarketingChannel,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub content_item_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventStatusPayload {
    pub status: EventStatus,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CalendarQuery {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

// --- GEOMARKETING ---

#[derive(Debug, Deserialize, Validate, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct GeoSearchQuery {
    #[validate(range(min = -90.0, max = 90.0, message = "invalid_latitude"))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "invalid_longitude"))]
    pub lon: f64,
    #[validate(range(min = 0.1, max = 200.0, message = "invalid_radius"))]
    pub radius_km: f64,
    pub category: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeoHit {
    #[serde(flatten)]
    pub business: Prospect,
    #[schema(example = 1.42)]
    pub distance_km: f64,
}

const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Distância de grande círculo (haversine) em km.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

/// Caixa que contém o círculo; pré-filtro no SQL.
/// Perto de ±180° a faixa de longitude se divide em duas; sem divisão as duas são iguais.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_ranges: [(f64, f64); 2],
}

#[cfg(test)]
impl GeoBox {
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.lat_min..=self.lat_max).contains(&lat)
            && self.lon_ranges.iter().any(|(lo, hi)| (*lo..=*hi).contains(&lon))
    }
}

pub fn bounding_box(lat: f64, lon: f64, radius_km: f64) -> GeoBox {
    const WORLD: (f64, f64) = (-180.0, 180.0);

    let d_lat = (radius_km / EARTH_RADIUS_KM).to_degrees();
    let lat_min = (lat - d_lat).max(-90.0);
    let lat_max = (lat + d_lat).min(90.0);

    let cos_lat = lat.to_radians().cos().abs().max(1e-6);
    let d_lon = (radius_km / (EARTH_RADIUS_KM * cos_lat)).to_degrees();

    // O círculo alcança um polo ou dá a volta: qualquer longitude serve
    let lon_ranges = if d_lon >= 180.0 || lat_min <= -90.0 || lat_max >= 90.0 {
        [WORLD, WORLD]
    } else {
        let (lo, hi) = (lon - d_lon, lon + d_lon);
        if lo < -180.0 {
            [(lo + 360.0, 180.0), (-180.0, hi)]
        } else if hi > 180.0 {
            [(lo, 180.0), (-180.0, hi - 360.0)]
        } else {
            [(lo, hi), (lo, hi)]
        }
    };

    GeoBox { lat_min, lat_max, lon_ranges }
}

/// Filtra pelo raio exato e ordena pela distância.
pub fn rank_by_distance(candidates: Vec<Prospect>, lat: f64, lon: f64, radius_km: f64) -> Vec<GeoHit> {
    let mut hits: Vec<GeoHit> = candidates
        .into_iter()
        .map(|p| {
            let distance_km = haversine_km(lat, lon, p.latitude, p.longitude);
            GeoHit { business: p, distance_km }
        })
        .filter(|hit| hit.distance_km <= radius_km)
        .collect();

    hits.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prospect(name: &str, lat: f64, lon: f64) -> Prospect {
        Prospect {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            name: name.into(),
            address: "Kiel".into(),
            category: None,
            latitude: lat,
            longitude: lon,
            email: None,
            phone: None,
            website: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn haversine_matches_known_distance() {
        // Hamburg Rathaus -> Kiel Rathaus ~ 85 km
        let d = haversine_km(53.5503, 9.9920, 54.3227, 10.1359);
        assert!((d - 86.5).abs() < 2.0, "got {d}");
        assert!(haversine_km(54.0, 10.0, 54.0, 10.0) < 1e-9);
    }

    #[test]
    fn ranking_filters_radius_and_sorts() {
        let center = (54.3227, 10.1359);
        let hits = rank_by_distance(
            vec![
                prospect("far", 53.5503, 9.9920),
                prospect("near", 54.3230, 10.1360),
                prospect("mid", 54.3400, 10.1500),
            ],
            center.0,
            center.1,
            10.0,
        );
        let names: Vec<_> = hits.iter().map(|h| h.business.name.as_str()).collect();
        assert_eq!(names, vec!["near", "mid"]);
    }

    #[test]
    fn bounding_box_contains_the_circle() {
        let bbox = bounding_box(54.0, 10.0, 10.0);
        let (lon_min, lon_max) = bbox.lon_ranges[0];
        assert_eq!(bbox.lon_ranges[0], bbox.lon_ranges[1]);
        assert!(haversine_km(54.0, 10.0, bbox.lat_max, 10.0) >= 9.99);
        assert!(haversine_km(54.0, 10.0, 54.0, lon_max) >= 9.99);
        assert!(bbox.lat_min < 54.0 && lon_min < 10.0);
    }

    #[test]
    fn box_wraps_across_the_date_line() {
        // Fiji: 179.9 e -179.9 ficam a ~20 km um do outro
        let bbox = bounding_box(-17.0, 179.9, 50.0);
        assert!(haversine_km(-17.0, 179.9, -17.0, -179.9) < 50.0);
        assert!(bbox.contains(-17.0, -179.9));
        assert!(bbox.contains(-17.0, 179.95));
        assert!(!bbox.contains(-17.0, 0.0));
        for (lo, hi) in bbox.lon_ranges {
            assert!((-180.0..=180.0).contains(&lo) && (-180.0..=180.0).contains(&hi));
        }

        let west = bounding_box(-17.0, -179.9, 50.0);
        assert!(west.contains(-17.0, 179.9));

        let hits = rank_by_distance(vec![prospect("Nadi Print", -17.0, -179.9)], -17.0, 179.9, 50.0);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn box_near_the_pole_takes_every_longitude() {
        let bbox = bounding_box(89.95, 0.0, 20.0);
        assert!(bbox.contains(89.99, 179.0));
        assert!(bbox.contains(89.99, -120.0));
    }
}
