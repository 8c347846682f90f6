// src/models/dashboard.rs

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::finance::CurrencyTotal;

// 1. Posição de um widget na grade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WidgetPlacement {
    #[schema(example = "open_tickets")]
    pub widget: String,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardLayout {
    pub widgets: Vec<WidgetPlacement>,
    // false = ainda não salvo, layout padrão
    #[serde(default)]
    pub customized: bool,
}

fn place(widget: &str, x: i32, y: i32, w: i32, h: i32) -> WidgetPlacement {
    WidgetPlacement { widget: widget.to_string(), x, y, w, h }
}

impl DashboardLayout {
    pub fn default_layout() -> Self {
        Self {
            widgets: vec![
                place("summary", 0, 0, 12, 2),
                place("open_tickets", 0, 2, 6, 4),
                place("active_projects", 6, 2, 6, 4),
                place("services_due", 0, 6, 6, 4),
                place("todos", 6, 6, 6, 4),
            ],
            customized: false,
        }
    }

    /// Erros por campo (`widgets[i].campo` -> código).
    pub fn validate_widgets(widgets: &[WidgetPlacement]) -> Result<(), HashMap<String, String>> {
        let mut errors = HashMap::new();
        let mut seen = HashSet::new();

        for (i, wp) in widgets.iter().enumerate() {
            if wp.widget.trim().is_empty() {
                errors.insert(format!("widgets[{i}].widget"), "required".to_string());
            } else if !seen.insert(wp.widget.as_str()) {
                errors.insert(format!("widgets[{i}].widget"), "duplicate_widget".to_string());
            }
            if wp.x < 0 || wp.y < 0 {
                errors.insert(format!("widgets[{i}].position"), "must_not_be_negative".to_string());
            }
            if wp.w < 1 || wp.h < 1 {
                errors.insert(format!("widgets[{i}].size"), "must_be_positive".to_string());
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveLayoutPayload {
    pub widgets: Vec<WidgetPlacement>,
}

// 2. Cards do topo
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub open_tickets: i64,
    pub active_projects: i64,
    pub active_coupons: i64,
    pub customers: i64,
    pub expenses_this_month: Vec<CurrencyTotal>, // mês corrente, uma linha por moeda
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_is_valid() {
        let layout = DashboardLayout::default_layout();
        assert!(!layout.customized);
        assert!(DashboardLayout::validate_widgets(&layout.widgets).is_ok());
    }

    #[test]
    fn duplicates_and_bad_sizes_are_reported() {
        let widgets = vec![
            place("todos", 0, 0, 4, 4),
            place("todos", 4, 0, 0, 4),
            place("summary", -1, 0, 2, 2),
        ];
        let errors = DashboardLayout::validate_widgets(&widgets).unwrap_err();

        assert_eq!(errors["widgets[1].widget"], "duplicate_widget");
        assert_eq!(errors["widgets[1].size"], "must_be_positive");
        assert_eq!(errors["widgets[2].position"], "must_not_be_negative");
        assert!(!errors.contains_key("widgets[0].widget"));
    }

    #[test]
    fn empty_layout_is_allowed() {
        assert!(DashboardLayout::validate_widgets(&[]).is_ok());
    }
}
