use serde::{Deserialize, Serialize};

use crate::ir::ConnectionKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub node_fill: String,
    pub node_border: String,
    pub text_color: String,
    pub secondary_text_color: String,
    pub transition_color: String,
    pub mashup_color: String,
    pub recent_color: String,
    pub hub_fill: String,
    pub hub_border: String,
    pub hub_badge_fill: String,
    pub hub_badge_text: String,
    pub background: String,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 12.0,
            node_fill: "#1F2937".to_string(),
            node_border: "rgba(255,255,255,0.12)".to_string(),
            text_color: "#F9FAFB".to_string(),
            secondary_text_color: "rgba(255,255,255,0.6)".to_string(),
            transition_color: "#10B981".to_string(),
            mashup_color: "#8B5CF6".to_string(),
            recent_color: "#FBBF24".to_string(),
            hub_fill: "rgba(245,158,11,0.10)".to_string(),
            hub_border: "rgba(245,158,11,0.50)".to_string(),
            hub_badge_fill: "#F59E0B".to_string(),
            hub_badge_text: "#000000".to_string(),
            background: "#0B0F19".to_string(),
        }
    }

    pub fn light() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 12.0,
            node_fill: "#F8FAFF".to_string(),
            node_border: "#C7D2E5".to_string(),
            text_color: "#1C2430".to_string(),
            secondary_text_color: "#5B6B82".to_string(),
            transition_color: "#059669".to_string(),
            mashup_color: "#7C3AED".to_string(),
            recent_color: "#D97706".to_string(),
            hub_fill: "#FFF7E6".to_string(),
            hub_border: "#F59E0B".to_string(),
            hub_badge_fill: "#F59E0B".to_string(),
            hub_badge_text: "#1C2430".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn edge_color(&self, kind: ConnectionKind) -> &str {
        match kind {
            ConnectionKind::Transition => &self.transition_color,
            ConnectionKind::Mashup => &self.mashup_color,
        }
    }
}
