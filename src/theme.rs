use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub background: String,
    pub column_background: String,
    pub column_border: String,
    pub header_text_color: String,
    pub node_fill: String,
    pub node_border: String,
    pub child_fill: String,
    pub text_color: String,
    pub muted_text_color: String,
    pub badge_fill: String,
    pub badge_text_color: String,
    pub line_color: String,
    pub card_fill: String,
    pub card_border: String,
    pub placeholder_start: String,
    pub placeholder_end: String,
    pub placeholder_text: String,
}

impl Theme {
    /// Dark garage palette, the default look of the catalog page.
    pub fn hangar() -> Self {
        Self {
            font_family: "system-ui, Segoe UI, Roboto, sans-serif".to_string(),
            font_size: 13.0,
            background: "#0B0E14".to_string(),
            column_background: "#10151F".to_string(),
            column_border: "#1E2738".to_string(),
            header_text_color: "#8FA3C7".to_string(),
            node_fill: "#151C2B".to_string(),
            node_border: "#2A3A5E".to_string(),
            child_fill: "#121826".to_string(),
            text_color: "#E6EDF7".to_string(),
            muted_text_color: "#7D8BA6".to_string(),
            badge_fill: "#3B82F6".to_string(),
            badge_text_color: "#FFFFFF".to_string(),
            line_color: "#4A6FA5".to_string(),
            card_fill: "#121826".to_string(),
            card_border: "#1E2738".to_string(),
            placeholder_start: "#0B0E14".to_string(),
            placeholder_end: "#121826".to_string(),
            placeholder_text: "#2A3A5E".to_string(),
        }
    }

    pub fn light() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            background: "#FFFFFF".to_string(),
            column_background: "#F7FAFF".to_string(),
            column_border: "#D7E0F0".to_string(),
            header_text_color: "#4B5B78".to_string(),
            node_fill: "#F8FAFF".to_string(),
            node_border: "#C7D2E5".to_string(),
            child_fill: "#EEF2F8".to_string(),
            text_color: "#1C2430".to_string(),
            muted_text_color: "#6B7A93".to_string(),
            badge_fill: "#2563EB".to_string(),
            badge_text_color: "#FFFFFF".to_string(),
            line_color: "#7A8AA6".to_string(),
            card_fill: "#FFFFFF".to_string(),
            card_border: "#D7E0F0".to_string(),
            placeholder_start: "#EEF2F8".to_string(),
            placeholder_end: "#DDE5F2".to_string(),
            placeholder_text: "#9AA8C0".to_string(),
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "hangar" | "dark" | "default" => Some(Self::hangar()),
            "light" => Some(Self::light()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::hangar()
    }
}
