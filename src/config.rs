use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub padding: f32,
    pub header_height: f32,
    pub column_gap: f32,
    pub min_column_width: f32,
    pub max_column_width: f32,
    pub node_height: f32,
    pub child_node_height: f32,
    pub child_indent: f32,
    pub node_gap: f32,
    pub child_gap: f32,
    pub node_padding_x: f32,
    pub meta_font_scale: f32,
    /// Skip font lookup and size labels from built-in character widths.
    pub fast_text_metrics: bool,
    pub badge_height: f32,
    /// Horizontal control-point offset as a share of the endpoint distance.
    pub connector_control_ratio: f32,
    /// Derive a (nation, class) progression chain when the catalog has no links.
    pub fallback_connectors: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            padding: 24.0,
            header_height: 36.0,
            column_gap: 72.0,
            min_column_width: 180.0,
            max_column_width: 280.0,
            node_height: 52.0,
            child_node_height: 40.0,
            child_indent: 16.0,
            node_gap: 10.0,
            child_gap: 6.0,
            node_padding_x: 10.0,
            meta_font_scale: 0.82,
            fast_text_metrics: false,
            badge_height: 18.0,
            connector_control_ratio: 0.4,
            fallback_connectors: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Viewport size the column grid is fitted to.
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: "#0B0E14".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub search_debounce_ms: u64,
    pub resize_debounce_ms: u64,
    pub default_nation: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            search_debounce_ms: 180,
            resize_debounce_ms: 150,
            default_nation: Some("usa".to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
    pub session: SessionConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::hangar();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
            session: SessionConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    background: Option<String>,
    node_fill: Option<String>,
    node_border: Option<String>,
    child_fill: Option<String>,
    text_color: Option<String>,
    muted_text_color: Option<String>,
    badge_fill: Option<String>,
    line_color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    column_gap: Option<f32>,
    min_column_width: Option<f32>,
    max_column_width: Option<f32>,
    node_height: Option<f32>,
    child_node_height: Option<f32>,
    node_gap: Option<f32>,
    connector_control_ratio: Option<f32>,
    fallback_connectors: Option<bool>,
    fast_text_metrics: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionConfigFile {
    search_debounce_ms: Option<u64>,
    resize_debounce_ms: Option<u64>,
    default_nation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    tech_tree: Option<LayoutConfigFile>,
    session: Option<SessionConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = serde_json::from_str(&contents)?;
    apply_config_file(&mut config, parsed)?;
    Ok(config)
}

fn apply_config_file(config: &mut Config, parsed: ConfigFile) -> anyhow::Result<()> {
    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme = Theme::by_name(theme_name)
            .ok_or_else(|| anyhow::anyhow!("unknown theme `{theme_name}`"))?;
        config.render.background = config.theme.background.clone();
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.background {
            config.render.background = v.clone();
            config.theme.background = v;
        }
        if let Some(v) = vars.node_fill {
            config.theme.node_fill = v;
        }
        if let Some(v) = vars.node_border {
            config.theme.node_border = v;
        }
        if let Some(v) = vars.child_fill {
            config.theme.child_fill = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.muted_text_color {
            config.theme.muted_text_color = v;
        }
        if let Some(v) = vars.badge_fill {
            config.theme.badge_fill = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
    }

    if let Some(tree) = parsed.tech_tree {
        if let Some(v) = tree.column_gap {
            config.layout.column_gap = v;
        }
        if let Some(v) = tree.min_column_width {
            config.layout.min_column_width = v;
        }
        if let Some(v) = tree.max_column_width {
            config.layout.max_column_width = v;
        }
        if let Some(v) = tree.node_height {
            config.layout.node_height = v;
        }
        if let Some(v) = tree.child_node_height {
            config.layout.child_node_height = v;
        }
        if let Some(v) = tree.node_gap {
            config.layout.node_gap = v;
        }
        if let Some(v) = tree.connector_control_ratio {
            config.layout.connector_control_ratio = v;
        }
        if let Some(v) = tree.fallback_connectors {
            config.layout.fallback_connectors = v;
        }
        if let Some(v) = tree.fast_text_metrics {
            config.layout.fast_text_metrics = v;
        }
    }

    if let Some(session) = parsed.session {
        if let Some(v) = session.search_debounce_ms {
            config.session.search_debounce_ms = v;
        }
        if let Some(v) = session.resize_debounce_ms {
            config.session.resize_debounce_ms = v;
        }
        if let Some(v) = session.default_nation {
            // An empty name turns the preselection off.
            config.session.default_nation = (!v.is_empty()).then_some(v);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(json: &str) -> anyhow::Result<Config> {
        let mut config = Config::default();
        let parsed: ConfigFile = serde_json::from_str(json)?;
        apply_config_file(&mut config, parsed)?;
        Ok(config)
    }

    #[test]
    fn missing_path_gives_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.layout.connector_control_ratio, 0.4);
        assert_eq!(config.session.search_debounce_ms, 180);
        assert_eq!(config.session.default_nation.as_deref(), Some("usa"));
        assert_eq!(config.render.background, config.theme.background);
    }

    #[test]
    fn overrides_merge_over_defaults() {
        let config = apply(
            r##"{
                "theme": "light",
                "themeVariables": {"lineColor": "#FF0000"},
                "techTree": {"columnGap": 90, "fallbackConnectors": false},
                "session": {"resizeDebounceMs": 50, "defaultNation": "germany"}
            }"##,
        )
        .unwrap();
        assert_eq!(config.theme.line_color, "#FF0000");
        assert_eq!(config.theme.background, "#FFFFFF");
        assert_eq!(config.layout.column_gap, 90.0);
        assert!(!config.layout.fallback_connectors);
        assert_eq!(config.layout.node_height, LayoutConfig::default().node_height);
        assert_eq!(config.session.resize_debounce_ms, 50);
        assert_eq!(config.session.default_nation.as_deref(), Some("germany"));
    }

    #[test]
    fn empty_default_nation_clears_preselection() {
        let config = apply(r#"{"session": {"defaultNation": ""}}"#).unwrap();
        assert_eq!(config.session.default_nation, None);
        assert_eq!(config.session.search_debounce_ms, 180);
    }

    #[test]
    fn unknown_theme_is_rejected() {
        assert!(apply(r#"{"theme": "neon"}"#).is_err());
    }
}
