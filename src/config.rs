use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub center_x: f32,
    pub center_y: f32,
    pub base_radius: f32,
    /// Fraction of the radius removed per incident edge.
    pub degree_pull: f32,
    /// Floor for the radius multiplier; hubs saturate here.
    pub min_radius_ratio: f32,
    /// Half-width of the uniform jitter applied on each axis.
    pub jitter: f32,
    pub node_width: f32,
    pub node_height: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            center_x: 400.0,
            center_y: 300.0,
            base_radius: 250.0,
            degree_pull: 0.06,
            min_radius_ratio: 0.4,
            jitter: 20.0,
            node_width: 120.0,
            node_height: 60.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Subdivisions per node side; each side yields `resolution + 1` candidates.
    pub resolution: usize,
    pub attachment_radius: f32,
    pub cluster_weight: f32,
    pub crossing_penalty: f32,
    pub parallel_epsilon: f32,
    pub throttle_ms: u64,
    pub curvature: f32,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            resolution: 8,
            attachment_radius: 10.0,
            cluster_weight: 5.0,
            crossing_penalty: 50.0,
            parallel_epsilon: 1e-10,
            throttle_ms: 16,
            curvature: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub padding: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            padding: 40.0,
            background: "#0B0F19".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub routing: RoutingConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::dark();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            routing: RoutingConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    node_fill: Option<String>,
    node_border: Option<String>,
    text_color: Option<String>,
    secondary_text_color: Option<String>,
    transition_color: Option<String>,
    mashup_color: Option<String>,
    recent_color: Option<String>,
    hub_fill: Option<String>,
    hub_border: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    center_x: Option<f32>,
    center_y: Option<f32>,
    base_radius: Option<f32>,
    degree_pull: Option<f32>,
    min_radius_ratio: Option<f32>,
    jitter: Option<f32>,
    node_width: Option<f32>,
    node_height: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoutingConfigFile {
    resolution: Option<usize>,
    attachment_radius: Option<f32>,
    cluster_weight: Option<f32>,
    crossing_penalty: Option<f32>,
    parallel_epsilon: Option<f32>,
    throttle_ms: Option<u64>,
    curvature: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    width: Option<f32>,
    height: Option<f32>,
    padding: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    routing: Option<RoutingConfigFile>,
    render: Option<RenderConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parses a config document. Strict JSON is tried first; JSON5 covers
/// hand-written files with comments or trailing commas.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(json_err) => json5::from_str(contents)
            .map_err(|_| anyhow::anyhow!("invalid config file: {json_err}"))?,
    };

    let mut config = Config::default();

    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "light" {
            config.theme = Theme::light();
        } else if theme_name == "dark" || theme_name == "default" {
            config.theme = Theme::dark();
        }
        config.render.background = config.theme.background.clone();
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.node_fill {
            config.theme.node_fill = v;
        }
        if let Some(v) = vars.node_border {
            config.theme.node_border = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.secondary_text_color {
            config.theme.secondary_text_color = v;
        }
        if let Some(v) = vars.transition_color {
            config.theme.transition_color = v;
        }
        if let Some(v) = vars.mashup_color {
            config.theme.mashup_color = v;
        }
        if let Some(v) = vars.recent_color {
            config.theme.recent_color = v;
        }
        if let Some(v) = vars.hub_fill {
            config.theme.hub_fill = v;
        }
        if let Some(v) = vars.hub_border {
            config.theme.hub_border = v;
        }
        if let Some(v) = vars.background {
            config.render.background = v.clone();
            config.theme.background = v;
        }
    }

    if let Some(layout) = parsed.layout {
        let target = &mut config.layout;
        if let Some(v) = layout.center_x {
            target.center_x = v;
        }
        if let Some(v) = layout.center_y {
            target.center_y = v;
        }
        if let Some(v) = layout.base_radius {
            target.base_radius = v.max(0.0);
        }
        if let Some(v) = layout.degree_pull {
            target.degree_pull = v;
        }
        if let Some(v) = layout.min_radius_ratio {
            target.min_radius_ratio = v.clamp(0.0, 1.0);
        }
        if let Some(v) = layout.jitter {
            target.jitter = v.abs();
        }
        if let Some(v) = layout.node_width {
            target.node_width = v.max(0.0);
        }
        if let Some(v) = layout.node_height {
            target.node_height = v.max(0.0);
        }
    }

    if let Some(routing) = parsed.routing {
        let target = &mut config.routing;
        if let Some(v) = routing.resolution {
            target.resolution = v.max(1);
        }
        if let Some(v) = routing.attachment_radius {
            target.attachment_radius = v.max(0.0);
        }
        if let Some(v) = routing.cluster_weight {
            target.cluster_weight = v;
        }
        if let Some(v) = routing.crossing_penalty {
            target.crossing_penalty = v;
        }
        if let Some(v) = routing.parallel_epsilon {
            target.parallel_epsilon = v.abs();
        }
        if let Some(v) = routing.throttle_ms {
            target.throttle_ms = v;
        }
        if let Some(v) = routing.curvature {
            target.curvature = v;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.height {
            config.render.height = v;
        }
        if let Some(v) = render.padding {
            config.render.padding = v.max(0.0);
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_routing_constants() {
        let config = Config::default();
        assert_eq!(config.routing.resolution, 8);
        assert_eq!(config.routing.attachment_radius, 10.0);
        assert_eq!(config.routing.crossing_penalty, 50.0);
        assert_eq!(config.routing.throttle_ms, 16);
        assert_eq!(config.layout.base_radius, 250.0);
        assert_eq!(config.layout.node_width, 120.0);
        assert_eq!(config.layout.node_height, 60.0);
    }

    #[test]
    fn partial_override_keeps_defaults() {
        let config = parse_config(
            r##"{
                "theme": "light",
                "themeVariables": { "transitionColor": "#00ff00", "hubBorder": "#ff8800" },
                "routing": { "resolution": 4, "throttleMs": 33 },
                "layout": { "baseRadius": 180 }
            }"##,
        )
        .unwrap();
        assert_eq!(config.routing.resolution, 4);
        assert_eq!(config.routing.throttle_ms, 33);
        assert_eq!(config.routing.attachment_radius, 10.0);
        assert_eq!(config.layout.base_radius, 180.0);
        assert_eq!(config.layout.center_x, 400.0);
        assert_eq!(config.theme.transition_color, "#00ff00");
        assert_eq!(config.theme.hub_border, "#ff8800");
        assert_eq!(config.theme.hub_fill, Theme::light().hub_fill);
        assert_eq!(config.render.background, Theme::light().background);
    }

    #[test]
    fn json5_config_is_accepted() {
        let config = parse_config(
            r#"{
                // coarser search for very large crates of records
                routing: { resolution: 2, },
            }"#,
        )
        .unwrap();
        assert_eq!(config.routing.resolution, 2);
    }

    #[test]
    fn zero_resolution_is_clamped() {
        let config = parse_config(r#"{ "routing": { "resolution": 0 } }"#).unwrap();
        assert_eq!(config.routing.resolution, 1);
    }

    #[test]
    fn garbage_config_is_rejected() {
        assert!(parse_config("not a config").is_err());
    }
}
