use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Every person occupies a fixed box of this size.
    pub node_width: f32,
    pub node_height: f32,
    /// Minimum gap between neighbouring boxes in one rank.
    pub node_spacing: f32,
    /// Minimum gap between consecutive ranks.
    pub rank_spacing: f32,
    /// Median sweeps (down + up) used for crossing reduction.
    pub order_passes: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 200.0,
            node_height: 150.0,
            node_spacing: 80.0,
            rank_spacing: 150.0,
            order_passes: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
    pub fit_padding: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub label_line_height: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: "#FFFFFF".to_string(),
            fit_padding: 0.2,
            min_zoom: 0.1,
            max_zoom: 2.0,
            label_line_height: 1.4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::classic();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    background: Option<String>,
    text_color: Option<String>,
    muted_text_color: Option<String>,
    node_border: Option<String>,
    male_fill: Option<String>,
    female_fill: Option<String>,
    other_fill: Option<String>,
    parent_edge_color: Option<String>,
    union_ongoing_color: Option<String>,
    union_inactive_color: Option<String>,
    edge_label_color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    node_width: Option<f32>,
    node_height: Option<f32>,
    node_spacing: Option<f32>,
    rank_spacing: Option<f32>,
    order_passes: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    width: Option<f32>,
    height: Option<f32>,
    fit_padding: Option<f32>,
    min_zoom: Option<f32>,
    max_zoom: Option<f32>,
    label_line_height: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    render: Option<RenderConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "modern" {
            config.theme = Theme::modern();
        } else if theme_name == "classic" || theme_name == "default" {
            config.theme = Theme::classic();
        } else {
            tracing::warn!(theme = theme_name, "unknown theme preset, keeping default");
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.muted_text_color {
            config.theme.muted_text_color = v;
        }
        if let Some(v) = vars.node_border {
            config.theme.node_border = v;
        }
        if let Some(v) = vars.male_fill {
            config.theme.male_fill = v.clone();
            config.theme.minimap_male = v;
        }
        if let Some(v) = vars.female_fill {
            config.theme.female_fill = v.clone();
            config.theme.minimap_other = v;
        }
        if let Some(v) = vars.other_fill {
            config.theme.other_fill = v;
        }
        if let Some(v) = vars.parent_edge_color {
            config.theme.parent_edge_color = v;
        }
        if let Some(v) = vars.union_ongoing_color {
            config.theme.union_ongoing_color = v;
        }
        if let Some(v) = vars.union_inactive_color {
            config.theme.union_inactive_color = v;
        }
        if let Some(v) = vars.edge_label_color {
            config.theme.edge_label_color = v;
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.node_width {
            config.layout.node_width = v.max(1.0);
        }
        if let Some(v) = layout.node_height {
            config.layout.node_height = v.max(1.0);
        }
        if let Some(v) = layout.node_spacing {
            config.layout.node_spacing = v.max(0.0);
        }
        if let Some(v) = layout.rank_spacing {
            config.layout.rank_spacing = v.max(0.0);
        }
        if let Some(v) = layout.order_passes {
            config.layout.order_passes = v;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.height {
            config.render.height = v;
        }
        if let Some(v) = render.fit_padding {
            config.render.fit_padding = v.max(0.0);
        }
        if let Some(v) = render.min_zoom {
            config.render.min_zoom = v;
        }
        if let Some(v) = render.max_zoom {
            config.render.max_zoom = v;
        }
        if let Some(v) = render.label_line_height {
            config.render.label_line_height = v;
        }
    }
    if config.render.max_zoom < config.render.min_zoom {
        config.render.max_zoom = config.render.min_zoom;
    }

    config.render.background = config.theme.background.clone();

    Ok(config)
}
