use crate::adapter::{EdgeView, Marker, NodeView, Scene, Viewport};
use crate::config::RenderConfig;
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

const CORNER_RADIUS: f32 = 8.0;
const AVATAR_RADIUS: f32 = 22.0;
const EDGE_LABEL_SIZE: f32 = 11.0;

/// Draws the scene into a `config.width` x `config.height` canvas with the
/// given viewport applied to every node and edge.
pub fn render_svg(scene: &Scene, viewport: Viewport, theme: &Theme, config: &RenderConfig) -> String {
    let width = config.width.max(1.0);
    let height = config.height.max(1.0);
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        escape_xml(&config.background)
    ));
    svg.push_str("<defs>");
    svg.push_str(&format!(
        "<marker id=\"arrowclosed\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"8\" markerHeight=\"8\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{}\"/></marker>",
        escape_xml(&theme.parent_edge_color)
    ));
    svg.push_str("</defs>");
    svg.push_str(&format!(
        "<g transform=\"translate({:.2} {:.2}) scale({:.4})\">",
        viewport.x, viewport.y, viewport.zoom
    ));

    for edge in &scene.edges {
        svg.push_str(&edge_svg(edge, theme));
    }
    for node in &scene.nodes {
        svg.push_str(&node_svg(node, theme, config));
    }

    svg.push_str("</g></svg>");
    svg
}

fn edge_svg(edge: &EdgeView, theme: &Theme) -> String {
    let mut out = String::new();
    let dash = edge
        .dash
        .map(|dash| format!(" stroke-dasharray=\"{dash}\""))
        .unwrap_or_default();
    let marker = match edge.marker {
        Marker::ArrowClosed => " marker-end=\"url(#arrowclosed)\"",
        Marker::None => "",
    };
    out.push_str(&format!(
        "<path id=\"{}\" class=\"edge edge-{}\" d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"{dash}{marker}/>",
        escape_xml(&edge.id),
        kind_class(edge),
        edge.path,
        escape_xml(&edge.stroke),
        edge.stroke_width,
    ));
    if let Some(label) = &edge.label {
        out.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" dy=\"-4\" font-family=\"{}\" font-size=\"{EDGE_LABEL_SIZE}\" fill=\"{}\">{}</text>",
            edge.label_at.0,
            edge.label_at.1,
            escape_xml(&theme.font_family),
            escape_xml(&theme.edge_label_color),
            escape_xml(label)
        ));
    }
    out
}

fn kind_class(edge: &EdgeView) -> &'static str {
    if edge.selectable { "union" } else { "parent" }
}

fn node_svg(node: &NodeView, theme: &Theme, config: &RenderConfig) -> String {
    let mut out = String::new();
    let gender = serde_json::to_value(node.gender)
        .ok()
        .and_then(|value| value.as_str().map(str::to_string))
        .unwrap_or_default();
    let deceased = if node.deceased { " person-deceased" } else { "" };
    out.push_str(&format!(
        "<g id=\"node-{}\" class=\"person person-{gender}{deceased}\">",
        escape_xml(&node.id)
    ));
    out.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{CORNER_RADIUS}\" ry=\"{CORNER_RADIUS}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1.5\"/>",
        node.x,
        node.y,
        node.width,
        node.height,
        escape_xml(&node.fill),
        escape_xml(&theme.node_border)
    ));
    if node.deceased {
        // Corner ribbon across the top-right.
        let right = node.x + node.width;
        out.push_str(&format!(
            "<path d=\"M {:.2} {:.2} L {:.2} {:.2} L {:.2} {:.2} Z\" fill=\"{}\"/>",
            right - 28.0,
            node.y,
            right,
            node.y,
            right,
            node.y + 28.0,
            escape_xml(&theme.deceased_ribbon)
        ));
    }

    let cx = node.x + node.width / 2.0;
    let avatar_cy = node.y + 12.0 + AVATAR_RADIUS;
    match &node.photo_url {
        Some(url) => out.push_str(&format!(
            "<image href=\"{}\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" preserveAspectRatio=\"xMidYMid slice\"/>",
            escape_xml(url),
            cx - AVATAR_RADIUS,
            avatar_cy - AVATAR_RADIUS,
            AVATAR_RADIUS * 2.0,
            AVATAR_RADIUS * 2.0
        )),
        None => {
            out.push_str(&format!(
                "<circle cx=\"{cx:.2}\" cy=\"{avatar_cy:.2}\" r=\"{AVATAR_RADIUS}\" fill=\"{}\"/>",
                escape_xml(&theme.avatar_fill)
            ));
            out.push_str(&text_svg(cx, avatar_cy + theme.font_size * 0.35, &node.initials, theme.font_size, &theme.muted_text_color, theme));
        }
    }

    let line_height = theme.font_size * config.label_line_height;
    let mut y = avatar_cy + AVATAR_RADIUS + line_height;
    let name = match &node.maiden {
        Some(maiden) => format!("{}{maiden}", node.name),
        None => node.name.clone(),
    };
    out.push_str(&text_svg(cx, y, &name, theme.font_size, &theme.text_color, theme));
    let small = theme.font_size * 0.85;
    for line in [&node.lifespan, &node.occupation].into_iter().flatten() {
        y += line_height;
        out.push_str(&text_svg(cx, y, line, small, &theme.muted_text_color, theme));
    }
    out.push_str("</g>");
    out
}

fn text_svg(x: f32, y: f32, text: &str, size: f32, fill: &str, theme: &Theme) -> String {
    format!(
        "<text x=\"{x:.2}\" y=\"{y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{size:.1}\" fill=\"{}\">{}</text>",
        escape_xml(&theme.font_family),
        escape_xml(fill),
        escape_xml(text)
    )
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{svg}");
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .ok_or_else(|| anyhow::anyhow!("invalid canvas size {}x{}", render_cfg.width, render_cfg.height))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
