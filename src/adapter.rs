//! Turns a snapshot plus its layout into descriptors a renderer can draw.

use serde::Serialize;

use crate::config::RenderConfig;
use crate::layout::{EdgeKind, EdgeLayout, Handle, NodeLayout, TreeLayout};
use crate::model::{FamilyGraph, Gender, ParentType, Person, UnionStatus};
use crate::text_metrics;
use crate::theme::Theme;

/// Horizontal room the name gets inside the node box.
const NAME_PADDING: f32 = 24.0;
const EDGE_STROKE_WIDTH: f32 = 2.0;
const ENDED_DASH: &str = "5,5";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GenderClass {
    Male,
    Female,
    Other,
}

impl From<Gender> for GenderClass {
    fn from(gender: Gender) -> Self {
        match gender {
            Gender::Male => Self::Male,
            Gender::Female => Self::Female,
            Gender::Other | Gender::Unspecified => Self::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Full name, shortened with an ellipsis when it would overflow the box.
    pub name: String,
    /// " (Maiden)" suffix shown after the name.
    pub maiden: Option<String>,
    pub initials: String,
    pub lifespan: Option<String>,
    pub occupation: Option<String>,
    pub gender: GenderClass,
    pub deceased: bool,
    pub photo_url: Option<String>,
    pub fill: String,
    pub minimap_color: String,
    pub pinned: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Marker {
    None,
    ArrowClosed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeView {
    pub id: String,
    pub kind: EdgeKind,
    pub from: String,
    pub to: String,
    pub source_handle: Handle,
    pub target_handle: Handle,
    pub stroke: String,
    pub stroke_width: f32,
    pub dash: Option<&'static str>,
    pub marker: Marker,
    pub label: Option<String>,
    /// SVG path data between the two handles.
    pub path: String,
    pub label_at: (f32, f32),
    /// Only union edges open a detail view.
    pub selectable: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Scene {
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
}

impl Scene {
    pub fn node(&self, id: &str) -> Option<&NodeView> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&EdgeView> {
        self.edges.iter().find(|edge| edge.id == id)
    }

    pub fn bounds(&self) -> Option<(f32, f32, f32, f32)> {
        let mut iter = self.nodes.iter();
        let first = iter.next()?;
        let init = (first.x, first.y, first.x + first.width, first.y + first.height);
        Some(iter.fold(init, |acc, node| {
            (
                acc.0.min(node.x),
                acc.1.min(node.y),
                acc.2.max(node.x + node.width),
                acc.3.max(node.y + node.height),
            )
        }))
    }
}

/// Pan and zoom applied to the scene: screen = scene * zoom + (x, y).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub zoom: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

pub fn build_scene(graph: &FamilyGraph, layout: &TreeLayout, theme: &Theme) -> Scene {
    let nodes = layout
        .nodes
        .values()
        .filter_map(|node| {
            let person = graph.person(&node.id)?;
            Some(node_view(person, node, theme))
        })
        .collect();
    let edges = layout
        .edges
        .iter()
        .filter(|edge| edge.points.len() >= 2)
        .filter_map(|edge| edge_view(graph, edge, theme))
        .collect();
    Scene { nodes, edges }
}

fn node_view(person: &Person, node: &NodeLayout, theme: &Theme) -> NodeView {
    let gender = GenderClass::from(person.gender);
    let fill = match gender {
        GenderClass::Male => &theme.male_fill,
        GenderClass::Female => &theme.female_fill,
        GenderClass::Other => &theme.other_fill,
    };
    let minimap_color = if gender == GenderClass::Male {
        &theme.minimap_male
    } else {
        &theme.minimap_other
    };
    let name = text_metrics::fit_text(
        &person.full_name(),
        node.width - NAME_PADDING,
        theme.font_size,
        &theme.font_family,
    );
    NodeView {
        id: node.id.clone(),
        x: node.x,
        y: node.y,
        width: node.width,
        height: node.height,
        name,
        maiden: person
            .maiden_name
            .as_deref()
            .filter(|maiden| !maiden.trim().is_empty())
            .map(|maiden| format!(" ({maiden})")),
        initials: person.initials(),
        lifespan: person.lifespan(),
        occupation: person.occupation.clone(),
        gender,
        deceased: person.is_deceased(),
        photo_url: person.photo_url.clone(),
        fill: fill.clone(),
        minimap_color: minimap_color.clone(),
        pinned: node.pinned,
    }
}

fn edge_view(graph: &FamilyGraph, edge: &EdgeLayout, theme: &Theme) -> Option<EdgeView> {
    let start = *edge.points.first()?;
    let end = *edge.points.last()?;
    let mid = ((start.0 + end.0) / 2.0, (start.1 + end.1) / 2.0);
    let base = EdgeView {
        id: edge.id.clone(),
        kind: edge.kind,
        from: edge.from.clone(),
        to: edge.to.clone(),
        source_handle: edge.source_handle,
        target_handle: edge.target_handle,
        stroke: String::new(),
        stroke_width: EDGE_STROKE_WIDTH,
        dash: None,
        marker: Marker::None,
        label: None,
        path: String::new(),
        label_at: mid,
        selectable: false,
    };

    match edge.kind {
        EdgeKind::Parent => {
            let rel = graph
                .parent_of
                .iter()
                .find(|rel| rel.parent_id == edge.from && rel.child_id == edge.to)?;
            Some(EdgeView {
                stroke: theme.parent_edge_color.clone(),
                marker: Marker::ArrowClosed,
                label: (rel.parent_type != ParentType::Biological)
                    .then(|| rel.parent_type.as_str().to_string()),
                path: bezier_path(start, end),
                ..base
            })
        }
        EdgeKind::Union => {
            let union = graph.union_by_edge_id(&edge.id)?;
            let stroke = if union.status == UnionStatus::Ongoing {
                &theme.union_ongoing_color
            } else {
                &theme.union_inactive_color
            };
            Some(EdgeView {
                stroke: stroke.clone(),
                dash: union.status.is_ended().then_some(ENDED_DASH),
                label: union.start_year().map(|year| year.to_string()),
                path: straight_path(start, end),
                selectable: true,
                ..base
            })
        }
    }
}

fn straight_path(start: (f32, f32), end: (f32, f32)) -> String {
    format!("M {:.2} {:.2} L {:.2} {:.2}", start.0, start.1, end.0, end.1)
}

/// Vertical cubic from a bottom handle into a top handle. Control points sit
/// half the vertical distance away; upward edges bend out proportionally to
/// the square root of the overshoot.
fn bezier_path(start: (f32, f32), end: (f32, f32)) -> String {
    let distance = end.1 - start.1;
    let offset = if distance >= 0.0 {
        0.5 * distance
    } else {
        0.25 * 25.0 * (-distance).sqrt()
    };
    format!(
        "M {:.2} {:.2} C {:.2} {:.2} {:.2} {:.2} {:.2} {:.2}",
        start.0,
        start.1,
        start.0,
        start.1 + offset,
        end.0,
        end.1 - offset,
        end.0,
        end.1
    )
}

/// Viewport that shows `bounds` inside a `width` x `height` screen, leaving
/// `config.fit_padding` of the fitted size as margin and keeping the zoom
/// within the configured limits.
pub fn fit_view(
    bounds: Option<(f32, f32, f32, f32)>,
    width: f32,
    height: f32,
    config: &RenderConfig,
) -> Viewport {
    let Some((min_x, min_y, max_x, max_y)) = bounds else {
        return Viewport::default();
    };
    let content_w = (max_x - min_x).max(1.0);
    let content_h = (max_y - min_y).max(1.0);
    let padded_w = content_w * (1.0 + config.fit_padding);
    let padded_h = content_h * (1.0 + config.fit_padding);
    let zoom = (width / padded_w)
        .min(height / padded_h)
        .clamp(config.min_zoom, config.max_zoom);
    let center_x = (min_x + max_x) / 2.0;
    let center_y = (min_y + max_y) / 2.0;
    Viewport {
        x: width / 2.0 - center_x * zoom,
        y: height / 2.0 - center_y * zoom,
        zoom,
    }
}
