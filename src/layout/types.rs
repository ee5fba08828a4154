use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::Position;

/// Anchor point on a node box. Parent edges leave the bottom and enter the
/// top; union edges leave the right side and enter the left side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    Top,
    Bottom,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Parent,
    Union,
}

impl EdgeKind {
    pub fn handles(self) -> (Handle, Handle) {
        match self {
            Self::Parent => (Handle::Bottom, Handle::Top),
            Self::Union => (Handle::Right, Handle::Left),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeLayout {
    pub id: String,
    /// Top-left corner.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub rank: usize,
    /// Index inside the rank after crossing reduction.
    pub order: usize,
    /// True when `x`/`y` come from a persisted position.
    pub pinned: bool,
}

impl NodeLayout {
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn handle_point(&self, handle: Handle) -> (f32, f32) {
        let (cx, cy) = self.center();
        match handle {
            Handle::Top => (cx, self.y),
            Handle::Bottom => (cx, self.y + self.height),
            Handle::Left => (self.x, cy),
            Handle::Right => (self.x + self.width, cy),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLayout {
    pub id: String,
    pub kind: EdgeKind,
    pub from: String,
    pub to: String,
    pub source_handle: Handle,
    pub target_handle: Handle,
    pub points: Vec<(f32, f32)>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TreeLayout {
    pub nodes: BTreeMap<String, NodeLayout>,
    pub edges: Vec<EdgeLayout>,
    pub width: f32,
    pub height: f32,
}

impl TreeLayout {
    pub(crate) fn assemble(nodes: BTreeMap<String, NodeLayout>, mut edges: Vec<EdgeLayout>) -> Self {
        for edge in &mut edges {
            route_edge(edge, &nodes);
        }
        let mut layout = Self {
            nodes,
            edges,
            width: 0.0,
            height: 0.0,
        };
        layout.update_extent();
        layout
    }

    pub fn node(&self, id: &str) -> Option<&NodeLayout> {
        self.nodes.get(id)
    }

    pub fn position(&self, id: &str) -> Option<Position> {
        self.nodes.get(id).map(NodeLayout::position)
    }

    /// Moves a node's box, marks it pinned and re-anchors the edges touching it.
    ///
    /// Returns false when the node is not part of the layout.
    pub fn move_node(&mut self, id: &str, position: Position) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        node.x = position.x;
        node.y = position.y;
        node.pinned = true;
        for edge in self.edges.iter_mut().filter(|e| e.from == id || e.to == id) {
            route_edge(edge, &self.nodes);
        }
        self.update_extent();
        true
    }

    /// `(min_x, min_y, max_x, max_y)` over every node box, or `None` when empty.
    pub fn bounds(&self) -> Option<(f32, f32, f32, f32)> {
        let mut iter = self.nodes.values();
        let first = iter.next()?;
        let mut bounds = (
            first.x,
            first.y,
            first.x + first.width,
            first.y + first.height,
        );
        for node in iter {
            bounds.0 = bounds.0.min(node.x);
            bounds.1 = bounds.1.min(node.y);
            bounds.2 = bounds.2.max(node.x + node.width);
            bounds.3 = bounds.3.max(node.y + node.height);
        }
        Some(bounds)
    }

    fn update_extent(&mut self) {
        let (width, height) = match self.bounds() {
            Some((min_x, min_y, max_x, max_y)) => (max_x - min_x, max_y - min_y),
            None => (0.0, 0.0),
        };
        self.width = width;
        self.height = height;
    }
}

fn route_edge(edge: &mut EdgeLayout, nodes: &BTreeMap<String, NodeLayout>) {
    let (Some(source), Some(target)) = (nodes.get(&edge.from), nodes.get(&edge.to)) else {
        edge.points.clear();
        return;
    };
    edge.points = vec![
        source.handle_point(edge.source_handle),
        target.handle_point(edge.target_handle),
    ];
}
