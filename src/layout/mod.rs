//! Layered top-to-bottom layout of the parent-of hierarchy.
//!
//! Union edges never influence placement; they are drawn between whatever
//! positions the hierarchy produced. Nodes carrying a persisted position keep
//! it verbatim but still take part in ranking and ordering.

mod position;
mod ranking;
pub(crate) mod types;
pub use types::*;
use position::*;
use ranking::*;

use crate::config::LayoutConfig;
use crate::model::FamilyGraph;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, instrument, warn};

/// Computes node boxes and edge anchors for one snapshot.
///
/// Pure: every working structure lives for the duration of this call, so
/// concurrent or repeated calls cannot observe each other.
#[instrument(skip_all, fields(nodes = graph.nodes.len(), parent_edges = graph.parent_of.len()))]
pub fn compute_layout(graph: &FamilyGraph, config: &LayoutConfig) -> TreeLayout {
    let mut seen: HashSet<&str> = HashSet::new();
    let node_ids: Vec<String> = graph
        .nodes
        .iter()
        .filter(|person| seen.insert(person.id.as_str()))
        .map(|person| person.id.clone())
        .collect();
    if node_ids.len() != graph.nodes.len() {
        warn!(
            duplicates = graph.nodes.len() - node_ids.len(),
            "duplicate person ids in snapshot; keeping first occurrence"
        );
    }
    if node_ids.is_empty() {
        return TreeLayout::default();
    }

    let hierarchy_edges = hierarchy_edges(graph, &seen);
    let ranking = compute_ranks(&node_ids, &hierarchy_edges);
    if ranking.cyclic {
        warn!("parent-of edges contain a cycle; layering falls back to declaration order");
    }
    let ranks = ranking.ranks;

    let max_rank = ranks.values().copied().max().unwrap_or(0);
    let mut rank_nodes: Vec<Vec<String>> = vec![Vec::new(); max_rank + 1];
    for node_id in &node_ids {
        let rank = ranks.get(node_id).copied().unwrap_or(0);
        rank_nodes[rank].push(node_id.clone());
    }

    order_rank_nodes(&mut rank_nodes, &hierarchy_edges, &node_ids, config.order_passes);

    let centers = assign_centers(&rank_nodes, &hierarchy_edges, &ranks, config);
    let min_center = centers.values().copied().fold(f32::INFINITY, f32::min);
    let shift_x = if min_center.is_finite() {
        config.node_width / 2.0 - min_center
    } else {
        0.0
    };
    let rank_step = config.node_height + config.rank_spacing;

    let mut nodes: BTreeMap<String, NodeLayout> = BTreeMap::new();
    for (rank, bucket) in rank_nodes.iter().enumerate() {
        for (order, id) in bucket.iter().enumerate() {
            let center_x = centers.get(id).copied().unwrap_or(0.0) + shift_x;
            let center_y = config.node_height / 2.0 + rank as f32 * rank_step;
            let persisted = graph.person(id).and_then(|person| person.position);
            let (x, y) = match persisted {
                Some(pos) => (pos.x, pos.y),
                None => (
                    center_x - config.node_width / 2.0,
                    center_y - config.node_height / 2.0,
                ),
            };
            nodes.insert(
                id.clone(),
                NodeLayout {
                    id: id.clone(),
                    x,
                    y,
                    width: config.node_width,
                    height: config.node_height,
                    rank,
                    order,
                    pinned: persisted.is_some(),
                },
            );
        }
    }

    let edges = display_edges(graph, &seen);
    debug!(
        ranks = rank_nodes.len(),
        pinned = nodes.values().filter(|node| node.pinned).count(),
        edges = edges.len(),
        "layout computed"
    );
    TreeLayout::assemble(nodes, edges)
}

/// Parent-of edges that can shape the hierarchy: both endpoints known, no
/// self-loops, no duplicates.
fn hierarchy_edges(graph: &FamilyGraph, known: &HashSet<&str>) -> Vec<(String, String)> {
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    graph
        .parent_of
        .iter()
        .filter(|rel| rel.parent_id != rel.child_id)
        .filter(|rel| known.contains(rel.parent_id.as_str()) && known.contains(rel.child_id.as_str()))
        .filter(|rel| seen.insert((rel.parent_id.as_str(), rel.child_id.as_str())))
        .map(|rel| (rel.parent_id.clone(), rel.child_id.clone()))
        .collect()
}

fn display_edges(graph: &FamilyGraph, known: &HashSet<&str>) -> Vec<EdgeLayout> {
    let connects = |a: &str, b: &str| a != b && known.contains(a) && known.contains(b);
    let parent_edges = graph
        .parent_of
        .iter()
        .filter(|rel| connects(rel.parent_id.as_str(), rel.child_id.as_str()))
        .map(|rel| new_edge(rel.edge_id(), EdgeKind::Parent, &rel.parent_id, &rel.child_id));
    let union_edges = graph
        .unions
        .iter()
        .filter(|union| connects(union.person1_id.as_str(), union.person2_id.as_str()))
        .map(|union| {
            new_edge(
                union.edge_id(),
                EdgeKind::Union,
                &union.person1_id,
                &union.person2_id,
            )
        });
    parent_edges.chain(union_edges).collect()
}

fn new_edge(id: String, kind: EdgeKind, from: &str, to: &str) -> EdgeLayout {
    let (source_handle, target_handle) = kind.handles();
    EdgeLayout {
        id,
        kind,
        from: from.to_string(),
        to: to.to_string(),
        source_handle,
        target_handle,
        points: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ParentOf, Person, Position, Union};

    fn graph(nodes: &[&str], parent_of: &[(&str, &str)]) -> FamilyGraph {
        FamilyGraph {
            nodes: nodes.iter().map(|id| Person::new(*id)).collect(),
            parent_of: parent_of
                .iter()
                .map(|(parent, child)| ParentOf::new(*parent, *child))
                .collect(),
            unions: Vec::new(),
        }
    }

    #[test]
    fn empty_graph_has_empty_layout() {
        let layout = compute_layout(&FamilyGraph::new(), &LayoutConfig::default());
        assert!(layout.nodes.is_empty());
        assert_eq!(layout.width, 0.0);
    }

    #[test]
    fn couple_with_child_is_two_ranks() {
        let mut g = graph(&["a", "b", "c"], &[("a", "c")]);
        g.unions.push(Union::new("a", "b"));
        let layout = compute_layout(&g, &LayoutConfig::default());
        assert_eq!(layout.nodes["a"].rank, 0);
        assert_eq!(layout.nodes["b"].rank, 0);
        assert_eq!(layout.nodes["c"].rank, 1);
        assert_eq!(layout.nodes["a"].y, 0.0);
        assert_eq!(layout.nodes["c"].y, 300.0);
        let leftmost = layout.nodes.values().map(|n| n.x).fold(f32::INFINITY, f32::min);
        assert_eq!(leftmost, 0.0);

        let union = layout.edges.iter().find(|e| e.kind == EdgeKind::Union).unwrap();
        assert_eq!(union.source_handle, Handle::Right);
        assert_eq!(union.target_handle, Handle::Left);
        let parent = layout.edges.iter().find(|e| e.kind == EdgeKind::Parent).unwrap();
        let a = &layout.nodes["a"];
        assert_eq!(parent.points[0], (a.x + 100.0, a.y + 150.0));
    }

    #[test]
    fn rank_neighbours_respect_node_separation() {
        let g = graph(&["p", "c1", "c2", "c3"], &[("p", "c1"), ("p", "c2"), ("p", "c3")]);
        let config = LayoutConfig::default();
        let layout = compute_layout(&g, &config);
        let mut xs: Vec<f32> = ["c1", "c2", "c3"].iter().map(|id| layout.nodes[*id].x).collect();
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        for pair in xs.windows(2) {
            assert!(pair[1] - pair[0] >= config.node_width + config.node_spacing - 1e-3);
        }
    }

    #[test]
    fn persisted_position_wins_but_node_still_ranks() {
        let mut g = graph(&["a", "c1", "c2"], &[("a", "c1"), ("a", "c2")]);
        g.nodes[0].position = Some(Position::new(320.0, 140.0));
        let layout = compute_layout(&g, &LayoutConfig::default());
        let a = &layout.nodes["a"];
        assert!(a.pinned);
        assert_eq!((a.x, a.y), (320.0, 140.0));
        assert_eq!(layout.nodes["c1"].rank, 1);
        assert!(!layout.nodes["c1"].pinned);
    }

    #[test]
    fn dangling_and_self_edges_are_ignored() {
        let mut g = graph(&["a", "b"], &[("ghost", "a"), ("a", "a"), ("a", "b")]);
        g.unions.push(Union::new("a", "ghost"));
        let layout = compute_layout(&g, &LayoutConfig::default());
        assert_eq!(layout.nodes["a"].rank, 0);
        assert_eq!(layout.nodes["b"].rank, 1);
        assert_eq!(layout.edges.len(), 1);
    }

    #[test]
    fn moving_a_node_reanchors_its_edges() {
        let g = graph(&["a", "b"], &[("a", "b")]);
        let mut layout = compute_layout(&g, &LayoutConfig::default());
        assert!(!layout.nodes["b"].pinned);
        assert!(layout.move_node("b", Position::new(500.0, 600.0)));
        assert!(layout.nodes["b"].pinned);
        assert_eq!(layout.edges[0].points[1], (600.0, 600.0));
        assert!(!layout.move_node("missing", Position::new(0.0, 0.0)));
    }
}
