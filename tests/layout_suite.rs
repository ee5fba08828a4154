use std::collections::HashMap;
use std::path::Path;

use family_tree_layout::adapter::{build_scene, fit_view};
use family_tree_layout::config::{LayoutConfig, RenderConfig};
use family_tree_layout::model::{ParentOf, Person, Position};
use family_tree_layout::render::render_svg;
use family_tree_layout::theme::Theme;
use family_tree_layout::{FamilyGraph, compute_layout};
use proptest::prelude::*;

fn load_fixture(name: &str) -> FamilyGraph {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let input = std::fs::read_to_string(&path).expect("fixture read failed");
    FamilyGraph::from_json(&input).expect("fixture parse failed")
}

fn assert_valid_svg(svg: &str, fixture: &str) {
    assert!(svg.contains("<svg"), "{fixture}: missing <svg tag");
    assert!(svg.contains("</svg>"), "{fixture}: missing </svg tag");
}

#[test]
fn render_all_fixtures() {
    for fixture in ["single_couple.json", "three_generations.json5"] {
        let graph = load_fixture(fixture);
        let theme = Theme::modern();
        let render = RenderConfig::default();
        let layout = compute_layout(&graph, &LayoutConfig::default());
        let scene = build_scene(&graph, &layout, &theme);
        assert_eq!(scene.nodes.len(), graph.nodes.len(), "{fixture}: node count");
        let viewport = fit_view(scene.bounds(), render.width, render.height, &render);
        assert!(viewport.zoom >= render.min_zoom && viewport.zoom <= render.max_zoom);
        assert_valid_svg(&render_svg(&scene, viewport, &theme, &render), fixture);
    }
}

#[test]
fn three_generations_layout() {
    let graph = load_fixture("three_generations.json5");
    let layout = compute_layout(&graph, &LayoutConfig::default());

    for id in ["g1", "g2", "s1", "s2"] {
        assert_eq!(layout.nodes[id].rank, 0, "{id}");
    }
    assert_eq!(layout.nodes["p1"].rank, 1);
    assert_eq!(layout.nodes["c1"].rank, 2);
    assert_eq!(layout.nodes["c1"].y, 600.0);

    let c3 = &layout.nodes["c3"];
    assert!(c3.pinned);
    assert_eq!((c3.x, c3.y), (900.0, 40.0));
    assert_eq!(c3.rank, 2);

    // The edge from the missing "ghost" parent is dropped.
    assert_eq!(layout.edges.len(), 9 + 3);

    let scene = build_scene(&graph, &layout, &Theme::classic());
    assert_eq!(scene.edge("union-p2-s2").and_then(|e| e.dash), Some("5,5"));
    assert_eq!(scene.edge("union-p1-s1").and_then(|e| e.dash), None);
    assert_eq!(
        scene.edge("parent-s1-c2").and_then(|e| e.label.as_deref()),
        Some("step")
    );
    assert_eq!(
        scene.node("p1").and_then(|n| n.maiden.as_deref()),
        Some(" (Berg)")
    );
}

fn arb_tree() -> impl Strategy<Value = (FamilyGraph, Vec<bool>)> {
    (1usize..18).prop_flat_map(|n| {
        (
            prop::collection::vec((0..n, 0..n), 0..n * 2),
            prop::collection::vec(any::<bool>(), n),
            prop::collection::vec((-2000i32..2000, -2000i32..2000), n),
        )
            .prop_map(move |(pairs, pins, coords)| {
                let nodes = (0..n)
                    .map(|idx| {
                        let mut person = Person::new(format!("p{idx}"));
                        if pins[idx] {
                            let (x, y) = coords[idx];
                            person.position = Some(Position::new(x as f32, y as f32));
                        }
                        person
                    })
                    .collect();
                // Lower index is always the parent, so the edge set is acyclic.
                let parent_of = pairs
                    .into_iter()
                    .filter(|(a, b)| a != b)
                    .map(|(a, b)| ParentOf::new(format!("p{}", a.min(b)), format!("p{}", a.max(b))))
                    .collect();
                let graph = FamilyGraph {
                    nodes,
                    parent_of,
                    unions: Vec::new(),
                };
                (graph, pins)
            })
    })
}

proptest! {
    #[test]
    fn children_rank_below_every_parent((graph, _pins) in arb_tree()) {
        let layout = compute_layout(&graph, &LayoutConfig::default());
        prop_assert_eq!(layout.nodes.len(), graph.nodes.len());
        for rel in &graph.parent_of {
            prop_assert!(layout.nodes[&rel.child_id].rank > layout.nodes[&rel.parent_id].rank);
        }
    }

    #[test]
    fn persisted_positions_are_used_verbatim((graph, pins) in arb_tree()) {
        let layout = compute_layout(&graph, &LayoutConfig::default());
        for (person, pinned) in graph.nodes.iter().zip(pins) {
            let node = &layout.nodes[&person.id];
            prop_assert_eq!(node.pinned, pinned);
            if let Some(position) = person.position {
                prop_assert_eq!(node.position(), position);
            }
        }
    }

    #[test]
    fn layout_is_deterministic((graph, _pins) in arb_tree()) {
        let config = LayoutConfig::default();
        prop_assert_eq!(compute_layout(&graph, &config), compute_layout(&graph, &config));
    }

    #[test]
    fn computed_boxes_in_a_rank_never_overlap((graph, _pins) in arb_tree()) {
        let config = LayoutConfig::default();
        let layout = compute_layout(&graph, &config);
        let mut by_rank: HashMap<usize, Vec<(usize, f32)>> = HashMap::new();
        for node in layout.nodes.values().filter(|node| !node.pinned) {
            by_rank.entry(node.rank).or_default().push((node.order, node.x));
        }
        for row in by_rank.values_mut() {
            row.sort_by_key(|(order, _)| *order);
            for pair in row.windows(2) {
                prop_assert!(pair[1].1 - pair[0].1 >= config.node_width + config.node_spacing - 0.01);
            }
        }
    }
}
