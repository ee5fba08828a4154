use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use family_tree_layout::adapter::build_scene;
use family_tree_layout::config::LayoutConfig;
use family_tree_layout::layout::compute_layout;
use family_tree_layout::model::{FamilyGraph, ParentOf, Person, Union};
use family_tree_layout::session::Session;
use family_tree_layout::store::MemoryStore;
use family_tree_layout::theme::Theme;
use futures::executor::block_on;
use std::hint::black_box;

/// `generations` levels, each couple having `children` kids who each marry
/// someone from outside the tree.
fn synthetic_tree(generations: usize, children: usize) -> FamilyGraph {
    let mut graph = FamilyGraph::new();
    let mut next = 0usize;
    let mut person = |graph: &mut FamilyGraph| {
        let id = format!("p{next}");
        next += 1;
        graph.nodes.push(Person::new(id.clone()));
        id
    };

    let root_a = person(&mut graph);
    let root_b = person(&mut graph);
    graph.unions.push(Union::new(&root_a, &root_b));
    let mut couples = vec![(root_a, root_b)];

    for _ in 1..generations {
        let mut next_couples = Vec::new();
        for (a, b) in &couples {
            for _ in 0..children {
                let child = person(&mut graph);
                graph.parent_of.push(ParentOf::new(a, &child));
                graph.parent_of.push(ParentOf::new(b, &child));
                let spouse = person(&mut graph);
                graph.unions.push(Union::new(&child, &spouse));
                next_couples.push((child, spouse));
            }
        }
        couples = next_couples;
    }
    graph
}

fn fixture() -> FamilyGraph {
    let input = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/benches/fixtures/three_generations.json5"
    ));
    FamilyGraph::from_json(input).expect("bench fixture parses")
}

fn bench_layout(c: &mut Criterion) {
    let config = LayoutConfig::default();
    let mut group = c.benchmark_group("layout");
    group.bench_function("three_generations", |b| {
        let graph = fixture();
        b.iter(|| compute_layout(black_box(&graph), &config))
    });
    for (generations, children) in [(3, 3), (4, 3), (5, 2)] {
        let graph = synthetic_tree(generations, children);
        group.bench_with_input(
            BenchmarkId::new("synthetic", graph.nodes.len()),
            &graph,
            |b, graph| b.iter(|| compute_layout(black_box(graph), &config)),
        );
    }
    group.finish();
}

fn bench_scene(c: &mut Criterion) {
    let graph = synthetic_tree(4, 3);
    let layout = compute_layout(&graph, &LayoutConfig::default());
    let theme = Theme::classic();
    c.bench_function("scene/synthetic", |b| {
        b.iter(|| build_scene(black_box(&graph), &layout, &theme))
    });
}

fn bench_reload(c: &mut Criterion) {
    let graph = synthetic_tree(4, 3);
    let mut session = Session::new(MemoryStore::with_graph(graph), LayoutConfig::default());
    c.bench_function("session/reload", |b| b.iter(|| block_on(session.reload())));
}

criterion_group!(benches, bench_layout, bench_scene, bench_reload);
criterion_main!(benches);
