use family_tree_layout::adapter::{Marker, build_scene};
use family_tree_layout::config::LayoutConfig;
use family_tree_layout::index::relationships;
use family_tree_layout::model::{ParentOf, ParentType, Person, Position, Union, UnionInput, UnionStatus};
use family_tree_layout::session::{LoadState, Selection, Session};
use family_tree_layout::store::{MemoryStore, StoreOp};
use family_tree_layout::theme::Theme;
use family_tree_layout::{FamilyGraph, GraphStore};
use futures::executor::block_on;
use std::rc::Rc;

fn session_with(graph: FamilyGraph) -> Session<MemoryStore> {
    let mut session = Session::new(MemoryStore::with_graph(graph), LayoutConfig::default());
    block_on(session.reload());
    assert_eq!(session.load_state(), &LoadState::Loaded);
    session
}

#[test]
fn married_couple_with_child() {
    let session = session_with(FamilyGraph {
        nodes: vec![Person::new("A"), Person::new("B"), Person::new("C")],
        parent_of: vec![ParentOf::new("A", "C").with_type(ParentType::Biological)],
        unions: vec![Union::new("A", "B").with_status(UnionStatus::Ongoing)],
    });
    let layout = session.layout();
    assert_eq!(layout.nodes["A"].rank, 0);
    assert_eq!(layout.nodes["B"].rank, 0);
    assert_eq!(layout.nodes["C"].rank, 1);

    let scene = build_scene(session.graph(), layout, &Theme::classic());
    let union = scene.edge("union-A-B").expect("union edge");
    assert_eq!(union.dash, None);
    assert_eq!(union.stroke, Theme::classic().union_ongoing_color);
    assert_eq!(scene.edge("parent-A-C").map(|e| e.marker), Some(Marker::ArrowClosed));
}

#[test]
fn dragged_position_survives_reload() {
    let mut session = session_with(FamilyGraph {
        nodes: vec![Person::new("A"), Person::new("K1"), Person::new("K2")],
        parent_of: vec![ParentOf::new("A", "K1"), ParentOf::new("A", "K2")],
        unions: Vec::new(),
    });

    session.start_drag("A");
    session.drag_to(Position::new(200.0, 90.0));
    block_on(session.end_drag(Position::new(320.0, 140.0)));

    let saves = session.store().calls_of(StoreOp::SetPersonPosition);
    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0].target.as_deref(), Some("A"));
    assert_eq!(saves[0].position, Some(Position::new(320.0, 140.0)));

    block_on(session.reload());
    let a = session.layout().node("A").expect("A laid out");
    assert!(a.pinned);
    assert_eq!(a.position(), Position::new(320.0, 140.0));
    assert_eq!(session.layout().nodes["K1"].rank, 1);
}

#[test]
fn deleting_a_selected_parent_leaves_a_dangling_link_out_of_the_index() {
    let mut session = session_with(FamilyGraph {
        nodes: vec![Person::named("P", "Pat", "Doe"), Person::named("C", "Cam", "Doe")],
        parent_of: vec![ParentOf::new("P", "C")],
        unions: Vec::new(),
    });
    session.activate_node("P");
    session.request_delete_selected();
    block_on(session.confirm_delete()).unwrap();

    assert!(session.modal().is_none());
    assert_eq!(session.selection(), &Selection::None);
    assert!(!session.graph().contains("P"));
    // The store does not cascade, so the link is still in the snapshot.
    assert_eq!(session.graph().parent_of.len(), 1);
    assert!(relationships(session.graph(), "C").is_empty());
    assert!(session.layout().edges.is_empty());
}

#[test]
fn divorced_union_renders_as_ended() {
    let mut session = session_with(FamilyGraph {
        nodes: vec![Person::new("P"), Person::new("Q")],
        ..FamilyGraph::default()
    });
    session.open_context_menu("P", 40.0, 40.0);
    session.choose_context_action(family_tree_layout::session::ContextAction::AddSpouse);
    let input = UnionInput {
        status: Some(UnionStatus::Divorced),
        ..UnionInput::between("P", "Q")
    };
    block_on(session.submit_union(input)).unwrap();
    assert!(session.modal().is_none());

    let scene = build_scene(session.graph(), session.layout(), &Theme::classic());
    let edge = scene.edge("union-P-Q").expect("union edge");
    assert_eq!(edge.dash, Some("5,5"));
    assert_ne!(edge.stroke, Theme::classic().union_ongoing_color);
}

#[test]
fn stale_reload_cannot_overwrite_a_newer_one() {
    let store = MemoryStore::with_graph(FamilyGraph {
        nodes: vec![Person::new("old")],
        ..FamilyGraph::default()
    });
    let mut session = Session::new(store, LayoutConfig::default());

    let slow = session.begin_load();
    let slow_result = block_on(session.store().get_graph());
    block_on(session.store().create_person(&Default::default())).unwrap();
    block_on(session.reload());
    let newest = session.graph().clone();

    assert!(!session.finish_load(slow, slow_result));
    assert_eq!(session.graph(), &newest);
    assert_eq!(session.graph().nodes.len(), 2);
}

#[test]
fn position_saves_stay_in_flight_while_the_user_keeps_clicking() {
    let store = Rc::new(MemoryStore::with_graph(FamilyGraph {
        nodes: vec![Person::new("A"), Person::new("B"), Person::new("C")],
        ..FamilyGraph::default()
    }));
    let mut session = Session::new(Rc::clone(&store), LayoutConfig::default());
    block_on(session.reload());

    session.start_drag("A");
    let first = session.finish_drag(Position::new(10.0, 20.0)).expect("drag A");
    session.start_drag("B");
    let second = session.finish_drag(Position::new(640.0, 20.0)).expect("drag B");
    let first_write = first.persist(&store);
    let second_write = second.persist(&store);

    session.activate_node("C");
    assert_eq!(session.selection(), &Selection::Person("C".to_string()));
    assert!(store.calls_of(StoreOp::SetPersonPosition).is_empty());

    block_on(async { futures::join!(first_write, second_write) });
    let targets: Vec<_> = store
        .calls_of(StoreOp::SetPersonPosition)
        .into_iter()
        .filter_map(|call| call.target)
        .collect();
    assert_eq!(targets, vec!["A".to_string(), "B".to_string()]);

    block_on(session.reload());
    assert_eq!(session.layout().position("B"), Some(Position::new(640.0, 20.0)));
}

#[test]
fn a_borrowed_store_drives_a_session() {
    let store = MemoryStore::with_graph(FamilyGraph {
        nodes: vec![Person::new("solo")],
        ..FamilyGraph::default()
    });
    let mut session = Session::new(&store, LayoutConfig::default());
    block_on(session.reload());
    assert_eq!(session.load_state(), &LoadState::Loaded);
    assert_eq!(store.calls_of(StoreOp::GetGraph).len(), 1);
}
