use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::model::{
    FamilyGraph, ParentOf, ParentOfInput, Person, PersonInput, Position, Union, UnionInput,
};

use super::{GraphStore, Result, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    ListPersons,
    GetGraph,
    CreatePerson,
    UpdatePerson,
    DeletePerson,
    CreateUnion,
    CreateParentOf,
    SetPersonPosition,
    ClearPersonPosition,
}

/// One journal entry: the operation plus the person it targeted, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreCall {
    pub op: StoreOp,
    pub target: Option<String>,
    pub position: Option<Position>,
}

/// In-process implementation of [`GraphStore`].
///
/// Single-threaded by construction (interior mutability through `RefCell`).
/// Deleting a person does not cascade: relationships that referenced them
/// stay behind as dangling entries.
#[derive(Debug, Default)]
pub struct MemoryStore {
    graph: RefCell<FamilyGraph>,
    next_id: Cell<u64>,
    journal: RefCell<Vec<StoreCall>>,
    failures: RefCell<HashMap<StoreOp, StoreError>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_graph(graph: FamilyGraph) -> Self {
        Self {
            graph: RefCell::new(graph),
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> FamilyGraph {
        self.graph.borrow().clone()
    }

    /// Makes every subsequent `op` fail with `error` until cleared.
    pub fn fail(&self, op: StoreOp, error: StoreError) {
        self.failures.borrow_mut().insert(op, error);
    }

    pub fn clear_failure(&self, op: StoreOp) {
        self.failures.borrow_mut().remove(&op);
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.journal.borrow().clone()
    }

    pub fn calls_of(&self, op: StoreOp) -> Vec<StoreCall> {
        self.journal
            .borrow()
            .iter()
            .filter(|call| call.op == op)
            .cloned()
            .collect()
    }

    fn record(&self, op: StoreOp, target: Option<&str>, position: Option<Position>) -> Result<()> {
        self.journal.borrow_mut().push(StoreCall {
            op,
            target: target.map(str::to_string),
            position,
        });
        match self.failures.borrow().get(&op) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn fresh_id(&self) -> String {
        let graph = self.graph.borrow();
        loop {
            let next = self.next_id.get() + 1;
            self.next_id.set(next);
            let candidate = format!("person-{next}");
            if !graph.contains(&candidate) {
                return candidate;
            }
        }
    }

    fn with_person<T>(&self, id: &str, apply: impl FnOnce(&mut Person) -> T) -> Result<T> {
        let mut graph = self.graph.borrow_mut();
        let person = graph
            .nodes
            .iter_mut()
            .find(|person| person.id == id)
            .ok_or_else(|| StoreError::api(404, "Not Found"))?;
        Ok(apply(person))
    }
}

fn require_endpoints(a: &str, b: &str, graph: &FamilyGraph) -> Result<()> {
    if a.trim().is_empty() || b.trim().is_empty() || a == b {
        return Err(StoreError::api(400, "Bad Request"));
    }
    if !graph.contains(a) || !graph.contains(b) {
        return Err(StoreError::api(404, "Not Found"));
    }
    Ok(())
}

impl GraphStore for MemoryStore {
    async fn list_persons(&self) -> Result<Vec<Person>> {
        self.record(StoreOp::ListPersons, None, None)?;
        Ok(self.graph.borrow().nodes.clone())
    }

    async fn get_graph(&self) -> Result<FamilyGraph> {
        self.record(StoreOp::GetGraph, None, None)?;
        Ok(self.snapshot())
    }

    async fn create_person(&self, input: &PersonInput) -> Result<Person> {
        self.record(StoreOp::CreatePerson, None, None)?;
        let mut person = Person::new(self.fresh_id());
        input.apply_to(&mut person);
        self.graph.borrow_mut().nodes.push(person.clone());
        Ok(person)
    }

    async fn update_person(&self, id: &str, input: &PersonInput) -> Result<Person> {
        self.record(StoreOp::UpdatePerson, Some(id), None)?;
        self.with_person(id, |person| {
            input.apply_to(person);
            person.clone()
        })
    }

    async fn delete_person(&self, id: &str) -> Result<()> {
        self.record(StoreOp::DeletePerson, Some(id), None)?;
        let mut graph = self.graph.borrow_mut();
        let before = graph.nodes.len();
        graph.nodes.retain(|person| person.id != id);
        if graph.nodes.len() == before {
            return Err(StoreError::api(404, "Not Found"));
        }
        Ok(())
    }

    async fn create_union(&self, input: &UnionInput) -> Result<Union> {
        self.record(StoreOp::CreateUnion, None, None)?;
        let mut graph = self.graph.borrow_mut();
        require_endpoints(&input.person1_id, &input.person2_id, &graph)?;
        let union = Union {
            person1_id: input.person1_id.clone(),
            person2_id: input.person2_id.clone(),
            union_id: input.union_id.clone(),
            union_type: input.union_type,
            status: input.status.unwrap_or_default(),
            start_date: input.start_date.clone(),
            end_date: input.end_date.clone(),
            place: input.place.clone(),
            notes: input.notes.clone(),
        };
        graph.unions.push(union.clone());
        Ok(union)
    }

    async fn create_parent_of(&self, input: &ParentOfInput) -> Result<ParentOf> {
        self.record(StoreOp::CreateParentOf, None, None)?;
        let mut graph = self.graph.borrow_mut();
        require_endpoints(&input.parent_id, &input.child_id, &graph)?;
        let rel = ParentOf {
            parent_id: input.parent_id.clone(),
            child_id: input.child_id.clone(),
            parent_type: input.parent_type.unwrap_or_default(),
        };
        graph.parent_of.push(rel.clone());
        Ok(rel)
    }

    async fn set_person_position(&self, id: &str, x: f32, y: f32) -> Result<Person> {
        let position = Position::new(x, y);
        self.record(StoreOp::SetPersonPosition, Some(id), Some(position))?;
        self.with_person(id, |person| {
            person.position = Some(position);
            person.clone()
        })
    }

    async fn clear_person_position(&self, id: &str) -> Result<Person> {
        self.record(StoreOp::ClearPersonPosition, Some(id), None)?;
        self.with_person(id, |person| {
            person.position = None;
            person.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn creates_people_and_relationships() {
        let store = MemoryStore::new();
        block_on(async {
            let a = store
                .create_person(&PersonInput {
                    first_name: Some("Ada".to_string()),
                    ..PersonInput::default()
                })
                .await
                .unwrap();
            let b = store.create_person(&PersonInput::default()).await.unwrap();
            assert_ne!(a.id, b.id);
            store
                .create_parent_of(&ParentOfInput::new(&a.id, &b.id))
                .await
                .unwrap();
            let err = store
                .create_union(&UnionInput::between(&a.id, "nobody"))
                .await
                .unwrap_err();
            assert_eq!(err.status(), 404);

            let graph = store.get_graph().await.unwrap();
            assert_eq!(graph.nodes.len(), 2);
            assert_eq!(graph.parent_of.len(), 1);
            assert!(graph.unions.is_empty());
        });
    }

    #[test]
    fn delete_leaves_relationships_dangling() {
        let graph = FamilyGraph {
            nodes: vec![Person::new("a"), Person::new("c")],
            parent_of: vec![ParentOf::new("a", "c")],
            unions: Vec::new(),
        };
        let store = MemoryStore::with_graph(graph);
        block_on(store.delete_person("a")).unwrap();
        let after = store.snapshot();
        assert_eq!(after.nodes.len(), 1);
        assert_eq!(after.parent_of.len(), 1);
        assert_eq!(
            block_on(store.delete_person("a")),
            Err(StoreError::api(404, "Not Found"))
        );
    }

    #[test]
    fn injected_failures_are_returned_and_journaled() {
        let store = MemoryStore::with_graph(FamilyGraph {
            nodes: vec![Person::new("a")],
            ..FamilyGraph::default()
        });
        store.fail(StoreOp::SetPersonPosition, StoreError::network("offline"));
        let err = block_on(store.set_person_position("a", 1.0, 2.0)).unwrap_err();
        assert_eq!(err.user_message(), "Network error: offline");
        assert_eq!(store.snapshot().nodes[0].position, None);

        store.clear_failure(StoreOp::SetPersonPosition);
        block_on(store.set_person_position("a", 1.0, 2.0)).unwrap();
        let calls = store.calls_of(StoreOp::SetPersonPosition);
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].position, Some(Position::new(1.0, 2.0)));

        block_on(store.clear_person_position("a")).unwrap();
        assert_eq!(store.snapshot().nodes[0].position, None);
    }
}
