//! Derived lookups of a person's parents, children and partners.
//!
//! Nothing here is cached: every query scans the relationship lists of the
//! snapshot it is given, so the answer always matches the graph last loaded.

use crate::model::{FamilyGraph, ParentType, Person, Union};

#[derive(Debug, Clone, PartialEq)]
pub struct Kin<'a> {
    pub person: &'a Person,
    pub parent_type: ParentType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Partner<'a> {
    pub person: &'a Person,
    pub union: &'a Union,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PersonRelationships<'a> {
    pub parents: Vec<Kin<'a>>,
    pub children: Vec<Kin<'a>>,
    pub spouses: Vec<Partner<'a>>,
}

impl PersonRelationships<'_> {
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty() && self.children.is_empty() && self.spouses.is_empty()
    }
}

/// Relationships touching `person_id`, in relationship-list order.
///
/// Entries whose other endpoint is not in `graph.nodes` are skipped.
pub fn relationships<'a>(graph: &'a FamilyGraph, person_id: &str) -> PersonRelationships<'a> {
    let parents = graph
        .parent_of
        .iter()
        .filter(|rel| rel.child_id == person_id)
        .filter_map(|rel| {
            graph.person(&rel.parent_id).map(|person| Kin {
                person,
                parent_type: rel.parent_type,
            })
        })
        .collect();

    let children = graph
        .parent_of
        .iter()
        .filter(|rel| rel.parent_id == person_id)
        .filter_map(|rel| {
            graph.person(&rel.child_id).map(|person| Kin {
                person,
                parent_type: rel.parent_type,
            })
        })
        .collect();

    let spouses = graph
        .unions
        .iter()
        .filter_map(|union| {
            let partner_id = union.partner_of(person_id)?;
            graph.person(partner_id).map(|person| Partner { person, union })
        })
        .collect();

    PersonRelationships {
        parents,
        children,
        spouses,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ParentOf, UnionStatus};

    fn family() -> FamilyGraph {
        FamilyGraph {
            nodes: vec![
                Person::named("a", "Anna", "Berg"),
                Person::named("b", "Bo", "Berg"),
                Person::named("c", "Cleo", "Berg"),
            ],
            parent_of: vec![
                ParentOf::new("a", "c"),
                ParentOf::new("b", "c").with_type(ParentType::Step),
            ],
            unions: vec![Union::new("a", "b").with_status(UnionStatus::Divorced)],
        }
    }

    #[test]
    fn collects_parents_children_and_partners() {
        let graph = family();
        let child = relationships(&graph, "c");
        let parent_ids: Vec<&str> = child.parents.iter().map(|k| k.person.id.as_str()).collect();
        assert_eq!(parent_ids, ["a", "b"]);
        assert_eq!(child.parents[1].parent_type, ParentType::Step);
        assert!(child.children.is_empty());

        let mother = relationships(&graph, "a");
        assert_eq!(mother.children.len(), 1);
        assert_eq!(mother.spouses.len(), 1);
        assert_eq!(mother.spouses[0].person.id, "b");
        assert_eq!(mother.spouses[0].union.status, UnionStatus::Divorced);

        // Unions are symmetric for lookup purposes.
        let father = relationships(&graph, "b");
        assert_eq!(father.spouses[0].person.id, "a");
    }

    #[test]
    fn person_without_relationships_is_empty() {
        let mut graph = family();
        graph.nodes.push(Person::new("loner"));
        let rels = relationships(&graph, "loner");
        assert!(rels.is_empty());
        assert!(rels.parents.is_empty());
        assert!(rels.children.is_empty());
        assert!(rels.spouses.is_empty());
    }

    #[test]
    fn dangling_endpoints_are_dropped() {
        let mut graph = family();
        graph.nodes.retain(|person| person.id != "a");
        let child = relationships(&graph, "c");
        assert_eq!(child.parents.len(), 1);
        assert_eq!(child.parents[0].person.id, "b");
        let father = relationships(&graph, "b");
        assert!(father.spouses.is_empty());
    }
}
