use crate::model::{ParentOfInput, Person, PersonInput, UnionInput};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("both {first} and {second} must be chosen")]
    MissingEndpoint {
        first: &'static str,
        second: &'static str,
    },
}

/// The dialog currently shown. At most one is open at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    CreatePerson,
    EditPerson {
        person_id: String,
        prefill: PersonInput,
    },
    CreateUnion {
        prefill: UnionInput,
    },
    CreateParentOf {
        prefill: ParentOfInput,
    },
    ConfirmDelete {
        person_id: String,
        display_name: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    CreatePerson,
    EditPerson,
    CreateUnion,
    CreateParentOf,
    ConfirmDelete,
}

impl Modal {
    pub fn kind(&self) -> ModalKind {
        match self {
            Self::CreatePerson => ModalKind::CreatePerson,
            Self::EditPerson { .. } => ModalKind::EditPerson,
            Self::CreateUnion { .. } => ModalKind::CreateUnion,
            Self::CreateParentOf { .. } => ModalKind::CreateParentOf,
            Self::ConfirmDelete { .. } => ModalKind::ConfirmDelete,
        }
    }

    pub(crate) fn edit(person: &Person) -> Self {
        Self::EditPerson {
            person_id: person.id.clone(),
            prefill: PersonInput::from_person(person),
        }
    }

    pub(crate) fn confirm_delete(person: &Person) -> Self {
        Self::ConfirmDelete {
            person_id: person.id.clone(),
            display_name: person.full_name(),
        }
    }

    pub(crate) fn union_with(person1_id: Option<&str>) -> Self {
        Self::CreateUnion {
            prefill: UnionInput::between(person1_id.unwrap_or_default(), ""),
        }
    }

    pub(crate) fn parent_of(parent_id: Option<&str>, child_id: Option<&str>) -> Self {
        Self::CreateParentOf {
            prefill: ParentOfInput::new(parent_id.unwrap_or_default(), child_id.unwrap_or_default()),
        }
    }
}

/// A person a relationship form can offer as an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonOption {
    pub id: String,
    pub label: String,
}

impl PersonOption {
    pub fn from_person(person: &Person) -> Self {
        let label = match person.birth_year() {
            Some(year) => format!("{} (b. {year})", person.full_name()),
            None => person.full_name(),
        };
        Self {
            id: person.id.clone(),
            label,
        }
    }
}

pub(crate) fn check_union(input: &UnionInput) -> Result<(), FormError> {
    check_endpoints(&input.person1_id, &input.person2_id, "person1", "person2")
}

pub(crate) fn check_parent_of(input: &ParentOfInput) -> Result<(), FormError> {
    check_endpoints(&input.parent_id, &input.child_id, "parent", "child")
}

fn check_endpoints(
    a: &str,
    b: &str,
    first: &'static str,
    second: &'static str,
) -> Result<(), FormError> {
    if a.trim().is_empty() || b.trim().is_empty() {
        return Err(FormError::MissingEndpoint { first, second });
    }
    Ok(())
}
