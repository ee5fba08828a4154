//! Contract of the remote persistence collaborator.
//!
//! The methods are `async` without tying the crate to any executor; callers
//! drive them with whatever runtime the host application uses.

mod memory;

pub use memory::{MemoryStore, StoreCall, StoreOp};

use crate::model::{
    FamilyGraph, ParentOf, ParentOfInput, Person, PersonInput, Union, UnionInput,
};

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// Transport failure; no response was received.
    #[error("Network error: {message}")]
    Network { message: String },

    /// A response arrived with a non-success status.
    #[error("API request failed: {status_text}")]
    Api { status: u16, status_text: String },
}

impl StoreError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn api(status: u16, status_text: impl Into<String>) -> Self {
        Self::Api {
            status,
            status_text: status_text.into(),
        }
    }

    /// Status code as reported to the user; transport failures report 0.
    pub fn status(&self) -> u16 {
        match self {
            Self::Network { .. } => 0,
            Self::Api { status, .. } => *status,
        }
    }

    /// Text shown next to the retry affordance.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

#[allow(async_fn_in_trait)]
pub trait GraphStore {
    async fn list_persons(&self) -> Result<Vec<Person>>;

    async fn get_graph(&self) -> Result<FamilyGraph>;

    async fn create_person(&self, input: &PersonInput) -> Result<Person>;

    async fn update_person(&self, id: &str, input: &PersonInput) -> Result<Person>;

    async fn delete_person(&self, id: &str) -> Result<()>;

    async fn create_union(&self, input: &UnionInput) -> Result<Union>;

    async fn create_parent_of(&self, input: &ParentOfInput) -> Result<ParentOf>;

    async fn set_person_position(&self, id: &str, x: f32, y: f32) -> Result<Person>;

    async fn clear_person_position(&self, id: &str) -> Result<Person>;
}

/// Forwards every store call through a shared handle, so a host can keep
/// saving positions while the session handles further gestures.
macro_rules! forward_store {
    ($($handle:ty),+ $(,)?) => {$(
        impl<T: GraphStore + ?Sized> GraphStore for $handle {
            async fn list_persons(&self) -> Result<Vec<Person>> {
                (**self).list_persons().await
            }

            async fn get_graph(&self) -> Result<FamilyGraph> {
                (**self).get_graph().await
            }

            async fn create_person(&self, input: &PersonInput) -> Result<Person> {
                (**self).create_person(input).await
            }

            async fn update_person(&self, id: &str, input: &PersonInput) -> Result<Person> {
                (**self).update_person(id, input).await
            }

            async fn delete_person(&self, id: &str) -> Result<()> {
                (**self).delete_person(id).await
            }

            async fn create_union(&self, input: &UnionInput) -> Result<Union> {
                (**self).create_union(input).await
            }

            async fn create_parent_of(&self, input: &ParentOfInput) -> Result<ParentOf> {
                (**self).create_parent_of(input).await
            }

            async fn set_person_position(&self, id: &str, x: f32, y: f32) -> Result<Person> {
                (**self).set_person_position(id, x, y).await
            }

            async fn clear_person_position(&self, id: &str) -> Result<Person> {
                (**self).clear_person_position(id).await
            }
        }
    )+};
}

forward_store!(&T, std::rc::Rc<T>);
