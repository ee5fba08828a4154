pub mod adapter;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod index;
pub mod layout;
pub mod layout_dump;
pub mod model;
pub mod render;
pub mod session;
pub mod store;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use layout::{TreeLayout, compute_layout};
pub use model::FamilyGraph;
pub use session::Session;
pub use store::{GraphStore, MemoryStore, StoreError};
