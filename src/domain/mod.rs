//! Domain layer: architecture elements, their storage and error taxonomy
//!
//! This layer is independent of evaluation concerns (no context stack, no config loading).

pub mod arena;
pub mod element;
pub mod error;
pub mod uri;

pub use arena::{ModelArena, PostOrderIterator, TreeIterator, TreeNode};
pub use element::{
    ElementData, ElementKind, Enterprise, HealthCheckData, Location, Node, WorkspaceData,
};
pub use error::{DomainError, ErrorKind};
pub use uri::validate_url;
