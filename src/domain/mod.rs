//! Domain layer: scene graph, traversal and binding logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod binding;
pub mod entities;
pub mod error;
pub mod scene;
pub mod selection;
pub mod traversal;

pub use arena::{Bone, PreOrderIterator, Skeleton};
pub use entities::*;
pub use error::{DomainError, DomainResult, ErrorKind, SelectionSlot};
pub use scene::{Scene, SceneObject};
pub use selection::{BindingRequest, ValidRequest};
pub use traversal::enumerate_pairs;
