//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem) but are themselves concrete structs,
//! not traits.

mod binding;
mod scene;

pub use binding::{BindingReport, BindingService, TargetCount, TargetPairs};
pub use scene::{parse_scene, render_scene, SceneService};
