//! Bind the bones of child armatures to a parent armature with Copy Transforms constraints.
//!
//! Layers, innermost first:
//! - [`domain`]: skeletons, scenes, traversal and binding (no I/O)
//! - [`application`]: scene documents and binding services
//! - [`infrastructure`]: filesystem boundary and service wiring
//! - [`cli`]: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
