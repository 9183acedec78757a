//! Domain entities: core data structures

use std::fmt;
use std::str::FromStr;

use generational_arena::Index;
use serde::{Deserialize, Serialize};

/// Handle to an object owned by a [`Scene`](crate::domain::Scene).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub(crate) Index);

/// Type tag of a scene object. Only armatures carry a skeleton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Armature,
    Mesh,
    Empty,
    Camera,
    Light,
    /// Any other host kind (curves, lattices, ...); loads as a non-armature
    #[serde(other)]
    Other,
}

impl ObjectKind {
    pub fn is_armature(&self) -> bool {
        matches!(self, ObjectKind::Armature)
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ObjectKind::Armature => "ARMATURE",
            ObjectKind::Mesh => "MESH",
            ObjectKind::Empty => "EMPTY",
            ObjectKind::Camera => "CAMERA",
            ObjectKind::Light => "LIGHT",
            ObjectKind::Other => "OTHER",
        };
        write!(f, "{}", s)
    }
}

/// Kind of a bone constraint.
///
/// Bindings created by this crate are always [`ConstraintKind::CopyTransforms`]; the other kinds
/// exist so that rigs loaded from a host keep their unrelated constraints intact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintKind {
    CopyTransforms,
    CopyLocation,
    CopyRotation,
    CopyScale,
    Other(String),
}

impl ConstraintKind {
    pub fn as_str(&self) -> &str {
        match self {
            ConstraintKind::CopyTransforms => "copy_transforms",
            ConstraintKind::CopyLocation => "copy_location",
            ConstraintKind::CopyRotation => "copy_rotation",
            ConstraintKind::CopyScale => "copy_scale",
            ConstraintKind::Other(s) => s.as_str(),
        }
    }
}

impl From<&str> for ConstraintKind {
    fn from(s: &str) -> Self {
        match s {
            "copy_transforms" => ConstraintKind::CopyTransforms,
            "copy_location" => ConstraintKind::CopyLocation,
            "copy_rotation" => ConstraintKind::CopyRotation,
            "copy_scale" => ConstraintKind::CopyScale,
            other => ConstraintKind::Other(other.to_string()),
        }
    }
}

/// A constraint owned by a bone.
///
/// For a copy-transforms binding, `target` is the source armature and `subtarget` the source
/// bone whose transform drives the owning bone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub kind: ConstraintKind,
    /// Display name shown by the host
    pub name: String,
    pub target: Option<ObjectId>,
    pub subtarget: String,
}

impl Constraint {
    pub fn copy_transforms(name: impl Into<String>, source: ObjectId, bone: impl Into<String>) -> Self {
        Self {
            kind: ConstraintKind::CopyTransforms,
            name: name.into(),
            target: Some(source),
            subtarget: bone.into(),
        }
    }

    pub fn is_binding(&self) -> bool {
        self.kind == ConstraintKind::CopyTransforms
    }
}

/// How bones are enumerated when building bindings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TraversalMode {
    /// Walk the source hierarchy from the root bone, emit on name match
    #[default]
    ParentBased,
    /// Walk every bone of the target, emit on name match; the root bone is ignored
    ChildBased,
}

impl fmt::Display for TraversalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraversalMode::ParentBased => write!(f, "PARENT_BASED"),
            TraversalMode::ChildBased => write!(f, "CHILD_BASED"),
        }
    }
}

impl FromStr for TraversalMode {
    type Err = String;

    /// Accepts `PARENT_BASED`, `parent-based`, `parent_based`, `parent` (any case), and the
    /// child equivalents.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "parent_based" | "parent" => Ok(TraversalMode::ParentBased),
            "child_based" | "child" => Ok(TraversalMode::ChildBased),
            _ => Err(format!("unknown traversal mode: {}", s)),
        }
    }
}

/// One binding to create: `target` bone in the child armature follows `source` bone of the
/// parent armature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BonePair {
    pub target: String,
    pub source: String,
}

impl BonePair {
    pub fn new(target: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            source: source.into(),
        }
    }
}

impl fmt::Display for BonePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <- {}", self.target, self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("PARENT_BASED", TraversalMode::ParentBased)]
    #[case("parent-based", TraversalMode::ParentBased)]
    #[case("parent", TraversalMode::ParentBased)]
    #[case("CHILD_BASED", TraversalMode::ChildBased)]
    #[case(" child_based ", TraversalMode::ChildBased)]
    fn given_mode_string_when_parsing_then_accepts_spellings(
        #[case] input: &str,
        #[case] expected: TraversalMode,
    ) {
        assert_eq!(input.parse::<TraversalMode>().unwrap(), expected);
    }

    #[test]
    fn given_unknown_mode_when_parsing_then_errors() {
        assert!("sideways".parse::<TraversalMode>().is_err());
    }

    #[test]
    fn given_constraint_kind_strings_when_converting_then_keeps_unknown_kinds() {
        assert_eq!(ConstraintKind::from("copy_transforms"), ConstraintKind::CopyTransforms);
        let other = ConstraintKind::from("ik");
        assert_eq!(other, ConstraintKind::Other("ik".into()));
        assert_eq!(other.as_str(), "ik");
    }
}
