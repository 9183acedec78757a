//! Domain-level errors (no external dependencies)

use std::fmt;

use thiserror::Error;

/// Domain errors represent rigging rule violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("'{name}' is not an armature object (kind: {kind})")]
    InvalidSkeletonType { name: String, kind: String },

    #[error("no {0} selected")]
    MissingSelection(SelectionSlot),

    #[error("root bone '{bone}' not found in parent armature '{armature}'")]
    RootBoneNotFound { bone: String, armature: String },

    #[error("duplicate bone name in '{armature}': {bone}")]
    DuplicateBone { armature: String, bone: String },

    #[error("duplicate object name: {0}")]
    DuplicateObject(String),

    #[error("parent bone '{parent}' of '{bone}' not found")]
    UnknownParent { bone: String, parent: String },

    #[error("object not found: {0}")]
    UnknownObject(String),
}

/// Which part of a request was left empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSlot {
    ParentArmature,
    ChildArmature,
    RootBone,
}

impl fmt::Display for SelectionSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionSlot::ParentArmature => write!(f, "parent armature"),
            SelectionSlot::ChildArmature => write!(f, "child armatures"),
            SelectionSlot::RootBone => write!(f, "root bone"),
        }
    }
}

/// Coarse classification of a [`DomainError`], for callers that branch on the failure
/// without matching on the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidSkeletonType,
    MissingSelection,
    RootBoneNotFound,
    DuplicateName,
    UnknownParent,
    UnknownObject,
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::InvalidSkeletonType { .. } => ErrorKind::InvalidSkeletonType,
            DomainError::MissingSelection(_) => ErrorKind::MissingSelection,
            DomainError::RootBoneNotFound { .. } => ErrorKind::RootBoneNotFound,
            DomainError::DuplicateBone { .. } | DomainError::DuplicateObject(_) => {
                ErrorKind::DuplicateName
            }
            DomainError::UnknownParent { .. } => ErrorKind::UnknownParent,
            DomainError::UnknownObject(_) => ErrorKind::UnknownObject,
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_missing_root_when_displayed_then_names_slot() {
        let err = DomainError::MissingSelection(SelectionSlot::RootBone);
        assert_eq!(err.to_string(), "no root bone selected");
        assert_eq!(err.kind(), ErrorKind::MissingSelection);
    }

    #[test]
    fn given_duplicate_errors_when_classified_then_share_kind() {
        let bone = DomainError::DuplicateBone {
            armature: "Rig".into(),
            bone: "root".into(),
        };
        let object = DomainError::DuplicateObject("Rig".into());
        assert_eq!(bone.kind(), ErrorKind::DuplicateName);
        assert_eq!(object.kind(), ErrorKind::DuplicateName);
    }
}
