use std::collections::HashMap;
use std::fmt;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::entities::Constraint;
use crate::domain::error::{DomainError, DomainResult};

/// Bone node in the arena-based skeleton hierarchy.
#[derive(Debug, Clone)]
pub struct Bone {
    /// Unique within its skeleton
    pub name: String,
    /// Index of parent bone in the arena, None for root bones
    pub parent: Option<Index>,
    /// Indices of child bones, in the order they were added
    pub children: Vec<Index>,
    /// Constraints owned by this bone
    pub constraints: Vec<Constraint>,
}

impl Bone {
    pub fn binding_count(&self) -> usize {
        self.constraints.iter().filter(|c| c.is_binding()).count()
    }
}

impl fmt::Display for Bone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Arena-based bone hierarchy of one armature.
///
/// Uses generational arena for memory-safe bone references and keeps a name index for O(1)
/// lookups. A skeleton may have several root bones. Enumeration order is the order bones were
/// added.
#[derive(Debug, Clone)]
pub struct Skeleton {
    /// Name of the owning armature object, used in error messages
    name: String,
    arena: Arena<Bone>,
    order: Vec<Index>,
    by_name: HashMap<String, Index>,
    roots: Vec<Index>,
}

impl Skeleton {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arena: Arena::new(),
            order: Vec::new(),
            by_name: HashMap::new(),
            roots: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a bone under `parent`, or as a root bone when `parent` is None.
    ///
    /// The parent must already exist, so a skeleton can never contain a cycle.
    #[instrument(level = "trace", skip(self))]
    pub fn add_bone(&mut self, name: &str, parent: Option<&str>) -> DomainResult<Index> {
        if self.by_name.contains_key(name) {
            return Err(DomainError::DuplicateBone {
                armature: self.name.clone(),
                bone: name.to_string(),
            });
        }
        let parent_idx = match parent {
            Some(p) => Some(self.index_of(p).ok_or_else(|| DomainError::UnknownParent {
                bone: name.to_string(),
                parent: p.to_string(),
            })?),
            None => None,
        };

        let bone_idx = self.arena.insert(Bone {
            name: name.to_string(),
            parent: parent_idx,
            children: Vec::new(),
            constraints: Vec::new(),
        });

        match parent_idx.and_then(|p| self.arena.get_mut(p)) {
            Some(parent) => parent.children.push(bone_idx),
            None => self.roots.push(bone_idx),
        }
        self.order.push(bone_idx);
        self.by_name.insert(name.to_string(), bone_idx);

        Ok(bone_idx)
    }

    /// Removes a bone the way a host deletes it: its constraints go with it and its children
    /// are re-parented to its parent, taking its place in the sibling order.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_bone(&mut self, name: &str) -> Option<Bone> {
        let idx = self.by_name.remove(name)?;
        let bone = self.arena.remove(idx)?;
        self.order.retain(|&i| i != idx);

        for &child in &bone.children {
            if let Some(c) = self.arena.get_mut(child) {
                c.parent = bone.parent;
            }
        }

        let siblings = match bone.parent.and_then(|p| self.arena.get_mut(p)) {
            Some(parent) => &mut parent.children,
            None => &mut self.roots,
        };
        if let Some(pos) = siblings.iter().position(|&i| i == idx) {
            siblings.splice(pos..=pos, bone.children.iter().copied());
        }

        Some(bone)
    }

    pub fn get(&self, idx: Index) -> Option<&Bone> {
        self.arena.get(idx)
    }

    pub fn get_mut(&mut self, idx: Index) -> Option<&mut Bone> {
        self.arena.get_mut(idx)
    }

    pub fn index_of(&self, name: &str) -> Option<Index> {
        self.by_name.get(name).copied()
    }

    pub fn bone(&self, name: &str) -> Option<&Bone> {
        self.index_of(name).and_then(|idx| self.arena.get(idx))
    }

    pub fn bone_mut(&mut self, name: &str) -> Option<&mut Bone> {
        let idx = self.index_of(name)?;
        self.arena.get_mut(idx)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    /// First bone in enumeration order.
    pub fn first_bone(&self) -> Option<&Bone> {
        self.order.first().and_then(|&idx| self.arena.get(idx))
    }

    /// All bones in enumeration order.
    pub fn bones(&self) -> impl Iterator<Item = &Bone> + '_ {
        self.order.iter().filter_map(move |&idx| self.arena.get(idx))
    }

    /// All bones, mutably. Order is unspecified.
    pub fn bones_mut(&mut self) -> impl Iterator<Item = &mut Bone> + '_ {
        self.arena.iter_mut().map(|(_, bone)| bone)
    }

    /// Pre-order walk of the subtree rooted at `start`.
    pub fn descendants(&self, start: Index) -> PreOrderIterator<'_> {
        PreOrderIterator::new(self, vec![start])
    }

    /// Pre-order walk of every root bone's subtree.
    pub fn iter(&self) -> PreOrderIterator<'_> {
        PreOrderIterator::new(self, self.roots.iter().rev().copied().collect())
    }

    /// Total number of copy-transforms constraints across all bones.
    pub fn binding_count(&self) -> usize {
        self.bones().map(Bone::binding_count).sum()
    }
}

/// Depth-first pre-order iterator driven by an explicit stack, so deep rigs cost no recursion.
pub struct PreOrderIterator<'a> {
    skeleton: &'a Skeleton,
    stack: Vec<Index>,
}

impl<'a> PreOrderIterator<'a> {
    fn new(skeleton: &'a Skeleton, stack: Vec<Index>) -> Self {
        Self { skeleton, stack }
    }
}

impl<'a> Iterator for PreOrderIterator<'a> {
    type Item = (Index, &'a Bone);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(bone) = self.skeleton.get(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in bone.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, bone));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // root
    // ├── spine
    // │   └── head
    // └── tail
    fn sample() -> Skeleton {
        let mut sk = Skeleton::new("Rig");
        sk.add_bone("root", None).unwrap();
        sk.add_bone("spine", Some("root")).unwrap();
        sk.add_bone("head", Some("spine")).unwrap();
        sk.add_bone("tail", Some("root")).unwrap();
        sk
    }

    fn names<'a>(iter: impl Iterator<Item = (Index, &'a Bone)>) -> Vec<String> {
        iter.map(|(_, b)| b.name.clone()).collect()
    }

    #[test]
    fn given_tree_when_iterating_then_visits_pre_order() {
        let sk = sample();
        assert_eq!(names(sk.iter()), vec!["root", "spine", "head", "tail"]);
    }

    #[test]
    fn given_subtree_start_when_iterating_descendants_then_stays_inside_subtree() {
        let sk = sample();
        let spine = sk.index_of("spine").unwrap();
        assert_eq!(names(sk.descendants(spine)), vec!["spine", "head"]);
    }

    #[test]
    fn given_duplicate_name_when_adding_then_errors() {
        let mut sk = sample();
        let err = sk.add_bone("spine", None).unwrap_err();
        assert!(matches!(err, DomainError::DuplicateBone { .. }));
    }

    #[test]
    fn given_unknown_parent_when_adding_then_errors() {
        let mut sk = sample();
        let err = sk.add_bone("hand", Some("arm")).unwrap_err();
        assert_eq!(
            err,
            DomainError::UnknownParent {
                bone: "hand".into(),
                parent: "arm".into()
            }
        );
        assert!(!sk.contains("hand"));
    }

    #[test]
    fn given_middle_bone_when_removed_then_children_take_its_place() {
        let mut sk = sample();
        let removed = sk.remove_bone("spine").unwrap();
        assert_eq!(removed.name, "spine");

        assert_eq!(names(sk.iter()), vec!["root", "head", "tail"]);
        let head = sk.bone("head").unwrap();
        assert_eq!(head.parent, sk.index_of("root"));
        assert_eq!(sk.len(), 3);
    }

    #[test]
    fn given_root_bone_when_removed_then_children_become_roots() {
        let mut sk = sample();
        sk.remove_bone("root");
        assert_eq!(sk.roots().len(), 2);
        assert_eq!(names(sk.iter()), vec!["spine", "head", "tail"]);
    }

    #[test]
    fn given_bones_when_enumerating_then_keeps_insertion_order() {
        let sk = sample();
        let order: Vec<_> = sk.bones().map(|b| b.name.as_str()).collect();
        assert_eq!(order, vec!["root", "spine", "head", "tail"]);
        assert_eq!(sk.first_bone().map(|b| b.name.as_str()), Some("root"));
    }
}
