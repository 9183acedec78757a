//! Host scene graph: named objects, their skeletons, and the selection state.

use std::collections::HashMap;

use generational_arena::Arena;
use tracing::{debug, instrument};

use crate::domain::arena::Skeleton;
use crate::domain::entities::{ObjectId, ObjectKind};
use crate::domain::error::{DomainError, DomainResult};

/// An object in the scene. Armatures own a skeleton; other kinds never do.
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub name: String,
    pub kind: ObjectKind,
    pub selected: bool,
    skeleton: Option<Skeleton>,
}

impl SceneObject {
    pub fn skeleton(&self) -> Option<&Skeleton> {
        self.skeleton.as_ref()
    }

    pub fn skeleton_mut(&mut self) -> Option<&mut Skeleton> {
        self.skeleton.as_mut()
    }
}

/// Scene graph owning every object. Objects keep their insertion order.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    objects: Arena<SceneObject>,
    order: Vec<ObjectId>,
    by_name: HashMap<String, ObjectId>,
    active: Option<ObjectId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an object; armatures get an empty skeleton.
    #[instrument(level = "trace", skip(self))]
    pub fn add_object(&mut self, name: &str, kind: ObjectKind) -> DomainResult<ObjectId> {
        if self.by_name.contains_key(name) {
            return Err(DomainError::DuplicateObject(name.to_string()));
        }
        let skeleton = kind.is_armature().then(|| Skeleton::new(name));
        let id = ObjectId(self.objects.insert(SceneObject {
            name: name.to_string(),
            kind,
            selected: false,
            skeleton,
        }));
        self.order.push(id);
        self.by_name.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn add_armature(&mut self, name: &str) -> DomainResult<ObjectId> {
        self.add_object(name, ObjectKind::Armature)
    }

    /// Deletes an object. Constraints elsewhere that pointed at it lose their target.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_object(&mut self, id: ObjectId) -> Option<SceneObject> {
        let object = self.objects.remove(id.0)?;
        self.order.retain(|&o| o != id);
        self.by_name.remove(&object.name);
        if self.active == Some(id) {
            self.active = None;
        }

        let mut cleared = 0;
        for (_, other) in self.objects.iter_mut() {
            if let Some(skeleton) = other.skeleton.as_mut() {
                for bone in skeleton.bones_mut() {
                    for constraint in bone.constraints.iter_mut() {
                        if constraint.target == Some(id) {
                            constraint.target = None;
                            cleared += 1;
                        }
                    }
                }
            }
        }
        debug!("removed object {}, cleared {} constraint targets", object.name, cleared);
        Some(object)
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(id.0)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(id.0)
    }

    pub fn find(&self, name: &str) -> Option<ObjectId> {
        self.by_name.get(name).copied()
    }

    /// Like [`Scene::find`], but a missing object is an error.
    pub fn lookup(&self, name: &str) -> DomainResult<ObjectId> {
        self.find(name)
            .ok_or_else(|| DomainError::UnknownObject(name.to_string()))
    }

    pub fn name_of(&self, id: ObjectId) -> Option<&str> {
        self.get(id).map(|o| o.name.as_str())
    }

    /// All object ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.order.iter().copied()
    }

    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> + '_ {
        self.order
            .iter()
            .filter_map(move |&id| self.objects.get(id.0).map(|o| (id, o)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Skeleton of an armature object.
    ///
    /// Fails with `InvalidSkeletonType` when the object is not armature-like.
    pub fn armature(&self, id: ObjectId) -> DomainResult<&Skeleton> {
        let object = self
            .get(id)
            .ok_or_else(|| DomainError::UnknownObject(format!("{:?}", id)))?;
        object
            .skeleton
            .as_ref()
            .ok_or_else(|| DomainError::InvalidSkeletonType {
                name: object.name.clone(),
                kind: object.kind.to_string(),
            })
    }

    pub fn armature_mut(&mut self, id: ObjectId) -> DomainResult<&mut Skeleton> {
        let object = self
            .objects
            .get_mut(id.0)
            .ok_or_else(|| DomainError::UnknownObject(format!("{:?}", id)))?;
        let (name, kind) = (object.name.clone(), object.kind.to_string());
        object
            .skeleton
            .as_mut()
            .ok_or(DomainError::InvalidSkeletonType { name, kind })
    }

    pub fn is_armature(&self, id: ObjectId) -> bool {
        self.get(id).is_some_and(|o| o.kind.is_armature())
    }

    // Selection state

    pub fn select(&mut self, id: ObjectId, selected: bool) {
        if let Some(object) = self.objects.get_mut(id.0) {
            object.selected = selected;
        }
    }

    pub fn set_active(&mut self, id: Option<ObjectId>) {
        self.active = id.filter(|i| self.objects.contains(i.0));
    }

    pub fn active(&self) -> Option<ObjectId> {
        self.active
    }

    pub fn selected(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects()
            .filter(|(_, o)| o.selected)
            .map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Constraint;

    #[test]
    fn given_armature_when_added_then_has_empty_skeleton() {
        let mut scene = Scene::new();
        let id = scene.add_armature("Rig").unwrap();
        let skeleton = scene.armature(id).unwrap();
        assert!(skeleton.is_empty());
        assert_eq!(skeleton.name(), "Rig");
    }

    #[test]
    fn given_mesh_when_requesting_skeleton_then_invalid_type() {
        let mut scene = Scene::new();
        let id = scene.add_object("Body", ObjectKind::Mesh).unwrap();
        let err = scene.armature(id).unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidSkeletonType {
                name: "Body".into(),
                kind: "MESH".into()
            }
        );
    }

    #[test]
    fn given_duplicate_object_name_when_adding_then_errors() {
        let mut scene = Scene::new();
        scene.add_armature("Rig").unwrap();
        assert!(scene.add_object("Rig", ObjectKind::Empty).is_err());
    }

    #[test]
    fn given_constraint_targeting_object_when_object_removed_then_target_cleared() {
        let mut scene = Scene::new();
        let parent = scene.add_armature("Parent").unwrap();
        let child = scene.add_armature("Child").unwrap();
        {
            let sk = scene.armature_mut(child).unwrap();
            sk.add_bone("root", None).unwrap();
            sk.bone_mut("root")
                .unwrap()
                .constraints
                .push(Constraint::copy_transforms("Copy Transforms", parent, "root"));
        }

        scene.remove_object(parent);

        let bone = scene.armature(child).unwrap().bone("root").unwrap();
        assert_eq!(bone.constraints.len(), 1);
        assert_eq!(bone.constraints[0].target, None);
        assert!(scene.find("Parent").is_none());
    }

    #[test]
    fn given_selection_when_listing_then_keeps_scene_order() {
        let mut scene = Scene::new();
        let a = scene.add_armature("A").unwrap();
        let b = scene.add_armature("B").unwrap();
        let c = scene.add_armature("C").unwrap();
        scene.select(c, true);
        scene.select(a, true);
        scene.set_active(Some(b));

        assert_eq!(scene.selected().collect::<Vec<_>>(), vec![a, c]);
        assert_eq!(scene.active(), Some(b));
    }
}
