//! Binding request assembled from user selections.
//!
//! Setters validate before accepting a value: an object that is not an armature is rejected
//! and the request is left as it was.

use tracing::{debug, instrument};

use crate::domain::entities::{ObjectId, TraversalMode};
use crate::domain::error::{DomainError, DomainResult, SelectionSlot};
use crate::domain::scene::Scene;

/// Source armature, target armatures, root bone and traversal mode for one apply/remove run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingRequest {
    source: Option<ObjectId>,
    targets: Vec<ObjectId>,
    root_bone: Option<String>,
    pub mode: TraversalMode,
}

/// A request whose selections are all present and valid against a scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRequest {
    pub source: ObjectId,
    pub targets: Vec<ObjectId>,
    pub root_bone: String,
    pub mode: TraversalMode,
}

fn ensure_armature(scene: &Scene, id: ObjectId) -> DomainResult<()> {
    scene.armature(id).map(|_| ())
}

impl BindingRequest {
    pub fn new(mode: TraversalMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Derives a request from the scene selection: the active object is the source when it is
    /// a selected armature, and every other selected armature is a target. Without such an
    /// active object the request is empty.
    #[instrument(level = "debug", skip(scene))]
    pub fn from_scene_selection(scene: &Scene, mode: TraversalMode) -> Self {
        let mut request = Self::new(mode);
        let selected: Vec<ObjectId> = scene
            .selected()
            .filter(|&id| scene.is_armature(id))
            .collect();

        match scene.active().filter(|a| selected.contains(a)) {
            Some(active) => {
                request.source = Some(active);
                request.targets = selected.into_iter().filter(|&id| id != active).collect();
            }
            None => debug!("no active armature in selection"),
        }
        request
    }

    pub fn source(&self) -> Option<ObjectId> {
        self.source
    }

    pub fn targets(&self) -> &[ObjectId] {
        &self.targets
    }

    pub fn root_bone(&self) -> Option<&str> {
        self.root_bone.as_deref()
    }

    /// Sets the source armature. It stops being a target if it was one, so an armature is
    /// never bound to itself.
    pub fn set_source(&mut self, scene: &Scene, id: ObjectId) -> DomainResult<()> {
        ensure_armature(scene, id)?;
        self.source = Some(id);
        self.targets.retain(|&t| t != id);
        Ok(())
    }

    /// Adds a target armature. Adding one that is already present, or the source itself, is a
    /// no-op.
    pub fn add_target(&mut self, scene: &Scene, id: ObjectId) -> DomainResult<()> {
        ensure_armature(scene, id)?;
        if self.source == Some(id) {
            debug!("skipping target: it is the source armature");
        } else if !self.targets.contains(&id) {
            self.targets.push(id);
        }
        Ok(())
    }

    /// Makes `id` the only target and pre-fills the root bone with the target's first bone
    /// (cleared when the target has no bones). Picking the current source as target clears the
    /// source.
    pub fn set_target(&mut self, scene: &Scene, id: ObjectId) -> DomainResult<()> {
        let skeleton = scene.armature(id)?;
        self.root_bone = skeleton.first_bone().map(|b| b.name.clone());
        if self.source == Some(id) {
            self.source = None;
        }
        self.targets = vec![id];
        Ok(())
    }

    pub fn clear_targets(&mut self) {
        self.targets.clear();
    }

    pub fn set_root_bone(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.root_bone = (!name.is_empty()).then_some(name);
    }

    /// Fills an unset root bone with the first bone of the first target.
    pub fn default_root_from_targets(&mut self, scene: &Scene) {
        if self.root_bone.is_some() {
            return;
        }
        self.root_bone = self
            .targets
            .first()
            .and_then(|&t| scene.armature(t).ok())
            .and_then(|sk| sk.first_bone())
            .map(|b| b.name.clone());
    }

    /// Checks targets only, for remove runs.
    pub fn validate_targets(&self, scene: &Scene) -> DomainResult<Vec<ObjectId>> {
        if self.targets.is_empty() {
            return Err(DomainError::MissingSelection(SelectionSlot::ChildArmature));
        }
        for &t in &self.targets {
            ensure_armature(scene, t)?;
        }
        Ok(self.targets.clone())
    }

    /// Checks every selection for an apply run: source, targets and root bone present and all
    /// armatures. Parent-based runs also need the root bone to exist in the source skeleton;
    /// child-based runs ignore its value.
    pub fn validate(&self, scene: &Scene) -> DomainResult<ValidRequest> {
        let source = self
            .source
            .ok_or(DomainError::MissingSelection(SelectionSlot::ParentArmature))?;
        let targets = self.validate_targets(scene)?;
        let root_bone = self
            .root_bone
            .clone()
            .ok_or(DomainError::MissingSelection(SelectionSlot::RootBone))?;

        let skeleton = scene.armature(source)?;
        if self.mode == TraversalMode::ParentBased && !skeleton.contains(&root_bone) {
            return Err(DomainError::RootBoneNotFound {
                bone: root_bone,
                armature: skeleton.name().to_string(),
            });
        }

        Ok(ValidRequest {
            source,
            targets,
            root_bone,
            mode: self.mode,
        })
    }
}
