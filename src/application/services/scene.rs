//! Scene document service
//!
//! Loads and saves the host's scene description (TOML). Bones must be listed after their
//! parent; constraint targets refer to objects by name.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt, SceneFormatExt};
use crate::domain::{Constraint, ConstraintKind, DomainError, ObjectId, ObjectKind, Scene};
use crate::infrastructure::traits::FileSystem;

#[derive(Debug, Default, Serialize, Deserialize)]
struct SceneDocument {
    #[serde(default)]
    objects: Vec<ObjectEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ObjectEntry {
    name: String,
    kind: ObjectKind,
    #[serde(default, skip_serializing_if = "is_false")]
    selected: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    active: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    bones: Vec<BoneEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct BoneEntry {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    constraints: Vec<ConstraintEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ConstraintEntry {
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target: Option<String>,
    #[serde(default)]
    subtarget: String,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Parse a scene document into a live scene graph.
pub fn parse_scene(content: &str, path: &Path) -> ApplicationResult<Scene> {
    let doc: SceneDocument = toml::from_str(content).scene_format(path)?;
    let format_err = |message: String| ApplicationError::SceneFormat {
        path: path.to_path_buf(),
        message,
    };

    let mut scene = Scene::new();
    let mut active: Option<ObjectId> = None;

    // Objects and bones first, so constraints may point at any object.
    for entry in &doc.objects {
        let id = scene.add_object(&entry.name, entry.kind.clone())?;
        scene.select(id, entry.selected);
        if entry.active {
            if let Some(prev) = active.and_then(|a| scene.name_of(a)) {
                return Err(format_err(format!(
                    "both '{}' and '{}' are marked active",
                    prev, entry.name
                )));
            }
            active = Some(id);
        }
        if entry.bones.is_empty() {
            continue;
        }
        let skeleton = scene.armature_mut(id).map_err(|_| {
            format_err(format!("'{}' has bones but is not an armature", entry.name))
        })?;
        for bone in &entry.bones {
            skeleton.add_bone(&bone.name, bone.parent.as_deref())?;
        }
    }
    scene.set_active(active);

    for entry in &doc.objects {
        for bone in entry.bones.iter().filter(|b| !b.constraints.is_empty()) {
            let mut constraints = Vec::with_capacity(bone.constraints.len());
            for c in &bone.constraints {
                let target = c.target.as_deref().map(|t| scene.lookup(t)).transpose()?;
                constraints.push(Constraint {
                    kind: ConstraintKind::from(c.kind.as_str()),
                    name: c.name.clone(),
                    target,
                    subtarget: c.subtarget.clone(),
                });
            }
            let id = scene.lookup(&entry.name)?;
            let owner = scene
                .armature_mut(id)?
                .bone_mut(&bone.name)
                .ok_or_else(|| DomainError::UnknownObject(bone.name.clone()))?;
            owner.constraints = constraints;
        }
    }

    debug!("parsed scene with {} objects", scene.len());
    Ok(scene)
}

/// Render a scene graph back into a scene document.
pub fn render_scene(scene: &Scene, path: &Path) -> ApplicationResult<String> {
    let mut doc = SceneDocument::default();
    for (id, object) in scene.objects() {
        let bones: Vec<BoneEntry> = object
            .skeleton()
            .map(|sk| {
                sk.bones()
                    .map(|bone| BoneEntry {
                        name: bone.name.clone(),
                        parent: bone
                            .parent
                            .and_then(|p| sk.get(p))
                            .map(|p| p.name.clone()),
                        constraints: bone
                            .constraints
                            .iter()
                            .map(|c| ConstraintEntry {
                                kind: c.kind.as_str().to_string(),
                                name: c.name.clone(),
                                target: c
                                    .target
                                    .and_then(|t| scene.name_of(t))
                                    .map(str::to_string),
                                subtarget: c.subtarget.clone(),
                            })
                            .collect(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        doc.objects.push(ObjectEntry {
            name: object.name.clone(),
            kind: object.kind.clone(),
            selected: object.selected,
            active: scene.active() == Some(id),
            bones,
        });
    }
    toml::to_string_pretty(&doc).scene_format(path)
}

/// Service for reading and writing scene documents.
pub struct SceneService {
    fs: Arc<dyn FileSystem>,
}

impl SceneService {
    /// Create a new scene service.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<Scene> {
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read scene", path)?;
        parse_scene(&content, path)
    }

    #[instrument(level = "debug", skip(self, scene))]
    pub fn save(&self, path: &Path, scene: &Scene) -> ApplicationResult<()> {
        let content = render_scene(scene, path)?;
        self.fs
            .ensure_parent(path)
            .with_path_context("create directory for", path)?;
        self.fs
            .write(path, &content)
            .with_path_context("write scene", path)?;
        debug!("saved scene to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"
[[objects]]
name = "Parent"
kind = "armature"
selected = true
active = true

[[objects.bones]]
name = "root"

[[objects.bones]]
name = "spine"
parent = "root"

[[objects]]
name = "Child"
kind = "armature"

[[objects.bones]]
name = "root"

[[objects.bones.constraints]]
kind = "copy_rotation"
name = "Keep"
target = "Parent"
subtarget = "root"
"#;

    #[test]
    fn given_document_when_parsing_then_builds_hierarchy_and_constraints() {
        let scene = parse_scene(DOC, Path::new("scene.toml")).unwrap();

        let parent = scene.lookup("Parent").unwrap();
        assert_eq!(scene.active(), Some(parent));
        let spine = scene.armature(parent).unwrap().bone("spine").unwrap();
        assert!(spine.parent.is_some());

        let child = scene.lookup("Child").unwrap();
        let root = scene.armature(child).unwrap().bone("root").unwrap();
        assert_eq!(root.constraints[0].kind, ConstraintKind::CopyRotation);
        assert_eq!(root.constraints[0].target, Some(parent));
    }

    #[test]
    fn given_bones_on_mesh_when_parsing_then_scene_format_error() {
        let doc = r#"
[[objects]]
name = "Body"
kind = "mesh"

[[objects.bones]]
name = "root"
"#;
        let err = parse_scene(doc, Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, ApplicationError::SceneFormat { .. }));
    }

    #[test]
    fn given_unknown_host_kind_when_parsing_then_loads_as_non_armature() {
        let doc = r#"
[[objects]]
name = "Path"
kind = "curve"
selected = true

[[objects]]
name = "Rig"
kind = "armature"
"#;
        let scene = parse_scene(doc, Path::new("scene.toml")).unwrap();

        let path = scene.lookup("Path").unwrap();
        assert_eq!(scene.get(path).unwrap().kind, ObjectKind::Other);
        assert!(!scene.is_armature(path));
        let err = scene.armature(path).unwrap_err();
        assert_eq!(err.kind(), crate::domain::ErrorKind::InvalidSkeletonType);
    }

    #[test]
    fn given_child_before_parent_when_parsing_then_unknown_parent() {
        let doc = r#"
[[objects]]
name = "Rig"
kind = "armature"

[[objects.bones]]
name = "spine"
parent = "root"

[[objects.bones]]
name = "root"
"#;
        let err = parse_scene(doc, Path::new("bad.toml")).unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Domain(DomainError::UnknownParent { .. })
        ));
    }

    #[test]
    fn given_unknown_constraint_target_when_parsing_then_unknown_object() {
        let doc = r#"
[[objects]]
name = "Rig"
kind = "armature"

[[objects.bones]]
name = "root"

[[objects.bones.constraints]]
kind = "copy_transforms"
target = "Ghost"
subtarget = "root"
"#;
        let err = parse_scene(doc, Path::new("bad.toml")).unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Domain(DomainError::UnknownObject(ref name)) if name == "Ghost"
        ));
    }

    #[test]
    fn given_parsed_scene_when_rendered_then_parses_to_same_structure() {
        let scene = parse_scene(DOC, Path::new("scene.toml")).unwrap();

        let rendered = render_scene(&scene, Path::new("scene.toml")).unwrap();
        let again = parse_scene(&rendered, Path::new("scene.toml")).unwrap();

        let child = again.lookup("Child").unwrap();
        let root = again.armature(child).unwrap().bone("root").unwrap();
        assert_eq!(root.constraints.len(), 1);
        assert_eq!(root.constraints[0].target, again.find("Parent"));
        assert_eq!(again.active(), again.find("Parent"));
    }
}
