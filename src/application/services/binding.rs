//! Copy-transforms binding service
//!
//! Validates a request against the scene, runs the traversal for every target armature and
//! applies or strips the resulting bindings.

use tracing::{debug, info, instrument};

use crate::application::ApplicationResult;
use crate::domain::{binding, enumerate_pairs, BindingRequest, BonePair, ObjectId, Scene};

/// Bindings affected on one target armature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetCount {
    pub target: ObjectId,
    pub name: String,
    pub count: usize,
}

/// Outcome of an apply or remove run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingReport {
    /// Sum over all targets
    pub total: usize,
    pub per_target: Vec<TargetCount>,
}

impl BindingReport {
    fn record(&mut self, target: ObjectId, name: &str, count: usize) {
        self.total += count;
        self.per_target.push(TargetCount {
            target,
            name: name.to_string(),
            count,
        });
    }
}

/// Pairs a target armature would receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPairs {
    pub target: ObjectId,
    pub name: String,
    pub pairs: Vec<BonePair>,
}

/// Service applying and removing copy-transforms bindings.
pub struct BindingService {
    constraint_name: String,
}

impl Default for BindingService {
    fn default() -> Self {
        Self::new("Copy Transforms")
    }
}

impl BindingService {
    /// Create a new binding service; `constraint_name` labels every constraint it creates.
    pub fn new(constraint_name: impl Into<String>) -> Self {
        Self {
            constraint_name: constraint_name.into(),
        }
    }

    /// Computes the pairs for every target without touching the scene.
    #[instrument(level = "debug", skip(self, scene))]
    pub fn preview(&self, scene: &Scene, request: &BindingRequest) -> ApplicationResult<Vec<TargetPairs>> {
        let valid = request.validate(scene)?;
        let source = scene.armature(valid.source)?;

        let mut out = Vec::with_capacity(valid.targets.len());
        for &t in &valid.targets {
            let target = scene.armature(t)?;
            let pairs = enumerate_pairs(source, target, &valid.root_bone, valid.mode)?;
            out.push(TargetPairs {
                target: t,
                name: target.name().to_string(),
                pairs,
            });
        }
        Ok(out)
    }

    /// Binds every target armature to the source.
    ///
    /// Each target gets its own traversal against the same source and root bone. Running this
    /// twice doubles the bindings; nothing is deduplicated.
    #[instrument(level = "debug", skip(self, scene))]
    pub fn apply(&self, scene: &mut Scene, request: &BindingRequest) -> ApplicationResult<BindingReport> {
        let valid = request.validate(scene)?;
        debug!(
            "apply: root={} mode={} targets={}",
            valid.root_bone,
            valid.mode,
            valid.targets.len()
        );

        let mut report = BindingReport::default();
        for &t in &valid.targets {
            let pairs = {
                let source = scene.armature(valid.source)?;
                let target = scene.armature(t)?;
                enumerate_pairs(source, target, &valid.root_bone, valid.mode)?
            };
            let target = scene.armature_mut(t)?;
            let created = binding::apply(target, &pairs, valid.source, &self.constraint_name);
            let name = target.name().to_string();
            report.record(t, &name, created);
        }

        info!("Total constraints added: {}", report.total);
        Ok(report)
    }

    /// Strips every copy-transforms binding from each target armature, whatever it points at.
    #[instrument(level = "debug", skip(self, scene))]
    pub fn remove(&self, scene: &mut Scene, request: &BindingRequest) -> ApplicationResult<BindingReport> {
        let targets = request.validate_targets(scene)?;

        let mut report = BindingReport::default();
        for t in targets {
            let target = scene.armature_mut(t)?;
            let removed = binding::remove_all(target);
            let name = target.name().to_string();
            report.record(t, &name, removed);
        }

        info!("Removed {} Copy Transforms constraints", report.total);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ApplicationError;
    use crate::domain::{DomainError, TraversalMode};

    #[test]
    fn given_custom_name_when_applying_then_constraints_use_it() {
        let mut scene = Scene::new();
        let parent = scene.add_armature("Parent").unwrap();
        let child = scene.add_armature("Child").unwrap();
        scene.armature_mut(parent).unwrap().add_bone("root", None).unwrap();
        scene.armature_mut(child).unwrap().add_bone("root", None).unwrap();

        let mut request = BindingRequest::new(TraversalMode::ParentBased);
        request.set_source(&scene, parent).unwrap();
        request.set_target(&scene, child).unwrap();

        let service = BindingService::new("Follow Parent");
        service.apply(&mut scene, &request).unwrap();

        let bone = scene.armature(child).unwrap().bone("root").unwrap();
        assert_eq!(bone.constraints[0].name, "Follow Parent");
    }

    #[test]
    fn given_no_targets_when_removing_then_missing_selection() {
        let mut scene = Scene::new();
        let result = BindingService::default().remove(&mut scene, &BindingRequest::default());
        assert!(matches!(
            result,
            Err(ApplicationError::Domain(DomainError::MissingSelection(_)))
        ));
    }
}
