//! Binding manager: creates and strips copy-transforms constraints on a target skeleton.

use tracing::{debug, instrument, trace};

use crate::domain::arena::Skeleton;
use crate::domain::entities::{BonePair, Constraint, ObjectId};

/// Attaches one copy-transforms constraint per pair to `target`, driven by `source`.
///
/// A new constraint is always created, even when an identical one already exists. Pairs whose
/// target bone is missing are skipped. Returns the number of constraints created.
#[instrument(level = "debug", skip(target, pairs), fields(target = target.name(), pairs = pairs.len()))]
pub fn apply(target: &mut Skeleton, pairs: &[BonePair], source: ObjectId, constraint_name: &str) -> usize {
    let mut created = 0;
    for pair in pairs {
        match target.bone_mut(&pair.target) {
            Some(bone) => {
                bone.constraints
                    .push(Constraint::copy_transforms(constraint_name, source, &pair.source));
                created += 1;
            }
            None => trace!("skipping {}: not in {}", pair.target, target.name()),
        }
    }
    debug!("created {} constraints", created);
    created
}

/// Removes every copy-transforms constraint from every bone of `target`, whatever its source.
///
/// Constraints of other kinds are kept. Returns the number removed.
#[instrument(level = "debug", skip(target), fields(target = target.name()))]
pub fn remove_all(target: &mut Skeleton) -> usize {
    let mut removed = 0;
    for bone in target.bones_mut() {
        let before = bone.constraints.len();
        bone.constraints.retain(|c| !c.is_binding());
        removed += before - bone.constraints.len();
    }
    debug!("removed {} constraints", removed);
    removed
}
