//! Bone-tree traversal: decides which target bones get bound to which source bones.

use tracing::{debug, instrument};

use crate::domain::arena::Skeleton;
use crate::domain::entities::{BonePair, TraversalMode};
use crate::domain::error::{DomainError, DomainResult};

/// Enumerates the (target bone, source bone) pairs that should receive a binding.
///
/// * `ParentBased`: pre-order walk of `source` from `root_bone`. Every bone of the subtree is
///   visited, matched or not, and a pair is emitted whenever `target` has a bone of the same
///   name. Fails with `RootBoneNotFound` if `root_bone` is not in `source`.
/// * `ChildBased`: every bone of `target` in enumeration order, emitting when `source` has a
///   bone of the same name. `root_bone` is not consulted at all.
///
/// Names match by exact, case-sensitive equality. Nothing is mutated.
#[instrument(level = "debug", skip(source, target), fields(source = source.name(), target = target.name()))]
pub fn enumerate_pairs(
    source: &Skeleton,
    target: &Skeleton,
    root_bone: &str,
    mode: TraversalMode,
) -> DomainResult<Vec<BonePair>> {
    let pairs = match mode {
        TraversalMode::ParentBased => parent_based(source, target, root_bone)?,
        TraversalMode::ChildBased => child_based(source, target),
    };
    debug!("{} pairs", pairs.len());
    Ok(pairs)
}

fn parent_based(source: &Skeleton, target: &Skeleton, root_bone: &str) -> DomainResult<Vec<BonePair>> {
    let root = source
        .index_of(root_bone)
        .ok_or_else(|| DomainError::RootBoneNotFound {
            bone: root_bone.to_string(),
            armature: source.name().to_string(),
        })?;

    Ok(source
        .descendants(root)
        .filter(|(_, bone)| target.contains(&bone.name))
        .map(|(_, bone)| BonePair::new(&bone.name, &bone.name))
        .collect())
}

fn child_based(source: &Skeleton, target: &Skeleton) -> Vec<BonePair> {
    target
        .bones()
        .filter(|bone| source.contains(&bone.name))
        .map(|bone| BonePair::new(&bone.name, &bone.name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skeleton(name: &str, bones: &[(&str, Option<&str>)]) -> Skeleton {
        let mut sk = Skeleton::new(name);
        for (bone, parent) in bones {
            sk.add_bone(bone, *parent).unwrap();
        }
        sk
    }

    fn targets(pairs: &[BonePair]) -> Vec<&str> {
        pairs.iter().map(|p| p.target.as_str()).collect()
    }

    #[test]
    fn given_unmatched_middle_bone_when_parent_based_then_descends_past_it() {
        // root -> gap -> hand; target lacks "gap"
        let source = skeleton("S", &[("root", None), ("gap", Some("root")), ("hand", Some("gap"))]);
        let target = skeleton("T", &[("hand", None), ("root", None)]);

        let pairs = enumerate_pairs(&source, &target, "root", TraversalMode::ParentBased).unwrap();

        assert_eq!(targets(&pairs), vec!["root", "hand"]);
    }

    #[test]
    fn given_branch_when_parent_based_from_root_then_finishes_first_branch_before_sibling() {
        // root -> (spine -> head, tail)
        let source = skeleton(
            "S",
            &[("root", None), ("spine", Some("root")), ("head", Some("spine")), ("tail", Some("root"))],
        );
        let full = skeleton("T", &[("tail", None), ("head", None), ("spine", None), ("root", None)]);
        let partial = skeleton("T", &[("tail", None), ("head", None), ("root", None)]);

        let all = enumerate_pairs(&source, &full, "root", TraversalMode::ParentBased).unwrap();
        let some = enumerate_pairs(&source, &partial, "root", TraversalMode::ParentBased).unwrap();

        assert_eq!(targets(&all), vec!["root", "spine", "head", "tail"]);
        assert_eq!(targets(&some), vec!["root", "head", "tail"]);
    }

    #[test]
    fn given_subtree_root_when_parent_based_then_ignores_bones_outside_subtree() {
        let source = skeleton(
            "S",
            &[("root", None), ("arm", Some("root")), ("hand", Some("arm")), ("leg", Some("root"))],
        );
        let target = skeleton("T", &[("root", None), ("arm", None), ("hand", None), ("leg", None)]);

        let pairs = enumerate_pairs(&source, &target, "arm", TraversalMode::ParentBased).unwrap();

        assert_eq!(targets(&pairs), vec!["arm", "hand"]);
    }

    #[test]
    fn given_missing_root_when_parent_based_then_root_bone_not_found() {
        let source = skeleton("S", &[("root", None)]);
        let target = skeleton("T", &[("root", None)]);

        let err = enumerate_pairs(&source, &target, "Root", TraversalMode::ParentBased).unwrap_err();

        assert_eq!(
            err,
            DomainError::RootBoneNotFound {
                bone: "Root".into(),
                armature: "S".into()
            }
        );
    }

    #[test]
    fn given_missing_root_when_child_based_then_root_is_ignored() {
        let source = skeleton("S", &[("root", None), ("spine", Some("root"))]);
        let target = skeleton("T", &[("spine", None), ("root", Some("spine"))]);

        let pairs = enumerate_pairs(&source, &target, "nowhere", TraversalMode::ChildBased).unwrap();

        assert_eq!(targets(&pairs), vec!["spine", "root"]);
    }

    #[test]
    fn given_case_difference_when_matching_then_no_pair() {
        let source = skeleton("S", &[("Spine", None)]);
        let target = skeleton("T", &[("spine", None)]);

        let pairs = enumerate_pairs(&source, &target, "Spine", TraversalMode::ParentBased).unwrap();

        assert!(pairs.is_empty());
    }

    #[test]
    fn given_empty_target_when_either_mode_then_empty() {
        let source = skeleton("S", &[("root", None)]);
        let target = Skeleton::new("T");

        for mode in [TraversalMode::ParentBased, TraversalMode::ChildBased] {
            let pairs = enumerate_pairs(&source, &target, "root", mode).unwrap();
            assert!(pairs.is_empty(), "{mode} should yield nothing");
        }
    }

    #[test]
    fn given_deep_chain_when_parent_based_then_walks_without_recursion() {
        let mut source = Skeleton::new("S");
        let mut target = Skeleton::new("T");
        let mut parent: Option<String> = None;
        for i in 0..5000 {
            let name = format!("bone.{i:04}");
            source.add_bone(&name, parent.as_deref()).unwrap();
            target.add_bone(&name, None).unwrap();
            parent = Some(name);
        }

        let pairs = enumerate_pairs(&source, &target, "bone.0000", TraversalMode::ParentBased).unwrap();

        assert_eq!(pairs.len(), 5000);
        assert_eq!(pairs[4999].source, "bone.4999");
    }
}
