//! Bone hierarchy rendering for the terminal.

use std::collections::HashMap;

use generational_arena::Index;
use termtree::Tree;

use crate::domain::{Bone, Scene, Skeleton};

fn bone_label(scene: &Scene, bone: &Bone) -> String {
    let bindings: Vec<String> = bone
        .constraints
        .iter()
        .filter(|c| c.is_binding())
        .map(|c| {
            let target = c.target.and_then(|t| scene.name_of(t)).unwrap_or("<none>");
            format!("{}:{}", target, c.subtarget)
        })
        .collect();
    if bindings.is_empty() {
        bone.name.clone()
    } else {
        format!("{} <- {}", bone.name, bindings.join(", "))
    }
}

/// Renders a skeleton as a tree rooted at the armature name, with each bone's bindings shown
/// as `<- Armature:bone`.
///
/// Built bottom-up from a reversed pre-order walk, so every child subtree is finished before its
/// parent picks it up and deep rigs need no recursion.
pub fn skeleton_tree(scene: &Scene, skeleton: &Skeleton) -> Tree<String> {
    let order: Vec<(Index, &Bone)> = skeleton.iter().collect();
    let mut built: HashMap<Index, Tree<String>> = HashMap::with_capacity(order.len());

    for &(idx, bone) in order.iter().rev() {
        let leaves: Vec<Tree<String>> = bone
            .children
            .iter()
            .filter_map(|child| built.remove(child))
            .collect();
        built.insert(idx, Tree::new(bone_label(scene, bone)).with_leaves(leaves));
    }

    let roots: Vec<Tree<String>> = skeleton
        .roots()
        .iter()
        .filter_map(|root| built.remove(root))
        .collect();
    Tree::new(skeleton.name().to_string()).with_leaves(roots)
}
