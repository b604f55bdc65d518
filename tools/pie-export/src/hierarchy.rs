//! Export-hierarchy classification and traversal.

use crate::scene::{ObjectId, Role, Scene, ShadowMode};

/// Collect the levels under a root: depth-first, pre-order, so a level's
/// own level-children follow it immediately, before its siblings' subtrees.
/// Level numbering in the document is this order, starting at 1.
pub fn collect_levels(scene: &Scene, root: ObjectId) -> Vec<ObjectId> {
    let mut levels = Vec::new();
    descend(scene, root, &mut levels);
    levels
}

fn descend(scene: &Scene, parent: ObjectId, levels: &mut Vec<ObjectId>) {
    for &child in &scene.object(parent).children {
        let ob = scene.object(child);
        if ob.role == Role::Level && ob.mesh.is_some() {
            levels.push(child);
            descend(scene, child, levels);
        }
    }
}

/// Direct connector children of a level, in scene order. The scan is not
/// recursive.
pub fn connectors_of(scene: &Scene, level: ObjectId) -> Vec<ObjectId> {
    scene
        .object(level)
        .children
        .iter()
        .copied()
        .filter(|&child| scene.object(child).role == Role::Connector)
        .collect()
}

/// The shadow mesh child of a level, honored only in Custom shadow mode.
/// The first Shadow-role child wins; any others are ignored.
pub fn shadow_of(scene: &Scene, level: ObjectId) -> Option<ObjectId> {
    if scene.object(level).props.shadow != ShadowMode::Custom {
        return None;
    }
    scene
        .object(level)
        .children
        .iter()
        .copied()
        .find(|&child| scene.object(child).role == Role::Shadow)
}
