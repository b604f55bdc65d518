//! Per-level animation detection and frame sampling.
//!
//! A level is animated when the root object owns an action and at least one
//! of its curves addresses the level through a bracketed name: the level's
//! own name, its parent's name, or its parent-bone name. Sampling steps the
//! shared frame cursor through every integer frame and quantizes the local
//! transform relative to the exported root.

use glam::EulerRot;

use pie_common::quantize::{anim_location, anim_rotation, anim_scale, Dec};

use crate::scene::{EvalContext, FrameGuard, ObjectId, Scene};

/// One sampled, quantized animation frame.
#[derive(Debug, Clone)]
pub struct FrameSample {
    pub location: [i64; 3],
    pub rotation: [i64; 3],
    pub scale: [Dec; 3],
}

/// End frame for a level: floor of the last keyframe over all matching
/// curves, plus one. `None` means no curve matches and the level has no
/// ANIMOBJECT block.
pub fn end_frame(scene: &Scene, root: ObjectId, level: ObjectId) -> Option<i64> {
    let action = scene.object(root).action.as_ref()?;
    let ob = scene.object(level);

    let mut needles = vec![format!("[\"{}\"]", ob.name)];
    if let Some(parent) = ob.parent {
        needles.push(format!("[\"{}\"]", scene.object(parent).name));
    }
    if !ob.parent_bone.is_empty() {
        needles.push(format!("[\"{}\"]", ob.parent_bone));
    }

    let mut last: Option<f32> = None;
    for curve in &action.curves {
        if !needles.iter().any(|n| curve.data_path.contains(n.as_str())) {
            continue;
        }
        if let Some(frame) = curve.last_frame() {
            last = Some(match last {
                Some(current) => current.max(frame),
                None => frame,
            });
        }
    }

    last.map(|frame| frame.floor() as i64 + 1)
}

/// Sample frames `0..end_frame` for a level. The context's frame cursor is
/// restored on every exit path.
pub fn sample_frames(
    scene: &Scene,
    root: ObjectId,
    level: ObjectId,
    end_frame: i64,
    ctx: &mut EvalContext,
) -> Vec<FrameSample> {
    let mut guard = FrameGuard::new(ctx);
    let mut frames = Vec::with_capacity(end_frame.max(0) as usize);

    for frame in 0..end_frame {
        guard.set_frame(frame as i32);

        let level_world = scene.world_matrix(level, guard.ctx());
        let root_world = scene.world_matrix(root, guard.ctx());

        // Translation comes from the componentwise matrix difference, not a
        // relative transform; rotation and scale from the level's own world
        // matrix.
        let delta = level_world - root_world;
        let location = delta.w_axis.truncate();
        let (scale, rotation, _) = level_world.to_scale_rotation_translation();
        let (ry, rz, rx) = rotation.to_euler(EulerRot::YZX);

        frames.push(FrameSample {
            location: [
                anim_location(location.x as f64),
                anim_location(location.y as f64),
                anim_location(location.z as f64),
            ],
            rotation: [
                anim_rotation(rx as f64),
                anim_rotation(ry as f64),
                anim_rotation(rz as f64),
            ],
            scale: [
                anim_scale(scale.x as f64),
                anim_scale(scale.y as f64),
                anim_scale(scale.z as f64),
            ],
        });
    }

    frames
}
