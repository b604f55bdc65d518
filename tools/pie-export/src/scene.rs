//! In-memory scene graph consumed by the exporter.
//!
//! The scene is an arena of objects with child-index lists; it is built once
//! (from a manifest) and stays immutable for the duration of an export. The
//! only mutable piece of evaluation state is the [`EvalContext`] frame
//! cursor, which world-matrix evaluation reads and animation sampling
//! drives.

use glam::{EulerRot, Mat4, Quat, Vec3};

use pie_common::{PieVersion, TypeFlags};

use crate::mesh::LevelMesh;

pub type ObjectId = usize;

/// Export role of a scene object. Anything that is not a level, connector
/// or shadow mesh is ignored by the exporter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Role {
    Level,
    Connector,
    Shadow,
    #[default]
    Other,
}

/// Shadow-generation mode of a level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShadowMode {
    #[default]
    None,
    Custom,
}

/// One texture-map slot line for version 4 documents.
#[derive(Debug, Clone)]
pub struct TexMap {
    pub slot: String,
    pub tileset: String,
    pub name: String,
}

/// Animated-texture parameters referenced by tagged faces.
#[derive(Debug, Clone, Copy)]
pub struct TexAnimGroup {
    pub images: i64,
    pub rate: i64,
    pub width: f64,
    pub height: f64,
}

/// Export-relevant properties carried by every scene object. Root objects
/// contribute the document-wide fields (version, texture block, events);
/// levels contribute overrides, animation timing and the shadow mode.
#[derive(Debug, Clone)]
pub struct PropertyBag {
    pub version: PieVersion,
    pub flags: TypeFlags,
    pub interpolate: bool,
    pub events: [String; 3],
    pub texture: String,
    pub normal: String,
    pub specular: String,
    pub tex_maps: Vec<TexMap>,
    pub override_flags: bool,
    pub override_interpolate: bool,
    pub anim_time: i64,
    pub anim_cycle: i64,
    pub shadow: ShadowMode,
}

impl Default for PropertyBag {
    fn default() -> Self {
        Self {
            version: PieVersion::V3,
            flags: TypeFlags::default(),
            interpolate: false,
            events: Default::default(),
            texture: String::new(),
            normal: String::new(),
            specular: String::new(),
            tex_maps: Vec::new(),
            override_flags: false,
            override_interpolate: false,
            anim_time: 0,
            anim_cycle: 0,
            shadow: ShadowMode::None,
        }
    }
}

/// Base local transform of an object (before any curve overrides).
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    pub location: Vec3,
    /// Euler angles in radians, XYZ order.
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            location: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.location)
    }
}

/// A single keyframe on an animation curve.
#[derive(Debug, Clone, Copy)]
pub struct Keyframe {
    pub frame: f32,
    pub value: f32,
}

/// One keyframe curve, addressing a single transform component through a
/// data path such as `pose.bones["turret"].rotation_euler`.
#[derive(Debug, Clone)]
pub struct FCurve {
    pub data_path: String,
    pub index: usize,
    pub keyframes: Vec<Keyframe>,
}

impl FCurve {
    /// Frame of the last keyframe, if the curve has any.
    pub fn last_frame(&self) -> Option<f32> {
        self.keyframes.last().map(|k| k.frame)
    }

    /// Sample the curve at a frame: linear between keys, constant outside
    /// them.
    pub fn sample(&self, frame: f32) -> f32 {
        let keys = &self.keyframes;
        if keys.is_empty() {
            return 0.0;
        }

        let mut i = 0;
        while i < keys.len() - 1 && keys[i + 1].frame < frame {
            i += 1;
        }
        if i >= keys.len() - 1 {
            return keys[keys.len() - 1].value;
        }

        let k0 = keys[i];
        let k1 = keys[i + 1];
        let factor = if k1.frame > k0.frame {
            (frame - k0.frame) / (k1.frame - k0.frame)
        } else {
            0.0
        };
        let factor = factor.clamp(0.0, 1.0);

        k0.value + (k1.value - k0.value) * factor
    }
}

/// The set of curves authored on one object.
#[derive(Debug, Clone, Default)]
pub struct Action {
    pub curves: Vec<FCurve>,
}

#[derive(Debug)]
pub struct SceneObject {
    pub name: String,
    pub parent: Option<ObjectId>,
    pub children: Vec<ObjectId>,
    pub parent_bone: String,
    pub role: Role,
    pub props: PropertyBag,
    pub base: Transform,
    pub mesh: Option<LevelMesh>,
    pub action: Option<Action>,
    pub tex_anim_groups: Vec<TexAnimGroup>,
}

/// Arena of scene objects. Object ids are indices into the arena; sibling
/// order is insertion order.
#[derive(Debug, Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
}

/// Which transform channel a curve's data path addresses.
enum Channel {
    Location,
    Rotation,
    Scale,
}

impl Channel {
    fn of(data_path: &str) -> Option<Channel> {
        if data_path.ends_with("location") {
            Some(Channel::Location)
        } else if data_path.ends_with("rotation_euler") {
            Some(Channel::Rotation)
        } else if data_path.ends_with("scale") {
            Some(Channel::Scale)
        } else {
            None
        }
    }
}

/// Extract the bracketed `["name"]` component of a data path, if any.
pub fn bracket_target(data_path: &str) -> Option<&str> {
    let start = data_path.find("[\"")? + 2;
    let end = data_path[start..].find("\"]")? + start;
    Some(&data_path[start..end])
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, object: SceneObject) -> ObjectId {
        let id = self.objects.len();
        self.objects.push(object);
        id
    }

    /// Attach `child` under `parent`, preserving insertion order among
    /// siblings.
    pub fn link(&mut self, parent: ObjectId, child: ObjectId) {
        self.objects[child].parent = Some(parent);
        self.objects[parent].children.push(child);
    }

    pub fn object(&self, id: ObjectId) -> &SceneObject {
        &self.objects[id]
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Parentless objects, in insertion order. These are the export roots.
    pub fn roots(&self) -> Vec<ObjectId> {
        self.objects
            .iter()
            .enumerate()
            .filter(|(_, ob)| ob.parent.is_none())
            .map(|(id, _)| id)
            .collect()
    }

    pub fn find(&self, name: &str) -> Option<ObjectId> {
        self.objects.iter().position(|ob| ob.name == name)
    }

    /// Local transform of an object at the context's current frame: the
    /// base transform with curve-driven channels overridden. A curve drives
    /// the object named in its bracketed path component, or the action's
    /// owner when the path has none.
    fn local_matrix(&self, id: ObjectId, ctx: &EvalContext) -> Mat4 {
        let ob = &self.objects[id];
        let mut trs = ob.base;
        let frame = ctx.frame() as f32;

        for (owner, action) in self
            .objects
            .iter()
            .enumerate()
            .filter_map(|(i, o)| o.action.as_ref().map(|a| (i, a)))
        {
            for curve in &action.curves {
                let drives = match bracket_target(&curve.data_path) {
                    Some(target) => target == ob.name,
                    None => owner == id,
                };
                if !drives || curve.index > 2 {
                    continue;
                }
                let Some(channel) = Channel::of(&curve.data_path) else {
                    continue;
                };
                let value = curve.sample(frame);
                match channel {
                    Channel::Location => trs.location[curve.index] = value,
                    Channel::Rotation => trs.rotation[curve.index] = value,
                    Channel::Scale => trs.scale[curve.index] = value,
                }
            }
        }

        trs.matrix()
    }

    /// World matrix of an object at the context's current frame.
    pub fn world_matrix(&self, id: ObjectId, ctx: &EvalContext) -> Mat4 {
        let local = self.local_matrix(id, ctx);
        match self.objects[id].parent {
            Some(parent) => self.world_matrix(parent, ctx) * local,
            None => local,
        }
    }
}

/// The animation evaluation state: a single current-frame register shared
/// by everything that evaluates world matrices.
#[derive(Debug, Default)]
pub struct EvalContext {
    frame: i32,
}

impl EvalContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame(&self) -> i32 {
        self.frame
    }

    pub fn set_frame(&mut self, frame: i32) {
        self.frame = frame;
    }
}

/// Saves the context's frame on creation and restores it on drop, so a
/// sampling loop cannot leak a moved cursor on any exit path.
pub struct FrameGuard<'a> {
    ctx: &'a mut EvalContext,
    saved: i32,
}

impl<'a> FrameGuard<'a> {
    pub fn new(ctx: &'a mut EvalContext) -> Self {
        let saved = ctx.frame();
        Self { ctx, saved }
    }

    pub fn set_frame(&mut self, frame: i32) {
        self.ctx.set_frame(frame);
    }

    pub fn ctx(&self) -> &EvalContext {
        self.ctx
    }
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        self.ctx.set_frame(self.saved);
    }
}
