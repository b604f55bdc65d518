//! Scene manifest loading and the build driver.
//!
//! A manifest is a TOML document declaring the scene graph: one
//! `[[objects]]` entry per object with its role, property bag, transform,
//! mesh file reference and animation curves. Parentless objects are the
//! export roots. Mesh paths resolve relative to the manifest's directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use glam::Vec3;
use hashbrown::HashMap;
use serde::Deserialize;

use pie_common::{PieVersion, TypeFlags};

use crate::document;
use crate::mesh;
use crate::scene::{
    Action, EvalContext, FCurve, Keyframe, ObjectId, PropertyBag, Role, Scene, SceneObject,
    ShadowMode, TexAnimGroup, TexMap, Transform,
};
use crate::writer;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneManifest {
    /// Output directory, relative to the manifest unless absolute.
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default)]
    pub objects: Vec<ObjectEntry>,
}

fn default_output() -> PathBuf {
    PathBuf::from(".")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleEntry {
    Level,
    Connector,
    Shadow,
    #[default]
    None,
}

impl From<RoleEntry> for Role {
    fn from(role: RoleEntry) -> Role {
        match role {
            RoleEntry::Level => Role::Level,
            RoleEntry::Connector => Role::Connector,
            RoleEntry::Shadow => Role::Shadow,
            RoleEntry::None => Role::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadowEntry {
    #[default]
    None,
    Custom,
}

impl From<ShadowEntry> for ShadowMode {
    fn from(mode: ShadowEntry) -> ShadowMode {
        match mode {
            ShadowEntry::None => ShadowMode::None,
            ShadowEntry::Custom => ShadowMode::Custom,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TexMapEntry {
    pub slot: String,
    #[serde(default)]
    pub tileset: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TexAnimGroupEntry {
    pub images: i64,
    pub rate: i64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CurveEntry {
    pub data_path: String,
    #[serde(default)]
    pub index: usize,
    /// `[frame, value]` pairs in ascending frame order.
    pub keyframes: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectEntry {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub role: RoleEntry,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub flags: TypeFlags,
    #[serde(default)]
    pub interpolate: bool,
    #[serde(default)]
    pub texture: String,
    #[serde(default)]
    pub normalmap: String,
    #[serde(default)]
    pub specularmap: String,
    #[serde(default)]
    pub tex_maps: Vec<TexMapEntry>,
    #[serde(default)]
    pub event1: String,
    #[serde(default)]
    pub event2: String,
    #[serde(default)]
    pub event3: String,
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub cycles: i64,
    #[serde(default)]
    pub shadow: ShadowEntry,
    #[serde(default)]
    pub override_flags: bool,
    #[serde(default)]
    pub override_interpolate: bool,
    #[serde(default)]
    pub mesh: Option<PathBuf>,
    #[serde(default)]
    pub location: [f32; 3],
    #[serde(default)]
    pub rotation: [f32; 3],
    #[serde(default = "default_scale")]
    pub scale: [f32; 3],
    #[serde(default)]
    pub parent_bone: String,
    #[serde(default)]
    pub tex_anim_groups: Vec<TexAnimGroupEntry>,
    /// `[source polygon index, group index]` assignments.
    #[serde(default)]
    pub tex_anim_faces: Vec<[usize; 2]>,
    #[serde(default)]
    pub curves: Vec<CurveEntry>,
}

fn default_version() -> String {
    "3".to_string()
}

fn default_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

/// Load and parse a manifest file.
pub fn load_manifest(path: &Path) -> Result<SceneManifest> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read manifest: {:?}", path))?;
    let manifest: SceneManifest =
        toml::from_str(&text).with_context(|| format!("Failed to parse manifest: {:?}", path))?;
    Ok(manifest)
}

/// Resolve a manifest into a scene, loading referenced meshes.
pub fn build_scene(manifest: &SceneManifest, base_dir: &Path) -> Result<Scene> {
    let mut scene = Scene::new();
    let mut ids: HashMap<&str, ObjectId> = HashMap::new();

    for entry in &manifest.objects {
        if ids.contains_key(entry.name.as_str()) {
            bail!("Duplicate object name '{}'", entry.name);
        }

        let version: PieVersion = entry
            .version
            .parse()
            .with_context(|| format!("Object '{}'", entry.name))?;

        let mesh = match &entry.mesh {
            Some(relative) => {
                let path = base_dir.join(relative);
                let face_groups: Vec<(usize, usize)> = entry
                    .tex_anim_faces
                    .iter()
                    .map(|g| (g[0], g[1]))
                    .collect();
                Some(
                    mesh::load_obj(&path, &face_groups)
                        .with_context(|| format!("Object '{}'", entry.name))?,
                )
            }
            None => None,
        };

        let id = scene.add(SceneObject {
            name: entry.name.clone(),
            parent: None,
            children: Vec::new(),
            parent_bone: entry.parent_bone.clone(),
            role: entry.role.into(),
            props: PropertyBag {
                version,
                flags: entry.flags,
                interpolate: entry.interpolate,
                events: [
                    entry.event1.clone(),
                    entry.event2.clone(),
                    entry.event3.clone(),
                ],
                texture: entry.texture.clone(),
                normal: entry.normalmap.clone(),
                specular: entry.specularmap.clone(),
                tex_maps: entry
                    .tex_maps
                    .iter()
                    .map(|map| TexMap {
                        slot: map.slot.clone(),
                        tileset: map.tileset.clone(),
                        name: map.name.clone(),
                    })
                    .collect(),
                override_flags: entry.override_flags,
                override_interpolate: entry.override_interpolate,
                anim_time: entry.time,
                anim_cycle: entry.cycles,
                shadow: entry.shadow.into(),
            },
            base: Transform {
                location: Vec3::from_array(entry.location),
                rotation: Vec3::from_array(entry.rotation),
                scale: Vec3::from_array(entry.scale),
            },
            mesh,
            action: build_action(entry)?,
            tex_anim_groups: entry
                .tex_anim_groups
                .iter()
                .map(|group| TexAnimGroup {
                    images: group.images,
                    rate: group.rate,
                    width: group.width,
                    height: group.height,
                })
                .collect(),
        });
        ids.insert(entry.name.as_str(), id);
    }

    for (child, entry) in manifest.objects.iter().enumerate() {
        if let Some(parent_name) = &entry.parent {
            let Some(&parent) = ids.get(parent_name.as_str()) else {
                bail!(
                    "Object '{}' references unknown parent '{}'",
                    entry.name,
                    parent_name
                );
            };
            if parent == child {
                bail!("Object '{}' cannot parent itself", entry.name);
            }
            scene.link(parent, child);
        }
    }

    // A parent chain longer than the object count means a cycle.
    for id in 0..scene.len() {
        let mut steps = 0;
        let mut current = id;
        while let Some(parent) = scene.object(current).parent {
            steps += 1;
            if steps > scene.len() {
                bail!("Parent cycle involving object '{}'", scene.object(id).name);
            }
            current = parent;
        }
    }

    Ok(scene)
}

fn build_action(entry: &ObjectEntry) -> Result<Option<Action>> {
    if entry.curves.is_empty() {
        return Ok(None);
    }

    let mut curves = Vec::with_capacity(entry.curves.len());
    for curve in &entry.curves {
        let keyframes: Vec<Keyframe> = curve
            .keyframes
            .iter()
            .map(|&[frame, value]| Keyframe {
                frame: frame as f32,
                value: value as f32,
            })
            .collect();
        if keyframes.windows(2).any(|pair| pair[1].frame < pair[0].frame) {
            bail!(
                "Object '{}': keyframes of '{}' are not in ascending frame order",
                entry.name,
                curve.data_path
            );
        }
        curves.push(FCurve {
            data_path: curve.data_path.clone(),
            index: curve.index,
            keyframes,
        });
    }

    Ok(Some(Action { curves }))
}

/// Validate a manifest without writing any output.
pub fn validate(manifest: &SceneManifest, base_dir: &Path) -> Result<()> {
    let scene = build_scene(manifest, base_dir)?;
    if scene.roots().is_empty() {
        bail!("Manifest declares no root objects");
    }
    Ok(())
}

/// Export every root object of a manifest. Returns the written paths.
pub fn build_all(
    manifest: &SceneManifest,
    base_dir: &Path,
    output_override: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    let scene = build_scene(manifest, base_dir)?;
    let out_dir = resolve_output(manifest, base_dir, output_override);
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", out_dir))?;

    let roots = scene.roots();
    if roots.is_empty() {
        tracing::warn!("manifest declares no root objects, nothing to export");
    }

    let mut ctx = EvalContext::new();
    let mut written = Vec::with_capacity(roots.len());
    for root in roots {
        let doc = document::emit_object(&scene, root, &mut ctx);
        tracing::info!(
            "Exporting {} to {:?}",
            writer::pie_file_name(&doc.name),
            out_dir
        );
        written.push(writer::write_document(&doc, &out_dir)?);
    }

    Ok(written)
}

/// Export a single root object by name.
pub fn export_object(
    manifest: &SceneManifest,
    base_dir: &Path,
    name: &str,
    output_override: Option<&Path>,
) -> Result<PathBuf> {
    let scene = build_scene(manifest, base_dir)?;
    let Some(root) = scene.find(name) else {
        bail!("Object '{}' not found in manifest", name);
    };
    if scene.object(root).parent.is_some() {
        bail!("Object '{}' is not a root object", name);
    }

    let out_dir = resolve_output(manifest, base_dir, output_override);
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", out_dir))?;

    let mut ctx = EvalContext::new();
    let doc = document::emit_object(&scene, root, &mut ctx);
    tracing::info!(
        "Exporting {} to {:?}",
        writer::pie_file_name(&doc.name),
        out_dir
    );
    writer::write_document(&doc, &out_dir)
}

fn resolve_output(
    manifest: &SceneManifest,
    base_dir: &Path,
    output_override: Option<&Path>,
) -> PathBuf {
    match output_override {
        Some(dir) => dir.to_path_buf(),
        None => base_dir.join(&manifest.output),
    }
}
