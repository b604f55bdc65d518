//! PIE document assembly: the section emitter.
//!
//! Builds the complete, strictly ordered text document for one root object:
//! header, TYPE/INTERPOLATE, texture block, events, then one LEVEL block
//! per collected level with POINTS, POLYGONS, CONNECTORS, ANIMOBJECT and
//! shadow sections. Sections with a zero count are omitted entirely.

use pie_common::quantize::{column_pad, connector_unit, uv_pair, vertex_unit, wrap_uv_texel, Dec};
use pie_common::{PieVersion, POLY_TEXANIM, POLY_TEXTURED};

use crate::hierarchy;
use crate::mesh::{LevelMesh, Triangle};
use crate::sampler::{self, FrameSample};
use crate::scene::{EvalContext, ObjectId, Scene, TexAnimGroup};

/// The in-progress text document for one root object. Lines are appended
/// in emission order and never reordered.
#[derive(Debug)]
pub struct PieDocument {
    /// Root object name; the writer derives the file name from it.
    pub name: String,
    lines: Vec<String>,
}

impl PieDocument {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            lines: Vec::new(),
        }
    }

    fn push(&mut self, line: String) {
        self.lines.push(line);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The document text: newline-separated, no trailing newline.
    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

/// Assemble the PIE document for one root object.
pub fn emit_object(scene: &Scene, root: ObjectId, ctx: &mut EvalContext) -> PieDocument {
    let ob = scene.object(root);
    let props = &ob.props;
    let version = props.version;
    let mut doc = PieDocument::new(&ob.name);

    doc.push(format!("PIE {version}"));
    doc.push(format!("TYPE {}", props.flags.mask()));
    doc.push(format!("INTERPOLATE {}", props.interpolate as u8));

    if version.legacy_texture_block() {
        if !props.texture.is_empty() {
            doc.push(format!("TEXTURE 0 {} 0 0", props.texture));
        }
        if !props.normal.is_empty() {
            doc.push(format!("NORMALMAP 0 {}", props.normal));
        }
        if !props.specular.is_empty() {
            doc.push(format!("SPECULARMAP 0 {}", props.specular));
        }
    } else {
        for map in &props.tex_maps {
            if !map.name.is_empty() {
                doc.push(format!("{} {} {}", map.slot, map.tileset, map.name));
            }
        }
    }

    for (slot, event) in props.events.iter().enumerate() {
        if !event.is_empty() {
            doc.push(format!("EVENT {} {}", slot + 1, event));
        }
    }

    if !ob.children.is_empty() {
        let levels = hierarchy::collect_levels(scene, root);
        if !levels.is_empty() {
            tracing::debug!("exporting {} levels of {}", levels.len(), doc.name);
            doc.push(format!("LEVELS {}", levels.len()));
        }
        for (number, &level) in levels.iter().enumerate() {
            emit_level(scene, root, level, number + 1, version, ctx, &mut doc);
        }
    }

    doc
}

fn emit_level(
    scene: &Scene,
    root: ObjectId,
    level: ObjectId,
    number: usize,
    version: PieVersion,
    ctx: &mut EvalContext,
    doc: &mut PieDocument,
) {
    let ob = scene.object(level);
    let props = &ob.props;

    tracing::debug!("exporting {} level {number}", doc.name);
    doc.push(format!("LEVEL {number}"));

    if !version.legacy_texture_block() {
        if props.override_flags {
            doc.push(format!("TYPE {}", props.flags.mask()));
        }
        if props.override_interpolate {
            doc.push(format!("INTERPOLATE {}", props.interpolate as u8));
        }
        for map in &props.tex_maps {
            if !map.name.is_empty() {
                doc.push(format!("{} {} {}", map.slot, map.tileset, map.name));
            }
        }
    }

    if let Some(mesh) = &ob.mesh {
        emit_points(mesh, "POINTS", doc);

        if !mesh.triangles.is_empty() {
            doc.push(format!("POLYGONS {}", mesh.triangles.len()));
            for triangle in &mesh.triangles {
                doc.push(polygon_line(triangle, &ob.tex_anim_groups, version));
            }
        }
    }

    let connectors = hierarchy::connectors_of(scene, level);
    if !connectors.is_empty() {
        doc.push(format!("CONNECTORS {}", connectors.len()));
        for &connector in &connectors {
            let loc = scene.object(connector).base.location;
            doc.push(format!(
                "\t{} {} {}",
                connector_unit(loc.x as f64),
                connector_unit(loc.y as f64),
                connector_unit(loc.z as f64)
            ));
        }
    }

    match sampler::end_frame(scene, root, level) {
        Some(frames) => {
            tracing::debug!("exporting {} level {number} animation", doc.name);
            doc.push(format!(
                "ANIMOBJECT {} {} {}",
                props.anim_time, props.anim_cycle, frames
            ));
            let samples = sampler::sample_frames(scene, root, level, frames, ctx);
            for (frame, sample) in samples.iter().enumerate() {
                doc.push(frame_line(frame, sample));
            }
        }
        None => tracing::debug!("{} level {number} has no animation", doc.name),
    }

    if let Some(shadow) = hierarchy::shadow_of(scene, level) {
        if let Some(mesh) = &scene.object(shadow).mesh {
            emit_points(mesh, "SHADOWPOINTS", doc);

            if !mesh.triangles.is_empty() {
                doc.push(format!("SHADOWPOLYGONS {}", mesh.triangles.len()));
                for triangle in &mesh.triangles {
                    // Shadow faces keep the source vertex order and carry
                    // no UVs.
                    doc.push(format!(
                        "\t0 3 {} {} {}",
                        triangle.verts[0], triangle.verts[1], triangle.verts[2]
                    ));
                }
            }
        }
    }
}

/// Vertex block shared by POINTS and SHADOWPOINTS. The y and z axes swap
/// on output.
fn emit_points(mesh: &LevelMesh, header: &str, doc: &mut PieDocument) {
    if mesh.positions.is_empty() {
        return;
    }
    doc.push(format!("{header} {}", mesh.positions.len()));
    for position in &mesh.positions {
        let x = vertex_unit(position[0] as f64);
        let y = vertex_unit(position[1] as f64);
        let z = vertex_unit(position[2] as f64);
        doc.push(format!("\t{x} {z} {y}"));
    }
}

fn polygon_line(triangle: &Triangle, groups: &[TexAnimGroup], version: PieVersion) -> String {
    let tag = triangle.tex_anim.and_then(|index| groups.get(index));
    let (verts, uvs) = triangle.wound();
    let corners = uvs.map(|uv| uv_pair(uv[0], uv[1]));

    let kind = if tag.is_some() {
        POLY_TEXANIM
    } else {
        POLY_TEXTURED
    };
    let mut line = format!("\t{kind} 3 {} {} {}", verts[0], verts[1], verts[2]);

    if let Some(tag) = tag {
        if version.integer_uvs() {
            line.push_str(&format!(
                " {} {} {} {}",
                tag.images,
                tag.rate,
                wrap_uv_texel(tag.width),
                wrap_uv_texel(tag.height)
            ));
        } else {
            line.push_str(&format!(
                " {} {} {} {}",
                tag.images,
                tag.rate,
                Dec::new(tag.width, 4),
                Dec::new(tag.height, 4)
            ));
        }
    }

    for (u, v) in corners {
        if version.integer_uvs() {
            line.push_str(&format!(" {} {}", wrap_uv_texel(u), wrap_uv_texel(v)));
        } else {
            line.push_str(&format!(" {} {}", Dec::new(u, 4), Dec::new(v, 4)));
        }
    }

    line
}

/// One padded sample line of an ANIMOBJECT block. Each field is preceded
/// by its column pad so the per-frame block lines up.
fn frame_line(frame: usize, sample: &FrameSample) -> String {
    let frame = frame.to_string();
    let location = sample.location.map(|v| v.to_string());
    let rotation = sample.rotation.map(|v| v.to_string());
    let scale = sample.scale.map(|v| v.to_string());

    let mut line = column_pad(&frame, 3, 8);
    line.push_str(&frame);
    line.push_str(&column_pad(&location[0], 8, 4));
    line.push_str(&location[0]);

    for field in location[1..]
        .iter()
        .chain(rotation.iter())
        .chain(scale.iter())
    {
        line.push_str(&column_pad(field, 8, 0));
        line.push_str(field);
    }

    line
}
