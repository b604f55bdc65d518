//! Level mesh data and Wavefront OBJ loading.
//!
//! PIE is an indexed format: POINTS lists shared vertices and POLYGONS
//! reference them with per-corner UVs inline. The loader therefore keeps
//! the OBJ position table as-is and only expands faces, fan-triangulating
//! polygons with more than three corners.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{bail, Context, Result};
use hashbrown::HashMap;

/// One triangulated face: vertex indices, per-corner UVs and an optional
/// tex-anim group tag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub verts: [usize; 3],
    pub uvs: [[f32; 2]; 3],
    pub tex_anim: Option<usize>,
}

impl Triangle {
    /// Emission order for the target engine's winding: vertices come out as
    /// (v0, v2, v1) and the per-corner UVs follow the same permutation.
    pub fn wound(&self) -> ([usize; 3], [[f32; 2]; 3]) {
        (
            [self.verts[0], self.verts[2], self.verts[1]],
            [self.uvs[0], self.uvs[2], self.uvs[1]],
        )
    }
}

/// Already-evaluated, triangulated mesh data for one level or shadow.
#[derive(Debug, Clone, Default)]
pub struct LevelMesh {
    pub positions: Vec<[f32; 3]>,
    pub triangles: Vec<Triangle>,
}

/// Load a Wavefront OBJ file. `face_groups` assigns tex-anim group indices
/// by source polygon index; every triangle fanned out of a tagged polygon
/// inherits its tag. An empty mesh is not an error - the exporter omits
/// the corresponding sections.
pub fn load_obj(input: &Path, face_groups: &[(usize, usize)]) -> Result<LevelMesh> {
    let file = File::open(input).with_context(|| format!("Failed to open OBJ: {:?}", input))?;
    let reader = BufReader::new(file);

    let groups: HashMap<usize, usize> = face_groups.iter().copied().collect();

    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut tex_coords: Vec<[f32; 2]> = Vec::new();
    let mut triangles: Vec<Triangle> = Vec::new();
    let mut polygon = 0usize;

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }

        match parts[0] {
            "v" if parts.len() >= 4 => {
                let x: f32 = parts[1].parse().unwrap_or(0.0);
                let y: f32 = parts[2].parse().unwrap_or(0.0);
                let z: f32 = parts[3].parse().unwrap_or(0.0);
                positions.push([x, y, z]);
            }
            "vt" if parts.len() >= 3 => {
                let u: f32 = parts[1].parse().unwrap_or(0.0);
                let v: f32 = parts[2].parse().unwrap_or(0.0);
                tex_coords.push([u, v]);
            }
            "f" if parts.len() >= 4 => {
                let face_verts: Vec<(usize, Option<usize>)> = parts[1..]
                    .iter()
                    .filter_map(|v| parse_obj_vertex(v))
                    .collect();

                if face_verts.len() < 3 {
                    polygon += 1;
                    continue;
                }

                let tex_anim = groups.get(&polygon).copied();

                // Fan triangulation for convex polygons
                for i in 1..face_verts.len() - 1 {
                    let mut verts = [0usize; 3];
                    let mut uvs = [[0.0f32; 2]; 3];
                    for (corner, &idx) in [0, i, i + 1].iter().enumerate() {
                        let (vi, vti) = face_verts[idx];
                        if vi >= positions.len() {
                            bail!(
                                "OBJ face references vertex {} but only {} exist: {:?}",
                                vi + 1,
                                positions.len(),
                                input
                            );
                        }
                        verts[corner] = vi;
                        if let Some(ti) = vti {
                            uvs[corner] = tex_coords.get(ti).copied().unwrap_or([0.0; 2]);
                        }
                    }
                    triangles.push(Triangle {
                        verts,
                        uvs,
                        tex_anim,
                    });
                }

                polygon += 1;
            }
            _ => {}
        }
    }

    Ok(LevelMesh {
        positions,
        triangles,
    })
}

/// Parse an OBJ vertex reference: "v", "v/vt", "v/vt/vn", or "v//vn".
fn parse_obj_vertex(s: &str) -> Option<(usize, Option<usize>)> {
    let parts: Vec<&str> = s.split('/').collect();

    let vi = parts.first()?.parse::<usize>().ok()?.checked_sub(1)?; // OBJ indices are 1-based

    let vti = parts
        .get(1)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<usize>().ok())
        .and_then(|i| i.checked_sub(1));

    Some((vi, vti))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_obj(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp obj");
        file.write_all(content.as_bytes()).expect("write obj");
        file
    }

    #[test]
    fn loads_indexed_triangle_with_uvs() {
        let obj = write_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 0 1\nf 1/1 2/2 3/3\n");
        let mesh = load_obj(obj.path(), &[]).expect("load");
        assert_eq!(mesh.positions.len(), 3);
        assert_eq!(mesh.triangles.len(), 1);
        assert_eq!(mesh.triangles[0].verts, [0, 1, 2]);
        assert_eq!(mesh.triangles[0].uvs[1], [1.0, 0.0]);
        assert_eq!(mesh.triangles[0].tex_anim, None);
    }

    #[test]
    fn fan_triangulates_quads() {
        let obj = write_obj("v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n");
        let mesh = load_obj(obj.path(), &[]).expect("load");
        assert_eq!(mesh.triangles.len(), 2);
        assert_eq!(mesh.triangles[0].verts, [0, 1, 2]);
        assert_eq!(mesh.triangles[1].verts, [0, 2, 3]);
    }

    #[test]
    fn face_groups_tag_all_fanned_triangles() {
        let obj = write_obj("v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3\nf 1 2 3 4\n");
        let mesh = load_obj(obj.path(), &[(1, 0)]).expect("load");
        assert_eq!(mesh.triangles[0].tex_anim, None);
        assert_eq!(mesh.triangles[1].tex_anim, Some(0));
        assert_eq!(mesh.triangles[2].tex_anim, Some(0));
    }

    #[test]
    fn empty_obj_is_not_an_error() {
        let obj = write_obj("# nothing here\n");
        let mesh = load_obj(obj.path(), &[]).expect("load");
        assert!(mesh.positions.is_empty());
        assert!(mesh.triangles.is_empty());
    }

    #[test]
    fn winding_permutation_swaps_last_two_corners() {
        let tri = Triangle {
            verts: [7, 8, 9],
            uvs: [[0.1, 0.2], [0.3, 0.4], [0.5, 0.6]],
            tex_anim: None,
        };
        let (verts, uvs) = tri.wound();
        assert_eq!(verts, [7, 9, 8]);
        assert_eq!(uvs, [[0.1, 0.2], [0.5, 0.6], [0.3, 0.4]]);
    }
}
