//! OBJ-style mesh decoding: attribute collection, vertex dedup and quad
//! triangulation.
//!
//! The decoder runs three passes over transient state that never outlives one
//! call: a line-oriented parse pass collecting raw attribute arrays and face
//! index tuples, a merge pass collapsing repeated (position, normal, uv)
//! index combinations into a deduplicated vertex table, and a triangulation
//! pass splitting quad faces along the better of their two diagonals.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use glam::{Vec2, Vec3};
use log::debug;

use crate::error::{AssetError, Result};
use crate::mesh::{Mesh, MeshContents};

/// Reads a mesh from `path`, dispatching on the file extension.
///
/// Only `.obj` is recognised. On success the previous contents of `mesh` are
/// replaced in full; on any failure `mesh` is left untouched.
pub fn read_mesh_from_file(path: impl AsRef<Path>, mesh: &mut Mesh) -> Result<()> {
    let path = path.as_ref();
    let extension = crate::file_extension(path);
    if extension != "obj" {
        return Err(AssetError::UnsupportedFormat { extension });
    }
    let data = fs::read_to_string(path)
        .map_err(|err| AssetError::io(format!("unable to read {}", path.display()), err))?;
    let decoded = load_obj_from_str(&data)?;
    *mesh = decoded;
    Ok(())
}

/// Writing a mesh back to a text description is declared but intentionally
/// unimplemented; callers must not rely on it.
pub fn write_mesh_to_file(_path: impl AsRef<Path>, _mesh: &Mesh) -> Result<()> {
    Err(AssetError::NotImplemented {
        feature: "mesh writing",
    })
}

/// Parses an OBJ description from memory and returns a populated mesh buffer
/// with deduplicated vertices and a single triangle-index partition.
pub fn load_obj_from_str(data: &str) -> Result<Mesh> {
    let raw = collect_records(data)?;
    raw.check_structure()?;

    let (contents, corner_indices) = merge_vertices(&raw)?;
    let indices = triangulate(&corner_indices, &raw.quad_flags, &contents.positions);

    let mut mesh = Mesh::new();
    mesh.set_contents(MeshContents {
        partitions: vec![indices],
        ..contents
    })?;
    Ok(mesh)
}

/// Raw attribute streams collected during the parse pass. Index sequences
/// hold one entry per face corner, in file order, already 0-based.
#[derive(Debug, Default)]
struct RawObj {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    uvs: Vec<Vec2>,
    position_indices: Vec<u32>,
    normal_indices: Vec<u32>,
    uv_indices: Vec<u32>,
    quad_flags: Vec<bool>,
}

impl RawObj {
    fn check_structure(&self) -> Result<()> {
        if self.position_indices.is_empty() {
            return Err(AssetError::malformed(
                "mesh description contains no face records",
            ));
        }
        if !self.normal_indices.is_empty()
            && self.normal_indices.len() != self.position_indices.len()
        {
            return Err(AssetError::InconsistentAttributeIndexing {
                attribute: "normal",
                actual: self.normal_indices.len(),
                expected: self.position_indices.len(),
            });
        }
        if !self.uv_indices.is_empty() && self.uv_indices.len() != self.position_indices.len() {
            return Err(AssetError::InconsistentAttributeIndexing {
                attribute: "texture coordinate",
                actual: self.uv_indices.len(),
                expected: self.position_indices.len(),
            });
        }
        Ok(())
    }
}

fn collect_records(data: &str) -> Result<RawObj> {
    let mut raw = RawObj::default();

    for (line_no, line) in data.lines().enumerate() {
        let line_no = line_no + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let mut parts = trimmed.split_whitespace();
        let Some(tag) = parts.next() else {
            continue;
        };
        match tag.to_ascii_lowercase().as_str() {
            "v" => {
                let [x, y, z] = parse_floats(parts, line_no, "v")?;
                raw.positions.push(Vec3::new(x, y, z));
            }
            "vn" => {
                let [x, y, z] = parse_floats(parts, line_no, "vn")?;
                raw.normals.push(Vec3::new(x, y, z));
            }
            "vt" => {
                let [u, v] = parse_floats(parts, line_no, "vt")?;
                raw.uvs.push(Vec2::new(u, v));
            }
            "f" => parse_face(parts, line_no, &mut raw)?,
            "usemtl" => {
                // Material libraries are not part of this core.
                debug!("ignoring material reference on line {line_no}");
            }
            _ => {}
        }
    }

    Ok(raw)
}

/// Parses exactly `N` floating values; fewer or more is a malformed record.
fn parse_floats<'a, const N: usize>(
    mut parts: impl Iterator<Item = &'a str>,
    line_no: usize,
    record: &str,
) -> Result<[f32; N]> {
    let mut values = [0.0f32; N];
    for slot in &mut values {
        let token = parts.next().ok_or_else(|| {
            AssetError::malformed_line(
                line_no,
                format!("`{record}` record needs exactly {N} values"),
            )
        })?;
        *slot = token.parse::<f32>().map_err(|_| {
            AssetError::malformed_line(
                line_no,
                format!("unparseable value `{token}` in `{record}` record"),
            )
        })?;
    }
    if parts.next().is_some() {
        return Err(AssetError::malformed_line(
            line_no,
            format!("`{record}` record needs exactly {N} values"),
        ));
    }
    Ok(values)
}

/// Shape of one face corner. All corners within a face must agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CornerShape {
    Position,
    PositionUv,
    PositionNormal,
    PositionUvNormal,
}

#[derive(Debug, Clone, Copy)]
struct Corner {
    position: u32,
    uv: Option<u32>,
    normal: Option<u32>,
}

fn parse_face<'a>(
    parts: impl Iterator<Item = &'a str>,
    line_no: usize,
    raw: &mut RawObj,
) -> Result<()> {
    let mut corners = Vec::with_capacity(4);
    let mut shape = None;
    for token in parts {
        let (corner, corner_shape) = parse_corner(token, line_no)?;
        match shape {
            None => shape = Some(corner_shape),
            Some(first) if first != corner_shape => {
                return Err(AssetError::malformed_line(
                    line_no,
                    "mixed corner shapes within one face",
                ));
            }
            Some(_) => {}
        }
        corners.push(corner);
    }

    if corners.len() != 3 && corners.len() != 4 {
        return Err(AssetError::malformed_line(
            line_no,
            format!("face records need 3 or 4 corners, found {}", corners.len()),
        ));
    }

    for corner in &corners {
        raw.position_indices.push(corner.position);
        if let Some(uv) = corner.uv {
            raw.uv_indices.push(uv);
        }
        if let Some(normal) = corner.normal {
            raw.normal_indices.push(normal);
        }
    }
    raw.quad_flags.push(corners.len() == 4);
    Ok(())
}

fn parse_corner(token: &str, line_no: usize) -> Result<(Corner, CornerShape)> {
    let mut fields = token.split('/');
    let position = parse_source_index(fields.next().unwrap_or(""), line_no)?;
    let second = fields.next();
    let third = fields.next();
    if fields.next().is_some() {
        return Err(AssetError::malformed_line(
            line_no,
            format!("too many `/` separators in face corner `{token}`"),
        ));
    }

    let (uv, normal, shape) = match (second, third) {
        (None, None) => (None, None, CornerShape::Position),
        (Some(uv), None) if !uv.is_empty() => (
            Some(parse_source_index(uv, line_no)?),
            None,
            CornerShape::PositionUv,
        ),
        (Some(""), Some(normal)) if !normal.is_empty() => (
            None,
            Some(parse_source_index(normal, line_no)?),
            CornerShape::PositionNormal,
        ),
        (Some(uv), Some(normal)) if !uv.is_empty() && !normal.is_empty() => (
            Some(parse_source_index(uv, line_no)?),
            Some(parse_source_index(normal, line_no)?),
            CornerShape::PositionUvNormal,
        ),
        _ => {
            return Err(AssetError::malformed_line(
                line_no,
                format!("malformed face corner `{token}`"),
            ));
        }
    };

    Ok((
        Corner {
            position,
            uv,
            normal,
        },
        shape,
    ))
}

/// Converts a 1-based source index to 0-based. Zero, negative (relative) and
/// unparseable indices are rejected.
fn parse_source_index(token: &str, line_no: usize) -> Result<u32> {
    let value = token
        .parse::<i64>()
        .map_err(|_| AssetError::malformed_line(line_no, format!("unparseable index `{token}`")))?;
    if value < 1 {
        return Err(AssetError::malformed_line(
            line_no,
            format!("index `{token}` is not a positive 1-based index"),
        ));
    }
    u32::try_from(value - 1)
        .map_err(|_| AssetError::malformed_line(line_no, format!("index `{token}` is out of range")))
}

/// Composite key identifying a unique output vertex. Absent attributes stay
/// `None` so they can never collide with a valid 0-based index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct MergeKey {
    position: u32,
    normal: Option<u32>,
    uv: Option<u32>,
}

/// Walks every face corner in file order, collapsing repeated merge keys
/// into one output vertex. Returns the deduplicated attribute arrays and the
/// per-corner output indices.
fn merge_vertices(raw: &RawObj) -> Result<(MeshContents, Vec<u32>)> {
    let has_normals = !raw.normal_indices.is_empty();
    let has_uvs = !raw.uv_indices.is_empty();

    let mut merge_map: HashMap<MergeKey, u32> = HashMap::new();
    let mut contents = MeshContents::default();
    let mut corner_indices = Vec::with_capacity(raw.position_indices.len());

    for (i, &position_index) in raw.position_indices.iter().enumerate() {
        let key = MergeKey {
            position: position_index,
            normal: has_normals.then(|| raw.normal_indices[i]),
            uv: has_uvs.then(|| raw.uv_indices[i]),
        };
        let output_index = match merge_map.get(&key) {
            Some(&index) => index,
            None => {
                let index = contents.positions.len() as u32;
                contents
                    .positions
                    .push(lookup(&raw.positions, key.position, "position")?);
                if let Some(normal_index) = key.normal {
                    contents
                        .normals
                        .push(lookup(&raw.normals, normal_index, "normal")?);
                }
                if let Some(uv_index) = key.uv {
                    contents
                        .uvs
                        .push(lookup(&raw.uvs, uv_index, "texture coordinate")?);
                }
                merge_map.insert(key, index);
                index
            }
        };
        corner_indices.push(output_index);
    }

    Ok((contents, corner_indices))
}

fn lookup<T: Copy>(values: &[T], index: u32, attribute: &str) -> Result<T> {
    values.get(index as usize).copied().ok_or_else(|| {
        AssetError::malformed(format!(
            "{attribute} index {} references a record that does not exist ({} defined)",
            index + 1,
            values.len()
        ))
    })
}

/// Emits the triangle list, consuming 3 or 4 deduplicated corner indices per
/// face depending on its quad flag.
///
/// A quad (i1,i2,i3,i4) is split along diagonal 1-3 when the projections of
/// its two adjacent edges onto that diagonal have opposite signs, otherwise
/// along diagonal 2-4. Zero counts as satisfying either side, which keeps
/// degenerate quads on the 1-3 branch.
fn triangulate(corner_indices: &[u32], quad_flags: &[bool], positions: &[Vec3]) -> Vec<u32> {
    let mut indices = Vec::new();
    let mut cursor = 0;
    for &is_quad in quad_flags {
        let i1 = corner_indices[cursor];
        let i2 = corner_indices[cursor + 1];
        let i3 = corner_indices[cursor + 2];
        if !is_quad {
            indices.extend_from_slice(&[i1, i2, i3]);
            cursor += 3;
            continue;
        }

        let i4 = corner_indices[cursor + 3];
        let p1 = positions[i1 as usize];
        let v13 = positions[i3 as usize] - p1;
        let v12 = positions[i2 as usize] - p1;
        let v14 = positions[i4 as usize] - p1;
        let a1 = v13.dot(v12);
        let a2 = v13.dot(v14);
        if (a1 >= 0.0 && a2 <= 0.0) || (a1 <= 0.0 && a2 >= 0.0) {
            indices.extend_from_slice(&[i1, i2, i3, i1, i3, i4]);
        } else {
            indices.extend_from_slice(&[i1, i2, i4, i2, i3, i4]);
        }
        cursor += 4;
    }
    indices
}
