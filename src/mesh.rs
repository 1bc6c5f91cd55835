use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{AssetError, Result};

/// Fully decoded mesh contents, installed into a [`Mesh`] in one atomic
/// replacement.
///
/// Attribute arrays are parallel: `normals` and `uvs` are either empty or
/// exactly as long as `positions`. Each partition is a flat triangle list of
/// indices into the attribute arrays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshContents {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub partitions: Vec<Vec<u32>>,
}

/// Renderer-ready indexed triangle mesh produced by the decoders.
///
/// The buffer is owned by the caller and only ever mutated through
/// [`Mesh::set_contents`], which validates the structural invariants and
/// replaces the previous contents in full.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Mesh {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    uvs: Vec<Vec2>,
    partitions: Vec<Vec<u32>>,
}

impl Mesh {
    /// Creates an empty mesh buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `contents` and installs it, replacing whatever the buffer
    /// held before. On error the previous contents are kept.
    pub fn set_contents(&mut self, contents: MeshContents) -> Result<()> {
        validate_contents(&contents)?;
        self.positions = contents.positions;
        self.normals = contents.normals;
        self.uvs = contents.uvs;
        self.partitions = contents.partitions;
        Ok(())
    }

    /// Releases all vertex and index data, leaving an empty buffer.
    pub fn destroy(&mut self) {
        *self = Self::default();
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    pub fn has_uvs(&self) -> bool {
        !self.uvs.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn uvs(&self) -> &[Vec2] {
        &self.uvs
    }

    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    /// Triangle indices of one partition, as a flat list with stride 3.
    pub fn indices(&self, partition: usize) -> &[u32] {
        &self.partitions[partition]
    }

    pub fn triangle_count(&self, partition: usize) -> usize {
        self.partitions[partition].len() / 3
    }

    /// Total triangle count across all partitions.
    pub fn total_triangle_count(&self) -> usize {
        self.partitions.iter().map(|p| p.len() / 3).sum()
    }

    /// Raw position bytes, ready for GPU upload.
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Raw normal bytes; empty when the mesh carries no normals.
    pub fn normal_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.normals)
    }

    /// Raw UV bytes; empty when the mesh carries no texture coordinates.
    pub fn uv_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.uvs)
    }

    /// Raw index bytes of one partition, ready for GPU upload.
    pub fn index_bytes(&self, partition: usize) -> &[u8] {
        bytemuck::cast_slice(&self.partitions[partition])
    }
}

fn validate_contents(contents: &MeshContents) -> Result<()> {
    let vertex_count = contents.positions.len();
    if !contents.normals.is_empty() && contents.normals.len() != vertex_count {
        return Err(AssetError::InconsistentAttributeIndexing {
            attribute: "normal",
            actual: contents.normals.len(),
            expected: vertex_count,
        });
    }
    if !contents.uvs.is_empty() && contents.uvs.len() != vertex_count {
        return Err(AssetError::InconsistentAttributeIndexing {
            attribute: "texture coordinate",
            actual: contents.uvs.len(),
            expected: vertex_count,
        });
    }
    for (part, indices) in contents.partitions.iter().enumerate() {
        if indices.len() % 3 != 0 {
            return Err(AssetError::malformed(format!(
                "index partition {part} holds {} indices, not a multiple of 3",
                indices.len()
            )));
        }
        if let Some(&out_of_range) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(AssetError::malformed(format!(
                "index partition {part} references vertex {out_of_range} but only {vertex_count} vertices exist"
            )));
        }
    }
    Ok(())
}
