//! Edge detection for triangle meshes
//!
//! Extracts edges from display meshes, keeps the two triangles each edge
//! borders, and filters the ones where the surface actually creases.

use std::collections::HashMap;

use glam::Vec3;

use super::mesh::MeshData;
use crate::geometry::surface::{quantize_position, QuantizedPos};

/// Represents an edge in a mesh
#[derive(Debug, Clone)]
pub struct MeshEdge {
    pub start: Vec3,
    pub end: Vec3,
    pub normal1: Vec3,
    pub normal2: Option<Vec3>,
    /// Triangles on either side
    pub triangles: (usize, Option<usize>),
}

impl MeshEdge {
    /// Angle between the adjacent face normals (radians); 0 for flat or border edges
    pub fn dihedral_angle(&self) -> f32 {
        if let Some(n2) = self.normal2 {
            self.normal1.dot(n2).clamp(-1.0, 1.0).acos()
        } else {
            0.0
        }
    }

    /// Check if this is a "sharp" edge (faces meet at angle)
    pub fn is_sharp(&self, threshold_degrees: f32) -> bool {
        self.dihedral_angle().to_degrees() > threshold_degrees
    }
}

fn edge_key(p1: QuantizedPos, p2: QuantizedPos) -> (QuantizedPos, QuantizedPos) {
    if p1 < p2 { (p1, p2) } else { (p2, p1) }
}

/// Extract all edges from a mesh
pub fn extract_edges(mesh: &MeshData) -> Vec<MeshEdge> {
    let mut edge_map: HashMap<(QuantizedPos, QuantizedPos), MeshEdge> = HashMap::new();

    for tri_idx in 0..mesh.triangle_count() {
        let [v0, v1, v2] = mesh.triangle(tri_idx);
        let normal = mesh
            .normal(mesh.indices[tri_idx * 3] as usize)
            .normalize_or_zero();

        let q0 = quantize_position(v0);
        let q1 = quantize_position(v1);
        let q2 = quantize_position(v2);

        for (qa, qb, va, vb) in [(q0, q1, v0, v1), (q1, q2, v1, v2), (q2, q0, v2, v0)] {
            if qa == qb {
                continue;
            }
            edge_map
                .entry(edge_key(qa, qb))
                .and_modify(|e| {
                    if e.normal2.is_none() {
                        e.normal2 = Some(normal);
                        e.triangles.1 = Some(tri_idx);
                    }
                })
                .or_insert(MeshEdge {
                    start: va,
                    end: vb,
                    normal1: normal,
                    normal2: None,
                    triangles: (tri_idx, None),
                });
        }
    }

    edge_map.into_values().collect()
}

/// Extract only sharp edges (edges where faces meet at an angle)
pub fn extract_sharp_edges(mesh: &MeshData, threshold_degrees: f32) -> Vec<MeshEdge> {
    extract_edges(mesh)
        .into_iter()
        .filter(|e| e.is_sharp(threshold_degrees))
        .collect()
}
