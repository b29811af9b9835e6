//! Closed triangulated surfaces
//!
//! A `Surface` is the indexed (welded) representation of a solid. Both CSG
//! operands and the displayed solid are stored this way; display buffers are
//! derived from it on demand.

use std::collections::HashMap;

use glam::{Affine3A, Vec3};
use shared::{Axis, FaceLabel};

use crate::viewport::picking::Aabb;

/// Quantized position used to weld coincident vertices
pub type QuantizedPos = (i64, i64, i64);

pub fn quantize_position(pos: Vec3) -> QuantizedPos {
    let scale = 10000.0;
    (
        (pos.x * scale).round() as i64,
        (pos.y * scale).round() as i64,
        (pos.z * scale).round() as i64,
    )
}

/// Indexed triangle surface with one logical face tag (material slot) per triangle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Surface {
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub face_tags: Vec<FaceLabel>,
}

impl Surface {
    /// Build from flat `[x, y, z, ...]` positions; faces are tagged by normal
    pub fn from_flat(positions: &[f32], indices: &[u32]) -> Self {
        let positions = positions
            .chunks_exact(3)
            .map(|p| Vec3::new(p[0], p[1], p[2]))
            .collect();
        let mut surface = Self {
            positions,
            indices: indices.to_vec(),
            face_tags: Vec::new(),
        };
        surface.retag_faces_by_normal();
        surface
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Corner positions of a triangle
    pub fn triangle(&self, tri: usize) -> [Vec3; 3] {
        let base = tri * 3;
        [
            self.positions[self.indices[base] as usize],
            self.positions[self.indices[base + 1] as usize],
            self.positions[self.indices[base + 2] as usize],
        ]
    }

    /// Unit normal from the triangle winding (zero for degenerate triangles)
    pub fn triangle_normal(&self, tri: usize) -> Vec3 {
        let [a, b, c] = self.triangle(tri);
        (b - a).cross(c - a).normalize_or_zero()
    }

    /// Positions flattened to `[x, y, z, ...]`
    pub fn flat_positions(&self) -> Vec<f32> {
        self.positions.iter().flat_map(|p| p.to_array()).collect()
    }

    /// Copy with `transform` baked into the positions.
    /// Mirroring transforms flip the winding so normals stay outward.
    pub fn transformed(&self, transform: &Affine3A) -> Surface {
        let mut out = Surface {
            positions: self
                .positions
                .iter()
                .map(|p| transform.transform_point3(*p))
                .collect(),
            indices: self.indices.clone(),
            face_tags: self.face_tags.clone(),
        };
        if transform.matrix3.determinant() < 0.0 {
            out.flip_winding();
        }
        out
    }

    /// Merge vertices that quantize to the same position and drop collapsed triangles
    pub fn welded(&self) -> Surface {
        let mut remap: HashMap<QuantizedPos, u32> = HashMap::new();
        let mut positions = Vec::new();
        let mut new_index = Vec::with_capacity(self.positions.len());

        for p in &self.positions {
            let idx = *remap.entry(quantize_position(*p)).or_insert_with(|| {
                positions.push(*p);
                (positions.len() - 1) as u32
            });
            new_index.push(idx);
        }

        let mut indices = Vec::with_capacity(self.indices.len());
        let mut face_tags = Vec::with_capacity(self.face_tags.len());
        for tri in 0..self.triangle_count() {
            let [a, b, c] = [0, 1, 2].map(|k| new_index[self.indices[tri * 3 + k] as usize]);
            if a == b || b == c || c == a {
                continue;
            }
            indices.extend_from_slice(&[a, b, c]);
            if let Some(tag) = self.face_tags.get(tri) {
                face_tags.push(*tag);
            }
        }

        Surface { positions, indices, face_tags }
    }

    pub fn flip_winding(&mut self) {
        for tri in self.indices.chunks_exact_mut(3) {
            tri.swap(1, 2);
        }
    }

    /// Signed volume via the divergence theorem; positive for outward winding
    pub fn signed_volume(&self) -> f32 {
        (0..self.triangle_count())
            .map(|t| {
                let [a, b, c] = self.triangle(t);
                a.dot(b.cross(c))
            })
            .sum::<f32>()
            / 6.0
    }

    pub fn volume(&self) -> f32 {
        self.signed_volume().abs()
    }

    /// Make the winding outward-facing. Returns true if it had to flip.
    pub fn orient_outward(&mut self) -> bool {
        if self.signed_volume() < 0.0 {
            self.flip_winding();
            true
        } else {
            false
        }
    }

    /// Assign each triangle the logical face its normal points at
    pub fn retag_faces_by_normal(&mut self) {
        self.face_tags = (0..self.triangle_count())
            .map(|t| {
                let n = self.triangle_normal(t);
                let axis = Axis::dominant(n.to_array());
                FaceLabel::from_axis(axis, n[axis.index()] >= 0.0)
            })
            .collect();
    }

    /// Closed two-manifold check: every directed edge has exactly one
    /// opposite twin and is itself used once.
    pub fn is_closed_manifold(&self) -> bool {
        if self.is_empty() {
            return false;
        }
        let mut directed: HashMap<(u32, u32), usize> = HashMap::new();
        for tri in self.indices.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                *directed.entry((a, b)).or_default() += 1;
            }
        }
        directed
            .iter()
            .all(|(&(a, b), &count)| count == 1 && directed.get(&(b, a)) == Some(&1))
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_points(&self.positions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tetrahedron() -> Surface {
        Surface::from_flat(
            &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
            &[0, 2, 1, 0, 1, 3, 0, 3, 2, 1, 2, 3],
        )
    }

    #[test]
    fn test_tetrahedron_volume_and_closed() {
        let t = tetrahedron();
        assert!((t.signed_volume() - 1.0 / 6.0).abs() < 1e-6);
        assert!(t.is_closed_manifold());
    }

    #[test]
    fn test_orient_outward_flips_inverted() {
        let mut t = tetrahedron();
        t.flip_winding();
        assert!(t.signed_volume() < 0.0);
        assert!(t.orient_outward());
        assert!(t.signed_volume() > 0.0);
        assert!(!t.orient_outward());
    }

    #[test]
    fn test_open_surface_not_closed() {
        let mut t = tetrahedron();
        t.indices.truncate(9);
        assert!(!t.is_closed_manifold());
    }

    #[test]
    fn test_weld_merges_duplicates() {
        let s = Surface {
            positions: vec![
                Vec3::ZERO,
                Vec3::X,
                Vec3::Y,
                Vec3::new(0.00001, 0.0, 0.0),
            ],
            indices: vec![0, 1, 2, 3, 1, 2],
            face_tags: vec![FaceLabel::Back, FaceLabel::Back],
        };
        let w = s.welded();
        assert_eq!(w.positions.len(), 3);
        assert_eq!(w.triangle_count(), 2);
    }

    #[test]
    fn test_mirror_transform_keeps_outward_winding() {
        let t = tetrahedron();
        let mirrored = t.transformed(&Affine3A::from_scale(Vec3::new(-1.0, 1.0, 1.0)));
        assert!(mirrored.signed_volume() > 0.0);
    }

    #[test]
    fn test_retag_by_normal() {
        let t = tetrahedron();
        // First triangle lies in z = 0 with an outward normal of -Z
        assert_eq!(t.face_tags[0], FaceLabel::Back);
    }
}
