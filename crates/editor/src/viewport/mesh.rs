use glam::Vec3;
use shared::FaceLabel;

use crate::geometry::Surface;

/// CPU-side mesh data: interleaved [pos.x, pos.y, pos.z, norm.x, norm.y, norm.z, r, g, b]
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    /// 9 floats per vertex: position(3) + normal(3) + color(3)
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub const STRIDE: usize = 9;

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / Self::STRIDE
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Flat-shaded display buffers. Triangle `t` of the surface stays triangle
    /// `t` here, colored by the material of its face tag.
    pub fn from_surface(surface: &Surface, color_for: impl Fn(FaceLabel) -> [f32; 3]) -> Self {
        let tri_count = surface.triangle_count();
        let mut vertices = Vec::with_capacity(tri_count * 3 * Self::STRIDE);
        let mut indices = Vec::with_capacity(tri_count * 3);

        for tri in 0..tri_count {
            let [p0, p1, p2] = surface.triangle(tri);
            let normal = (p1 - p0).cross(p2 - p0).normalize_or_zero();
            let color = surface
                .face_tags
                .get(tri)
                .map(|&f| color_for(f))
                .unwrap_or([0.6, 0.6, 0.65]);

            let base = (tri * 3) as u32;
            for p in [p0, p1, p2] {
                push_vert(&mut vertices, p, normal, color);
            }
            indices.extend_from_slice(&[base, base + 1, base + 2]);
        }

        Self { vertices, indices }
    }

    pub fn position(&self, vertex: usize) -> Vec3 {
        let b = vertex * Self::STRIDE;
        Vec3::new(self.vertices[b], self.vertices[b + 1], self.vertices[b + 2])
    }

    pub fn normal(&self, vertex: usize) -> Vec3 {
        let b = vertex * Self::STRIDE + 3;
        Vec3::new(self.vertices[b], self.vertices[b + 1], self.vertices[b + 2])
    }

    /// Positions of the three corners of triangle `tri`
    pub fn triangle(&self, tri: usize) -> [Vec3; 3] {
        [0, 1, 2].map(|k| self.position(self.indices[tri * 3 + k] as usize))
    }
}

/// Lines mesh: interleaved [pos.x, pos.y, pos.z, r, g, b, a]
#[derive(Clone, Debug, Default)]
pub struct LineMeshData {
    /// 7 floats per vertex: position(3) + color(4)
    pub vertices: Vec<f32>,
}

impl LineMeshData {
    pub const STRIDE: usize = 7;

    /// Outline of the solid's feature edges, two vertices per segment
    pub fn wireframe(segments: &[(Vec3, Vec3)], color: [f32; 4]) -> Self {
        let mut vertices = Vec::with_capacity(segments.len() * 2 * Self::STRIDE);
        for (start, end) in segments {
            push_line_vert(&mut vertices, *start, color);
            push_line_vert(&mut vertices, *end, color);
        }
        Self { vertices }
    }

    pub fn segment_count(&self) -> usize {
        self.vertices.len() / (Self::STRIDE * 2)
    }
}

fn push_vert(v: &mut Vec<f32>, p: Vec3, n: Vec3, c: [f32; 3]) {
    v.extend_from_slice(&[p.x, p.y, p.z, n.x, n.y, n.z, c[0], c[1], c[2]]);
}

fn push_line_vert(v: &mut Vec<f32>, p: Vec3, c: [f32; 4]) {
    v.extend_from_slice(&[p.x, p.y, p.z, c[0], c[1], c[2], c[3]]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{box_surface, PrimitiveSet};
    use shared::BoxDimensions;

    #[test]
    fn test_flat_shading_keeps_triangle_order() {
        let surface = box_surface(Vec3::new(2.0, 1.0, 3.0));
        let mesh = MeshData::from_surface(&surface, |f| [f.index() as f32, 0.0, 0.0]);
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(mesh.vertex_count(), 36);
        // Triangle 10 is on the bottom face
        let v = mesh.indices[30] as usize;
        assert_eq!(mesh.vertices[v * 9 + 6], FaceLabel::Bottom.index() as f32);
        assert!((mesh.normal(v) - Vec3::NEG_Y).length() < 1e-6);
    }

    #[test]
    fn test_wireframe_segments() {
        let set = PrimitiveSet::for_box(&BoxDimensions::default());
        let segments: Vec<_> = set.edges.iter().map(|e| (e.start, e.end)).collect();
        let lines = LineMeshData::wireframe(&segments, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(lines.segment_count(), 12);
    }
}
