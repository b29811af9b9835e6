//! Solid and display-buffer validation.
//!
//! `SolidValidator` checks what a rebuilt solid must guarantee: a closed,
//! outward-wound surface with one face tag per triangle and primitives that
//! sit on that surface. `DisplayValidator` checks that the flat-shaded buffer
//! handed to the host still describes that surface triangle for triangle.

use crate::geometry::{quantize_position, Solid, Surface};
use crate::viewport::mesh::MeshData;

/// Display buffer checked against the surface it was built from
pub struct DisplayValidator<'a> {
    mesh: &'a MeshData,
    surface: &'a Surface,
}

impl<'a> DisplayValidator<'a> {
    pub fn new(mesh: &'a MeshData, surface: &'a Surface) -> Self {
        Self { mesh, surface }
    }

    pub fn validate_all(&self) -> Vec<String> {
        let mesh = self.mesh;
        if mesh.vertices.len() % MeshData::STRIDE != 0 || mesh.indices.len() % 3 != 0 {
            return vec![format!(
                "Buffer lengths {}/{} do not fit the vertex stride or triangles",
                mesh.vertices.len(),
                mesh.indices.len()
            )];
        }
        if mesh.indices.iter().any(|&i| i as usize >= mesh.vertex_count()) {
            return vec![format!("Indices out of range (vertex_count={})", mesh.vertex_count())];
        }
        if mesh.triangle_count() != self.surface.triangle_count() {
            return vec![format!(
                "{} display triangles for {} surface triangles",
                mesh.triangle_count(),
                self.surface.triangle_count()
            )];
        }

        let mut errors = Vec::new();
        for tri in 0..mesh.triangle_count() {
            let expected = self.surface.triangle_normal(tri);
            let off = (0..3)
                .map(|k| mesh.normal(mesh.indices[tri * 3 + k] as usize))
                .any(|n| (n - expected).length() > 1e-3);
            if off {
                errors.push(format!("Triangle {tri} is not shaded with its outward normal"));
            }
        }
        errors
    }
}

/// Validator for a `Solid` after creation or rebuild.
pub struct SolidValidator<'a> {
    solid: &'a Solid,
}

impl<'a> SolidValidator<'a> {
    pub fn new(solid: &'a Solid) -> Self {
        Self { solid }
    }

    pub fn validate_all(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let surface = &self.solid.surface;

        if !surface.is_closed_manifold() {
            errors.push("Surface is not a closed two-manifold".to_string());
        }
        if surface.signed_volume() <= 0.0 {
            errors.push(format!(
                "Surface is not wound outward (signed volume {})",
                surface.signed_volume()
            ));
        }
        if surface.face_tags.len() != surface.triangle_count() {
            errors.push(format!(
                "{} face tags for {} triangles",
                surface.face_tags.len(),
                surface.triangle_count()
            ));
        }

        let on_surface: std::collections::HashSet<_> =
            surface.positions.iter().map(|p| quantize_position(*p)).collect();
        let p = &self.solid.primitives;
        let stray_vertices = p
            .vertices
            .iter()
            .filter(|v| !on_surface.contains(&quantize_position(v.position)))
            .count();
        if stray_vertices > 0 {
            errors.push(format!("{stray_vertices} vertices are not surface corners"));
        }
        let stray_edges = p
            .edges
            .iter()
            .filter(|e| {
                !on_surface.contains(&quantize_position(e.start))
                    || !on_surface.contains(&quantize_position(e.end))
            })
            .count();
        if stray_edges > 0 {
            errors.push(format!("{stray_edges} edges do not end on surface corners"));
        }

        for face in &p.faces {
            if let Some(t) = face.triangles.iter().find(|&&t| t >= surface.triangle_count()) {
                errors.push(format!("Face {} refers to missing triangle {t}", face.label));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::BoxDimensions;

    #[test]
    fn test_box_display_matches_surface() {
        let solid = Solid::new_box(BoxDimensions::default()).unwrap();
        let mesh = MeshData::from_surface(&solid.surface, |_| [0.5; 3]);
        assert!(DisplayValidator::new(&mesh, &solid.surface).validate_all().is_empty());
    }

    #[test]
    fn test_flipped_normal_reported() {
        let solid = Solid::new_box(BoxDimensions::default()).unwrap();
        let mut mesh = MeshData::from_surface(&solid.surface, |_| [0.5; 3]);
        // Negate the normal of the first vertex of triangle 4
        let base = 4 * 3 * MeshData::STRIDE + 3;
        for v in &mut mesh.vertices[base..base + 3] {
            *v = -*v;
        }
        let errors = DisplayValidator::new(&mesh, &solid.surface).validate_all();
        assert_eq!(errors, vec!["Triangle 4 is not shaded with its outward normal".to_string()]);
    }

    #[test]
    fn test_truncated_buffer_reported() {
        let solid = Solid::new_box(BoxDimensions::default()).unwrap();
        let mut mesh = MeshData::from_surface(&solid.surface, |_| [0.5; 3]);
        mesh.vertices.truncate(10);
        let errors = DisplayValidator::new(&mesh, &solid.surface).validate_all();
        assert!(errors[0].contains("stride"));
    }

    #[test]
    fn test_fresh_box_solid_valid() {
        let solid = Solid::new_box(BoxDimensions::default()).unwrap();
        assert!(SolidValidator::new(&solid).validate_all().is_empty());
    }

    #[test]
    fn test_open_solid_reported() {
        let mut solid = Solid::new_box(BoxDimensions::default()).unwrap();
        solid.surface.indices.truncate(33);
        solid.surface.face_tags.truncate(11);
        let errors = SolidValidator::new(&solid).validate_all();
        assert!(errors.iter().any(|e| e.contains("closed")));
        assert!(errors.iter().any(|e| e.contains("missing triangle")));
    }
}
