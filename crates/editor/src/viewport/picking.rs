use glam::Vec3;
use shared::{PrimitiveKind, PrimitiveRef};

use crate::geometry::{Solid, Surface};

/// A ray in world space
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_points(points: &[Vec3]) -> Self {
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        for p in points {
            min = min.min(*p);
            max = max.max(*p);
        }
        Self { min, max }
    }

    /// Center of the bounding box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Ray-AABB intersection using the slab method.
/// Returns the distance along the ray to the nearest hit, or None.
pub fn ray_aabb(ray: &Ray, aabb: &Aabb) -> Option<f32> {
    let inv_dir = Vec3::ONE / ray.direction;

    let t1 = (aabb.min - ray.origin) * inv_dir;
    let t2 = (aabb.max - ray.origin) * inv_dir;

    let tmin = t1.min(t2).max_element();
    let tmax = t1.max(t2).min_element();

    if tmax < 0.0 || tmin > tmax {
        return None;
    }

    Some(if tmin < 0.0 { tmax } else { tmin })
}

/// Möller-Trumbore ray-triangle intersection algorithm.
/// Returns the distance along the ray if hit, or None if no intersection.
pub fn ray_triangle_intersect(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
    const EPSILON: f32 = 1e-7;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);

    // Ray is parallel to triangle
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);

    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);

    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);

    // Intersection is behind ray origin
    if t > EPSILON {
        Some(t)
    } else {
        None
    }
}

/// Closest approach between a ray and a point: (distance, ray parameter)
pub fn ray_point_distance(ray: &Ray, p: Vec3) -> (f32, f32) {
    let t = ray.direction.dot(p - ray.origin).max(0.0);
    ((ray.at(t) - p).length(), t)
}

/// Closest approach between a ray (unit direction) and segment `a..b`: (distance, ray parameter)
pub fn ray_segment_distance(ray: &Ray, a: Vec3, b: Vec3) -> (f32, f32) {
    let e = b - a;
    let c = e.dot(e);
    if c < 1e-12 {
        return ray_point_distance(ray, a);
    }

    let w0 = ray.origin - a;
    let bd = ray.direction.dot(e);
    let dd = ray.direction.dot(w0);
    let ee = e.dot(w0);
    let denom = c - bd * bd;

    let s = if denom > 1e-9 {
        ((ee - dd * bd) / denom).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let t = (s * bd - dd).max(0.0);
    let s = ((ee + t * bd) / c).clamp(0.0, 1.0);

    ((ray.at(t) - (a + e * s)).length(), t)
}

/// World-space hit radius that grows linearly with distance along the ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickTolerance {
    pub base: f32,
    pub per_depth: f32,
}

impl PickTolerance {
    pub fn fixed(radius: f32) -> Self {
        Self { base: radius, per_depth: 0.0 }
    }

    pub fn at(&self, depth: f32) -> f32 {
        self.base + self.per_depth * depth.max(0.0)
    }
}

/// Nearest primitive under the ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub target: PrimitiveRef,
    /// Ray parameter of the hit
    pub distance: f32,
}

/// World-space pick geometry of one solid revision
#[derive(Debug, Clone, Default)]
pub struct PickTargets {
    pub revision: u64,
    pub surface: Surface,
    pub bounds: Option<Aabb>,
    pub edges: Vec<(Vec3, Vec3)>,
    pub vertices: Vec<Vec3>,
}

impl PickTargets {
    /// Resolve every primitive of `solid` into world space
    pub fn resolve(solid: &Solid) -> Self {
        let p = &solid.primitives;
        let surface = solid.world_surface();
        Self {
            revision: solid.revision,
            bounds: (!surface.is_empty()).then(|| surface.aabb()),
            surface,
            edges: p
                .edges
                .iter()
                .map(|e| (solid.world_point(e.start), solid.world_point(e.end)))
                .collect(),
            vertices: p.vertices.iter().map(|v| solid.world_point(v.position)).collect(),
        }
    }

    pub fn pick(
        &self,
        ray: &Ray,
        kind: PrimitiveKind,
        edge_tol: PickTolerance,
        vertex_tol: PickTolerance,
    ) -> Option<PickHit> {
        match kind {
            PrimitiveKind::Face => {
                // Cheap reject before testing every triangle
                ray_aabb(ray, self.bounds.as_ref()?)?;
                pick_face(ray, &self.surface)
            }
            PrimitiveKind::Edge => pick_edge(ray, &self.edges, edge_tol),
            PrimitiveKind::Vertex => pick_vertex(ray, &self.vertices, vertex_tol),
        }
    }
}

/// Nearest triangle hit, reported as the logical face its tag names
pub fn pick_face(ray: &Ray, surface: &Surface) -> Option<PickHit> {
    let mut best: Option<(usize, f32)> = None;

    for tri in 0..surface.triangle_count() {
        let [v0, v1, v2] = surface.triangle(tri);
        if let Some(dist) = ray_triangle_intersect(ray, v0, v1, v2) {
            if best.is_none_or(|(_, d)| dist < d) {
                best = Some((tri, dist));
            }
        }
    }

    let (tri, distance) = best?;
    let face = surface.face_tags.get(tri)?;
    Some(PickHit {
        target: PrimitiveRef::face(*face),
        distance,
    })
}

/// Nearest edge passing within tolerance of the ray
pub fn pick_edge(ray: &Ray, edges: &[(Vec3, Vec3)], tol: PickTolerance) -> Option<PickHit> {
    nearest_within(edges.iter().map(|(a, b)| ray_segment_distance(ray, *a, *b)), tol)
        .map(|(index, distance)| PickHit {
            target: PrimitiveRef::edge(index),
            distance,
        })
}

/// Nearest vertex within tolerance of the ray
pub fn pick_vertex(ray: &Ray, vertices: &[Vec3], tol: PickTolerance) -> Option<PickHit> {
    nearest_within(vertices.iter().map(|p| ray_point_distance(ray, *p)), tol).map(
        |(index, distance)| PickHit {
            target: PrimitiveRef::vertex(index),
            distance,
        },
    )
}

/// Index and ray parameter of the candidate with the smallest t whose miss
/// distance is inside the tolerance at that depth. Ties go to the smaller miss.
fn nearest_within(
    candidates: impl Iterator<Item = (f32, f32)>,
    tol: PickTolerance,
) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32, f32)> = None;
    for (idx, (miss, t)) in candidates.enumerate() {
        if miss > tol.at(t) {
            continue;
        }
        let better = match best {
            None => true,
            Some((_, bt, bm)) => t < bt - 1e-5 || ((t - bt).abs() <= 1e-5 && miss < bm),
        };
        if better {
            best = Some((idx, t, miss));
        }
    }
    best.map(|(idx, t, _)| (idx, t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::box_surface;
    use shared::FaceLabel;

    fn down_z(x: f32, y: f32) -> Ray {
        Ray {
            origin: Vec3::new(x, y, 10.0),
            direction: Vec3::NEG_Z,
        }
    }

    #[test]
    fn test_ray_triangle_hit() {
        let ray = down_z(0.2, 0.2);
        let t = ray_triangle_intersect(&ray, Vec3::ZERO, Vec3::X, Vec3::Y).unwrap();
        assert!((t - 10.0).abs() < 1e-5);
        assert!(ray_triangle_intersect(&down_z(2.0, 2.0), Vec3::ZERO, Vec3::X, Vec3::Y).is_none());
    }

    #[test]
    fn test_ray_aabb() {
        let aabb = Aabb::from_points(&[Vec3::splat(-1.0), Vec3::splat(1.0)]);
        assert!((ray_aabb(&down_z(0.0, 0.0), &aabb).unwrap() - 9.0).abs() < 1e-5);
        assert!(ray_aabb(&down_z(3.0, 0.0), &aabb).is_none());
    }

    #[test]
    fn test_segment_distance() {
        let (d, t) = ray_segment_distance(&down_z(0.0, 0.5), Vec3::new(-1.0, 0.0, 0.0), Vec3::X);
        assert!((d - 0.5).abs() < 1e-5);
        assert!((t - 10.0).abs() < 1e-5);
        // Beyond the end of the segment the endpoint is closest
        let (d, _) = ray_segment_distance(&down_z(2.0, 0.0), Vec3::new(-1.0, 0.0, 0.0), Vec3::X);
        assert!((d - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_pick_face_maps_to_logical_face() {
        let surface = box_surface(Vec3::new(2.0, 2.0, 2.0));
        let hit = pick_face(&down_z(0.3, -0.4), &surface).unwrap();
        assert_eq!(hit.target, PrimitiveRef::face(FaceLabel::Front));
        assert!((hit.distance - 9.0).abs() < 1e-5);
        assert!(pick_face(&down_z(5.0, 0.0), &surface).is_none());
    }

    #[test]
    fn test_pick_vertex_prefers_nearest_along_ray() {
        // Two points on the ray; the nearer one wins even with a larger miss
        let vertices = [Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.05, 0.0, 5.0)];
        let hit = pick_vertex(&down_z(0.0, 0.0), &vertices, PickTolerance::fixed(0.1)).unwrap();
        assert_eq!(hit.target, PrimitiveRef::vertex(1));
        assert!(pick_vertex(&down_z(1.0, 1.0), &vertices, PickTolerance::fixed(0.1)).is_none());
    }

    #[test]
    fn test_tolerance_grows_with_depth() {
        let tol = PickTolerance { base: 0.0, per_depth: 0.01 };
        let edges = [(Vec3::new(-1.0, 0.08, 0.0), Vec3::new(1.0, 0.08, 0.0))];
        // Miss of 0.08 at depth 10 fits a 0.1 radius
        assert!(pick_edge(&down_z(0.0, 0.0), &edges, tol).is_some());
        let near = [(Vec3::new(-1.0, 0.08, 9.0), Vec3::new(1.0, 0.08, 9.0))];
        assert!(pick_edge(&down_z(0.0, 0.0), &near, tol).is_none());
    }
}
