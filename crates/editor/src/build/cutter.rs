//! Cutter planning
//!
//! Turns a completed selection into a box-shaped cutting tool: its size,
//! center and optional mitre rotation, all in the solid's object space.
//! Front/back features get 45° mitred cuts; left/right and top/bottom
//! features get straight notches.

use glam::{Affine3A, Quat, Vec3};
use serde::Serialize;
use shared::{Axis, BooleanOp, BoxDimensions, EdgeLabel, FaceLabel};
use tracing::debug;

use crate::error::CarveError;
use crate::geometry::{box_surface, Solid, Surface};
use crate::state::CarveSettings;

/// Rotation of the cutter about one of its own axes
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Mitre {
    pub axis: Axis,
    /// Signed angle in degrees
    pub degrees: f32,
}

/// Box-shaped cutting solid
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CutterSpec {
    pub size: Vec3,
    pub center: Vec3,
    pub mitre: Option<Mitre>,
}

impl CutterSpec {
    pub fn rotation(&self) -> Quat {
        match self.mitre {
            Some(m) => Quat::from_axis_angle(Vec3::from_array(m.axis.unit()), m.degrees.to_radians()),
            None => Quat::IDENTITY,
        }
    }

    pub fn local_transform(&self) -> Affine3A {
        Affine3A::from_rotation_translation(self.rotation(), self.center)
    }

    /// Closed surface of the cutter in the solid's object space
    pub fn surface(&self) -> Surface {
        box_surface(self.size).transformed(&self.local_transform())
    }

    fn ensure_non_degenerate(self, min_size: f32) -> Result<Self, CarveError> {
        if !self.size.is_finite() || !self.center.is_finite() {
            return Err(CarveError::PlanningDegenerate("non-finite cutter".into()));
        }
        if self.size.min_element() < min_size {
            return Err(CarveError::PlanningDegenerate(format!(
                "cutter size {:?} below minimum {min_size}",
                self.size.to_array()
            )));
        }
        Ok(self)
    }
}

/// What completed the selection
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CarveTrigger {
    Face { face: FaceLabel },
    Edge { index: usize, label: EdgeLabel },
    VertexBatch { indices: [usize; 4] },
}

/// Fully parameterized carve: the cutter and the operator to apply it with
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CarvePlan {
    pub trigger: CarveTrigger,
    pub cutter: CutterSpec,
    pub op: BooleanOp,
}

fn mitre_for_face(face: FaceLabel, cfg: &CarveSettings) -> Option<Mitre> {
    face.is_front_or_back().then(|| Mitre {
        axis: Axis::X,
        degrees: cfg.mitre_degrees * face.sign(),
    })
}

/// Size of a slab cut through the whole solid: `thickness` along the normal
/// axis, the clearance-trimmed height on Y, and the full extent plus overshoot
/// on the remaining axis
fn through_size(dims: &BoxDimensions, normal_axis: Axis, thickness: f32, cfg: &CarveSettings) -> Vec3 {
    let mut size = Vec3::ZERO;
    for axis in Axis::ALL {
        let extent = dims.extent(axis);
        size[axis.index()] = if axis == normal_axis {
            thickness
        } else if axis == Axis::Y {
            extent - cfg.height_clearance
        } else {
            extent * (1.0 + 2.0 * cfg.cut_overshoot)
        };
    }
    size
}

/// Cutter straddling one logical face
pub fn plan_face(solid: &Solid, face: FaceLabel, cfg: &CarveSettings) -> Result<CarvePlan, CarveError> {
    let dims = &solid.dims;
    let normal_axis = face.axis();
    let extent = dims.extent(normal_axis);

    let size = through_size(dims, normal_axis, cfg.face_thickness_fraction * extent, cfg);
    let mut center = Vec3::ZERO;
    center[normal_axis.index()] = face.sign() * extent * cfg.face_offset_fraction;

    let mitre = mitre_for_face(face, cfg);
    if mitre.is_some() {
        center.y = dims.height * cfg.mitre_lift_fraction;
    }

    let cutter = CutterSpec { size, center, mitre }.ensure_non_degenerate(cfg.min_cutter_size)?;
    debug!(%face, ?cutter, "planned face cutter");
    Ok(CarvePlan {
        trigger: CarveTrigger::Face { face },
        cutter,
        op: BooleanOp::Difference,
    })
}

/// Cutter for one edge, placed on the plane of the edge's primary face and
/// pulled slightly toward the solid. Front/back edges take the mitred face
/// slab; other edges take a straight notch through the solid.
pub fn plan_edge(solid: &Solid, index: usize, cfg: &CarveSettings) -> Result<CarvePlan, CarveError> {
    let edge = solid
        .primitives
        .edges
        .get(index)
        .ok_or(CarveError::StalePrimitive {
            kind: shared::PrimitiveKind::Edge,
            index,
        })?;
    let dims = &solid.dims;
    let face = edge.label.primary;
    let normal_axis = face.axis();
    let extent = dims.extent(normal_axis);

    let face_thickness = cfg.face_thickness_fraction * extent;
    let thickness = if edge.is_mitred() {
        face_thickness
    } else {
        cfg.edge_notch_width.min(face_thickness)
    };
    let size = through_size(dims, normal_axis, thickness, cfg);

    let plane = edge.midpoint()[normal_axis.index()];
    let mut center = Vec3::ZERO;
    center[normal_axis.index()] = plane - face.sign() * cfg.edge_offset_fraction * extent;

    let mitre = mitre_for_face(face, cfg);
    if mitre.is_some() {
        center.y = dims.height * cfg.mitre_lift_fraction;
    }

    let cutter = CutterSpec { size, center, mitre }.ensure_non_degenerate(cfg.min_cutter_size)?;
    debug!(index, label = %edge.label, ?cutter, "planned edge cutter");
    Ok(CarvePlan {
        trigger: CarveTrigger::Edge { index, label: edge.label },
        cutter,
        op: BooleanOp::Difference,
    })
}

/// Largest absolute coordinate difference between any two points along `axis`
fn spread(points: &[Vec3; 4], axis: Axis) -> f32 {
    let i = axis.index();
    let mut best = 0.0_f32;
    for a in 0..points.len() {
        for b in a + 1..points.len() {
            best = best.max((points[a][i] - points[b][i]).abs());
        }
    }
    best
}

/// Cutter over the patch spanned by four selected vertices
pub fn plan_vertices(
    solid: &Solid,
    indices: [usize; 4],
    cfg: &CarveSettings,
) -> Result<CarvePlan, CarveError> {
    let mut points = [Vec3::ZERO; 4];
    for (slot, &index) in indices.iter().enumerate() {
        points[slot] = solid
            .primitives
            .vertices
            .get(index)
            .ok_or(CarveError::StalePrimitive {
                kind: shared::PrimitiveKind::Vertex,
                index,
            })?
            .position;
    }

    let centroid = points.iter().copied().sum::<Vec3>() / 4.0;
    let scale = (0..4)
        .flat_map(|a| (a + 1..4).map(move |b| (a, b)))
        .map(|(a, b)| points[a].distance(points[b]))
        .fold(0.0_f32, f32::max);
    if scale < cfg.min_cutter_size {
        return Err(CarveError::PlanningDegenerate("selected vertices coincide".into()));
    }

    // Plane normal from the best-conditioned triple
    let raw = [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]]
        .iter()
        .map(|&[a, b, c]| (points[b] - points[a]).cross(points[c] - points[a]))
        .max_by(|x, y| x.length_squared().total_cmp(&y.length_squared()))
        .unwrap_or(Vec3::ZERO);
    if raw.length() < 1e-6 * scale * scale {
        return Err(CarveError::PlanningDegenerate("selected vertices are collinear".into()));
    }
    let mut normal = raw.normalize();

    let off_plane = points
        .iter()
        .map(|p| (*p - centroid).dot(normal).abs())
        .fold(0.0_f32, f32::max);
    if off_plane > cfg.coplanarity_tolerance * scale {
        return Err(CarveError::PlanningDegenerate(format!(
            "selected vertices are not coplanar (off by {off_plane:.4})"
        )));
    }

    if normal.dot(centroid) < 0.0 {
        normal = -normal;
    }

    let long_axis = if spread(&points, Axis::X) >= spread(&points, Axis::Z) {
        Axis::X
    } else {
        Axis::Z
    };
    let normal_axis = Axis::dominant(normal.to_array());
    if normal_axis == long_axis {
        return Err(CarveError::PlanningDegenerate(format!(
            "footprint axis {long_axis:?} coincides with the normal"
        )));
    }

    let mut size = Vec3::ZERO;
    for axis in Axis::ALL {
        size[axis.index()] = if axis == normal_axis {
            cfg.face_thickness_fraction * solid.dims.extent(axis)
        } else {
            spread(&points, axis) * (1.0 + 2.0 * cfg.cut_overshoot)
        };
    }

    let mitre = match normal_axis {
        Axis::Y => None,
        _ if normal.z.abs() >= normal.x.abs() => Some(Mitre {
            axis: Axis::X,
            degrees: cfg.mitre_degrees * normal.z.signum(),
        }),
        _ => None,
    };

    // Offset capped so the cutter straddles the plane
    let offset = cfg.vertex_offset.min(0.25 * size[normal_axis.index()]);
    let center = centroid + normal * offset;
    let cutter = CutterSpec { size, center, mitre }.ensure_non_degenerate(cfg.min_cutter_size)?;
    debug!(?indices, ?long_axis, ?cutter, "planned vertex-batch cutter");
    Ok(CarvePlan {
        trigger: CarveTrigger::VertexBatch { indices },
        cutter,
        op: BooleanOp::Difference,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo() -> Solid {
        Solid::new_box(BoxDimensions::new(8.95, 0.58, 8.0)).unwrap()
    }

    #[test]
    fn test_front_face_cutter() {
        let plan = plan_face(&demo(), FaceLabel::Front, &CarveSettings::default()).unwrap();
        let c = plan.cutter;
        assert!((c.size.z - 1.0).abs() < 1e-6);
        assert!((c.center.z - 4.0).abs() < 1e-6);
        assert!((c.size.y - 0.51).abs() < 1e-5);
        assert!(c.size.x > 8.95);
        assert!((c.center.y - 0.174).abs() < 1e-5);
        assert_eq!(c.mitre, Some(Mitre { axis: Axis::X, degrees: 45.0 }));
        assert_eq!(plan.op, BooleanOp::Difference);
    }

    #[test]
    fn test_back_face_mirrors_front() {
        let cfg = CarveSettings::default();
        let front = plan_face(&demo(), FaceLabel::Front, &cfg).unwrap().cutter;
        let back = plan_face(&demo(), FaceLabel::Back, &cfg).unwrap().cutter;
        assert_eq!(back.center.z, -front.center.z);
        assert_eq!(back.mitre.unwrap().degrees, -45.0);
    }

    #[test]
    fn test_side_faces_are_straight() {
        let cfg = CarveSettings::default();
        let left = plan_face(&demo(), FaceLabel::Left, &cfg).unwrap().cutter;
        assert_eq!(left.mitre, None);
        assert!((left.center.x + 4.475).abs() < 1e-5);
        assert_eq!(left.center.y, 0.0);
        assert!(left.size.z > 8.0);
    }

    #[test]
    fn test_thin_solid_is_degenerate() {
        let solid = Solid::new_box(BoxDimensions::new(2.0, 0.05, 2.0)).unwrap();
        let err = plan_face(&solid, FaceLabel::Right, &CarveSettings::default());
        assert!(matches!(err, Err(CarveError::PlanningDegenerate(_))));
    }

    fn inside_cutter(c: &CutterSpec, p: Vec3) -> bool {
        let local = c.local_transform().inverse().transform_point3(p);
        (local.abs() - c.size * 0.5).max_element() <= 0.0
    }

    #[test]
    fn test_front_and_back_edges_mitre_about_x() {
        let solid = demo();
        let cfg = CarveSettings::default();
        for (index, edge) in solid.primitives.edges.iter().enumerate() {
            let plan = plan_edge(&solid, index, &cfg).unwrap();
            let c = plan.cutter;
            if edge.label.primary.is_front_or_back() {
                let sign = edge.label.primary.sign();
                assert_eq!(c.mitre, Some(Mitre { axis: Axis::X, degrees: 45.0 * sign }), "{}", edge.label);
                assert!((c.size.z - 1.0).abs() < 1e-6);
                assert!((c.size.y - 0.51).abs() < 1e-5);
                assert!((c.center.z - sign * 3.848).abs() < 1e-4);
                // The slab runs through the edge itself
                assert!(inside_cutter(&c, edge.midpoint()), "{}", edge.label);
            } else {
                assert_eq!(c.mitre, None, "{}", edge.label);
                assert!((c.size.x - 0.9).abs() < 1e-6);
                assert!(c.size.z > edge.length());
            }
        }
    }

    #[test]
    fn test_edge_cutters_overlap_solid() {
        let solid = demo();
        let cfg = CarveSettings::default();
        let aabb = solid.surface.aabb();
        for index in 0..solid.primitives.edges.len() {
            let c = plan_edge(&solid, index, &cfg).unwrap().cutter;
            assert!(c.center.cmpgt(aabb.min).all() && c.center.cmplt(aabb.max).all(), "edge {index}");
        }
    }

    #[test]
    fn test_side_edge_notch() {
        let solid = demo();
        // Right-Bottom
        let edge = &solid.primitives.edges[9];
        assert_eq!(edge.label.to_string(), "Right-Bottom");
        let c = plan_edge(&solid, 9, &CarveSettings::default()).unwrap().cutter;
        assert!((c.center.x - (4.475 - 0.019 * 8.95)).abs() < 1e-5);
        assert_eq!((c.center.y, c.center.z), (0.0, 0.0));
        assert!((c.size.z - 8.16).abs() < 1e-4);
    }

    #[test]
    fn test_edge_out_of_range() {
        let err = plan_edge(&demo(), 12, &CarveSettings::default());
        assert!(matches!(err, Err(CarveError::StalePrimitive { index: 12, .. })));
    }

    #[test]
    fn test_front_corners_batch() {
        // Corners 4..8 all lie on the front face
        let plan = plan_vertices(&demo(), [4, 5, 6, 7], &CarveSettings::default()).unwrap();
        let c = plan.cutter;
        assert!((c.center.z - 4.1).abs() < 1e-5);
        assert_eq!(c.mitre.map(|m| m.axis), Some(Axis::X));
        assert!((c.size.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_top_corners_batch_has_no_mitre() {
        let plan = plan_vertices(&demo(), [2, 3, 6, 7], &CarveSettings::default()).unwrap();
        let c = plan.cutter;
        assert_eq!(c.mitre, None);
        assert!(c.center.y > 0.29);
        assert!(c.center.y - 0.5 * c.size.y < 0.29);
    }

    #[test]
    fn test_every_face_batch_straddles_its_face() {
        let solid = demo();
        let cfg = CarveSettings::default();
        for face in FaceLabel::ALL {
            let quad = crate::geometry::face_corners(face);
            let plan = plan_vertices(&solid, quad, &cfg).unwrap();
            let centroid = quad.iter().map(|&i| solid.primitives.vertices[i].position).sum::<Vec3>() / 4.0;
            assert!(inside_cutter(&plan.cutter, centroid), "{face}");
        }
    }

    #[test]
    fn test_non_coplanar_batch_declined() {
        let err = plan_vertices(&demo(), [0, 1, 2, 7], &CarveSettings::default());
        assert!(matches!(err, Err(CarveError::PlanningDegenerate(_))));
    }

    #[test]
    fn test_cutter_surface_is_closed() {
        let plan = plan_face(&demo(), FaceLabel::Front, &CarveSettings::default()).unwrap();
        let s = plan.cutter.surface();
        assert!(s.is_closed_manifold());
        let expected = plan.cutter.size.x * plan.cutter.size.y * plan.cutter.size.z;
        assert!((s.signed_volume() - expected).abs() < 1e-3);
    }
}
