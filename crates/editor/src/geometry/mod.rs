//! Geometry model of the editable box: corner/edge/face tables, primitive sets
//! and the `Solid` that owns them.

pub mod surface;

use glam::{Affine3A, Vec3};
use shared::{Axis, BoxDimensions, EdgeLabel, FaceLabel, PrimitiveKind, PrimitiveRef};

use crate::error::SolidError;
use crate::viewport::edge::{extract_sharp_edges, MeshEdge};
use crate::viewport::mesh::MeshData;
pub use surface::{quantize_position, Surface};

/// Triangles emitted per logical face by [`box_surface`]
pub const TRIANGLES_PER_FACE: usize = 2;

/// Box tessellation: triangle index -> logical face
pub const FACE_TRIANGLE_MAP: [FaceLabel; 6 * TRIANGLES_PER_FACE] = [
    FaceLabel::Front,
    FaceLabel::Front,
    FaceLabel::Back,
    FaceLabel::Back,
    FaceLabel::Right,
    FaceLabel::Right,
    FaceLabel::Left,
    FaceLabel::Left,
    FaceLabel::Top,
    FaceLabel::Top,
    FaceLabel::Bottom,
    FaceLabel::Bottom,
];

/// Logical face of a box-tessellation triangle
pub fn face_for_triangle(tri: usize) -> Option<FaceLabel> {
    FACE_TRIANGLE_MAP.get(tri).copied()
}

/// The 12 box edges as (corner, corner, primary face, secondary face)
pub const BOX_EDGES: [(usize, usize, FaceLabel, FaceLabel); 12] = [
    (4, 5, FaceLabel::Front, FaceLabel::Bottom),
    (5, 7, FaceLabel::Front, FaceLabel::Right),
    (7, 6, FaceLabel::Front, FaceLabel::Top),
    (6, 4, FaceLabel::Front, FaceLabel::Left),
    (0, 1, FaceLabel::Back, FaceLabel::Bottom),
    (1, 3, FaceLabel::Back, FaceLabel::Right),
    (3, 2, FaceLabel::Back, FaceLabel::Top),
    (2, 0, FaceLabel::Back, FaceLabel::Left),
    (0, 4, FaceLabel::Left, FaceLabel::Bottom),
    (1, 5, FaceLabel::Right, FaceLabel::Bottom),
    (2, 6, FaceLabel::Left, FaceLabel::Top),
    (3, 7, FaceLabel::Right, FaceLabel::Top),
];

/// Corner quads per face, counter-clockwise seen from outside, in `FaceLabel::ALL` order
const FACE_QUADS: [[u32; 4]; 6] = [
    [4, 5, 7, 6], // Front (+Z)
    [1, 0, 2, 3], // Back (-Z)
    [5, 1, 3, 7], // Right (+X)
    [0, 4, 6, 2], // Left (-X)
    [6, 7, 3, 2], // Top (+Y)
    [0, 1, 5, 4], // Bottom (-Y)
];

/// Box corner indices of one face, counter-clockwise seen from outside
pub fn face_corners(face: FaceLabel) -> [usize; 4] {
    FACE_QUADS[face.index()].map(|i| i as usize)
}

/// The 8 corners; bit 0 of the index selects +X, bit 1 +Y, bit 2 +Z
pub fn box_corners(size: Vec3) -> [Vec3; 8] {
    let h = size * 0.5;
    std::array::from_fn(|i| {
        Vec3::new(
            if i & 1 != 0 { h.x } else { -h.x },
            if i & 2 != 0 { h.y } else { -h.y },
            if i & 4 != 0 { h.z } else { -h.z },
        )
    })
}

/// Closed, welded box surface centered at the origin (8 vertices, 12 triangles)
pub fn box_surface(size: Vec3) -> Surface {
    let mut indices = Vec::with_capacity(36);
    for [a, b, c, d] in FACE_QUADS {
        indices.extend_from_slice(&[a, b, c, a, c, d]);
    }
    Surface {
        positions: box_corners(size).to_vec(),
        indices,
        face_tags: FACE_TRIANGLE_MAP.to_vec(),
    }
}

/// Pickable corner
#[derive(Debug, Clone, PartialEq)]
pub struct VertexPrimitive {
    pub position: Vec3,
}

/// Pickable edge with the normals of the faces it borders (object space)
#[derive(Debug, Clone, PartialEq)]
pub struct EdgePrimitive {
    pub start: Vec3,
    pub end: Vec3,
    pub label: EdgeLabel,
    pub normal1: Vec3,
    pub normal2: Option<Vec3>,
}

impl EdgePrimitive {
    pub fn midpoint(&self) -> Vec3 {
        (self.start + self.end) * 0.5
    }

    pub fn length(&self) -> f32 {
        (self.end - self.start).length()
    }

    /// Axis the edge mostly runs along
    pub fn direction_axis(&self) -> Axis {
        Axis::dominant((self.end - self.start).to_array())
    }

    /// Unit vector halfway between the two adjacent face normals
    pub fn outward_bisector(&self) -> Vec3 {
        let sum = self.normal1 + self.normal2.unwrap_or(self.normal1);
        sum.try_normalize().unwrap_or(self.normal1)
    }

    /// Edges bordering the front or back face take mitred cuts
    pub fn is_mitred(&self) -> bool {
        self.label.primary.is_front_or_back()
    }
}

/// Pickable logical face and the triangles that carry its material
#[derive(Debug, Clone, PartialEq)]
pub struct FacePrimitive {
    pub label: FaceLabel,
    pub triangles: Vec<usize>,
}

impl FacePrimitive {
    /// Outward normal under the solid's object-to-world transform
    pub fn world_normal(&self, transform: &Affine3A) -> Vec3 {
        let n = Vec3::from_array(self.label.normal());
        transform
            .matrix3
            .inverse()
            .transpose()
            .mul_vec3(n)
            .normalize_or_zero()
    }
}

/// All primitives of one solid instance, indexed by kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrimitiveSet {
    pub vertices: Vec<VertexPrimitive>,
    pub edges: Vec<EdgePrimitive>,
    pub faces: Vec<FacePrimitive>,
}

impl PrimitiveSet {
    /// Fixed 8/12/6 tables of an untouched box
    pub fn for_box(dims: &BoxDimensions) -> Self {
        let corners = box_corners(Vec3::from_array(dims.as_array()));
        let vertices = corners
            .iter()
            .map(|&position| VertexPrimitive { position })
            .collect();
        let edges = BOX_EDGES
            .iter()
            .map(|&(a, b, primary, secondary)| EdgePrimitive {
                start: corners[a],
                end: corners[b],
                label: EdgeLabel {
                    primary,
                    secondary: Some(secondary),
                },
                normal1: Vec3::from_array(primary.normal()),
                normal2: Some(Vec3::from_array(secondary.normal())),
            })
            .collect();
        let faces = FaceLabel::ALL
            .iter()
            .map(|&label| FacePrimitive {
                label,
                triangles: (0..FACE_TRIANGLE_MAP.len())
                    .filter(|&t| FACE_TRIANGLE_MAP[t] == label)
                    .collect(),
            })
            .collect();
        Self { vertices, edges, faces }
    }

    /// Derive primitives from an arbitrary closed surface: sharp feature edges
    /// in deterministic order, their unique endpoints, and faces grouped by tag.
    pub fn from_surface(surface: &Surface, sharp_degrees: f32) -> Self {
        let mesh = MeshData::from_surface(surface, |_| [0.0; 3]);
        let mut edges: Vec<EdgePrimitive> = extract_sharp_edges(&mesh, sharp_degrees)
            .into_iter()
            .map(|e| edge_from_mesh_edge(surface, e))
            .collect();
        edges.sort_by_key(|e| (quantize_position(e.start), quantize_position(e.end)));

        let mut corner_keys: Vec<_> = edges
            .iter()
            .flat_map(|e| [e.start, e.end])
            .map(|p| (quantize_position(p), p))
            .collect();
        corner_keys.sort_by_key(|(k, _)| *k);
        corner_keys.dedup_by_key(|(k, _)| *k);
        let vertices = corner_keys
            .into_iter()
            .map(|(_, position)| VertexPrimitive { position })
            .collect();

        let faces = FaceLabel::ALL
            .iter()
            .map(|&label| FacePrimitive {
                label,
                triangles: (0..surface.triangle_count())
                    .filter(|&t| surface.face_tags.get(t) == Some(&label))
                    .collect(),
            })
            .collect();

        Self { vertices, edges, faces }
    }

    pub fn count(&self, kind: PrimitiveKind) -> usize {
        match kind {
            PrimitiveKind::Vertex => self.vertices.len(),
            PrimitiveKind::Edge => self.edges.len(),
            PrimitiveKind::Face => self.faces.len(),
        }
    }

    pub fn face(&self, label: FaceLabel) -> Option<&FacePrimitive> {
        self.faces.iter().find(|f| f.label == label)
    }

    /// Index of the vertex at `position`, matched after quantization
    pub fn find_vertex(&self, position: Vec3) -> Option<usize> {
        let key = quantize_position(position);
        self.vertices
            .iter()
            .position(|v| quantize_position(v.position) == key)
    }

    /// Index of the edge between `a` and `b`, in either direction
    pub fn find_edge(&self, a: Vec3, b: Vec3) -> Option<usize> {
        let (ka, kb) = (quantize_position(a), quantize_position(b));
        self.edges.iter().position(|e| {
            let key = (quantize_position(e.start), quantize_position(e.end));
            key == (ka, kb) || key == (kb, ka)
        })
    }

    /// The primitive of `next` with the same geometry as `r` has here.
    /// Faces are matched by label.
    pub fn relocate(&self, r: PrimitiveRef, next: &PrimitiveSet) -> Option<PrimitiveRef> {
        let index = match r.kind {
            PrimitiveKind::Vertex => next.find_vertex(self.vertices.get(r.index)?.position)?,
            PrimitiveKind::Edge => {
                let edge = self.edges.get(r.index)?;
                next.find_edge(edge.start, edge.end)?
            }
            PrimitiveKind::Face => {
                let label = self.faces.get(r.index)?.label;
                next.faces.iter().position(|f| f.label == label)?
            }
        };
        Some(PrimitiveRef { kind: r.kind, index })
    }
}

/// Orient an extracted edge canonically and label it from the tags of its triangles
fn edge_from_mesh_edge(surface: &Surface, e: MeshEdge) -> EdgePrimitive {
    let tag = |t: usize| surface.face_tags.get(t).copied();
    let first = tag(e.triangles.0).unwrap_or(FaceLabel::Front);
    let label = EdgeLabel::between(first, e.triangles.1.and_then(tag));

    let (start, end) = if quantize_position(e.start) <= quantize_position(e.end) {
        (e.start, e.end)
    } else {
        (e.end, e.start)
    };
    EdgePrimitive {
        start,
        end,
        label,
        normal1: e.normal1,
        normal2: e.normal2,
    }
}

/// The editable solid: surface, transform and the primitives derived from them.
/// Replaced wholesale by every successful carve.
#[derive(Debug, Clone)]
pub struct Solid {
    pub dims: BoxDimensions,
    pub surface: Surface,
    pub transform: Affine3A,
    pub primitives: PrimitiveSet,
    /// Incremented every time the solid is replaced
    pub revision: u64,
}

impl Solid {
    pub fn new_box(dims: BoxDimensions) -> Result<Self, SolidError> {
        if !dims.is_valid() {
            return Err(SolidError::InvalidDimensions(dims));
        }
        Ok(Self {
            dims,
            surface: box_surface(Vec3::from_array(dims.as_array())),
            transform: Affine3A::IDENTITY,
            primitives: PrimitiveSet::for_box(&dims),
            revision: 0,
        })
    }

    /// Surface with the object-to-world transform applied
    pub fn world_surface(&self) -> Surface {
        self.surface.transformed(&self.transform)
    }

    pub fn world_point(&self, p: Vec3) -> Vec3 {
        self.transform.transform_point3(p)
    }

    /// Object-space point strictly inside the largest triangle of a face
    pub fn face_anchor(&self, label: FaceLabel) -> Option<Vec3> {
        let face = self.primitives.face(label)?;
        let area = |t: usize| {
            let [a, b, c] = self.surface.triangle(t);
            (b - a).cross(c - a).length()
        };
        let tri = face
            .triangles
            .iter()
            .copied()
            .max_by(|x, y| area(*x).total_cmp(&area(*y)))?;
        let [a, b, c] = self.surface.triangle(tri);
        Some((a + b + c) / 3.0)
    }
}
