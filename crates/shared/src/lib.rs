use std::fmt;

use serde::{Deserialize, Serialize};

/// Parametric size of the editable box, centered at the origin in object space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxDimensions {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl BoxDimensions {
    pub fn new(width: f32, height: f32, depth: f32) -> Self {
        Self { width, height, depth }
    }

    /// All three extents are finite and strictly positive
    pub fn is_valid(&self) -> bool {
        [self.width, self.height, self.depth]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0)
    }

    /// Extent along an axis
    pub fn extent(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
            Axis::Z => self.depth,
        }
    }

    pub fn as_array(&self) -> [f32; 3] {
        [self.width, self.height, self.depth]
    }
}

impl Default for BoxDimensions {
    fn default() -> Self {
        Self {
            width: 8.95,
            height: 0.58,
            depth: 8.0,
        }
    }
}

/// Coordinate axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn unit(self) -> [f32; 3] {
        match self {
            Axis::X => [1.0, 0.0, 0.0],
            Axis::Y => [0.0, 1.0, 0.0],
            Axis::Z => [0.0, 0.0, 1.0],
        }
    }

    /// Axis whose component has the largest magnitude (ties resolve X, then Y, then Z)
    pub fn dominant(v: [f32; 3]) -> Axis {
        let [x, y, z] = v.map(f32::abs);
        if x >= y && x >= z {
            Axis::X
        } else if y >= z {
            Axis::Y
        } else {
            Axis::Z
        }
    }
}

/// One of the six logical faces of the box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaceLabel {
    #[serde(alias = "frente")]
    Front,
    #[serde(alias = "tras", alias = "trás")]
    Back,
    #[serde(alias = "direita")]
    Right,
    #[serde(alias = "esquerda")]
    Left,
    #[serde(alias = "topo", alias = "superior")]
    Top,
    #[serde(alias = "fundo", alias = "inferior")]
    Bottom,
}

impl FaceLabel {
    /// Logical face order; also the material slot order
    pub const ALL: [FaceLabel; 6] = [
        FaceLabel::Front,
        FaceLabel::Back,
        FaceLabel::Right,
        FaceLabel::Left,
        FaceLabel::Top,
        FaceLabel::Bottom,
    ];

    pub fn index(self) -> usize {
        match self {
            FaceLabel::Front => 0,
            FaceLabel::Back => 1,
            FaceLabel::Right => 2,
            FaceLabel::Left => 3,
            FaceLabel::Top => 4,
            FaceLabel::Bottom => 5,
        }
    }

    pub fn from_index(index: usize) -> Option<FaceLabel> {
        Self::ALL.get(index).copied()
    }

    /// Axis of the outward normal
    pub fn axis(self) -> Axis {
        match self {
            FaceLabel::Front | FaceLabel::Back => Axis::Z,
            FaceLabel::Right | FaceLabel::Left => Axis::X,
            FaceLabel::Top | FaceLabel::Bottom => Axis::Y,
        }
    }

    /// Sign of the outward normal along [`FaceLabel::axis`]
    pub fn sign(self) -> f32 {
        match self {
            FaceLabel::Front | FaceLabel::Right | FaceLabel::Top => 1.0,
            FaceLabel::Back | FaceLabel::Left | FaceLabel::Bottom => -1.0,
        }
    }

    /// Object-space outward normal
    pub fn normal(self) -> [f32; 3] {
        let s = self.sign();
        self.axis().unit().map(|c| c * s)
    }

    /// Face whose outward normal points along `axis` with the given sign
    pub fn from_axis(axis: Axis, positive: bool) -> FaceLabel {
        match (axis, positive) {
            (Axis::Z, true) => FaceLabel::Front,
            (Axis::Z, false) => FaceLabel::Back,
            (Axis::X, true) => FaceLabel::Right,
            (Axis::X, false) => FaceLabel::Left,
            (Axis::Y, true) => FaceLabel::Top,
            (Axis::Y, false) => FaceLabel::Bottom,
        }
    }

    /// Front and back faces get mitred (chamfer) cuts
    pub fn is_front_or_back(self) -> bool {
        matches!(self, FaceLabel::Front | FaceLabel::Back)
    }

    /// Ordering used when naming an edge after the faces it borders
    fn label_priority(self) -> u8 {
        match self {
            FaceLabel::Front | FaceLabel::Back => 0,
            FaceLabel::Left | FaceLabel::Right => 1,
            FaceLabel::Top | FaceLabel::Bottom => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FaceLabel::Front => "Front",
            FaceLabel::Back => "Back",
            FaceLabel::Right => "Right",
            FaceLabel::Left => "Left",
            FaceLabel::Top => "Top",
            FaceLabel::Bottom => "Bottom",
        }
    }
}

impl fmt::Display for FaceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Human-readable edge identity: the faces the edge borders, primary first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeLabel {
    pub primary: FaceLabel,
    pub secondary: Option<FaceLabel>,
}

impl EdgeLabel {
    /// Build a label from two adjacent faces; the higher-priority face becomes primary
    pub fn between(a: FaceLabel, b: Option<FaceLabel>) -> Self {
        match b {
            Some(b) if b == a => Self { primary: a, secondary: None },
            Some(b) if b.label_priority() < a.label_priority() => Self {
                primary: b,
                secondary: Some(a),
            },
            _ => Self { primary: a, secondary: b },
        }
    }

    /// Whether either bordering face is `face`
    pub fn touches(&self, face: FaceLabel) -> bool {
        self.primary == face || self.secondary == Some(face)
    }
}

impl fmt::Display for EdgeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.secondary {
            Some(s) => write!(f, "{}-{}", self.primary, s),
            None => write!(f, "{}", self.primary),
        }
    }
}

/// Kind of pickable feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    Vertex,
    Edge,
    #[default]
    Face,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 3] =
        [PrimitiveKind::Vertex, PrimitiveKind::Edge, PrimitiveKind::Face];
}

/// Reference to one primitive of the current solid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrimitiveRef {
    pub kind: PrimitiveKind,
    pub index: usize,
}

impl PrimitiveRef {
    pub fn vertex(index: usize) -> Self {
        Self { kind: PrimitiveKind::Vertex, index }
    }

    pub fn edge(index: usize) -> Self {
        Self { kind: PrimitiveKind::Edge, index }
    }

    pub fn face(face: FaceLabel) -> Self {
        Self {
            kind: PrimitiveKind::Face,
            index: face.index(),
        }
    }
}

/// Boolean (CSG) operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BooleanOp {
    Union,
    Difference,
    Intersection,
}
