//! Factory functions for test data and scripted sessions.

use glam::Vec3;
use shared::{BoxDimensions, FaceLabel};

use crate::build::CutterSpec;
use crate::state::EditorSettings;

// ── Solids ──────────────────────────────────────────────────────

/// The slab used by the demos: 8.95 wide, 0.58 tall, 8 deep
pub fn demo_dims() -> BoxDimensions {
    BoxDimensions::default()
}

/// A 2×2×2 cube, easy to reason about in tests
pub fn cube_dims() -> BoxDimensions {
    BoxDimensions::new(2.0, 2.0, 2.0)
}

/// Settings with a non-default solid
pub fn settings_with(dims: BoxDimensions) -> EditorSettings {
    EditorSettings {
        solid: dims,
        ..EditorSettings::default()
    }
}

/// Axis-aligned cutter without mitre
pub fn straight_cutter(size: [f32; 3], center: [f32; 3]) -> CutterSpec {
    CutterSpec {
        size: Vec3::from_array(size),
        center: Vec3::from_array(center),
        mitre: None,
    }
}

// ── Scripts ─────────────────────────────────────────────────────

/// JSON for selecting one face by name
pub fn select_face_json(face: FaceLabel) -> String {
    serde_json::json!({ "command": "select", "kind": "face", "face": face }).to_string()
}

/// Demo session: notch the left face, chamfer the front face, inspect
pub fn demo_script() -> String {
    serde_json::json!([
        { "command": "inspect" },
        { "command": "select", "kind": "face", "face": "left" },
        { "command": "select", "kind": "face", "face": "front" },
        { "command": "set_mode", "kind": "edge" },
        { "command": "set_camera", "yaw": 35.0, "pitch": 30.0, "distance": 16.0 },
        { "command": "pointer_move", "x": 400.0, "y": 300.0 },
        { "command": "inspect" }
    ])
    .to_string()
}

/// Four corners of one face of the untouched box, in the order a user might click them
pub fn face_corner_indices(face: FaceLabel) -> [usize; 4] {
    crate::geometry::face_corners(face)
}
