//! Headless test harness for driving the editor without a renderer.
//!
//! Aims an orbit camera straight at a feature and moves the pointer onto its
//! projection, so every pick goes through the real ray/tolerance path.

use glam::Vec3;
use shared::{BoxDimensions, FaceLabel, PrimitiveKind, PrimitiveRef};

use crate::editor::{ClickOutcome, Editor, EditorSnapshot};
use crate::error::SolidError;
use crate::state::EditorSettings;
use crate::validation::{DisplayValidator, SolidValidator};
use crate::viewport::mesh::MeshData;
use crate::viewport::{OrbitCamera, RecordingHost};

/// Camera distance used when aiming at a feature
const AIM_DISTANCE: f32 = 10.0;

/// Headless editor with a recording host and an orbit camera
pub struct TestHarness {
    pub editor: Editor<RecordingHost>,
    pub camera: OrbitCamera,
}

impl TestHarness {
    /// Harness around the default demo box
    pub fn new() -> Result<Self, SolidError> {
        Self::with_settings(EditorSettings::default())
    }

    pub fn with_dims(dims: BoxDimensions) -> Result<Self, SolidError> {
        Self::with_settings(EditorSettings {
            solid: dims,
            ..EditorSettings::default()
        })
    }

    pub fn with_settings(settings: EditorSettings) -> Result<Self, SolidError> {
        let editor = Editor::new(settings, RecordingHost::default())?;
        let camera = OrbitCamera::default();
        let mut harness = Self { editor, camera };
        harness.apply_camera();
        Ok(harness)
    }

    // ── Camera ────────────────────────────────────────────────

    pub fn set_camera(&mut self, camera: OrbitCamera) {
        self.camera = camera;
        self.apply_camera();
    }

    fn apply_camera(&mut self) {
        let viewport = self.editor.viewport();
        self.editor.set_camera(self.camera.matrices(viewport));
    }

    /// Look at `target` from `direction`, and put the pointer on it
    pub fn aim(&mut self, direction: Vec3, target: Vec3) -> Option<PrimitiveRef> {
        self.set_camera(OrbitCamera::look_from(direction, target, AIM_DISTANCE));
        self.point_at(target)
    }

    /// Move the pointer onto a world point under the current camera.
    /// Points behind the camera leave the hover untouched.
    pub fn point_at(&mut self, world: Vec3) -> Option<PrimitiveRef> {
        let ndc = self.editor.camera().project(world)?;
        self.editor.pointer_move_ndc(ndc)
    }

    // ── Hover / click helpers ─────────────────────────────────

    pub fn hover_face(&mut self, face: FaceLabel) -> Option<PrimitiveRef> {
        self.editor.set_active_kind(PrimitiveKind::Face);
        let solid = self.editor.solid();
        let anchor = solid.face_anchor(face)?;
        let normal = solid.primitives.face(face)?.world_normal(&solid.transform);
        let target = solid.world_point(anchor);
        self.aim(normal, target)
    }

    pub fn hover_edge(&mut self, index: usize) -> Option<PrimitiveRef> {
        self.editor.set_active_kind(PrimitiveKind::Edge);
        let solid = self.editor.solid();
        let edge = solid.primitives.edges.get(index)?;
        let target = solid.world_point(edge.midpoint());
        let direction = solid.transform.transform_vector3(edge.outward_bisector());
        self.aim(direction, target)
    }

    pub fn hover_vertex(&mut self, index: usize) -> Option<PrimitiveRef> {
        self.editor.set_active_kind(PrimitiveKind::Vertex);
        let solid = self.editor.solid();
        let position = solid.primitives.vertices.get(index)?.position;
        let outward = (position - solid.surface.aabb().center()).try_normalize().unwrap_or(Vec3::Y);
        let target = solid.world_point(position);
        let direction = solid.transform.transform_vector3(outward);
        self.aim(direction, target)
    }

    pub fn click_face(&mut self, face: FaceLabel) -> Option<ClickOutcome> {
        self.hover_face(face)?;
        self.editor.click()
    }

    pub fn click_edge(&mut self, index: usize) -> Option<ClickOutcome> {
        self.hover_edge(index)?;
        self.editor.click()
    }

    pub fn click_vertex(&mut self, index: usize) -> Option<ClickOutcome> {
        self.hover_vertex(index)?;
        self.editor.click()
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn inspect(&self) -> EditorSnapshot {
        self.editor.inspect()
    }

    /// Failures reported to the host so far
    pub fn failures(&self) -> Vec<String> {
        self.editor
            .host()
            .failures()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Solid and display-buffer checks; empty when everything holds
    pub fn validate(&self) -> Vec<String> {
        let solid = self.editor.solid();
        let mut errors = SolidValidator::new(solid).validate_all();
        let surface = solid.world_surface();
        let mesh = MeshData::from_surface(&surface, |_| [0.5; 3]);
        errors.extend(DisplayValidator::new(&mesh, &surface).validate_all());
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_harness() {
        let h = TestHarness::new().unwrap();
        let snap = h.inspect();
        assert_eq!((snap.faces, snap.edges, snap.vertices), (6, 12, 8));
        assert!(h.validate().is_empty());
        assert_eq!(h.editor.host().solids_shown(), 1);
    }

    #[test]
    fn test_hover_each_face() {
        let mut h = TestHarness::new().unwrap();
        for face in FaceLabel::ALL {
            assert_eq!(h.hover_face(face), Some(PrimitiveRef::face(face)), "{face}");
        }
    }

    #[test]
    fn test_hover_each_edge() {
        let mut h = TestHarness::new().unwrap();
        for index in 0..12 {
            assert_eq!(h.hover_edge(index), Some(PrimitiveRef::edge(index)));
        }
    }

    #[test]
    fn test_hover_each_vertex() {
        let mut h = TestHarness::new().unwrap();
        for index in 0..8 {
            assert_eq!(h.hover_vertex(index), Some(PrimitiveRef::vertex(index)));
        }
    }

    #[test]
    fn test_point_at_off_center_feature() {
        let mut h = TestHarness::new().unwrap();
        h.editor.set_active_kind(PrimitiveKind::Face);
        // Oblique view from above the front; the front anchor is not at the center
        h.set_camera(OrbitCamera::look_from(Vec3::new(0.0, 1.0, 1.0), Vec3::ZERO, 20.0));
        let anchor = h.editor.solid().face_anchor(FaceLabel::Front).unwrap();
        assert_eq!(h.point_at(anchor), Some(PrimitiveRef::face(FaceLabel::Front)));
    }

    #[test]
    fn test_invalid_dims() {
        assert!(TestHarness::with_dims(BoxDimensions::new(0.0, 1.0, 1.0)).is_err());
    }
}
