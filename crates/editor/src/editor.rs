//! Editor context
//!
//! Owns the solid, the hover/selection state and the host, and runs the
//! pick -> select -> plan -> subtract -> rebuild loop. Every event is handled
//! to completion before the call returns, so at most one carve per solid is
//! ever in flight.

use glam::{Affine3A, Vec2, Vec3};
use serde::Serialize;
use shared::{BoxDimensions, FaceLabel, PrimitiveKind, PrimitiveRef};
use tracing::{debug, info, warn};

use crate::build::{self, BooleanEvaluator, CarvePlan, ManifoldEvaluator};
use crate::error::{CarveError, SolidError};
use crate::geometry::Solid;
use crate::state::{EditorSettings, HoverState, SelectionSet, Toggle, VERTEX_CAPACITY};
use crate::viewport::mesh::{LineMeshData, MeshData};
use crate::viewport::{
    normalize_pointer, Appearance, CameraMatrices, OrbitCamera, PickHit, PickTargets, ViewportHost,
};

/// Summary of a successful carve
#[derive(Debug, Clone, Serialize)]
pub struct CarveReport {
    pub plan: CarvePlan,
    pub revision: u64,
    pub triangles: usize,
    pub edges: usize,
    pub vertices: usize,
    pub volume: f32,
    /// Selected primitives that no longer exist on the new solid
    pub pruned: Vec<PrimitiveRef>,
}

/// What a click did
#[derive(Debug)]
pub struct ClickOutcome {
    pub target: PrimitiveRef,
    pub toggle: Toggle,
    /// Present when the click completed a carve trigger
    pub carve: Option<Result<CarveReport, CarveError>>,
}

impl ClickOutcome {
    pub fn carved(&self) -> bool {
        matches!(self.carve, Some(Ok(_)))
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SelectedIndices {
    pub vertex: Vec<usize>,
    pub edge: Vec<usize>,
    pub face: Vec<FaceLabel>,
}

/// Serializable view of the editor state
#[derive(Debug, Clone, Serialize)]
pub struct EditorSnapshot {
    pub dims: BoxDimensions,
    pub revision: u64,
    pub mode: PrimitiveKind,
    pub triangles: usize,
    pub edges: usize,
    pub vertices: usize,
    pub faces: usize,
    pub volume: f32,
    pub closed: bool,
    pub aabb_min: Vec3,
    pub aabb_max: Vec3,
    pub hover: Option<PrimitiveRef>,
    pub selected: SelectedIndices,
}

pub struct Editor<H: ViewportHost> {
    settings: EditorSettings,
    solid: Solid,
    targets: PickTargets,
    active_kind: PrimitiveKind,
    hover: HoverState,
    selection: SelectionSet,
    camera: CameraMatrices,
    viewport: Vec2,
    evaluator: Box<dyn BooleanEvaluator>,
    host: H,
}

impl<H: ViewportHost> Editor<H> {
    pub fn new(settings: EditorSettings, host: H) -> Result<Self, SolidError> {
        Self::with_evaluator(settings, host, Box::new(ManifoldEvaluator))
    }

    pub fn with_evaluator(
        settings: EditorSettings,
        host: H,
        evaluator: Box<dyn BooleanEvaluator>,
    ) -> Result<Self, SolidError> {
        let solid = Solid::new_box(settings.solid)?;
        let viewport = Vec2::from_array(settings.picking.viewport);
        let mut editor = Self {
            targets: PickTargets::resolve(&solid),
            solid,
            active_kind: PrimitiveKind::default(),
            hover: HoverState::default(),
            selection: SelectionSet::default(),
            camera: OrbitCamera::default().matrices(viewport),
            viewport,
            evaluator,
            host,
            settings,
        };
        editor.show_solid();
        info!(dims = ?editor.solid.dims, "editor ready");
        Ok(editor)
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn solid(&self) -> &Solid {
        &self.solid
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn hover(&self) -> Option<PrimitiveRef> {
        self.hover.target
    }

    pub fn active_kind(&self) -> PrimitiveKind {
        self.active_kind
    }

    pub fn camera(&self) -> &CameraMatrices {
        &self.camera
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    // ── External inputs ───────────────────────────────────────

    /// Switch which primitive kind the pointer picks. Drops the current hover.
    pub fn set_active_kind(&mut self, kind: PrimitiveKind) {
        if kind != self.active_kind {
            self.active_kind = kind;
            self.set_hover(None);
        }
    }

    pub fn set_camera(&mut self, camera: CameraMatrices) {
        self.camera = camera;
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width.max(1.0), height.max(1.0));
    }

    /// Move the solid in the world. The surface itself is not changed.
    pub fn set_transform(&mut self, transform: Affine3A) {
        self.solid.transform = transform;
        self.targets = PickTargets::resolve(&self.solid);
        self.show_solid();
    }

    /// Start over with a fresh box
    pub fn reset(&mut self, dims: BoxDimensions) -> Result<(), SolidError> {
        let solid = Solid::new_box(dims)?;
        self.set_hover(None);
        for kind in PrimitiveKind::ALL {
            for r in self.selection.members(kind).to_vec() {
                self.push_appearance(r, Appearance::Default);
            }
        }
        self.selection.clear();
        self.solid = solid;
        self.targets = PickTargets::resolve(&self.solid);
        self.show_solid();
        info!(?dims, "solid reset");
        Ok(())
    }

    // ── Picking ───────────────────────────────────────────────

    /// Nearest primitive of the active kind under an NDC position
    pub fn pick(&self, ndc: Vec2) -> Option<PickHit> {
        debug_assert_eq!(self.targets.revision, self.solid.revision);
        let ray = self.camera.ray_from_ndc(ndc);
        let picking = &self.settings.picking;
        let edge_tol = self.camera.pixel_tolerance(picking.edge_px, self.viewport.y);
        let vertex_tol = self.camera.pixel_tolerance(picking.vertex_px, self.viewport.y);
        self.targets.pick(&ray, self.active_kind, edge_tol, vertex_tol)
    }

    /// Pointer moved to a screen position in pixels
    pub fn pointer_move(&mut self, screen: Vec2) -> Option<PrimitiveRef> {
        self.pointer_move_ndc(normalize_pointer(screen, self.viewport))
    }

    /// Pointer moved to a normalized position; updates the hover
    pub fn pointer_move_ndc(&mut self, ndc: Vec2) -> Option<PrimitiveRef> {
        let hit = self.pick(ndc).map(|h| h.target);
        self.set_hover(hit);
        hit
    }

    fn set_hover(&mut self, next: Option<PrimitiveRef>) {
        let Some(prev) = self.hover.replace(next) else {
            return;
        };
        if let Some(p) = prev {
            if !self.selection.contains(p) {
                self.push_appearance(p, Appearance::Default);
            }
        }
        if let Some(n) = next {
            if !self.selection.contains(n) {
                self.push_appearance(n, Appearance::Hovered);
            }
        }
    }

    // ── Selection ─────────────────────────────────────────────

    /// Toggle the hovered primitive. Returns None when nothing is hovered.
    pub fn click(&mut self) -> Option<ClickOutcome> {
        let target = self.hover.target?;
        Some(self.toggle(target))
    }

    /// Toggle a primitive by reference, with the same effects as clicking it
    pub fn select(&mut self, target: PrimitiveRef) -> Result<ClickOutcome, CarveError> {
        if target.index >= self.solid.primitives.count(target.kind) {
            return Err(CarveError::StalePrimitive {
                kind: target.kind,
                index: target.index,
            });
        }
        Ok(self.toggle(target))
    }

    fn toggle(&mut self, target: PrimitiveRef) -> ClickOutcome {
        let toggle = self.selection.toggle(target);

        if let Some(evicted) = toggle.evicted {
            self.push_appearance(evicted, Appearance::Default);
        }
        let appearance = if toggle.added {
            Appearance::Selected
        } else {
            Appearance::Default
        };
        self.push_appearance(target, appearance);

        let plan = if toggle.added { self.plan_for(target) } else { None };
        let carve = plan.map(|plan| self.run_carve(plan));

        ClickOutcome { target, toggle, carve }
    }

    /// Plan for a selection that just completed a trigger, if it did
    fn plan_for(&self, added: PrimitiveRef) -> Option<Result<CarvePlan, CarveError>> {
        let cfg = &self.settings.carve;
        match added.kind {
            PrimitiveKind::Face => Some(match FaceLabel::from_index(added.index) {
                Some(face) => build::plan_face(&self.solid, face, cfg),
                None => Err(CarveError::StalePrimitive {
                    kind: added.kind,
                    index: added.index,
                }),
            }),
            PrimitiveKind::Edge => Some(build::plan_edge(&self.solid, added.index, cfg)),
            PrimitiveKind::Vertex => {
                let members = self.selection.members(PrimitiveKind::Vertex);
                if members.len() != VERTEX_CAPACITY {
                    return None;
                }
                let indices = [0, 1, 2, 3].map(|i| members[i].index);
                Some(build::plan_vertices(&self.solid, indices, cfg))
            }
        }
    }

    // ── Carving ───────────────────────────────────────────────

    /// Apply an explicit plan to the current solid
    pub fn carve(&mut self, plan: CarvePlan) -> Result<CarveReport, CarveError> {
        self.run_carve(Ok(plan))
    }

    /// On any failure the current solid stays displayed and the host is told
    fn run_carve(&mut self, plan: Result<CarvePlan, CarveError>) -> Result<CarveReport, CarveError> {
        let outcome = plan.and_then(|plan| {
            build::carve(
                &self.solid,
                &plan,
                self.evaluator.as_ref(),
                self.settings.sharp_edge_degrees,
            )
            .map(|solid| (plan, solid))
        });

        match outcome {
            Ok((plan, solid)) => Ok(self.replace_solid(plan, solid)),
            Err(e) => {
                warn!(error = %e, "carve failed, keeping current solid");
                self.host.report_failure(&e);
                Err(e)
            }
        }
    }

    fn replace_solid(&mut self, plan: CarvePlan, solid: Solid) -> CarveReport {
        let previous = std::mem::replace(&mut self.solid, solid);
        self.targets = PickTargets::resolve(&self.solid);
        // Hover referred to the old primitive set
        self.hover.clear();

        // Rebuilt primitives are re-indexed; follow each member by geometry
        let before: Vec<PrimitiveRef> = PrimitiveKind::ALL
            .iter()
            .flat_map(|&kind| self.selection.members(kind).to_vec())
            .collect();
        let next = &self.solid.primitives;
        let pruned = self
            .selection
            .remap(|r| previous.primitives.relocate(r, next));
        if !pruned.is_empty() {
            debug!(?pruned, "selected primitives gone after rebuild");
        }

        self.show_solid();
        for r in before {
            if !self.selection.contains(r) {
                self.push_appearance(r, Appearance::Default);
            }
        }
        for kind in PrimitiveKind::ALL {
            for r in self.selection.members(kind).to_vec() {
                self.push_appearance(r, Appearance::Selected);
            }
        }

        CarveReport {
            plan,
            revision: self.solid.revision,
            triangles: self.solid.surface.triangle_count(),
            edges: self.solid.primitives.edges.len(),
            vertices: self.solid.primitives.vertices.len(),
            volume: self.solid.surface.volume(),
            pruned,
        }
    }

    fn push_appearance(&mut self, target: PrimitiveRef, appearance: Appearance) {
        let color = self.settings.appearance.color_for(target.kind, appearance);
        self.host.set_appearance(target, appearance, color);
    }

    fn show_solid(&mut self) {
        let face_color = self.settings.appearance.face;
        let edge = self.settings.appearance.edge;
        let mesh = MeshData::from_surface(&self.targets.surface, |_| face_color);
        let wireframe = LineMeshData::wireframe(&self.targets.edges, [edge[0], edge[1], edge[2], 1.0]);
        self.host.show_solid(&mesh, &wireframe);
    }

    // ── Inspection ────────────────────────────────────────────

    pub fn inspect(&self) -> EditorSnapshot {
        let p = &self.solid.primitives;
        let aabb = self.solid.surface.aabb();
        let indices = |kind| {
            self.selection
                .members(kind)
                .iter()
                .map(|r: &PrimitiveRef| r.index)
                .collect::<Vec<_>>()
        };
        EditorSnapshot {
            dims: self.solid.dims,
            revision: self.solid.revision,
            mode: self.active_kind,
            triangles: self.solid.surface.triangle_count(),
            edges: p.edges.len(),
            vertices: p.vertices.len(),
            faces: p.faces.len(),
            volume: self.solid.surface.volume(),
            closed: self.solid.surface.is_closed_manifold(),
            aabb_min: aabb.min,
            aabb_max: aabb.max,
            hover: self.hover.target,
            selected: SelectedIndices {
                vertex: indices(PrimitiveKind::Vertex),
                edge: indices(PrimitiveKind::Edge),
                face: indices(PrimitiveKind::Face)
                    .into_iter()
                    .filter_map(FaceLabel::from_index)
                    .collect(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::NullHost;

    fn editor() -> Editor<NullHost> {
        Editor::new(EditorSettings::default(), NullHost).unwrap()
    }

    #[test]
    fn test_new_editor_snapshot() {
        let snap = editor().inspect();
        assert_eq!(snap.revision, 0);
        assert_eq!(snap.hover, None);
        assert!((snap.aabb_max.y - 0.29).abs() < 1e-6);
        assert!(snap.selected.face.is_empty());
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut settings = EditorSettings::default();
        settings.solid.depth = 0.0;
        assert!(Editor::new(settings, NullHost).is_err());
    }

    #[test]
    fn test_edge_select_carves_and_tracks_selection() {
        let mut ed = editor();
        let volume = ed.solid().surface.volume();
        let before = ed.solid().primitives.edges[9].clone();
        let outcome = ed.select(PrimitiveRef::edge(9)).unwrap();
        let report = match outcome.carve {
            Some(Ok(report)) => report,
            other => panic!("expected a carve, got {other:?}"),
        };
        assert_eq!(report.revision, 1);
        assert!(report.volume < volume);

        // Still selected only if the same edge exists on the new solid
        let kept = ed.selection().members(PrimitiveKind::Edge);
        assert_eq!(kept.len() + report.pruned.len(), 1);
        for r in kept {
            let edge = &ed.solid().primitives.edges[r.index];
            assert!((edge.midpoint() - before.midpoint()).length() < 1e-4);
        }
    }

    #[test]
    fn test_front_edge_carve_prunes_removed_edge() {
        let mut ed = editor();
        // Back-Right lies wholly inside the mitred back slab
        let outcome = ed.select(PrimitiveRef::edge(5)).unwrap();
        let report = match outcome.carve {
            Some(Ok(report)) => report,
            other => panic!("expected a carve, got {other:?}"),
        };
        assert_eq!(report.pruned, vec![PrimitiveRef::edge(5)]);
        assert!(ed.inspect().selected.edge.is_empty());
    }

    #[test]
    fn test_viewport_is_clamped() {
        let mut ed = editor();
        ed.set_viewport(0.0, -5.0);
        assert_eq!(ed.viewport(), Vec2::ONE);
    }

    #[test]
    fn test_pick_misses_when_looking_away() {
        let mut ed = editor();
        let camera = OrbitCamera::look_from(Vec3::Y, Vec3::new(0.0, -50.0, 0.0), 5.0);
        ed.set_camera(camera.matrices(ed.viewport()));
        for kind in PrimitiveKind::ALL {
            ed.set_active_kind(kind);
            assert!(ed.pick(Vec2::ZERO).is_none());
        }
    }
}
