//! Contract with the component that actually draws the solid

use serde::Serialize;
use shared::PrimitiveRef;

use super::mesh::{LineMeshData, MeshData};
use crate::error::CarveError;

/// Visual state of one primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Appearance {
    Default,
    Hovered,
    Selected,
}

/// Render-engine side of the editor. The editor pushes display buffers and
/// appearance changes; it never reads anything back.
pub trait ViewportHost {
    /// Replace the displayed solid and its wireframe
    fn show_solid(&mut self, mesh: &MeshData, wireframe: &LineMeshData);

    /// `color` is the RGB the editor resolved for this kind and appearance
    fn set_appearance(&mut self, target: PrimitiveRef, appearance: Appearance, color: [f32; 3]);

    /// A carve was declined or rejected; the previous solid is still shown
    fn report_failure(&mut self, _error: &CarveError) {}
}

/// Host that draws nothing
#[derive(Debug, Default)]
pub struct NullHost;

impl ViewportHost for NullHost {
    fn show_solid(&mut self, _mesh: &MeshData, _wireframe: &LineMeshData) {}

    fn set_appearance(&mut self, _target: PrimitiveRef, _appearance: Appearance, _color: [f32; 3]) {}
}

#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    ShowSolid { triangles: usize, segments: usize },
    Appearance {
        target: PrimitiveRef,
        appearance: Appearance,
        color: [f32; 3],
    },
    Failure(String),
}

/// Host that keeps every call it receives, for headless sessions and tests
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub events: Vec<HostEvent>,
}

impl RecordingHost {
    /// Last appearance pushed for `target`, if any
    pub fn appearance_of(&self, target: PrimitiveRef) -> Option<Appearance> {
        self.last_appearance(target).map(|(appearance, _)| appearance)
    }

    /// Last color pushed for `target`, if any
    pub fn color_of(&self, target: PrimitiveRef) -> Option<[f32; 3]> {
        self.last_appearance(target).map(|(_, color)| color)
    }

    fn last_appearance(&self, target: PrimitiveRef) -> Option<(Appearance, [f32; 3])> {
        self.events.iter().rev().find_map(|e| match e {
            HostEvent::Appearance {
                target: t,
                appearance,
                color,
            } if *t == target => Some((*appearance, *color)),
            _ => None,
        })
    }

    pub fn failures(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                HostEvent::Failure(msg) => Some(msg.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn solids_shown(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, HostEvent::ShowSolid { .. }))
            .count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl ViewportHost for RecordingHost {
    fn show_solid(&mut self, mesh: &MeshData, wireframe: &LineMeshData) {
        self.events.push(HostEvent::ShowSolid {
            triangles: mesh.triangle_count(),
            segments: wireframe.segment_count(),
        });
    }

    fn set_appearance(&mut self, target: PrimitiveRef, appearance: Appearance, color: [f32; 3]) {
        self.events.push(HostEvent::Appearance {
            target,
            appearance,
            color,
        });
    }

    fn report_failure(&mut self, error: &CarveError) {
        self.events.push(HostEvent::Failure(error.to_string()));
    }
}
