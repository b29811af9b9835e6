//! Replacing the solid after a boolean
//!
//! Evaluator output comes back in world space with arbitrary winding on the
//! cut seam and no face tags. It is mapped back to object space, welded,
//! wound outward, retagged by normal, and its primitives are derived from
//! scratch. The old 12-edge table is never reused once the topology changed.

use tracing::info;

use crate::error::BooleanError;
use crate::geometry::{PrimitiveSet, Solid, Surface};

/// Build the successor of `prev` from a world-space evaluator result
pub fn rebuild_solid(
    prev: &Solid,
    world_result: &Surface,
    sharp_degrees: f32,
) -> Result<Solid, BooleanError> {
    let mut surface = world_result
        .transformed(&prev.transform.inverse())
        .welded();
    if surface.is_empty() {
        return Err(BooleanError::EmptyResult);
    }

    if surface.orient_outward() {
        tracing::debug!("flipped inverted boolean result");
    }
    surface.retag_faces_by_normal();

    if !surface.is_closed_manifold() {
        return Err(BooleanError::NonManifoldResult);
    }

    let primitives = PrimitiveSet::from_surface(&surface, sharp_degrees);
    let solid = Solid {
        dims: prev.dims,
        surface,
        transform: prev.transform,
        primitives,
        revision: prev.revision + 1,
    };

    info!(
        revision = solid.revision,
        triangles = solid.surface.triangle_count(),
        edges = solid.primitives.edges.len(),
        vertices = solid.primitives.vertices.len(),
        "solid rebuilt"
    );
    Ok(solid)
}
