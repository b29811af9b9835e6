//! Boolean (CSG) evaluation between closed surfaces

use manifold_rs::Mesh;
use shared::BooleanOp;
use vcad::Part;

use crate::error::BooleanError;
use crate::geometry::Surface;

/// Evaluates `a op b` for two closed surfaces in a shared coordinate space.
/// Implementations must not keep or mutate their inputs and must be
/// deterministic for identical inputs.
pub trait BooleanEvaluator {
    fn evaluate(&self, a: &Surface, b: &Surface, op: BooleanOp) -> Result<Surface, BooleanError>;
}

/// Evaluator backed by the manifold kernel through vcad parts
#[derive(Debug, Default, Clone, Copy)]
pub struct ManifoldEvaluator;

impl ManifoldEvaluator {
    fn to_part(surface: &Surface, name: &str) -> Result<Part, BooleanError> {
        if surface.is_empty() {
            return Err(BooleanError::DegenerateInput("empty surface"));
        }
        let mesh = Mesh::new(&surface.flat_positions(), &surface.indices);
        let manifold = mesh.to_manifold();
        if manifold.is_empty() {
            return Err(BooleanError::DegenerateInput("surface is not a closed manifold"));
        }
        Ok(Part::new(name, manifold))
    }
}

impl BooleanEvaluator for ManifoldEvaluator {
    fn evaluate(&self, a: &Surface, b: &Surface, op: BooleanOp) -> Result<Surface, BooleanError> {
        let base = Self::to_part(a, "solid")?;
        let tool = Self::to_part(b, "cutter")?;

        let result = match op {
            BooleanOp::Union => base.union(&tool),
            BooleanOp::Difference => base.difference(&tool),
            BooleanOp::Intersection => base.intersection(&tool),
        };

        let mesh = result.to_mesh();
        let positions = mesh.vertices();
        let indices = mesh.indices();
        tracing::debug!(
            "boolean {:?}: {} vertices, {} tris",
            op,
            positions.len() / 3,
            indices.len() / 3
        );
        if positions.is_empty() || indices.is_empty() {
            return Err(BooleanError::EmptyResult);
        }

        Ok(Surface::from_flat(&positions, &indices))
    }
}
