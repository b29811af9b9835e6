//! Carve pipeline: plan a cutter, subtract it, rebuild the solid

pub mod boolean;
pub mod cutter;
pub mod rebuild;

use tracing::info;

pub use boolean::{BooleanEvaluator, ManifoldEvaluator};
pub use cutter::{plan_edge, plan_face, plan_vertices, CarvePlan, CarveTrigger, CutterSpec, Mitre};
pub use rebuild::rebuild_solid;

use crate::error::CarveError;
use crate::geometry::Solid;

/// Apply `plan` to `solid` and return its replacement. Both operands go to
/// the evaluator with the solid's world transform baked in. On error the
/// input solid is untouched.
pub fn carve(
    solid: &Solid,
    plan: &CarvePlan,
    evaluator: &dyn BooleanEvaluator,
    sharp_degrees: f32,
) -> Result<Solid, CarveError> {
    let base = solid.world_surface();
    let tool = plan
        .cutter
        .surface()
        .transformed(&solid.transform);

    info!(
        trigger = ?plan.trigger,
        size = ?plan.cutter.size.to_array(),
        center = ?plan.cutter.center.to_array(),
        mitre = ?plan.cutter.mitre,
        "carving"
    );

    let result = evaluator.evaluate(&base, &tool, plan.op)?;
    Ok(rebuild_solid(solid, &result, sharp_degrees)?)
}
