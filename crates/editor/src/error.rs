use shared::{BoxDimensions, PrimitiveKind};
use thiserror::Error;

/// Failure inside the CSG evaluator
#[derive(Debug, Error)]
pub enum BooleanError {
    #[error("degenerate boolean input: {0}")]
    DegenerateInput(&'static str),
    #[error("boolean result is empty")]
    EmptyResult,
    #[error("boolean result is not a closed manifold")]
    NonManifoldResult,
}

/// A carve that was declined or failed; the solid is left as it was
#[derive(Debug, Error)]
pub enum CarveError {
    #[error("cannot plan cutter: {0}")]
    PlanningDegenerate(String),
    #[error("{kind:?} {index} does not exist on the current solid")]
    StalePrimitive { kind: PrimitiveKind, index: usize },
    #[error(transparent)]
    Boolean(#[from] BooleanError),
}

#[derive(Debug, Error)]
pub enum SolidError {
    #[error("invalid box dimensions {0:?}")]
    InvalidDimensions(BoxDimensions),
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings io: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings parse: {0}")]
    Parse(#[from] serde_json::Error),
}
