//! Display buffers, edge extraction, cameras and picking

pub mod camera;
pub mod edge;
pub mod host;
pub mod mesh;
pub mod picking;

pub use camera::{normalize_pointer, CameraMatrices, OrbitCamera};
pub use host::{Appearance, NullHost, RecordingHost, ViewportHost};
pub use picking::{PickHit, PickTargets, PickTolerance, Ray};
