use glam::{Mat4, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use super::picking::{PickTolerance, Ray};

/// Map a screen position in pixels to normalized device coordinates.
/// Both axes land in [-1, 1]; screen-down becomes NDC-down.
pub fn normalize_pointer(screen: Vec2, viewport: Vec2) -> Vec2 {
    Vec2::new(
        screen.x / viewport.x * 2.0 - 1.0,
        -(screen.y / viewport.y) * 2.0 + 1.0,
    )
}

/// View and projection supplied by whatever renders the scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraMatrices {
    pub view: Mat4,
    pub projection: Mat4,
}

impl CameraMatrices {
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    fn is_perspective(&self) -> bool {
        self.projection.w_axis.w.abs() < 1e-6
    }

    /// Cast a ray from an NDC position into the scene.
    /// The origin sits on the near plane so orthographic cameras work too.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let vp_inv = self.view_projection().inverse();

        let near_world = vp_inv * Vec4::new(ndc.x, ndc.y, -1.0, 1.0);
        let far_world = vp_inv * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);

        let near = near_world.truncate() / near_world.w;
        let far = far_world.truncate() / far_world.w;

        Ray {
            origin: near,
            direction: (far - near).normalize_or_zero(),
        }
    }

    /// Project a world point to NDC; None when it is behind the camera
    pub fn project(&self, point: Vec3) -> Option<Vec2> {
        let p = self.view_projection() * point.extend(1.0);
        if p.w <= 0.0 {
            return None;
        }
        Some(Vec2::new(p.x / p.w, p.y / p.w))
    }

    /// Convert a radius in pixels into a world-space tolerance along a pick ray
    pub fn pixel_tolerance(&self, pixels: f32, viewport_height: f32) -> PickTolerance {
        let scale = self.projection.y_axis.y.abs().max(1e-6);
        let world_per_pixel = 2.0 / (scale * viewport_height.max(1.0));
        if self.is_perspective() {
            PickTolerance {
                base: 0.0,
                per_depth: pixels * world_per_pixel,
            }
        } else {
            PickTolerance::fixed(pixels * world_per_pixel)
        }
    }
}

/// Orbit camera used by headless sessions and tests
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitCamera {
    /// Horizontal rotation angle (radians)
    pub yaw: f32,
    /// Vertical rotation angle (radians)
    pub pitch: f32,
    /// Distance from target
    pub distance: f32,
    /// Camera target point
    pub target: Vec3,
    /// Vertical field of view (radians)
    pub fov: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            yaw: 0.6,
            pitch: 0.4,
            distance: 16.0,
            target: Vec3::ZERO,
            fov: 45.0_f32.to_radians(),
        }
    }
}

impl OrbitCamera {
    /// Camera placed along `direction` from `target`, looking back at it
    pub fn look_from(direction: Vec3, target: Vec3, distance: f32) -> Self {
        let d = direction.normalize_or_zero();
        Self {
            yaw: d.x.atan2(d.z),
            pitch: d.y.clamp(-1.0, 1.0).asin().clamp(-1.5, 1.5),
            distance,
            target,
            ..Self::default()
        }
    }

    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw += dx.to_radians();
        self.pitch = (self.pitch + dy.to_radians()).clamp(-1.5, 1.5);
    }

    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance * (1.0 - delta)).clamp(0.5, 100.0);
    }

    /// Camera position in world space
    pub fn eye_position(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();

        self.target
            + Vec3::new(
                self.distance * cp * sy,
                self.distance * sp,
                self.distance * cp * cy,
            )
    }

    /// View matrix (world -> camera)
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye_position(), self.target, Vec3::Y)
    }

    /// Projection matrix (camera -> clip)
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov, aspect, 0.1, 200.0)
    }

    pub fn matrices(&self, viewport: Vec2) -> CameraMatrices {
        CameraMatrices {
            view: self.view_matrix(),
            projection: self.projection_matrix(viewport.x / viewport.y.max(1.0)),
        }
    }
}
