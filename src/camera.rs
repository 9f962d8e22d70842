//! Camera parameters and the view and projection matrices built from them.

use nalgebra::{Matrix4, Point3, Vector3};
use tracing::warn;
use crate::animation_error::AnimationError;

/// Cross products shorter than this mean forward and up are parallel.
const PARALLEL_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Point3<f64>,
    pub at: Point3<f64>,
    pub up: Vector3<f64>,
    /// Vertical field of view, degrees.
    pub fovy: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Camera {
            eye: Point3::new(0.0, 0.0, 20.0),
            at: Point3::origin(),
            up: Vector3::y(),
            fovy: 45.0,
            aspect: 1.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

fn fallback_up(forward: &Vector3<f64>) -> Vector3<f64> {
    if forward.cross(&Vector3::y()).norm() < PARALLEL_EPSILON * forward.norm() {
        Vector3::z()
    } else {
        Vector3::y()
    }
}

impl Camera {
    /// Checks the camera basis. Returns the up vector to use, or an error if the eye
    /// coincides with the target or looks along `up`.
    pub fn basis(&self) -> Result<Vector3<f64>, AnimationError> {
        let forward = self.at - self.eye;
        if forward.norm() < PARALLEL_EPSILON {
            return Err(AnimationError::DegenerateCameraBasis(
                format!("eye and target coincide at {:?}", self.eye.coords.as_slice())));
        }
        if forward.cross(&self.up).norm() < PARALLEL_EPSILON * forward.norm() {
            return Err(AnimationError::DegenerateCameraBasis(
                format!("up {:?} is parallel to the view direction", self.up.as_slice())));
        }
        Ok(self.up)
    }

    /// Right-handed look-at matrix. A degenerate basis is logged and replaced by +y up
    /// (or +z if the camera looks along y).
    pub fn view(&self) -> Matrix4<f64> {
        let at = if (self.at - self.eye).norm() < PARALLEL_EPSILON {
            // Look down -z like the default camera
            self.eye - Vector3::z()
        } else {
            self.at
        };
        let up = match self.basis() {
            Ok(up) => up,
            Err(e) => {
                warn!("{}, substituting default up vector", e);
                fallback_up(&(at - self.eye))
            }
        };
        Matrix4::look_at_rh(&self.eye, &at, &up)
    }

    pub fn projection(&self) -> Matrix4<f64> {
        Matrix4::new_perspective(self.aspect, self.fovy.to_radians(), self.near, self.far)
    }

    /// Normalized device coordinates of the world point.
    pub fn project_to_ndc(&self, point: &Point3<f64>) -> Point3<f64> {
        let clip = self.projection() * self.view() * point.to_homogeneous();
        Point3::from_homogeneous(clip).unwrap_or(Point3::origin())
    }
}
