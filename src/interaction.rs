//! Picking and dragging the object with the pointer.
//!
//! The pointer position is turned into a world ray from the camera eye. A press picks the
//! object if the ray passes within the pick radius of it, and the distance along the ray is
//! kept as the drag depth. Moving the pointer slides the object along that depth; releasing
//! it lets the object fall to the ground.

use nalgebra::{Matrix4, Point3, Vector3, Vector4};
use tracing::{debug, info};

use crate::camera::Camera;
use crate::config::BehaviorConfig;
use crate::state::{AnimationState, ObjectState};

/// Size of the canvas in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport { width: 512.0, height: 512.0 }
    }
}

/// Pointer position in canvas pixels, origin at the top left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
}

impl PointerEvent {
    pub fn new(x: f64, y: f64) -> Self {
        PointerEvent { x, y }
    }
}

/// Canvas position of the world point, the inverse of [`ray_direction`] for points in view.
pub fn canvas_position(camera: &Camera, viewport: &Viewport, point: &Point3<f64>) -> PointerEvent {
    let ndc = camera.project_to_ndc(point);
    PointerEvent {
        x: (ndc.x + 1.0) / 2.0 * viewport.width,
        y: viewport.height - (ndc.y + 1.0) / 2.0 * viewport.height,
    }
}

/// Unit direction of the world ray from the camera eye through the pointer.
pub fn ray_direction(camera: &Camera, viewport: &Viewport, pointer: &PointerEvent) -> Vector3<f64> {
    let x = pointer.x / viewport.width * 2.0 - 1.0;
    let y = (viewport.height - pointer.y) / viewport.height * 2.0 - 1.0;
    let clip = Vector4::new(x, y, -1.0, 1.0);

    let inverse_projection = camera.projection().try_inverse().unwrap_or_else(Matrix4::identity);
    let inverse_view = camera.view().try_inverse().unwrap_or_else(Matrix4::identity);

    let eye = inverse_projection * clip;
    let world = inverse_view * Vector4::new(eye.x, eye.y, -1.0, 0.0);
    let direction = world.xyz();
    let length = direction.norm();
    if length > 0.0 {
        direction / length
    } else {
        camera.at - camera.eye
    }
}

/// Distance along the ray to the point closest to the object, if the ray passes within
/// `radius` of it. Objects behind the origin are never picked.
pub fn pick_test(origin: &Point3<f64>, direction: &Vector3<f64>, object: &Point3<f64>,
                 radius: f64) -> Option<f64> {
    let depth = direction.dot(&(object - origin));
    if depth < 0.0 {
        return None;
    }
    let closest = origin + direction * depth;
    if (object - closest).norm() < radius {
        Some(depth)
    } else {
        None
    }
}

/// Routes pointer events to the object.
#[derive(Debug, Clone, Copy, Default)]
pub struct DragController {
    pub viewport: Viewport,
}

impl DragController {
    pub fn new(viewport: Viewport) -> Self {
        DragController { viewport }
    }

    /// Starts dragging if the pointer hits the object. The claw holds on to what it carries,
    /// so an attached object cannot be picked.
    pub fn press(&self, state: &mut AnimationState, camera: &Camera, config: &BehaviorConfig,
                 pointer: &PointerEvent) -> bool {
        if state.is_attached() {
            return false;
        }
        let direction = ray_direction(camera, &self.viewport, pointer);
        match pick_test(&camera.eye, &direction, &state.object.position, config.pick_radius) {
            Some(depth) => {
                info!(depth, "Picked the object");
                state.object.state = ObjectState::Dragged { depth };
                true
            }
            None => false,
        }
    }

    /// Moves a dragged object to the pointer, on the drag plane.
    pub fn motion(&self, state: &mut AnimationState, camera: &Camera, config: &BehaviorConfig,
                  pointer: &PointerEvent) {
        let ObjectState::Dragged { depth } = state.object.state else {
            return;
        };
        let direction = ray_direction(camera, &self.viewport, pointer);
        let mut position = camera.eye + direction * depth;
        position.z = config.drag_plane_z;
        state.object.position = position;
    }

    /// Ends the drag: the object is pushed to the release depth and starts falling.
    pub fn release(&self, state: &mut AnimationState, config: &BehaviorConfig) -> bool {
        if !matches!(state.object.state, ObjectState::Dragged { .. }) {
            return false;
        }
        state.object.position.z = config.release_z;
        state.object.state = ObjectState::Falling { target_y: config.ground_y, into_receptacle: false };
        debug!(x = state.object.position.x, y = state.object.position.y, "Released the object");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_ray_points_at_target() {
        let camera = Camera::default();
        let dir = ray_direction(&camera, &Viewport::default(), &PointerEvent::new(256.0, 256.0));
        assert!((dir - Vector3::new(0.0, 0.0, -1.0)).norm() < 1e-9);
    }

    #[test]
    fn test_top_of_canvas_is_up() {
        let camera = Camera::default();
        let dir = ray_direction(&camera, &Viewport::default(), &PointerEvent::new(256.0, 0.0));
        assert!(dir.y > 0.0);
        assert!(dir.x.abs() < 1e-12);
        assert!((dir.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_canvas_position_inverts_ray() {
        let camera = Camera::default();
        let viewport = Viewport::default();
        let object = Point3::new(7.0, 4.0, 0.0);
        let pointer = canvas_position(&camera, &viewport, &object);
        let dir = ray_direction(&camera, &viewport, &pointer);
        let depth = pick_test(&camera.eye, &dir, &object, 1e-6);
        assert!(depth.is_some());
    }

    #[test]
    fn test_pick_rejects_behind_and_far() {
        let origin = Point3::new(0.0, 0.0, 20.0);
        let dir = Vector3::new(0.0, 0.0, -1.0);
        assert_eq!(pick_test(&origin, &dir, &Point3::new(0.0, 0.0, 25.0), 1.0), None);
        assert_eq!(pick_test(&origin, &dir, &Point3::new(1.0, 0.0, 0.0), 1.0), None);
        let depth = pick_test(&origin, &dir, &Point3::new(0.5, 0.0, 0.0), 1.0).unwrap();
        assert!((depth - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_attached_object_cannot_be_picked() {
        let config = BehaviorConfig::default();
        let camera = Camera::default();
        let mut state = AnimationState::new(&config);
        state.object.position = Point3::origin();
        state.object.state = ObjectState::Attached { offset: Vector3::zeros() };
        let controller = DragController::default();
        assert!(!controller.press(&mut state, &camera, &config, &PointerEvent::new(256.0, 256.0)));
        assert!(state.is_attached());
    }

    #[test]
    fn test_drag_keeps_plane_and_release_falls() {
        let config = BehaviorConfig::default();
        let camera = Camera::default();
        let mut state = AnimationState::new(&config);
        state.object.position = Point3::origin();
        let controller = DragController::default();

        assert!(controller.press(&mut state, &camera, &config, &PointerEvent::new(256.0, 256.0)));
        controller.motion(&mut state, &camera, &config, &PointerEvent::new(300.0, 200.0));
        assert_eq!(state.object.position.z, config.drag_plane_z);
        assert!(state.object.position.x > 0.0);
        assert!(state.object.position.y > 0.0);

        assert!(controller.release(&mut state, &config));
        assert_eq!(state.object.position.z, config.release_z);
        assert_eq!(state.object.state,
                   ObjectState::Falling { target_y: config.ground_y, into_receptacle: false });
        assert!(!controller.release(&mut state, &config));
    }
}
