//! Rust implementation of an articulated errand robot: a small tracked figure that picks up a
//! dropped object, carries it to a receptacle, walks back and periodically goes to recharge.
//!
//! The figure is a scene graph of 23 body parts (torso, neck, head, two eyes, two treads and
//! two arms ending in claws). Every frame the graph is rebuilt from the joint state and
//! walked depth first with a matrix stack, so each part is drawn with the product of all
//! transforms above it.
//!
//! # Features
//!
//! - Scene graph with validated first-child / next-sibling links and a matrix stack
//!   traversal that leaves the stack exactly as it found it.
//! - Behavior machine made of two sub-machines (the errand and the battery cycle), each with
//!   a single current phase. Joints ease towards targets, the robot turns in fixed steps and
//!   walks at fixed speed. Every phase transition is logged with `tracing`.
//! - Rigid grab: once the claw grips the object, the object keeps the offset it had to the
//!   claw at the moment of the grab until it is dropped.
//! - Stall guard: a phase that does not converge within a configurable number of frames is
//!   forced to complete, so the animation never freezes.
//! - Pointer picking and plane constrained dragging of the object through the camera.
//! - All numbers (positions, steps, rates, tolerances) live in [`config::BehaviorConfig`]
//!   and can be overridden from YAML.
//! - Optional Bevy window with an egui control panel (feature `visualization`).
//!
//! ## Example
//!
//! ```
//! use rs_errand_robot::camera::Camera;
//! use rs_errand_robot::config::BehaviorConfig;
//! use rs_errand_robot::render_traits::DrawLog;
//! use rs_errand_robot::simulation::Simulation;
//!
//! let mut simulation = Simulation::new(BehaviorConfig::default()).unwrap();
//! let camera = Camera::default();
//! let mut log = DrawLog::new();
//! for _ in 0..10 {
//!     simulation.frame(&camera, &mut log);
//! }
//! assert_eq!(log.frames, 10);
//! ```

pub mod animation_error;

pub mod transform;

#[path = "utils/utils.rs"]
pub mod utils;

pub mod palette;
pub mod render_traits;
pub mod parts;
pub mod scene_graph;
pub mod kinematics;

pub mod config;

#[cfg(feature = "allow_filesystem")]
pub mod config_from_file;

pub mod state;

#[path = "behavior/behavior.rs"]
pub mod behavior;

pub mod camera;
pub mod interaction;
pub mod meshes;
pub mod simulation;

#[path = "visualize/visualization.rs"]
#[cfg(feature = "visualization")]
pub mod visualization;

#[cfg(test)]
#[cfg(feature = "allow_filesystem")]
mod tests;
