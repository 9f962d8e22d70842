//! Per-frame behavior of the robot.
//!
//! Two sub-machines drive the figure: the errand (find the object, pick it up, drop it into
//! the receptacle, come back) and the battery cycle (walk to the charging station, charge,
//! come back). The errand only runs while the battery is normal. Every transition is
//! decided by polling numeric thresholds once per frame, there is no event queue.
//!
//! Within a frame the order is: falling object, errand, battery, attached object. The
//! attached object is moved last so that it matches the claw of the pose that is drawn.

#[path = "errand.rs"]
mod errand;
#[path = "battery.rs"]
mod battery;

use std::fmt::Debug;
use nalgebra::Point3;
use tracing::{debug, info, warn};

use crate::animation_error::AnimationError;
use crate::config::BehaviorConfig;
use crate::kinematics::claw_world_position;
use crate::scene_graph::SceneGraph;
use crate::state::{AnimationState, BatteryPhase, ObjectState};
use crate::transform::{heading, planar_distance};
use crate::utils::{aligned, approach};

/// The behavior state machine. Stateless, everything it changes lives in [`AnimationState`].
pub struct Behavior;

impl Behavior {
    /// Advance the animation by one frame.
    pub fn step(state: &mut AnimationState, config: &BehaviorConfig) {
        update_falling(state, config);
        if state.battery == BatteryPhase::Normal {
            errand::advance(state, config);
        }
        battery::advance(state, config);
        follow_claw(state);
    }
}

/// True if the head is within the angle tolerance of its target.
pub fn head_converged(state: &AnimationState, config: &BehaviorConfig) -> bool {
    aligned(state.joints.head_tilt, state.targets.head, config.angle_tolerance)
}

/// True if both shoulders are within the angle tolerance of their target.
pub fn shoulders_converged(state: &AnimationState, config: &BehaviorConfig) -> bool {
    state.joints.shoulders.iter()
        .all(|s| aligned(*s, state.targets.shoulder, config.angle_tolerance))
}

/// True if the (left) wrist extension is within the wrist tolerance of its target.
pub fn wrist_converged(state: &AnimationState, config: &BehaviorConfig) -> bool {
    aligned(state.joints.wrists[0], state.targets.wrist, config.wrist_tolerance)
}

/// True if the robot stands close enough to the object to start picking it up.
pub fn within_reach(state: &AnimationState, config: &BehaviorConfig) -> bool {
    planar_distance(&state.root.position, &state.object.position) <= config.pickup_distance
}

/// True if the carried object should be dropped.
pub fn above_receptacle(state: &AnimationState, config: &BehaviorConfig) -> bool {
    planar_distance(&state.root.position, &config.receptacle_position) < config.drop_distance
}

/// World position of the gripping point for the current pose, if the figure can be built.
pub fn claw_position(state: &AnimationState) -> Option<Point3<f64>> {
    match SceneGraph::figure(state) {
        Ok(graph) => claw_world_position(&graph, &state.root),
        Err(e) => {
            warn!("Cannot locate the claw: {}", e);
            None
        }
    }
}

fn update_falling(state: &mut AnimationState, config: &BehaviorConfig) {
    let ObjectState::Falling { target_y, into_receptacle } = state.object.state else {
        state.fall_frames = 0;
        return;
    };

    state.fall_frames = state.fall_frames.saturating_add(1);
    let forced = stalled(state.fall_frames, &state.object.state, config);

    let object = &mut state.object;
    object.position.y = approach(object.position.y, target_y, config.fall_rate);
    if (object.position.y - target_y).abs() < config.fall_tolerance || forced {
        state.fall_frames = 0;
        object.position.y = target_y;
        object.state = ObjectState::Resting;
        if into_receptacle {
            state.collection.deposit(object.position);
            info!(deposits = state.collection.len(), "Object landed in the receptacle");
        } else {
            info!(x = object.position.x, z = object.position.z, "Object landed on the ground");
        }
    }
}

fn follow_claw(state: &mut AnimationState) {
    let ObjectState::Attached { offset } = state.object.state else {
        return;
    };
    if let Some(claw) = claw_position(state) {
        state.object.position = claw + offset;
        debug!(x = claw.x, y = claw.y, z = claw.z, "claw");
    }
}

/// Stall guard: true once the phase has run more than the allowed frames. The caller
/// then snaps the pending values and moves on.
fn stalled(frames: u32, phase: &dyn Debug, config: &BehaviorConfig) -> bool {
    if frames <= config.max_phase_frames {
        return false;
    }
    let error = AnimationError::UnreachableTarget { phase: format!("{:?}", phase), frames };
    warn!("{}, forcing it to complete", error);
    true
}

/// Move along the heading of the yaw by `step`.
fn walk_along(position: &mut Point3<f64>, yaw: f64, step: f64) {
    *position += heading(yaw) * step;
}

/// Move straight towards `target` by `step`, never past it. Returns true once the remaining
/// distance is under `tolerance`.
fn walk_toward(position: &mut Point3<f64>, target: &Point3<f64>, step: f64, tolerance: f64) -> bool {
    let offset = target - *position;
    let distance = offset.norm();
    if distance > 0.0 {
        *position += offset * (step.min(distance) / distance);
    }
    (target - *position).norm() < tolerance
}

/// Puts `position` at `distance` from `target` on the ground plane, along the line it is on
/// now. Positions already closer stay where they are.
fn place_near(position: &mut Point3<f64>, target: &Point3<f64>, distance: f64) {
    let current = planar_distance(position, target);
    if current <= distance || current == 0.0 {
        return;
    }
    let ratio = distance / current;
    position.x = target.x + (position.x - target.x) * ratio;
    position.z = target.z + (position.z - target.z) * ratio;
}
