use tracing::{debug, info};

use crate::config::BehaviorConfig;
use crate::state::{
    AnimationState, BatteryPhase, ErrandPhase, JointTargets, Joints, ObjectState, PickUpStep,
    ReturnStep,
};
use crate::utils::{aligned, approach, step_toward};

use super::{
    above_receptacle, claw_position, head_converged, place_near, shoulders_converged, stalled,
    walk_along, walk_toward, within_reach, wrist_converged,
};

/// One frame of the errand sub-machine.
pub(super) fn advance(state: &mut AnimationState, config: &BehaviorConfig) {
    // The robot watches the object land before it turns away. The fall has its own guard.
    if matches!(state.errand, ErrandPhase::Return(_)) &&
        matches!(state.object.state, ObjectState::Falling { .. }) {
        return;
    }

    state.errand_frames = state.errand_frames.saturating_add(1);
    let forced = state.errand != ErrandPhase::Idle &&
        stalled(state.errand_frames, &state.errand, config);

    match state.errand {
        ErrandPhase::Idle => {
            if state.object_landed(config) {
                info!(x = state.object.position.x, z = state.object.position.z,
                    "Object is on the ground, turning to it");
                state.enter_errand(ErrandPhase::RotateToFace);
                rotate_to_face(state, config, false);
            }
        }
        ErrandPhase::RotateToFace => rotate_to_face(state, config, forced),
        ErrandPhase::WalkToObject => walk_to_object(state, config, forced),
        ErrandPhase::PickUp(step) => pick_up(state, config, step, forced),
        ErrandPhase::Carry => carry(state, config, forced),
        ErrandPhase::Return(step) => return_home(state, config, step, forced),
    }
}

fn rotate_to_face(state: &mut AnimationState, config: &BehaviorConfig, forced: bool) {
    let done = step_toward(&mut state.root.yaw, config.face_yaw,
                           config.face_turn_step, config.face_turn_tolerance);
    if done || forced {
        state.root.yaw = config.face_yaw;
        state.enter_errand(ErrandPhase::WalkToObject);
    }
}

fn walk_to_object(state: &mut AnimationState, config: &BehaviorConfig, forced: bool) {
    if forced {
        place_near(&mut state.root.position, &state.object.position, config.pickup_distance);
    }
    if within_reach(state, config) {
        info!(x = state.root.position.x, z = state.root.position.z, "Reached the object");
        state.enter_errand(ErrandPhase::PickUp(PickUpStep::LowerHead));
    } else {
        walk_along(&mut state.root.position, state.root.yaw, config.walk_step);
    }
}

fn pick_up(state: &mut AnimationState, config: &BehaviorConfig, step: PickUpStep, forced: bool) {
    let rate = config.arm_rate;
    let joints = &mut state.joints;
    let targets = state.targets;

    // The head keeps easing for the whole pickup, shoulders once the head is down
    joints.head_tilt = approach(joints.head_tilt, targets.head, rate);
    if step != PickUpStep::LowerHead {
        ease_shoulders(joints, targets.shoulder, rate);
    }
    if step == PickUpStep::ExtendWrist {
        for wrist in joints.wrists.iter_mut() {
            *wrist = approach(*wrist, targets.wrist, rate);
        }
    }
    if forced {
        snap_joints(joints, &targets, step);
    }

    match step {
        PickUpStep::LowerHead => {
            if head_converged(state, config) {
                state.enter_errand(ErrandPhase::PickUp(PickUpStep::LowerShoulders));
            }
        }
        PickUpStep::LowerShoulders => {
            if head_converged(state, config) && shoulders_converged(state, config) {
                state.enter_errand(ErrandPhase::PickUp(PickUpStep::ExtendWrist));
            }
        }
        PickUpStep::ExtendWrist => {
            if wrist_converged(state, config) {
                grab(state, config);
            }
        }
        PickUpStep::Lift => {
            if head_converged(state, config) && shoulders_converged(state, config) {
                info!("Arm and head lifted, carrying the object");
                state.enter_errand(ErrandPhase::Carry);
            }
        }
    }
}

fn ease_shoulders(joints: &mut Joints, target: f64, rate: f64) {
    for shoulder in joints.shoulders.iter_mut() {
        *shoulder = approach(*shoulder, target, rate);
    }
}

/// Snap the joints the pickup step is waiting for.
fn snap_joints(joints: &mut Joints, targets: &JointTargets, step: PickUpStep) {
    joints.head_tilt = targets.head;
    if step != PickUpStep::LowerHead {
        joints.shoulders = [targets.shoulder; 2];
    }
    if step == PickUpStep::ExtendWrist {
        joints.wrists = [targets.wrist; 2];
    }
}

/// Latch the object to the claw with the current offset and start lifting.
fn grab(state: &mut AnimationState, config: &BehaviorConfig) {
    let Some(claw) = claw_position(state) else {
        return;
    };
    let offset = state.object.position - claw;
    state.object.state = ObjectState::Attached { offset };
    state.targets.head = config.head_up;
    state.targets.shoulder = config.shoulder_up;
    info!(x = offset.x, y = offset.y, z = offset.z, "Grabbed the object");
    state.enter_errand(ErrandPhase::PickUp(PickUpStep::Lift));
}

fn carry(state: &mut AnimationState, config: &BehaviorConfig, forced: bool) {
    walk_along(&mut state.root.position, state.root.yaw, config.carry_step);
    if forced {
        place_near(&mut state.root.position, &config.receptacle_position, config.drop_distance);
    }
    if above_receptacle(state, config) || forced {
        drop_into_receptacle(state, config);
    }
}

fn drop_into_receptacle(state: &mut AnimationState, config: &BehaviorConfig) {
    let target_y = state.collection.next_height(config.stack_increment);
    state.object.state = ObjectState::Falling { target_y, into_receptacle: true };
    state.targets = JointTargets::upright(config);
    state.root.yaw = config.face_yaw;
    state.return_yaw = config.return_yaw;
    info!(target_y, deposits = state.collection.len(), "Dropped the object, heading back");
    state.enter_errand(ErrandPhase::Return(ReturnStep::ShrinkWrist));
}

fn return_home(state: &mut AnimationState, config: &BehaviorConfig, step: ReturnStep, forced: bool) {
    match step {
        ReturnStep::ShrinkWrist => {
            let target = state.targets.wrist;
            for wrist in state.joints.wrists.iter_mut() {
                *wrist = approach(*wrist, target, config.return_wrist_rate);
                if forced {
                    *wrist = target;
                }
            }
            if wrist_converged(state, config) {
                debug!("Wrist retracted");
                state.enter_errand(ErrandPhase::Return(ReturnStep::RotateToStored));
            }
        }
        ReturnStep::RotateToStored => {
            let done = step_toward(&mut state.root.yaw, state.return_yaw,
                                   config.return_turn_step, config.return_turn_tolerance);
            if done || forced {
                state.root.yaw = state.return_yaw;
                state.enter_errand(ErrandPhase::Return(ReturnStep::WalkToOrigin));
            }
        }
        ReturnStep::WalkToOrigin => {
            let arrived = walk_toward(&mut state.root.position, &config.return_origin,
                                      config.return_walk_step, config.return_walk_tolerance);
            if forced {
                state.root.position = config.return_origin;
            }
            if arrived || forced {
                debug!("Back at origin");
                state.enter_errand(ErrandPhase::Return(ReturnStep::FaceFront));
            }
        }
        ReturnStep::FaceFront => {
            state.root.yaw = approach(state.root.yaw, 0.0, config.front_rate);
            if state.root.yaw.abs() < config.front_tolerance || forced {
                state.root.yaw = 0.0;
                complete_errand(state, config);
            }
        }
    }
}

/// Reset the pickup state, respawn the object and count the cycle.
fn complete_errand(state: &mut AnimationState, config: &BehaviorConfig) {
    state.joints = Joints::rest(config);
    state.targets = JointTargets::reaching(config);
    state.object.position = config.spawn_position;
    state.object.state = ObjectState::Resting;
    state.completed_cycles += 1;
    state.total_cycles += 1;
    info!(cycle = state.total_cycles, "Errand complete");
    state.enter_errand(ErrandPhase::Idle);

    let limit = config.cycles_before_battery_low;
    if limit > 0 && state.completed_cycles >= limit {
        info!(cycles = state.completed_cycles, "Battery low, going to the charging station");
        state.completed_cycles = 0;
        state.enter_battery(BatteryPhase::RotateToStation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn landed_state(config: &BehaviorConfig) -> AnimationState {
        let mut state = AnimationState::new(config);
        state.object.position = Point3::new(7.0, config.ground_y, 1.3);
        state
    }

    #[test]
    fn test_idle_waits_for_object_in_the_air() {
        let config = BehaviorConfig::default();
        let mut state = AnimationState::new(&config);
        for _ in 0..10 {
            advance(&mut state, &config);
        }
        assert_eq!(state.errand, ErrandPhase::Idle);
        assert_eq!(state.root.yaw, 0.0);
    }

    #[test]
    fn test_landed_object_starts_rotation_same_frame() {
        let config = BehaviorConfig::default();
        let mut state = landed_state(&config);
        advance(&mut state, &config);
        assert_eq!(state.errand, ErrandPhase::RotateToFace);
        assert_eq!(state.root.yaw, config.face_turn_step);
    }

    #[test]
    fn test_walk_stops_within_pickup_distance() {
        let config = BehaviorConfig::default();
        let mut state = landed_state(&config);
        state.root.yaw = 90.0;
        state.errand = ErrandPhase::WalkToObject;
        state.root.position = Point3::new(4.0, 0.0, 0.0);
        advance(&mut state, &config);
        assert_eq!(state.errand, ErrandPhase::WalkToObject);
        assert!((state.root.position.x - 4.02).abs() < 1e-12);

        state.root.position = Point3::new(4.3, 0.0, 0.0);
        advance(&mut state, &config);
        assert_eq!(state.errand, ErrandPhase::PickUp(PickUpStep::LowerHead));
        assert_eq!(state.root.position.x, 4.3);
    }

    #[test]
    fn test_shoulders_wait_for_head() {
        let config = BehaviorConfig::default();
        let mut state = landed_state(&config);
        state.errand = ErrandPhase::PickUp(PickUpStep::LowerHead);
        advance(&mut state, &config);
        assert!((state.joints.head_tilt - 0.4).abs() < 1e-12);
        assert_eq!(state.joints.shoulders, [config.shoulder_up; 2]);
        assert_eq!(state.joints.wrists, [config.wrist_retracted; 2]);
    }

    #[test]
    fn test_forced_pickup_step_snaps_and_advances() {
        let config = BehaviorConfig { max_phase_frames: 5, ..BehaviorConfig::default() };
        let mut state = landed_state(&config);
        state.errand = ErrandPhase::PickUp(PickUpStep::LowerHead);
        state.errand_frames = 5;
        advance(&mut state, &config);
        assert_eq!(state.joints.head_tilt, config.head_down);
        assert_eq!(state.errand, ErrandPhase::PickUp(PickUpStep::LowerShoulders));
        assert_eq!(state.errand_frames, 0);
    }

    #[test]
    fn test_drop_targets_stack_height() {
        let config = BehaviorConfig::default();
        let mut state = landed_state(&config);
        state.collection.deposit(Point3::new(6.0, -4.7, 1.3));
        state.errand = ErrandPhase::Carry;
        state.root.yaw = 90.0;
        state.root.position = Point3::new(4.3, 0.0, 0.0);
        state.object.state = ObjectState::Attached { offset: nalgebra::Vector3::zeros() };
        advance(&mut state, &config);
        assert_eq!(state.errand, ErrandPhase::Return(ReturnStep::ShrinkWrist));
        match state.object.state {
            ObjectState::Falling { target_y, into_receptacle } => {
                assert!((target_y - (-4.1)).abs() < 1e-12);
                assert!(into_receptacle);
            }
            other => panic!("Expected a falling object, got {:?}", other),
        }
        assert_eq!(state.return_yaw, config.return_yaw);
        assert_eq!(state.targets, JointTargets::upright(&config));
    }

    #[test]
    fn test_return_waits_for_falling_object() {
        let config = BehaviorConfig::default();
        let mut state = landed_state(&config);
        state.errand = ErrandPhase::Return(ReturnStep::ShrinkWrist);
        state.targets = JointTargets::upright(&config);
        state.joints.wrists = [config.wrist_extended; 2];
        state.object.state = ObjectState::Falling { target_y: -4.7, into_receptacle: true };
        state.errand_frames = 0;
        for _ in 0..100 {
            advance(&mut state, &config);
        }
        assert_eq!(state.joints.wrists, [config.wrist_extended; 2]);
        // Waiting does not count towards the stall guard
        assert_eq!(state.errand_frames, 0);
    }

    #[test]
    fn test_third_errand_makes_battery_low() {
        let config = BehaviorConfig::default();
        let mut state = landed_state(&config);
        state.completed_cycles = 2;
        state.errand = ErrandPhase::Return(ReturnStep::FaceFront);
        state.root.yaw = -1.0;
        advance(&mut state, &config);
        assert_eq!(state.errand, ErrandPhase::Idle);
        assert_eq!(state.battery, BatteryPhase::RotateToStation);
        assert_eq!(state.completed_cycles, 0);
        assert_eq!(state.total_cycles, 1);
        assert_eq!(state.object.position, config.spawn_position);
        assert_eq!(state.joints, Joints::rest(&config));
    }
}
