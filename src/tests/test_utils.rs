use nalgebra::Point3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::behavior::Behavior;
use crate::config::BehaviorConfig;
use crate::state::{AnimationState, Joints, ObjectState};

pub(crate) const SMALL: f64 = 1e-9;

pub(crate) fn are_points_approx_equal(a: &Point3<f64>, b: &Point3<f64>, tolerance: f64) -> bool {
    (a - b).norm() <= tolerance
}

/// Idle robot at home with the object already lying on the ground at `x`.
pub(crate) fn landed_at(config: &BehaviorConfig, x: f64) -> AnimationState {
    let mut state = AnimationState::new(config);
    state.object.position = Point3::new(x, config.ground_y, 0.0);
    state.object.state = ObjectState::Resting;
    state
}

/// Steps the behavior until `done` holds, at most `max_frames` times. Returns the number
/// of frames stepped, or None if the condition was never met.
pub(crate) fn run_until<F>(state: &mut AnimationState, config: &BehaviorConfig, max_frames: u32,
                           mut done: F) -> Option<u32>
where
    F: FnMut(&AnimationState) -> bool,
{
    for frame in 1..=max_frames {
        Behavior::step(state, config);
        if done(state) {
            return Some(frame);
        }
    }
    None
}

pub(crate) fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Joint values anywhere between the rest and the reaching pose, left and right independent.
pub(crate) fn random_joints(rng: &mut StdRng, config: &BehaviorConfig) -> Joints {
    let shoulder = |rng: &mut StdRng| rng.gen_range(config.shoulder_up..=config.shoulder_down);
    let wrist = |rng: &mut StdRng| rng.gen_range(config.wrist_extended..=config.wrist_retracted);
    Joints {
        head_tilt: rng.gen_range(config.head_up..=config.head_down),
        shoulders: [shoulder(rng), shoulder(rng)],
        wrists: [wrist(rng), wrist(rng)],
    }
}

/// Random state: joints as [`random_joints`], the root anywhere in the scene, any yaw.
pub(crate) fn random_state(rng: &mut StdRng, config: &BehaviorConfig) -> AnimationState {
    let mut state = AnimationState::new(config);
    state.joints = random_joints(rng, config);
    state.root.position = Point3::new(rng.gen_range(-8.0..8.0), 0.0, rng.gen_range(-2.0..2.0));
    state.root.yaw = rng.gen_range(-180.0..180.0);
    state
}
