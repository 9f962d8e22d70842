use tracing::{debug, info};

use crate::config::BehaviorConfig;
use crate::state::{AnimationState, BatteryPhase};
use crate::transform::planar_distance;
use crate::utils::step_toward;

use super::{place_near, stalled, walk_along, walk_toward};

/// One frame of the recharge sub-machine. Does nothing while the battery is normal.
pub(super) fn advance(state: &mut AnimationState, config: &BehaviorConfig) {
    if state.battery == BatteryPhase::Normal {
        return;
    }
    state.battery_frames = state.battery_frames.saturating_add(1);
    let forced = stalled(state.battery_frames, &state.battery, config);

    match state.battery {
        BatteryPhase::Normal => {}
        BatteryPhase::RotateToStation => {
            if turn(state, config.station_yaw, config.station_turn_step,
                    config.station_turn_tolerance, forced) {
                state.enter_battery(BatteryPhase::WalkToStation);
            }
        }
        BatteryPhase::WalkToStation => {
            let station = config.station_position;
            if forced {
                place_near(&mut state.root.position, &station, config.station_arrive_distance);
            }
            if planar_distance(&state.root.position, &station) <= config.station_arrive_distance {
                info!(x = state.root.position.x, z = state.root.position.z,
                    "Arrived at the charging station");
                state.enter_battery(BatteryPhase::FaceFront);
            } else {
                walk_along(&mut state.root.position, state.root.yaw, config.walk_step);
            }
        }
        BatteryPhase::FaceFront => {
            if turn(state, 0.0, config.station_front_step, config.station_front_tolerance, forced) {
                state.charging_timer = 0;
                state.enter_battery(BatteryPhase::Charging);
            }
        }
        BatteryPhase::Charging => charge(state, config, forced),
        BatteryPhase::RotateHome => {
            if turn(state, config.home_yaw, config.home_turn_step,
                    config.home_turn_tolerance, forced) {
                state.enter_battery(BatteryPhase::WalkHome);
            }
        }
        BatteryPhase::WalkHome => {
            let home = config.home_position;
            let arrived = walk_toward(&mut state.root.position, &home,
                                      config.home_walk_step, config.home_walk_tolerance);
            if forced {
                state.root.position = home;
            }
            if arrived || forced {
                debug!("Back home after charging");
                state.enter_battery(BatteryPhase::FaceFrontHome);
            }
        }
        BatteryPhase::FaceFrontHome => {
            if turn(state, 0.0, config.home_front_step, config.home_front_tolerance, forced) {
                info!(charges = state.charges, "Recharge cycle complete");
                state.enter_battery(BatteryPhase::Normal);
            }
        }
    }
}

/// Fixed step turn of the whole figure, snapping the yaw when done or forced.
fn turn(state: &mut AnimationState, target: f64, step: f64, tolerance: f64, forced: bool) -> bool {
    let done = step_toward(&mut state.root.yaw, target, step, tolerance);
    if forced {
        state.root.yaw = target;
    }
    done || forced
}

fn charge(state: &mut AnimationState, config: &BehaviorConfig, forced: bool) {
    let docked = planar_distance(&state.root.position, &config.station_position) < config.charging_distance;
    if forced {
        state.charging_timer = config.max_charging_time;
    } else if docked {
        state.charging_timer = (state.charging_timer + 1).min(config.max_charging_time);
    } else {
        state.charging_timer = 0;
    }

    if state.charging_timer >= config.max_charging_time {
        state.charges += 1;
        state.charging_timer = 0;
        state.collection.clear(config.stack_base);
        info!(charges = state.charges, "Charging complete, receptacle emptied");
        state.enter_battery(BatteryPhase::RotateHome);
    }
}
