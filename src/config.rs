//! Defines the behavior configuration: every step, rate, target and threshold the
//! behavior machine and the pointer handling use.
//!
//! The defaults reproduce the reference choreography. Several near-duplicate phases use
//! slightly different numbers (turn steps of 1.5 and 1.0 degrees, walk tolerances of 0.2 and
//! 0.05), these are kept as separate parameters rather than unified.

use nalgebra::Point3;
use crate::animation_error::AnimationError;

#[derive(Debug, Clone, PartialEq)]
pub struct BehaviorConfig {
    // Layout of the world
    /// Where the object appears at start and after each completed errand.
    pub spawn_position: Point3<f64>,
    pub receptacle_position: Point3<f64>,
    pub station_position: Point3<f64>,
    /// Start position of the robot, also the end of the recharge cycle.
    pub home_position: Point3<f64>,
    /// Where the robot walks back to after dropping the object.
    pub return_origin: Point3<f64>,
    pub ground_y: f64,
    /// Resting height of the first object in the receptacle.
    pub stack_base: f64,
    pub stack_increment: f64,

    // Object falling
    pub landed_tolerance: f64,
    pub fall_rate: f64,
    pub fall_tolerance: f64,

    // Approach and carry
    /// Yaw to face the object with.
    pub face_yaw: f64,
    pub face_turn_step: f64,
    pub face_turn_tolerance: f64,
    pub walk_step: f64,
    /// Planar distance to the object at which walking stops and picking begins.
    pub pickup_distance: f64,
    pub carry_step: f64,
    /// Planar distance to the receptacle under which the object is dropped.
    pub drop_distance: f64,

    // Arm and head
    pub arm_rate: f64,
    pub angle_tolerance: f64,
    pub head_down: f64,
    pub head_up: f64,
    pub shoulder_down: f64,
    pub shoulder_up: f64,
    pub wrist_extended: f64,
    pub wrist_retracted: f64,
    pub wrist_tolerance: f64,

    // Return after drop
    pub return_wrist_rate: f64,
    pub return_yaw: f64,
    pub return_turn_step: f64,
    pub return_turn_tolerance: f64,
    pub return_walk_step: f64,
    pub return_walk_tolerance: f64,
    pub front_rate: f64,
    pub front_tolerance: f64,

    // Battery and charging
    pub cycles_before_battery_low: u32,
    pub station_yaw: f64,
    pub station_turn_step: f64,
    pub station_turn_tolerance: f64,
    pub station_arrive_distance: f64,
    pub station_front_step: f64,
    pub station_front_tolerance: f64,
    pub charging_distance: f64,
    /// Frames of charging needed for a full battery.
    pub max_charging_time: u32,
    pub gauge_segments: u32,
    pub home_yaw: f64,
    pub home_turn_step: f64,
    pub home_turn_tolerance: f64,
    pub home_walk_step: f64,
    pub home_walk_tolerance: f64,
    pub home_front_step: f64,
    pub home_front_tolerance: f64,

    // Pointer interaction
    pub pick_radius: f64,
    /// Forward coordinate the object is kept at while dragged.
    pub drag_plane_z: f64,
    /// Forward coordinate the object is snapped to when released.
    pub release_z: f64,

    /// Frames a phase may take before it is forced to complete.
    pub max_phase_frames: u32,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        BehaviorConfig {
            spawn_position: Point3::new(7.0, 4.0, 0.0),
            receptacle_position: Point3::new(6.2, -5.6, 0.0),
            station_position: Point3::new(-6.3, -5.4, 0.0),
            home_position: Point3::new(-3.0, 0.0, 0.0),
            return_origin: Point3::new(-3.5, 0.0, 0.0),
            ground_y: -5.0,
            stack_base: -4.7,
            stack_increment: 0.6,

            landed_tolerance: 0.05,
            fall_rate: 0.1,
            fall_tolerance: 0.01,

            face_yaw: 90.0,
            face_turn_step: 1.5,
            face_turn_tolerance: 1.0,
            walk_step: 0.02,
            pickup_distance: 3.0,
            carry_step: 0.01,
            drop_distance: 4.19,

            arm_rate: 0.02,
            angle_tolerance: 1.0,
            head_down: 20.0,
            head_up: 0.0,
            shoulder_down: -44.0,
            shoulder_up: -90.0,
            wrist_extended: -1.5,
            wrist_retracted: -0.5,
            wrist_tolerance: 0.05,

            return_wrist_rate: 0.05,
            return_yaw: -90.0,
            return_turn_step: 1.5,
            return_turn_tolerance: 1.0,
            return_walk_step: 0.02,
            return_walk_tolerance: 0.2,
            front_rate: 0.02,
            front_tolerance: 1.5,

            cycles_before_battery_low: 3,
            station_yaw: -90.0,
            station_turn_step: 1.5,
            station_turn_tolerance: 1.0,
            station_arrive_distance: 0.15,
            station_front_step: 1.0,
            station_front_tolerance: 0.01,
            charging_distance: 0.8,
            max_charging_time: 360,
            gauge_segments: 6,
            home_yaw: 90.0,
            home_turn_step: 1.0,
            home_turn_tolerance: 1.0,
            home_walk_step: 0.02,
            home_walk_tolerance: 0.05,
            home_front_step: 1.0,
            home_front_tolerance: 1.0,

            pick_radius: 1.0,
            drag_plane_z: 0.0,
            release_z: 1.3,

            max_phase_frames: 10_000,
        }
    }
}

impl BehaviorConfig {
    /// All real valued parameters with their names, in declaration order.
    pub fn scalars(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("ground_y", self.ground_y),
            ("stack_base", self.stack_base),
            ("stack_increment", self.stack_increment),
            ("landed_tolerance", self.landed_tolerance),
            ("fall_rate", self.fall_rate),
            ("fall_tolerance", self.fall_tolerance),
            ("face_yaw", self.face_yaw),
            ("face_turn_step", self.face_turn_step),
            ("face_turn_tolerance", self.face_turn_tolerance),
            ("walk_step", self.walk_step),
            ("pickup_distance", self.pickup_distance),
            ("carry_step", self.carry_step),
            ("drop_distance", self.drop_distance),
            ("arm_rate", self.arm_rate),
            ("angle_tolerance", self.angle_tolerance),
            ("head_down", self.head_down),
            ("head_up", self.head_up),
            ("shoulder_down", self.shoulder_down),
            ("shoulder_up", self.shoulder_up),
            ("wrist_extended", self.wrist_extended),
            ("wrist_retracted", self.wrist_retracted),
            ("wrist_tolerance", self.wrist_tolerance),
            ("return_wrist_rate", self.return_wrist_rate),
            ("return_yaw", self.return_yaw),
            ("return_turn_step", self.return_turn_step),
            ("return_turn_tolerance", self.return_turn_tolerance),
            ("return_walk_step", self.return_walk_step),
            ("return_walk_tolerance", self.return_walk_tolerance),
            ("front_rate", self.front_rate),
            ("front_tolerance", self.front_tolerance),
            ("station_yaw", self.station_yaw),
            ("station_turn_step", self.station_turn_step),
            ("station_turn_tolerance", self.station_turn_tolerance),
            ("station_arrive_distance", self.station_arrive_distance),
            ("station_front_step", self.station_front_step),
            ("station_front_tolerance", self.station_front_tolerance),
            ("charging_distance", self.charging_distance),
            ("home_yaw", self.home_yaw),
            ("home_turn_step", self.home_turn_step),
            ("home_turn_tolerance", self.home_turn_tolerance),
            ("home_walk_step", self.home_walk_step),
            ("home_walk_tolerance", self.home_walk_tolerance),
            ("home_front_step", self.home_front_step),
            ("home_front_tolerance", self.home_front_tolerance),
            ("pick_radius", self.pick_radius),
            ("drag_plane_z", self.drag_plane_z),
            ("release_z", self.release_z),
        ]
    }

    /// Point valued parameters with their names.
    pub fn points(&self) -> Vec<(&'static str, Point3<f64>)> {
        vec![
            ("spawn_position", self.spawn_position),
            ("receptacle_position", self.receptacle_position),
            ("station_position", self.station_position),
            ("home_position", self.home_position),
            ("return_origin", self.return_origin),
        ]
    }

    /// Integer valued parameters with their names.
    pub fn counts(&self) -> Vec<(&'static str, u32)> {
        vec![
            ("cycles_before_battery_low", self.cycles_before_battery_low),
            ("max_charging_time", self.max_charging_time),
            ("gauge_segments", self.gauge_segments),
            ("max_phase_frames", self.max_phase_frames),
        ]
    }

    /// Checks that all values are finite, that steps, tolerances and distances are not
    /// negative and that easing rates are in (0, 1].
    pub fn validate(&self) -> Result<(), AnimationError> {
        const NON_NEGATIVE: [&str; 6] = ["_step", "_rate", "_tolerance", "_distance", "_increment", "_radius"];

        for (name, value) in self.scalars() {
            if !value.is_finite() {
                return Err(AnimationError::InvalidValue {
                    field: name.to_string(),
                    reason: format!("must be finite (got {})", value),
                });
            }
            if NON_NEGATIVE.iter().any(|suffix| name.ends_with(suffix)) && value < 0.0 {
                return Err(AnimationError::InvalidValue {
                    field: name.to_string(),
                    reason: format!("must not be negative (got {})", value),
                });
            }
            // Zero never converges, above 1 overshoots and above 2 diverges
            if name.ends_with("_rate") && !(value > 0.0 && value <= 1.0) {
                return Err(AnimationError::InvalidValue {
                    field: name.to_string(),
                    reason: format!("must be in (0, 1] (got {})", value),
                });
            }
        }
        for (name, p) in self.points() {
            if !p.coords.iter().all(|c| c.is_finite()) {
                return Err(AnimationError::InvalidValue {
                    field: name.to_string(),
                    reason: "all coordinates must be finite".to_string(),
                });
            }
        }
        for (name, value) in self.counts() {
            if value == 0 && name != "cycles_before_battery_low" {
                return Err(AnimationError::InvalidValue {
                    field: name.to_string(),
                    reason: "must be positive".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Convert to string yaml representation (quick viewing, etc).
    pub fn to_yaml(&self) -> String {
        let mut yaml = String::from("behavior:\n");
        for (name, p) in self.points() {
            yaml.push_str(&format!("  {}: [{}, {}, {}]\n", name, p.x, p.y, p.z));
        }
        for (name, value) in self.scalars() {
            yaml.push_str(&format!("  {}: {}\n", name, value));
        }
        for (name, value) in self.counts() {
            yaml.push_str(&format!("  {}: {}\n", name, value));
        }
        yaml
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(BehaviorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_non_finite_is_rejected() {
        let config = BehaviorConfig { fall_rate: f64::NAN, ..BehaviorConfig::default() };
        match config.validate() {
            Err(AnimationError::InvalidValue { field, .. }) => assert_eq!(field, "fall_rate"),
            other => panic!("Expected InvalidValue, got {:?}", other),
        }
        let config = BehaviorConfig {
            home_position: Point3::new(0.0, f64::INFINITY, 0.0),
            ..BehaviorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rates_must_be_in_unit_interval() {
        for rate in [0.0, 1.5, 2.5] {
            let config = BehaviorConfig { fall_rate: rate, ..BehaviorConfig::default() };
            match config.validate() {
                Err(AnimationError::InvalidValue { field, .. }) => assert_eq!(field, "fall_rate"),
                other => panic!("Expected InvalidValue for rate {}, got {:?}", rate, other),
            }
        }
        let config = BehaviorConfig { arm_rate: 0.0, ..BehaviorConfig::default() };
        assert!(config.validate().is_err());
        let config = BehaviorConfig { front_rate: 1.0, return_wrist_rate: 1.0, ..BehaviorConfig::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_cycles_is_allowed() {
        let config = BehaviorConfig { cycles_before_battery_low: 0, ..BehaviorConfig::default() };
        assert!(config.validate().is_ok());
        let config = BehaviorConfig { gauge_segments: 0, ..BehaviorConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_every_scalar_is_listed_once() {
        let config = BehaviorConfig::default();
        let mut names: Vec<_> = config.scalars().into_iter().map(|(n, _)| n).collect();
        let count = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), count);
        assert_eq!(count, 47);
    }
}
