//! Supports reading the behavior configuration from YAML file (optional)

use std::path::Path;
use nalgebra::Point3;
use yaml_rust2::{Yaml, YamlLoader};

use crate::animation_error::AnimationError;
use crate::config::BehaviorConfig;

impl BehaviorConfig {
    /// Read the behavior configuration from YAML file. YAML file like this is supported:
    /// ```yaml
    /// # Faster demo: charge after every errand
    /// behavior:
    ///   spawn_position: [7.0, 4.0, 0.0]
    ///   walk_step: 0.04
    ///   cycles_before_battery_low: 1
    ///   max_charging_time: 120
    /// ```
    /// Every key is optional and overrides the default. The `behavior:` wrapper may be
    /// omitted. Integers are accepted where reals are expected. Unknown keys are rejected.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, AnimationError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parse the configuration from YAML text, see [`BehaviorConfig::from_yaml_file`].
    pub fn from_yaml_str(contents: &str) -> Result<Self, AnimationError> {
        let docs = YamlLoader::load_from_str(contents)
            .map_err(|e| AnimationError::ParseError(format!("{}", e)))?;

        let mut config = BehaviorConfig::default();
        let Some(doc) = docs.first() else {
            // Empty file, all defaults
            return Ok(config);
        };

        let section = match &doc["behavior"] {
            Yaml::BadValue => doc,
            inner => inner,
        };

        let hash = match section {
            Yaml::Hash(hash) => hash,
            Yaml::Null => return Ok(config),
            _ => return Err(AnimationError::ParseError(
                "expected a mapping of behavior parameters".to_string())),
        };

        for (key, value) in hash.iter() {
            let name = key.as_str().ok_or_else(|| AnimationError::ParseError(
                format!("parameter names must be strings (got {:?})", key)))?;

            if let Some(slot) = scalar_mut(&mut config, name) {
                *slot = as_real(name, value)?;
            } else if let Some(slot) = point_mut(&mut config, name) {
                *slot = as_point(name, value)?;
            } else if let Some(slot) = count_mut(&mut config, name) {
                *slot = as_count(name, value)?;
            } else {
                return Err(AnimationError::ParseError(format!("unknown parameter '{}'", name)));
            }
        }

        config.validate()?;
        Ok(config)
    }
}

fn as_real(name: &str, value: &Yaml) -> Result<f64, AnimationError> {
    match value {
        Yaml::Integer(i) => Ok(*i as f64),
        Yaml::Real(_) => value.as_f64().ok_or_else(|| AnimationError::ParseError(
            format!("'{}' is not a valid number", name))),
        _ => Err(AnimationError::ParseError(format!("'{}' must be a number (got {:?})", name, value))),
    }
}

fn as_point(name: &str, value: &Yaml) -> Result<Point3<f64>, AnimationError> {
    let items = value.as_vec().ok_or_else(|| AnimationError::ParseError(
        format!("'{}' must be a list [x, y, z]", name)))?;
    if items.len() != 3 {
        return Err(AnimationError::ParseError(format!(
            "'{}' must have 3 coordinates (got {})", name, items.len())));
    }
    Ok(Point3::new(
        as_real(name, &items[0])?,
        as_real(name, &items[1])?,
        as_real(name, &items[2])?,
    ))
}

fn as_count(name: &str, value: &Yaml) -> Result<u32, AnimationError> {
    match value {
        Yaml::Integer(i) if *i >= 0 && *i <= u32::MAX as i64 => Ok(*i as u32),
        _ => Err(AnimationError::ParseError(format!(
            "'{}' must be a non-negative integer (got {:?})", name, value))),
    }
}

fn scalar_mut<'a>(config: &'a mut BehaviorConfig, name: &str) -> Option<&'a mut f64> {
    let slot = match name {
        "ground_y" => &mut config.ground_y,
        "stack_base" => &mut config.stack_base,
        "stack_increment" => &mut config.stack_increment,
        "landed_tolerance" => &mut config.landed_tolerance,
        "fall_rate" => &mut config.fall_rate,
        "fall_tolerance" => &mut config.fall_tolerance,
        "face_yaw" => &mut config.face_yaw,
        "face_turn_step" => &mut config.face_turn_step,
        "face_turn_tolerance" => &mut config.face_turn_tolerance,
        "walk_step" => &mut config.walk_step,
        "pickup_distance" => &mut config.pickup_distance,
        "carry_step" => &mut config.carry_step,
        "drop_distance" => &mut config.drop_distance,
        "arm_rate" => &mut config.arm_rate,
        "angle_tolerance" => &mut config.angle_tolerance,
        "head_down" => &mut config.head_down,
        "head_up" => &mut config.head_up,
        "shoulder_down" => &mut config.shoulder_down,
        "shoulder_up" => &mut config.shoulder_up,
        "wrist_extended" => &mut config.wrist_extended,
        "wrist_retracted" => &mut config.wrist_retracted,
        "wrist_tolerance" => &mut config.wrist_tolerance,
        "return_wrist_rate" => &mut config.return_wrist_rate,
        "return_yaw" => &mut config.return_yaw,
        "return_turn_step" => &mut config.return_turn_step,
        "return_turn_tolerance" => &mut config.return_turn_tolerance,
        "return_walk_step" => &mut config.return_walk_step,
        "return_walk_tolerance" => &mut config.return_walk_tolerance,
        "front_rate" => &mut config.front_rate,
        "front_tolerance" => &mut config.front_tolerance,
        "station_yaw" => &mut config.station_yaw,
        "station_turn_step" => &mut config.station_turn_step,
        "station_turn_tolerance" => &mut config.station_turn_tolerance,
        "station_arrive_distance" => &mut config.station_arrive_distance,
        "station_front_step" => &mut config.station_front_step,
        "station_front_tolerance" => &mut config.station_front_tolerance,
        "charging_distance" => &mut config.charging_distance,
        "home_yaw" => &mut config.home_yaw,
        "home_turn_step" => &mut config.home_turn_step,
        "home_turn_tolerance" => &mut config.home_turn_tolerance,
        "home_walk_step" => &mut config.home_walk_step,
        "home_walk_tolerance" => &mut config.home_walk_tolerance,
        "home_front_step" => &mut config.home_front_step,
        "home_front_tolerance" => &mut config.home_front_tolerance,
        "pick_radius" => &mut config.pick_radius,
        "drag_plane_z" => &mut config.drag_plane_z,
        "release_z" => &mut config.release_z,
        _ => return None,
    };
    Some(slot)
}

fn point_mut<'a>(config: &'a mut BehaviorConfig, name: &str) -> Option<&'a mut Point3<f64>> {
    let slot = match name {
        "spawn_position" => &mut config.spawn_position,
        "receptacle_position" => &mut config.receptacle_position,
        "station_position" => &mut config.station_position,
        "home_position" => &mut config.home_position,
        "return_origin" => &mut config.return_origin,
        _ => return None,
    };
    Some(slot)
}

fn count_mut<'a>(config: &'a mut BehaviorConfig, name: &str) -> Option<&'a mut u32> {
    let slot = match name {
        "cycles_before_battery_low" => &mut config.cycles_before_battery_low,
        "max_charging_time" => &mut config.max_charging_time,
        "gauge_segments" => &mut config.gauge_segments,
        "max_phase_frames" => &mut config.max_phase_frames,
        _ => return None,
    };
    Some(slot)
}
