//! Complete animation state of the robot and the objects it handles.
//!
//! The state is a plain value owned by the caller. The behavior machine mutates it once per
//! frame, the scene graph is rebuilt from it, and pointer handling writes the object position.
//! Each independent sub-machine (errand, battery, carried object) holds exactly one current
//! phase, so combinations like "holding while falling" cannot be expressed.

use nalgebra::{Point3, Vector3};
use crate::config::BehaviorConfig;
use crate::palette::Palette;

/// Current values of the articulated degrees of freedom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Joints {
    /// Head pitch in degrees, positive tilts the face down.
    pub head_tilt: f64,
    /// Shoulder pitch in degrees, left and right. -90 holds the arm horizontally forward.
    pub shoulders: [f64; 2],
    /// Wrist extension (vertical offset of the wrist in the arm frame), left and right.
    pub wrists: [f64; 2],
}

impl Joints {
    pub fn rest(config: &BehaviorConfig) -> Self {
        Joints {
            head_tilt: config.head_up,
            shoulders: [config.shoulder_up; 2],
            wrists: [config.wrist_retracted; 2],
        }
    }
}

/// Values the joints are currently eased towards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointTargets {
    pub head: f64,
    pub shoulder: f64,
    pub wrist: f64,
}

impl JointTargets {
    /// Targets for reaching down to the object.
    pub fn reaching(config: &BehaviorConfig) -> Self {
        JointTargets {
            head: config.head_down,
            shoulder: config.shoulder_down,
            wrist: config.wrist_extended,
        }
    }

    /// Upright targets used after the grab and after the drop.
    pub fn upright(config: &BehaviorConfig) -> Self {
        JointTargets {
            head: config.head_up,
            shoulder: config.shoulder_up,
            wrist: config.wrist_retracted,
        }
    }
}

/// Placement of the whole figure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootPose {
    pub position: Point3<f64>,
    /// Rotation around the vertical axis in degrees. 0 faces the viewer, 90 faces +x.
    pub yaw: f64,
}

/// What is currently happening to the trash object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObjectState {
    /// Lies still, either at the spawn point or where it landed.
    Resting,
    /// Follows the pointer at the depth captured when it was picked.
    Dragged { depth: f64 },
    /// Eases down to `target_y`. Receptacle drops are deposited on landing.
    Falling { target_y: f64, into_receptacle: bool },
    /// Rigidly attached to the claw with the offset captured at grab time.
    Attached { offset: Vector3<f64> },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarriedObject {
    pub position: Point3<f64>,
    pub state: ObjectState,
}

/// Previously deposited objects, stacked in the receptacle.
#[derive(Debug, Clone, PartialEq)]
pub struct TrashCollection {
    pub deposits: Vec<Point3<f64>>,
    /// Resting height of the first deposit.
    pub base_height: f64,
}

impl TrashCollection {
    pub fn new(base_height: f64) -> Self {
        TrashCollection { deposits: Vec::new(), base_height }
    }

    /// Height the next deposit will rest at.
    pub fn next_height(&self, increment: f64) -> f64 {
        self.base_height + self.deposits.len() as f64 * increment
    }

    pub fn deposit(&mut self, position: Point3<f64>) {
        self.deposits.push(position);
    }

    pub fn len(&self) -> usize {
        self.deposits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deposits.is_empty()
    }

    pub fn clear(&mut self, base_height: f64) {
        self.deposits.clear();
        self.base_height = base_height;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PickUpStep {
    LowerHead,
    LowerShoulders,
    ExtendWrist,
    Lift,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnStep {
    ShrinkWrist,
    RotateToStored,
    WalkToOrigin,
    FaceFront,
}

/// The pickup cycle: find the object, take it to the receptacle, come back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrandPhase {
    Idle,
    RotateToFace,
    WalkToObject,
    PickUp(PickUpStep),
    Carry,
    Return(ReturnStep),
}

/// The recharge cycle, entered after a number of completed errands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatteryPhase {
    Normal,
    RotateToStation,
    WalkToStation,
    FaceFront,
    Charging,
    RotateHome,
    WalkHome,
    FaceFrontHome,
}

impl BatteryPhase {
    /// Phases during which the robot shows the depleted palette.
    pub fn is_depleted(self) -> bool {
        matches!(self,
            BatteryPhase::RotateToStation | BatteryPhase::WalkToStation |
            BatteryPhase::FaceFront | BatteryPhase::Charging)
    }
}

/// Boolean view of the state using the classic flag vocabulary. Derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PhaseFlags {
    pub is_dragging: bool,
    pub is_falling: bool,
    pub is_moving_to_trash: bool,
    pub is_picking_up: bool,
    pub is_grabbing_trash: bool,
    pub is_holding_trash: bool,
    pub is_dropping_in_trash_can: bool,
    pub is_returning: bool,
    pub is_battery_low: bool,
    pub is_charging: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationState {
    pub joints: Joints,
    pub targets: JointTargets,
    pub root: RootPose,
    pub object: CarriedObject,
    pub collection: TrashCollection,
    pub errand: ErrandPhase,
    pub battery: BatteryPhase,
    /// Yaw to turn to after the drop, stored when dropping.
    pub return_yaw: f64,
    /// Errands completed since the last charge.
    pub completed_cycles: u32,
    /// Errands completed overall.
    pub total_cycles: u32,
    pub charges: u32,
    pub charging_timer: u32,
    /// Frames spent in the current errand phase (stall guard).
    pub errand_frames: u32,
    /// Frames spent in the current battery phase (stall guard).
    pub battery_frames: u32,
    /// Frames the object has been falling (stall guard).
    pub fall_frames: u32,
}

impl AnimationState {
    /// Idle robot at home, object at the spawn point.
    pub fn new(config: &BehaviorConfig) -> Self {
        AnimationState {
            joints: Joints::rest(config),
            targets: JointTargets::reaching(config),
            root: RootPose { position: config.home_position, yaw: 0.0 },
            object: CarriedObject { position: config.spawn_position, state: ObjectState::Resting },
            collection: TrashCollection::new(config.stack_base),
            errand: ErrandPhase::Idle,
            battery: BatteryPhase::Normal,
            return_yaw: config.return_yaw,
            completed_cycles: 0,
            total_cycles: 0,
            charges: 0,
            charging_timer: 0,
            errand_frames: 0,
            battery_frames: 0,
            fall_frames: 0,
        }
    }

    /// True if the object rests on the ground within the landed tolerance.
    pub fn object_landed(&self, config: &BehaviorConfig) -> bool {
        self.object.state == ObjectState::Resting &&
            self.object.position.y <= config.ground_y + config.landed_tolerance
    }

    pub fn is_attached(&self) -> bool {
        matches!(self.object.state, ObjectState::Attached { .. })
    }

    pub fn palette(&self) -> Palette {
        if self.battery.is_depleted() {
            Palette::depleted()
        } else {
            Palette::default()
        }
    }

    /// Number of charge gauge bars to show, 0 when not charging or fully charged.
    pub fn gauge_bars(&self, config: &BehaviorConfig) -> u32 {
        if self.battery != BatteryPhase::Charging || self.charging_timer >= config.max_charging_time {
            return 0;
        }
        // ceil(timer / max * segments) in integers, wide enough for any u32 inputs
        let bars = (u64::from(self.charging_timer) * u64::from(config.gauge_segments))
            .div_ceil(u64::from(config.max_charging_time));
        u32::try_from(bars).unwrap_or(config.gauge_segments)
    }

    pub fn flags(&self) -> PhaseFlags {
        let picking_up = matches!(self.errand, ErrandPhase::PickUp(_));
        PhaseFlags {
            is_dragging: matches!(self.object.state, ObjectState::Dragged { .. }),
            is_falling: matches!(self.object.state, ObjectState::Falling { .. }),
            is_moving_to_trash: self.errand == ErrandPhase::WalkToObject,
            is_picking_up: picking_up,
            is_grabbing_trash: picking_up && self.is_attached(),
            is_holding_trash: self.errand == ErrandPhase::Carry,
            is_dropping_in_trash_can:
                matches!(self.object.state, ObjectState::Falling { into_receptacle: true, .. }),
            is_returning: matches!(self.errand, ErrandPhase::Return(_)),
            is_battery_low: self.battery != BatteryPhase::Normal,
            is_charging: self.battery == BatteryPhase::Charging,
        }
    }

    /// Put the errand sub-machine into a new phase, restarting its stall counter.
    pub(crate) fn enter_errand(&mut self, phase: ErrandPhase) {
        tracing::debug!(from = ?self.errand, to = ?phase, "errand phase");
        self.errand = phase;
        self.errand_frames = 0;
    }

    /// Put the battery sub-machine into a new phase, restarting its stall counter.
    pub(crate) fn enter_battery(&mut self, phase: BatteryPhase) {
        tracing::debug!(from = ?self.battery, to = ?phase, "battery phase");
        self.battery = phase;
        self.battery_frames = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_idle_at_spawn() {
        let config = BehaviorConfig::default();
        let state = AnimationState::new(&config);
        assert_eq!(state.errand, ErrandPhase::Idle);
        assert_eq!(state.battery, BatteryPhase::Normal);
        assert_eq!(state.object.position, Point3::new(7.0, 4.0, 0.0));
        assert_eq!(state.flags(), PhaseFlags::default());
        assert!(!state.object_landed(&config));
    }

    #[test]
    fn test_stack_height_grows_per_deposit() {
        let mut collection = TrashCollection::new(-4.7);
        assert_eq!(collection.next_height(0.6), -4.7);
        collection.deposit(Point3::new(6.0, -4.7, 0.0));
        collection.deposit(Point3::new(6.0, -4.1, 0.0));
        assert!((collection.next_height(0.6) - (-3.5)).abs() < 1e-12);
        collection.clear(-4.7);
        assert!(collection.is_empty());
        assert_eq!(collection.next_height(0.6), -4.7);
    }

    #[test]
    fn test_gauge_bars_round_up() {
        let config = BehaviorConfig::default();
        let mut state = AnimationState::new(&config);
        state.battery = BatteryPhase::Charging;
        state.charging_timer = 1;
        assert_eq!(state.gauge_bars(&config), 1);
        state.charging_timer = 60;
        assert_eq!(state.gauge_bars(&config), 1);
        state.charging_timer = 61;
        assert_eq!(state.gauge_bars(&config), 2);
        state.charging_timer = 359;
        assert_eq!(state.gauge_bars(&config), 6);
        state.charging_timer = 360;
        assert_eq!(state.gauge_bars(&config), 0);
    }

    #[test]
    fn test_gauge_bars_with_huge_segment_count() {
        let config = BehaviorConfig { gauge_segments: 1_000_000_000, ..BehaviorConfig::default() };
        assert!(config.validate().is_ok());
        let mut state = AnimationState::new(&config);
        state.battery = BatteryPhase::Charging;
        state.charging_timer = 5;
        // ceil(5 * 1e9 / 360)
        assert_eq!(state.gauge_bars(&config), 13_888_889);
        state.charging_timer = 359;
        assert!(state.gauge_bars(&config) <= config.gauge_segments);
    }

    #[test]
    fn test_depleted_palette_follows_battery_phase() {
        let config = BehaviorConfig::default();
        let mut state = AnimationState::new(&config);
        assert_eq!(state.palette(), Palette::default());
        state.battery = BatteryPhase::WalkToStation;
        assert_eq!(state.palette(), Palette::depleted());
        state.battery = BatteryPhase::WalkHome;
        assert_eq!(state.palette(), Palette::default());
    }
}
