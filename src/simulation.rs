//! Frame loop: one behavior step followed by drawing the robot and the world around it.

use nalgebra::Point3;
use tracing::warn;

use crate::animation_error::AnimationError;
use crate::behavior::Behavior;
use crate::camera::Camera;
use crate::config::BehaviorConfig;
use crate::interaction::{canvas_position, DragController, PointerEvent, Viewport};
use crate::palette::{ColorRole, Palette};
use crate::render_traits::{DrawTarget, Shape};
use crate::scene_graph::{figure_base, SceneGraph};
use crate::state::{AnimationState, BatteryPhase, ErrandPhase, ObjectState};
use crate::transform::{scale, translate, Transform};

/// Spacing of the charge gauge bars and where the row of bars starts.
const GAUGE_SPACING: f64 = 0.3;
const GAUGE_START_X: f64 = -7.5;

/// The robot, its configuration and the pointer handling, advanced frame by frame.
#[derive(Debug, Clone)]
pub struct Simulation {
    pub config: BehaviorConfig,
    pub state: AnimationState,
    pub drag: DragController,
    /// Frames stepped so far.
    pub frames: u64,
}

impl Simulation {
    pub fn new(config: BehaviorConfig) -> Result<Self, AnimationError> {
        config.validate()?;
        let state = AnimationState::new(&config);
        // The figure layout is fixed, check it once up front
        SceneGraph::figure(&state)?;
        Ok(Simulation { config, state, drag: DragController::default(), frames: 0 })
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.drag = DragController::new(viewport);
        self
    }

    /// One behavior frame.
    pub fn step(&mut self) {
        Behavior::step(&mut self.state, &self.config);
        self.frames += 1;
    }

    /// Draw the current state: the robot first, then the world objects.
    pub fn render(&self, camera: &Camera, target: &mut dyn DrawTarget) {
        target.begin_frame(&camera.view(), &camera.projection());
        let palette = self.state.palette();

        match SceneGraph::figure(&self.state) {
            Ok(graph) => graph.render(&figure_base(&self.state), &palette, target),
            Err(e) => warn!("Skipping the figure this frame: {}", e),
        }
        self.render_world(&palette, target);
    }

    /// Step then render, so the draws see the state of this frame.
    pub fn frame(&mut self, camera: &Camera, target: &mut dyn DrawTarget) {
        self.step();
        self.render(camera, target);
    }

    pub fn pointer_press(&mut self, camera: &Camera, pointer: &PointerEvent) -> bool {
        self.drag.press(&mut self.state, camera, &self.config, pointer)
    }

    pub fn pointer_motion(&mut self, camera: &Camera, pointer: &PointerEvent) {
        self.drag.motion(&mut self.state, camera, &self.config, pointer);
    }

    pub fn pointer_release(&mut self) -> bool {
        self.drag.release(&mut self.state, &self.config)
    }

    /// True while the robot idles and the object hangs at the spawn point, waiting for
    /// someone to drop it.
    pub fn awaiting_drop(&self) -> bool {
        self.state.errand == ErrandPhase::Idle &&
            self.state.battery == BatteryPhase::Normal &&
            self.state.object.state == ObjectState::Resting &&
            !self.state.object_landed(&self.config)
    }

    /// Presses the pointer on the object, optionally drags it to `to` and releases it.
    /// Returns false if the object could not be picked.
    pub fn drag_and_release(&mut self, camera: &Camera, to: Option<PointerEvent>) -> bool {
        let from = canvas_position(camera, &self.drag.viewport, &self.state.object.position);
        if !self.pointer_press(camera, &from) {
            return false;
        }
        if let Some(to) = to {
            self.pointer_motion(camera, &to);
        }
        self.pointer_release()
    }

    fn render_world(&self, palette: &Palette, target: &mut dyn DrawTarget) {
        let trash_color = palette.color(ColorRole::Trash);
        for deposit in &self.state.collection.deposits {
            target.draw(Shape::Cube, &placed(deposit, 0.5, 0.6, 0.4), &trash_color);
        }
        target.draw(Shape::Cube, &placed(&self.state.object.position, 0.5, 0.6, 0.4), &trash_color);

        target.draw(Shape::Cylinder, &placed(&self.config.receptacle_position, 1.2, 1.0, 0.4),
                    &palette.color(ColorRole::TrashCan));
        target.draw(Shape::Cylinder, &placed(&self.config.station_position, 2.0, 0.5, 0.4),
                    &palette.color(ColorRole::ChargingStation));

        let root = self.state.root.position;
        let bar_color = palette.color(ColorRole::GaugeBar);
        for i in 0..self.state.gauge_bars(&self.config) {
            let x = GAUGE_START_X + GAUGE_SPACING * (i + 1) as f64;
            let bar = Point3::new(x, root.y + 1.0, root.z);
            target.draw(Shape::Cube, &placed(&bar, 0.3, 0.5, 0.1), &bar_color);
        }
    }
}

/// World object transform: translated to `position` and scaled, no parent.
fn placed(position: &Point3<f64>, sx: f64, sy: f64, sz: f64) -> Transform {
    translate(position.x, position.y, position.z) * scale(sx, sy, sz)
}
