//! Seams to the outside world: the draw collaborator receives fully composed transforms.

use nalgebra::Matrix4;
use crate::palette::Rgba;

/// Primitive meshes the figure and the world objects are built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Unit cube centered at origin.
    Cube,
    /// Cylinder along the Y axis (outer eyes, receptacle, charging station).
    Cylinder,
    /// Same geometry as the cylinder, separate buffer for the inner eye.
    EyeInner,
    /// Cylinder used for the treads.
    Tread,
    /// Half cylinder (crescent) along the Z axis.
    Claw,
    /// Flat disc in the XY plane.
    Disc,
}

impl Shape {
    pub const ALL: [Shape; 6] = [
        Shape::Cube, Shape::Cylinder, Shape::EyeInner, Shape::Tread, Shape::Claw, Shape::Disc,
    ];
}

/// The mesh/draw collaborator: "draw this mesh with this transform and color".
pub trait DrawTarget {
    /// Called once per frame before any draw with the camera matrices.
    fn begin_frame(&mut self, _view: &Matrix4<f64>, _projection: &Matrix4<f64>) {}

    /// Draw the shape with the given world transform (model matrix, no view applied).
    fn draw(&mut self, shape: Shape, world: &Matrix4<f64>, color: &Rgba);
}

/// One recorded draw call.
#[derive(Debug, Clone)]
pub struct DrawCall {
    pub shape: Shape,
    pub world: Matrix4<f64>,
    pub color: Rgba,
}

/// Draw target that only records what was drawn. Used headless and in tests.
#[derive(Debug, Default)]
pub struct DrawLog {
    pub calls: Vec<DrawCall>,
    pub frames: usize,
}

impl DrawLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, shape: Shape) -> usize {
        self.calls.iter().filter(|c| c.shape == shape).count()
    }
}

impl DrawTarget for DrawLog {
    fn begin_frame(&mut self, _view: &Matrix4<f64>, _projection: &Matrix4<f64>) {
        self.calls.clear();
        self.frames += 1;
    }

    fn draw(&mut self, shape: Shape, world: &Matrix4<f64>, color: &Rgba) {
        self.calls.push(DrawCall { shape, world: *world, color: *color });
    }
}
