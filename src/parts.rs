//! Body parts of the robot and how each of them is drawn.
//!
//! The figure consists of 23 parts addressed by stable ids. A part is drawn by scaling
//! (and for the eyes, turning) a primitive mesh inside the node frame; this scale is not
//! inherited by children, unlike the node transform itself.

use nalgebra::Matrix4;
use crate::palette::{ColorRole, Palette};
use crate::render_traits::{DrawTarget, Shape};
use crate::transform::{rotate_x, scale};

/// Stable ids of the body parts. The discriminant is the index in the scene graph arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PartId {
    Torso = 0,
    Neck,
    Head,
    LeftEyeOuter,
    LeftEyeInner,
    LeftPupil,
    RightEyeOuter,
    RightEyeInner,
    RightPupil,
    LeftTread,
    RightTread,
    LeftShoulder,
    LeftArm,
    LeftWrist,
    LeftHand,
    LeftClaw1,
    LeftClaw2,
    RightShoulder,
    RightArm,
    RightWrist,
    RightHand,
    RightClaw1,
    RightClaw2,
}

/// Number of body parts
pub const PART_COUNT: usize = 23;

impl PartId {
    pub const ALL: [PartId; PART_COUNT] = [
        PartId::Torso,
        PartId::Neck,
        PartId::Head,
        PartId::LeftEyeOuter,
        PartId::LeftEyeInner,
        PartId::LeftPupil,
        PartId::RightEyeOuter,
        PartId::RightEyeInner,
        PartId::RightPupil,
        PartId::LeftTread,
        PartId::RightTread,
        PartId::LeftShoulder,
        PartId::LeftArm,
        PartId::LeftWrist,
        PartId::LeftHand,
        PartId::LeftClaw1,
        PartId::LeftClaw2,
        PartId::RightShoulder,
        PartId::RightArm,
        PartId::RightWrist,
        PartId::RightHand,
        PartId::RightClaw1,
        PartId::RightClaw2,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<PartId> {
        PartId::ALL.get(index).copied()
    }

    pub fn render(self) -> PartRender {
        match self {
            PartId::Torso => PartRender::new(Shape::Cube, [3.0, 3.0, 2.0], ColorRole::Torso),
            PartId::Neck => PartRender::new(Shape::Cube, [0.5, 1.3, 0.3], ColorRole::Neck),
            PartId::Head => PartRender::new(Shape::Cube, [1.0, 0.4, 1.0], ColorRole::Head),
            PartId::LeftEyeOuter | PartId::RightEyeOuter =>
                PartRender::new(Shape::Cylinder, [1.2, 1.2, 4.01], ColorRole::Eye).facing_forward(),
            PartId::LeftEyeInner | PartId::RightEyeInner =>
                PartRender::new(Shape::EyeInner, [1.1, 1.1, 4.0], ColorRole::EyeInner).facing_forward(),
            PartId::LeftPupil | PartId::RightPupil =>
                PartRender::new(Shape::Disc, [0.3, 0.3, 0.1], ColorRole::Eye),
            PartId::LeftTread | PartId::RightTread =>
                PartRender::new(Shape::Tread, [1.3, 1.3, 1.0], ColorRole::Tread),
            PartId::LeftShoulder | PartId::RightShoulder =>
                PartRender::new(Shape::Cube, [0.5, 0.3, 0.3], ColorRole::Shoulder),
            PartId::LeftArm | PartId::RightArm =>
                PartRender::new(Shape::Cube, [0.6, 1.9, 0.3], ColorRole::Arm),
            PartId::LeftWrist | PartId::RightWrist =>
                PartRender::new(Shape::Cube, [0.4, 1.2, 0.2], ColorRole::Wrist),
            PartId::LeftHand | PartId::RightHand =>
                PartRender::new(Shape::Cube, [0.3, 0.6, 0.1], ColorRole::Hand),
            PartId::LeftClaw1 | PartId::LeftClaw2 | PartId::RightClaw1 | PartId::RightClaw2 =>
                PartRender::new(Shape::Claw, [1.0, 1.0, 1.0], ColorRole::Claw),
        }
    }
}

/// Render callback of a node, expressed as data: which mesh, how it is sized inside the
/// node frame and which palette entry paints it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartRender {
    pub shape: Shape,
    pub scale: [f64; 3],
    /// Cylinders are modeled along Y, the eyes look along Z.
    pub pre_rotation_x: Option<f64>,
    pub color: ColorRole,
}

impl PartRender {
    pub fn new(shape: Shape, scale: [f64; 3], color: ColorRole) -> Self {
        PartRender { shape, scale, pre_rotation_x: None, color }
    }

    fn facing_forward(self) -> Self {
        PartRender { pre_rotation_x: Some(90.0), ..self }
    }

    /// Transform the mesh is actually drawn with, given the node world transform.
    pub fn mesh_transform(&self, world: &Matrix4<f64>) -> Matrix4<f64> {
        let [sx, sy, sz] = self.scale;
        let m = world * scale(sx, sy, sz);
        match self.pre_rotation_x {
            Some(angle) => m * rotate_x(angle),
            None => m,
        }
    }

    pub fn render(&self, world: &Matrix4<f64>, palette: &Palette, target: &mut dyn DrawTarget) {
        target.draw(self.shape, &self.mesh_transform(world), &palette.color(self.color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_are_stable() {
        for (i, part) in PartId::ALL.iter().enumerate() {
            assert_eq!(part.index(), i);
            assert_eq!(PartId::from_index(i), Some(*part));
        }
        assert_eq!(PartId::from_index(PART_COUNT), None);
        assert_eq!(PartId::RightClaw2.index(), 22);
    }

    #[test]
    fn test_eyes_are_turned_to_face_forward() {
        assert_eq!(PartId::LeftEyeOuter.render().pre_rotation_x, Some(90.0));
        assert_eq!(PartId::RightEyeInner.render().pre_rotation_x, Some(90.0));
        assert_eq!(PartId::LeftPupil.render().pre_rotation_x, None);
    }

    #[test]
    fn test_mesh_transform_does_not_touch_translation() {
        let world = crate::transform::translate(1.0, 2.0, 3.0);
        let m = PartId::Torso.render().mesh_transform(&world);
        assert_eq!(m[(0, 3)], 1.0);
        assert_eq!(m[(1, 3)], 2.0);
        assert_eq!(m[(2, 3)], 3.0);
        assert_eq!(m[(0, 0)], 3.0);
        assert_eq!(m[(2, 2)], 2.0);
    }
}
