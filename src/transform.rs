//! Affine transform helpers for building node transforms.
//!
//! All angles are in degrees, as the joint state stores them. Rotations are right-handed,
//! the matrices are column-vector homogeneous 4x4 (`world * local * point`).

use nalgebra::{Matrix4, Point3, Rotation3, Vector3};

/// Homogeneous transform of a scene node.
pub type Transform = Matrix4<f64>;

/// Translation by (x, y, z).
pub fn translate(x: f64, y: f64, z: f64) -> Transform {
    Matrix4::new_translation(&Vector3::new(x, y, z))
}

/// Non-uniform scale, may later be combined with rotations (scene nodes inherit it).
pub fn scale(x: f64, y: f64, z: f64) -> Transform {
    Matrix4::new_nonuniform_scaling(&Vector3::new(x, y, z))
}

pub fn rotate_x(degrees: f64) -> Transform {
    Rotation3::from_axis_angle(&Vector3::x_axis(), degrees.to_radians()).to_homogeneous()
}

pub fn rotate_y(degrees: f64) -> Transform {
    Rotation3::from_axis_angle(&Vector3::y_axis(), degrees.to_radians()).to_homogeneous()
}

pub fn rotate_z(degrees: f64) -> Transform {
    Rotation3::from_axis_angle(&Vector3::z_axis(), degrees.to_radians()).to_homogeneous()
}

/// Transform of the whole figure: placed at `position`, turned by `yaw` around the vertical axis.
pub fn root_transform(position: &Point3<f64>, yaw: f64) -> Transform {
    translate(position.x, position.y, position.z) * rotate_y(yaw)
}

/// Apply the homogeneous transform to the point
pub fn transform_point(m: &Transform, p: &Point3<f64>) -> Point3<f64> {
    Point3::from_homogeneous(m * p.to_homogeneous()).unwrap_or(*p)
}

/// Walking direction for the given yaw. Zero yaw walks along +z, 90 degrees along +x.
pub fn heading(yaw: f64) -> Vector3<f64> {
    let radians = yaw.to_radians();
    Vector3::new(radians.sin(), 0.0, radians.cos())
}

/// Distance on the ground plane (x, z), ignoring the height.
pub fn planar_distance(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    (dx * dx + dz * dz).sqrt()
}
