//! Helper functions

use nalgebra::{Matrix4, Point3};

/// Exponential easing step: moves `current` the `rate` fraction of the remaining distance
/// towards `target`. Returns the new value.
pub fn approach(current: f64, target: f64, rate: f64) -> f64 {
    current + (target - current) * rate
}

/// True if `value` is closer than `tolerance` to `target`.
pub fn aligned(value: f64, target: f64, tolerance: f64) -> bool {
    (value - target).abs() < tolerance
}

/// Fixed step turn. If the remaining difference is within `tolerance`, snaps to the target
/// and returns true. Otherwise moves by `step` in the direction of the target and returns false.
pub fn step_toward(current: &mut f64, target: f64, step: f64, tolerance: f64) -> bool {
    let diff = target - *current;
    if diff.abs() <= tolerance {
        *current = target;
        true
    } else {
        *current += diff.signum() * step;
        false
    }
}

/// Print the point with 5 digits
pub fn dump_point(label: &str, p: &Point3<f64>) {
    println!("{}: x: {:.5}, y: {:.5}, z: {:.5}", label, p.x, p.y, p.z);
}

/// Print the 4x4 matrix row by row.
pub fn dump_matrix(m: &Matrix4<f64>) {
    for r in 0..4 {
        let mut row_str = String::new();
        for c in 0..4 {
            row_str.push_str(&format!("{:8.4} ", m[(r, c)]));
        }
        println!("[{}]", row_str.trim_end());
    }
}

/// Panics, printing both, if the two matrices differ in any element more than tolerance.
#[cfg(test)]
pub(crate) fn assert_matrix_eq(a: &Matrix4<f64>, b: &Matrix4<f64>, tolerance: f64) {
    let worst = (a - b).amax();
    if worst > tolerance {
        dump_matrix(a);
        dump_matrix(b);
        panic!("Matrices differ by {}", worst);
    }
}
