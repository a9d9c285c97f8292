use super::{Point2d, Vector2d};
use cgmath::prelude::*;
use cgmath::Rad;
use std::f64::consts::{PI, TAU};

/// Projects a point onto a local coordinate system.
///
/// # Parameters
/// * `point` - The point to project
/// * `origin` - The origin of the coordinate system
/// * `x_axis` - The basis vector pointing in the positive x-axis.
/// * `y_axis` - The basis vector pointing in the positive y-axis.
pub fn project_local(
    point: Point2d,
    origin: Point2d,
    x_axis: Vector2d,
    y_axis: Vector2d,
) -> Point2d {
    let point = point - origin;
    Point2d::new(point.dot(x_axis), point.dot(y_axis))
}

/// Rotates a vector 90 degrees counter-clockwise.
pub fn rot90(vec: Vector2d) -> Vector2d {
    Vector2d::new(-vec.y, vec.x)
}

/// A unit vector pointing along the given heading.
pub fn heading_vector(heading: Rad<f64>) -> Vector2d {
    let (sin, cos) = heading.0.sin_cos();
    Vector2d::new(cos, sin)
}

/// Wraps an angle into the range `[-π, π)`.
pub fn normalize_angle(angle: Rad<f64>) -> Rad<f64> {
    Rad((angle.0 + PI).rem_euclid(TAU) - PI)
}

/// Interpolates between two headings along the shortest arc.
///
/// # Parameters
/// * `from` - The heading at `f = 0`
/// * `to` - The heading at `f = 1`
/// * `f` - The interpolation fraction
pub fn lerp_heading(from: Rad<f64>, to: Rad<f64>, f: f64) -> Rad<f64> {
    let delta = normalize_angle(to - from);
    normalize_angle(from + delta * f)
}
