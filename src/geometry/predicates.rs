// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Meshcleave Contributors

//! Geometric predicates shared by the intersection and retriangulation stages

use nalgebra::{Point2, Point3, Vector3};

/// Twice the signed area of triangle (a, b, c) in 2-D.
/// Positive when (a, b, c) is counter-clockwise.
pub fn orient2d(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Signed distance from a point to the plane `dot(n, x) = d`.
pub fn signed_plane_distance(point: &Point3<f64>, normal: &Vector3<f64>, d: f64) -> f64 {
    normal.dot(&point.coords) - d
}

/// Classification of a point relative to a plane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    Front,
    Back,
    On,
}

/// Classify a point relative to the plane `dot(n, x) = d` within `epsilon`.
pub fn classify_point_plane(
    point: &Point3<f64>,
    normal: &Vector3<f64>,
    d: f64,
    epsilon: f64,
) -> PlaneSide {
    let distance = signed_plane_distance(point, normal, d);
    if distance > epsilon {
        PlaneSide::Front
    } else if distance < -epsilon {
        PlaneSide::Back
    } else {
        PlaneSide::On
    }
}

/// Linear interpolation between two points.
pub fn mix(a: &Point3<f64>, b: &Point3<f64>, t: f64) -> Point3<f64> {
    a + (b - a) * t
}

/// Unit normal of triangle (a, b, c), or the zero vector for a degenerate
/// triangle.
pub fn triangle_normal(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Vector3<f64> {
    (b - a).cross(&(c - a)).try_normalize(0.0).unwrap_or_else(Vector3::zeros)
}

/// Normalize, mapping the zero vector to itself instead of NaN.
pub fn normalize_or_zero(v: Vector3<f64>) -> Vector3<f64> {
    v.try_normalize(0.0).unwrap_or_else(Vector3::zeros)
}
