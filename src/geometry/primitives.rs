// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Meshcleave Contributors

//! Geometric primitives generator

use super::{Mesh, Triangle, Vertex};
use nalgebra::{Point3, Vector2, Vector3};
use std::f64::consts::PI;

/// Geometric primitives
pub enum Primitive {
    Cube { size: Vector3<f64>, center: bool },
    Sphere { r: f64, segments: u32 },
}

impl Primitive {
    pub fn cube(size: Vector3<f64>, center: bool) -> Self {
        Self::Cube { size, center }
    }

    pub fn sphere(r: f64, segments: u32) -> Self {
        let segments = if segments > 0 { segments } else { 32 };
        Self::Sphere { r, segments }
    }

    pub fn to_mesh(&self) -> Mesh {
        match self {
            Self::Cube { size, center } => generate_cube_mesh(*size, *center),
            Self::Sphere { r, segments } => generate_sphere_mesh(*r, *segments),
        }
    }
}

fn generate_cube_mesh(size: Vector3<f64>, center: bool) -> Mesh {
    let mut mesh = Mesh::new();

    let (min_x, max_x) = if center {
        (-size.x / 2.0, size.x / 2.0)
    } else {
        (0.0, size.x)
    };
    let (min_y, max_y) = if center {
        (-size.y / 2.0, size.y / 2.0)
    } else {
        (0.0, size.y)
    };
    let (min_z, max_z) = if center {
        (-size.z / 2.0, size.z / 2.0)
    } else {
        (0.0, size.z)
    };

    // 8 vertices of the cube
    let positions = [
        Point3::new(min_x, min_y, min_z),
        Point3::new(max_x, min_y, min_z),
        Point3::new(max_x, max_y, min_z),
        Point3::new(min_x, max_y, min_z),
        Point3::new(min_x, min_y, max_z),
        Point3::new(max_x, min_y, max_z),
        Point3::new(max_x, max_y, max_z),
        Point3::new(min_x, max_y, max_z),
    ];

    // 6 quads in outward winding, each with its normal
    let faces = [
        // Front (z+)
        ([4, 5, 6, 7], Vector3::new(0.0, 0.0, 1.0)),
        // Back (z-)
        ([1, 0, 3, 2], Vector3::new(0.0, 0.0, -1.0)),
        // Right (x+)
        ([5, 1, 2, 6], Vector3::new(1.0, 0.0, 0.0)),
        // Left (x-)
        ([0, 4, 7, 3], Vector3::new(-1.0, 0.0, 0.0)),
        // Top (y+)
        ([7, 6, 2, 3], Vector3::new(0.0, 1.0, 0.0)),
        // Bottom (y-)
        ([0, 1, 5, 4], Vector3::new(0.0, -1.0, 0.0)),
    ];

    let corner_uvs = [
        Vector2::new(0.0, 0.0),
        Vector2::new(1.0, 0.0),
        Vector2::new(1.0, 1.0),
        Vector2::new(0.0, 1.0),
    ];

    for (indices, normal) in faces {
        let mut quad = [0usize; 4];
        for (corner, &index) in indices.iter().enumerate() {
            quad[corner] =
                mesh.add_vertex(Vertex::with_uv(positions[index], normal, corner_uvs[corner]));
        }
        mesh.add_triangle(Triangle::new([quad[0], quad[1], quad[2]]));
        mesh.add_triangle(Triangle::new([quad[0], quad[2], quad[3]]));
    }

    mesh
}

/// Indexed UV-sphere. Ring vertices are shared between the faces that use
/// them, so every edge of the result is incident to exactly two triangles.
fn generate_sphere_mesh(radius: f64, segments: u32) -> Mesh {
    let segments = segments.max(3) as usize;
    let rings = (segments / 2).max(2);

    let mut mesh = Mesh::new();

    let top = mesh.add_vertex(Vertex::with_uv(
        Point3::new(0.0, radius, 0.0),
        Vector3::new(0.0, 1.0, 0.0),
        Vector2::new(0.5, 0.0),
    ));

    for ring in 1..rings {
        let theta = PI * ring as f64 / rings as f64;
        for segment in 0..segments {
            let phi = 2.0 * PI * segment as f64 / segments as f64;
            let normal = Vector3::new(
                theta.sin() * phi.cos(),
                theta.cos(),
                theta.sin() * phi.sin(),
            );
            mesh.add_vertex(Vertex::with_uv(
                Point3::from(normal * radius),
                normal,
                Vector2::new(segment as f64 / segments as f64, ring as f64 / rings as f64),
            ));
        }
    }

    let bottom = mesh.add_vertex(Vertex::with_uv(
        Point3::new(0.0, -radius, 0.0),
        Vector3::new(0.0, -1.0, 0.0),
        Vector2::new(0.5, 1.0),
    ));

    // Ring index helper: rings are 1-based, stored after the top pole
    let at = |ring: usize, segment: usize| 1 + (ring - 1) * segments + segment % segments;

    for segment in 0..segments {
        mesh.add_triangle(Triangle::new([top, at(1, segment + 1), at(1, segment)]));
        mesh.add_triangle(Triangle::new([
            bottom,
            at(rings - 1, segment),
            at(rings - 1, segment + 1),
        ]));
    }

    for ring in 1..rings - 1 {
        for segment in 0..segments {
            let v00 = at(ring, segment);
            let v01 = at(ring, segment + 1);
            let v10 = at(ring + 1, segment);
            let v11 = at(ring + 1, segment + 1);
            mesh.add_triangle(Triangle::new([v00, v01, v11]));
            mesh.add_triangle(Triangle::new([v00, v11, v10]));
        }
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cube_counts() {
        let mesh = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh();
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(mesh.vertex_count(), 24);
    }

    #[test]
    fn test_cube_centered_bbox() {
        let mesh = Primitive::cube(Vector3::new(2.0, 4.0, 6.0), true).to_mesh();
        let bbox = mesh.bounding_box();
        assert_relative_eq!(bbox.min.y, -2.0, epsilon = 1e-12);
        assert_relative_eq!(bbox.max.z, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_sphere_radius() {
        let mesh = Primitive::sphere(2.0, 16).to_mesh();
        for vertex in &mesh.vertices {
            assert_relative_eq!(vertex.position.coords.norm(), 2.0, epsilon = 1e-9);
        }
    }
}
