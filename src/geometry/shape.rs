// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Meshcleave Contributors

//! World-space snapshot of a posed mesh, and the broad-phase pair finder

use super::predicates::triangle_normal;
use super::{BoundingBox, Bvh, Mesh};
use nalgebra::{Matrix4, Point3, Vector3};

/// Double-precision world-space copy of a posed mesh's geometry.
///
/// The source mesh is only read; all downstream work (intersection,
/// retriangulation, welding) happens on this snapshot.
#[derive(Debug, Clone)]
pub struct CollisionShape {
    pub positions: Vec<Point3<f64>>,
    pub faces: Vec<[usize; 3]>,
}

impl CollisionShape {
    pub fn from_mesh(mesh: &Mesh, transform: &Matrix4<f64>) -> Self {
        let positions = mesh
            .vertices
            .iter()
            .map(|v| transform.transform_point(&v.position))
            .collect();
        let faces = mesh.triangles.iter().map(|t| t.indices).collect();
        Self { positions, faces }
    }

    /// The three corner positions of a triangle.
    pub fn triangle(&self, tri: usize) -> [Point3<f64>; 3] {
        let face = self.faces[tri];
        [
            self.positions[face[0]],
            self.positions[face[1]],
            self.positions[face[2]],
        ]
    }

    pub fn triangle_bbox(&self, tri: usize) -> BoundingBox {
        BoundingBox::from_points(&self.triangle(tri))
    }

    pub fn triangle_normal(&self, tri: usize) -> Vector3<f64> {
        let [a, b, c] = self.triangle(tri);
        triangle_normal(&a, &b, &c)
    }
}

/// Broad phase: candidate triangle pairs (index in `a`, index in `b`) whose
/// AABBs overlap. A superset of the truly intersecting pairs; the exact
/// intersector prunes the rest.
pub fn candidate_pairs(a: &CollisionShape, b: &CollisionShape) -> Vec<(usize, usize)> {
    let triangles = (0..b.faces.len())
        .map(|i| (i, b.triangle_bbox(i)))
        .collect();
    let bvh = Bvh::build(triangles);

    let mut pairs = Vec::new();
    let mut hits = Vec::new();
    for tri_a in 0..a.faces.len() {
        hits.clear();
        bvh.query(&a.triangle_bbox(tri_a), &mut hits);
        for &tri_b in &hits {
            pairs.push((tri_a, tri_b));
        }
    }
    pairs
}
