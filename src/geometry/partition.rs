// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Meshcleave Contributors

//! The partitioning pipeline: broad phase, exact intersection, per-object
//! retriangulation, global label fill and bucket collection.

use super::intersection::{merge_intersections, triangle_pair_intersection, PairIntersection};
use super::patch::{retriangulate_object, Label};
use super::shape::{candidate_pairs, CollisionShape};
use super::topology::{manifold_defects, weld_vertices, TriangleNeighbors};
use super::{Mesh, Triangle, Vertex};
use crate::config::CsgConfig;
use crate::error::CsgError;
use nalgebra::{Matrix4, Point3, Vector2, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Which side of the other mesh a bucket holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Inside,
    Outside,
}

/// One quarter of a partition result: the faces of one object on one side
/// of the other object.
///
/// Vertices are not shared across buckets. Every output vertex carries the
/// three global vertex ids of its source triangle and a barycentric weight,
/// so any per-vertex attribute of the source mesh can be re-interpolated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CsgBucket {
    pub positions: Vec<Point3<f64>>,
    pub indices: Vec<usize>,
    pub bary: Vec<Vector3<f64>>,
    pub source_verts: Vec<[usize; 3]>,
}

impl CsgBucket {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn face_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// The 2x2 result of `partition_meshes`: for each input object, the surface
/// inside and the surface outside the other object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CsgPartition {
    pub buckets: [[CsgBucket; 2]; 2],
}

impl CsgPartition {
    pub fn bucket(&self, object: usize, side: Side) -> &CsgBucket {
        &self.buckets[object][side_index(side)]
    }
}

fn side_index(side: Side) -> usize {
    match side {
        Side::Inside => 0,
        Side::Outside => 1,
    }
}

/// Partition two posed meshes against each other.
///
/// Both meshes are snapshotted into world space in double precision; the
/// inputs are never mutated. Fails if the second mesh is not a closed
/// manifold (checked before and after the core computation). Meshes that do
/// not touch partition trivially: everything lands in the outside buckets.
pub fn partition_meshes(
    mesh_a: &Mesh,
    transform_a: &Matrix4<f64>,
    mesh_b: &Mesh,
    transform_b: &Matrix4<f64>,
    config: &CsgConfig,
) -> Result<CsgPartition, CsgError> {
    let shapes = [
        CollisionShape::from_mesh(mesh_a, transform_a),
        CollisionShape::from_mesh(mesh_b, transform_b),
    ];
    validate_shape(&shapes[1])?;

    // Broad phase, then exact intersection to discard false positives and
    // pin down the crossing segments
    let pairs = candidate_pairs(&shapes[0], &shapes[1]);
    log::debug!("broad phase: {} candidate pairs", pairs.len());

    let mut intersections: Vec<PairIntersection> = Vec::new();
    for (tri_a, tri_b) in pairs {
        let tri = [shapes[0].triangle(tri_a), shapes[1].triangle(tri_b)];
        if let Some(segment) = triangle_pair_intersection(&tri, config.coplanar_epsilon) {
            intersections.push(PairIntersection {
                tris: [tri_a, tri_b],
                segment,
            });
        }
    }
    log::debug!("{} intersecting pairs", intersections.len());
    merge_intersections(&mut intersections, config.endpoint_merge_tolerance_sq);

    let patches = [
        retriangulate_object(0, &mut intersections, &shapes, config)?,
        retriangulate_object(1, &mut intersections, &shapes, config)?,
    ];

    let mut partition = CsgPartition::default();
    for (object, patch) in patches.iter().enumerate() {
        // Surviving original faces plus the replacement patch faces
        let mut faces = shapes[object].faces.clone();
        for &tri in patch.removed_faces.iter().rev() {
            faces.swap_remove(tri);
        }
        let mut labels = vec![Label::Unknown; faces.len()];

        // Untouched vertices carry identity provenance
        let mut positions = shapes[object].positions.clone();
        let mut bary: Vec<Vector3<f64>> = vec![Vector3::new(1.0, 0.0, 0.0); positions.len()];
        let mut source_verts: Vec<[usize; 3]> =
            (0..positions.len()).map(|i| [i, i, i]).collect();

        let vert_offset = positions.len();
        for vertex in &patch.vertices {
            positions.push(vertex.coord);
            bary.push(vertex.bary);
            source_verts.push(vertex.source);
        }
        for face in &patch.faces {
            faces.push([
                face[0] + vert_offset,
                face[1] + vert_offset,
                face[2] + vert_offset,
            ]);
        }
        labels.extend(patch.labels.iter().copied());

        // Spread the patch labels across the whole object through a welded
        // adjacency graph, so faces far from any intersection settle too
        let mut merged = faces.clone();
        weld_vertices(&positions, &mut merged, false);
        let neighbors = TriangleNeighbors::build(&merged);

        let mut queue: VecDeque<usize> = (0..labels.len())
            .filter(|&i| labels[i] != Label::Unknown)
            .collect();
        while let Some(tri) = queue.pop_front() {
            for neighbor in neighbors.neighbors(tri) {
                if labels[neighbor] == Label::Unknown {
                    labels[neighbor] = labels[tri];
                    queue.push_back(neighbor);
                }
            }
        }

        // Collect the two side buckets with fresh, unshared vertices.
        // Faces no label ever reached sit on a shell untouched by any
        // intersection: they count as outside.
        for side in [Side::Inside, Side::Outside] {
            let want = match side {
                Side::Inside => Label::Inside,
                Side::Outside => Label::Outside,
            };
            let bucket = &mut partition.buckets[object][side_index(side)];
            for (face, &label) in faces.iter().zip(&labels) {
                let label = if label == Label::Unknown {
                    Label::Outside
                } else {
                    label
                };
                if label != want {
                    continue;
                }
                for &vert in face {
                    bucket.indices.push(bucket.positions.len());
                    bucket.positions.push(positions[vert]);
                    bucket.bary.push(bary[vert]);
                    bucket.source_verts.push(source_verts[vert]);
                }
            }
        }
    }

    validate_shape(&shapes[1])?;
    Ok(partition)
}

fn validate_shape(shape: &CollisionShape) -> Result<(), CsgError> {
    let defective = manifold_defects(&shape.positions, &shape.faces);
    if defective > 0 {
        log::error!(
            "mesh is not a closed manifold: {} of {} triangles defective",
            defective,
            shape.faces.len()
        );
        return Err(CsgError::InvalidTopology {
            defective,
            total: shape.faces.len(),
        });
    }
    Ok(())
}

/// Accumulates partition buckets into a renderable model, interpolating the
/// source meshes' texture coordinates through the barycentric provenance.
#[derive(Debug, Clone, Default)]
pub struct CsgModel {
    pub positions: Vec<Point3<f64>>,
    pub faces: Vec<usize>,
    pub tex_coords: Vec<Vector2<f64>>,
    pub tex_coords2: Vec<Vector2<f64>>,
}

impl CsgModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Splice a bucket into the model. `flip` reverses the winding of every
    /// face, for result surfaces that should face the other way (e.g. the
    /// cavity left by a subtraction).
    pub fn add_bucket(&mut self, bucket: &CsgBucket, source: &Mesh, flip: bool) {
        let base = self.positions.len();
        if !flip {
            for &index in &bucket.indices {
                self.faces.push(index + base);
            }
        } else {
            for face in bucket.indices.chunks_exact(3) {
                self.faces.push(face[0] + base);
                self.faces.push(face[2] + base);
                self.faces.push(face[1] + base);
            }
        }

        for i in 0..bucket.positions.len() {
            self.positions.push(bucket.positions[i]);
            let ids = bucket.source_verts[i];
            let weights = bucket.bary[i];

            let mut uv = Vector2::zeros();
            let mut uv2 = Vector2::zeros();
            for j in 0..3 {
                let vertex = &source.vertices[ids[j]];
                uv += vertex.uv * weights[j];
                uv2 += vertex.uv2 * weights[j];
            }
            self.tex_coords.push(uv);
            self.tex_coords2.push(uv2);
        }
    }

    /// Convert the accumulated model into a mesh with rebuilt normals.
    pub fn into_mesh(self) -> Mesh {
        let mut mesh = Mesh::with_capacity(self.positions.len(), self.faces.len() / 3);
        for (i, position) in self.positions.iter().enumerate() {
            let mut vertex = Vertex::new(*position, Vector3::zeros());
            vertex.uv = self.tex_coords[i];
            vertex.uv2 = self.tex_coords2[i];
            mesh.add_vertex(vertex);
        }
        for face in self.faces.chunks_exact(3) {
            mesh.add_triangle(Triangle::new([face[0], face[1], face[2]]));
        }
        mesh.recompute_normals();
        mesh
    }
}
