// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Meshcleave Contributors

//! Geometry module - mesh representation and the partitioning pipeline

mod bbox;
mod bvh;
mod intersection;
mod mesh;
mod patch;
mod partition;
mod predicates;
mod primitives;
mod shape;
mod topology;
mod triangulate;

pub use bbox::BoundingBox;
pub use bvh::Bvh;
pub use intersection::{
    merge_intersections, triangle_pair_intersection, EdgeRef, PairIntersection,
    SegmentIntersection,
};
pub use mesh::{Mesh, Triangle, Vertex};
pub use patch::{retriangulate_object, Label, PatchOutput, PatchVertex};
pub use partition::{partition_meshes, CsgBucket, CsgModel, CsgPartition, Side};
pub use predicates::{classify_point_plane, orient2d, signed_plane_distance, PlaneSide};
pub use primitives::Primitive;
pub use shape::{candidate_pairs, CollisionShape};
pub use topology::{check_shape_valid, manifold_defects, weld_vertices, TriangleNeighbors};
