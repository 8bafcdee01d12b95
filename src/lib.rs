// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Meshcleave Contributors

//! Meshcleave
//!
//! An exact boolean-partitioning kernel for closed triangle meshes. Two
//! posed meshes go in; four surface buckets come out: each mesh split into
//! the part inside and the part outside the other, with barycentric
//! provenance for re-interpolating per-vertex attributes. Composing buckets
//! (optionally with flipped winding) yields union, intersection and
//! difference surfaces.

pub mod config;
pub mod error;
pub mod geometry;

pub use config::CsgConfig;
pub use error::CsgError;
pub use geometry::{
    partition_meshes, CsgBucket, CsgModel, CsgPartition, Mesh, Primitive, Side, Triangle, Vertex,
};

use nalgebra::Matrix4;

/// Partition two meshes already posed in a common space, with default
/// tolerances.
pub fn partition(mesh_a: &Mesh, mesh_b: &Mesh) -> Result<CsgPartition, CsgError> {
    partition_meshes(
        mesh_a,
        &Matrix4::identity(),
        mesh_b,
        &Matrix4::identity(),
        &CsgConfig::default(),
    )
}
