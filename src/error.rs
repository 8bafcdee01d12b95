// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Meshcleave Contributors

//! Crate error types

use thiserror::Error;

/// Failures surfaced by the partitioning pipeline.
///
/// Geometric degeneracies (coplanar or barely-touching triangle pairs) are
/// not errors; they simply produce no intersection segment.
#[derive(Debug, Error)]
pub enum CsgError {
    /// An input mesh is not a closed 2-manifold after exact vertex welding.
    #[error("mesh is not a closed manifold: {defective} of {total} triangles lack exactly 3 neighbors")]
    InvalidTopology { defective: usize, total: usize },

    /// The constrained triangulation rejected a patch point (non-finite
    /// or out-of-range coordinate).
    #[error("constrained triangulation failed: {0}")]
    Triangulation(#[from] spade::InsertionError),
}
