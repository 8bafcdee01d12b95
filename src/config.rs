// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Meshcleave Contributors

//! Pipeline tolerance configuration

use serde::{Deserialize, Serialize};

/// Tolerances for the partitioning pipeline.
///
/// The defaults match the constants the algorithm was tuned with; they are
/// exposed so callers working at unusual scales can widen or tighten them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsgConfig {
    /// Squared world-space distance under which intersection-segment
    /// endpoints from different triangle pairs are unified. Prevents
    /// topological cracks at shared intersection corners.
    pub endpoint_merge_tolerance_sq: f64,
    /// Squared in-plane distance under which points of one triangle's
    /// retriangulation are treated as the same point.
    pub patch_dedup_tolerance_sq: f64,
    /// Plane distance under which a vertex counts as lying on the other
    /// triangle's plane. A pair whose vertices all land within this band is
    /// rejected as coplanar.
    pub coplanar_epsilon: f64,
}

impl Default for CsgConfig {
    fn default() -> Self {
        Self {
            endpoint_merge_tolerance_sq: 1.0e-10,
            patch_dedup_tolerance_sq: 1.0e-7,
            coplanar_epsilon: 1.0e-9,
        }
    }
}
