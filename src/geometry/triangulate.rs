// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Meshcleave Contributors

//! Constrained 2-D triangulation wrapper

use nalgebra::Point2;
use spade::{ConstrainedDelaunayTriangulation, HasPosition, InsertionError, Triangulation};

/// A triangulation site carrying the caller's point index, so output faces
/// can be expressed in the caller's numbering.
struct Site {
    position: spade::Point2<f64>,
    index: usize,
}

impl HasPosition for Site {
    type Scalar = f64;

    fn position(&self) -> spade::Point2<f64> {
        self.position
    }
}

/// Triangulate a point set with constraint segments, returning faces as
/// index triples into `points`.
///
/// Constraint edges are preserved as triangulation edges. Self-segments and
/// segments that would cross an existing constraint are skipped; exact
/// duplicate points resolve to a single site. Deterministic for a given
/// input.
pub(crate) fn triangulate_constrained(
    points: &[Point2<f64>],
    segments: &[[usize; 2]],
) -> Result<Vec<[usize; 3]>, InsertionError> {
    let mut cdt: ConstrainedDelaunayTriangulation<Site> = ConstrainedDelaunayTriangulation::new();

    let mut handles = Vec::with_capacity(points.len());
    for (index, point) in points.iter().enumerate() {
        handles.push(cdt.insert(Site {
            position: spade::Point2::new(point.x, point.y),
            index,
        })?);
    }

    for segment in segments {
        let (from, to) = (handles[segment[0]], handles[segment[1]]);
        if from == to {
            continue;
        }
        if cdt.can_add_constraint(from, to) {
            cdt.add_constraint(from, to);
        }
    }

    let mut faces = Vec::with_capacity(cdt.num_inner_faces());
    for face in cdt.inner_faces() {
        let [a, b, c] = face.vertices();
        faces.push([a.data().index, b.data().index, c.data().index]);
    }
    Ok(faces)
}
