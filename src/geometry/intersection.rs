// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Meshcleave Contributors

//! Exact triangle-pair intersection and endpoint unification

use super::predicates::{classify_point_plane, mix, normalize_or_zero, triangle_normal, PlaneSide};
use nalgebra::{Point3, Vector3};

/// Which edge of which triangle in a pair produced a segment endpoint.
/// `object` is the slot in the pair (0 or 1); `edge` selects between the
/// two edges leaving that triangle's outlier vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRef {
    pub object: usize,
    pub edge: usize,
}

/// The crossing segment of two triangle surfaces: the overlap of the two
/// plane-crossing intervals on their shared line. Both endpoints lie on both
/// triangles (within floating tolerance) and the segment may be degenerate
/// (zero length) when the triangles only touch.
#[derive(Debug, Clone, Copy)]
pub struct SegmentIntersection {
    pub edge_refs: [EdgeRef; 2],
    pub endpoints: [Point3<f64>; 2],
}

/// A crossing segment together with the two global triangle indices (one per
/// collision shape) that produced it.
#[derive(Debug, Clone)]
pub struct PairIntersection {
    pub tris: [usize; 2],
    pub segment: SegmentIntersection,
}

/// Compute the exact crossing segment of two triangles, if their surfaces
/// cross.
///
/// Pairs whose first triangle lies entirely within `coplanar_epsilon` of the
/// second's plane are rejected as coplanar: a coincident-surface overlap has
/// no meaningful crossing segment, so it is treated as no intersection.
pub fn triangle_pair_intersection(
    tri: &[[Point3<f64>; 3]; 2],
    coplanar_epsilon: f64,
) -> Option<SegmentIntersection> {
    let mut norm = [Vector3::zeros(); 2];
    for i in 0..2 {
        norm[i] = triangle_normal(&tri[i][0], &tri[i][1], &tri[i][2]);
    }
    let mut plane_d = [0.0f64; 2];
    for i in 0..2 {
        plane_d[i] = tri[i][0].coords.dot(&norm[i]);
    }

    if tri[0].iter().all(|p| {
        classify_point_plane(p, &norm[1], plane_d[1], coplanar_epsilon) == PlaneSide::On
    }) {
        return None;
    }

    // Signed distance of each vertex to the other triangle's plane
    let mut other_d = [[0.0f64; 3]; 2];
    for i in 0..2 {
        for j in 0..3 {
            other_d[i][j] = tri[i][j].coords.dot(&norm[1 - i]) - plane_d[1 - i];
        }
    }

    // For each triangle, the segment where it crosses the other's plane
    let mut outlier_of = [0usize; 2];
    let mut cross_t = [[0.0f64; 2]; 2];
    for i in 0..2 {
        let num_pos = other_d[i].iter().filter(|&&d| d > 0.0).count();
        if num_pos == 3 || num_pos == 0 {
            // All vertices on one side: the surfaces cannot cross
            return None;
        }
        // The vertex alone on its side of the plane
        let mut outlier = 0;
        for j in 0..3 {
            let positive = other_d[i][j] > 0.0;
            if positive == (num_pos == 1) {
                outlier = j;
            }
        }
        cross_t[i][0] = other_d[i][outlier] / (other_d[i][outlier] - other_d[i][(outlier + 1) % 3]);
        cross_t[i][1] = other_d[i][outlier] / (other_d[i][outlier] - other_d[i][(outlier + 2) % 3]);
        outlier_of[i] = outlier;
    }

    let mut segment = [[Point3::origin(); 2]; 2];
    for i in 0..2 {
        let outlier = outlier_of[i];
        segment[i][0] = mix(&tri[i][outlier], &tri[i][(outlier + 1) % 3], cross_t[i][0]);
        segment[i][1] = mix(&tri[i][outlier], &tri[i][(outlier + 2) % 3], cross_t[i][1]);
    }

    // Project both segments onto the shared intersection line and intersect
    // the two 1-D intervals
    let dir = normalize_or_zero(segment[0][1] - segment[0][0]);
    let mut t = [[0.0f64; 2]; 2];
    let mut t_edge = [[0usize; 2]; 2];
    for i in 0..2 {
        for j in 0..2 {
            t[i][j] = (segment[i][j] - segment[0][0]).dot(&dir);
            t_edge[i][j] = j;
        }
        if t[i][0] > t[i][1] {
            t[i].swap(0, 1);
            t_edge[i].swap(0, 1);
        }
    }
    if t[0][1] < t[1][0] || t[1][1] < t[0][0] {
        // The intervals do not overlap: the planes cross but the surfaces
        // do not
        return None;
    }

    let (lower_ref, lower) = if t[0][0] > t[1][0] {
        (
            EdgeRef {
                object: 0,
                edge: t_edge[0][0],
            },
            t[0][0],
        )
    } else {
        (
            EdgeRef {
                object: 1,
                edge: t_edge[1][0],
            },
            t[1][0],
        )
    };
    let (upper_ref, upper) = if t[0][1] < t[1][1] {
        (
            EdgeRef {
                object: 0,
                edge: t_edge[0][1],
            },
            t[0][1],
        )
    } else {
        (
            EdgeRef {
                object: 1,
                edge: t_edge[1][1],
            },
            t[1][1],
        )
    };

    Some(SegmentIntersection {
        edge_refs: [lower_ref, upper_ref],
        endpoints: [segment[0][0] + dir * lower, segment[0][0] + dir * upper],
    })
}

#[derive(Debug, Clone, Copy)]
struct MergeCandidate {
    points: [usize; 2],
}

/// Unify near-coincident segment endpoints across all pair intersections.
///
/// Any two endpoints closer than `tolerance_sq` (squared distance) are
/// snapped to a single coordinate: candidates are ordered by their
/// (earlier, later) endpoint indices and the later endpoint takes the
/// earlier one's exact position. Running the pass again is a no-op.
pub fn merge_intersections(intersections: &mut [PairIntersection], tolerance_sq: f64) {
    let mut points: Vec<Point3<f64>> = Vec::with_capacity(intersections.len() * 2);
    for info in intersections.iter() {
        points.push(info.segment.endpoints[0]);
        points.push(info.segment.endpoints[1]);
    }

    let mut candidates = Vec::new();
    for i in 0..points.len() {
        for j in i + 1..points.len() {
            let rel = points[i] - points[j];
            if rel.norm_squared() < tolerance_sq {
                candidates.push(MergeCandidate { points: [i, j] });
            }
        }
    }
    candidates.sort_by_key(|c| c.points);
    for candidate in &candidates {
        points[candidate.points[1]] = points[candidate.points[0]];
    }

    for (i, info) in intersections.iter_mut().enumerate() {
        info.segment.endpoints[0] = points[i * 2];
        info.segment.endpoints[1] = points[i * 2 + 1];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPS: f64 = 1e-9;

    fn crossing_pair() -> [[Point3<f64>; 3]; 2] {
        [
            // In the z=0 plane
            [
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(0.0, 2.0, 0.0),
            ],
            // In the x=0.5 plane, punching through the first
            [
                Point3::new(0.5, -0.5, -1.0),
                Point3::new(0.5, -0.5, 1.0),
                Point3::new(0.5, 4.0, 0.0),
            ],
        ]
    }

    #[test]
    fn test_crossing_segment_endpoints() {
        let tri = crossing_pair();
        let segment = triangle_pair_intersection(&tri, EPS).expect("triangles cross");

        // The crossing runs along x=0.5, z=0 from the first triangle's
        // bottom edge to its hypotenuse
        let mut ys: Vec<f64> = segment.endpoints.iter().map(|p| p.y).collect();
        ys.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_relative_eq!(ys[0], 0.0, epsilon = 1e-9);
        assert_relative_eq!(ys[1], 1.5, epsilon = 1e-9);
        for p in &segment.endpoints {
            assert_relative_eq!(p.x, 0.5, epsilon = 1e-9);
            assert_relative_eq!(p.z, 0.0, epsilon = 1e-9);
        }
        // Both interval bounds come from the first triangle's edges here
        assert_eq!(segment.edge_refs[0].object, 0);
        assert_eq!(segment.edge_refs[1].object, 0);
    }

    #[test]
    fn test_separated_triangles_do_not_cross() {
        let mut tri = crossing_pair();
        for p in &mut tri[1] {
            p.z += 10.0;
        }
        assert!(triangle_pair_intersection(&tri, EPS).is_none());
    }

    #[test]
    fn test_one_sided_rejection() {
        let tri = [
            [
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            [
                Point3::new(0.0, 0.0, 1.0),
                Point3::new(1.0, 0.0, 1.0),
                Point3::new(0.0, 1.0, 1.0),
            ],
        ];
        assert!(triangle_pair_intersection(&tri, EPS).is_none());
    }

    #[test]
    fn test_coplanar_rejected() {
        let tri = [
            [
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(0.0, 2.0, 0.0),
            ],
            [
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(3.0, 1.0, 0.0),
                Point3::new(1.0, 3.0, 0.0),
            ],
        ];
        assert!(triangle_pair_intersection(&tri, EPS).is_none());
    }

    #[test]
    fn test_merge_is_idempotent() {
        let tri = crossing_pair();
        let segment = triangle_pair_intersection(&tri, EPS).unwrap();
        let mut jittered = segment;
        jittered.endpoints[0].x += 5.0e-7;
        jittered.endpoints[1].y -= 5.0e-7;

        let mut infos = vec![
            PairIntersection {
                tris: [0, 0],
                segment,
            },
            PairIntersection {
                tris: [0, 1],
                segment: jittered,
            },
        ];
        merge_intersections(&mut infos, 1.0e-10);

        // Jittered endpoints snapped to the originals
        assert_eq!(infos[1].segment.endpoints[0], infos[0].segment.endpoints[0]);
        assert_eq!(infos[1].segment.endpoints[1], infos[0].segment.endpoints[1]);

        let snapshot: Vec<_> = infos
            .iter()
            .map(|i| i.segment.endpoints)
            .collect();
        merge_intersections(&mut infos, 1.0e-10);
        let again: Vec<_> = infos.iter().map(|i| i.segment.endpoints).collect();
        assert_eq!(snapshot, again);
    }
}
