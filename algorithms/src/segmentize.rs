//! Splits paths into segments that don't cross.
//!
//! After this pass no two segments share interior points: crossings are
//! split at the intersection point and T-junctions at the touching
//! vertex, so three segments meet there. The work happens in a scaled
//! integer coordinate space where the predicates are exact.

use crate::geom::{point, Point, ToolPath};
use crate::merge_near_points::merge_near_points;

/// For use when we have to convert from float to integer and back.
pub const SCALE: f64 = 1_000_000.0;

type IPoint = (i64, i64);

#[inline]
fn scale_up(p: Point) -> IPoint {
    ((p.x * SCALE).round() as i64, (p.y * SCALE).round() as i64)
}

#[inline]
fn scale_down(p: IPoint) -> Point {
    point(p.0 as f64 / SCALE, p.1 as f64 / SCALE)
}

#[inline]
fn cross(o: IPoint, a: IPoint, b: IPoint) -> i128 {
    (a.0 - o.0) as i128 * (b.1 - o.1) as i128 - (b.0 - o.0) as i128 * (a.1 - o.1) as i128
}

#[inline]
fn within_bounds(p: IPoint, a: IPoint, b: IPoint) -> bool {
    p.0 >= a.0.min(b.0) && p.0 <= a.0.max(b.0) && p.1 >= a.1.min(b.1) && p.1 <= a.1.max(b.1)
}

/// Points at which segment `b` cuts segment `a`: endpoints of `b` lying
/// on `a`, and the crossing point when the interiors properly intersect.
fn split_points(a1: IPoint, a2: IPoint, b1: IPoint, b2: IPoint) -> Vec<IPoint> {
    let mut out = Vec::new();
    let d1 = cross(a1, a2, b1);
    let d2 = cross(a1, a2, b2);
    if d1 == 0 && within_bounds(b1, a1, a2) {
        out.push(b1);
    }
    if d2 == 0 && within_bounds(b2, a1, a2) {
        out.push(b2);
    }
    let d3 = cross(b1, b2, a1);
    let d4 = cross(b1, b2, a2);
    if d1 != 0 && d2 != 0 && d3 != 0 && d4 != 0 && (d1 > 0) != (d2 > 0) && (d3 > 0) != (d4 > 0) {
        // Proper crossing; the intersection is a1 + t * (a2 - a1) with
        // t = d3 / (d3 - d4), snapped back to the integer grid.
        let t = d3 as f64 / (d3 - d4) as f64;
        let x = a1.0 as f64 + t * (a2.0 - a1.0) as f64;
        let y = a1.1 as f64 + t * (a2.1 - a1.1) as f64;
        out.push((x.round() as i64, y.round() as i64));
    }
    out
}

/// Splits every segment at every crossing and T-junction.
///
/// Each input segment is replaced by the run of sub-segments between its
/// split points, in original order and orientation, paired with its
/// reversibility flag.
fn segmentize(
    all_segments: &[(IPoint, IPoint)],
    allow_reversals: &[bool],
) -> Vec<((IPoint, IPoint), bool)> {
    let mut out = Vec::new();
    for (i, &(a1, a2)) in all_segments.iter().enumerate() {
        if a1 == a2 {
            continue;
        }
        let mut cuts: Vec<IPoint> = vec![a1, a2];
        for (j, &(b1, b2)) in all_segments.iter().enumerate() {
            if j == i || b1 == b2 {
                continue;
            }
            cuts.extend(split_points(a1, a2, b1, b2));
        }
        let along = |p: &IPoint| -> i128 {
            (p.0 - a1.0) as i128 * (a2.0 - a1.0) as i128
                + (p.1 - a1.1) as i128 * (a2.1 - a1.1) as i128
        };
        cuts.sort_by_key(along);
        cuts.dedup();
        for pair in cuts.windows(2) {
            if pair[0] != pair[1] {
                out.push(((pair[0], pair[1]), allow_reversals[i]));
            }
        }
    }
    out
}

/// Converts tool paths into two-point tool paths such that no two output
/// segments cross in their interiors. Direction is maintained on each
/// one along with whether or not it is reversible.
pub fn segmentize_paths(toolpaths: &[ToolPath]) -> Vec<ToolPath> {
    // Merge points that are very close to each other because it makes
    // us more likely to find intersections that we can use.
    let mut merged_toolpaths = toolpaths.to_vec();
    merge_near_points(&mut merged_toolpaths, crate::geom::EPSILON);

    let mut all_segments: Vec<(IPoint, IPoint)> = Vec::new();
    let mut allow_reversals: Vec<bool> = Vec::new();
    for path in &merged_toolpaths {
        for w in path.line.windows(2) {
            all_segments.push((scale_up(w[0]), scale_up(w[1])));
            allow_reversals.push(path.reversible);
        }
    }
    let split_segments = segmentize(&all_segments, &allow_reversals);

    split_segments
        .into_iter()
        .map(|((a, b), reversible)| {
            ToolPath::new(vec![scale_down(a), scale_down(b)], reversible)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::point;

    fn paths(input: &[(&[(f64, f64)], bool)]) -> Vec<ToolPath> {
        input
            .iter()
            .map(|(pts, rev)| {
                ToolPath::new(pts.iter().map(|&(x, y)| point(x, y)).collect(), *rev)
            })
            .collect()
    }

    #[test]
    fn crossing_splits_both_segments() {
        let input = paths(&[
            (&[(0.0, -1.0), (0.0, 1.0)], true),
            (&[(-1.0, 0.0), (1.0, 0.0)], true),
        ]);
        let out = segmentize_paths(&input);
        assert_eq!(out.len(), 4);
        let origin = point(0.0, 0.0);
        assert_eq!(
            out.iter()
                .filter(|p| p.front() == origin || p.back() == origin)
                .count(),
            4
        );
    }

    #[test]
    fn t_junction_splits_the_stem() {
        let input = paths(&[
            (&[(0.0, 0.0), (2.0, 0.0)], true),
            (&[(1.0, 0.0), (1.0, 1.0)], true),
        ]);
        let out = segmentize_paths(&input);
        // The horizontal bar splits in two, the stem stays whole.
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn no_crossings_only_explodes_into_edges() {
        let input = paths(&[(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)], true)]);
        let out = segmentize_paths(&input);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].line, vec![point(0.0, 0.0), point(1.0, 0.0)]);
        assert_eq!(out[1].line, vec![point(1.0, 0.0), point(1.0, 1.0)]);
    }

    #[test]
    fn directed_segments_keep_their_direction() {
        let input = paths(&[
            (&[(1.0, 0.0), (-1.0, 0.0)], false),
            (&[(0.0, -1.0), (0.0, 1.0)], false),
        ]);
        let out = segmentize_paths(&input);
        assert_eq!(out.len(), 4);
        for p in &out {
            assert!(!p.reversible);
        }
        // The right-to-left segment must still point right to left.
        let halves: Vec<_> = out
            .iter()
            .filter(|p| p.front().y == 0.0 && p.back().y == 0.0)
            .collect();
        assert_eq!(halves.len(), 2);
        for h in halves {
            assert!(h.front().x > h.back().x);
        }
    }

    #[test]
    fn collinear_overlap_splits_at_shared_extent() {
        let input = paths(&[
            (&[(0.0, 0.0), (2.0, 0.0)], true),
            (&[(1.0, 0.0), (3.0, 0.0)], true),
        ]);
        let out = segmentize_paths(&input);
        // 0-1, 1-2 from the first segment; 1-2, 2-3 from the second.
        assert_eq!(out.len(), 4);
    }
}
