//! Collapses vertices that are nearly coincident.
//!
//! Boolean ops and offsetting leave behind vertices that should be the
//! same point but differ in the last few bits. The graph algorithms key
//! on exact equality, so those vertices are rewritten to a common
//! representative before any graph is built.

use std::collections::BTreeMap;

use crate::geom::{Point, ToolPath};

/// Merges all representatives within `distance` of each other.
///
/// The map goes from original point to current representative. Points
/// are scanned in lexicographic order; a forward window bounded by the
/// x-delta keeps the scan close to linear. Returns the number of merges
/// performed. This doesn't do a great job on long chains but it's fast
/// enough.
pub fn merge_near_points_map(points: &mut BTreeMap<Point, Point>, distance: f64) -> usize {
    let keys: Vec<Point> = points.keys().copied().collect();
    let distance_2 = distance * distance;
    let mut points_merged = 0;
    for i in 0..keys.len() {
        let rep_i = points[&keys[i]];
        let bound = Point { x: rep_i.x + distance, y: rep_i.y + distance };
        for key_j in &keys[i..] {
            if *key_j > bound {
                break;
            }
            let rep_j = points[key_j];
            if rep_j != rep_i && rep_i.comparable_distance(rep_j) <= distance_2 {
                points_merged += 1;
                points.insert(*key_j, rep_i);
            }
        }
    }
    points_merged
}

/// Merges near points across a set of tool paths, rewriting every vertex
/// through the representative map. Returns the number of merges.
pub fn merge_near_points(paths: &mut [ToolPath], distance: f64) -> usize {
    let mut points: BTreeMap<Point, Point> = BTreeMap::new();
    for path in paths.iter() {
        for p in &path.line {
            points.insert(*p, *p);
        }
    }
    let points_merged = merge_near_points_map(&mut points, distance);
    if points_merged > 0 {
        for path in paths.iter_mut() {
            for p in path.line.iter_mut() {
                *p = points[p];
            }
        }
    }
    points_merged
}

/// [`merge_near_points`] for bare line strings.
pub fn merge_near_linestrings(mls: &mut [Vec<Point>], distance: f64) -> usize {
    let mut points: BTreeMap<Point, Point> = BTreeMap::new();
    for ls in mls.iter() {
        for p in ls {
            points.insert(*p, *p);
        }
    }
    let points_merged = merge_near_points_map(&mut points, distance);
    if points_merged > 0 {
        for ls in mls.iter_mut() {
            for p in ls.iter_mut() {
                *p = points[p];
            }
        }
    }
    points_merged
}
