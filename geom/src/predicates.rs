//! Exact segment predicates.
//!
//! These are the primitives the segment tree and the path-finding surface
//! lean on, so they must agree with themselves under every degenerate
//! arrangement: collinear overlaps, T-junctions, shared endpoints and
//! zero-length segments.

use crate::point::Point;

/// Tests if a point is left, on, or right of an infinite line.
///
/// Returns > 0 for `p2` left of the line through `p0` and `p1`, 0 for
/// `p2` on the line, < 0 for `p2` right of it. This is the cross product
/// of `p0p1` and `p0p2`.
#[inline]
pub fn is_left(p0: Point, p1: Point, p2: Point) -> f64 {
    (p1.x - p0.x) * (p2.y - p0.y) - (p2.x - p0.x) * (p1.y - p0.y)
}

/// Is `x` between `a` and `b`, where `a` may be lesser or greater than
/// `b`. `x == a` or `x == b` also count.
#[inline]
pub fn is_between(a: f64, x: f64, b: f64) -> bool {
    x == a || x == b || ((a - x > 0.0) == (x - b > 0.0))
}

/// Do the segments `p0p1` and `p2p3` intersect, endpoints included?
pub fn is_intersecting(p0: Point, p1: Point, p2: Point, p3: Point) -> bool {
    let left012 = is_left(p0, p1, p2);
    let left013 = is_left(p0, p1, p3);
    let left230 = is_left(p2, p3, p0);
    let left231 = is_left(p2, p3, p1);

    if p0 != p1 {
        if left012 == 0.0
            && is_between(p0.x, p2.x, p1.x)
            && is_between(p0.y, p2.y, p1.y)
        {
            return true; // p2 is on the line p0 to p1
        }
        if left013 == 0.0
            && is_between(p0.x, p3.x, p1.x)
            && is_between(p0.y, p3.y, p1.y)
        {
            return true; // p3 is on the line p0 to p1
        }
    }
    if p2 != p3 {
        if left230 == 0.0
            && is_between(p2.x, p0.x, p3.x)
            && is_between(p2.y, p0.y, p3.y)
        {
            return true; // p0 is on the line p2 to p3
        }
        if left231 == 0.0
            && is_between(p2.x, p1.x, p3.x)
            && is_between(p2.y, p1.y, p3.y)
        {
            return true; // p1 is on the line p2 to p3
        }
    }
    if (left012 > 0.0) == (left013 > 0.0) || (left230 > 0.0) == (left231 > 0.0) {
        p1 == p2
    } else {
        true
    }
}

/// Is the point strictly inside the closed ring? Uses the winding number
/// so it is robust against rings that wrap around the point more than
/// once.
pub fn point_in_ring(p: Point, ring: &[Point]) -> bool {
    let mut winding = 0i32;
    for w in ring.windows(2) {
        let (a, b) = (w[0], w[1]);
        if a.y <= p.y {
            if b.y > p.y && is_left(a, b, p) > 0.0 {
                winding += 1;
            }
        } else if b.y <= p.y && is_left(a, b, p) < 0.0 {
            winding -= 1;
        }
    }
    winding != 0
}

#[cfg(test)]
use crate::point::point;

#[test]
fn crossing_segments() {
    assert!(is_intersecting(
        point(0.0, 0.0),
        point(2.0, 2.0),
        point(0.0, 2.0),
        point(2.0, 0.0)
    ));
}

#[test]
fn disjoint_segments() {
    assert!(!is_intersecting(
        point(0.0, 0.0),
        point(1.0, 0.0),
        point(0.0, 1.0),
        point(1.0, 1.0)
    ));
}

#[test]
fn t_junction_touches() {
    assert!(is_intersecting(
        point(0.0, 0.0),
        point(2.0, 0.0),
        point(1.0, 0.0),
        point(1.0, 1.0)
    ));
}

#[test]
fn collinear_overlap() {
    assert!(is_intersecting(
        point(0.0, 0.0),
        point(2.0, 0.0),
        point(1.0, 0.0),
        point(3.0, 0.0)
    ));
}

#[test]
fn collinear_disjoint() {
    assert!(!is_intersecting(
        point(0.0, 0.0),
        point(1.0, 0.0),
        point(2.0, 0.0),
        point(3.0, 0.0)
    ));
}

#[test]
fn point_in_square_ring() {
    let ring = vec![
        point(0.0, 0.0),
        point(4.0, 0.0),
        point(4.0, 4.0),
        point(0.0, 4.0),
        point(0.0, 0.0),
    ];
    assert!(point_in_ring(point(2.0, 2.0), &ring));
    assert!(!point_in_ring(point(5.0, 2.0), &ring));
    assert!(!point_in_ring(point(-1.0, -1.0), &ring));
}
