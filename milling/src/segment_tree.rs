//! A static index answering "does this segment hit any stored segment?".
//!
//! The tree recursively splits the segment set at the median of one
//! bounding-box corner coordinate, cycling through four (axis,
//! comparison) phases so space gets partitioned like a kd-tree with
//! margin. Nodes live in an arena and reference each other by index.

use crate::geom::predicates::is_intersecting;
use crate::geom::Point;

/// A stored segment, normalised so the lower-x endpoint comes first
/// (ties in x can land either way). The original slope sign is kept so
/// the y extremes stay cheap.
#[derive(Copy, Clone, Debug)]
pub struct Segment {
    first: Point,
    second: Point,
    positive_slope: bool,
}

impl Segment {
    pub fn new(a: Point, b: Point) -> Segment {
        let (first, second) = if a.x < b.x { (a, b) } else { (b, a) };
        Segment { first, second, positive_slope: first.y < second.y }
    }

    #[inline]
    pub fn first(&self) -> Point {
        self.first
    }

    #[inline]
    pub fn second(&self) -> Point {
        self.second
    }

    #[inline]
    fn min_x(&self) -> f64 {
        self.first.x
    }

    #[inline]
    fn max_x(&self) -> f64 {
        self.second.x
    }

    #[inline]
    fn min_y(&self) -> f64 {
        if self.positive_slope {
            self.first.y
        } else {
            self.second.y
        }
    }

    #[inline]
    fn max_y(&self) -> f64 {
        if self.positive_slope {
            self.second.y
        } else {
            self.first.y
        }
    }
}

// The (axis, comparison) phase of one tree level. Children flip the
// comparison and switch axis when the comparison was less-than, which
// yields the repeating cycle
// (x, <) -> (y, >) -> (y, <) -> (x, >) -> (x, <) ...
#[derive(Copy, Clone, PartialEq, Eq)]
struct Phase {
    on_x: bool,
    less_than: bool,
}

const START_PHASE: Phase = Phase { on_x: true, less_than: true };

impl Phase {
    #[inline]
    fn next(self) -> Phase {
        Phase { on_x: self.less_than ^ self.on_x, less_than: !self.less_than }
    }

    // The corner coordinate segments are sorted by at this level, with
    // the sign that turns every comparison into plain less-than.
    #[inline]
    fn sort_key(self, segment: &Segment) -> f64 {
        match (self.less_than, self.on_x) {
            (true, true) => segment.max_x(),
            (true, false) => segment.max_y(),
            (false, true) => -segment.min_x(),
            (false, false) => -segment.min_y(),
        }
    }

    // The opposite extreme of the query segment, used to decide whether
    // the matching child can be skipped.
    #[inline]
    fn query_key(self, segment: &Segment) -> f64 {
        match (self.less_than, self.on_x) {
            (true, true) => -segment.min_x(),
            (true, false) => -segment.min_y(),
            (false, true) => segment.max_x(),
            (false, false) => segment.max_y(),
        }
    }

}

enum Node {
    Internal {
        // Where the split crosses the phase axis.
        intercept: f64,
        // Segments matching the phase criteria.
        in_: u32,
        // Segments that don't.
        out: u32,
    },
    Leaf(Segment),
}

/// The index. Built once, queried many times.
pub struct SegmentTree {
    nodes: Vec<Node>,
    root: Option<u32>,
}

impl SegmentTree {
    pub fn new(segments_in: &[(Point, Point)]) -> SegmentTree {
        let mut segments: Vec<Segment> =
            segments_in.iter().map(|&(a, b)| Segment::new(a, b)).collect();
        let mut tree = SegmentTree { nodes: Vec::with_capacity(segments.len() * 2), root: None };
        if !segments.is_empty() {
            let root = tree.build(&mut segments, START_PHASE);
            tree.root = Some(root);
        }
        tree
    }

    fn build(&mut self, segments: &mut [Segment], phase: Phase) -> u32 {
        if segments.len() == 1 {
            self.nodes.push(Node::Leaf(segments[0]));
            return (self.nodes.len() - 1) as u32;
        }
        segments.sort_by(|s0, s1| phase.sort_key(s0).total_cmp(&phase.sort_key(s1)));
        let mid = segments.len() / 2;
        // The sort key already carries the comparison sign, so the
        // intercept is stored in that signed space too.
        let intercept = phase.sort_key(&segments[mid]);
        let (lower, upper) = segments.split_at_mut(mid);
        let in_ = self.build(lower, phase.next());
        let out = self.build(upper, phase.next());
        self.nodes.push(Node::Internal { intercept, in_, out });
        (self.nodes.len() - 1) as u32
    }

    /// Does the segment `p0`..`p1` intersect any stored segment?
    /// Touching endpoints count as intersecting.
    pub fn intersects(&self, p0: Point, p1: Point) -> bool {
        match self.root {
            Some(root) => self.intersects_node(&Segment::new(p0, p1), root, START_PHASE),
            None => false,
        }
    }

    fn intersects_node(&self, query: &Segment, node: u32, phase: Phase) -> bool {
        match &self.nodes[node as usize] {
            Node::Leaf(stored) => is_intersecting(
                query.first(),
                query.second(),
                stored.first(),
                stored.second(),
            ),
            Node::Internal { intercept, in_, out } => {
                // Segments on the far side can still reach back across
                // the split, so that child is always searched.
                if self.intersects_node(query, *out, phase.next()) {
                    return true;
                }
                // The near side is bounded by the intercept; skip it
                // when the query lies entirely beyond.
                if !(phase.query_key(query) < -*intercept) {
                    return self.intersects_node(query, *in_, phase.next());
                }
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::point;

    fn brute_force(segments: &[(Point, Point)], q: (Point, Point)) -> bool {
        segments
            .iter()
            .any(|&(a, b)| is_intersecting(q.0, q.1, a, b))
    }

    #[test]
    fn empty_tree_hits_nothing() {
        let tree = SegmentTree::new(&[]);
        assert!(!tree.intersects(point(0.0, 0.0), point(1.0, 1.0)));
    }

    #[test]
    fn single_segment() {
        let segments = vec![(point(0.0, 0.0), point(10.0, 10.0))];
        let tree = SegmentTree::new(&segments);
        assert!(tree.intersects(point(0.0, 10.0), point(10.0, 0.0)));
        assert!(!tree.intersects(point(20.0, 20.0), point(30.0, 20.0)));
    }

    #[test]
    fn agrees_with_brute_force_on_a_grid() {
        // A lattice of short segments plus some diagonals, queried with
        // every segment of a coarse probe grid.
        let mut segments: Vec<(Point, Point)> = Vec::new();
        for i in 0..6 {
            for j in 0..6 {
                let x = i as f64;
                let y = j as f64;
                segments.push((point(x, y), point(x + 0.5, y)));
                segments.push((point(x, y), point(x, y + 0.5)));
                if (i + j) % 2 == 0 {
                    segments.push((point(x, y), point(x + 0.5, y + 0.5)));
                }
            }
        }
        let tree = SegmentTree::new(&segments);
        let coords = [-0.75, -0.25, 0.25, 1.1, 2.4, 3.25, 5.6, 7.0];
        for &x0 in &coords {
            for &y0 in &coords {
                for &x1 in &coords {
                    for &y1 in &coords {
                        let q = (point(x0, y0), point(x1, y1));
                        assert_eq!(
                            tree.intersects(q.0, q.1),
                            brute_force(&segments, q),
                            "query ({:?}, {:?})",
                            q.0,
                            q.1
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn duplicate_segments_are_fine() {
        let segments = vec![
            (point(0.0, 0.0), point(1.0, 0.0)),
            (point(0.0, 0.0), point(1.0, 0.0)),
            (point(1.0, 0.0), point(0.0, 0.0)),
        ];
        let tree = SegmentTree::new(&segments);
        assert!(tree.intersects(point(0.5, -1.0), point(0.5, 1.0)));
        assert!(!tree.intersects(point(2.0, -1.0), point(2.0, 1.0)));
    }
}
