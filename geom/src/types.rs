use crate::point::Point;

/// An ordered, non-empty run of vertices. Two consecutive vertices are
/// never exactly equal once near-point merging has run.
pub type LineString = Vec<Point>;

/// A closed [`LineString`]: the first vertex is repeated at the end.
/// Outer rings wind counter-clockwise, holes clockwise.
pub type Ring = Vec<Point>;

/// A set of line strings. They may share endpoints.
pub type MultiLineString = Vec<LineString>;

/// A set of disjoint polygons.
pub type MultiPolygon = Vec<Polygon>;

/// One outer ring and zero or more holes. The outer ring contains every
/// hole and the holes are pairwise disjoint.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Polygon {
    pub outer: Ring,
    pub inners: Vec<Ring>,
}

impl Polygon {
    #[inline]
    pub fn new(outer: Ring) -> Polygon {
        Polygon { outer, inners: Vec::new() }
    }

    #[inline]
    pub fn with_inners(outer: Ring, inners: Vec<Ring>) -> Polygon {
        Polygon { outer, inners }
    }

    /// All rings, outer first.
    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        std::iter::once(&self.outer).chain(self.inners.iter())
    }
}

/// An axis-aligned bounding box.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl BoundingBox {
    #[inline]
    pub fn from_point(p: Point) -> BoundingBox {
        BoundingBox { min: p, max: p }
    }

    pub fn from_points<'l, I: IntoIterator<Item = &'l Point>>(points: I) -> Option<BoundingBox> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bbox = BoundingBox::from_point(first);
        for p in iter {
            bbox.expand_point(*p);
        }
        Some(bbox)
    }

    pub fn expand_point(&mut self, p: Point) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    pub fn expand(&mut self, other: &BoundingBox) {
        self.expand_point(other.min);
        self.expand_point(other.max);
    }

    /// Inclusive overlap test, so boxes that merely touch intersect.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// True when the boxes share an exactly equal coordinate on one
    /// box-edge axis. Shapes arranged like this routinely trip up
    /// clipping engines and get pre-dilated before a union.
    pub fn touches_on_axis(&self, other: &BoundingBox) -> bool {
        self.max.x == other.min.x
            || other.max.x == self.min.x
            || self.max.y == other.min.y
            || other.max.y == self.min.y
    }

    pub fn grown(&self, by: f64) -> BoundingBox {
        BoundingBox {
            min: Point { x: self.min.x - by, y: self.min.y - by },
            max: Point { x: self.max.x + by, y: self.max.y + by },
        }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// The box as a closed counter-clockwise ring.
    pub fn to_ring(&self) -> Ring {
        vec![
            self.min,
            Point { x: self.max.x, y: self.min.y },
            self.max,
            Point { x: self.min.x, y: self.max.y },
            self.min,
        ]
    }

    pub fn to_polygon(&self) -> Polygon {
        Polygon::new(self.to_ring())
    }
}

/// A tool path with a traversal constraint.
///
/// When `reversible` is false the line must be cut in the stored
/// direction (a climb-milling constraint, for instance); when true the
/// machine may enter from either end.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct ToolPath {
    pub line: LineString,
    pub reversible: bool,
}

impl ToolPath {
    #[inline]
    pub fn new(line: LineString, reversible: bool) -> ToolPath {
        ToolPath { line, reversible }
    }

    /// First vertex. The line must be non-empty.
    #[inline]
    pub fn front(&self) -> Point {
        self.line[0]
    }

    /// Last vertex. The line must be non-empty.
    #[inline]
    pub fn back(&self) -> Point {
        self.line[self.line.len() - 1]
    }

    #[inline]
    pub fn reverse(&mut self) {
        self.line.reverse();
    }

    #[inline]
    pub fn length(&self) -> f64 {
        linestring_length(&self.line)
    }
}

/// Total length of a line string.
pub fn linestring_length(ls: &[Point]) -> f64 {
    ls.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Signed area of a closed ring: positive for counter-clockwise winding.
pub fn ring_area(ring: &[Point]) -> f64 {
    let mut doubled = 0.0;
    for w in ring.windows(2) {
        doubled += w[0].x * w[1].y - w[1].x * w[0].y;
    }
    doubled / 2.0
}

/// Area of a polygon, holes subtracted.
pub fn polygon_area(poly: &Polygon) -> f64 {
    let mut area = ring_area(&poly.outer).abs();
    for inner in &poly.inners {
        area -= ring_area(inner).abs();
    }
    area
}

pub fn multi_polygon_area(mp: &[Polygon]) -> f64 {
    mp.iter().map(polygon_area).sum()
}

/// Bounding box of a multi-polygon, `None` when empty.
pub fn envelope(mp: &[Polygon]) -> Option<BoundingBox> {
    let mut bbox: Option<BoundingBox> = None;
    for poly in mp {
        for p in &poly.outer {
            match bbox.as_mut() {
                Some(b) => b.expand_point(*p),
                None => bbox = Some(BoundingBox::from_point(*p)),
            }
        }
    }
    bbox
}

/// Restores winding: outers counter-clockwise, holes clockwise.
pub fn correct(mp: &mut MultiPolygon) {
    for poly in mp.iter_mut() {
        if ring_area(&poly.outer) < 0.0 {
            poly.outer.reverse();
        }
        for inner in poly.inners.iter_mut() {
            if ring_area(inner) > 0.0 {
                inner.reverse();
            }
        }
    }
}

/// Douglas-Peucker simplification. Endpoints are always kept.
pub fn simplify_linestring(ls: &[Point], tolerance: f64) -> LineString {
    if ls.len() <= 2 {
        return ls.to_vec();
    }
    let mut keep = vec![false; ls.len()];
    keep[0] = true;
    keep[ls.len() - 1] = true;
    simplify_recurse(ls, 0, ls.len() - 1, tolerance, &mut keep);
    ls.iter()
        .zip(keep.iter())
        .filter(|(_, &k)| k)
        .map(|(p, _)| *p)
        .collect()
}

fn simplify_recurse(ls: &[Point], first: usize, last: usize, tolerance: f64, keep: &mut [bool]) {
    if last <= first + 1 {
        return;
    }
    let a = ls[first];
    let b = ls[last];
    let len = a.distance(b);
    let mut worst = first;
    let mut worst_dist = -1.0;
    for i in first + 1..last {
        let p = ls[i];
        let dist = if len == 0.0 {
            p.distance(a)
        } else {
            ((b.x - a.x) * (a.y - p.y) - (a.x - p.x) * (b.y - a.y)).abs() / len
        };
        if dist > worst_dist {
            worst_dist = dist;
            worst = i;
        }
    }
    if worst_dist > tolerance {
        keep[worst] = true;
        simplify_recurse(ls, first, worst, tolerance, keep);
        simplify_recurse(ls, worst, last, tolerance, keep);
    }
}

/// Simplifies every ring of a multi-polygon. Rings that would collapse
/// below a triangle are left as they were.
pub fn simplify(mp: &MultiPolygon, tolerance: f64) -> MultiPolygon {
    let simplify_ring = |ring: &Ring| -> Ring {
        let out = simplify_linestring(ring, tolerance);
        if out.len() >= 4 {
            out
        } else {
            ring.clone()
        }
    };
    mp.iter()
        .map(|poly| Polygon {
            outer: simplify_ring(&poly.outer),
            inners: poly.inners.iter().map(simplify_ring).collect(),
        })
        .collect()
}

#[cfg(test)]
use crate::point::point;

#[test]
fn ring_winding() {
    let ccw = vec![point(0.0, 0.0), point(1.0, 0.0), point(1.0, 1.0), point(0.0, 1.0), point(0.0, 0.0)];
    assert_eq!(ring_area(&ccw), 1.0);
    let mut cw = ccw.clone();
    cw.reverse();
    assert_eq!(ring_area(&cw), -1.0);
}

#[test]
fn polygon_area_subtracts_holes() {
    let outer = vec![point(0.0, 0.0), point(10.0, 0.0), point(10.0, 10.0), point(0.0, 10.0), point(0.0, 0.0)];
    let hole = vec![point(2.0, 2.0), point(2.0, 4.0), point(4.0, 4.0), point(4.0, 2.0), point(2.0, 2.0)];
    let poly = Polygon::with_inners(outer, vec![hole]);
    assert_eq!(polygon_area(&poly), 96.0);
}

#[test]
fn envelope_expands_over_polygons() {
    let a = Polygon::new(vec![point(0.0, 0.0), point(1.0, 0.0), point(1.0, 1.0), point(0.0, 0.0)]);
    let b = Polygon::new(vec![point(5.0, -2.0), point(6.0, -2.0), point(6.0, 3.0), point(5.0, -2.0)]);
    let bbox = envelope(&[a, b]).unwrap();
    assert_eq!(bbox.min, point(0.0, -2.0));
    assert_eq!(bbox.max, point(6.0, 3.0));
}

#[test]
fn simplify_drops_collinear_points() {
    let ls = vec![point(0.0, 0.0), point(1.0, 0.0), point(2.0, 0.0), point(3.0, 0.0)];
    assert_eq!(simplify_linestring(&ls, 1e-9), vec![point(0.0, 0.0), point(3.0, 0.0)]);
}

#[test]
fn simplify_keeps_corners() {
    let ls = vec![point(0.0, 0.0), point(1.0, 0.0), point(1.0, 1.0)];
    assert_eq!(simplify_linestring(&ls, 0.1), ls);
}
