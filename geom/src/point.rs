use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// A 2D point in board units.
///
/// Equality is bitwise and the order is lexicographic by `(x, y)`, which
/// makes points usable as keys in the ordered maps the graph algorithms
/// are built on. Positions that should be topologically identical must
/// therefore compare exactly equal; run near-point merging first when the
/// input comes out of floating-point geometry.
#[derive(Copy, Clone, Debug, Default)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Shorthand for `Point { x, y }`.
#[inline]
pub fn point(x: f64, y: f64) -> Point {
    Point { x, y }
}

impl Point {
    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance(self, other: Point) -> f64 {
        self.comparable_distance(other).sqrt()
    }

    /// Squared euclidean distance. Cheaper than [`Point::distance`] and
    /// monotonic with it, so it can stand in for comparisons.
    #[inline]
    pub fn comparable_distance(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Chebyshev distance `max(|dx|, |dy|)`, which approximates the time a
    /// rapid move takes when both machine axes travel at the same speed.
    #[inline]
    pub fn chebyshev_distance(self, other: Point) -> f64 {
        f64::max((self.x - other.x).abs(), (self.y - other.y).abs())
    }

    /// True when `other` lies within `epsilon` of this point.
    #[inline]
    pub fn near(self, other: Point, epsilon: f64) -> bool {
        self.comparable_distance(other) <= epsilon * epsilon
    }
}

impl PartialEq for Point {
    #[inline]
    fn eq(&self, other: &Point) -> bool {
        self.x.to_bits() == other.x.to_bits() && self.y.to_bits() == other.y.to_bits()
    }
}

impl Eq for Point {}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.x.to_bits());
        state.write_u64(self.y.to_bits());
    }
}

impl PartialOrd for Point {
    #[inline]
    fn partial_cmp(&self, other: &Point) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Point {
    #[inline]
    fn cmp(&self, other: &Point) -> Ordering {
        self.x
            .total_cmp(&other.x)
            .then_with(|| self.y.total_cmp(&other.y))
    }
}

#[test]
fn lexicographic_order() {
    assert!(point(1.0, 5.0) < point(2.0, 0.0));
    assert!(point(1.0, 0.0) < point(1.0, 1.0));
    assert_eq!(point(1.0, 1.0), point(1.0, 1.0));
}

#[test]
fn chebyshev() {
    assert_eq!(point(0.0, 0.0).chebyshev_distance(point(3.0, -7.0)), 7.0);
    assert_eq!(point(1.0, 1.0).chebyshev_distance(point(4.0, 2.0)), 3.0);
}

#[test]
fn near_points() {
    assert!(point(0.0, 0.0).near(point(0.0, 1e-6), 1e-5));
    assert!(!point(0.0, 0.0).near(point(0.0, 1e-4), 1e-5));
}
