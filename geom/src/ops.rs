//! Boolean operations and offsetting.
//!
//! The engine is an integer-coordinate polygon clipper; every operation in
//! here scales to integers, runs the engine and scales back. On top of the
//! raw engine this module enforces the contracts the milling pipeline
//! depends on:
//!
//! - operations with a zero-area operand short-circuit instead of
//!   producing degenerate output,
//! - `buffer` with offset 0 returns its input unchanged,
//! - unions of shapes whose bounding boxes exactly touch on an axis are
//!   pre-dilated by a small epsilon first,
//! - `sum` reduces a list of shapes pairwise and concatenates operands
//!   whose bounding boxes are disjoint instead of unioning them.

use geo_clipper::{Clipper, ClipperOpen, EndType, JoinType};
use geo_types;
use thiserror::Error;

use crate::point::point;
use crate::types::{
    correct, envelope, multi_polygon_area, BoundingBox, LineString, MultiLineString, MultiPolygon,
    Polygon, Ring,
};

/// Scaling factor applied before handing coordinates to the integer
/// clipping engine.
pub const CLIPPER_FACTOR: f64 = 1e6;

/// Segments per full circle when approximating round joins.
pub const POINTS_PER_CIRCLE: usize = 30;

/// Dilation applied to union operands whose bounding boxes exactly touch.
const UNION_EPSILON: f64 = 1e-5;

/// The clipping engine produced a degenerate result for a non-degenerate
/// input. The layer being processed should be abandoned; retrying with
/// the same operands cannot succeed.
#[derive(Debug, Error)]
#[error("boolean operation produced a degenerate result")]
pub struct TopologyError;

fn to_geo_ring(ring: &Ring) -> geo_types::LineString<f64> {
    ring.iter()
        .map(|p| geo_types::Coord { x: p.x, y: p.y })
        .collect()
}

fn to_geo_polygon(poly: &Polygon) -> geo_types::Polygon<f64> {
    geo_types::Polygon::new(
        to_geo_ring(&poly.outer),
        poly.inners.iter().map(to_geo_ring).collect(),
    )
}

fn to_geo_multi(mp: &[Polygon]) -> geo_types::MultiPolygon<f64> {
    geo_types::MultiPolygon(mp.iter().map(to_geo_polygon).collect())
}

fn to_geo_linestrings(mls: &[LineString]) -> geo_types::MultiLineString<f64> {
    geo_types::MultiLineString(
        mls.iter()
            .map(|ls| {
                ls.iter()
                    .map(|p| geo_types::Coord { x: p.x, y: p.y })
                    .collect()
            })
            .collect(),
    )
}

fn from_geo_ring(ls: &geo_types::LineString<f64>) -> Ring {
    let mut ring: Ring = ls.0.iter().map(|c| point(c.x, c.y)).collect();
    if ring.len() >= 2 && ring[0] != ring[ring.len() - 1] {
        let first = ring[0];
        ring.push(first);
    }
    ring
}

fn from_geo_multi(gmp: &geo_types::MultiPolygon<f64>) -> MultiPolygon {
    let mut out: MultiPolygon = gmp
        .0
        .iter()
        .filter(|poly| poly.exterior().0.len() >= 4)
        .map(|poly| Polygon {
            outer: from_geo_ring(poly.exterior()),
            inners: poly
                .interiors()
                .iter()
                .filter(|ring| ring.0.len() >= 4)
                .map(from_geo_ring)
                .collect(),
        })
        .collect();
    correct(&mut out);
    out
}

fn from_geo_linestrings(gmls: &geo_types::MultiLineString<f64>) -> MultiLineString {
    gmls.0
        .iter()
        .map(|ls| ls.0.iter().map(|c| point(c.x, c.y)).collect())
        .collect()
}

/// Union of two multi-polygons.
///
/// Zero-area operands short-circuit; exactly-touching bounding boxes get
/// both operands pre-dilated by a small epsilon to work around hairline
/// gaps in the engine output.
pub fn union(lhs: &MultiPolygon, rhs: &MultiPolygon) -> Result<MultiPolygon, TopologyError> {
    if multi_polygon_area(rhs) <= 0.0 {
        return Ok(lhs.clone());
    }
    if multi_polygon_area(lhs) <= 0.0 {
        return Ok(rhs.clone());
    }
    let lhs_box = envelope(lhs).expect("non-empty operand");
    let rhs_box = envelope(rhs).expect("non-empty operand");
    if lhs_box.touches_on_axis(&rhs_box) {
        return union(&buffer(lhs, UNION_EPSILON), &buffer(rhs, UNION_EPSILON));
    }
    let result = from_geo_multi(&to_geo_multi(lhs).union(&to_geo_multi(rhs), CLIPPER_FACTOR));
    if result.is_empty() {
        return Err(TopologyError);
    }
    Ok(result)
}

/// Intersection of two multi-polygons. Empty when either operand has no
/// area.
pub fn intersection(lhs: &MultiPolygon, rhs: &MultiPolygon) -> MultiPolygon {
    if multi_polygon_area(lhs) <= 0.0 || multi_polygon_area(rhs) <= 0.0 {
        return Vec::new();
    }
    from_geo_multi(&to_geo_multi(lhs).intersection(&to_geo_multi(rhs), CLIPPER_FACTOR))
}

/// `lhs` minus `rhs`. When `rhs` has no area, `lhs` comes back unchanged.
pub fn difference(lhs: &MultiPolygon, rhs: &MultiPolygon) -> MultiPolygon {
    if multi_polygon_area(rhs) <= 0.0 {
        return lhs.clone();
    }
    if multi_polygon_area(lhs) <= 0.0 {
        return Vec::new();
    }
    from_geo_multi(&to_geo_multi(lhs).difference(&to_geo_multi(rhs), CLIPPER_FACTOR))
}

/// Symmetric difference. A zero-area operand returns the other operand.
pub fn sym_difference(lhs: &MultiPolygon, rhs: &MultiPolygon) -> MultiPolygon {
    if multi_polygon_area(rhs) <= 0.0 {
        return lhs.clone();
    }
    if multi_polygon_area(lhs) <= 0.0 {
        return rhs.clone();
    }
    from_geo_multi(&to_geo_multi(lhs).xor(&to_geo_multi(rhs), CLIPPER_FACTOR))
}

/// Parts of the line strings inside the clip shape.
pub fn linestring_intersection(mls: &MultiLineString, clip: &MultiPolygon) -> MultiLineString {
    if multi_polygon_area(clip) <= 0.0 || mls.iter().all(|ls| ls.len() < 2) {
        return Vec::new();
    }
    from_geo_linestrings(&to_geo_linestrings(mls).intersection(&to_geo_multi(clip), CLIPPER_FACTOR))
}

/// Parts of the line strings outside the clip shape. When the clip has no
/// area the input comes back unchanged.
pub fn linestring_difference(mls: &MultiLineString, clip: &MultiPolygon) -> MultiLineString {
    if multi_polygon_area(clip) <= 0.0 {
        return mls.clone();
    }
    if mls.iter().all(|ls| ls.len() < 2) {
        return Vec::new();
    }
    from_geo_linestrings(&to_geo_linestrings(mls).difference(&to_geo_multi(clip), CLIPPER_FACTOR))
}

/// Maximum deviation of an `n`-segment circle approximation from the true
/// circle of radius `r`, in scaled engine units.
fn arc_tolerance(r: f64, points_per_circle: usize) -> f64 {
    let step = std::f64::consts::PI / points_per_circle.max(3) as f64;
    (r.abs() * (1.0 - step.cos()) * CLIPPER_FACTOR).max(1.0)
}

/// Minkowski growth (or shrink, for negative offsets) with round joins.
///
/// An offset of 0 returns the input unchanged; the engine would return
/// empty.
pub fn buffer(mp: &MultiPolygon, expand_by: f64) -> MultiPolygon {
    buffer_approx(mp, expand_by, POINTS_PER_CIRCLE)
}

/// [`buffer`] with an explicit circle approximation.
pub fn buffer_approx(mp: &MultiPolygon, expand_by: f64, points_per_circle: usize) -> MultiPolygon {
    if expand_by == 0.0 || mp.is_empty() {
        return mp.clone();
    }
    from_geo_multi(&to_geo_multi(mp).offset(
        expand_by,
        JoinType::Round(arc_tolerance(expand_by, points_per_circle)),
        EndType::ClosedPolygon,
        CLIPPER_FACTOR,
    ))
}

/// Offsets a single polygon.
pub fn buffer_polygon(poly: &Polygon, expand_by: f64) -> MultiPolygon {
    buffer(&vec![poly.clone()], expand_by)
}

/// Offsets with miter joins, used for the path-finding surface where
/// rounded corners would pull the boundary off the original vertices.
pub fn buffer_miter(mp: &MultiPolygon, expand_by: f64) -> MultiPolygon {
    if expand_by == 0.0 || mp.is_empty() {
        return mp.clone();
    }
    from_geo_multi(&to_geo_multi(mp).offset(
        expand_by,
        JoinType::Miter(2.0),
        EndType::ClosedPolygon,
        CLIPPER_FACTOR,
    ))
}

/// Offsets a bare ring with miter joins. The ring is treated as a filled
/// shape regardless of its winding.
pub fn buffer_ring_miter(ring: &Ring, expand_by: f64) -> MultiPolygon {
    let mut ring = ring.clone();
    if crate::types::ring_area(&ring) < 0.0 {
        ring.reverse();
    }
    buffer_miter(&vec![Polygon::new(ring)], expand_by)
}

/// Inflates an open line string into a polygon with round caps and joins.
pub fn buffer_linestring(ls: &LineString, expand_by: f64) -> MultiPolygon {
    if expand_by == 0.0 || ls.len() < 2 {
        return Vec::new();
    }
    let tolerance = arc_tolerance(expand_by, POINTS_PER_CIRCLE);
    let mls = geo_types::MultiLineString(vec![ls
        .iter()
        .map(|p| geo_types::Coord { x: p.x, y: p.y })
        .collect()]);
    from_geo_multi(&mls.offset(
        expand_by,
        JoinType::Round(tolerance),
        EndType::OpenRound(tolerance),
        CLIPPER_FACTOR,
    ))
}

/// Inflates a set of line strings and unions the results.
///
/// The engine misbehaves on self-crossing open-path inflations, so
/// callers feed this with paths that have already been decomposed into
/// non-crossing trails (the Eulerian builder does exactly that).
pub fn buffer_linestrings(
    mls: &MultiLineString,
    expand_by: f64,
) -> Result<MultiPolygon, TopologyError> {
    if expand_by == 0.0 || mls.is_empty() {
        return Ok(Vec::new());
    }
    sum(mls.iter().map(|ls| buffer_linestring(ls, expand_by)).collect())
}

/// Hierarchical pairwise union of a list of shapes.
///
/// Operands with disjoint bounding boxes are concatenated instead of
/// unioned, which turns the common case of many scattered pads into a
/// cheap merge.
pub fn sum(mpolys: Vec<MultiPolygon>) -> Result<MultiPolygon, TopologyError> {
    let mut level: Vec<(MultiPolygon, Option<BoundingBox>)> = mpolys
        .into_iter()
        .map(|mp| {
            let bbox = envelope(&mp);
            (mp, bbox)
        })
        .collect();
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len() / 2 + 1);
        let mut iter = level.into_iter();
        if iter.len() % 2 == 1 {
            next.push(iter.next().expect("odd leftover"));
        }
        while let (Some((a, a_box)), Some((b, b_box))) = (iter.next(), iter.next()) {
            let merged_box = match (a_box, b_box) {
                (Some(mut ab), Some(bb)) => {
                    ab.expand(&bb);
                    Some(ab)
                }
                (a, b) => a.or(b),
            };
            let disjoint = match (&a_box, &b_box) {
                (Some(ab), Some(bb)) => !ab.intersects(bb),
                _ => true,
            };
            let merged = if disjoint {
                let mut merged = a;
                merged.extend(b);
                merged
            } else {
                union(&a, &b)?
            };
            next.push((merged, merged_box));
        }
        level = next;
    }
    Ok(level.pop().map(|(mp, _)| mp).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::multi_polygon_area;
    use approx::assert_relative_eq;

    fn square(x: f64, y: f64, size: f64) -> Polygon {
        Polygon::new(vec![
            point(x, y),
            point(x + size, y),
            point(x + size, y + size),
            point(x, y + size),
            point(x, y),
        ])
    }

    #[test]
    fn buffer_zero_is_identity() {
        let mp = vec![square(0.0, 0.0, 4.0)];
        assert_eq!(buffer(&mp, 0.0), mp);
    }

    #[test]
    fn union_with_empty_is_identity() {
        let mp = vec![square(0.0, 0.0, 4.0)];
        assert_eq!(union(&mp, &Vec::new()).unwrap(), mp);
        assert_eq!(union(&Vec::new(), &mp).unwrap(), mp);
    }

    #[test]
    fn union_of_disjoint_shapes_adds_areas() {
        let a = vec![square(0.0, 0.0, 4.0)];
        let b = vec![square(10.0, 10.0, 2.0)];
        let out = union(&a, &b).unwrap();
        assert_relative_eq!(multi_polygon_area(&out), 20.0, epsilon = 1e-9);
    }

    #[test]
    fn union_of_touching_boxes_has_no_seam() {
        // Bounding boxes share the x = 4 edge exactly; the pre-dilation
        // path has to produce a single polygon.
        let a = vec![square(0.0, 0.0, 4.0)];
        let b = vec![square(4.0, 0.0, 4.0)];
        let out = union(&a, &b).unwrap();
        assert_eq!(out.len(), 1);
        assert!(multi_polygon_area(&out) >= 32.0);
    }

    #[test]
    fn difference_with_self_is_empty() {
        let mp = vec![square(0.0, 0.0, 4.0)];
        assert_relative_eq!(
            multi_polygon_area(&difference(&mp, &mp)),
            0.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn difference_cuts_hole() {
        let outer = vec![square(0.0, 0.0, 10.0)];
        let inner = vec![square(4.0, 4.0, 2.0)];
        let out = difference(&outer, &inner);
        assert_relative_eq!(multi_polygon_area(&out), 96.0, epsilon = 1e-6);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].inners.len(), 1);
    }

    #[test]
    fn buffer_grows_area() {
        let mp = vec![square(0.0, 0.0, 4.0)];
        let grown = buffer(&mp, 1.0);
        let area = multi_polygon_area(&grown);
        // Square + four edge strips + four approximated quarter circles.
        assert!(area > 16.0 + 16.0 + 3.0 && area < 16.0 + 16.0 + std::f64::consts::PI + 0.1);
    }

    #[test]
    fn sum_concatenates_disjoint_operands() {
        let parts: Vec<MultiPolygon> = (0..5)
            .map(|i| vec![square(i as f64 * 10.0, 0.0, 2.0)])
            .collect();
        let out = sum(parts).unwrap();
        assert_eq!(out.len(), 5);
        assert_relative_eq!(multi_polygon_area(&out), 20.0, epsilon = 1e-9);
    }

    #[test]
    fn sym_difference_of_nested_squares() {
        let big = vec![square(0.0, 0.0, 10.0)];
        let small = vec![square(2.0, 2.0, 2.0)];
        let out = sym_difference(&big, &small);
        assert_relative_eq!(multi_polygon_area(&out), 96.0, epsilon = 1e-6);
    }
}
