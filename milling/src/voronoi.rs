//! Voronoi partition of a conductor layer.
//!
//! Each conductor polygon is inflated to its maximum extent before
//! colliding with its neighbours' inflations: the output polygon
//! boundaries lie on the voronoi diagram of the input's edges, clipped
//! by a bounding box ring appended as an extra generator. Milling along
//! those boundaries removes the least copper that still isolates every
//! conductor.
//!
//! The diagram is built over integer segment sites; cells generated by
//! segments of the same input ring share edges that are interior to the
//! merged cell region and are discarded, as are secondary edges and
//! edges left unbounded by the bounding-box ring. Parabolic edges
//! (between a ring corner and a neighbouring segment) are sampled until
//! the linear error drops under `max_dist`.

use boostvoronoi::prelude::*;

use crate::algorithms::merge_near_points::merge_near_linestrings;
use crate::algorithms::segmentize::SCALE;
use crate::geom::predicates::point_in_ring;
use crate::geom::{
    correct, point, BoundingBox, MultiPolygon, Point, Polygon, Ring, TopologyError,
};
use std::collections::BTreeMap;

/// Builds the voronoi partition of `input`, one output polygon per
/// input polygon, holes included. Cleared rings come back empty.
pub fn build_voronoi(
    input: &MultiPolygon,
    bounding_box: &BoundingBox,
    max_dist: f64,
) -> Result<MultiPolygon, TopologyError> {
    build_voronoi_with(input, bounding_box, max_dist, false)
}

/// [`build_voronoi`] with control over concave-feature cleanup.
///
/// Cells of concave features can produce edges that run inside their own
/// generator polygon; retained, they make the output self-overlap. The
/// default is to drop them; `keep_cell_edges_inside_input` preserves
/// them for callers that post-process the raw partition.
pub fn build_voronoi_with(
    input: &MultiPolygon,
    bounding_box: &BoundingBox,
    max_dist: f64,
    keep_cell_edges_inside_input: bool,
) -> Result<MultiPolygon, TopologyError> {
    // Flatten all rings into one indexed segment list, the bounding-box
    // ring last so its cells are recognisable by their missing source.
    let mut segments: Vec<boostvoronoi::Line<i64>> = Vec::new();
    let mut scaled: Vec<(Point, Point)> = Vec::new();
    let mut sources: Vec<Option<(usize, usize)>> = Vec::new();
    let push_ring = |ring: &Ring, source: Option<(usize, usize)>,
                         segments: &mut Vec<boostvoronoi::Line<i64>>,
                         scaled: &mut Vec<(Point, Point)>,
                         sources: &mut Vec<Option<(usize, usize)>>| {
        for w in ring.windows(2) {
            let a = ((w[0].x * SCALE).round() as i64, (w[0].y * SCALE).round() as i64);
            let b = ((w[1].x * SCALE).round() as i64, (w[1].y * SCALE).round() as i64);
            if a == b {
                continue;
            }
            segments.push(boostvoronoi::Line::from([a.0, a.1, b.0, b.1]));
            scaled.push((point(a.0 as f64, a.1 as f64), point(b.0 as f64, b.1 as f64)));
            sources.push(source);
        }
    };
    for (poly_index, poly) in input.iter().enumerate() {
        for (ring_index, ring) in poly.rings().enumerate() {
            push_ring(ring, Some((poly_index, ring_index)), &mut segments, &mut scaled, &mut sources);
        }
    }
    push_ring(&bounding_box.to_ring(), None, &mut segments, &mut scaled, &mut sources);

    let builder = Builder::<i64, f64>::default();
    let builder = builder.with_segments(segments.iter()).map_err(|_| TopologyError)?;
    let diagram = builder.build().map_err(|_| TopologyError)?;

    // Collect the contribution of every primary finite edge to the ring
    // of its generator.
    let mut buckets: BTreeMap<(usize, usize), Vec<Vec<Point>>> = BTreeMap::new();
    for edge_wrapper in diagram.edges().iter() {
        let edge = edge_wrapper.get();
        if !edge.is_primary() {
            continue;
        }
        let cell_id = match edge.cell() {
            Ok(id) => id,
            Err(_) => continue,
        };
        let cell = diagram.get_cell(cell_id).map_err(|_| TopologyError)?.get();
        let source = match sources.get(cell.source_index()) {
            Some(&Some(source)) => source,
            _ => continue, // A bounding-box cell.
        };
        let twin_id = match edge.twin() {
            Ok(id) => id,
            Err(_) => continue,
        };
        let twin = diagram.get_edge(twin_id).map_err(|_| TopologyError)?.get();
        let twin_cell_id = match twin.cell() {
            Ok(id) => id,
            Err(_) => continue,
        };
        let twin_cell = diagram.get_cell(twin_cell_id).map_err(|_| TopologyError)?.get();
        if sources.get(twin_cell.source_index()) == Some(&Some(source)) {
            // Both sides belong to the same input ring; the edge is
            // interior to the merged cell region.
            continue;
        }
        // Unbounded edges only border the bounding-box ring's cells.
        let (v0, v1) = match (edge.vertex0(), twin.vertex0()) {
            (Some(v0), Some(v1)) => (v0, v1),
            _ => continue,
        };
        let v0 = diagram.vertex_get(v0).map_err(|_| TopologyError)?.get();
        let v1 = diagram.vertex_get(v1).map_err(|_| TopologyError)?.get();
        let p0 = point(v0.x(), v0.y());
        let p1 = point(v1.x(), v1.y());

        let p0_board = point(p0.x / SCALE, p0.y / SCALE);
        let p1_board = point(p1.x / SCALE, p1.y / SCALE);
        if !keep_cell_edges_inside_input {
            let generator = &input[source.0];
            if inside_polygon(p0_board, generator) && inside_polygon(p1_board, generator) {
                continue;
            }
        }

        let polyline = if edge.is_curved() {
            // The focus of the parabola is the point site of whichever
            // adjacent cell was generated by a ring corner.
            let (focus, directrix) = if cell.contains_point() {
                (point_site(&scaled, cell.source_index(), p0, p1), scaled[twin_cell.source_index()])
            } else {
                (point_site(&scaled, twin_cell.source_index(), p0, p1), scaled[cell.source_index()])
            };
            let mut sampled = vec![p0, p1];
            discretize(focus, directrix, max_dist * SCALE, &mut sampled);
            sampled
                .into_iter()
                .map(|p| point(p.x / SCALE, p.y / SCALE))
                .collect()
        } else {
            vec![p0_board, p1_board]
        };
        buckets.entry(source).or_insert_with(Vec::new).push(polyline);
    }

    // Stitch each ring's polylines back into a closed ring.
    let mut output: MultiPolygon = input
        .iter()
        .map(|poly| Polygon {
            outer: Vec::new(),
            inners: vec![Vec::new(); poly.inners.len()],
        })
        .collect();
    for ((poly_index, ring_index), mut polylines) in buckets {
        merge_near_linestrings(&mut polylines, crate::geom::EPSILON);
        let ring = stitch_ring(polylines);
        if ring_index == 0 {
            output[poly_index].outer = ring;
        } else {
            output[poly_index].inners[ring_index - 1] = ring;
        }
    }
    for poly in output.iter_mut() {
        poly.inners.retain(|ring| ring.len() >= 4);
    }
    correct(&mut output);
    Ok(output)
}

fn inside_polygon(p: Point, poly: &Polygon) -> bool {
    point_in_ring(p, &poly.outer) && !poly.inners.iter().any(|inner| point_in_ring(p, inner))
}

// The endpoint of the cell's source segment that acts as the parabola
// focus: the one equidistant from the edge endpoints and the directrix
// can only be the endpoint the cell was generated by, which is the one
// closer to the edge.
fn point_site(scaled: &[(Point, Point)], source_index: usize, p0: Point, p1: Point) -> Point {
    let (low, high) = scaled[source_index];
    let mid = point((p0.x + p1.x) / 2.0, (p0.y + p1.y) / 2.0);
    if mid.comparable_distance(low) <= mid.comparable_distance(high) {
        low
    } else {
        high
    }
}

// Samples a parabolic voronoi edge between a point site (the focus) and
// a segment site (the directrix) until the linear error is below
// max_dist. `sampled` starts as the two edge endpoints; interior
// samples are inserted between them. Everything is in diagram (scaled)
// coordinates.
fn discretize(focus: Point, directrix: (Point, Point), max_dist: f64, sampled: &mut Vec<Point>) {
    // Move the directrix's start point to the origin with its direction
    // along the x axis.
    let (low, high) = directrix;
    let segm_vec_x = high.x - low.x;
    let segm_vec_y = high.y - low.y;
    let sqr_segment_length = segm_vec_x * segm_vec_x + segm_vec_y * segm_vec_y;
    if sqr_segment_length == 0.0 {
        return;
    }

    let projection = |p: Point| -> f64 {
        segm_vec_x * (p.x - low.x) + segm_vec_y * (p.y - low.y)
    };
    let projection_start = projection(sampled[0]);
    let projection_end = projection(sampled[1]);

    // In the transformed space the edge is f(x) = ((x - rot_x)^2 +
    // rot_y^2) / (2 rot_y), the parabola with the transformed focus and
    // the x axis as directrix.
    let rot_x = segm_vec_x * (focus.x - low.x) + segm_vec_y * (focus.y - low.y);
    let rot_y = segm_vec_x * (focus.y - low.y) - segm_vec_y * (focus.x - low.x);
    if rot_y == 0.0 {
        // The focus lies on the directrix; the edge degenerates.
        return;
    }
    let parabola_y = |x: f64| ((x - rot_x) * (x - rot_x) + rot_y * rot_y) / (2.0 * rot_y);

    let last_point = sampled.pop().expect("two endpoints");
    let max_dist_transformed = max_dist * max_dist * sqr_segment_length;

    let mut point_stack = vec![projection_end];
    let mut cur_x = projection_start;
    let mut cur_y = parabola_y(cur_x);
    while let Some(&new_x) = point_stack.last() {
        let new_y = parabola_y(new_x);
        // The point of the parabola furthest from the current chord.
        let mid_x = if new_x == cur_x {
            cur_x
        } else {
            (new_y - cur_y) / (new_x - cur_x) * rot_y + rot_x
        };
        let mid_y = parabola_y(mid_x);

        let mut dist = (new_y - cur_y) * (mid_x - cur_x) - (new_x - cur_x) * (mid_y - cur_y);
        dist = dist * dist
            / ((new_y - cur_y) * (new_y - cur_y) + (new_x - cur_x) * (new_x - cur_x));
        if dist.is_nan() || dist <= max_dist_transformed {
            // Close enough; commit the point and move on.
            point_stack.pop();
            let inter_x = (segm_vec_x * new_x - segm_vec_y * new_y) / sqr_segment_length + low.x;
            let inter_y = (segm_vec_x * new_y + segm_vec_y * new_x) / sqr_segment_length + low.y;
            sampled.push(point(inter_x, inter_y));
            cur_x = new_x;
            cur_y = new_y;
        } else {
            point_stack.push(mid_x);
        }
    }
    // Snap the final sample back onto the exact endpoint.
    let len = sampled.len();
    sampled[len - 1] = last_point;
}

// Chains polylines that share endpoints into closed rings and returns
// the biggest one. Spikes (a point immediately followed by its
// predecessor) are dropped as they appear.
fn stitch_ring(polylines: Vec<Vec<Point>>) -> Ring {
    let mut used = vec![false; polylines.len()];
    let mut best: Ring = Vec::new();
    let mut best_area = 0.0;
    for start in 0..polylines.len() {
        if used[start] || polylines[start].len() < 2 {
            continue;
        }
        used[start] = true;
        let mut ring: Ring = Vec::new();
        for &p in &polylines[start] {
            append_dedup(&mut ring, p);
        }
        let first = ring[0];
        loop {
            let tail = *ring.last().expect("non-empty ring");
            if tail == first {
                break;
            }
            let mut extended = false;
            for (i, candidate) in polylines.iter().enumerate() {
                if used[i] || candidate.len() < 2 {
                    continue;
                }
                if candidate[0] == tail {
                    used[i] = true;
                    for &p in &candidate[1..] {
                        append_dedup(&mut ring, p);
                    }
                    extended = true;
                    break;
                }
                if *candidate.last().expect("non-empty polyline") == tail {
                    used[i] = true;
                    for &p in candidate[..candidate.len() - 1].iter().rev() {
                        append_dedup(&mut ring, p);
                    }
                    extended = true;
                    break;
                }
            }
            if !extended {
                break;
            }
        }
        if ring.len() >= 4 && ring[0] == ring[ring.len() - 1] {
            let area = crate::geom::ring_area(&ring).abs();
            if area > best_area {
                best_area = area;
                best = ring;
            }
        }
    }
    best
}

fn append_dedup(ring: &mut Ring, p: Point) {
    if ring.len() >= 2 && ring[ring.len() - 2] == p {
        ring.pop();
    } else if ring.last() != Some(&p) {
        ring.push(p);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{multi_polygon_area, polygon_area};

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
    fn two_pads_split_at_the_midline() {
        let input = vec![square(0.0, 0.0, 2.0), square(8.0, 0.0, 2.0)];
        let bbox = BoundingBox {
            min: point(-1.0, -1.0),
            max: point(11.0, 3.0),
        };
        let output = build_voronoi(&input, &bbox, 0.05).unwrap();
        assert_eq!(output.len(), 2);
        // Each region contains its own pad and stops at x = 5, the
        // bisector between the two pads.
        for (poly, pad_x) in output.iter().zip(&[1.0, 9.0]) {
            assert!(poly.outer.len() >= 4);
            assert!(point_in_ring(point(*pad_x, 1.0), &poly.outer));
        }
        for p in &output[0].outer {
            assert!(p.x <= 5.0 + 1e-6);
        }
        for p in &output[1].outer {
            assert!(p.x >= 5.0 - 1e-6);
        }
        // The outward sides stop at the bisector with the bounding-box
        // ring, so each region is roughly 5.5 x 3 minus corner arcs.
        let total: f64 = multi_polygon_area(&output);
        assert!(total > 25.0 && total < 33.5, "total area {}", total);
    }

    #[test]
    fn single_pad_fills_the_box() {
        let input = vec![square(4.0, 4.0, 2.0)];
        let bbox = BoundingBox {
            min: point(0.0, 0.0),
            max: point(10.0, 10.0),
        };
        let output = build_voronoi(&input, &bbox, 0.05).unwrap();
        assert_eq!(output.len(), 1);
        let area = polygon_area(&output[0]);
        // The region stops midway between the pad and the bounding-box
        // ring: a 6 x 6 square with the corners blended by parabolas.
        assert!(area > 30.0 && area < 37.0, "area {}", area);
        assert!(point_in_ring(point(5.0, 5.0), &output[0].outer));
        assert!(point_in_ring(point(2.5, 5.0), &output[0].outer));
        assert!(!point_in_ring(point(1.0, 5.0), &output[0].outer));
    }
}
