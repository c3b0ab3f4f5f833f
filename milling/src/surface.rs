//! The per-layer orchestrator.
//!
//! A [`Surface`] owns the conductor polygons of one board layer and
//! drives the whole planning pipeline: voronoi partition, offset ring
//! generation, ring attachment, Eulerian trail construction, backtrack
//! planning, trail trimming and tour optimisation. Layers are
//! independent; callers may process front, back, outline and drill
//! surfaces in parallel as long as each surface stays on one thread.

use log::warn;

use crate::algorithms::backtrack::backtrack;
use crate::algorithms::eulerian::make_eulerian_paths;
use crate::algorithms::outline_bridges;
use crate::algorithms::segmentize::segmentize_paths;
use crate::algorithms::tour;
use crate::algorithms::tour::Tourable;
use crate::algorithms::trim_paths::trim_paths;
use crate::config::{IsolationParams, MillFeedDirection};
use crate::error::Error;
use crate::geom::ops;
use crate::geom::predicates::is_left;
use crate::geom::{
    envelope, multi_polygon_area, point, ring_area, BoundingBox, LineString, MultiPolygon, Point,
    Polygon, Ring, ToolPath,
};
use crate::import::VectorImporter;
use crate::voronoi::build_voronoi;

/// The conductor geometry of one layer and the planners over it.
pub struct Surface {
    name: String,
    conductors: MultiPolygon,
    bounding_box: BoundingBox,
    mask: Option<MultiPolygon>,
    points_per_circle: usize,
}

impl Surface {
    /// Renders a layer through the importer boundary.
    ///
    /// Self-intersecting artwork gets a warning and best-effort
    /// treatment. The rendered polygons are simplified slightly; the
    /// importer's curve flattening produces far more vertices than the
    /// tool can distinguish.
    pub fn render(
        importer: &dyn VectorImporter,
        name: &str,
        fill_closed_lines: bool,
        points_per_circle: usize,
    ) -> Result<Surface, Error> {
        let rendered = importer.render(fill_closed_lines, false, points_per_circle)?;
        if has_self_intersections(&rendered) {
            warn!(
                "geometry of layer '{}' is self-intersecting; generated tool paths may be \
                 wildly incorrect, check the output",
                name
            );
        }
        let bounding_box = envelope(&rendered).unwrap_or_else(|| {
            BoundingBox::from_point(point(0.0, 0.0))
        });
        let tolerance = (bounding_box.width().max(bounding_box.height()) / 1e6).max(1e-9);
        let conductors = crate::geom::simplify(&rendered, tolerance);
        Ok(Surface::from_conductors(name, conductors, points_per_circle))
    }

    /// Builds a surface from already-rendered conductors.
    pub fn from_conductors(
        name: &str,
        conductors: MultiPolygon,
        points_per_circle: usize,
    ) -> Surface {
        let bounding_box =
            envelope(&conductors).unwrap_or_else(|| BoundingBox::from_point(point(0.0, 0.0)));
        Surface {
            name: name.to_string(),
            conductors,
            bounding_box,
            mask: None,
            points_per_circle,
        }
    }

    pub fn conductors(&self) -> &MultiPolygon {
        &self.conductors
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    /// Restricts milling to the masked region; the bounding box follows
    /// the mask.
    pub fn add_mask(&mut self, mask: MultiPolygon) {
        self.conductors = ops::intersection(&self.conductors, &mask);
        if let Some(bbox) = envelope(&mask) {
            self.bounding_box = bbox;
        }
        self.mask = Some(mask);
    }

    /// Generates the ordered isolation tool paths for this layer.
    pub fn isolate(&mut self, params: &IsolationParams) -> Result<Vec<ToolPath>, Error> {
        let grow = params.tool_diameter / 2.0;
        let step = params.tool_diameter * (1.0 - params.overlap);
        let tolerance = if params.tolerance > 0.0 {
            params.tolerance
        } else {
            IsolationParams::DEFAULT_TOLERANCE
        };

        if params.voronoi && params.preserve_thermal_reliefs {
            self.preserve_thermal_reliefs(grow.max(tolerance));
        }

        // The bounding-box ring joins the voronoi generators, so it has
        // to clear the conductors by more than the milled width or its
        // bisector would clip the outermost pass.
        let voronoi_bbox = self
            .bounding_box
            .grown(params.tool_diameter * (params.extra_passes + 2) as f64);
        let voronoi = build_voronoi(&self.conductors, &voronoi_bbox, tolerance)?;

        let mut contentions = false;
        let mut toolpath: Vec<LineString> = Vec::new();
        for (i, poly) in self.conductors.iter().enumerate() {
            let polygons = self.offset_polygon(
                poly,
                &voronoi[i],
                &mut contentions,
                grow,
                step,
                params.extra_passes + 1,
                params.voronoi,
            )?;
            for mpoly in &polygons {
                attach_polygons(mpoly, &mut toolpath, grow * 2.0);
            }
        }
        if contentions {
            warn!(
                "layer '{}': unable to fulfill all clearance requirements, using a best \
                 effort approach instead; check the output or use a smaller milling width",
                self.name
            );
        }

        let reversible = params.mill_feed_direction == MillFeedDirection::Any;
        let paths: Vec<ToolPath> = toolpath
            .into_iter()
            .filter(|ls| ls.len() >= 2)
            .map(|ls| ToolPath::new(ls, reversible))
            .collect();
        Ok(self.plan_toolpath(paths, params))
    }

    // The shared tail of the pipeline: minimal trails, backtracks,
    // trimming, tour.
    fn plan_toolpath(&self, mut paths: Vec<ToolPath>, params: &IsolationParams) -> Vec<ToolPath> {
        if params.eulerian_paths {
            match &params.times {
                Some(times) => {
                    // The planner prices doubled runs on the segment
                    // graph, so split first and assemble trails after
                    // the doubles are in.
                    let segments = segmentize_paths(&paths);
                    let backtracks = backtrack(&segments, times);
                    if backtracks.is_empty() {
                        paths = make_eulerian_paths(&paths);
                    } else {
                        let mut combined = segments;
                        combined.extend(backtracks.iter().cloned());
                        paths = make_eulerian_paths(&combined);
                        trim_paths(&mut paths, &backtracks);
                    }
                }
                None => {
                    paths = make_eulerian_paths(&paths);
                }
            }
        }
        tour::optimise_order(&paths, point(0.0, 0.0), params.tsp_2opt)
    }

    // Converts one conductor into its ring offsets, one multi-polygon
    // per pass, outermost pass last.
    fn offset_polygon(
        &self,
        input: &Polygon,
        voronoi_polygon: &Polygon,
        contentions: &mut bool,
        offset: f64,
        step: f64,
        steps: usize,
        do_voronoi: bool,
    ) -> Result<Vec<MultiPolygon>, Error> {
        // Mask the polygon that we need to mill.
        let milling_poly = if do_voronoi { voronoi_polygon } else { input };
        let milling_poly = vec![milling_poly.clone()];
        let masked = match &self.mask {
            Some(mask) => ops::intersection(&milling_poly, mask),
            None => ops::intersection(&milling_poly, &vec![self.bounding_box.to_polygon()]),
        };

        let mut polygons = Vec::new();
        for i in 0..steps {
            let expand_by = if !do_voronoi {
                // One ring per pass, each a step further out.
                offset + step * i as f64
            } else {
                // Voronoi lines sit on the boundary shared between
                // conductors, so only half the passes are needed.
                let factor = i as f64 - (steps as f64 - 1.0) / 2.0;
                if factor > 0.0 {
                    continue;
                }
                step * factor
            };

            if expand_by == 0.0 {
                // Every ring of the shape itself gets milled.
                polygons.push(masked.clone());
                continue;
            }
            let grown = ops::buffer_approx(&masked, expand_by, self.points_per_circle);
            let clipped = if !do_voronoi {
                ops::intersection(&grown, &vec![voronoi_polygon.clone()])
            } else {
                ops::union(&grown, &vec![input.clone()])?
            };
            if (multi_polygon_area(&clipped) - multi_polygon_area(&grown)).abs() > 1e-9 {
                *contentions = true;
            }
            polygons.push(clipped);
        }
        Ok(polygons)
    }

    /// Appends stand-alone conductors for holes that nothing else
    /// encroaches on, so voronoi mode still isolates them. Returns how
    /// many thermal reliefs were found.
    pub fn preserve_thermal_reliefs(&mut self, grow: f64) -> usize {
        let mut found = 0;
        let mut reliefs: MultiPolygon = Vec::new();
        for poly in &self.conductors {
            for inner in &poly.inners {
                // A hole ring winds clockwise; flip it into a shape.
                let mut thermal = inner.clone();
                if ring_area(&thermal) < 0.0 {
                    thermal.reverse();
                }
                let shrunk = ops::buffer(&vec![Polygon::new(thermal)], -grow);
                if multi_polygon_area(&ops::intersection(&shrunk, &self.conductors)) <= 0.0 {
                    found += 1;
                    reliefs.extend(shrunk);
                }
            }
        }
        self.conductors.extend(reliefs);
        found
    }

    /// Plans the outline cut: the outline ring with holding-tab
    /// vertices inserted, plus the index of each bridge's first vertex.
    pub fn cut_outline(
        &self,
        outline: &Ring,
        bridges_num: usize,
        bridges_width: f64,
    ) -> Result<(ToolPath, Vec<usize>), Error> {
        let mut path = outline.clone();
        let bridges = if bridges_num > 0 {
            outline_bridges::make_bridges(&mut path, bridges_num, bridges_width)?
        } else {
            Vec::new()
        };
        Ok((ToolPath::new(path, true), bridges))
    }

    /// Plans drill and hole-milling paths.
    ///
    /// Holes the cutter covers become single-plunge paths. Larger holes
    /// are milled as concentric circular passes: the outermost pass
    /// radius is `(hole - cutter) / 2`, with inner clearing passes
    /// every `step_size` inward when `step_size` is positive. Holes are
    /// visited in nearest-neighbour order from the origin.
    pub fn mill_holes(
        &self,
        holes: &[(Point, f64)],
        cutter_diameter: f64,
        step_size: f64,
    ) -> Vec<ToolPath> {
        let mut ordered: Vec<Hole> = holes
            .iter()
            .map(|&(center, diameter)| Hole { center, diameter })
            .collect();
        tour::nearest_neighbour(&mut ordered, point(0.0, 0.0));

        let mut paths = Vec::new();
        for hole in ordered {
            if cutter_diameter * 1.001 >= hole.diameter {
                // The cutter covers the hole; a plunge is enough.
                paths.push(ToolPath::new(vec![hole.center], false));
                continue;
            }
            let millr = (hole.diameter - cutter_diameter) / 2.0;
            let mut radii = Vec::new();
            if step_size > 0.0 {
                let mut r = millr;
                while r > 0.0 {
                    radii.push(r);
                    r -= step_size;
                }
            } else {
                radii.push(millr);
            }
            // Innermost pass first so the final pass leaves a clean
            // wall.
            radii.reverse();
            for r in radii {
                paths.push(ToolPath::new(
                    circle(hole.center, r, self.points_per_circle),
                    true,
                ));
            }
        }
        paths
    }
}

#[derive(Clone)]
struct Hole {
    center: Point,
    diameter: f64,
}

impl Tourable for Hole {
    fn front(&self) -> Point {
        self.center
    }
    fn back(&self) -> Point {
        self.center
    }
    fn reverse(&mut self) {}
}

fn circle(center: Point, radius: f64, points_per_circle: usize) -> LineString {
    let n = points_per_circle.max(3);
    let mut ring: LineString = (0..n)
        .map(|i| {
            let theta = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
            point(
                center.x + radius * theta.cos(),
                center.y + radius * theta.sin(),
            )
        })
        .collect();
    let first = ring[0];
    ring.push(first);
    ring
}

// Attaches the ring to one end of the toolpath when some ring vertex is
// within max_distance of that end. The ring is rotated so the joined
// vertex comes first.
fn attach_ring(ring: &Ring, toolpath: &mut LineString, max_distance: f64) -> bool {
    let mut insert_at_front = true;
    let mut best_index = 0;
    let front = toolpath[0];
    let back = *toolpath.last().expect("non-empty toolpath");
    let mut best_distance = ring[0].comparable_distance(front);
    for (i, p) in ring.iter().enumerate() {
        let d = p.comparable_distance(front);
        if d < best_distance {
            best_distance = d;
            best_index = i;
            insert_at_front = true;
        }
        let d = p.comparable_distance(back);
        if d < best_distance {
            best_distance = d;
            best_index = i;
            insert_at_front = false;
        }
    }
    let anchor = if insert_at_front { front } else { back };
    if ring[best_index].distance(anchor) >= max_distance {
        return false;
    }
    let mut rotated: LineString = ring[best_index..ring.len() - 1]
        .iter()
        .chain(ring[..best_index].iter())
        .copied()
        .collect();
    rotated.push(ring[best_index]);
    if insert_at_front {
        rotated.extend(toolpath.iter().copied());
        *toolpath = rotated;
    } else {
        toolpath.extend(rotated);
    }
    true
}

// Attaches the ring to whichever toolpath has a close enough endpoint,
// or starts a new toolpath from it.
fn attach_ring_to_paths(ring: &Ring, toolpaths: &mut Vec<LineString>, max_distance: f64) {
    if ring.len() < 2 {
        return;
    }
    for toolpath in toolpaths.iter_mut() {
        if attach_ring(ring, toolpath, max_distance) {
            return;
        }
    }
    toolpaths.push(ring.clone());
}

/// Attaches every ring of the polygons to the toolpaths, outer rings
/// first, then the inner rings ring-index by ring-index so nested loops
/// stay together.
pub fn attach_polygons(
    polygons: &MultiPolygon,
    toolpaths: &mut Vec<LineString>,
    max_distance: f64,
) {
    for poly in polygons {
        attach_ring_to_paths(&poly.outer, toolpaths, max_distance);
    }
    let mut index = 0;
    loop {
        let mut found_one = false;
        for poly in polygons {
            if poly.inners.len() > index {
                found_one = true;
                attach_ring_to_paths(&poly.inners[index], toolpaths, max_distance);
            }
        }
        if !found_one {
            break;
        }
        index += 1;
    }
}

// A cheap self-intersection probe: any two ring segments of the same
// polygon properly crossing. Collinear overlaps slip through; they
// rarely survive rendering anyway.
fn has_self_intersections(mp: &MultiPolygon) -> bool {
    for poly in mp {
        let segments: Vec<(Point, Point)> = poly
            .rings()
            .flat_map(|ring| ring.windows(2).map(|w| (w[0], w[1])))
            .collect();
        for (i, &(a1, a2)) in segments.iter().enumerate() {
            for &(b1, b2) in &segments[i + 1..] {
                let d1 = is_left(a1, a2, b1);
                let d2 = is_left(a1, a2, b2);
                let d3 = is_left(b1, b2, a1);
                let d4 = is_left(b1, b2, a2);
                if d1 != 0.0
                    && d2 != 0.0
                    && d3 != 0.0
                    && d4 != 0.0
                    && (d1 > 0.0) != (d2 > 0.0)
                    && (d3 > 0.0) != (d4 > 0.0)
                {
                    return true;
                }
            }
        }
    }
    false
}
