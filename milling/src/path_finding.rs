//! Routes non-cutting moves through the free space between copper.
//!
//! The surface is either the interior of a grown keep-in shape (minus
//! the keep-out) or the exterior of a shrunk keep-out shape. Growing by
//! the tolerance keeps the original polygon vertices strictly inside the
//! free space, so they can serve as way points for an A* search while
//! the grown boundary handles the collision tests.
//!
//! The surface memoises aggressively: which component a point belongs
//! to, whether an edge crosses the boundary, and the way point list per
//! component. Component identities are interned to small integer search
//! keys because the underlying ring-index structure is too slow to hash
//! on every lookup. The memos make a surface cheap to reuse but also
//! single-threaded; build one surface per thread.

use std::cell::{Cell, RefCell};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::geom::ops;
use crate::geom::predicates::point_in_ring;
use crate::geom::{LineString, MultiPolygon, Point, Ring};
use crate::segment_tree::SegmentTree;

/// Which rings of which boundary polygons enclose a point. Two points
/// are mutually reachable exactly when their ring indices agree.
pub type RingIndices = Vec<(usize, Vec<usize>)>;

/// Interned identifier of a [`RingIndices`] value.
pub type SearchKey = usize;

// Raised when the tries budget runs out mid-search.
struct Exhausted;

#[derive(Copy, Clone, PartialEq)]
struct Dist(f64);

impl Eq for Dist {}

impl PartialOrd for Dist {
    fn partial_cmp(&self, other: &Dist) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Dist {
    fn cmp(&self, other: &Dist) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// The free space for non-cutting moves, with its collision index and
/// memo caches.
pub struct PathFindingSurface {
    // Post-growth boundary pieces, flattened across source polygons.
    boundary: MultiPolygon,
    // Boundary piece index to source polygon index.
    provenance: Vec<usize>,
    // Pre-growth vertices of each source polygon; the way point pool.
    all_vertices: Vec<Vec<Point>>,
    // Free space is inside the boundary (keep-in mode) or outside it.
    keep_in: bool,
    tree: SegmentTree,
    tries: Cell<Option<usize>>,
    point_memo: RefCell<HashMap<Point, Option<SearchKey>>>,
    edge_memo: RefCell<HashMap<(Point, Point), bool>>,
    ring_indices_cache: RefCell<Vec<RingIndices>>,
    ring_indices_lookup: RefCell<HashMap<RingIndices, SearchKey>>,
    vertices_memo: RefCell<HashMap<SearchKey, Vec<Point>>>,
}

impl PathFindingSurface {
    /// Builds the surface.
    ///
    /// With a keep-in, the free space is `keep_in - keep_out` grown
    /// outward by `tolerance` (holes shrunk by it). Without one, the
    /// free space is everything outside `keep_out` shrunk inward by
    /// `tolerance` (its holes grown).
    pub fn new(
        keep_in: Option<&MultiPolygon>,
        keep_out: &MultiPolygon,
        tolerance: f64,
    ) -> PathFindingSurface {
        let keep_in_mode = keep_in.is_some();
        let source: MultiPolygon = match keep_in {
            Some(keep_in) => ops::difference(keep_in, keep_out),
            None => keep_out.clone(),
        };
        let grow = if keep_in_mode { tolerance } else { -tolerance };

        let mut boundary: MultiPolygon = Vec::new();
        let mut provenance: Vec<usize> = Vec::new();
        let mut all_vertices: Vec<Vec<Point>> = Vec::new();
        for (poly_index, poly) in source.iter().enumerate() {
            let mut vertices: Vec<Point> = poly
                .rings()
                .flat_map(|r| r[..r.len().saturating_sub(1)].iter().copied())
                .collect();
            vertices.sort();
            vertices.dedup();
            all_vertices.push(vertices);

            let pieces = ops::buffer_ring_miter(&poly.outer, grow);
            // Shrinking a shape grows the holes in it and vice versa.
            let mut holes: Vec<Ring> = Vec::new();
            for inner in &poly.inners {
                for hole_piece in ops::buffer_ring_miter(inner, -grow) {
                    let mut ring = hole_piece.outer;
                    ring.reverse();
                    holes.push(ring);
                }
            }
            for mut piece in pieces {
                for hole in &holes {
                    if !hole.is_empty() && point_in_ring(hole[0], &piece.outer) {
                        piece.inners.push(hole.clone());
                    }
                }
                boundary.push(piece);
                provenance.push(poly_index);
            }
        }

        let mut segments: Vec<(Point, Point)> = Vec::new();
        for poly in &boundary {
            for ring in poly.rings() {
                for w in ring.windows(2) {
                    segments.push((w[0], w[1]));
                }
            }
        }
        let tree = SegmentTree::new(&segments);

        PathFindingSurface {
            boundary,
            provenance,
            all_vertices,
            keep_in: keep_in_mode,
            tree,
            tries: Cell::new(None),
            point_memo: RefCell::new(HashMap::new()),
            edge_memo: RefCell::new(HashMap::new()),
            ring_indices_cache: RefCell::new(Vec::new()),
            ring_indices_lookup: RefCell::new(HashMap::new()),
            vertices_memo: RefCell::new(HashMap::new()),
        }
    }

    // Point inside the boundary (keep-in mode). A point inside one of a
    // piece's holes may still be inside another piece nested in that
    // hole, so the scan continues.
    fn inside_boundary(&self, p: Point) -> Option<RingIndices> {
        'pieces: for (piece_index, piece) in self.boundary.iter().enumerate() {
            if point_in_ring(p, &piece.outer) {
                let mut rings = vec![0];
                for (inner_index, inner) in piece.inners.iter().enumerate() {
                    if point_in_ring(p, inner) {
                        continue 'pieces;
                    }
                    // This hole has to stay uncrossed.
                    rings.push(inner_index + 1);
                }
                return Some(vec![(piece_index, rings)]);
            }
        }
        None
    }

    // Point outside the boundary (keep-out mode). The point must avoid
    // every piece; being inside a piece is only allowed inside one of
    // its holes.
    fn outside_boundary(&self, p: Point) -> Option<RingIndices> {
        let mut indices = RingIndices::new();
        for (piece_index, piece) in self.boundary.iter().enumerate() {
            if point_in_ring(p, &piece.outer) {
                let mut inside_hole = None;
                for (inner_index, inner) in piece.inners.iter().enumerate() {
                    if point_in_ring(p, inner) {
                        inside_hole = Some(inner_index + 1);
                        break;
                    }
                }
                match inside_hole {
                    Some(inner_index) => indices.push((piece_index, vec![inner_index])),
                    None => return None,
                }
            } else {
                indices.push((piece_index, vec![0]));
            }
        }
        Some(indices)
    }

    fn intern(&self, ring_indices: RingIndices) -> SearchKey {
        if let Some(&key) = self.ring_indices_lookup.borrow().get(&ring_indices) {
            return key;
        }
        let mut cache = self.ring_indices_cache.borrow_mut();
        cache.push(ring_indices.clone());
        let key = cache.len() - 1;
        self.ring_indices_lookup.borrow_mut().insert(ring_indices, key);
        key
    }

    /// Which free-space component holds `p`, or `None` when `p` is not
    /// in the surface at all. Memoised.
    pub fn in_surface_point(&self, p: Point) -> Option<SearchKey> {
        if let Some(&cached) = self.point_memo.borrow().get(&p) {
            return cached;
        }
        let indices = if self.keep_in {
            self.inside_boundary(p)
        } else {
            self.outside_boundary(p)
        };
        let result = indices.map(|ri| self.intern(ri));
        self.point_memo.borrow_mut().insert(p, result);
        result
    }

    /// Is the straight move from `a` to `b` collision free? Memoised on
    /// the normalised endpoint pair.
    pub fn in_surface(&self, a: Point, b: Point) -> bool {
        if b < a {
            return self.in_surface(b, a);
        }
        if let Some(&cached) = self.edge_memo.borrow().get(&(a, b)) {
            return cached;
        }
        let visible = !self.tree.intersects(a, b);
        self.edge_memo.borrow_mut().insert((a, b), visible);
        visible
    }

    fn decrement_tries(&self) -> Result<(), Exhausted> {
        match self.tries.get() {
            Some(0) => Err(Exhausted),
            Some(n) => {
                self.tries.set(Some(n - 1));
                Ok(())
            }
            None => Ok(()),
        }
    }

    // Way points of one component: the pre-growth vertices of every
    // source polygon contributing a piece to it. Memoised per key.
    fn vertices(&self, key: SearchKey) -> Vec<Point> {
        if let Some(cached) = self.vertices_memo.borrow().get(&key) {
            return cached.clone();
        }
        let cache = self.ring_indices_cache.borrow();
        let mut out: Vec<Point> = Vec::new();
        for (piece_index, _) in &cache[key] {
            out.extend(self.all_vertices[self.provenance[*piece_index]].iter().copied());
        }
        out.sort();
        out.dedup();
        self.vertices_memo.borrow_mut().insert(key, out.clone());
        out
    }

    /// A path from `start` to `goal` through the free space, no longer
    /// than `max_path_length`. `max_tries` bounds the number of
    /// visibility tests; exhausting it, or the absence of any path,
    /// yields `None`.
    pub fn find_path(
        &self,
        start: Point,
        goal: Point,
        max_path_length: f64,
        max_tries: Option<usize>,
    ) -> Option<LineString> {
        if max_tries == Some(0) {
            return None;
        }
        self.tries.set(max_tries);
        let key = self.in_surface_point(start)?;
        if self.in_surface_point(goal) != Some(key) {
            // Goal missing from the surface or in a region start can't
            // reach.
            return None;
        }
        match self.astar(start, goal, max_path_length, key) {
            Ok(path) => path,
            Err(Exhausted) => None,
        }
    }

    fn astar(
        &self,
        start: Point,
        goal: Point,
        max_path_length: f64,
        key: SearchKey,
    ) -> Result<Option<LineString>, Exhausted> {
        // A straight shot handles most queries, including start == goal.
        if self.in_surface(start, goal) {
            self.decrement_tries()?;
            if start.comparable_distance(goal) < max_path_length * max_path_length {
                return Ok(Some(vec![start, goal]));
            }
        }

        let waypoints = self.vertices(key);
        let mut open: BinaryHeap<Reverse<(Dist, Point)>> = BinaryHeap::new();
        open.push(Reverse((Dist(start.distance(goal)), start)));
        let mut closed: HashSet<Point> = HashSet::new();
        let mut came_from: HashMap<Point, Point> = HashMap::new();
        // Missing entries count as infinity.
        let mut g_score: HashMap<Point, f64> = HashMap::new();
        g_score.insert(start, 0.0);

        while let Some(Reverse((_, current))) = open.pop() {
            if current == goal {
                return Ok(Some(build_path(current, &came_from)));
            }
            if closed.contains(&current) {
                // Already expanded under a better score.
                continue;
            }
            let budget = max_path_length - g_score[&current];
            let candidates = std::iter::once(start)
                .chain(std::iter::once(goal))
                .chain(waypoints.iter().copied());
            for neighbor in candidates {
                if neighbor == current {
                    continue;
                }
                self.decrement_tries()?;
                if current.distance(neighbor) + neighbor.distance(goal) > budget {
                    continue;
                }
                if !self.in_surface(current, neighbor) {
                    continue;
                }
                let tentative = g_score[&current] + current.distance(neighbor);
                if g_score.get(&neighbor).map(|&g| tentative < g).unwrap_or(true) {
                    // This path to neighbor is better than any previous
                    // one.
                    came_from.insert(neighbor, current);
                    g_score.insert(neighbor, tentative);
                    open.push(Reverse((Dist(tentative + neighbor.distance(goal)), neighbor)));
                }
            }
            closed.insert(current);
        }
        Ok(None)
    }
}

// Walks the predecessor chain back to the start. Always returns at
// least two points.
fn build_path(mut current: Point, came_from: &HashMap<Point, Point>) -> LineString {
    let mut result = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        result.push(prev);
        current = prev;
    }
    result.reverse();
    result
}
