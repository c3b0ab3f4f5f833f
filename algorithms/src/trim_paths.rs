//! Removes doubled segments that ended up redundant.
//!
//! The backtrack planner inserts enough doubled edges for an Eulerian
//! circuit, but a trail only needs an Eulerian path: wherever a trail
//! begins or ends with doubled segments, those segments were milled for
//! nothing and can be cut off. Loops get one better, the longest doubled
//! stretch anywhere in the loop can be rotated to the ends and removed.

use std::collections::BTreeMap;

use crate::geom::{Point, ToolPath};

// Counted bag of two-point backtrack segments.
type Bag = BTreeMap<(Point, Point, bool), usize>;

fn bag_from(backtracks: &[ToolPath]) -> Bag {
    let mut bag = Bag::new();
    for p in backtracks {
        if p.line.len() == 2 {
            *bag.entry((p.front(), p.back(), p.reversible)).or_insert(0) += 1;
        }
    }
    bag
}

// Consumes the segment from the bag if present, preferring the directed
// variant, then the reversible one in either orientation.
fn segment_in_path(start: Point, end: Point, bag: &mut Bag) -> bool {
    for key in &[(start, end, false), (start, end, true), (end, start, true)] {
        if let Some(count) = bag.get_mut(key) {
            *count -= 1;
            if *count == 0 {
                bag.remove(key);
            }
            return true;
        }
    }
    false
}

fn trim_path(path: &mut ToolPath, backtracks: &mut Bag) {
    let line = &path.line;
    if line.len() < 2 {
        return; // Nothing to remove.
    }
    // Work on a copy of the bag; the real one is only debited for the
    // segments actually removed.
    let mut working = backtracks.clone();

    // How many leading vertices can go, and the length removed with them.
    let mut remove_from_start = 0;
    let mut length_from_start = 0.0;
    for i in 0..line.len() - 1 {
        if segment_in_path(line[i], line[i + 1], &mut working) {
            remove_from_start = i + 1;
            length_from_start += line[i].distance(line[i + 1]);
        } else {
            break;
        }
    }
    // Same from the tail. `remove_from_end` is the first index to drop.
    let mut remove_from_end = line.len();
    let mut length_from_end = 0.0;
    for i in (1..line.len()).rev() {
        if segment_in_path(line[i - 1], line[i], &mut working) {
            remove_from_end = i;
            length_from_end += line[i - 1].distance(line[i]);
        } else {
            break;
        }
    }

    // For loops, a doubled stretch in the middle may beat both ends.
    let mut longest_so_far = 0.0;
    let mut longest_start = 0;
    let mut longest_end = 0;
    if line[0] == line[line.len() - 1] {
        let mut i = 0;
        while i + 1 < line.len() {
            let mut fresh = backtracks.clone();
            while i + 1 < line.len() && !segment_in_path(line[i], line[i + 1], &mut fresh) {
                i += 1;
            }
            if i + 1 == line.len() {
                break;
            }
            let span_start = i;
            let mut span_end = i + 1;
            let mut span_length = line[i].distance(line[i + 1]);
            i += 1;
            while i + 1 < line.len() && segment_in_path(line[i], line[i + 1], &mut fresh) {
                span_end = i + 1;
                span_length += line[i].distance(line[i + 1]);
                i += 1;
            }
            if span_length > longest_so_far {
                longest_so_far = span_length;
                longest_start = span_start;
                longest_end = span_end;
            }
        }
    }

    if length_from_start + length_from_end > longest_so_far {
        // Debit the real bag, then drop the ends.
        for i in remove_from_end..line.len() {
            segment_in_path(line[i - 1], line[i], backtracks);
        }
        for i in 0..remove_from_start {
            segment_in_path(line[i], line[i + 1], backtracks);
        }
        path.line.truncate(remove_from_end);
        path.line.drain(..remove_from_start);
    } else {
        for i in longest_start..longest_end {
            segment_in_path(line[i], line[i + 1], backtracks);
        }
        // Rotate the loop so the doubled stretch sits at the ends.
        let mut new_line: Vec<Point> = Vec::with_capacity(line.len());
        new_line.extend(line[longest_end..].iter().copied());
        new_line.extend(line[1..=longest_start].iter().copied());
        path.line = new_line;
    }
}

/// Strips backtrack segments from the ends (and loop interiors) of the
/// tool paths. The backtracks are expected to be straight segments with
/// just two vertices. Paths that shrink below two vertices are removed.
pub fn trim_paths(toolpaths: &mut Vec<ToolPath>, backtracks: &[ToolPath]) {
    if backtracks.is_empty() {
        return;
    }
    let mut bag = bag_from(backtracks);
    for path in toolpaths.iter_mut() {
        trim_path(path, &mut bag);
        if path.reversible {
            // Reversed, more might come off.
            let mut reversed = path.clone();
            reversed.line.reverse();
            trim_path(&mut reversed, &mut bag);
            reversed.line.reverse();
            *path = reversed;
        }
    }
    toolpaths.retain(|p| p.line.len() >= 2);
}
