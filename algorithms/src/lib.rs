#![deny(bare_trait_objects)]

//! Graph and path algorithms for isolation milling.
//!
//! This crate is reexported in [isoroute](https://docs.rs/isoroute/).
//!
//! The pipeline here turns a pile of milling line strings into a small
//! number of efficiently ordered tool paths:
//!
//! 1. [`merge_near_points`] collapses vertices that differ only by
//!    floating-point noise,
//! 2. [`segmentize`] splits every crossing and T-junction so the result
//!    is a plain graph,
//! 3. [`eulerian`] covers that graph with the minimum number of trails,
//! 4. [`backtrack`] doubles selected edges when the extra milling is
//!    cheaper than the rapid moves it saves,
//! 5. [`trim_paths`] removes doubled segments that ended up redundant,
//! 6. [`tour`] orders and orients the surviving paths,
//! 7. [`outline_bridges`] plans the tabs that keep a cut-out board
//!    attached to its stock.
//!
//! Everything is deterministic: vertex maps are ordered, and ties are
//! broken by the total order on [`Point`](isoroute_geom::Point).

pub extern crate isoroute_geom as geom;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

pub mod disjoint_set;
pub mod scc;
pub mod merge_near_points;
pub mod segmentize;
pub mod eulerian;
pub mod backtrack;
pub mod trim_paths;
pub mod tour;
pub mod outline_bridges;

#[cfg(test)]
mod trim_paths_tests;

#[doc(inline)]
pub use crate::disjoint_set::DisjointSet;
#[doc(inline)]
pub use crate::eulerian::{get_eulerian_paths, make_eulerian_paths, VertexDegree};
#[doc(inline)]
pub use crate::merge_near_points::merge_near_points;
#[doc(inline)]
pub use crate::segmentize::segmentize_paths;
#[doc(inline)]
pub use crate::tour::{nearest_neighbour, optimise_order, tsp_2opt};
