#![deny(bare_trait_objects)]

//! Voronoi isolation, path-finding and per-layer tool path planning.
//!
//! This crate is reexported in [isoroute](https://docs.rs/isoroute/).
//!
//! The [`Surface`] orchestrator owns the conductor geometry of one board
//! layer and turns it into ordered tool paths:
//!
//! - [`voronoi`] partitions the layer so each conductor can grow to its
//!   maximum extent before meeting a neighbour,
//! - [`Surface::isolate`] generates the offset rings and plans the
//!   milling order,
//! - [`Surface::cut_outline`] plans the board outline cut with holding
//!   tabs,
//! - [`Surface::mill_holes`] plans drilling and hole milling,
//! - [`PathFindingSurface`] routes non-cutting moves around copper.
//!
//! Everything works on board-absolute `f64` coordinates; scaling to the
//! integer spaces of the geometry engines stays inside the respective
//! modules.

pub extern crate isoroute_algorithms as algorithms;
pub use crate::algorithms::geom;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

mod error;
pub mod config;
pub mod import;
pub mod segment_tree;
pub mod path_finding;
pub mod voronoi;
pub mod surface;

#[cfg(test)]
mod path_finding_tests;

#[doc(inline)]
pub use crate::config::{CutterParams, Flavor, IsolationParams, MillFeedDirection, TileInfo};
#[doc(inline)]
pub use crate::error::Error;
#[doc(inline)]
pub use crate::import::{ImportError, VectorImporter};
#[doc(inline)]
pub use crate::path_finding::PathFindingSurface;
#[doc(inline)]
pub use crate::segment_tree::SegmentTree;
#[doc(inline)]
pub use crate::surface::Surface;
pub use crate::algorithms::tour::optimise_order;
