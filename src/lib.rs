//! Isolation-milling tool path planning for PCB artwork.
//!
//! # Crates
//!
//! * **isoroute_geom** - Geometric primitives and the boolean-ops wrapper.
//! * **isoroute_algorithms** - Graph and path algorithms (Eulerian trails,
//!   backtrack planning, trail trimming, tour optimisation, outline bridges).
//! * **isoroute_milling** - The voronoi isolator, path-finding surface and
//!   the per-layer orchestrator.
//!
//! This meta-crate (`isoroute`) mostly reexports the other isoroute crates
//! for convenience.
//!
//! ```ignore
//! use isoroute::milling::Surface;
//! ```
//!
//! Is equivalent to:
//!
//! ```ignore
//! use isoroute_milling::Surface;
//! ```

pub extern crate isoroute_geom as geom;
pub extern crate isoroute_algorithms as algorithms;
pub extern crate isoroute_milling as milling;

pub use crate::geom::point;
pub use crate::geom::{Point, ToolPath};
