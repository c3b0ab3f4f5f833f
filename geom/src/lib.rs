#![deny(bare_trait_objects)]

//! Simple 2D geometric primitives for isolation milling.
//!
//! This crate is reexported in [isoroute](https://docs.rs/isoroute/).
//!
//! # Overview.
//!
//! This crate implements the maths to work with:
//!
//! - points with a total order (so they can key maps in graph algorithms),
//! - line strings, rings, polygons and multi-polygons,
//! - exact segment intersection predicates,
//! - boolean operations and offsetting (Minkowski growth) through an
//!   integer-coordinate clipping engine.
//!
//! Coordinates are `f64` board units throughout. The clipping engine works
//! on scaled integers; the conversion happens only inside [`ops`] and never
//! leaks out of it.
//!
//! # Rings
//!
//! Closed rings are stored with the first vertex repeated at the end, the
//! same representation the rest of the pipeline assumes. Outer rings wind
//! counter-clockwise, holes clockwise; [`ops`] restores that orientation
//! after every operation that may disturb it.

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

mod point;
mod types;
pub mod predicates;
pub mod ops;

#[doc(inline)]
pub use crate::point::{point, Point};
#[doc(inline)]
pub use crate::types::{
    BoundingBox, LineString, MultiLineString, MultiPolygon, Polygon, Ring, ToolPath,
};
pub use crate::types::{
    correct, envelope, linestring_length, multi_polygon_area, polygon_area, ring_area, simplify,
    simplify_linestring,
};
#[doc(inline)]
pub use crate::ops::TopologyError;

/// Near-equality tolerance used when merging vertices, in board units.
pub const EPSILON: f64 = 1e-5;
