//! The boundary to the vector importer.
//!
//! Parsing Gerber and Excellon files is somebody else's job; the
//! pipeline only needs the rendered polygons and their extent.

use thiserror::Error;

use crate::geom::{BoundingBox, MultiPolygon};

/// The importer could not parse or render its input.
#[derive(Debug, Error)]
#[error("import failed: {0}")]
pub struct ImportError(pub String);

/// A source of rendered layer artwork.
pub trait VectorImporter {
    /// The extent of the artwork, in board units.
    fn bounding_box(&self) -> BoundingBox;

    /// Renders the artwork to polygons.
    ///
    /// `fill_closed_lines` fills closed zero-width outlines (used for
    /// board outlines drawn as paths); `render_paths_as_shapes` strokes
    /// open paths into thin polygons instead of dropping them; circular
    /// apertures are approximated with `points_per_circle` segments.
    fn render(
        &self,
        fill_closed_lines: bool,
        render_paths_as_shapes: bool,
        points_per_circle: usize,
    ) -> Result<MultiPolygon, ImportError>;
}
