//! Parameters for the per-layer planners, plus the types shared with
//! the G-code emitter boundary.

use crate::algorithms::backtrack::MillingTimes;
use crate::geom::MultiPolygon;

/// Constraint on the cutting direction of closed paths.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum MillFeedDirection {
    /// Either direction; paths may be reversed by the optimisers.
    Any,
    /// Climb milling: the stored direction must be preserved.
    Climb,
    /// Conventional milling: the stored direction must be preserved.
    Conventional,
}

/// Parameters for isolating one layer.
///
/// ```
/// use isoroute_milling::IsolationParams;
///
/// let params = IsolationParams::tool_diameter(0.012)
///     .with_extra_passes(2)
///     .with_voronoi(true);
/// # assert_eq!(params.extra_passes, 2);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct IsolationParams {
    /// Cutting tool diameter, board units.
    pub tool_diameter: f64,
    /// Isolation passes beyond the first, each spaced by the pass
    /// overlap.
    pub extra_passes: usize,
    /// Fraction of the tool diameter by which consecutive passes
    /// overlap, in `[0, 1)`.
    pub overlap: f64,
    /// Isolate along the voronoi boundary between conductors instead of
    /// hugging each conductor.
    pub voronoi: bool,
    /// Keep holes that no other conductor encroaches on as milled
    /// features even in voronoi mode.
    pub preserve_thermal_reliefs: bool,
    /// Sampling tolerance for curved voronoi arcs, board units.
    pub tolerance: f64,
    /// Rebuild the generated rings into a minimal number of trails.
    pub eulerian_paths: bool,
    /// Price backtracks against rapid moves; `None` disables the
    /// backtrack planner.
    pub times: Option<MillingTimes>,
    /// Run 2-opt after the nearest-neighbour ordering.
    pub tsp_2opt: bool,
    /// Directional constraint applied to the generated rings.
    pub mill_feed_direction: MillFeedDirection,
    /// Restrict milling to this region instead of the layer bounding
    /// box.
    pub mask: Option<MultiPolygon>,
}

impl IsolationParams {
    pub const DEFAULT_OVERLAP: f64 = 0.5;
    pub const DEFAULT_TOLERANCE: f64 = 0.0001;

    pub fn tool_diameter(tool_diameter: f64) -> IsolationParams {
        IsolationParams {
            tool_diameter,
            extra_passes: 0,
            overlap: Self::DEFAULT_OVERLAP,
            voronoi: false,
            preserve_thermal_reliefs: true,
            tolerance: Self::DEFAULT_TOLERANCE,
            eulerian_paths: true,
            times: None,
            tsp_2opt: true,
            mill_feed_direction: MillFeedDirection::Any,
            mask: None,
        }
    }

    pub fn with_extra_passes(mut self, extra_passes: usize) -> Self {
        self.extra_passes = extra_passes;
        self
    }

    pub fn with_overlap(mut self, overlap: f64) -> Self {
        self.overlap = overlap;
        self
    }

    pub fn with_voronoi(mut self, voronoi: bool) -> Self {
        self.voronoi = voronoi;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_times(mut self, times: MillingTimes) -> Self {
        self.times = Some(times);
        self
    }

    pub fn with_mask(mut self, mask: MultiPolygon) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn with_mill_feed_direction(mut self, direction: MillFeedDirection) -> Self {
        self.mill_feed_direction = direction;
        self
    }
}

/// Parameters for the outline cutter.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct CutterParams {
    /// Cutting tool diameter, board units.
    pub tool_diameter: f64,
    /// Number of holding tabs to leave on the outline.
    pub bridges_num: usize,
    /// Width of each holding tab, board units.
    pub bridges_width: f64,
    /// Radial step between concentric passes when milling out holes
    /// larger than the tool. Zero or negative means a single pass.
    pub step_size: f64,
}

impl CutterParams {
    pub fn tool_diameter(tool_diameter: f64) -> CutterParams {
        CutterParams {
            tool_diameter,
            bridges_num: 0,
            bridges_width: 0.0,
            step_size: 0.0,
        }
    }

    pub fn with_bridges(mut self, num: usize, width: f64) -> Self {
        self.bridges_num = num;
        self.bridges_width = width;
        self
    }

    pub fn with_step_size(mut self, step_size: f64) -> Self {
        self.step_size = step_size;
        self
    }
}

/// The G-code dialect of the consuming CAM setup. Interpretation is
/// entirely the emitter's business.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum Flavor {
    LinuxCnc,
    Mach3,
    Mach4,
    Custom,
}

/// Repetition of the board across the stock, handed through to the
/// emitter untouched.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct TileInfo {
    pub rows: usize,
    pub cols: usize,
    /// Column pitch, board units.
    pub dx: f64,
    /// Row pitch, board units.
    pub dy: f64,
    pub flavor: Flavor,
}
