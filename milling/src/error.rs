use thiserror::Error;

use crate::algorithms::outline_bridges::NoBridgesError;
use crate::geom::TopologyError;
use crate::import::ImportError;

/// Failures the planning pipeline can surface.
///
/// Recovery is always the caller's job: substituting a smaller tool or
/// fewer passes and retrying is a policy decision, not something the
/// core can guess. Best-effort conditions (self-intersecting input,
/// clearance contention, fewer bridges than asked) are logged warnings,
/// not errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A boundary collaborator could not parse its input.
    #[error(transparent)]
    ImportFailed(#[from] ImportError),

    /// The boolean-ops engine failed internally. The layer should be
    /// abandoned; retrying with the same operands cannot succeed.
    #[error(transparent)]
    Topology(#[from] TopologyError),

    /// The outline is too short to host even one holding tab.
    #[error(transparent)]
    NoBridges(#[from] NoBridgesError),

    /// The autoleveller probe grid exceeds what the target G-code
    /// flavor supports. Raised at the emitter boundary, carried here so
    /// callers handle one error type per layer.
    #[error("probe grid needs {needed} points but the target flavor allows {allowed}")]
    ProbePointOverflow { needed: usize, allowed: usize },
}
