//! Error types for overlay and union operations.

use crate::geom::Coordinate;
use thiserror::Error;

/// Errors raised when an overlay detects a structurally invalid intermediate
/// state.
///
/// `NodingFailure` is the recoverable kind: the snap-if-needed wrapper catches
/// it (and every other kind) and retries the overlay on snapped inputs. An
/// error surfaces to the caller only when the snapped attempt fails as well,
/// in which case the originally raised error is preserved.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TopologyError {
    /// The noded edge set still contains an interior intersection.
    #[error("found non-noded intersection at or near ({}, {})", .0.x, .0.y)]
    NodingFailure(Coordinate),

    /// A result hole could not be assigned to any enclosing shell.
    #[error("unable to assign hole to a shell at or near ({}, {})", .0.x, .0.y)]
    OrphanHole(Coordinate),

    /// The labelled graph reached a state the algorithms cannot make
    /// consistent (side-location conflicts, broken ring traversals).
    #[error("robustness failure: {0}")]
    Robustness(String),
}

impl TopologyError {
    /// A robustness failure anchored at a coordinate.
    pub(crate) fn robustness_at(msg: &str, c: Coordinate) -> Self {
        TopologyError::Robustness(format!("{} at or near ({}, {})", msg, c.x, c.y))
    }
}
