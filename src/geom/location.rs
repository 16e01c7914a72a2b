//! Topological location codes.

use std::fmt;

/// Where a point lies relative to a geometry, or a side of an edge relative
/// to an input geometry.
///
/// `None` marks a location that has not been computed (or does not apply);
/// the other three are the OGC interior/boundary/exterior trichotomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Location {
    #[default]
    None,
    Interior,
    Boundary,
    Exterior,
}

impl Location {
    /// True for any location other than `None`.
    #[inline]
    pub fn is_known(self) -> bool {
        self != Location::None
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Location::None => '-',
            Location::Interior => 'i',
            Location::Boundary => 'b',
            Location::Exterior => 'e',
        };
        write!(f, "{}", c)
    }
}
