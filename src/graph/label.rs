//! Topological labels for edges, directed edges and nodes.

use crate::geom::Location;
use std::fmt;

/// A position relative to a directed edge: the edge itself, or one of its
/// sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    On,
    Left,
    Right,
}

/// The location of one input geometry relative to an edge.
///
/// A `Line` location classifies only the edge itself; an `Area` location also
/// classifies the two sides. Merging a line into an area keeps the area
/// shape; merging an area into a line promotes the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyLocation {
    Line {
        on: Location,
    },
    Area {
        on: Location,
        left: Location,
        right: Location,
    },
}

impl TopologyLocation {
    #[inline]
    pub fn line_null() -> Self {
        TopologyLocation::Line { on: Location::None }
    }

    #[inline]
    pub fn area_null() -> Self {
        TopologyLocation::Area {
            on: Location::None,
            left: Location::None,
            right: Location::None,
        }
    }

    #[inline]
    pub fn is_area(&self) -> bool {
        matches!(self, TopologyLocation::Area { .. })
    }

    #[inline]
    pub fn is_line(&self) -> bool {
        matches!(self, TopologyLocation::Line { .. })
    }

    /// All locations are unknown.
    pub fn is_null(&self) -> bool {
        match self {
            TopologyLocation::Line { on } => *on == Location::None,
            TopologyLocation::Area { on, left, right } => {
                *on == Location::None && *left == Location::None && *right == Location::None
            }
        }
    }

    /// Some location is unknown.
    pub fn is_any_null(&self) -> bool {
        match self {
            TopologyLocation::Line { on } => *on == Location::None,
            TopologyLocation::Area { on, left, right } => {
                *on == Location::None || *left == Location::None || *right == Location::None
            }
        }
    }

    pub fn get(&self, pos: Position) -> Location {
        match self {
            TopologyLocation::Line { on } => match pos {
                Position::On => *on,
                _ => Location::None,
            },
            TopologyLocation::Area { on, left, right } => match pos {
                Position::On => *on,
                Position::Left => *left,
                Position::Right => *right,
            },
        }
    }

    /// Sets a location. Setting a side of a line location is a logic error.
    pub fn set(&mut self, pos: Position, loc: Location) {
        match self {
            TopologyLocation::Line { on } => {
                debug_assert!(pos == Position::On, "side location on a line label");
                if pos == Position::On {
                    *on = loc;
                }
            }
            TopologyLocation::Area { on, left, right } => match pos {
                Position::On => *on = loc,
                Position::Left => *left = loc,
                Position::Right => *right = loc,
            },
        }
    }

    /// Exchanges the side locations; the on location is kept.
    pub fn flip(&mut self) {
        if let TopologyLocation::Area { left, right, .. } = self {
            std::mem::swap(left, right);
        }
    }

    /// Collapses to a line location keeping the on location.
    pub fn to_line(&mut self) {
        if let TopologyLocation::Area { on, .. } = self {
            *self = TopologyLocation::Line { on: *on };
        }
    }

    /// Every defined slot equals `loc`.
    pub fn all_positions_equal(&self, loc: Location) -> bool {
        match self {
            TopologyLocation::Line { on } => *on == loc,
            TopologyLocation::Area { on, left, right } => {
                *on == loc && *left == loc && *right == loc
            }
        }
    }

    /// Fills every unknown slot with `loc`.
    pub fn set_all_if_null(&mut self, loc: Location) {
        match self {
            TopologyLocation::Line { on } => {
                if *on == Location::None {
                    *on = loc;
                }
            }
            TopologyLocation::Area { on, left, right } => {
                for slot in [on, left, right] {
                    if *slot == Location::None {
                        *slot = loc;
                    }
                }
            }
        }
    }

    /// Merges locations from `other`, filling only unknown slots. A line
    /// location is promoted to an area location when `other` is one.
    pub fn merge(&mut self, other: &TopologyLocation) {
        if other.is_area() && self.is_line() {
            let on = self.get(Position::On);
            *self = TopologyLocation::Area {
                on,
                left: Location::None,
                right: Location::None,
            };
        }
        for pos in [Position::On, Position::Left, Position::Right] {
            if self.get(pos) == Location::None && other.get(pos) != Location::None {
                if self.is_line() && pos != Position::On {
                    continue;
                }
                self.set(pos, other.get(pos));
            }
        }
    }
}

/// The topological classification of a graph component relative to the two
/// input geometries, one [`TopologyLocation`] per argument index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label {
    elt: [TopologyLocation; 2],
}

impl Label {
    /// A label with two unknown line locations (the initial node label).
    pub fn new_null() -> Self {
        Self {
            elt: [TopologyLocation::line_null(); 2],
        }
    }

    /// A line label for one argument; the other argument is an unknown line.
    pub fn new_line(arg: usize, on: Location) -> Self {
        let mut l = Self::new_null();
        l.elt[arg] = TopologyLocation::Line { on };
        l
    }

    /// An area label for one argument; the other argument is an unknown
    /// area (so that merged labels stay area-shaped).
    pub fn new_area(arg: usize, on: Location, left: Location, right: Location) -> Self {
        let mut l = Self {
            elt: [TopologyLocation::area_null(); 2],
        };
        l.elt[arg] = TopologyLocation::Area { on, left, right };
        l
    }

    #[inline]
    pub fn elt(&self, arg: usize) -> &TopologyLocation {
        &self.elt[arg]
    }

    /// The on location for an argument.
    #[inline]
    pub fn location(&self, arg: usize) -> Location {
        self.elt[arg].get(Position::On)
    }

    #[inline]
    pub fn location_at(&self, arg: usize, pos: Position) -> Location {
        self.elt[arg].get(pos)
    }

    #[inline]
    pub fn set_location(&mut self, arg: usize, loc: Location) {
        self.elt[arg].set(Position::On, loc);
    }

    #[inline]
    pub fn set_location_at(&mut self, arg: usize, pos: Position, loc: Location) {
        self.elt[arg].set(pos, loc);
    }

    pub fn set_all_locations_if_null(&mut self, arg: usize, loc: Location) {
        self.elt[arg].set_all_if_null(loc);
    }

    /// True when the argument contributes nothing to this label.
    #[inline]
    pub fn is_null(&self, arg: usize) -> bool {
        self.elt[arg].is_null()
    }

    #[inline]
    pub fn is_any_null(&self, arg: usize) -> bool {
        self.elt[arg].is_any_null()
    }

    /// True when either argument has side locations.
    #[inline]
    pub fn is_area(&self) -> bool {
        self.elt[0].is_area() || self.elt[1].is_area()
    }

    #[inline]
    pub fn is_area_arg(&self, arg: usize) -> bool {
        self.elt[arg].is_area()
    }

    #[inline]
    pub fn is_line_arg(&self, arg: usize) -> bool {
        self.elt[arg].is_line()
    }

    pub fn all_positions_equal(&self, arg: usize, loc: Location) -> bool {
        self.elt[arg].all_positions_equal(loc)
    }

    /// Collapses the argument's location to a line, keeping its on location.
    pub fn to_line(&mut self, arg: usize) {
        self.elt[arg].to_line();
    }

    /// Exchanges left and right on both arguments.
    pub fn flip(&mut self) {
        self.elt[0].flip();
        self.elt[1].flip();
    }

    /// Merges `other` into this label, filling unknown slots only.
    pub fn merge(&mut self, other: &Label) {
        self.elt[0].merge(&other.elt[0]);
        self.elt[1].merge(&other.elt[1]);
    }

    /// Number of arguments with any known location.
    pub fn geometry_count(&self) -> usize {
        self.elt.iter().filter(|e| !e.is_null()).count()
    }

    /// A line label carrying the on locations of `label`.
    pub fn to_line_label(label: &Label) -> Label {
        let mut l = Label::new_null();
        for arg in 0..2 {
            l.elt[arg] = TopologyLocation::Line {
                on: label.location(arg),
            };
        }
        l
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.elt.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            match e {
                TopologyLocation::Line { on } => write!(f, "{}", on)?,
                TopologyLocation::Area { on, left, right } => {
                    write!(f, "{}{}{}", left, on, right)?
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_swaps_sides() {
        let mut l = Label::new_area(0, Location::Boundary, Location::Exterior, Location::Interior);
        l.flip();
        assert_eq!(l.location_at(0, Position::Left), Location::Interior);
        assert_eq!(l.location_at(0, Position::Right), Location::Exterior);
        assert_eq!(l.location_at(0, Position::On), Location::Boundary);
    }

    #[test]
    fn test_merge_fills_nulls_only() {
        let mut a = Label::new_area(0, Location::Boundary, Location::Exterior, Location::Interior);
        let b = Label::new_area(0, Location::Interior, Location::Interior, Location::Interior);
        a.merge(&b);
        // Nothing changes: a had no null slots for argument 0.
        assert_eq!(a.location_at(0, Position::Left), Location::Exterior);

        let c = Label::new_area(1, Location::Boundary, Location::Interior, Location::Exterior);
        a.merge(&c);
        assert_eq!(a.location_at(1, Position::Left), Location::Interior);
    }

    #[test]
    fn test_merge_promotes_line_to_area() {
        let mut a = Label::new_line(0, Location::Interior);
        let b = Label::new_area(0, Location::Boundary, Location::Exterior, Location::Interior);
        a.merge(&b);
        assert!(a.is_area_arg(0));
        // The on location from the line is kept; sides come from the area.
        assert_eq!(a.location(0), Location::Interior);
        assert_eq!(a.location_at(0, Position::Left), Location::Exterior);
    }

    #[test]
    fn test_to_line_collapses() {
        let mut l = Label::new_area(1, Location::Boundary, Location::Interior, Location::Interior);
        l.to_line(1);
        assert!(l.is_line_arg(1));
        assert_eq!(l.location(1), Location::Boundary);
    }

    #[test]
    fn test_geometry_count() {
        let mut l = Label::new_line(0, Location::Interior);
        assert_eq!(l.geometry_count(), 1);
        l.set_location(1, Location::Exterior);
        assert_eq!(l.geometry_count(), 2);
        assert!(!l.is_null(0));
    }
}
