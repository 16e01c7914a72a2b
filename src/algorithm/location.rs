//! Point-in-geometry classification.

use crate::algorithm::orientation::orientation_index;
use crate::geom::{Coordinate, Envelope, Geometry, Location, Polygon};

/// Counts crossings of a rightward horizontal ray from a query point against
/// ring segments, detecting boundary contact along the way.
struct RayCrossingCounter {
    point: Coordinate,
    crossing_count: usize,
    on_segment: bool,
}

impl RayCrossingCounter {
    fn new(point: Coordinate) -> Self {
        Self {
            point,
            crossing_count: 0,
            on_segment: false,
        }
    }

    fn count_segment(&mut self, p1: &Coordinate, p2: &Coordinate) {
        let p = &self.point;

        // Entirely to the left of the ray origin.
        if p1.x < p.x && p2.x < p.x {
            return;
        }

        // In a closed ring every vertex appears as the second point of some
        // segment, so this catches exact vertex hits.
        if p.equals_2d(p2) {
            self.on_segment = true;
            return;
        }

        if p1.y == p.y && p2.y == p.y {
            let min_x = p1.x.min(p2.x);
            let max_x = p1.x.max(p2.x);
            if p.x >= min_x && p.x <= max_x {
                self.on_segment = true;
            }
            return;
        }

        if ((p1.y > p.y) && (p2.y <= p.y)) || ((p2.y > p.y) && (p1.y <= p.y)) {
            let mut sign = orientation_index(p1, p2, p);
            if sign == 0 {
                self.on_segment = true;
                return;
            }
            if p2.y < p1.y {
                sign = -sign;
            }
            if sign > 0 {
                self.crossing_count += 1;
            }
        }
    }

    fn location(&self) -> Location {
        if self.on_segment {
            Location::Boundary
        } else if self.crossing_count % 2 == 1 {
            Location::Interior
        } else {
            Location::Exterior
        }
    }
}

/// Locates a point relative to a ring, which may be open or closed (an open
/// ring is closed implicitly).
pub fn locate_point_in_ring(p: &Coordinate, ring: &[Coordinate]) -> Location {
    if ring.len() < 3 {
        return Location::Exterior;
    }
    let mut counter = RayCrossingCounter::new(*p);
    let n = ring.len();
    for i in 0..n {
        let j = (i + 1) % n;
        if ring[i] == ring[j] {
            continue;
        }
        counter.count_segment(&ring[i], &ring[j]);
    }
    counter.location()
}

/// Tests whether a point lies on any segment of a chain.
fn is_on_line(p: &Coordinate, coords: &[Coordinate]) -> bool {
    for w in coords.windows(2) {
        let (p0, p1) = (&w[0], &w[1]);
        if !Envelope::from_coordinates(p0, p1).contains(p) {
            continue;
        }
        if orientation_index(p0, p1, p) == 0 {
            return true;
        }
    }
    false
}

fn locate_in_polygon(p: &Coordinate, poly: &Polygon) -> Location {
    if poly.shell.coords.is_empty() {
        return Location::Exterior;
    }
    let shell_loc = locate_point_in_ring(p, &poly.shell.coords);
    if shell_loc == Location::Exterior {
        return Location::Exterior;
    }
    if shell_loc == Location::Boundary {
        return Location::Boundary;
    }
    for hole in &poly.holes {
        match locate_point_in_ring(p, &hole.coords) {
            Location::Interior => return Location::Exterior,
            Location::Boundary => return Location::Boundary,
            _ => {}
        }
    }
    Location::Interior
}

/// Classifies points against whole geometries under the OGC boundary rule
/// (mod-2 across components).
#[derive(Debug, Default)]
pub struct PointLocator;

impl PointLocator {
    pub fn new() -> Self {
        Self
    }

    /// Locates `p` relative to `geom`, returning `Interior`, `Boundary` or
    /// `Exterior`.
    pub fn locate(&self, p: &Coordinate, geom: &Geometry) -> Location {
        if geom.is_empty() {
            return Location::Exterior;
        }
        let mut is_in = false;
        let mut boundary_count = 0usize;
        Self::compute_location(p, geom, &mut is_in, &mut boundary_count);
        if boundary_count % 2 == 1 {
            return Location::Boundary;
        }
        if boundary_count > 0 || is_in {
            return Location::Interior;
        }
        Location::Exterior
    }

    fn update_location(loc: Location, is_in: &mut bool, boundary_count: &mut usize) {
        match loc {
            Location::Interior => *is_in = true,
            Location::Boundary => *boundary_count += 1,
            _ => {}
        }
    }

    fn compute_location(
        p: &Coordinate,
        geom: &Geometry,
        is_in: &mut bool,
        boundary_count: &mut usize,
    ) {
        match geom {
            Geometry::Point(pt) => {
                if pt.coord == Some(*p) {
                    Self::update_location(Location::Interior, is_in, boundary_count);
                }
            }
            Geometry::MultiPoint(mp) => {
                for pt in &mp.points {
                    if pt.coord == Some(*p) {
                        Self::update_location(Location::Interior, is_in, boundary_count);
                    }
                }
            }
            Geometry::LineString(line) => {
                let loc = Self::locate_on_line(p, &line.coords, line.is_closed());
                Self::update_location(loc, is_in, boundary_count);
            }
            Geometry::LinearRing(ring) => {
                // A ring is closed, so it has no boundary points.
                let loc = Self::locate_on_line(p, &ring.coords, true);
                Self::update_location(loc, is_in, boundary_count);
            }
            Geometry::MultiLineString(ml) => {
                for line in &ml.lines {
                    let loc = Self::locate_on_line(p, &line.coords, line.is_closed());
                    Self::update_location(loc, is_in, boundary_count);
                }
            }
            Geometry::Polygon(poly) => {
                Self::update_location(locate_in_polygon(p, poly), is_in, boundary_count);
            }
            Geometry::MultiPolygon(mp) => {
                for poly in &mp.polygons {
                    Self::update_location(locate_in_polygon(p, poly), is_in, boundary_count);
                }
            }
            Geometry::GeometryCollection(gc) => {
                for g in &gc.geometries {
                    Self::compute_location(p, g, is_in, boundary_count);
                }
            }
        }
    }

    fn locate_on_line(p: &Coordinate, coords: &[Coordinate], closed: bool) -> Location {
        if coords.len() < 2 {
            return Location::Exterior;
        }
        if !closed && (p == &coords[0] || p == &coords[coords.len() - 1]) {
            return Location::Boundary;
        }
        if is_on_line(p, coords) {
            Location::Interior
        } else {
            Location::Exterior
        }
    }
}

/// Locates a point against the areal components only; every non-polygonal
/// component is transparent (EXTERIOR).
///
/// Node-star labelling uses this cheaper classification, while incomplete
/// nodes are resolved with the full [`PointLocator`]; the distinction keeps
/// 0-dimensional crossings out of 1-dimensional results.
pub fn locate_in_areas(p: &Coordinate, geom: &Geometry) -> Location {
    match geom {
        Geometry::Polygon(poly) => locate_in_polygon(p, poly),
        Geometry::MultiPolygon(mp) => {
            for poly in &mp.polygons {
                let loc = locate_in_polygon(p, poly);
                if loc != Location::Exterior {
                    return loc;
                }
            }
            Location::Exterior
        }
        Geometry::GeometryCollection(gc) => {
            for g in &gc.geometries {
                let loc = locate_in_areas(p, g);
                if loc != Location::Exterior {
                    return loc;
                }
            }
            Location::Exterior
        }
        _ => Location::Exterior,
    }
}
