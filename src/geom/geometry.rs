//! The geometry variants and their shared queries.
//!
//! Geometries are a closed set of eight concrete shapes. Capability
//! classification (puntal / lineal / polygonal) is a function over the
//! variant, not a type hierarchy, and traversal is done with closures rather
//! than visitor objects.

use crate::algorithm::orientation;
use crate::geom::factory::GeometryFactory;
use crate::geom::{Coordinate, Envelope};

/// A point; empty when it has no coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub coord: Option<Coordinate>,
    pub factory: GeometryFactory,
}

/// An open or closed chain of two or more coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct LineString {
    pub coords: Vec<Coordinate>,
    pub factory: GeometryFactory,
}

impl LineString {
    /// A line is closed when its endpoints coincide.
    pub fn is_closed(&self) -> bool {
        !self.coords.is_empty() && self.coords[0] == self.coords[self.coords.len() - 1]
    }
}

/// A closed chain (first and last coordinate identical, at least 4 entries
/// when non-empty).
#[derive(Debug, Clone, PartialEq)]
pub struct LinearRing {
    pub coords: Vec<Coordinate>,
    pub factory: GeometryFactory,
}

/// One shell ring plus zero or more hole rings.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub shell: LinearRing,
    pub holes: Vec<LinearRing>,
    pub factory: GeometryFactory,
}

impl Polygon {
    /// Area enclosed by the shell minus the hole areas.
    pub fn area(&self) -> f64 {
        let mut area = orientation::signed_area(&self.shell.coords).abs();
        for hole in &self.holes {
            area -= orientation::signed_area(&hole.coords).abs();
        }
        area
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultiPoint {
    pub points: Vec<Point>,
    pub factory: GeometryFactory,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultiLineString {
    pub lines: Vec<LineString>,
    pub factory: GeometryFactory,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultiPolygon {
    pub polygons: Vec<Polygon>,
    pub factory: GeometryFactory,
}

/// A heterogeneous, possibly nested collection.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryCollection {
    pub geometries: Vec<Geometry>,
    pub factory: GeometryFactory,
}

/// A planar geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Point),
    MultiPoint(MultiPoint),
    LineString(LineString),
    LinearRing(LinearRing),
    Polygon(Polygon),
    MultiLineString(MultiLineString),
    MultiPolygon(MultiPolygon),
    GeometryCollection(GeometryCollection),
}

impl Geometry {
    /// The factory (and with it the precision model) this geometry carries.
    pub fn factory(&self) -> GeometryFactory {
        match self {
            Geometry::Point(g) => g.factory,
            Geometry::MultiPoint(g) => g.factory,
            Geometry::LineString(g) => g.factory,
            Geometry::LinearRing(g) => g.factory,
            Geometry::Polygon(g) => g.factory,
            Geometry::MultiLineString(g) => g.factory,
            Geometry::MultiPolygon(g) => g.factory,
            Geometry::GeometryCollection(g) => g.factory,
        }
    }

    /// Topological dimension of the variant: 0 for puntal, 1 for lineal,
    /// 2 for polygonal, the maximum over components for a collection.
    ///
    /// The dimension is nominal: an empty polygon still has dimension 2. An
    /// empty collection has dimension -1.
    pub fn dimension(&self) -> i32 {
        match self {
            Geometry::Point(_) | Geometry::MultiPoint(_) => 0,
            Geometry::LineString(_) | Geometry::LinearRing(_) | Geometry::MultiLineString(_) => 1,
            Geometry::Polygon(_) | Geometry::MultiPolygon(_) => 2,
            Geometry::GeometryCollection(g) => g
                .geometries
                .iter()
                .map(|c| c.dimension())
                .max()
                .unwrap_or(-1),
        }
    }

    /// Tests whether the geometry has no coordinates at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Geometry::Point(g) => g.coord.is_none(),
            Geometry::MultiPoint(g) => g.points.iter().all(|p| p.coord.is_none()),
            Geometry::LineString(g) => g.coords.is_empty(),
            Geometry::LinearRing(g) => g.coords.is_empty(),
            Geometry::Polygon(g) => g.shell.coords.is_empty(),
            Geometry::MultiLineString(g) => g.lines.iter().all(|l| l.coords.is_empty()),
            Geometry::MultiPolygon(g) => g.polygons.iter().all(|p| p.shell.coords.is_empty()),
            Geometry::GeometryCollection(g) => g.geometries.iter().all(|c| c.is_empty()),
        }
    }

    /// True for `Point` and `MultiPoint`.
    pub fn is_puntal(&self) -> bool {
        matches!(self, Geometry::Point(_) | Geometry::MultiPoint(_))
    }

    /// True for `LineString`, `LinearRing` and `MultiLineString`.
    pub fn is_lineal(&self) -> bool {
        matches!(
            self,
            Geometry::LineString(_) | Geometry::LinearRing(_) | Geometry::MultiLineString(_)
        )
    }

    /// True for `Polygon` and `MultiPolygon`.
    pub fn is_polygonal(&self) -> bool {
        matches!(self, Geometry::Polygon(_) | Geometry::MultiPolygon(_))
    }

    /// The bounding envelope; null for an empty geometry.
    pub fn envelope(&self) -> Envelope {
        let mut env = Envelope::null();
        self.apply_coordinate_sequences(&mut |seq| {
            for c in seq {
                env.expand_to_include(c);
            }
        });
        env
    }

    /// The first coordinate encountered, if any.
    pub fn coordinate(&self) -> Option<Coordinate> {
        let mut first = None;
        self.apply_coordinate_sequences(&mut |seq| {
            if first.is_none() && !seq.is_empty() {
                first = Some(seq[0]);
            }
        });
        first
    }

    /// All coordinates in traversal order.
    pub fn coordinates(&self) -> Vec<Coordinate> {
        let mut coords = Vec::new();
        self.apply_coordinate_sequences(&mut |seq| coords.extend_from_slice(seq));
        coords
    }

    /// Number of immediate components: 1 for atomic geometries, the
    /// component count for multis and collections.
    pub fn num_geometries(&self) -> usize {
        match self {
            Geometry::MultiPoint(g) => g.points.len(),
            Geometry::MultiLineString(g) => g.lines.len(),
            Geometry::MultiPolygon(g) => g.polygons.len(),
            Geometry::GeometryCollection(g) => g.geometries.len(),
            _ => 1,
        }
    }

    /// The immediate components as owned geometries; an atomic geometry
    /// yields a clone of itself.
    pub fn components(&self) -> Vec<Geometry> {
        match self {
            Geometry::MultiPoint(g) => g.points.iter().cloned().map(Geometry::Point).collect(),
            Geometry::MultiLineString(g) => {
                g.lines.iter().cloned().map(Geometry::LineString).collect()
            }
            Geometry::MultiPolygon(g) => {
                g.polygons.iter().cloned().map(Geometry::Polygon).collect()
            }
            Geometry::GeometryCollection(g) => g.geometries.clone(),
            _ => vec![self.clone()],
        }
    }

    /// Sum of the areas of all polygonal components.
    pub fn area(&self) -> f64 {
        match self {
            Geometry::Polygon(p) => p.area(),
            Geometry::MultiPolygon(mp) => mp.polygons.iter().map(Polygon::area).sum(),
            Geometry::GeometryCollection(g) => g.geometries.iter().map(Geometry::area).sum(),
            _ => 0.0,
        }
    }

    /// Applies `f` to every coordinate sequence (ring chains, line chains,
    /// single-point slices), recursing through collections.
    pub fn apply_coordinate_sequences(&self, f: &mut dyn FnMut(&[Coordinate])) {
        match self {
            Geometry::Point(g) => {
                if let Some(c) = g.coord {
                    f(&[c]);
                }
            }
            Geometry::MultiPoint(g) => {
                for p in &g.points {
                    if let Some(c) = p.coord {
                        f(&[c]);
                    }
                }
            }
            Geometry::LineString(g) => f(&g.coords),
            Geometry::LinearRing(g) => f(&g.coords),
            Geometry::Polygon(g) => {
                f(&g.shell.coords);
                for hole in &g.holes {
                    f(&hole.coords);
                }
            }
            Geometry::MultiLineString(g) => {
                for l in &g.lines {
                    f(&l.coords);
                }
            }
            Geometry::MultiPolygon(g) => {
                for p in &g.polygons {
                    f(&p.shell.coords);
                    for hole in &p.holes {
                        f(&hole.coords);
                    }
                }
            }
            Geometry::GeometryCollection(g) => {
                for c in &g.geometries {
                    c.apply_coordinate_sequences(f);
                }
            }
        }
    }

    /// Applies `f` to every coordinate, in place.
    pub fn apply_coordinates_mut(&mut self, f: &mut dyn FnMut(&mut Coordinate)) {
        match self {
            Geometry::Point(g) => {
                if let Some(c) = g.coord.as_mut() {
                    f(c);
                }
            }
            Geometry::MultiPoint(g) => {
                for p in &mut g.points {
                    if let Some(c) = p.coord.as_mut() {
                        f(c);
                    }
                }
            }
            Geometry::LineString(g) => g.coords.iter_mut().for_each(&mut *f),
            Geometry::LinearRing(g) => g.coords.iter_mut().for_each(&mut *f),
            Geometry::Polygon(g) => {
                g.shell.coords.iter_mut().for_each(&mut *f);
                for hole in &mut g.holes {
                    hole.coords.iter_mut().for_each(&mut *f);
                }
            }
            Geometry::MultiLineString(g) => {
                for l in &mut g.lines {
                    l.coords.iter_mut().for_each(&mut *f);
                }
            }
            Geometry::MultiPolygon(g) => {
                for p in &mut g.polygons {
                    p.shell.coords.iter_mut().for_each(&mut *f);
                    for hole in &mut p.holes {
                        hole.coords.iter_mut().for_each(&mut *f);
                    }
                }
            }
            Geometry::GeometryCollection(g) => {
                for c in &mut g.geometries {
                    c.apply_coordinates_mut(f);
                }
            }
        }
    }

    /// Collects every non-empty polygonal atom, recursing through multis and
    /// collections.
    pub fn extract_polygons(&self, out: &mut Vec<Geometry>) {
        match self {
            Geometry::Polygon(p) => {
                if !p.shell.coords.is_empty() {
                    out.push(Geometry::Polygon(p.clone()));
                }
            }
            Geometry::MultiPolygon(mp) => {
                for p in &mp.polygons {
                    if !p.shell.coords.is_empty() {
                        out.push(Geometry::Polygon(p.clone()));
                    }
                }
            }
            Geometry::GeometryCollection(g) => {
                for c in &g.geometries {
                    c.extract_polygons(out);
                }
            }
            _ => {}
        }
    }

    /// Collects every non-empty lineal atom.
    pub fn extract_lines(&self, out: &mut Vec<Geometry>) {
        match self {
            Geometry::LineString(l) => {
                if !l.coords.is_empty() {
                    out.push(Geometry::LineString(l.clone()));
                }
            }
            Geometry::LinearRing(r) => {
                if !r.coords.is_empty() {
                    out.push(Geometry::LinearRing(r.clone()));
                }
            }
            Geometry::MultiLineString(ml) => {
                for l in &ml.lines {
                    if !l.coords.is_empty() {
                        out.push(Geometry::LineString(l.clone()));
                    }
                }
            }
            Geometry::GeometryCollection(g) => {
                for c in &g.geometries {
                    c.extract_lines(out);
                }
            }
            _ => {}
        }
    }

    /// Collects every non-empty point atom.
    pub fn extract_points(&self, out: &mut Vec<Geometry>) {
        match self {
            Geometry::Point(p) => {
                if p.coord.is_some() {
                    out.push(Geometry::Point(p.clone()));
                }
            }
            Geometry::MultiPoint(mp) => {
                for p in &mp.points {
                    if p.coord.is_some() {
                        out.push(Geometry::Point(p.clone()));
                    }
                }
            }
            Geometry::GeometryCollection(g) => {
                for c in &g.geometries {
                    c.extract_points(out);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::GeometryFactory;
    use approx::assert_relative_eq;

    fn factory() -> GeometryFactory {
        GeometryFactory::default()
    }

    fn unit_square(f: &GeometryFactory) -> Geometry {
        f.create_polygon(
            f.create_linear_ring(vec![
                Coordinate::new(0.0, 0.0),
                Coordinate::new(1.0, 0.0),
                Coordinate::new(1.0, 1.0),
                Coordinate::new(0.0, 1.0),
                Coordinate::new(0.0, 0.0),
            ]),
            vec![],
        )
    }

    #[test]
    fn test_dimension() {
        let f = factory();
        assert_eq!(f.create_point(Coordinate::new(0.0, 0.0)).dimension(), 0);
        assert_eq!(
            f.create_line_string(vec![Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 0.0)])
                .dimension(),
            1
        );
        assert_eq!(unit_square(&f).dimension(), 2);
        let gc = f.create_geometry_collection(vec![
            f.create_point(Coordinate::new(0.0, 0.0)),
            unit_square(&f),
        ]);
        assert_eq!(gc.dimension(), 2);
        assert_eq!(f.create_geometry_collection(vec![]).dimension(), -1);
    }

    #[test]
    fn test_empty_polygon_keeps_dimension() {
        let f = factory();
        let empty = f.create_empty(2);
        assert!(empty.is_empty());
        assert_eq!(empty.dimension(), 2);
    }

    #[test]
    fn test_classification() {
        let f = factory();
        assert!(f.create_point(Coordinate::new(1.0, 1.0)).is_puntal());
        assert!(f
            .create_line_string(vec![Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 0.0)])
            .is_lineal());
        assert!(unit_square(&f).is_polygonal());
    }

    #[test]
    fn test_envelope_and_area() {
        let f = factory();
        let sq = unit_square(&f);
        let env = sq.envelope();
        assert_eq!(env.min_x(), 0.0);
        assert_eq!(env.max_x(), 1.0);
        assert_relative_eq!(sq.area(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_polygon_area_with_hole() {
        let f = factory();
        let shell = f.create_linear_ring(vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(4.0, 0.0),
            Coordinate::new(4.0, 4.0),
            Coordinate::new(0.0, 4.0),
            Coordinate::new(0.0, 0.0),
        ]);
        let hole = f.create_linear_ring(vec![
            Coordinate::new(1.0, 1.0),
            Coordinate::new(1.0, 3.0),
            Coordinate::new(3.0, 3.0),
            Coordinate::new(3.0, 1.0),
            Coordinate::new(1.0, 1.0),
        ]);
        let poly = f.create_polygon(shell, vec![hole]);
        assert_relative_eq!(poly.area(), 12.0, epsilon = 1e-12);
    }

    #[test]
    fn test_components_roundtrip() {
        let f = factory();
        let a = unit_square(&f);
        let b = f.create_point(Coordinate::new(9.0, 9.0));
        let gc = f.create_geometry_collection(vec![a.clone(), b.clone()]);
        let comps = gc.components();
        assert_eq!(comps.len(), 2);
        assert_eq!(comps[0], a);
        assert_eq!(comps[1], b);
    }

    #[test]
    fn test_extract_by_dimension() {
        let f = factory();
        let gc = f.create_geometry_collection(vec![
            unit_square(&f),
            f.create_point(Coordinate::new(5.0, 5.0)),
            f.create_line_string(vec![Coordinate::new(0.0, 0.0), Coordinate::new(2.0, 2.0)]),
            f.create_geometry_collection(vec![f.create_point(Coordinate::new(7.0, 7.0))]),
        ]);
        let mut polys = Vec::new();
        let mut lines = Vec::new();
        let mut points = Vec::new();
        gc.extract_polygons(&mut polys);
        gc.extract_lines(&mut lines);
        gc.extract_points(&mut points);
        assert_eq!(polys.len(), 1);
        assert_eq!(lines.len(), 1);
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn test_mutating_filter_translates() {
        let f = factory();
        let mut sq = unit_square(&f);
        sq.apply_coordinates_mut(&mut |c| {
            c.x += 10.0;
            c.y += 20.0;
        });
        let env = sq.envelope();
        assert_eq!(env.min_x(), 10.0);
        assert_eq!(env.min_y(), 20.0);
    }
}
