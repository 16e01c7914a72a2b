//! Geometry construction and precision control.

use crate::geom::geometry::{
    Geometry, GeometryCollection, LineString, LinearRing, MultiLineString, MultiPoint,
    MultiPolygon, Point, Polygon,
};
use crate::geom::Coordinate;

/// The coordinate precision a factory stamps onto its geometries.
///
/// `Floating` keeps full double precision. `Fixed { scale }` models a grid of
/// spacing `1/scale`; computed coordinates (intersection points) are rounded
/// onto the grid, and the snapping layer derives its fixed-grid tolerance
/// from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrecisionModel {
    Floating,
    Fixed { scale: f64 },
}

impl PrecisionModel {
    /// Rounds an ordinate onto the model's grid. A floating model is the
    /// identity.
    #[inline]
    pub fn make_precise(&self, v: f64) -> f64 {
        match self {
            PrecisionModel::Floating => v,
            PrecisionModel::Fixed { scale } => (v * scale).round() / scale,
        }
    }

    /// Rounds a coordinate onto the model's grid.
    #[inline]
    pub fn make_coordinate_precise(&self, c: &mut Coordinate) {
        c.x = self.make_precise(c.x);
        c.y = self.make_precise(c.y);
    }
}

impl Default for PrecisionModel {
    fn default() -> Self {
        PrecisionModel::Floating
    }
}

/// Creates geometries carrying a shared precision model.
///
/// The factory is a small value type; every geometry it creates stores a copy,
/// so `Geometry::factory()` can rebuild results with the same precision.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeometryFactory {
    pub precision_model: PrecisionModel,
}

impl GeometryFactory {
    pub fn new(precision_model: PrecisionModel) -> Self {
        Self { precision_model }
    }

    pub fn create_point(&self, coord: Coordinate) -> Geometry {
        Geometry::Point(Point {
            coord: Some(coord),
            factory: *self,
        })
    }

    pub fn create_empty_point(&self) -> Geometry {
        Geometry::Point(Point {
            coord: None,
            factory: *self,
        })
    }

    pub fn create_line_string(&self, coords: Vec<Coordinate>) -> Geometry {
        debug_assert!(coords.len() != 1, "line string needs 0 or >= 2 coordinates");
        Geometry::LineString(LineString {
            coords,
            factory: *self,
        })
    }

    /// Creates a ring. Non-empty rings must be closed with at least 4
    /// coordinates.
    pub fn create_linear_ring(&self, coords: Vec<Coordinate>) -> LinearRing {
        debug_assert!(
            coords.is_empty() || (coords.len() >= 4 && coords[0] == coords[coords.len() - 1]),
            "linear ring must be closed with >= 4 coordinates"
        );
        LinearRing {
            coords,
            factory: *self,
        }
    }

    pub fn create_polygon(&self, shell: LinearRing, holes: Vec<LinearRing>) -> Geometry {
        Geometry::Polygon(Polygon {
            shell,
            holes,
            factory: *self,
        })
    }

    pub fn create_empty_polygon(&self) -> Geometry {
        self.create_polygon(self.create_linear_ring(vec![]), vec![])
    }

    pub fn create_multi_point(&self, coords: Vec<Coordinate>) -> Geometry {
        Geometry::MultiPoint(MultiPoint {
            points: coords
                .into_iter()
                .map(|c| Point {
                    coord: Some(c),
                    factory: *self,
                })
                .collect(),
            factory: *self,
        })
    }

    pub fn create_multi_line_string(&self, lines: Vec<LineString>) -> Geometry {
        Geometry::MultiLineString(MultiLineString {
            lines,
            factory: *self,
        })
    }

    pub fn create_multi_polygon(&self, polygons: Vec<Polygon>) -> Geometry {
        Geometry::MultiPolygon(MultiPolygon {
            polygons,
            factory: *self,
        })
    }

    pub fn create_geometry_collection(&self, geometries: Vec<Geometry>) -> Geometry {
        Geometry::GeometryCollection(GeometryCollection {
            geometries,
            factory: *self,
        })
    }

    /// Builds the most specific geometry for a list of components.
    ///
    /// A single component is returned as itself; a homogeneous list becomes
    /// the matching multi-geometry; a mixed list becomes a collection. An
    /// empty list becomes an empty collection.
    pub fn build_geometry(&self, geoms: Vec<Geometry>) -> Geometry {
        if geoms.is_empty() {
            return self.create_geometry_collection(vec![]);
        }
        if geoms.len() == 1 {
            return geoms.into_iter().next().unwrap();
        }

        let all_points = geoms.iter().all(|g| matches!(g, Geometry::Point(_)));
        if all_points {
            let points = geoms
                .into_iter()
                .map(|g| match g {
                    Geometry::Point(p) => p,
                    _ => unreachable!(),
                })
                .collect();
            return Geometry::MultiPoint(MultiPoint {
                points,
                factory: *self,
            });
        }

        let all_lines = geoms.iter().all(|g| matches!(g, Geometry::LineString(_)));
        if all_lines {
            let lines = geoms
                .into_iter()
                .map(|g| match g {
                    Geometry::LineString(l) => l,
                    _ => unreachable!(),
                })
                .collect();
            return self.create_multi_line_string(lines);
        }

        let all_polys = geoms.iter().all(|g| matches!(g, Geometry::Polygon(_)));
        if all_polys {
            let polygons = geoms
                .into_iter()
                .map(|g| match g {
                    Geometry::Polygon(p) => p,
                    _ => unreachable!(),
                })
                .collect();
            return self.create_multi_polygon(polygons);
        }

        self.create_geometry_collection(geoms)
    }

    /// Creates an empty atomic geometry of the given dimension: 0 gives a
    /// point, 1 a line string, 2 a polygon, anything else an empty
    /// collection.
    pub fn create_empty(&self, dimension: i32) -> Geometry {
        match dimension {
            0 => self.create_empty_point(),
            1 => self.create_line_string(vec![]),
            2 => self.create_empty_polygon(),
            _ => self.create_geometry_collection(vec![]),
        }
    }
}
