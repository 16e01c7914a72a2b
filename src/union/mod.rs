//! Union strategies: cascaded batch union, overlap-partitioned pairwise
//! union, and the dimension-partitioned unary union driver.

mod cascaded;
mod overlap;

pub use cascaded::CascadedUnion;
pub use overlap::OverlapUnion;

use crate::algorithm::PointLocator;
use crate::error::TopologyError;
use crate::geom::{Coordinate, Geometry, GeometryFactory, Location};
use crate::overlay::{overlay, BooleanOp};
use std::collections::BTreeSet;

/// A zero-distance buffer provider, used only as the last-resort union
/// fallback when the topology-based overlay fails.
///
/// Buffering is an external collaborator of the overlay core; batch unions
/// accept an implementation through
/// [`with_buffer_fallback`](CascadedUnion::with_buffer_fallback). With no
/// provider configured, the overlay error propagates instead.
pub trait ZeroBuffer {
    fn buffer_zero(&self, geom: &Geometry) -> Result<Geometry, TopologyError>;
}

/// Unions a batch of polygonal geometries; `None` for an empty batch.
///
/// # Example
///
/// ```
/// use approx::assert_relative_eq;
/// use planarum::{cascaded_union, Coordinate, GeometryFactory};
///
/// let f = GeometryFactory::default();
/// let squares: Vec<_> = (0..3)
///     .map(|i| {
///         let x = i as f64;
///         f.create_polygon(
///             f.create_linear_ring(vec![
///                 Coordinate::new(x, 0.0),
///                 Coordinate::new(x + 1.0, 0.0),
///                 Coordinate::new(x + 1.0, 1.0),
///                 Coordinate::new(x, 1.0),
///                 Coordinate::new(x, 0.0),
///             ]),
///             vec![],
///         )
///     })
///     .collect();
/// let union = cascaded_union(squares).unwrap().unwrap();
/// assert_relative_eq!(union.area(), 3.0, epsilon = 1e-9);
/// ```
pub fn cascaded_union(polygons: Vec<Geometry>) -> Result<Option<Geometry>, TopologyError> {
    CascadedUnion::new(polygons).union()
}

/// Unions any collection of geometries, partitioned by dimension: points
/// and lines dissolve through the overlay, polygons through the cascaded
/// union, and the partial results are composed so that only points exterior
/// to the line/area union survive.
///
/// Returns `None` when no factory is supplied and none can be derived from
/// the inputs. An all-empty input yields the empty atomic geometry of the
/// highest dimension seen.
pub fn unary_union(
    geoms: &[Geometry],
    factory: Option<GeometryFactory>,
) -> Result<Option<Geometry>, TopologyError> {
    let factory = match factory.or_else(|| geoms.first().map(Geometry::factory)) {
        Some(f) => f,
        None => return Ok(None),
    };

    let mut points = Vec::new();
    let mut lines = Vec::new();
    let mut polygons = Vec::new();
    let mut max_dimension = -1;
    for g in geoms {
        max_dimension = max_dimension.max(g.dimension());
        g.extract_points(&mut points);
        g.extract_lines(&mut lines);
        g.extract_polygons(&mut polygons);
    }

    let union_points = if points.is_empty() {
        None
    } else {
        Some(union_no_opt(factory.build_geometry(points), &factory)?)
    };
    let union_lines = if lines.is_empty() {
        None
    } else {
        Some(union_no_opt(factory.build_geometry(lines), &factory)?)
    };
    let union_polygons = CascadedUnion::new(polygons).union()?;

    // Union the lines and polygons first; the points are merged afterwards
    // without further overlay.
    let union_la = union_with_null(union_lines, union_polygons)?;
    let union = match (union_points, union_la) {
        (None, la) => la,
        (pts, None) => pts,
        (Some(pts), Some(la)) => Some(point_geometry_union(&pts, &la, &factory)),
    };

    match union {
        Some(g) => Ok(Some(g)),
        None => Ok(Some(factory.create_empty(max_dimension))),
    }
}

/// Overlay union of a geometry with an empty point: dissolves duplicate
/// points and nodes-and-dissolves linework without any optimisation
/// shortcuts.
fn union_no_opt(g: Geometry, factory: &GeometryFactory) -> Result<Geometry, TopologyError> {
    let empty_point = factory.create_empty_point();
    overlay(&g, &empty_point, BooleanOp::Union)
}

/// Union tolerating an absent side.
fn union_with_null(
    g0: Option<Geometry>,
    g1: Option<Geometry>,
) -> Result<Option<Geometry>, TopologyError> {
    match (g0, g1) {
        (None, None) => Ok(None),
        (Some(g), None) | (None, Some(g)) => Ok(Some(g)),
        (Some(a), Some(b)) => overlay(&a, &b, BooleanOp::Union).map(Some),
    }
}

/// Unions a puntal geometry with another geometry by keeping only the
/// points located exterior to it; no overlay is involved.
fn point_geometry_union(
    points: &Geometry,
    other: &Geometry,
    factory: &GeometryFactory,
) -> Geometry {
    let locator = PointLocator::new();
    let mut seen = BTreeSet::new();
    let mut exterior: Vec<Coordinate> = Vec::new();
    points.apply_coordinate_sequences(&mut |seq| {
        for c in seq {
            if locator.locate(c, other) == Location::Exterior && seen.insert(c.key()) {
                exterior.push(*c);
            }
        }
    });

    if exterior.is_empty() {
        return other.clone();
    }
    let pt_component = if exterior.len() == 1 {
        factory.create_point(exterior[0])
    } else {
        factory.create_multi_point(exterior)
    };
    combine(vec![pt_component, other.clone()], factory)
}

/// Combines geometries structurally (no overlay): multis are flattened one
/// level, empties dropped, and the most specific collection type built.
pub(crate) fn combine(geoms: Vec<Geometry>, factory: &GeometryFactory) -> Geometry {
    let mut elements = Vec::new();
    for g in geoms {
        for component in g.components() {
            if !component.is_empty() {
                elements.push(component);
            }
        }
    }
    factory.build_geometry(elements)
}
