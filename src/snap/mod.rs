//! Robustness scaffolding: geometry snapping and common-bits translation.
//!
//! The snap overlay is the second tier of the snap-if-needed strategy. It
//! removes the common coordinate bits of both inputs, self-snaps each input
//! (closing slivers), snaps the second input to the first, overlays the
//! snapped pair, and restores the common bits on the output.

mod common_bits;
mod line_snapper;

pub(crate) use common_bits::CommonBitsRemover;
pub(crate) use line_snapper::LineStringSnapper;

use crate::error::TopologyError;
use crate::geom::{Coordinate, Geometry, PrecisionModel};
use crate::overlay::{BooleanOp, OverlayOp};
use std::collections::BTreeSet;

/// Factor relating a geometry's extent to its snap tolerance.
const SNAP_PRECISION_FACTOR: f64 = 1e-9;

/// Snap tolerance from a geometry's size: a small fraction of the smaller
/// envelope extent.
fn size_based_snap_tolerance(g: &Geometry) -> f64 {
    g.envelope().min_extent() * SNAP_PRECISION_FACTOR
}

/// Snap tolerance for overlaying `g`: the size-based tolerance, widened to
/// half the grid-cell diagonal for a fixed precision model.
pub(crate) fn overlay_snap_tolerance(g: &Geometry) -> f64 {
    let mut tol = size_based_snap_tolerance(g);
    if let PrecisionModel::Fixed { scale } = g.factory().precision_model {
        let fixed_snap_tol = (1.0 / scale) * 2.0 / std::f64::consts::SQRT_2;
        if fixed_snap_tol > tol {
            tol = fixed_snap_tol;
        }
    }
    tol
}

fn overlay_snap_tolerance_pair(g0: &Geometry, g1: &Geometry) -> f64 {
    overlay_snap_tolerance(g0).min(overlay_snap_tolerance(g1))
}

/// Snaps the coordinates of one geometry to a set of snap points.
pub struct GeometrySnapper<'a> {
    geom: &'a Geometry,
    snap_tolerance: f64,
}

impl<'a> GeometrySnapper<'a> {
    pub fn new(geom: &'a Geometry, snap_tolerance: f64) -> Self {
        Self {
            geom,
            snap_tolerance,
        }
    }

    /// Snaps this geometry's vertices and segments to the vertices of
    /// `snap_geom`.
    pub fn snap_to(&self, snap_geom: &Geometry) -> Geometry {
        let snap_pts = extract_target_coordinates(snap_geom);
        let snapper = LineStringSnapper::new(self.snap_tolerance);
        transform_sequences(self.geom, &mut |seq| snapper.snap_to(seq, &snap_pts))
    }

    /// Snaps this geometry to its own vertices, closing slivers narrower
    /// than the tolerance.
    pub fn snap_to_self(&self) -> Geometry {
        let snap_pts = extract_target_coordinates(self.geom);
        let snapper =
            LineStringSnapper::new(self.snap_tolerance).allow_snapping_to_source_vertices(true);
        transform_sequences(self.geom, &mut |seq| snapper.snap_to(seq, &snap_pts))
    }
}

/// The distinct coordinates of a geometry, in a stable order.
fn extract_target_coordinates(g: &Geometry) -> Vec<Coordinate> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    g.apply_coordinate_sequences(&mut |seq| {
        for c in seq {
            if seen.insert(c.key()) {
                out.push(*c);
            }
        }
    });
    out
}

/// Rebuilds a geometry with every coordinate sequence passed through `f`.
fn transform_sequences(
    g: &Geometry,
    f: &mut dyn FnMut(&[Coordinate]) -> Vec<Coordinate>,
) -> Geometry {
    use crate::geom::{
        GeometryCollection, LineString, LinearRing, MultiLineString, MultiPoint, MultiPolygon,
        Point, Polygon,
    };

    let transform_ring = |ring: &LinearRing, f: &mut dyn FnMut(&[Coordinate]) -> Vec<Coordinate>| {
        LinearRing {
            coords: f(&ring.coords),
            factory: ring.factory,
        }
    };

    match g {
        Geometry::Point(p) => Geometry::Point(Point {
            coord: p.coord.map(|c| {
                let snapped = f(&[c]);
                snapped.first().copied().unwrap_or(c)
            }),
            factory: p.factory,
        }),
        Geometry::MultiPoint(mp) => Geometry::MultiPoint(MultiPoint {
            points: mp
                .points
                .iter()
                .map(|p| Point {
                    coord: p.coord.map(|c| {
                        let snapped = f(&[c]);
                        snapped.first().copied().unwrap_or(c)
                    }),
                    factory: p.factory,
                })
                .collect(),
            factory: mp.factory,
        }),
        Geometry::LineString(l) => Geometry::LineString(LineString {
            coords: f(&l.coords),
            factory: l.factory,
        }),
        Geometry::LinearRing(r) => Geometry::LinearRing(transform_ring(r, f)),
        Geometry::Polygon(p) => Geometry::Polygon(Polygon {
            shell: transform_ring(&p.shell, f),
            holes: p.holes.iter().map(|h| transform_ring(h, f)).collect(),
            factory: p.factory,
        }),
        Geometry::MultiLineString(ml) => Geometry::MultiLineString(MultiLineString {
            lines: ml
                .lines
                .iter()
                .map(|l| LineString {
                    coords: f(&l.coords),
                    factory: l.factory,
                })
                .collect(),
            factory: ml.factory,
        }),
        Geometry::MultiPolygon(mp) => Geometry::MultiPolygon(MultiPolygon {
            polygons: mp
                .polygons
                .iter()
                .map(|p| Polygon {
                    shell: transform_ring(&p.shell, f),
                    holes: p.holes.iter().map(|h| transform_ring(h, f)).collect(),
                    factory: p.factory,
                })
                .collect(),
            factory: mp.factory,
        }),
        Geometry::GeometryCollection(gc) => Geometry::GeometryCollection(GeometryCollection {
            geometries: gc
                .geometries
                .iter()
                .map(|child| transform_sequences(child, f))
                .collect(),
            factory: gc.factory,
        }),
    }
}

/// Overlays two geometries after snapping, translating by the common
/// coordinate bits around the overlay proper.
pub(crate) fn snap_overlay(
    g0: &Geometry,
    g1: &Geometry,
    op: BooleanOp,
) -> Result<Geometry, TopologyError> {
    let snap_tol = overlay_snap_tolerance_pair(g0, g1);

    let mut cbr = CommonBitsRemover::new();
    cbr.add(g0);
    cbr.add(g1);
    let mut r0 = g0.clone();
    let mut r1 = g1.clone();
    cbr.remove_common_bits(&mut r0);
    cbr.remove_common_bits(&mut r1);

    let s0 = GeometrySnapper::new(&r0, snap_tol).snap_to_self();
    let s1_self = GeometrySnapper::new(&r1, snap_tol).snap_to_self();
    let s1 = GeometrySnapper::new(&s1_self, snap_tol).snap_to(&s0);

    let mut result = OverlayOp::new(&s0, &s1).result_geometry(op)?;
    cbr.add_common_bits(&mut result);
    Ok(result)
}
