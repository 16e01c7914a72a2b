//! Union of two polygonal geometries with the overlap-envelope
//! optimisation.
//!
//! Only the components whose envelopes reach the overlap envelope are
//! unioned through the overlay; components entirely outside it are grafted
//! into the result unchanged. The optimisation is sound only when the union
//! preserves every segment touching the overlap envelope's boundary, which
//! is verified after the fact; when the check fails, the full union is
//! computed instead.

use crate::error::TopologyError;
use crate::geom::{CoordKey, Coordinate, Envelope, Geometry, GeometryFactory};
use crate::overlay::{overlay, BooleanOp};
use crate::union::{combine, ZeroBuffer};
use std::collections::HashSet;

/// Union of two geometries restricted to their envelope overlap where
/// possible.
pub struct OverlapUnion<'a> {
    g0: &'a Geometry,
    g1: &'a Geometry,
    factory: GeometryFactory,
    buffer: Option<&'a dyn ZeroBuffer>,
    union_optimized: bool,
}

impl<'a> OverlapUnion<'a> {
    pub fn new(g0: &'a Geometry, g1: &'a Geometry) -> Self {
        Self {
            g0,
            g1,
            factory: g0.factory(),
            buffer: None,
            union_optimized: false,
        }
    }

    /// Configures a buffer(0) provider used as the fallback when the
    /// overlay union fails.
    pub fn with_buffer_fallback(mut self, buffer: &'a dyn ZeroBuffer) -> Self {
        self.buffer = Some(buffer);
        self
    }

    /// Whether the last [`union`](OverlapUnion::union) call used the
    /// envelope optimisation.
    pub fn is_union_optimized(&self) -> bool {
        self.union_optimized
    }

    pub fn union(&mut self) -> Result<Geometry, TopologyError> {
        let overlap_env = overlap_envelope(self.g0, self.g1);

        // Disjoint envelopes cannot share vertices; combining the copies is
        // already the union.
        if overlap_env.is_null() {
            self.union_optimized = true;
            return Ok(combine(
                vec![self.g0.clone(), self.g1.clone()],
                &self.factory,
            ));
        }

        let mut disjoint = Vec::new();
        let g0_overlap = self.extract_by_envelope(&overlap_env, self.g0, &mut disjoint);
        let g1_overlap = self.extract_by_envelope(&overlap_env, self.g1, &mut disjoint);
        let union_geom = self.union_full(&g0_overlap, &g1_overlap)?;

        self.union_optimized = self.is_border_segments_same(&union_geom, &overlap_env);
        if !self.union_optimized {
            // The partial union disturbed a border segment; redo the union
            // on the full inputs.
            self.union_full(self.g0, self.g1)
        } else {
            Ok(self.combine_with_disjoint(union_geom, disjoint))
        }
    }

    /// Splits `geom` into the components reaching `env` (returned as one
    /// geometry) and the rest (appended to `disjoint`).
    fn extract_by_envelope(
        &self,
        env: &Envelope,
        geom: &Geometry,
        disjoint: &mut Vec<Geometry>,
    ) -> Geometry {
        let mut intersecting = Vec::new();
        for elem in geom.components() {
            if elem.envelope().intersects(env) {
                intersecting.push(elem);
            } else {
                disjoint.push(elem);
            }
        }
        self.factory.build_geometry(intersecting)
    }

    fn combine_with_disjoint(&self, union_geom: Geometry, mut disjoint: Vec<Geometry>) -> Geometry {
        if disjoint.is_empty() {
            union_geom
        } else {
            disjoint.push(union_geom);
            combine(disjoint, &self.factory)
        }
    }

    /// The core union, with buffer(0) as the last resort when a provider is
    /// configured.
    fn union_full(&self, a: &Geometry, b: &Geometry) -> Result<Geometry, TopologyError> {
        match overlay(a, b, BooleanOp::Union) {
            Ok(result) => Ok(result),
            Err(err) => match self.buffer {
                Some(buffer) => {
                    let coll = self
                        .factory
                        .create_geometry_collection(vec![a.clone(), b.clone()]);
                    buffer.buffer_zero(&coll)
                }
                None => Err(err),
            },
        }
    }

    /// The optimisation is safe when the union preserves exactly the input
    /// segments that touch the overlap envelope's boundary.
    fn is_border_segments_same(&self, result: &Geometry, env: &Envelope) -> bool {
        let mut before = Vec::new();
        extract_border_segments(self.g0, env, &mut before);
        extract_border_segments(self.g1, env, &mut before);

        let mut after = Vec::new();
        extract_border_segments(result, env, &mut after);

        if before.len() != after.len() {
            return false;
        }
        let index: HashSet<SegKey> = before.into_iter().collect();
        after.iter().all(|seg| index.contains(seg))
    }
}

fn overlap_envelope(g0: &Geometry, g1: &Geometry) -> Envelope {
    g0.envelope().intersection(&g1.envelope())
}

/// A direction-normalized segment value.
type SegKey = (CoordKey, CoordKey);

fn seg_key(p0: &Coordinate, p1: &Coordinate) -> SegKey {
    if p0.compare(p1) == std::cmp::Ordering::Greater {
        (p1.key(), p0.key())
    } else {
        (p0.key(), p1.key())
    }
}

/// Collects the segments with at least one endpoint in `env` but not both
/// strictly inside it.
fn extract_border_segments(geom: &Geometry, env: &Envelope, segs: &mut Vec<SegKey>) {
    geom.apply_coordinate_sequences(&mut |seq| {
        for w in seq.windows(2) {
            let (p0, p1) = (&w[0], &w[1]);
            let touches = env.contains(p0) || env.contains(p1);
            let inside = env.contains_properly(p0) && env.contains_properly(p1);
            if touches && !inside {
                segs.push(seg_key(p0, p1));
            }
        }
    });
}
