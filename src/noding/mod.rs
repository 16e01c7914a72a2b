//! Noding: computing intersections among edge sets and validating that a
//! split edge set meets only at vertices.
//!
//! The edge-set intersector is the simple quadratic one with an envelope
//! reject at the edge level; overlay inputs are modest after splitting, and
//! the quadratic pass is also what the validator uses.

use crate::algorithm::LineIntersector;
use crate::error::TopologyError;
use crate::geom::Coordinate;
use crate::graph::Edge;

/// Records the intersections found between segments onto the owning edges.
pub(crate) struct SegmentIntersector {
    pub li: LineIntersector,
    include_proper: bool,
    record_isolated: bool,
    has_intersection: bool,
}

enum EdgePair<'a> {
    Same(&'a mut Edge, usize, usize),
    Distinct(&'a mut Edge, usize, &'a mut Edge, usize),
}

impl SegmentIntersector {
    /// `include_proper` controls whether proper (interior/interior)
    /// intersections are recorded on the edges; self-noding of valid rings
    /// leaves them out. `record_isolated` clears the isolation flag of both
    /// edges on any intersection, marking them as reached by the other
    /// geometry.
    pub fn new(li: LineIntersector, include_proper: bool, record_isolated: bool) -> Self {
        Self {
            li,
            include_proper,
            record_isolated,
            has_intersection: false,
        }
    }

    pub fn has_intersection(&self) -> bool {
        self.has_intersection
    }

    fn add_intersections(&mut self, pair: EdgePair<'_>) {
        let (p00, p01, p10, p11) = match &pair {
            EdgePair::Same(e, i0, i1) => {
                if i0 == i1 {
                    return;
                }
                (e.pts[*i0], e.pts[*i0 + 1], e.pts[*i1], e.pts[*i1 + 1])
            }
            EdgePair::Distinct(e0, i0, e1, i1) => {
                (e0.pts[*i0], e0.pts[*i0 + 1], e1.pts[*i1], e1.pts[*i1 + 1])
            }
        };

        self.li.compute_intersection(&p00, &p01, &p10, &p11);
        if !self.li.has_intersection() {
            return;
        }

        if self.is_trivial(&pair) {
            return;
        }
        self.has_intersection = true;

        let record = self.include_proper || !self.li.is_proper();
        match pair {
            EdgePair::Same(e, i0, i1) => {
                if self.record_isolated {
                    e.is_isolated = false;
                }
                if record {
                    e.add_intersections(&self.li, i0, 0);
                    e.add_intersections(&self.li, i1, 1);
                }
            }
            EdgePair::Distinct(e0, i0, e1, i1) => {
                if self.record_isolated {
                    e0.is_isolated = false;
                    e1.is_isolated = false;
                }
                if record {
                    e0.add_intersections(&self.li, i0, 0);
                    e1.add_intersections(&self.li, i1, 1);
                }
            }
        }
    }

    /// A trivial intersection is the shared vertex of adjacent segments of
    /// one edge (or of the closing segments of a ring).
    fn is_trivial(&self, pair: &EdgePair<'_>) -> bool {
        if let EdgePair::Same(e, i0, i1) = pair {
            if self.li.intersection_num() == 1 {
                let (lo, hi) = (*i0.min(i1), *i0.max(i1));
                if hi - lo == 1 {
                    return true;
                }
                if e.is_closed() && lo == 0 && hi == e.num_segments() - 1 {
                    return true;
                }
            }
        }
        false
    }
}

/// Computes self-intersections within one edge set. When `test_same_edge` is
/// false, segments of a single edge are not tested against each other
/// (applicable when the edges are rings of a valid polygonal geometry).
pub(crate) fn compute_self_intersections(
    si: &mut SegmentIntersector,
    edges: &mut [Edge],
    test_same_edge: bool,
) {
    for e0 in 0..edges.len() {
        for e1 in e0..edges.len() {
            if e0 == e1 {
                if !test_same_edge {
                    continue;
                }
                let e = &mut edges[e0];
                let n_segs = e.num_segments();
                for i0 in 0..n_segs {
                    for i1 in (i0 + 1)..n_segs {
                        si.add_intersections(EdgePair::Same(&mut *e, i0, i1));
                    }
                }
            } else {
                let (left, right) = edges.split_at_mut(e1);
                let a = &mut left[e0];
                let b = &mut right[0];
                intersect_edge_pair(si, a, b);
            }
        }
    }
}

/// Computes intersections between two edge sets.
pub(crate) fn compute_cross_intersections(
    si: &mut SegmentIntersector,
    edges0: &mut [Edge],
    edges1: &mut [Edge],
) {
    for a in edges0.iter_mut() {
        for b in edges1.iter_mut() {
            intersect_edge_pair(si, a, b);
        }
    }
}

fn intersect_edge_pair(si: &mut SegmentIntersector, a: &mut Edge, b: &mut Edge) {
    if !a.envelope().intersects(&b.envelope()) {
        return;
    }
    for i0 in 0..a.num_segments() {
        for i1 in 0..b.num_segments() {
            si.add_intersections(EdgePair::Distinct(&mut *a, i0, &mut *b, i1));
        }
    }
}

/// Checks that the split edge set is properly noded: segments may share only
/// chain endpoints. A proper crossing, a vertex in a segment interior, or a
/// touch at a chain-interior vertex all raise
/// [`TopologyError::NodingFailure`].
pub(crate) fn validate_noding(edges: &[Edge]) -> Result<(), TopologyError> {
    let mut li = LineIntersector::new();
    let envs: Vec<_> = edges.iter().map(Edge::envelope).collect();

    for a_idx in 0..edges.len() {
        for b_idx in a_idx..edges.len() {
            if a_idx != b_idx && !envs[a_idx].intersects(&envs[b_idx]) {
                continue;
            }
            let a = &edges[a_idx];
            let b = &edges[b_idx];
            for i0 in 0..a.num_segments() {
                let start1 = if a_idx == b_idx { i0 + 1 } else { 0 };
                for i1 in start1..b.num_segments() {
                    if a_idx == b_idx && i1 - i0 == 1 {
                        continue;
                    }
                    li.compute_intersection(
                        &a.pts[i0],
                        &a.pts[i0 + 1],
                        &b.pts[i1],
                        &b.pts[i1 + 1],
                    );
                    if !li.has_intersection() {
                        continue;
                    }
                    if li.is_proper() || li.is_interior_intersection() {
                        return Err(TopologyError::NodingFailure(li.intersection(0)));
                    }
                    for k in 0..li.intersection_num() {
                        let pt = li.intersection(k);
                        if is_interior_vertex(a, &pt) || is_interior_vertex(b, &pt) {
                            return Err(TopologyError::NodingFailure(pt));
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

fn is_interior_vertex(e: &Edge, pt: &Coordinate) -> bool {
    e.pts[1..e.pts.len() - 1].iter().any(|p| p == pt)
}
