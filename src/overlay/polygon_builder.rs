//! Assembles result polygons from the directed edges marked in-result.

use crate::algorithm::locate_point_in_ring;
use crate::algorithm::orientation::is_ccw;
use crate::error::TopologyError;
use crate::geom::{Coordinate, Envelope, Geometry, GeometryFactory, Location};
use crate::graph::{DirEdgeId, PlanarGraph, RingId};

/// A maximal edge ring: a cycle of result directed edges that may pass
/// through nodes of degree greater than two.
struct MaxRing {
    edges: Vec<DirEdgeId>,
    pts: Vec<Coordinate>,
}

/// A minimal edge ring: a cycle with degree at most two at every node, i.e.
/// an OGC-valid polygon ring.
struct MinRing {
    pts: Vec<Coordinate>,
    is_hole: bool,
}

/// A shell with the holes assigned to it.
struct Shell {
    pts: Vec<Coordinate>,
    env: Envelope,
    holes: Vec<Vec<Coordinate>>,
}

impl Shell {
    fn new(pts: Vec<Coordinate>, holes: Vec<Vec<Coordinate>>) -> Self {
        let env = Envelope::from_sequence(&pts);
        Self { pts, env, holes }
    }
}

/// Builds the result polygons: link result edges at each node, trace maximal
/// rings, split the self-touching ones into minimal rings, classify shells
/// and holes, and place every free hole in its innermost enclosing shell.
pub(crate) fn build_polygons(
    graph: &mut PlanarGraph,
    factory: &GeometryFactory,
) -> Result<Vec<Geometry>, TopologyError> {
    for n in 0..graph.nodes.len() {
        graph.link_result_directed_edges(n)?;
    }

    let max_rings = build_maximal_rings(graph)?;

    let mut shells: Vec<Shell> = Vec::new();
    let mut free_holes: Vec<Vec<Coordinate>> = Vec::new();
    let mut min_ring_count: usize = 0;

    for (rid, ring) in max_rings.iter().enumerate() {
        if max_node_degree(graph, ring, rid) > 2 {
            // Relink the ring's nodes for degree-2 traversal and walk the
            // minimal cycles.
            for &de in &ring.edges {
                let n = graph.dir_edges[de].node;
                graph.link_minimal_directed_edges(n, rid);
            }
            let min_rings = build_minimal_rings(graph, ring, &mut min_ring_count)?;

            let shell_count = min_rings.iter().filter(|r| !r.is_hole).count();
            if shell_count > 1 {
                return Err(TopologyError::robustness_at(
                    "found two shells in one maximal ring",
                    ring.pts[0],
                ));
            }
            if shell_count == 1 {
                let mut shell_pts = None;
                let mut holes = Vec::new();
                for r in min_rings {
                    if r.is_hole {
                        holes.push(r.pts);
                    } else {
                        shell_pts = Some(r.pts);
                    }
                }
                shells.push(Shell::new(shell_pts.expect("one shell"), holes));
            } else {
                // No shell at all: release every ring to the free-hole pool.
                free_holes.extend(min_rings.into_iter().map(|r| r.pts));
            }
        } else if is_ccw(&ring.pts) {
            free_holes.push(ring.pts.clone());
        } else {
            shells.push(Shell::new(ring.pts.clone(), Vec::new()));
        }
    }

    place_free_holes(&mut shells, free_holes)?;

    Ok(shells
        .into_iter()
        .map(|s| {
            let shell_ring = factory.create_linear_ring(s.pts);
            let hole_rings = s
                .holes
                .into_iter()
                .map(|h| factory.create_linear_ring(h))
                .collect();
            factory.create_polygon(shell_ring, hole_rings)
        })
        .collect())
}

fn build_maximal_rings(graph: &mut PlanarGraph) -> Result<Vec<MaxRing>, TopologyError> {
    let mut rings = Vec::new();
    for start in 0..graph.dir_edges.len() {
        let de = &graph.dir_edges[start];
        if de.in_result && de.label.is_area() && de.edge_ring.is_none() {
            let rid = rings.len();
            rings.push(walk_maximal_ring(graph, start, rid)?);
        }
    }
    Ok(rings)
}

fn walk_maximal_ring(
    graph: &mut PlanarGraph,
    start: DirEdgeId,
    rid: RingId,
) -> Result<MaxRing, TopologyError> {
    let mut edges = Vec::new();
    let mut pts = Vec::new();
    let mut de = start;
    let mut first = true;
    loop {
        if graph.dir_edges[de].edge_ring == Some(rid) {
            return Err(TopologyError::robustness_at(
                "directed edge visited twice during ring building",
                graph.dir_edges[de].p0,
            ));
        }
        edges.push(de);
        add_edge_points(graph, de, first, &mut pts);
        first = false;
        graph.dir_edges[de].edge_ring = Some(rid);
        de = graph.dir_edges[de].next.ok_or_else(|| {
            TopologyError::robustness_at("found null directed edge", graph.dir_edges[de].p1)
        })?;
        if de == start {
            break;
        }
    }
    Ok(MaxRing { edges, pts })
}

/// Appends the coordinates of a directed edge to a ring chain, skipping the
/// shared vertex except on the first edge.
fn add_edge_points(graph: &PlanarGraph, de: DirEdgeId, is_first: bool, pts: &mut Vec<Coordinate>) {
    let d = &graph.dir_edges[de];
    let edge_pts = &graph.edges[d.edge].pts;
    if d.forward {
        let start = if is_first { 0 } else { 1 };
        pts.extend_from_slice(&edge_pts[start..]);
    } else {
        let end = if is_first {
            edge_pts.len()
        } else {
            edge_pts.len() - 1
        };
        pts.extend(edge_pts[..end].iter().rev());
    }
}

/// Twice the maximum outgoing degree of the ring's nodes within the ring,
/// counting both orientations.
fn max_node_degree(graph: &PlanarGraph, ring: &MaxRing, rid: RingId) -> usize {
    let mut max_degree = 0;
    for &de in &ring.edges {
        let n = graph.dir_edges[de].node;
        let degree = graph.outgoing_degree_in_ring(n, rid);
        max_degree = max_degree.max(degree);
    }
    max_degree * 2
}

fn build_minimal_rings(
    graph: &mut PlanarGraph,
    ring: &MaxRing,
    min_ring_count: &mut usize,
) -> Result<Vec<MinRing>, TopologyError> {
    let mut min_rings = Vec::new();
    for &start in &ring.edges {
        if graph.dir_edges[start].min_edge_ring.is_some() {
            continue;
        }
        let mid = *min_ring_count;
        *min_ring_count += 1;

        let mut pts = Vec::new();
        let mut de = start;
        let mut first = true;
        loop {
            if graph.dir_edges[de].min_edge_ring == Some(mid) {
                return Err(TopologyError::robustness_at(
                    "directed edge visited twice during ring building",
                    graph.dir_edges[de].p0,
                ));
            }
            add_edge_points(graph, de, first, &mut pts);
            first = false;
            graph.dir_edges[de].min_edge_ring = Some(mid);
            de = graph.dir_edges[de].next_min.ok_or_else(|| {
                TopologyError::robustness_at("found null directed edge", graph.dir_edges[de].p1)
            })?;
            if de == start {
                break;
            }
        }
        let is_hole = is_ccw(&pts);
        min_rings.push(MinRing { pts, is_hole });
    }
    Ok(min_rings)
}

/// Assigns each free hole to the innermost shell that encloses it. The
/// candidate must contain the hole's envelope and a hole vertex not shared
/// with the shell; among candidates the one with the smallest envelope wins.
fn place_free_holes(
    shells: &mut Vec<Shell>,
    free_holes: Vec<Vec<Coordinate>>,
) -> Result<(), TopologyError> {
    for hole in free_holes {
        let hole_env = Envelope::from_sequence(&hole);
        let mut min_shell: Option<usize> = None;
        for i in 0..shells.len() {
            let shell = &shells[i];
            if shell.env == hole_env {
                continue;
            }
            if !shell.env.contains_envelope(&hole_env) {
                continue;
            }
            let test_pt = hole.iter().find(|p| !shell.pts.contains(p));
            let contained = match test_pt {
                Some(pt) => locate_point_in_ring(pt, &shell.pts) != Location::Exterior,
                None => false,
            };
            if contained {
                let smaller = match min_shell {
                    None => true,
                    Some(j) => shells[j].env.contains_envelope(&shell.env),
                };
                if smaller {
                    min_shell = Some(i);
                }
            }
        }
        match min_shell {
            Some(i) => shells[i].holes.push(hole),
            None => return Err(TopologyError::OrphanHole(hole[0])),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: f64, y: f64) -> Coordinate {
        Coordinate::new(x, y)
    }

    #[test]
    fn test_place_free_hole_innermost_shell() {
        // Outer shell (CW) and a smaller inner shell, both containing the
        // hole's envelope; the hole must land in the inner one.
        let outer = vec![
            c(0.0, 0.0),
            c(0.0, 10.0),
            c(10.0, 10.0),
            c(10.0, 0.0),
            c(0.0, 0.0),
        ];
        let inner = vec![
            c(1.0, 1.0),
            c(1.0, 8.0),
            c(8.0, 8.0),
            c(8.0, 1.0),
            c(1.0, 1.0),
        ];
        let hole = vec![
            c(2.0, 2.0),
            c(4.0, 2.0),
            c(4.0, 4.0),
            c(2.0, 4.0),
            c(2.0, 2.0),
        ];
        let mut shells = vec![Shell::new(outer, vec![]), Shell::new(inner, vec![])];
        place_free_holes(&mut shells, vec![hole]).unwrap();
        assert!(shells[0].holes.is_empty());
        assert_eq!(shells[1].holes.len(), 1);
    }

    #[test]
    fn test_orphan_hole_is_error() {
        let shell = vec![
            c(0.0, 0.0),
            c(0.0, 1.0),
            c(1.0, 1.0),
            c(1.0, 0.0),
            c(0.0, 0.0),
        ];
        let far_hole = vec![
            c(5.0, 5.0),
            c(6.0, 5.0),
            c(6.0, 6.0),
            c(5.0, 6.0),
            c(5.0, 5.0),
        ];
        let mut shells = vec![Shell::new(shell, vec![])];
        let err = place_free_holes(&mut shells, vec![far_hole]).unwrap_err();
        assert_eq!(err, TopologyError::OrphanHole(c(5.0, 5.0)));
    }
}
