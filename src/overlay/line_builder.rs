//! Collects the 1-dimensional pieces of an overlay result.

use crate::algorithm::PointLocator;
use crate::geom::{Coordinate, Geometry, GeometryFactory, Location};
use crate::graph::{sym, EdgeId, PlanarGraph};
use crate::overlay::{is_result_of_op, BooleanOp};

/// Builds the result line strings: line edges whose label passes the
/// operator predicate and which are not covered by a result polygon, plus
/// (for intersection) the boundary-touch edges where the inputs share a
/// boundary without enclosing area.
pub(crate) fn build_lines(
    graph: &mut PlanarGraph,
    op: BooleanOp,
    factory: &GeometryFactory,
    pt_locator: &PointLocator,
    result_polys: &[Geometry],
) -> Vec<Geometry> {
    find_covered_line_edges(graph, pt_locator, result_polys);

    let mut line_edges: Vec<EdgeId> = Vec::new();
    for de in 0..graph.dir_edges.len() {
        collect_line_edge(graph, de, op, &mut line_edges);
        collect_boundary_touch_edge(graph, de, op, &mut line_edges);
    }

    let mut result = Vec::with_capacity(line_edges.len());
    for eid in line_edges {
        graph.edges[eid].in_result = true;
        result.push(factory.create_line_string(graph.edges[eid].pts.clone()));
    }
    result
}

/// Determines for every line edge whether it lies inside the result area.
/// Edges at nodes bordered by result area edges are classified by sweeping
/// the node star; the rest fall back to point location against the result
/// polygons.
fn find_covered_line_edges(
    graph: &mut PlanarGraph,
    pt_locator: &PointLocator,
    result_polys: &[Geometry],
) {
    for n in 0..graph.nodes.len() {
        graph.find_covered_line_edges(n);
    }
    for de in 0..graph.dir_edges.len() {
        let eid = graph.dir_edges[de].edge;
        if graph.dir_edges[de].is_line_edge() && graph.edges[eid].covered.is_none() {
            let covered = is_covered(&graph.dir_edges[de].p0, pt_locator, result_polys);
            graph.edges[eid].covered = Some(covered);
        }
    }
}

fn collect_line_edge(graph: &mut PlanarGraph, de: usize, op: BooleanOp, out: &mut Vec<EdgeId>) {
    let d = &graph.dir_edges[de];
    if !d.is_line_edge() || d.visited {
        return;
    }
    let eid = d.edge;
    if is_result_of_op(&d.label, op) && graph.edges[eid].covered != Some(true) {
        out.push(eid);
        set_visited_edge(graph, de);
    }
}

/// An edge forming part of both inputs' boundaries, where the areas touch
/// without overlapping. Only intersection reports these (as the expected
/// degenerate lines).
fn collect_boundary_touch_edge(
    graph: &mut PlanarGraph,
    de: usize,
    op: BooleanOp,
    out: &mut Vec<EdgeId>,
) {
    let d = &graph.dir_edges[de];
    if d.is_line_edge() || d.visited || d.is_interior_area_edge() {
        return;
    }
    let eid = d.edge;
    if graph.edges[eid].in_result {
        return;
    }
    debug_assert!(
        !(d.in_result || graph.dir_edges[sym(de)].in_result) || !graph.edges[eid].in_result
    );
    if is_result_of_op(&d.label, op) && op == BooleanOp::Intersection {
        out.push(eid);
        set_visited_edge(graph, de);
    }
}

fn set_visited_edge(graph: &mut PlanarGraph, de: usize) {
    graph.dir_edges[de].visited = true;
    graph.dir_edges[sym(de)].visited = true;
}

pub(crate) fn is_covered(
    coord: &Coordinate,
    pt_locator: &PointLocator,
    geoms: &[Geometry],
) -> bool {
    geoms
        .iter()
        .any(|g| pt_locator.locate(coord, g) != Location::Exterior)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::GeometryFactory;
    use crate::overlay::overlay;
    use approx::assert_relative_eq;

    fn c(x: f64, y: f64) -> Coordinate {
        Coordinate::new(x, y)
    }

    #[test]
    fn test_boundary_touch_intersection_yields_line() {
        // Two squares sharing the edge x = 1: their intersection is that
        // shared boundary segment.
        let f = GeometryFactory::default();
        let a = f.create_polygon(
            f.create_linear_ring(vec![
                c(0.0, 0.0),
                c(1.0, 0.0),
                c(1.0, 1.0),
                c(0.0, 1.0),
                c(0.0, 0.0),
            ]),
            vec![],
        );
        let b = f.create_polygon(
            f.create_linear_ring(vec![
                c(1.0, 0.0),
                c(2.0, 0.0),
                c(2.0, 1.0),
                c(1.0, 1.0),
                c(1.0, 0.0),
            ]),
            vec![],
        );
        let result = overlay(&a, &b, BooleanOp::Intersection).unwrap();
        match &result {
            Geometry::LineString(l) => {
                assert_eq!(l.coords.len(), 2);
                assert!(l.coords.iter().all(|p| p.x == 1.0));
            }
            other => panic!("expected line string, got {:?}", other),
        }
    }

    #[test]
    fn test_line_inside_polygon_union_is_absorbed() {
        let f = GeometryFactory::default();
        let poly = f.create_polygon(
            f.create_linear_ring(vec![
                c(0.0, 0.0),
                c(4.0, 0.0),
                c(4.0, 4.0),
                c(0.0, 4.0),
                c(0.0, 0.0),
            ]),
            vec![],
        );
        let line = f.create_line_string(vec![c(1.0, 1.0), c(3.0, 3.0)]);
        let result = overlay(&line, &poly, BooleanOp::Union).unwrap();
        // The covered line contributes nothing; the union is the polygon.
        assert!(matches!(result, Geometry::Polygon(_)));
        assert_relative_eq!(result.area(), 16.0, epsilon = 1e-9);
    }

    #[test]
    fn test_line_difference_against_polygon() {
        let f = GeometryFactory::default();
        let poly = f.create_polygon(
            f.create_linear_ring(vec![
                c(0.0, 0.0),
                c(2.0, 0.0),
                c(2.0, 2.0),
                c(0.0, 2.0),
                c(0.0, 0.0),
            ]),
            vec![],
        );
        let line = f.create_line_string(vec![c(-1.0, 1.0), c(3.0, 1.0)]);
        let result = overlay(&line, &poly, BooleanOp::Difference).unwrap();
        match &result {
            Geometry::MultiLineString(ml) => {
                assert_eq!(ml.lines.len(), 2);
            }
            other => panic!("expected two line pieces, got {:?}", other),
        }
    }
}
