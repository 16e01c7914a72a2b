//! Collects the 0-dimensional pieces of an overlay result.

use crate::algorithm::PointLocator;
use crate::geom::{Geometry, GeometryFactory};
use crate::graph::{sym, PlanarGraph};
use crate::overlay::line_builder::is_covered;
use crate::overlay::{is_result_of_op, BooleanOp};

/// Builds the result points: nodes that are not part of any result edge,
/// whose label passes the operator predicate, and whose coordinate is not
/// already covered by a result line or polygon. Only isolated nodes qualify,
/// except for intersection, where crossings of 1-dimensional edges also
/// produce points.
pub(crate) fn build_points(
    graph: &PlanarGraph,
    op: BooleanOp,
    factory: &GeometryFactory,
    pt_locator: &PointLocator,
    result_lines: &[Geometry],
    result_polys: &[Geometry],
) -> Vec<Geometry> {
    let mut result = Vec::new();
    for node in &graph.nodes {
        let incident_in_result = node.star.iter().any(|&de| {
            graph.dir_edges[de].in_result
                || graph.dir_edges[sym(de)].in_result
                || graph.edges[graph.dir_edges[de].edge].in_result
        });
        if incident_in_result {
            continue;
        }
        if node.star.is_empty() || op == BooleanOp::Intersection {
            if is_result_of_op(&node.label, op)
                && !is_covered(&node.coord, pt_locator, result_lines)
                && !is_covered(&node.coord, pt_locator, result_polys)
            {
                result.push(factory.create_point(node.coord));
            }
        }
    }
    result
}
