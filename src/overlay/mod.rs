//! Topological overlay of two geometries under a Boolean operator.
//!
//! [`OverlayOp`] runs the raw pipeline: node the inputs, build the labelled
//! planar graph, select result edges, assemble polygons, lines and points.
//! [`overlay`] is the entry point callers want: it wraps the raw pipeline in
//! the snap-if-needed robustness retry.

mod line_builder;
mod point_builder;
mod polygon_builder;

use crate::algorithm::{LineIntersector, PointLocator};
use crate::error::TopologyError;
use crate::geom::{Geometry, GeometryFactory, Location, PrecisionModel};
use crate::graph::{Edge, EdgeList, GeometryGraph, Label, PlanarGraph, Position};
use crate::noding::validate_noding;

/// The four set-theoretic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    Intersection,
    Union,
    Difference,
    SymDifference,
}

/// Computes the overlay of two geometries, retrying on snapped inputs when
/// the plain overlay fails.
///
/// If both attempts fail, the error of the *first* attempt is returned.
///
/// # Example
///
/// ```
/// use approx::assert_relative_eq;
/// use planarum::{overlay, BooleanOp, Coordinate, GeometryFactory};
///
/// let f = GeometryFactory::default();
/// let a = f.create_polygon(
///     f.create_linear_ring(vec![
///         Coordinate::new(0.0, 0.0),
///         Coordinate::new(2.0, 0.0),
///         Coordinate::new(2.0, 2.0),
///         Coordinate::new(0.0, 2.0),
///         Coordinate::new(0.0, 0.0),
///     ]),
///     vec![],
/// );
/// let b = f.create_polygon(
///     f.create_linear_ring(vec![
///         Coordinate::new(1.0, 1.0),
///         Coordinate::new(3.0, 1.0),
///         Coordinate::new(3.0, 3.0),
///         Coordinate::new(1.0, 3.0),
///         Coordinate::new(1.0, 1.0),
///     ]),
///     vec![],
/// );
/// let union = overlay(&a, &b, BooleanOp::Union).unwrap();
/// assert_relative_eq!(union.area(), 7.0, epsilon = 1e-9);
/// ```
pub fn overlay(g0: &Geometry, g1: &Geometry, op: BooleanOp) -> Result<Geometry, TopologyError> {
    match OverlayOp::new(g0, g1).result_geometry(op) {
        Ok(result) => Ok(result),
        Err(first_error) => crate::snap::snap_overlay(g0, g1, op).map_err(|_| first_error),
    }
}

/// Decides whether an edge or node with the given argument locations belongs
/// to the result of an operator. Boundary locations count as interior.
pub(crate) fn is_result_of_op_locations(loc0: Location, loc1: Location, op: BooleanOp) -> bool {
    let loc0 = promote_boundary(loc0);
    let loc1 = promote_boundary(loc1);
    match op {
        BooleanOp::Intersection => loc0 == Location::Interior && loc1 == Location::Interior,
        BooleanOp::Union => loc0 == Location::Interior || loc1 == Location::Interior,
        BooleanOp::Difference => loc0 == Location::Interior && loc1 != Location::Interior,
        BooleanOp::SymDifference => {
            (loc0 == Location::Interior && loc1 != Location::Interior)
                || (loc0 != Location::Interior && loc1 == Location::Interior)
        }
    }
}

pub(crate) fn is_result_of_op(label: &Label, op: BooleanOp) -> bool {
    is_result_of_op_locations(label.location(0), label.location(1), op)
}

#[inline]
fn promote_boundary(loc: Location) -> Location {
    if loc == Location::Boundary {
        Location::Interior
    } else {
        loc
    }
}

/// The dimension of the empty result of an operator: intersection takes the
/// smaller input dimension, union and symmetric difference the larger,
/// difference the left one.
pub(crate) fn result_dimension(op: BooleanOp, dim0: i32, dim1: i32) -> i32 {
    match op {
        BooleanOp::Intersection => dim0.min(dim1),
        BooleanOp::Union | BooleanOp::SymDifference => dim0.max(dim1),
        BooleanOp::Difference => dim0,
    }
}

/// Builds the atomic empty geometry mandated for an empty overlay result.
pub(crate) fn create_empty_result(
    op: BooleanOp,
    g0: &Geometry,
    g1: &Geometry,
    factory: &GeometryFactory,
) -> Geometry {
    factory.create_empty(result_dimension(op, g0.dimension(), g1.dimension()))
}

/// A single topological overlay of two geometries.
///
/// The instance is one-shot: [`result_geometry`](OverlayOp::result_geometry)
/// consumes it, together with all per-invocation graph state.
pub struct OverlayOp<'a> {
    g0: &'a Geometry,
    g1: &'a Geometry,
    factory: GeometryFactory,
    graph: PlanarGraph,
    pt_locator: PointLocator,
    result_polys: Vec<Geometry>,
    result_lines: Vec<Geometry>,
    result_points: Vec<Geometry>,
}

impl<'a> OverlayOp<'a> {
    pub fn new(g0: &'a Geometry, g1: &'a Geometry) -> Self {
        Self {
            g0,
            g1,
            factory: g0.factory(),
            graph: PlanarGraph::new(),
            pt_locator: PointLocator::new(),
            result_polys: Vec::new(),
            result_lines: Vec::new(),
            result_points: Vec::new(),
        }
    }

    /// Runs the overlay for one operator and returns the result geometry.
    pub fn result_geometry(mut self, op: BooleanOp) -> Result<Geometry, TopologyError> {
        self.compute_overlay(op)
    }

    fn compute_overlay(&mut self, op: BooleanOp) -> Result<Geometry, TopologyError> {
        let pm = computation_precision(
            self.g0.factory().precision_model,
            self.g1.factory().precision_model,
        );
        let li = LineIntersector::with_precision_model(pm);

        let mut arg0 = GeometryGraph::new(0, self.g0)?;
        let mut arg1 = GeometryGraph::new(1, self.g1)?;

        // Copy the input node points first; this protects the boundary
        // determination rule for isolated points.
        for np in arg0.node_points() {
            self.graph.set_node_location(np.coord, 0, np.on_location);
        }
        for np in arg1.node_points() {
            self.graph.set_node_location(np.coord, 1, np.on_location);
        }

        arg0.compute_self_nodes(li.clone());
        arg1.compute_self_nodes(li.clone());
        arg0.compute_edge_intersections(&mut arg1, li, true);

        let mut base_split_edges = Vec::new();
        arg0.compute_split_edges(&mut base_split_edges);
        arg1.compute_split_edges(&mut base_split_edges);

        let mut edge_list = EdgeList::new();
        for e in base_split_edges {
            insert_unique_edge(&mut edge_list, e);
        }
        compute_labels_from_depths(&mut edge_list);
        replace_collapsed_edges(&mut edge_list);

        let edges = edge_list.into_edges();
        validate_noding(&edges)?;

        self.graph.add_edges(edges);
        self.graph.sort_stars();
        self.graph.compute_labelling(self.g0, self.g1)?;
        self.label_incomplete_nodes();

        self.find_result_area_edges(op);
        self.cancel_duplicate_result_edges();

        self.result_polys = polygon_builder::build_polygons(&mut self.graph, &self.factory)?;
        self.result_lines = line_builder::build_lines(
            &mut self.graph,
            op,
            &self.factory,
            &self.pt_locator,
            &self.result_polys,
        );
        self.result_points = point_builder::build_points(
            &self.graph,
            op,
            &self.factory,
            &self.pt_locator,
            &self.result_lines,
            &self.result_polys,
        );

        Ok(self.compute_geometry(op))
    }

    /// Resolves nodes touched by only one input by locating them against
    /// the other, then pushes node labels into incident directed edges.
    fn label_incomplete_nodes(&mut self) {
        for n in 0..self.graph.nodes.len() {
            let label = self.graph.nodes[n].label;
            if label.geometry_count() == 1 {
                let target = if label.is_null(0) { 0 } else { 1 };
                let target_geom = if target == 0 { self.g0 } else { self.g1 };
                let loc = self
                    .pt_locator
                    .locate(&self.graph.nodes[n].coord, target_geom);
                self.graph.nodes[n].label.set_location(target, loc);
            }
            self.graph.update_star_labelling(n);
        }
    }

    /// Marks the directed edges bordering the result area: area-labelled,
    /// not a collapse artifact, and with the right-hand side locations
    /// passing the operator predicate. Selecting by the right-hand side is
    /// what orients result shells clockwise.
    fn find_result_area_edges(&mut self, op: BooleanOp) {
        for de in &mut self.graph.dir_edges {
            let label = &de.label;
            if label.is_area()
                && !de.is_interior_area_edge()
                && is_result_of_op_locations(
                    label.location_at(0, Position::Right),
                    label.location_at(1, Position::Right),
                    op,
                )
            {
                de.in_result = true;
            }
        }
    }

    /// An edge selected in both orientations encloses nothing; both sides
    /// cancel.
    fn cancel_duplicate_result_edges(&mut self) {
        for de in (0..self.graph.dir_edges.len()).step_by(2) {
            let s = crate::graph::sym(de);
            if self.graph.dir_edges[de].in_result && self.graph.dir_edges[s].in_result {
                self.graph.dir_edges[de].in_result = false;
                self.graph.dir_edges[s].in_result = false;
            }
        }
    }

    fn compute_geometry(&mut self, op: BooleanOp) -> Geometry {
        let mut geoms = Vec::with_capacity(
            self.result_points.len() + self.result_lines.len() + self.result_polys.len(),
        );
        geoms.append(&mut self.result_points);
        geoms.append(&mut self.result_lines);
        geoms.append(&mut self.result_polys);
        if geoms.is_empty() {
            return create_empty_result(op, self.g0, self.g1, &self.factory);
        }
        self.factory.build_geometry(geoms)
    }
}

/// The most precise of the two input models: floating beats any grid, and a
/// denser grid beats a coarser one.
fn computation_precision(pm0: PrecisionModel, pm1: PrecisionModel) -> PrecisionModel {
    match (pm0, pm1) {
        (PrecisionModel::Floating, _) | (_, PrecisionModel::Floating) => PrecisionModel::Floating,
        (PrecisionModel::Fixed { scale: s0 }, PrecisionModel::Fixed { scale: s1 }) => {
            PrecisionModel::Fixed { scale: s0.max(s1) }
        }
    }
}

/// Inserts a split edge, merging it with a coordinate-equal existing edge.
/// A reversed duplicate contributes a flipped label, and the merge is
/// recorded in the existing edge's depths.
fn insert_unique_edge(edge_list: &mut EdgeList, e: Edge) {
    if let Some(idx) = edge_list.find_equal_edge(&e) {
        let existing = edge_list.get_mut(idx);
        let mut label_to_merge = e.label;
        if !existing.is_pointwise_equal(&e) {
            label_to_merge.flip();
        }
        if existing.depth.is_null() {
            let existing_label = existing.label;
            existing.depth.add_label(&existing_label);
        }
        existing.depth.add_label(&label_to_merge);
        existing.label.merge(&label_to_merge);
    } else {
        edge_list.add(e);
    }
}

/// Converts accumulated depths back into labels: a zero delta collapses the
/// edge to a line for that argument, otherwise the side locations are read
/// off the normalized depths.
fn compute_labels_from_depths(edge_list: &mut EdgeList) {
    for e in edge_list.iter_mut() {
        if e.depth.is_null() {
            continue;
        }
        e.depth.normalize();
        for arg in 0..2 {
            if !e.label.is_null(arg) && e.label.is_area() && !e.depth.is_null_arg(arg) {
                if e.depth.delta(arg) == 0 {
                    e.label.to_line(arg);
                } else {
                    e.label.set_location_at(
                        arg,
                        Position::Left,
                        e.depth.location_at(arg, Position::Left),
                    );
                    e.label.set_location_at(
                        arg,
                        Position::Right,
                        e.depth.location_at(arg, Position::Right),
                    );
                }
            }
        }
    }
}

/// Swaps collapsed area edges for their line-labelled equivalents.
fn replace_collapsed_edges(edge_list: &mut EdgeList) {
    for i in 0..edge_list.len() {
        if edge_list.get(i).is_collapsed() {
            let collapsed = edge_list.get(i).collapsed_edge();
            edge_list.replace(i, collapsed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Coordinate;
    use approx::assert_relative_eq;

    fn c(x: f64, y: f64) -> Coordinate {
        Coordinate::new(x, y)
    }

    fn factory() -> GeometryFactory {
        GeometryFactory::default()
    }

    fn polygon(f: &GeometryFactory, coords: Vec<Coordinate>) -> Geometry {
        f.create_polygon(f.create_linear_ring(coords), vec![])
    }

    fn square(f: &GeometryFactory, x0: f64, y0: f64, x1: f64, y1: f64) -> Geometry {
        polygon(
            f,
            vec![c(x0, y0), c(x1, y0), c(x1, y1), c(x0, y1), c(x0, y0)],
        )
    }

    #[test]
    fn test_is_result_of_op_table() {
        use Location::{Exterior as E, Interior as I};
        assert!(is_result_of_op_locations(I, I, BooleanOp::Intersection));
        assert!(!is_result_of_op_locations(I, E, BooleanOp::Intersection));
        assert!(is_result_of_op_locations(I, E, BooleanOp::Union));
        assert!(is_result_of_op_locations(E, I, BooleanOp::Union));
        assert!(is_result_of_op_locations(I, E, BooleanOp::Difference));
        assert!(!is_result_of_op_locations(I, I, BooleanOp::Difference));
        assert!(is_result_of_op_locations(I, E, BooleanOp::SymDifference));
        assert!(!is_result_of_op_locations(I, I, BooleanOp::SymDifference));
        // Boundary promotes to interior.
        assert!(is_result_of_op_locations(
            Location::Boundary,
            I,
            BooleanOp::Intersection
        ));
    }

    #[test]
    fn test_result_dimension_rules() {
        assert_eq!(result_dimension(BooleanOp::Intersection, 2, 1), 1);
        assert_eq!(result_dimension(BooleanOp::Union, 2, 1), 2);
        assert_eq!(result_dimension(BooleanOp::SymDifference, 0, 1), 1);
        assert_eq!(result_dimension(BooleanOp::Difference, 1, 2), 1);
        assert_eq!(result_dimension(BooleanOp::Difference, 2, 0), 2);
    }

    // ------------------------------------------------------------------
    // Overlay scenarios
    // ------------------------------------------------------------------

    #[test]
    fn test_union_overlapping_unit_squares() {
        let f = factory();
        let a = square(&f, 0.0, 0.0, 2.0, 2.0);
        let b = square(&f, 1.0, 1.0, 3.0, 3.0);
        let result = overlay(&a, &b, BooleanOp::Union).unwrap();
        assert!(matches!(result, Geometry::Polygon(_)));
        assert_relative_eq!(result.area(), 7.0, epsilon = 1e-9);
        if let Geometry::Polygon(p) = &result {
            // Closed ring over 8 distinct vertices.
            assert_eq!(p.shell.coords.len(), 9);
            assert!(p.holes.is_empty());
        }
    }

    #[test]
    fn test_intersection_overlapping_squares() {
        let f = factory();
        let a = square(&f, 0.0, 0.0, 2.0, 2.0);
        let b = square(&f, 1.0, 1.0, 3.0, 3.0);
        let result = overlay(&a, &b, BooleanOp::Intersection).unwrap();
        assert_relative_eq!(result.area(), 1.0, epsilon = 1e-9);
        let env = result.envelope();
        assert_eq!(env.min_x(), 1.0);
        assert_eq!(env.max_x(), 2.0);
    }

    #[test]
    fn test_difference_of_overlapping_squares() {
        let f = factory();
        let a = square(&f, 0.0, 0.0, 2.0, 2.0);
        let b = square(&f, 1.0, 1.0, 3.0, 3.0);
        let result = overlay(&a, &b, BooleanOp::Difference).unwrap();
        assert_relative_eq!(result.area(), 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_sym_difference_of_overlapping_squares() {
        let f = factory();
        let a = square(&f, 0.0, 0.0, 2.0, 2.0);
        let b = square(&f, 1.0, 1.0, 3.0, 3.0);
        let result = overlay(&a, &b, BooleanOp::SymDifference).unwrap();
        assert_relative_eq!(result.area(), 6.0, epsilon = 1e-9);
    }

    #[test]
    fn test_sym_difference_nested_squares_has_hole() {
        let f = factory();
        let outer = square(&f, 0.0, 0.0, 4.0, 4.0);
        let inner = square(&f, 1.0, 1.0, 3.0, 3.0);
        let result = overlay(&outer, &inner, BooleanOp::SymDifference).unwrap();
        assert_relative_eq!(result.area(), 12.0, epsilon = 1e-9);
        match &result {
            Geometry::Polygon(p) => assert_eq!(p.holes.len(), 1),
            other => panic!("expected polygon with hole, got {:?}", other),
        }
    }

    #[test]
    fn test_difference_nested_squares_has_hole() {
        let f = factory();
        let outer = square(&f, 0.0, 0.0, 4.0, 4.0);
        let inner = square(&f, 1.0, 1.0, 3.0, 3.0);
        let result = overlay(&outer, &inner, BooleanOp::Difference).unwrap();
        assert_relative_eq!(result.area(), 12.0, epsilon = 1e-9);
        match &result {
            Geometry::Polygon(p) => assert_eq!(p.holes.len(), 1),
            other => panic!("expected polygon with hole, got {:?}", other),
        }
    }

    #[test]
    fn test_line_crossing_intersection_is_point() {
        let f = factory();
        let l0 = f.create_line_string(vec![c(0.0, 0.0), c(2.0, 2.0)]);
        let l1 = f.create_line_string(vec![c(0.0, 2.0), c(2.0, 0.0)]);
        let result = overlay(&l0, &l1, BooleanOp::Intersection).unwrap();
        match &result {
            Geometry::Point(p) => assert_eq!(p.coord, Some(c(1.0, 1.0))),
            other => panic!("expected point, got {:?}", other),
        }
    }

    #[test]
    fn test_collinear_line_intersection_is_line() {
        let f = factory();
        let l0 = f.create_line_string(vec![c(0.0, 0.0), c(2.0, 0.0)]);
        let l1 = f.create_line_string(vec![c(1.0, 0.0), c(3.0, 0.0)]);
        let result = overlay(&l0, &l1, BooleanOp::Intersection).unwrap();
        match &result {
            Geometry::LineString(l) => {
                assert_eq!(l.coords, vec![c(1.0, 0.0), c(2.0, 0.0)]);
            }
            other => panic!("expected line string, got {:?}", other),
        }
    }

    #[test]
    fn test_disjoint_intersection_is_empty_with_dimension() {
        let f = factory();
        let a = square(&f, 0.0, 0.0, 1.0, 1.0);
        let line = f.create_line_string(vec![c(5.0, 5.0), c(6.0, 6.0)]);
        let result = overlay(&a, &line, BooleanOp::Intersection).unwrap();
        assert!(result.is_empty());
        // min(dim 2, dim 1) = 1: an empty line string.
        assert!(matches!(result, Geometry::LineString(_)));
    }

    #[test]
    fn test_union_of_disjoint_squares_is_multipolygon() {
        let f = factory();
        let a = square(&f, 0.0, 0.0, 1.0, 1.0);
        let b = square(&f, 2.0, 2.0, 3.0, 3.0);
        let result = overlay(&a, &b, BooleanOp::Union).unwrap();
        match &result {
            Geometry::MultiPolygon(mp) => assert_eq!(mp.polygons.len(), 2),
            other => panic!("expected multipolygon, got {:?}", other),
        }
        assert_relative_eq!(result.area(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_union_with_empty_returns_other_shape() {
        let f = factory();
        let a = square(&f, 0.0, 0.0, 2.0, 2.0);
        let empty = f.create_empty_polygon();
        let result = overlay(&a, &empty, BooleanOp::Union).unwrap();
        assert_relative_eq!(result.area(), 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_contained_square_union_is_outer() {
        let f = factory();
        let outer = square(&f, 0.0, 0.0, 4.0, 4.0);
        let inner = square(&f, 1.0, 1.0, 2.0, 2.0);
        let result = overlay(&outer, &inner, BooleanOp::Union).unwrap();
        assert_relative_eq!(result.area(), 16.0, epsilon = 1e-9);
        assert!(matches!(result, Geometry::Polygon(_)));
    }

    #[test]
    fn test_line_clipped_by_polygon() {
        let f = factory();
        let poly = square(&f, 0.0, 0.0, 2.0, 2.0);
        let line = f.create_line_string(vec![c(-1.0, 1.0), c(3.0, 1.0)]);
        let result = overlay(&line, &poly, BooleanOp::Intersection).unwrap();
        match &result {
            Geometry::LineString(l) => {
                assert_eq!(l.coords.first(), Some(&c(0.0, 1.0)));
                assert_eq!(l.coords.last(), Some(&c(2.0, 1.0)));
            }
            other => panic!("expected line string, got {:?}", other),
        }
    }

    #[test]
    fn test_shared_edge_squares_union_dissolves_boundary() {
        let f = factory();
        let a = square(&f, 0.0, 0.0, 1.0, 1.0);
        let b = square(&f, 1.0, 0.0, 2.0, 1.0);
        let result = overlay(&a, &b, BooleanOp::Union).unwrap();
        assert_relative_eq!(result.area(), 2.0, epsilon = 1e-9);
        assert!(matches!(result, Geometry::Polygon(_)));
    }

    #[test]
    fn test_idempotence_properties() {
        let f = factory();
        let a = square(&f, 0.0, 0.0, 2.0, 2.0);
        let union = overlay(&a, &a, BooleanOp::Union).unwrap();
        assert_relative_eq!(union.area(), a.area(), epsilon = 1e-9);
        let inter = overlay(&a, &a, BooleanOp::Intersection).unwrap();
        assert_relative_eq!(inter.area(), a.area(), epsilon = 1e-9);
    }

    #[test]
    fn test_commutativity_of_union_and_intersection() {
        let f = factory();
        let a = square(&f, 0.0, 0.0, 2.0, 2.0);
        let b = square(&f, 1.0, 1.0, 3.0, 3.0);
        for op in [
            BooleanOp::Union,
            BooleanOp::Intersection,
            BooleanOp::SymDifference,
        ] {
            let ab = overlay(&a, &b, op).unwrap();
            let ba = overlay(&b, &a, op).unwrap();
            assert_relative_eq!(ab.area(), ba.area(), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_de_morgan_symdifference() {
        let f = factory();
        let a = square(&f, 0.0, 0.0, 2.0, 2.0);
        let b = square(&f, 1.0, 1.0, 3.0, 3.0);
        let symdiff = overlay(&a, &b, BooleanOp::SymDifference).unwrap();
        let a_minus_b = overlay(&a, &b, BooleanOp::Difference).unwrap();
        let b_minus_a = overlay(&b, &a, BooleanOp::Difference).unwrap();
        let union = overlay(&a_minus_b, &b_minus_a, BooleanOp::Union).unwrap();
        assert_relative_eq!(symdiff.area(), union.area(), epsilon = 1e-9);
    }

    #[test]
    fn test_ring_orientation_in_result() {
        use crate::algorithm::orientation::is_ccw;
        let f = factory();
        let outer = square(&f, 0.0, 0.0, 4.0, 4.0);
        let inner = square(&f, 1.0, 1.0, 3.0, 3.0);
        let result = overlay(&outer, &inner, BooleanOp::Difference).unwrap();
        if let Geometry::Polygon(p) = &result {
            assert!(!is_ccw(&p.shell.coords), "shell must be CW");
            for hole in &p.holes {
                assert!(is_ccw(&hole.coords), "holes must be CCW");
            }
        } else {
            panic!("expected polygon");
        }
    }

    #[test]
    fn test_point_in_polygon_intersection() {
        let f = factory();
        let pt = f.create_point(c(1.0, 1.0));
        let poly = square(&f, 0.0, 0.0, 2.0, 2.0);
        let result = overlay(&pt, &poly, BooleanOp::Intersection).unwrap();
        match &result {
            Geometry::Point(p) => assert_eq!(p.coord, Some(c(1.0, 1.0))),
            other => panic!("expected point, got {:?}", other),
        }

        let outside = f.create_point(c(9.0, 9.0));
        let empty = overlay(&outside, &poly, BooleanOp::Intersection).unwrap();
        assert!(empty.is_empty());
        assert!(matches!(empty, Geometry::Point(_)));
    }
}
