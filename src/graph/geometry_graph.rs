//! Per-input graph: turns one argument geometry into labelled edges and
//! labelled node points.

use crate::algorithm::orientation::is_ccw;
use crate::algorithm::LineIntersector;
use crate::error::TopologyError;
use crate::geom::{CoordKey, Coordinate, Geometry, Location};
use crate::graph::edge::Edge;
use crate::graph::label::Label;
use crate::noding::{compute_cross_intersections, compute_self_intersections, SegmentIntersector};
use std::collections::BTreeMap;

/// A labelled point of the input: isolated points, ring start points, line
/// endpoints under the boundary-determination rule, self-intersections.
#[derive(Debug, Clone, Copy)]
pub struct NodePoint {
    pub coord: Coordinate,
    pub on_location: Location,
}

/// The edges and node points contributed by one input geometry.
pub struct GeometryGraph<'a> {
    arg_index: usize,
    pub geometry: &'a Geometry,
    pub edges: Vec<Edge>,
    nodes: BTreeMap<CoordKey, NodePoint>,
}

impl<'a> GeometryGraph<'a> {
    pub fn new(arg_index: usize, geometry: &'a Geometry) -> Result<Self, TopologyError> {
        let mut graph = Self {
            arg_index,
            geometry,
            edges: Vec::new(),
            nodes: BTreeMap::new(),
        };
        graph.add_geometry(geometry)?;
        Ok(graph)
    }

    pub fn node_points(&self) -> impl Iterator<Item = &NodePoint> {
        self.nodes.values()
    }

    fn add_geometry(&mut self, geom: &Geometry) -> Result<(), TopologyError> {
        if geom.is_empty() {
            return Ok(());
        }
        match geom {
            Geometry::Point(p) => {
                if let Some(c) = p.coord {
                    self.insert_point(c, Location::Interior);
                }
            }
            Geometry::MultiPoint(mp) => {
                for p in &mp.points {
                    if let Some(c) = p.coord {
                        self.insert_point(c, Location::Interior);
                    }
                }
            }
            Geometry::LineString(l) => self.add_line_string(&l.coords)?,
            Geometry::LinearRing(r) => self.add_line_string(&r.coords)?,
            Geometry::MultiLineString(ml) => {
                for l in &ml.lines {
                    if !l.coords.is_empty() {
                        self.add_line_string(&l.coords)?;
                    }
                }
            }
            Geometry::Polygon(p) => {
                self.add_polygon_ring(&p.shell.coords, Location::Exterior, Location::Interior)?;
                for hole in &p.holes {
                    self.add_polygon_ring(&hole.coords, Location::Interior, Location::Exterior)?;
                }
            }
            Geometry::MultiPolygon(mp) => {
                for p in &mp.polygons {
                    self.add_polygon_ring(&p.shell.coords, Location::Exterior, Location::Interior)?;
                    for hole in &p.holes {
                        self.add_polygon_ring(
                            &hole.coords,
                            Location::Interior,
                            Location::Exterior,
                        )?;
                    }
                }
            }
            Geometry::GeometryCollection(gc) => {
                for g in &gc.geometries {
                    self.add_geometry(g)?;
                }
            }
        }
        Ok(())
    }

    fn add_line_string(&mut self, coords: &[Coordinate]) -> Result<(), TopologyError> {
        let pts = remove_repeated_points(coords);
        if pts.len() < 2 {
            return Err(TopologyError::robustness_at(
                "too few distinct points in line",
                pts.first().copied().unwrap_or_default(),
            ));
        }
        let first = pts[0];
        let last = pts[pts.len() - 1];
        self.edges
            .push(Edge::new(pts, Label::new_line(self.arg_index, Location::Interior)));
        // The mod-2 rule: an endpoint visited an odd number of times is a
        // boundary point, an even number of times an interior one. A closed
        // line contributes its endpoint twice.
        self.insert_boundary_point(first);
        self.insert_boundary_point(last);
        Ok(())
    }

    /// Adds one polygon ring with the given locations for the left and right
    /// side of a clockwise traversal.
    fn add_polygon_ring(
        &mut self,
        coords: &[Coordinate],
        cw_left: Location,
        cw_right: Location,
    ) -> Result<(), TopologyError> {
        if coords.is_empty() {
            return Ok(());
        }
        let pts = remove_repeated_points(coords);
        if pts.len() < 4 {
            return Err(TopologyError::robustness_at(
                "too few distinct points in ring",
                pts.first().copied().unwrap_or_default(),
            ));
        }
        let (left, right) = if is_ccw(&pts) {
            (cw_right, cw_left)
        } else {
            (cw_left, cw_right)
        };
        let first = pts[0];
        self.edges.push(Edge::new(
            pts,
            Label::new_area(self.arg_index, Location::Boundary, left, right),
        ));
        self.insert_point(first, Location::Boundary);
        Ok(())
    }

    fn insert_point(&mut self, coord: Coordinate, loc: Location) {
        self.nodes
            .entry(coord.key())
            .and_modify(|n| n.on_location = loc)
            .or_insert(NodePoint {
                coord,
                on_location: loc,
            });
    }

    /// Toggles an endpoint between boundary and interior per the mod-2 rule.
    fn insert_boundary_point(&mut self, coord: Coordinate) {
        let node = self.nodes.entry(coord.key()).or_insert(NodePoint {
            coord,
            on_location: Location::None,
        });
        node.on_location = if node.on_location == Location::Boundary {
            Location::Interior
        } else {
            Location::Boundary
        };
    }

    fn is_boundary_node(&self, coord: &Coordinate) -> bool {
        self.nodes
            .get(&coord.key())
            .map(|n| n.on_location == Location::Boundary)
            .unwrap_or(false)
    }

    /// Computes self-intersections and registers the corresponding node
    /// points. Segments of a single ring are not tested against each other
    /// when the input is polygonal (valid rings do not self-intersect).
    pub fn compute_self_nodes(&mut self, li: LineIntersector) {
        let mut si = SegmentIntersector::new(li, true, false);
        let is_rings = matches!(
            self.geometry,
            Geometry::LinearRing(_) | Geometry::Polygon(_) | Geometry::MultiPolygon(_)
        );
        compute_self_intersections(&mut si, &mut self.edges, !is_rings);
        self.add_self_intersection_nodes();
    }

    fn add_self_intersection_nodes(&mut self) {
        let arg = self.arg_index;
        let mut to_insert: Vec<(Coordinate, Location)> = Vec::new();
        for e in &self.edges {
            let e_loc = e.label.location(arg);
            for ei in e.eil.iter() {
                to_insert.push((ei.coord, e_loc));
            }
        }
        for (coord, loc) in to_insert {
            if self.is_boundary_node(&coord) {
                continue;
            }
            if loc == Location::Boundary {
                self.insert_boundary_point(coord);
            } else {
                self.insert_point(coord, loc);
            }
        }
    }

    /// Computes intersections between this graph's edges and another
    /// graph's, recording them on the edges of both.
    pub fn compute_edge_intersections(
        &mut self,
        other: &mut GeometryGraph<'_>,
        li: LineIntersector,
        include_proper: bool,
    ) {
        let mut si = SegmentIntersector::new(li, include_proper, true);
        compute_cross_intersections(&mut si, &mut self.edges, &mut other.edges);
    }

    /// Emits the split edges of every edge into `out`.
    pub fn compute_split_edges(&self, out: &mut Vec<Edge>) {
        for e in &self.edges {
            e.split_edges(out);
        }
    }
}

/// Drops consecutive duplicate coordinates.
pub(crate) fn remove_repeated_points(coords: &[Coordinate]) -> Vec<Coordinate> {
    let mut out: Vec<Coordinate> = Vec::with_capacity(coords.len());
    for c in coords {
        if out.last() != Some(c) {
            out.push(*c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::GeometryFactory;

    fn c(x: f64, y: f64) -> Coordinate {
        Coordinate::new(x, y)
    }

    #[test]
    fn test_remove_repeated() {
        let pts = vec![c(0.0, 0.0), c(0.0, 0.0), c(1.0, 0.0), c(1.0, 0.0), c(2.0, 0.0)];
        assert_eq!(
            remove_repeated_points(&pts),
            vec![c(0.0, 0.0), c(1.0, 0.0), c(2.0, 0.0)]
        );
    }

    #[test]
    fn test_polygon_edge_orientation_label() {
        let f = GeometryFactory::default();
        // CCW shell: walking the ring, the interior is on the left.
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
        let graph = GeometryGraph::new(0, &poly).unwrap();
        assert_eq!(graph.edges.len(), 1);
        let label = graph.edges[0].label;
        assert_eq!(label.location(0), Location::Boundary);
        assert_eq!(
            label.location_at(0, crate::graph::label::Position::Left),
            Location::Interior
        );
        assert_eq!(
            label.location_at(0, crate::graph::label::Position::Right),
            Location::Exterior
        );
    }

    #[test]
    fn test_open_line_boundary_nodes() {
        let f = GeometryFactory::default();
        let line = f.create_line_string(vec![c(0.0, 0.0), c(1.0, 0.0), c(2.0, 0.0)]);
        let graph = GeometryGraph::new(1, &line).unwrap();
        let nodes: Vec<_> = graph.node_points().collect();
        assert_eq!(nodes.len(), 2);
        assert!(nodes.iter().all(|n| n.on_location == Location::Boundary));
    }

    #[test]
    fn test_closed_line_endpoint_is_interior() {
        let f = GeometryFactory::default();
        let line = f.create_line_string(vec![
            c(0.0, 0.0),
            c(2.0, 0.0),
            c(1.0, 2.0),
            c(0.0, 0.0),
        ]);
        let graph = GeometryGraph::new(0, &line).unwrap();
        let nodes: Vec<_> = graph.node_points().collect();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].on_location, Location::Interior);
    }

    #[test]
    fn test_self_crossing_line_gets_node() {
        let f = GeometryFactory::default();
        let line = f.create_line_string(vec![
            c(0.0, 0.0),
            c(2.0, 2.0),
            c(2.0, 0.0),
            c(0.0, 2.0),
        ]);
        let mut graph = GeometryGraph::new(0, &line).unwrap();
        graph.compute_self_nodes(LineIntersector::new());
        assert!(graph
            .node_points()
            .any(|n| n.coord == c(1.0, 1.0) && n.on_location == Location::Interior));
    }

    #[test]
    fn test_degenerate_ring_is_error() {
        let f = GeometryFactory::default();
        let poly = Geometry::Polygon(crate::geom::Polygon {
            shell: crate::geom::LinearRing {
                coords: vec![c(0.0, 0.0), c(1.0, 1.0), c(0.0, 0.0)],
                factory: f,
            },
            holes: vec![],
            factory: f,
        });
        assert!(GeometryGraph::new(0, &poly).is_err());
    }
}
