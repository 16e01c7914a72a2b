//! The overlay's planar graph: arenas of edges, directed edges and nodes.
//!
//! Components reference each other by index. The two orientations of an edge
//! are allocated as an adjacent pair, so `sym(id) == id ^ 1`, and every node
//! keeps its outgoing directed edges sorted counter-clockwise by direction.
//! The whole graph lives for a single overlay invocation.

use crate::algorithm::locate_in_areas;
use crate::algorithm::orientation::orientation_index;
use crate::error::TopologyError;
use crate::geom::{CoordKey, Coordinate, Geometry, Location};
use crate::graph::edge::Edge;
use crate::graph::label::{Label, Position};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::collections::BTreeMap;

pub(crate) type EdgeId = usize;
pub(crate) type DirEdgeId = usize;
pub(crate) type NodeId = usize;
pub(crate) type RingId = usize;

/// The opposite orientation of a directed edge.
#[inline]
pub(crate) fn sym(de: DirEdgeId) -> DirEdgeId {
    de ^ 1
}

/// One orientation of an edge.
#[derive(Debug, Clone)]
pub(crate) struct DirectedEdge {
    pub edge: EdgeId,
    pub forward: bool,
    pub label: Label,
    /// Origin node.
    pub node: NodeId,
    /// Origin coordinate and the next coordinate along the direction.
    pub p0: Coordinate,
    pub p1: Coordinate,
    quadrant: u8,
    pub in_result: bool,
    pub visited: bool,
    /// Successor in a maximal result ring.
    pub next: Option<DirEdgeId>,
    /// Successor in a minimal result ring.
    pub next_min: Option<DirEdgeId>,
    pub edge_ring: Option<RingId>,
    pub min_edge_ring: Option<RingId>,
}

impl DirectedEdge {
    /// A line edge carries a line label and no interior claim from either
    /// area argument.
    pub fn is_line_edge(&self) -> bool {
        let is_line = self.label.is_line_arg(0) || self.label.is_line_arg(1);
        let exterior_if_area_0 = !self.label.is_area_arg(0)
            || self.label.all_positions_equal(0, Location::Exterior);
        let exterior_if_area_1 = !self.label.is_area_arg(1)
            || self.label.all_positions_equal(1, Location::Exterior);
        is_line && exterior_if_area_0 && exterior_if_area_1
    }

    /// An interior-area edge lies inside both area arguments on both sides;
    /// such edges are collapse artifacts and never border a result polygon.
    pub fn is_interior_area_edge(&self) -> bool {
        (0..2).all(|i| {
            self.label.is_area_arg(i)
                && self.label.location_at(i, Position::Left) == Location::Interior
                && self.label.location_at(i, Position::Right) == Location::Interior
        })
    }
}

/// A point where edges meet; owns the star of outgoing directed edges.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub coord: Coordinate,
    pub label: Label,
    /// Outgoing directed edges, sorted CCW from the positive x axis once
    /// [`PlanarGraph::sort_stars`] has run.
    pub star: SmallVec<[DirEdgeId; 8]>,
    /// Cached point-in-area location of this node per argument.
    area_location: [Location; 2],
}

/// The planar graph of one overlay invocation.
#[derive(Default)]
pub(crate) struct PlanarGraph {
    pub edges: Vec<Edge>,
    pub dir_edges: Vec<DirectedEdge>,
    pub nodes: Vec<Node>,
    node_map: BTreeMap<CoordKey, NodeId>,
}

impl PlanarGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, coord: Coordinate) -> NodeId {
        if let Some(&id) = self.node_map.get(&coord.key()) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(Node {
            coord,
            label: Label::new_null(),
            star: SmallVec::new(),
            area_location: [Location::None; 2],
        });
        self.node_map.insert(coord.key(), id);
        id
    }

    /// Sets a node's on location for one argument (used when copying input
    /// node points into the graph).
    pub fn set_node_location(&mut self, coord: Coordinate, arg: usize, loc: Location) {
        let id = self.add_node(coord);
        self.nodes[id].label.set_location(arg, loc);
    }

    /// Inserts the edges and creates their directed-edge pairs, attached to
    /// origin nodes.
    pub fn add_edges(&mut self, edges: Vec<Edge>) {
        for e in edges {
            let n = e.pts.len();
            debug_assert!(n >= 2);
            let eid = self.edges.len();

            let fwd_label = e.label;
            let mut bwd_label = e.label;
            bwd_label.flip();

            let fwd_node = self.add_node(e.pts[0]);
            let bwd_node = self.add_node(e.pts[n - 1]);

            let fwd = DirectedEdge {
                edge: eid,
                forward: true,
                label: fwd_label,
                node: fwd_node,
                p0: e.pts[0],
                p1: e.pts[1],
                quadrant: quadrant(e.pts[1].x - e.pts[0].x, e.pts[1].y - e.pts[0].y),
                in_result: false,
                visited: false,
                next: None,
                next_min: None,
                edge_ring: None,
                min_edge_ring: None,
            };
            let bwd = DirectedEdge {
                edge: eid,
                forward: false,
                label: bwd_label,
                node: bwd_node,
                p0: e.pts[n - 1],
                p1: e.pts[n - 2],
                quadrant: quadrant(
                    e.pts[n - 2].x - e.pts[n - 1].x,
                    e.pts[n - 2].y - e.pts[n - 1].y,
                ),
                in_result: false,
                visited: false,
                next: None,
                next_min: None,
                edge_ring: None,
                min_edge_ring: None,
            };

            let fwd_id = self.dir_edges.len();
            self.dir_edges.push(fwd);
            self.dir_edges.push(bwd);
            self.nodes[fwd_node].star.push(fwd_id);
            self.nodes[bwd_node].star.push(fwd_id + 1);
            self.edges.push(e);
        }
    }

    /// Sorts every node star counter-clockwise by outgoing direction.
    pub fn sort_stars(&mut self) {
        for node in &mut self.nodes {
            let dir_edges = &self.dir_edges;
            node.star
                .sort_by(|&a, &b| compare_direction(&dir_edges[a], &dir_edges[b]));
        }
    }

    // ------------------------------------------------------------------
    // Star labelling
    // ------------------------------------------------------------------

    /// Completes the labels of all directed edges around every node, then
    /// merges sym labels and folds the star labels into the node labels.
    pub fn compute_labelling(
        &mut self,
        g0: &Geometry,
        g1: &Geometry,
    ) -> Result<(), TopologyError> {
        for n in 0..self.nodes.len() {
            self.compute_node_labelling(n, g0, g1)?;
        }
        for n in 0..self.nodes.len() {
            self.merge_sym_labels(n);
            self.update_node_label(n);
        }
        Ok(())
    }

    fn compute_node_labelling(
        &mut self,
        n: NodeId,
        g0: &Geometry,
        g1: &Geometry,
    ) -> Result<(), TopologyError> {
        self.propagate_side_labels(n, 0)?;
        self.propagate_side_labels(n, 1)?;

        // A line label on a boundary marks a dimensional collapse: the area
        // argument degenerated to a line here, so unknown locations around
        // this node are exterior to it.
        let mut has_collapse = [false, false];
        for &de in &self.nodes[n].star {
            let label = &self.dir_edges[de].label;
            for (arg, flag) in has_collapse.iter_mut().enumerate() {
                if label.is_line_arg(arg) && label.location(arg) == Location::Boundary {
                    *flag = true;
                }
            }
        }

        let star: SmallVec<[DirEdgeId; 8]> = self.nodes[n].star.clone();
        for de in star {
            for arg in 0..2 {
                if self.dir_edges[de].label.is_any_null(arg) {
                    let loc = if has_collapse[arg] {
                        Location::Exterior
                    } else {
                        let g = if arg == 0 { g0 } else { g1 };
                        self.node_area_location(n, arg, g)
                    };
                    self.dir_edges[de].label.set_all_locations_if_null(arg, loc);
                }
            }
        }
        Ok(())
    }

    /// The cached point-in-area location of a node relative to one argument.
    /// Non-areal arguments are exterior by construction.
    fn node_area_location(&mut self, n: NodeId, arg: usize, g: &Geometry) -> Location {
        if self.nodes[n].area_location[arg] == Location::None {
            self.nodes[n].area_location[arg] = locate_in_areas(&self.nodes[n].coord, g);
        }
        self.nodes[n].area_location[arg]
    }

    /// Walks the star once, carrying the region location across edges and
    /// filling in unknown on and side locations for one argument.
    fn propagate_side_labels(&mut self, n: NodeId, arg: usize) -> Result<(), TopologyError> {
        let star: SmallVec<[DirEdgeId; 8]> = self.nodes[n].star.clone();

        // Start from the left side of the last area edge with a known left
        // location; in CCW order that is the region just before the first
        // edge.
        let mut start_loc = Location::None;
        for &de in &star {
            let label = &self.dir_edges[de].label;
            if label.is_area_arg(arg) && label.location_at(arg, Position::Left).is_known() {
                start_loc = label.location_at(arg, Position::Left);
            }
        }
        if start_loc == Location::None {
            return Ok(());
        }

        let mut curr_loc = start_loc;
        for &de in &star {
            let coord = self.nodes[n].coord;
            let label = &mut self.dir_edges[de].label;
            if label.location(arg) == Location::None {
                label.set_location(arg, curr_loc);
            }
            if label.is_area_arg(arg) {
                let left = label.location_at(arg, Position::Left);
                let right = label.location_at(arg, Position::Right);
                if right.is_known() {
                    if right != curr_loc {
                        return Err(TopologyError::robustness_at(
                            "side location conflict",
                            coord,
                        ));
                    }
                    if !left.is_known() {
                        return Err(TopologyError::robustness_at(
                            "single null side location",
                            coord,
                        ));
                    }
                    curr_loc = left;
                } else {
                    label.set_location_at(arg, Position::Right, curr_loc);
                    label.set_location_at(arg, Position::Left, curr_loc);
                }
            }
        }
        Ok(())
    }

    fn merge_sym_labels(&mut self, n: NodeId) {
        let star: SmallVec<[DirEdgeId; 8]> = self.nodes[n].star.clone();
        for de in star {
            let sym_label = self.dir_edges[sym(de)].label;
            self.dir_edges[de].label.merge(&sym_label);
        }
    }

    /// The star's merged on locations, taken from the underlying edge
    /// labels: any interior or boundary presence of an argument marks the
    /// node as interior to it.
    fn star_label(&self, n: NodeId) -> Label {
        let mut label = Label::new_null();
        for &de in &self.nodes[n].star {
            let edge_label = &self.edges[self.dir_edges[de].edge].label;
            for arg in 0..2 {
                let loc = edge_label.location(arg);
                if loc == Location::Interior || loc == Location::Boundary {
                    label.set_location(arg, Location::Interior);
                }
            }
        }
        label
    }

    fn update_node_label(&mut self, n: NodeId) {
        let star_label = self.star_label(n);
        self.nodes[n].label.merge(&star_label);
    }

    /// Pushes a node's (completed) label into every incident directed edge
    /// whose label is still missing an argument.
    pub fn update_star_labelling(&mut self, n: NodeId) {
        let node_label = self.nodes[n].label;
        let star: SmallVec<[DirEdgeId; 8]> = self.nodes[n].star.clone();
        for de in star {
            for arg in 0..2 {
                let loc = node_label.location(arg);
                if loc.is_known() {
                    self.dir_edges[de].label.set_all_locations_if_null(arg, loc);
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Result-edge linking
    // ------------------------------------------------------------------

    /// The star edges that are in the result in either orientation, in CCW
    /// order.
    fn result_area_edges(&self, n: NodeId) -> SmallVec<[DirEdgeId; 8]> {
        self.nodes[n]
            .star
            .iter()
            .copied()
            .filter(|&de| self.dir_edges[de].in_result || self.dir_edges[sym(de)].in_result)
            .collect()
    }

    /// Links each incoming result edge to the next outgoing result edge in
    /// CCW order, defining the successor relation rings are traversed by.
    pub fn link_result_directed_edges(&mut self, n: NodeId) -> Result<(), TopologyError> {
        let result_edges = self.result_area_edges(n);
        let mut first_out: Option<DirEdgeId> = None;
        let mut incoming: Option<DirEdgeId> = None;
        let mut linking = false;

        for &next_out in &result_edges {
            let next_in = sym(next_out);
            if !self.dir_edges[next_out].label.is_area() {
                continue;
            }
            if first_out.is_none() && self.dir_edges[next_out].in_result {
                first_out = Some(next_out);
            }
            if !linking {
                if !self.dir_edges[next_in].in_result {
                    continue;
                }
                incoming = Some(next_in);
                linking = true;
            } else {
                if !self.dir_edges[next_out].in_result {
                    continue;
                }
                self.dir_edges[incoming.unwrap()].next = Some(next_out);
                linking = false;
            }
        }
        if linking {
            let first = first_out.ok_or_else(|| {
                TopologyError::robustness_at("no outgoing directed edge found", self.nodes[n].coord)
            })?;
            self.dir_edges[incoming.unwrap()].next = Some(first);
        }
        Ok(())
    }

    /// Links the edges of one maximal ring into minimal rings, scanning the
    /// star clockwise and connecting via the `next_min` successors.
    pub fn link_minimal_directed_edges(&mut self, n: NodeId, er: RingId) {
        let result_edges = self.result_area_edges(n);
        let mut first_out: Option<DirEdgeId> = None;
        let mut incoming: Option<DirEdgeId> = None;
        let mut linking = false;

        for &next_out in result_edges.iter().rev() {
            let next_in = sym(next_out);
            if first_out.is_none() && self.dir_edges[next_out].edge_ring == Some(er) {
                first_out = Some(next_out);
            }
            if !linking {
                if self.dir_edges[next_in].edge_ring != Some(er) {
                    continue;
                }
                incoming = Some(next_in);
                linking = true;
            } else {
                if self.dir_edges[next_out].edge_ring != Some(er) {
                    continue;
                }
                self.dir_edges[incoming.unwrap()].next_min = Some(next_out);
                linking = false;
            }
        }
        if linking {
            if let (Some(incoming), Some(first)) = (incoming, first_out) {
                self.dir_edges[incoming].next_min = Some(first);
            }
        }
    }

    /// Number of outgoing star edges assigned to a given maximal ring.
    pub fn outgoing_degree_in_ring(&self, n: NodeId, er: RingId) -> usize {
        self.nodes[n]
            .star
            .iter()
            .filter(|&&de| self.dir_edges[de].edge_ring == Some(er))
            .count()
    }

    /// Marks line edges around a node as covered or not by the result area,
    /// by sweeping the region state across the star.
    pub fn find_covered_line_edges(&mut self, n: NodeId) {
        // Find a starting region from an area edge: moving CCW past an
        // outgoing result edge leaves the result area, past an incoming one
        // enters it.
        let star: SmallVec<[DirEdgeId; 8]> = self.nodes[n].star.clone();
        let mut start_loc = Location::None;
        for &next_out in &star {
            let next_in = sym(next_out);
            if !self.dir_edges[next_out].is_line_edge() {
                if self.dir_edges[next_out].in_result {
                    start_loc = Location::Interior;
                    break;
                }
                if self.dir_edges[next_in].in_result {
                    start_loc = Location::Exterior;
                    break;
                }
            }
        }
        if start_loc == Location::None {
            return;
        }

        let mut curr_loc = start_loc;
        for &next_out in &star {
            let next_in = sym(next_out);
            if self.dir_edges[next_out].is_line_edge() {
                let eid = self.dir_edges[next_out].edge;
                self.edges[eid].covered = Some(curr_loc == Location::Interior);
            } else {
                if self.dir_edges[next_out].in_result {
                    curr_loc = Location::Exterior;
                }
                if self.dir_edges[next_in].in_result {
                    curr_loc = Location::Interior;
                }
            }
        }
    }
}

#[inline]
fn quadrant(dx: f64, dy: f64) -> u8 {
    if dx >= 0.0 {
        if dy >= 0.0 {
            0
        } else {
            3
        }
    } else if dy >= 0.0 {
        1
    } else {
        2
    }
}

/// CCW-from-east ordering of outgoing directions at a shared origin.
fn compare_direction(a: &DirectedEdge, b: &DirectedEdge) -> Ordering {
    let adx = a.p1.x - a.p0.x;
    let ady = a.p1.y - a.p0.y;
    let bdx = b.p1.x - b.p0.x;
    let bdy = b.p1.y - b.p0.y;
    if adx == bdx && ady == bdy {
        return Ordering::Equal;
    }
    match a.quadrant.cmp(&b.quadrant) {
        Ordering::Equal => match orientation_index(&b.p0, &b.p1, &a.p1) {
            1 => Ordering::Greater,
            -1 => Ordering::Less,
            _ => Ordering::Equal,
        },
        ord => ord,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::label::Label;

    fn c(x: f64, y: f64) -> Coordinate {
        Coordinate::new(x, y)
    }

    fn line_edge(pts: Vec<Coordinate>) -> Edge {
        Edge::new(pts, Label::new_line(0, Location::Interior))
    }

    #[test]
    fn test_sym_pairing() {
        let mut g = PlanarGraph::new();
        g.add_edges(vec![line_edge(vec![c(0.0, 0.0), c(1.0, 0.0)])]);
        assert_eq!(g.dir_edges.len(), 2);
        assert_eq!(sym(0), 1);
        assert_eq!(sym(sym(0)), 0);
        assert!(g.dir_edges[0].forward);
        assert!(!g.dir_edges[1].forward);
        assert_eq!(g.dir_edges[0].p0, g.dir_edges[1].p1);
    }

    #[test]
    fn test_nodes_shared_between_edges() {
        let mut g = PlanarGraph::new();
        g.add_edges(vec![
            line_edge(vec![c(0.0, 0.0), c(1.0, 0.0)]),
            line_edge(vec![c(1.0, 0.0), c(2.0, 1.0)]),
        ]);
        // Three nodes: (0,0), (1,0) shared, (2,1).
        assert_eq!(g.nodes.len(), 3);
        let shared = g.nodes.iter().find(|n| n.coord == c(1.0, 0.0)).unwrap();
        assert_eq!(shared.star.len(), 2);
    }

    #[test]
    fn test_star_sorted_ccw() {
        let mut g = PlanarGraph::new();
        // Four edges leaving the origin towards E, N, W, S, inserted out of
        // order.
        g.add_edges(vec![
            line_edge(vec![c(0.0, 0.0), c(0.0, 1.0)]),
            line_edge(vec![c(0.0, 0.0), c(-1.0, 0.0)]),
            line_edge(vec![c(0.0, 0.0), c(1.0, 0.0)]),
            line_edge(vec![c(0.0, 0.0), c(0.0, -1.0)]),
        ]);
        g.sort_stars();
        let origin = g.nodes.iter().find(|n| n.coord == c(0.0, 0.0)).unwrap();
        let dirs: Vec<Coordinate> = origin
            .star
            .iter()
            .map(|&de| g.dir_edges[de].p1)
            .collect();
        assert_eq!(
            dirs,
            vec![c(1.0, 0.0), c(0.0, 1.0), c(-1.0, 0.0), c(0.0, -1.0)]
        );
    }

    #[test]
    fn test_quadrants() {
        assert_eq!(quadrant(1.0, 1.0), 0);
        assert_eq!(quadrant(-1.0, 1.0), 1);
        assert_eq!(quadrant(-1.0, -1.0), 2);
        assert_eq!(quadrant(1.0, -1.0), 3);
        assert_eq!(quadrant(0.0, 1.0), 0);
        assert_eq!(quadrant(0.0, -1.0), 3);
    }
}
