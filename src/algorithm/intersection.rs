//! Segment/segment intersection.

use crate::algorithm::orientation::orientation_index;
use crate::geom::{Coordinate, Envelope, PrecisionModel};

/// What two segments have in common.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IntersectionKind {
    /// No shared point.
    None,
    /// A single shared point.
    Point,
    /// A collinear overlap described by two points.
    Collinear,
}

/// Computes intersections between two line segments.
///
/// The intersector is reused across many segment pairs during noding; each
/// call to [`compute_intersection`](LineIntersector::compute_intersection)
/// replaces the previous result. A *proper* intersection lies in the interior
/// of both segments; an *interior* intersection (with respect to one input)
/// is any intersection point that is not an endpoint of that input.
///
/// Computed (as opposed to copied) intersection points are rounded onto the
/// precision model's grid when one is configured.
#[derive(Debug, Clone)]
pub struct LineIntersector {
    precision_model: Option<PrecisionModel>,
    input: [[Coordinate; 2]; 2],
    int_pts: [Coordinate; 2],
    kind: IntersectionKind,
    proper: bool,
}

impl LineIntersector {
    pub fn new() -> Self {
        Self {
            precision_model: None,
            input: [[Coordinate::new(0.0, 0.0); 2]; 2],
            int_pts: [Coordinate::new(0.0, 0.0); 2],
            kind: IntersectionKind::None,
            proper: false,
        }
    }

    pub fn with_precision_model(precision_model: PrecisionModel) -> Self {
        Self {
            precision_model: Some(precision_model),
            ..Self::new()
        }
    }

    /// Computes the intersection of segments `p1`-`p2` and `q1`-`q2`.
    pub fn compute_intersection(
        &mut self,
        p1: &Coordinate,
        p2: &Coordinate,
        q1: &Coordinate,
        q2: &Coordinate,
    ) {
        self.input = [[*p1, *p2], [*q1, *q2]];
        self.proper = false;
        self.kind = self.compute_intersect(p1, p2, q1, q2);
    }

    pub fn has_intersection(&self) -> bool {
        self.kind != IntersectionKind::None
    }

    /// Number of intersection points (0, 1 or 2).
    pub fn intersection_num(&self) -> usize {
        match self.kind {
            IntersectionKind::None => 0,
            IntersectionKind::Point => 1,
            IntersectionKind::Collinear => 2,
        }
    }

    /// The `i`-th intersection point of the last computation.
    pub fn intersection(&self, i: usize) -> Coordinate {
        self.int_pts[i]
    }

    /// True when the segments intersect in a single point interior to both.
    pub fn is_proper(&self) -> bool {
        self.has_intersection() && self.proper
    }

    /// True when some intersection point is not an endpoint of either input.
    pub fn is_interior_intersection(&self) -> bool {
        self.is_interior_intersection_of(0) || self.is_interior_intersection_of(1)
    }

    /// True when `pt` is one of the computed intersection points.
    pub fn is_intersection(&self, pt: &Coordinate) -> bool {
        (0..self.intersection_num()).any(|i| self.int_pts[i].equals_2d(pt))
    }

    /// Distance of intersection point `int_index` along input segment
    /// `input_index`, measured on the dominant axis.
    ///
    /// Using the axis with the larger extent keeps the ordering of
    /// intersection points along a segment stable even when one ordinate
    /// barely changes.
    pub fn edge_distance(&self, input_index: usize, int_index: usize) -> f64 {
        let p = &self.int_pts[int_index];
        let p0 = &self.input[input_index][0];
        let p1 = &self.input[input_index][1];
        let dx = (p1.x - p0.x).abs();
        let dy = (p1.y - p0.y).abs();
        if p.equals_2d(p0) {
            return 0.0;
        }
        if p.equals_2d(p1) {
            return if dx > dy { dx } else { dy };
        }
        let pdx = (p.x - p0.x).abs();
        let pdy = (p.y - p0.y).abs();
        let mut dist = if dx > dy { pdx } else { pdy };
        if dist == 0.0 {
            dist = pdx.max(pdy);
        }
        dist
    }

    /// True when some intersection point is not an endpoint of input
    /// `input_index`.
    pub fn is_interior_intersection_of(&self, input_index: usize) -> bool {
        for i in 0..self.intersection_num() {
            let pt = &self.int_pts[i];
            if !(pt.equals_2d(&self.input[input_index][0])
                || pt.equals_2d(&self.input[input_index][1]))
            {
                return true;
            }
        }
        false
    }

    fn compute_intersect(
        &mut self,
        p1: &Coordinate,
        p2: &Coordinate,
        q1: &Coordinate,
        q2: &Coordinate,
    ) -> IntersectionKind {
        // Cheap envelope reject first.
        let env_p = Envelope::from_coordinates(p1, p2);
        let env_q = Envelope::from_coordinates(q1, q2);
        if !env_p.intersects(&env_q) {
            return IntersectionKind::None;
        }

        let pq1 = orientation_index(p1, p2, q1);
        let pq2 = orientation_index(p1, p2, q2);
        if (pq1 > 0 && pq2 > 0) || (pq1 < 0 && pq2 < 0) {
            return IntersectionKind::None;
        }

        let qp1 = orientation_index(q1, q2, p1);
        let qp2 = orientation_index(q1, q2, p2);
        if (qp1 > 0 && qp2 > 0) || (qp1 < 0 && qp2 < 0) {
            return IntersectionKind::None;
        }

        if pq1 == 0 && pq2 == 0 && qp1 == 0 && qp2 == 0 {
            return self.compute_collinear(p1, p2, q1, q2, &env_p, &env_q);
        }

        // A single intersection point. When an endpoint lies on the other
        // segment, use it exactly rather than recomputing it.
        if pq1 == 0 || pq2 == 0 || qp1 == 0 || qp2 == 0 {
            self.int_pts[0] = if p1.equals_2d(q1) || p1.equals_2d(q2) {
                *p1
            } else if p2.equals_2d(q1) || p2.equals_2d(q2) {
                *p2
            } else if pq1 == 0 {
                *q1
            } else if pq2 == 0 {
                *q2
            } else if qp1 == 0 {
                *p1
            } else {
                *p2
            };
        } else {
            self.proper = true;
            self.int_pts[0] = self.interior_intersection_point(p1, p2, q1, q2);
        }
        IntersectionKind::Point
    }

    fn compute_collinear(
        &mut self,
        p1: &Coordinate,
        p2: &Coordinate,
        q1: &Coordinate,
        q2: &Coordinate,
        env_p: &Envelope,
        env_q: &Envelope,
    ) -> IntersectionKind {
        let q1_in_p = env_p.contains(q1);
        let q2_in_p = env_p.contains(q2);
        let p1_in_q = env_q.contains(p1);
        let p2_in_q = env_q.contains(p2);

        if q1_in_p && q2_in_p {
            self.int_pts[0] = *q1;
            self.int_pts[1] = *q2;
            return IntersectionKind::Collinear;
        }
        if p1_in_q && p2_in_q {
            self.int_pts[0] = *p1;
            self.int_pts[1] = *p2;
            return IntersectionKind::Collinear;
        }
        if q1_in_p && p1_in_q {
            self.int_pts[0] = *q1;
            self.int_pts[1] = *p1;
            return if q1.equals_2d(p1) && !q2_in_p && !p2_in_q {
                IntersectionKind::Point
            } else {
                IntersectionKind::Collinear
            };
        }
        if q1_in_p && p2_in_q {
            self.int_pts[0] = *q1;
            self.int_pts[1] = *p2;
            return if q1.equals_2d(p2) && !q2_in_p && !p1_in_q {
                IntersectionKind::Point
            } else {
                IntersectionKind::Collinear
            };
        }
        if q2_in_p && p1_in_q {
            self.int_pts[0] = *q2;
            self.int_pts[1] = *p1;
            return if q2.equals_2d(p1) && !q1_in_p && !p2_in_q {
                IntersectionKind::Point
            } else {
                IntersectionKind::Collinear
            };
        }
        if q2_in_p && p2_in_q {
            self.int_pts[0] = *q2;
            self.int_pts[1] = *p2;
            return if q2.equals_2d(p2) && !q1_in_p && !p1_in_q {
                IntersectionKind::Point
            } else {
                IntersectionKind::Collinear
            };
        }
        IntersectionKind::None
    }

    /// Computes a proper intersection point parametrically, falling back to
    /// the nearest input endpoint when rounding pushes the computed point
    /// outside both segment envelopes.
    fn interior_intersection_point(
        &self,
        p1: &Coordinate,
        p2: &Coordinate,
        q1: &Coordinate,
        q2: &Coordinate,
    ) -> Coordinate {
        let dpx = p2.x - p1.x;
        let dpy = p2.y - p1.y;
        let dqx = q2.x - q1.x;
        let dqy = q2.y - q1.y;
        let denom = dpx * dqy - dpy * dqx;

        let mut int_pt = if denom == 0.0 {
            nearest_endpoint(p1, p2, q1, q2)
        } else {
            let t = ((q1.x - p1.x) * dqy - (q1.y - p1.y) * dqx) / denom;
            Coordinate::new(p1.x + t * dpx, p1.y + t * dpy)
        };

        if !self.is_in_segment_envelopes(&int_pt, p1, p2, q1, q2) {
            int_pt = nearest_endpoint(p1, p2, q1, q2);
        }
        if let Some(pm) = &self.precision_model {
            pm.make_coordinate_precise(&mut int_pt);
        }
        int_pt
    }

    fn is_in_segment_envelopes(
        &self,
        pt: &Coordinate,
        p1: &Coordinate,
        p2: &Coordinate,
        q1: &Coordinate,
        q2: &Coordinate,
    ) -> bool {
        Envelope::from_coordinates(p1, p2).contains(pt)
            && Envelope::from_coordinates(q1, q2).contains(pt)
    }
}

impl Default for LineIntersector {
    fn default() -> Self {
        Self::new()
    }
}

/// The input endpoint closest to the other segment; a safe substitute for a
/// badly conditioned computed intersection.
fn nearest_endpoint(
    p1: &Coordinate,
    p2: &Coordinate,
    q1: &Coordinate,
    q2: &Coordinate,
) -> Coordinate {
    let mut nearest = *p1;
    let mut min_dist = distance_point_segment(p1, q1, q2);
    for (pt, s0, s1) in [(p2, q1, q2), (q1, p1, p2), (q2, p1, p2)] {
        let dist = distance_point_segment(pt, s0, s1);
        if dist < min_dist {
            min_dist = dist;
            nearest = *pt;
        }
    }
    nearest
}

/// Distance from a point to the segment `s0`-`s1`.
pub(crate) fn distance_point_segment(p: &Coordinate, s0: &Coordinate, s1: &Coordinate) -> f64 {
    let len_sq = s0.distance_squared(s1);
    if len_sq == 0.0 {
        return p.distance(s0);
    }
    let t = ((p.x - s0.x) * (s1.x - s0.x) + (p.y - s0.y) * (s1.y - s0.y)) / len_sq;
    let t = t.clamp(0.0, 1.0);
    let proj = Coordinate::new(s0.x + t * (s1.x - s0.x), s0.y + t * (s1.y - s0.y));
    p.distance(&proj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn c(x: f64, y: f64) -> Coordinate {
        Coordinate::new(x, y)
    }

    #[test]
    fn test_proper_crossing() {
        let mut li = LineIntersector::new();
        li.compute_intersection(&c(0.0, 0.0), &c(2.0, 2.0), &c(0.0, 2.0), &c(2.0, 0.0));
        assert!(li.has_intersection());
        assert!(li.is_proper());
        assert_eq!(li.intersection_num(), 1);
        assert_eq!(li.intersection(0), c(1.0, 1.0));
        assert!(li.is_interior_intersection());
    }

    #[test]
    fn test_disjoint() {
        let mut li = LineIntersector::new();
        li.compute_intersection(&c(0.0, 0.0), &c(1.0, 0.0), &c(0.0, 1.0), &c(1.0, 1.0));
        assert!(!li.has_intersection());
        assert!(!li.is_proper());
    }

    #[test]
    fn test_endpoint_touch_is_not_proper() {
        let mut li = LineIntersector::new();
        li.compute_intersection(&c(0.0, 0.0), &c(1.0, 1.0), &c(1.0, 1.0), &c(2.0, 0.0));
        assert!(li.has_intersection());
        assert!(!li.is_proper());
        assert_eq!(li.intersection(0), c(1.0, 1.0));
        assert!(!li.is_interior_intersection());
    }

    #[test]
    fn test_vertex_on_interior_is_not_proper() {
        let mut li = LineIntersector::new();
        li.compute_intersection(&c(0.0, 0.0), &c(2.0, 0.0), &c(1.0, 0.0), &c(1.0, 1.0));
        assert!(li.has_intersection());
        assert!(!li.is_proper());
        assert_eq!(li.intersection(0), c(1.0, 0.0));
        // Interior of the horizontal segment, endpoint of the vertical one.
        assert!(li.is_interior_intersection_of(0));
        assert!(!li.is_interior_intersection_of(1));
    }

    #[test]
    fn test_collinear_overlap() {
        let mut li = LineIntersector::new();
        li.compute_intersection(&c(0.0, 0.0), &c(2.0, 0.0), &c(1.0, 0.0), &c(3.0, 0.0));
        assert!(li.has_intersection());
        assert_eq!(li.intersection_num(), 2);
        let a = li.intersection(0);
        let b = li.intersection(1);
        assert!(a == c(1.0, 0.0) || b == c(1.0, 0.0));
        assert!(a == c(2.0, 0.0) || b == c(2.0, 0.0));
    }

    #[test]
    fn test_collinear_endpoint_touch() {
        let mut li = LineIntersector::new();
        li.compute_intersection(&c(0.0, 0.0), &c(1.0, 0.0), &c(1.0, 0.0), &c(2.0, 0.0));
        assert!(li.has_intersection());
        assert_eq!(li.intersection_num(), 1);
        assert_eq!(li.intersection(0), c(1.0, 0.0));
    }

    #[test]
    fn test_precision_rounding() {
        let mut li =
            LineIntersector::with_precision_model(PrecisionModel::Fixed { scale: 100.0 });
        li.compute_intersection(&c(0.0, 0.0), &c(10.0, 10.0), &c(0.0, 10.0), &c(3.0, 0.0));
        assert!(li.is_proper());
        let p = li.intersection(0);
        assert_eq!(p.x, (p.x * 100.0).round() / 100.0);
        assert_eq!(p.y, (p.y * 100.0).round() / 100.0);
    }

    #[test]
    fn test_distance_point_segment() {
        let d = distance_point_segment(&c(1.0, 1.0), &c(0.0, 0.0), &c(2.0, 0.0));
        assert_relative_eq!(d, 1.0, epsilon = 1e-12);
        let d = distance_point_segment(&c(5.0, 0.0), &c(0.0, 0.0), &c(2.0, 0.0));
        assert_relative_eq!(d, 3.0, epsilon = 1e-12);
    }
}
