//! Cascaded union of polygonal batches.

use crate::error::TopologyError;
use crate::geom::Geometry;
use crate::spatial::{ItemsTree, StrTree};
use crate::union::{OverlapUnion, ZeroBuffer};

const STR_TREE_NODE_CAPACITY: usize = 4;

/// Unions a batch of polygonal geometries as a balanced binary reduction
/// over an STR-tree's grouping.
///
/// Loading the inputs into the tree concentrates pairwise unions on
/// spatially close polygons, so interior vertices cancel early in the
/// reduction instead of accumulating into the final union.
///
/// The instance is one-shot: [`union`](CascadedUnion::union) consumes it,
/// and the inputs are dropped piecemeal as the reduction proceeds.
pub struct CascadedUnion<'a> {
    inputs: Vec<Geometry>,
    buffer: Option<&'a dyn ZeroBuffer>,
}

impl<'a> CascadedUnion<'a> {
    pub fn new(inputs: Vec<Geometry>) -> Self {
        Self {
            inputs,
            buffer: None,
        }
    }

    /// Configures a buffer(0) provider for the per-pair fallback.
    pub fn with_buffer_fallback(mut self, buffer: &'a dyn ZeroBuffer) -> Self {
        self.buffer = Some(buffer);
        self
    }

    /// Computes the union of all inputs; `None` for an empty batch.
    pub fn union(self) -> Result<Option<Geometry>, TopologyError> {
        if self.inputs.is_empty() {
            return Ok(None);
        }
        let buffer = self.buffer;
        let mut index = StrTree::with_capacity(STR_TREE_NODE_CAPACITY);
        for g in self.inputs {
            index.insert(g.envelope(), g);
        }
        let items = index.items_tree();
        union_tree(items, buffer)
    }
}

fn union_tree(
    items: Vec<ItemsTree<Geometry>>,
    buffer: Option<&dyn ZeroBuffer>,
) -> Result<Option<Geometry>, TopologyError> {
    let geoms = reduce_to_geometries(items, buffer)?;
    binary_union(&geoms, 0, geoms.len(), buffer)
}

/// Flattens one tree level: items pass through, subtrees reduce to their
/// union first.
fn reduce_to_geometries(
    items: Vec<ItemsTree<Geometry>>,
    buffer: Option<&dyn ZeroBuffer>,
) -> Result<Vec<Geometry>, TopologyError> {
    let mut geoms = Vec::with_capacity(items.len());
    for item in items {
        match item {
            ItemsTree::Item(g) => geoms.push(g),
            ItemsTree::Node(children) => {
                if let Some(u) = union_tree(children, buffer)? {
                    geoms.push(u);
                }
            }
        }
    }
    Ok(geoms)
}

/// Unions a range of geometries by recursive halving.
fn binary_union(
    geoms: &[Geometry],
    start: usize,
    end: usize,
    buffer: Option<&dyn ZeroBuffer>,
) -> Result<Option<Geometry>, TopologyError> {
    if end - start <= 1 {
        union_safe(geoms.get(start).cloned(), None, buffer)
    } else if end - start == 2 {
        union_safe(
            geoms.get(start).cloned(),
            geoms.get(start + 1).cloned(),
            buffer,
        )
    } else {
        let mid = (start + end) / 2;
        let left = binary_union(geoms, start, mid, buffer)?;
        let right = binary_union(geoms, mid, end, buffer)?;
        union_safe(left, right, buffer)
    }
}

/// Union tolerating absent operands: a missing side passes the other
/// through.
fn union_safe(
    g0: Option<Geometry>,
    g1: Option<Geometry>,
    buffer: Option<&dyn ZeroBuffer>,
) -> Result<Option<Geometry>, TopologyError> {
    match (g0, g1) {
        (None, None) => Ok(None),
        (Some(g), None) | (None, Some(g)) => Ok(Some(g)),
        (Some(a), Some(b)) => union_actual(&a, &b, buffer).map(Some),
    }
}

fn union_actual(
    a: &Geometry,
    b: &Geometry,
    buffer: Option<&dyn ZeroBuffer>,
) -> Result<Geometry, TopologyError> {
    let mut ou = OverlapUnion::new(a, b);
    if let Some(buf) = buffer {
        ou = ou.with_buffer_fallback(buf);
    }
    let union = ou.union()?;
    Ok(restrict_to_polygons(union))
}

/// Drops any non-polygonal artifacts the overlay may surface (collapsed
/// lines or points along dissolved boundaries).
fn restrict_to_polygons(g: Geometry) -> Geometry {
    if g.is_polygonal() {
        return g;
    }
    let factory = g.factory();
    let mut polys = Vec::new();
    g.extract_polygons(&mut polys);
    if polys.len() == 1 {
        return polys.into_iter().next().unwrap();
    }
    let polygons = polys
        .into_iter()
        .map(|p| match p {
            Geometry::Polygon(p) => p,
            _ => unreachable!("extract_polygons yields polygons"),
        })
        .collect();
    factory.create_multi_polygon(polygons)
}
