//! planarum - Topological overlay and union for 2D planar geometry
//!
//! Computes set-theoretic combinations of planar geometries (intersection,
//! union, difference, symmetric difference) by building a labelled planar
//! graph from the noded inputs and extracting the result edges, with a
//! snapping-based robustness layer and cascaded union for polygonal batches.

pub mod algorithm;
pub mod error;
pub mod geom;
pub mod graph;
mod noding;
pub mod overlay;
pub mod snap;
pub mod spatial;
pub mod union;

pub use error::TopologyError;
pub use geom::{
    Coordinate, Envelope, Geometry, GeometryFactory, Location, PrecisionModel,
};
pub use overlay::{overlay, BooleanOp, OverlayOp};
pub use snap::GeometrySnapper;
pub use spatial::{ItemsTree, StrTree};
pub use union::{cascaded_union, unary_union, CascadedUnion, OverlapUnion, ZeroBuffer};
