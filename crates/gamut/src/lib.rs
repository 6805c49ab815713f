//! Colour gamuts as triangulated polytopes.
//!
//! A gamut is the hull of a set of colours in a 3-D colour space. This crate
//! builds that hull (plain convex, or radially “modified” so slightly concave
//! gamuts keep their dents) and answers the geometric questions gamut mapping
//! needs: is a colour inside, where does it leave the gamut along a line from
//! the centre, which surface point is nearest, and how to squeeze a batch onto
//! the gamut's extent.
//!
//! API Policy
//! - Queries take batches of any rank (`PointBatch`) and return results of the
//!   matching shape; a per-point failure fails the whole call.
//! - Low-dimensional predicates are exact (no tolerances); hull construction,
//!   the convex shortcut and the projections use the constants in `cfg`.

mod cfg;

pub mod batch;
pub mod compress;
pub mod error;
pub mod gamut;
pub mod hull;
pub mod inclusion;
pub mod predicates;
pub mod project;
pub mod sample;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use batch::{Mask, Point3, PointBatch};
pub use error::{GeometryError, Result};
pub use gamut::{Gamut, Space};
pub use hull::{Hull, HullCfg};
pub use inclusion::InclusionMethod;

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::batch::{Mask, Point3, PointBatch};
    pub use crate::error::{GeometryError, Result};
    pub use crate::gamut::{Gamut, Space};
    pub use crate::hull::{Hull, HullCfg};
    pub use crate::inclusion::InclusionMethod;
    pub use crate::predicates::{
        in_polygon, in_tetrahedron, in_triangle, interior, is_coplanar, on_segment, orientation,
        true_shape, Shape,
    };
    pub use crate::sample::ReplayToken;
}
