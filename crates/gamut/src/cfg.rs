//! Tolerance defaults for gamut geometry (internal).
//!
//! Policy
//! - Defaults are fixed constants to avoid “tolerance juggling” during normal
//!   development. The winding-number test and the low-dimensional predicates use
//!   none of these: they decide on exact zeros.

/// Relative visibility epsilon for Quickhull; scaled by the largest coordinate
/// magnitude of the input (see `hull::build::relative_eps`).
pub(crate) const HULL_EPS: f64 = 1e-10;
/// Membership slack of the fast convex test, per unit of facet-normal length.
pub(crate) const FEAS_EPS: f64 = 1e-9;
/// Slack for triangle membership of points that lie on a facet plane by
/// construction (line crossings, plane projections).
pub(crate) const PLANE_EPS: f64 = 1e-9;
/// Batches at or above this many points are evaluated on the rayon pool.
pub(crate) const PARALLEL_THRESHOLD: usize = 256;
