//! Triangulated hulls of colour point sets.
//!
//! Purpose
//! - Give every gamut a closed triangulated surface: the convex hull of its
//!   points, or a “modified” hull whose topology comes from radially warped
//!   points.
//!
//! Why this design (short)
//! - Incremental Quickhull with a relative visibility epsilon; dependency-light
//!   and deterministic for a given input order.
//! - Topology only: facets are index triples into the caller's points, so the
//!   same hull can be evaluated on the unwarped coordinates.
//! - Orientation is normalized after construction against the vertex centroid,
//!   on the unwarped points, which is what the winding test expects.
//!
//! Assumptions and conventions
//! - Modified hull: `p' = c + ‖p − c‖^γ · (p − c)/‖p − c‖`; points equal to the
//!   centre stay at the centre. With no centre given, the centroid of all
//!   points is used.
//! - Normalization swaps the first and last index of facet `[a, b, c]` when
//!   `(p_a − m)·((p_b − p_a)×(p_c − p_a)) < 0`; for a non-convex modified hull
//!   this is the documented heuristic, not a guarantee of outwardness.
//! - Points lying on hull faces or edges are not vertices.

mod build;
mod types;

pub use build::build_hull;
pub(crate) use build::{centroid, relative_eps};
pub use types::{Hull, HullCfg};

#[cfg(test)]
mod tests;
