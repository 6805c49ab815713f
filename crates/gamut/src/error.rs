//! Error type shared by construction and queries.

/// Everything that can go wrong while building or querying a gamut.
///
/// Construction failures abort gamut creation; query failures abort the whole
/// batch call (no per-point coercion to `false` or “unchanged”).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    /// Fewer than 4 affinely independent points, all points coplanar, or
    /// non-finite coordinates.
    #[error("degenerate hull: {reason}")]
    DegenerateHull { reason: String },

    /// Shape canonicalization handles at most 4 points.
    #[error("expected at most 4 points, got {count}")]
    TooManyPoints { count: usize },

    /// Shape canonicalization needs at least one point.
    #[error("expected at least one point")]
    TooFewPoints,

    /// A line projection was asked for the centre itself (zero-length ray).
    #[error("point {index} coincides with the projection centre")]
    CoincidentCentre { index: usize },

    /// Axis compression over a batch whose coordinates on `axis` are all equal.
    #[error("batch has zero extent on axis {axis}")]
    ZeroRange { axis: usize },

    /// Batch shape whose trailing axis is not 3 or whose size disagrees with
    /// the flat data length.
    #[error("shape {shape:?} does not describe {len} coordinates with a trailing axis of 3")]
    ShapeMismatch { shape: Vec<usize>, len: usize },

    /// A query point with a NaN or infinite coordinate.
    #[error("point {index} has a non-finite coordinate")]
    NonFinite { index: usize },

    #[error("axis {axis} out of range for 3-D points")]
    AxisOutOfRange { axis: usize },

    /// The convex shortcut is only valid for unmodified (gamma = 1) hulls.
    #[error("convex inclusion test requested on a modified hull (gamma = {gamma})")]
    NotConvex { gamma: f64 },
}

impl GeometryError {
    pub(crate) fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegenerateHull {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GeometryError>;
