//! Error types surfaced to the host.

/// Error returned when a stored shape cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum ShapeError {
    /// The serialized shape is not valid JSON or does not match any variant.
    #[error("failed to parse placement shape: {0}")]
    Parse(#[from] serde_json::Error),
    /// A size field is negative, zero where a size is required, or not finite.
    #[error("invalid {field} on {kind} shape: {value}")]
    InvalidSize {
        /// Shape type label, e.g. `"RECTANGLE"`.
        kind: &'static str,
        /// Offending field name.
        field: &'static str,
        /// Offending value.
        value: f64,
    },
    /// A POLYGON has fewer than three points, or a FREEFORM path fewer than two.
    #[error("{kind} shape needs at least {min} points, got {count}")]
    TooFewPoints {
        /// Shape type label.
        kind: &'static str,
        /// Smallest accepted point count for this type.
        min: usize,
        /// Number of points found.
        count: usize,
    },
}

/// Error returned by [`crate::config::CanvasConfig::from_json`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The JSON could not be deserialized.
    #[error("failed to parse canvas config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A numeric setting is outside its allowed range.
    #[error("config value {name} = {value} is out of range")]
    OutOfRange {
        /// Setting name as it appears in JSON.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },
}
