//! Error types for the column engine.
//!
//! Layer and grid mutators validate eagerly and return these without
//! touching state. Configuration and restart errors are fatal for the
//! point being simulated; the caller decides whether that ends the process.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type GridResult<T> = Result<T, GridError>;

#[derive(Error, Debug)]
pub enum GridError {
    /// A layer attribute left its physical range.
    #[error("invalid layer state: {field} = {value}, {reason}")]
    InvalidLayerState {
        field: &'static str,
        value: f64,
        reason: String,
    },

    /// Layer index beyond the current layer count.
    #[error("layer index {index} out of range for grid with {len} layers")]
    IndexOutOfRange { index: usize, len: usize },

    /// Unrecognized scheme name or out-of-range static parameter.
    #[error("invalid configuration '{key}': {value} - {reason}")]
    InvalidConfiguration {
        key: String,
        value: String,
        reason: String,
    },

    /// Restart snapshot that cannot yield a usable grid.
    #[error("corrupt restart state at layer {layer}: {reason}")]
    CorruptRestartState { layer: usize, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(String),
}

impl GridError {
    pub fn invalid_layer(field: &'static str, value: f64, reason: impl Into<String>) -> Self {
        Self::InvalidLayerState {
            field,
            value,
            reason: reason.into(),
        }
    }

    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    pub fn invalid_config(
        key: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConfiguration {
            key: key.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn corrupt_restart(layer: usize, reason: impl Into<String>) -> Self {
        Self::CorruptRestartState {
            layer,
            reason: reason.into(),
        }
    }

    /// Whether the caller can reject the offending input and carry on.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidLayerState { .. } | Self::IndexOutOfRange { .. }
        )
    }
}

impl From<serde_json::Error> for GridError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_layer_display() {
        let err = GridError::invalid_layer("height", -0.1, "must be non-negative");
        let msg = err.to_string();
        assert!(msg.contains("height"));
        assert!(msg.contains("-0.1"));
    }

    #[test]
    fn index_out_of_range_display() {
        let err = GridError::index_out_of_range(7, 3);
        assert_eq!(
            err.to_string(),
            "layer index 7 out of range for grid with 3 layers"
        );
    }

    #[test]
    fn recoverable_kinds() {
        assert!(GridError::index_out_of_range(1, 1).is_recoverable());
        assert!(GridError::invalid_layer("temperature", 280.0, "too warm").is_recoverable());
        assert!(!GridError::invalid_config("albedo.method", "Foo", "unknown").is_recoverable());
        assert!(!GridError::corrupt_restart(0, "NaN").is_recoverable());
    }

    #[test]
    fn json_error_maps_to_parse() {
        let err: GridError = serde_json::from_str::<f64>("not json").unwrap_err().into();
        assert!(matches!(err, GridError::Parse(_)));
    }
}
