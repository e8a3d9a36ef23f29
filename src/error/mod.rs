//! Error handling module for Reelgraph

use thiserror::Error;

use crate::domain::errors::DomainError;

/// Misuse of the filter graph API.
///
/// These are programming errors in the chain builders, never a property of
/// the timeline being compiled, so callers should not try to recover.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    /// Output or input pin index outside the node's declared arity
    #[error("node '{node}' has no {direction} pin at index {index} (arity {arity})")]
    PinOutOfRange {
        node: String,
        direction: &'static str,
        index: usize,
        arity: usize,
    },

    /// Input slot was already bound to a stream
    #[error("input slot {slot} of node '{node}' is already bound")]
    SlotAlreadyBound { node: String, slot: usize },

    /// A stream pin may feed exactly one input slot
    #[error("pin {pin} is already consumed; add a split node for a second consumer")]
    PinAlreadyConsumed { pin: String },

    /// Node handle does not belong to this graph
    #[error("unknown node id {0}")]
    UnknownNode(usize),

    /// Serialization found a node with a dangling input
    #[error("node '{node}' has an unbound input slot {slot}")]
    UnboundInput { node: String, slot: usize },
}

/// Main error type for Reelgraph operations
#[derive(Error, Debug)]
pub enum ReelError {
    /// Filter graph construction error
    #[error("Filter graph error: {0}")]
    Graph(#[from] GraphError),

    /// Domain validation error
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Project file could not be read or understood
    #[error("Failed to load project {path}: {message}")]
    ProjectError { path: String, message: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Invalid time format
    #[error("Invalid time format: {time}. Expected HH:MM:SS.ms, MM:SS.ms, or seconds")]
    InvalidTimeFormat { time: String },

    /// The media backend failed; the compiler does not interpret the cause
    #[error("Media backend failed (exit code {}): {message}", exit_code(.code))]
    Backend { code: Option<i32>, message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parse error
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

fn exit_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "unknown".to_string(), |c| c.to_string())
}

/// Result type alias for Reelgraph operations
pub type ReelResult<T> = std::result::Result<T, ReelError>;

/// Result type alias for graph construction
pub type GraphResult<T> = std::result::Result<T, GraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_errors_name_the_node() {
        let err = GraphError::PinOutOfRange {
            node: "overlay".to_string(),
            direction: "input",
            index: 2,
            arity: 2,
        };
        let text = err.to_string();
        assert!(text.contains("overlay"));
        assert!(text.contains("index 2"));
    }

    #[test]
    fn graph_error_converts_into_reel_error() {
        let err: ReelError = GraphError::UnknownNode(7).into();
        assert!(err.to_string().starts_with("Filter graph error"));
    }

    #[test]
    fn backend_error_is_opaque() {
        let err = ReelError::Backend {
            code: Some(1),
            message: "Conversion failed!".to_string(),
        };
        assert!(err.to_string().contains("exit code 1):"));

        let killed = ReelError::Backend {
            code: None,
            message: "terminated".to_string(),
        };
        assert!(killed.to_string().contains("exit code unknown):"));
    }
}
