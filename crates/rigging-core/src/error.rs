//! Error types for rigging-core

use thiserror::Error;

/// Result type alias for rigging-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in rigging-core
#[derive(Error, Debug)]
pub enum Error {
    /// Build mode outside the recognized values
    #[error("invalid build mode '{value}': expected 'development' or 'production'")]
    InvalidMode {
        /// The rejected value
        value: String,
    },

    /// A module matched no rule and the rule table has no default arm
    #[error("no rule matches '{path}' and no default pipeline is configured")]
    ConfigurationIncomplete {
        /// Module path that could not be routed
        path: String,
    },

    /// Malformed alias or module search path
    #[error("resolution failure: {message}")]
    ResolutionFailure {
        /// Description of the malformed entry
        message: String,
    },

    /// An external transformation step failed for a module
    #[error("{tool} failed on '{module}': {message}")]
    ToolFailure {
        /// Module the tool was processing
        module: String,
        /// Tool identifier
        tool: String,
        /// Message reported by the tool
        message: String,
    },

    /// Configuration file could not be found
    #[error("configuration file not found: {path}")]
    ConfigNotFound {
        /// Path that was searched
        path: String,
    },

    /// Failed to parse YAML configuration
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// Invalid configuration value
    #[error("invalid configuration: {message}")]
    ConfigInvalid {
        /// Description of what's invalid
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether the error is structural and must stop composition regardless of mode.
    ///
    /// Only [`Error::ToolFailure`] is per-module; its handling depends on the
    /// failure policy of the build.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::ToolFailure { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_failure_is_not_fatal() {
        let err = Error::ToolFailure {
            module: "src/App.js".to_string(),
            tool: "babel".to_string(),
            message: "unexpected token".to_string(),
        };
        assert!(!err.is_fatal());
        assert_eq!(err.to_string(), "babel failed on 'src/App.js': unexpected token");
    }

    #[test]
    fn test_structural_errors_are_fatal() {
        let err = Error::InvalidMode {
            value: "staging".to_string(),
        };
        assert!(err.is_fatal());
        assert!(err.to_string().contains("staging"));

        let err = Error::ConfigurationIncomplete {
            path: "a.bin".to_string(),
        };
        assert!(err.is_fatal());
    }
}
