//! Error types for configuration resolution.

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while validating, resolving or building a configuration.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The document does not match the configuration shape.
    #[error("Invalid configuration at `{path}`: {message}")]
    #[diagnostic(
        code(rustci::config::shape),
        help("Validate the document against the rust-ci-config JSON Schema (`rustci schema`)")
    )]
    Shape {
        /// Dotted path of the offending field (`.` for the document root)
        path: String,
        /// What was expected and what was found
        message: String,
    },

    /// The top-level execution target is absent or empty after resolution.
    #[error("Execution target is required but was not provided")]
    #[diagnostic(
        code(rustci::config::missing_execution_target),
        help("Set `executionTarget` in the document or pass an execution-target override")
    )]
    MissingExecutionTarget,

    /// A builder mutator received an argument that violates its own contract.
    #[error("Invalid builder argument `{argument}`: {message}")]
    #[diagnostic(code(rustci::config::builder_argument))]
    MalformedBuilderArgument {
        /// Name of the mutator argument
        argument: &'static str,
        /// Why the argument was rejected
        message: String,
    },

    /// Serializing the canonical document failed.
    #[error("JSON error: {0}")]
    #[diagnostic(code(rustci::config::json))]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a shape error for the given field path.
    #[must_use]
    pub fn shape(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Shape {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a malformed builder argument error.
    #[must_use]
    pub fn malformed(argument: &'static str, message: impl Into<String>) -> Self {
        Self::MalformedBuilderArgument {
            argument,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_error_display() {
        let err = Error::shape("jobs.clippy.matrix.os", "invalid type: string, expected a sequence");
        assert_eq!(
            err.to_string(),
            "Invalid configuration at `jobs.clippy.matrix.os`: invalid type: string, expected a sequence"
        );
    }

    #[test]
    fn test_missing_execution_target_display() {
        assert_eq!(
            Error::MissingExecutionTarget.to_string(),
            "Execution target is required but was not provided"
        );
    }

    #[test]
    fn test_diagnostic_codes() {
        let err = Error::malformed("targets", "must not be empty");
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("rustci::config::builder_argument"));
    }
}
