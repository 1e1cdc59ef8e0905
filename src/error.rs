use miette::Diagnostic;
use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Custom error types for the engine wrapper
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum Error {
    #[error("invalid configuration: {message}")]
    #[diagnostic(code(scenegate::configuration_error))]
    Configuration { message: String },

    #[error("failed to resolve {subject}: {message}")]
    #[diagnostic(code(scenegate::resolution_error))]
    Resolution { subject: String, message: String },

    #[error("analysis failed: {message}")]
    #[diagnostic(code(scenegate::analysis_error))]
    Analysis { message: String },

    #[error("Invalid pack magic number: expected 0x{expected:016X}, got 0x{got:016X}")]
    #[diagnostic(code(scenegate::invalid_magic))]
    InvalidMagic { expected: u64, got: u64 },

    #[error("Unsupported pack format version: {version}")]
    #[diagnostic(code(scenegate::unsupported_version))]
    UnsupportedVersion { version: u32 },

    #[error("Parse error at offset {offset}: {message}")]
    #[diagnostic(code(scenegate::parse_error))]
    Parse { offset: usize, message: String },

    #[error("Internal error: {message}")]
    #[diagnostic(code(scenegate::internal_error))]
    Internal { message: String },
}

impl Error {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create a resolution error for a path or reference that could not be loaded
    pub fn resolution(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Resolution {
            subject: subject.into(),
            message: message.into(),
        }
    }

    /// Create an analysis error
    pub fn analysis(message: impl Into<String>) -> Self {
        Error::Analysis {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal {
            message: message.into(),
        }
    }
}
