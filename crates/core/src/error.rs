//! Error types for s3p-core
//!
//! One error enum covers the whole pipeline. Parse and plan errors are fatal
//! and surface before any network call; store errors are recorded per action
//! by the executor.

use thiserror::Error;

/// Result type alias for s3p operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for s3p operations
#[derive(Error, Debug)]
pub enum Error {
    /// A brace-delimited region that is not one of the recognized placeholders
    #[error("Malformed date token in '{template}': {reason}")]
    MalformedToken { template: String, reason: String },

    /// Source and destination resolve to different shapes (prefix vs. single key)
    #[error("Ambiguous destination: {0}")]
    AmbiguousDestination(String),

    /// Path is not a valid store URI
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Verb and arguments do not form a valid plan
    #[error("Invalid plan: {0}")]
    InvalidPlan(String),

    /// Day offset pushes the date outside the supported calendar range
    #[error("Date out of range: {0}")]
    DateOutOfRange(String),

    /// Object or bucket does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Transport-level failure reported by the store
    #[error("Network error: {0}")]
    Network(String),

    /// Credentials missing or rejected
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    pub(crate) fn malformed(template: &str, reason: impl Into<String>) -> Self {
        Self::MalformedToken {
            template: template.to_string(),
            reason: reason.into(),
        }
    }

    /// Process exit code for this error
    ///
    /// 2 = usage, 3 = network, 4 = auth, 5 = not found, 1 = anything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::MalformedToken { .. }
            | Error::AmbiguousDestination(_)
            | Error::InvalidPath(_)
            | Error::InvalidPlan(_)
            | Error::DateOutOfRange(_) => 2,
            Error::Network(_) => 3,
            Error::Auth(_) => 4,
            Error::NotFound(_) => 5,
            _ => 1,
        }
    }

    /// Whether this error was raised before touching the store
    pub fn is_usage(&self) -> bool {
        self.exit_code() == 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::malformed("s3://b/{X}", "unknown").exit_code(), 2);
        assert_eq!(Error::AmbiguousDestination("x".into()).exit_code(), 2);
        assert_eq!(Error::Network("timeout".into()).exit_code(), 3);
        assert_eq!(Error::Auth("denied".into()).exit_code(), 4);
        assert_eq!(Error::NotFound("k".into()).exit_code(), 5);
        assert_eq!(Error::General("boom".into()).exit_code(), 1);
    }

    #[test]
    fn test_malformed_message_names_template() {
        let err = Error::malformed("s3://b/{DATEID+x}/", "offset is not an integer");
        assert_eq!(
            err.to_string(),
            "Malformed date token in 's3://b/{DATEID+x}/': offset is not an integer"
        );
        assert!(err.is_usage());
    }
}
