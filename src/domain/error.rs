//! Domain-level errors (no external dependencies)

use std::fmt;

use thiserror::Error;

/// Category of a [`DomainError`], used by hosts to triage diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Operation not supported by the current node, or no node at all
    IncompatibleContext,
    /// Wrong argument type or arity
    InvalidArgument,
    /// Last constructor argument is not a body
    MissingBody,
    /// A value failed a domain check
    ValidationError,
    /// A singleton was declared twice
    Redefinition,
    /// A body stopped before completion
    Aborted,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::IncompatibleContext => "incompatible context",
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::MissingBody => "missing body",
            ErrorKind::ValidationError => "validation error",
            ErrorKind::Redefinition => "redefinition",
            ErrorKind::Aborted => "aborted",
        };
        f.write_str(label)
    }
}

/// Errors raised by DSL calls.
///
/// These are never propagated through the call stack; the evaluator records
/// them as diagnostics and evaluation continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("incompatible DSL: {operation} cannot appear in {context}")]
    IncompatibleContext { operation: String, context: String },

    #[error("invalid argument at position {position}: expected {expected}, got {actual}")]
    InvalidArgument {
        position: usize,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("too many arguments: expected at most 3, got {given}")]
    TooManyArguments { given: usize },

    #[error("{reason}")]
    MissingBody { reason: String },

    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("enterprise already defined as {existing:?}, ignoring {attempted:?}")]
    EnterpriseRedefined { existing: String, attempted: String },

    #[error("workspace already defined, only one workspace is allowed per build")]
    WorkspaceRedefined,

    #[error("nesting depth limit of {limit} exceeded")]
    DepthExceeded { limit: usize },

    #[error("evaluation aborted: {reason}")]
    Aborted { reason: String },
}

impl DomainError {
    pub fn incompatible(operation: impl Into<String>, context: impl Into<String>) -> Self {
        Self::IncompatibleContext {
            operation: operation.into(),
            context: context.into(),
        }
    }

    pub fn missing_body(reason: impl Into<String>) -> Self {
        Self::MissingBody {
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::IncompatibleContext { .. } => ErrorKind::IncompatibleContext,
            DomainError::InvalidArgument { .. } | DomainError::TooManyArguments { .. } => {
                ErrorKind::InvalidArgument
            }
            DomainError::MissingBody { .. } => ErrorKind::MissingBody,
            DomainError::InvalidUrl { .. } => ErrorKind::ValidationError,
            DomainError::EnterpriseRedefined { .. } | DomainError::WorkspaceRedefined => {
                ErrorKind::Redefinition
            }
            DomainError::DepthExceeded { .. } | DomainError::Aborted { .. } => ErrorKind::Aborted,
        }
    }

    /// Whether the error prevents the construction it occurred in.
    pub fn is_fatal(&self) -> bool {
        match self {
            DomainError::IncompatibleContext { .. }
            | DomainError::InvalidUrl { .. }
            | DomainError::EnterpriseRedefined { .. } => false,
            DomainError::InvalidArgument { .. }
            | DomainError::TooManyArguments { .. }
            | DomainError::MissingBody { .. }
            | DomainError::WorkspaceRedefined
            | DomainError::DepthExceeded { .. }
            | DomainError::Aborted { .. } => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incompatible_message() {
        let err = DomainError::incompatible("tag", "workspace \"w\"");
        assert_eq!(
            err.to_string(),
            "incompatible DSL: tag cannot appear in workspace \"w\""
        );
        assert_eq!(err.kind(), ErrorKind::IncompatibleContext);
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_invalid_url_message_quotes_input() {
        let err = DomainError::InvalidUrl {
            url: "not a url".into(),
            reason: "bad".into(),
        };
        assert_eq!(err.to_string(), "invalid URL \"not a url\": bad");
        assert_eq!(err.kind(), ErrorKind::ValidationError);
    }

    #[test]
    fn test_argument_errors_are_fatal() {
        assert!(DomainError::TooManyArguments { given: 4 }.is_fatal());
        assert!(DomainError::missing_body("missing child DSL").is_fatal());
        assert_eq!(
            DomainError::TooManyArguments { given: 4 }.kind(),
            ErrorKind::InvalidArgument
        );
    }
}
