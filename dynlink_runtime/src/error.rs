//! Error types for call-site resolution and target invocation
//!
//! Resolution failures (`ResolutionError`) are raised while a finder binds an
//! operation; they are static facts about a call site and never retried.
//! `RuntimeError` covers failures raised while a bound target runs.

use thiserror::Error;

/// Low-level reason a primitive could not be bound or adapted.
///
/// Always surfaced wrapped in [`ResolutionError::ResolutionFailure`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    /// No primitive with this owner, name and signature exists
    #[error("no primitive {owner}.{name}{signature}")]
    MissingPrimitive {
        owner: String,
        name: String,
        signature: String,
    },

    /// The caller's access context may not bind primitives of this owner
    #[error("{caller} may not access {owner}")]
    AccessDenied { caller: String, owner: String },

    /// The primitive's signature cannot be converted to the call site's
    #[error("cannot adapt {from} to {to}")]
    IncompatibleSignature { from: String, to: String },

    /// The finder was handed a receiver type it does not understand
    #[error("receiver type {0} is not array-shaped")]
    NotArrayShaped(String),
}

/// Failure to resolve an operation at a call site.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// Operation name not in the registry for the receiver shape
    #[error("{operation} is not supported on {shape}")]
    UnsupportedOperation { operation: String, shape: String },

    /// Declared argument count disagrees with the registry
    #[error("{operation} on {shape} takes {}", describe_parameters(.expected))]
    ArityMismatch {
        operation: String,
        shape: String,
        expected: usize,
        actual: usize,
    },

    /// The underlying primitive could not be bound
    #[error("cannot resolve {operation}: {cause}")]
    ResolutionFailure {
        operation: String,
        #[source]
        cause: LinkError,
    },
}

impl ResolutionError {
    /// Create an unsupported operation error
    pub fn unsupported<S1: Into<String>, S2: Into<String>>(operation: S1, shape: S2) -> Self {
        ResolutionError::UnsupportedOperation {
            operation: operation.into(),
            shape: shape.into(),
        }
    }

    /// Create an arity mismatch error
    pub fn arity_mismatch<S1: Into<String>, S2: Into<String>>(
        operation: S1,
        shape: S2,
        expected: usize,
        actual: usize,
    ) -> Self {
        ResolutionError::ArityMismatch {
            operation: operation.into(),
            shape: shape.into(),
            expected,
            actual,
        }
    }

    /// Wrap a link error as a fatal resolution failure
    pub fn failure<S: Into<String>>(operation: S, cause: LinkError) -> Self {
        ResolutionError::ResolutionFailure {
            operation: operation.into(),
            cause,
        }
    }

    /// Name of the operation that failed to resolve
    pub fn operation(&self) -> &str {
        match self {
            ResolutionError::UnsupportedOperation { operation, .. }
            | ResolutionError::ArityMismatch { operation, .. }
            | ResolutionError::ResolutionFailure { operation, .. } => operation,
        }
    }
}

fn describe_parameters(count: &usize) -> String {
    match *count {
        0 => "no parameters".to_string(),
        1 => "1 parameter".to_string(),
        n => format!("{} parameters", n),
    }
}

/// Runtime error type
///
/// Represents errors raised while dispatching through a call site.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// Resolution of the call site failed
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Type mismatch error
    #[error("TypeError: {0}")]
    TypeError(String),

    /// Index out of bounds error
    #[error("BoundsError: attempt to access index {index} of array with length {length}")]
    BoundsError {
        /// Attempted index
        index: i64,
        /// Array length
        length: usize,
    },

    /// Invalid argument error
    #[error("ArgumentError: {0}")]
    ArgumentError(String),

    /// Overflow error
    #[error("OverflowError: {0}")]
    OverflowError(String),
}

impl RuntimeError {
    /// Create a type error
    pub fn type_error<S: Into<String>>(msg: S) -> Self {
        RuntimeError::TypeError(msg.into())
    }

    /// Create a bounds error
    pub fn bounds_error(index: i64, length: usize) -> Self {
        RuntimeError::BoundsError { index, length }
    }

    /// Create an argument error
    pub fn argument_error<S: Into<String>>(msg: S) -> Self {
        RuntimeError::ArgumentError(msg.into())
    }

    /// Create an overflow error
    pub fn overflow_error<S: Into<String>>(msg: S) -> Self {
        RuntimeError::OverflowError(msg.into())
    }

    /// The resolution failure behind this error, if any
    pub fn as_resolution(&self) -> Option<&ResolutionError> {
        match self {
            RuntimeError::Resolution(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type alias for target invocation
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Result type alias for finders
pub type ResolutionResult<T> = Result<T, ResolutionError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_arity_message_pluralization() {
        let err = ResolutionError::arity_mismatch("size", "arrays", 0, 2);
        assert_eq!(err.to_string(), "size on arrays takes no parameters");

        let err = ResolutionError::arity_mismatch("get", "arrays", 1, 0);
        assert_eq!(err.to_string(), "get on arrays takes 1 parameter");

        let err = ResolutionError::arity_mismatch("set", "arrays", 2, 3);
        assert_eq!(err.to_string(), "set on arrays takes 2 parameters");
    }

    #[test]
    fn test_failure_keeps_cause() {
        let err = ResolutionError::failure(
            "toString",
            LinkError::AccessDenied {
                caller: "sandbox".to_string(),
                owner: "Arrays".to_string(),
            },
        );
        assert_eq!(
            err.to_string(),
            "cannot resolve toString: sandbox may not access Arrays"
        );
        assert!(err.source().is_some());
        assert_eq!(err.operation(), "toString");
    }

    #[test]
    fn test_runtime_error_display() {
        let err = RuntimeError::bounds_error(10, 5);
        assert_eq!(
            format!("{}", err),
            "BoundsError: attempt to access index 10 of array with length 5"
        );

        let err: RuntimeError = ResolutionError::unsupported("frobnicate", "arrays").into();
        assert_eq!(err.to_string(), "frobnicate is not supported on arrays");
        assert!(err.as_resolution().is_some());
    }
}
