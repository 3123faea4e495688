use thiserror::Error;

use crate::metadata::TypeTag;

/// Message printed when a host type is run without a descriptor.
pub const FATAL_ERROR: &str =
    "FATAL ERROR : Setup is done incorrectly\nPlease add a host descriptor to your type";

/// Errors that abort a run before any method executes.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The host type carries no type-level descriptor.
    #[error("{}", FATAL_ERROR)]
    MissingDescriptor(String),
    /// No host type is registered under the requested name.
    #[error("host type `{0}` could not be found")]
    HostNotFound(String),
    /// Method metadata failed validation at registration.
    #[error("invalid metadata for `{method}`: {reason}")]
    InvalidMetadata {
        /// Method being registered.
        method: String,
        /// Validation failure.
        reason: String,
    },
    /// A method name was registered twice on the same host.
    #[error("method `{method}` is already registered on `{host}`")]
    DuplicateMethod {
        /// Host type name.
        host: String,
        /// Method name.
        method: String,
    },
    /// Writing the report failed.
    #[error("report output failed: {0}")]
    Io(#[from] std::io::Error),
}

impl HarnessError {
    /// Whether the error is the missing-descriptor configuration error.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingDescriptor(_))
    }
}

/// A parameter value could not be converted to its declared type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoercionError {
    /// Text is not a valid literal of the target type.
    #[error("cannot coerce \"{raw}\" to {target}: {reason}")]
    Parse {
        /// Raw parameter text.
        raw: String,
        /// Declared type.
        target: TypeTag,
        /// Parser message.
        reason: String,
    },
    /// Character coercion needs at least one character.
    #[error("cannot coerce an empty string to char")]
    EmptyChar,
}

/// Failure captured while invoking a single method.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvocationError {
    /// A parameter failed coercion.
    #[error("coercion failed: {0}")]
    Coercion(#[from] CoercionError),
    /// The method expects more arguments than were supplied.
    #[error("missing argument at position {position} ({supplied} supplied)")]
    MissingArgument {
        /// Zero-based position.
        position: usize,
        /// Number of arguments available.
        supplied: usize,
    },
    /// An argument had a different type than the method reads.
    #[error("argument {position} is {found}, expected {expected}")]
    ArgumentType {
        /// Zero-based position.
        position: usize,
        /// Type requested by the method.
        expected: &'static str,
        /// Type actually supplied.
        found: &'static str,
    },
    /// The host factory failed to build an instance.
    #[error("instantiation failed: {0}")]
    Instantiation(String),
    /// The method returned an error.
    #[error("method raised: {0}")]
    Raised(String),
    /// The method panicked.
    #[error("method panicked: {0}")]
    Panicked(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_descriptor_renders_fixed_message() {
        let err = HarnessError::MissingDescriptor("Calculator".into());
        assert_eq!(err.to_string(), FATAL_ERROR);
        assert!(err.is_configuration());
        assert!(!HarnessError::HostNotFound("Calculator".into()).is_configuration());
    }

    #[test]
    fn coercion_errors_name_the_target_type() {
        let err = InvocationError::from(CoercionError::Parse {
            raw: "abc".into(),
            target: TypeTag::Int,
            reason: "invalid digit found in string".into(),
        });
        assert_eq!(
            err.to_string(),
            "coercion failed: cannot coerce \"abc\" to int: invalid digit found in string"
        );
    }
}
