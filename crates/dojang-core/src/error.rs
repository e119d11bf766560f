//! Error types for Dojang core library.

/// Errors raised while validating, scoring or charting an assessment.
///
/// All error variants are marked with `#[non_exhaustive]` to allow
/// adding new error types without breaking changes.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A submitted field failed validation.
    #[error("Validation error: {message}")]
    Validation {
        /// Field that failed validation
        field: Option<String>,
        /// What went wrong
        message: String,
    },

    /// A value is not one of the options offered for a field.
    #[error("Invalid option for {field}: '{value}'")]
    InvalidOption {
        /// Field the value was given for
        field: &'static str,
        /// The rejected value
        value: String,
    },

    /// A numeric input lies outside its allowed range.
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        /// Field the value was given for
        field: &'static str,
        /// The rejected value
        value: i64,
        /// Inclusive lower bound
        min: i64,
        /// Inclusive upper bound
        max: i64,
    },

    /// A scoring profile could not be evaluated against an assessment.
    #[error("Scoring error: {message}")]
    Scoring {
        /// What went wrong
        message: String,
    },

    /// A scoring profile is malformed.
    #[error("Invalid scoring profile '{profile}': {message}")]
    Profile {
        /// Profile name
        profile: String,
        /// What is wrong with it
        message: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience `Result` type alias for Dojang core operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a new validation error.
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Error::Validation {
            field: None,
            message: message.into(),
        }
    }

    /// Creates a new validation error with a field name.
    pub fn validation_field<F, M>(field: F, message: M) -> Self
    where
        F: Into<String>,
        M: Into<String>,
    {
        Error::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Creates a new scoring error.
    pub fn scoring<S: Into<String>>(message: S) -> Self {
        Error::Scoring {
            message: message.into(),
        }
    }

    /// Creates a new profile error.
    pub fn profile<P, M>(profile: P, message: M) -> Self
    where
        P: Into<String>,
        M: Into<String>,
    {
        Error::Profile {
            profile: profile.into(),
            message: message.into(),
        }
    }

    /// Returns whether this error was caused by the submitted input rather
    /// than by configuration.
    pub fn is_input_error(&self) -> bool {
        match self {
            Error::Validation { .. } => true,
            Error::InvalidOption { .. } => true,
            Error::OutOfRange { .. } => true,
            Error::Scoring { .. } => true, // e.g. a rubric item the profile needs is missing
            Error::Profile { .. } => false,
            Error::Serialization(_) => false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = Error::validation("Please enter athlete name");
        assert_eq!(err.to_string(), "Validation error: Please enter athlete name");
    }

    #[test]
    fn test_validation_error_with_field() {
        let err = Error::validation_field("athlete_name", "must not be empty");
        let Error::Validation { field, message } = err else {
            unreachable!("Expected Validation error variant");
        };
        assert_eq!(field, Some("athlete_name".to_string()));
        assert_eq!(message, "must not be empty");
    }

    #[test]
    fn test_out_of_range_display() {
        let err = Error::OutOfRange {
            field: "match_control",
            value: 7,
            min: 1,
            max: 5,
        };
        assert_eq!(err.to_string(), "match_control must be between 1 and 5, got 7");
    }

    #[test]
    fn test_invalid_option_display() {
        let err = Error::InvalidOption {
            field: "division",
            value: "masters".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid option for division: 'masters'");
    }

    #[test]
    fn test_profile_error_display() {
        let err = Error::profile("standard", "needs at least 3 dimensions");
        assert_eq!(
            err.to_string(),
            "Invalid scoring profile 'standard': needs at least 3 dimensions"
        );
    }

    #[test]
    fn test_input_error_classification() {
        assert!(Error::validation("x").is_input_error());
        assert!(Error::scoring("missing rubric item").is_input_error());
        assert!(!Error::profile("p", "bad").is_input_error());
    }

    #[test]
    fn test_error_implements_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }

    #[test]
    fn test_serde_error_conversion() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let err: Error = serde_err.into();
        assert!(!err.is_input_error());
    }
}
