//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for grab
#[derive(Error, Debug)]
pub enum Error {
    /// A produced value does not have the shape the destination expects
    #[error("Type mismatch: expected Arc<{expected}>, found Arc<{found}>")]
    TypeMismatch {
        /// Type the destination holds
        expected: &'static str,
        /// Type the producer (or override) actually yielded
        found: &'static str,
    },

    /// A producer was requested again while its own construction was in progress
    #[error("Circular dependency detected: {producer}")]
    CircularDependency {
        /// Label of the producer that closed the cycle
        producer: String,
    },

    /// An override was already recorded for the producer
    #[error("Producer already mocked: {producer}")]
    AlreadyMocked {
        /// Label of the producer
        producer: String,
    },

    /// Error raised by construction logic
    #[error("Producer error: {message}")]
    Producer {
        /// Description of the failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O operation error
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Infrastructure operation error (poisoned locks, subscriber setup)
    #[error("Infrastructure error: {message}")]
    Infrastructure {
        /// Description of the infrastructure error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

// Resolution error creation methods
impl Error {
    /// Create a type mismatch error
    pub fn type_mismatch(expected: &'static str, found: &'static str) -> Self {
        Self::TypeMismatch { expected, found }
    }

    /// Create a circular dependency error
    pub fn circular_dependency<S: Into<String>>(producer: S) -> Self {
        Self::CircularDependency {
            producer: producer.into(),
        }
    }

    /// Create an already mocked error
    pub fn already_mocked<S: Into<String>>(producer: S) -> Self {
        Self::AlreadyMocked {
            producer: producer.into(),
        }
    }
}

// Producer error creation methods
impl Error {
    /// Create a producer error
    pub fn producer<S: Into<String>>(message: S) -> Self {
        Self::Producer {
            message: message.into(),
            source: None,
        }
    }

    /// Create a producer error with source
    pub fn producer_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Producer {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Configuration error creation methods
impl Error {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// I/O and infrastructure error creation methods
impl Error {
    /// Create an I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// Create an infrastructure error
    pub fn infrastructure<S: Into<String>>(message: S) -> Self {
        Self::Infrastructure {
            message: message.into(),
            source: None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }
}

// Classification helpers
impl Error {
    /// Whether this error reports a dependency cycle
    pub fn is_circular_dependency(&self) -> bool {
        matches!(self, Self::CircularDependency { .. })
    }

    /// Whether this error was raised by construction logic
    pub fn is_producer_error(&self) -> bool {
        matches!(self, Self::Producer { .. })
    }
}
