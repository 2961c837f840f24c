//! Error types for xmlhint
//!
//! Hint generation itself never fails: a type without a root tag yields no
//! hint and an undeterminable child type is skipped. Errors only arise while
//! building binding registries, loading binding schemas and encoding output.

use std::fmt;
use thiserror::Error;

/// Result type alias using xmlhint Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for xmlhint operations
#[derive(Error, Debug)]
pub enum Error {
    /// Inconsistent binding declarations
    #[error("binding error: {0}")]
    Binding(#[from] BindingError),

    /// Name error (invalid XML name)
    #[error("name error: {0}")]
    Name(String),

    /// Resource loading error
    #[error("resource error: {0}")]
    Resource(String),

    /// JSON decoding or encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// A binding declaration that cannot be registered
#[derive(Debug, Clone)]
pub struct BindingError {
    /// Error message
    pub message: String,
    /// Type whose declaration is at fault
    pub type_name: Option<String>,
    /// Accessor of the offending attribute or child
    pub accessor: Option<String>,
}

impl BindingError {
    /// Create a new binding error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            type_name: None,
            accessor: None,
        }
    }

    /// Set the type the error belongs to
    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Set the accessor the error belongs to
    pub fn with_accessor(mut self, accessor: impl Into<String>) -> Self {
        self.accessor = Some(accessor.into());
        self
    }
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref type_name) = self.type_name {
            write!(f, " (type '{}'", type_name)?;
            if let Some(ref accessor) = self.accessor {
                write!(f, ", accessor '{}'", accessor)?;
            }
            write!(f, ")")?;
        }

        Ok(())
    }
}

impl std::error::Error for BindingError {}
