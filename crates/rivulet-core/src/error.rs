use thiserror::Error;

use crate::category::Category;

/// Canonical result for the whole workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure mode in the registry / factory / execution surface.
///
/// Construction-time errors always carry the offending operator name, and
/// positional failures carry the argument position, so the failing fragment
/// of the original expression can be located without re-parsing.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown operator '{name}'")]
    UnknownOperator { name: String },

    /// Strict-mode registries refuse to rebind a name under a new category.
    #[error("duplicate binding for '{name}': already bound as {existing}, attempted {attempted}")]
    DuplicateBinding {
        name: String,
        existing: Category,
        attempted: Category,
    },

    #[error("'{operator}' expects {} arguments, got {actual}", arity_range(.min, .max))]
    Arity {
        operator: String,
        min: usize,
        /// `usize::MAX` means unbounded.
        max: usize,
        actual: usize,
    },

    #[error("'{operator}' argument {position}: expected {expected}, got {actual}")]
    TypeMismatch {
        operator: String,
        position: usize,
        expected: String,
        actual: String,
    },

    #[error("'{operator}' is missing required parameter '{parameter}'")]
    MissingParameter { operator: String, parameter: String },

    /// A constructor rejected its inputs (unparsable sort spec, bad literal,
    /// failed eager resource acquisition, ...).
    #[error("failed to construct '{operator}': {message}")]
    Construction { operator: String, message: String },

    /// Raised during `read()` after a successful `open()`.
    #[error("stream '{operator}' failed: {message}")]
    Stream { operator: String, message: String },

    // Backends map their own I/O and decode failures into this variant.
    #[error("backend error: {0}")]
    Backend(String),
}

impl Error {
    pub fn construction(operator: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Construction {
            operator: operator.into(),
            message: message.into(),
        }
    }

    pub fn stream(operator: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Stream {
            operator: operator.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Backend(e.to_string())
    }
}

fn arity_range(min: &usize, max: &usize) -> String {
    if min == max {
        format!("exactly {min}")
    } else if *max == usize::MAX {
        format!("at least {min}")
    } else {
        format!("between {min} and {max}")
    }
}
