//! Operator categories.
//!
//! All four categories share one flat namespace in the registry; the category
//! tag on a binding is what the factory validates argument positions against.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Produces records from an external system; no stream-typed inputs.
    Source,
    /// Wraps one or more streams, transforming their record sequence.
    Decorator,
    /// Computes a value from arguments; no open/read/close lifecycle.
    Evaluator,
    /// Consumes a record sequence and yields a summary value or a
    /// transformed record (metrics and record operations).
    Accumulator,
}

impl Category {
    /// Sources and decorators both speak the open/read/close protocol.
    pub fn is_stream(self) -> bool {
        matches!(self, Category::Source | Category::Decorator)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Source => "source stream",
            Category::Decorator => "decorator stream",
            Category::Evaluator => "evaluator",
            Category::Accumulator => "accumulator",
        };
        f.write_str(s)
    }
}
