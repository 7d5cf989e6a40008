//! Convenience re-exports for downstream crates.

pub use crate::backend::{Backend, QueryRequest, RecordCursor};
pub use crate::category::Category;
pub use crate::config::EngineConfig;
pub use crate::context::StreamContext;
pub use crate::error::{Error, Result};
pub use crate::expr::{Arg, ExpressionNode};
pub use crate::sort::{SortKey, SortOrder};
pub use crate::tuple::{Scalar, Tuple};
