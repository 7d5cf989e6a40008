//! Execution context threaded through `open()`.

use std::sync::Arc;

use crate::backend::Backend;

/// Carried by the caller into every `open()` call. Cloning is cheap; all
/// clones share one backend handle.
#[derive(Clone)]
pub struct StreamContext {
    pub backend: Arc<dyn Backend>,
}

impl StreamContext {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }
}
