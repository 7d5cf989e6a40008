//! Category contracts.
//!
//! Source and decorator streams share one object protocol (`TupleStream`);
//! the registry's category tag is what tells them apart during validation.

use rivulet_core::context::StreamContext;
use rivulet_core::error::Result;
use rivulet_core::sort::SortKey;
use rivulet_core::tuple::{Scalar, Tuple};

/// Pull-based record stream.
///
/// Invariants:
/// - `read()` before a successful `open()` is a stream error, never a panic.
/// - End of stream is `Ok(None)`, not an error; the sequence is finite and
///   non-restartable.
/// - `close()` is idempotent, safe after a failed `open()`, and decorators
///   must cascade it to all children best-effort: a failure closing one
///   child must not skip the others.
pub trait TupleStream: Send {
    /// Stable operator name, used in error and log context.
    fn name(&self) -> &'static str;

    fn open(&mut self, ctx: &StreamContext) -> Result<()>;

    fn read(&mut self) -> Result<Option<Tuple>>;

    fn close(&mut self) -> Result<()>;

    /// Sort order this stream guarantees on its output, if any.
    /// Order-sensitive decorators (`unique`, `merge`, `rollup`) document
    /// their expectations against this.
    fn sort_order(&self) -> &[SortKey] {
        &[]
    }
}

/// Computes a value from one record. No lifecycle; pure given its inputs,
/// so independent graphs can never observe each other's state.
pub trait Evaluator: Send {
    fn name(&self) -> &'static str;

    fn evaluate(&self, tuple: &Tuple) -> Result<Scalar>;
}

/// What an accumulator yields: metrics summarize to a value, record
/// operations transform the record they were fed.
#[derive(Debug, Clone, PartialEq)]
pub enum Reduced {
    Value(Scalar),
    Record(Tuple),
}

/// Accumulates over a finite record sequence. `reset()` permits reuse
/// across repeated grouping keys.
pub trait Accumulator: Send {
    /// Output field label, e.g. `min(price)`.
    fn label(&self) -> String;

    fn update(&mut self, tuple: &Tuple) -> Result<()>;

    fn result(&self) -> Result<Reduced>;

    fn reset(&mut self);
}
