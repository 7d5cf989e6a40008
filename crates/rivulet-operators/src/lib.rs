#![forbid(unsafe_code)]
//! rivulet-operators: the four operator category contracts and every
//! built-in implementation.
//!
//! Design intent:
//! - Streams are pull-based and synchronous: open/read/close, one consumer.
//! - Decorators own their children exclusively; close cascades depth-first
//!   and is idempotent, so a single close on the root releases everything.
//! - Evaluators are pure; accumulators are resettable so grouping decorators
//!   can reuse them across keys.

pub mod eval;
pub mod metrics;
pub mod ops;
pub mod streams;
pub mod traits;

pub use traits::{Accumulator, Evaluator, Reduced, TupleStream};
