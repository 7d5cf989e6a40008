//! Rivulet: the extensibility core of a streaming-expression query language.
//!
//! Facade crate re-exporting the workspace surface: build a [`Registry`],
//! load the built-ins, compile parsed expressions with [`OperatorFactory`],
//! and drain the resulting stream tree with [`drive`].

pub use rivulet_core::prelude::*;
pub use rivulet_io::{JsonlBackend, MemoryBackend};
pub use rivulet_lang::{drive, register_builtins, OperatorFactory, Registry};
pub use rivulet_operators::{Accumulator, Evaluator, Reduced, TupleStream};
