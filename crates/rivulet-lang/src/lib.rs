//! rivulet-lang: name resolution and pipeline assembly.
//!
//! The three surfaces external callers touch:
//! - bootstrap: [`Registry::new`] + [`builtins::register_builtins`] +
//!   [`Registry::register`] for plugin operators,
//! - the parser: [`Registry::resolve`],
//! - the execution engine: [`OperatorFactory::construct`] and
//!   [`driver::drive`] on a constructed root.
//!
//! The registry is built once, single-threaded, then treated as an immutable
//! snapshot; factories hold only a shared reference, so independent
//! expressions compile concurrently against one registry.

pub mod builtins;
pub mod driver;
pub mod factory;
pub mod registry;

pub use builtins::register_builtins;
pub use driver::drive;
pub use factory::{Args, Built, BuiltArg, ConstructedOperator, OperatorFactory};
pub use registry::{ArgKind, Binding, Constructor, Registry, Signature};
