//! rivulet-io: reference `Backend` implementations.
//!
//! The production record store behind `search` is external; these backends
//! exist so pipelines can run end-to-end in tests (`MemoryBackend`) and
//! against local files (`JsonlBackend`). Both honor query filtering, field
//! projection, and sort push-down from `QueryRequest`.

pub mod jsonl;
pub mod memory;
pub mod query;

pub use jsonl::JsonlBackend;
pub use memory::MemoryBackend;
