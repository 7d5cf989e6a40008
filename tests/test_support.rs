//! Shared fixtures for the integration suites.
#![allow(dead_code)]

use std::sync::Arc;

use rivulet_core::context::StreamContext;
use rivulet_core::expr::ExpressionNode;
use rivulet_core::tuple::{Scalar, Tuple};
use rivulet_io::MemoryBackend;
use rivulet_lang::{register_builtins, Registry};

/// Strict registry with every built-in loaded.
pub fn bootstrap() -> Registry {
    let mut registry = Registry::new();
    register_builtins(&mut registry).expect("builtins register cleanly");
    registry
}

pub fn context(backend: &MemoryBackend) -> StreamContext {
    StreamContext::new(Arc::new(backend.clone()))
}

fn person(id: i64, name: &str, score: f64) -> Tuple {
    Tuple::from_pairs([
        ("id", Scalar::I64(id)),
        ("name", Scalar::Str(name.to_string())),
        ("score", Scalar::F64(score)),
    ])
}

/// `people`: five records over four ids; id 2 appears twice with different
/// scores so `unique(over=id)` has something to drop.
pub fn people_backend() -> MemoryBackend {
    let backend = MemoryBackend::new();
    backend.insert(
        "people",
        vec![
            person(3, "cy", 7.5),
            person(1, "ada", 9.0),
            person(2, "bo", 4.0),
            person(2, "bob", 6.0),
            person(4, "dee", 2.5),
        ],
    );
    backend
}

/// `search(collection, q="*:*", sort=...)`
pub fn search(collection: &str, sort: &str) -> ExpressionNode {
    ExpressionNode::call("search")
        .with_value(collection)
        .with_param("q", "*:*")
        .with_param("sort", sort)
}
