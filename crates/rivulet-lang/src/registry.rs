//! Name → binding table.
//!
//! One flat namespace serves all four categories: the surface syntax stays
//! uniform (`name(args...)`), at the cost of collision safety. Binding
//! states per name: unbound → bound(first) → bound(latest); there is no
//! unbind. Same-category re-registration silently overwrites in both modes;
//! cross-category re-registration is rejected in strict mode (the default)
//! and silently shadows in lenient mode.

use std::collections::HashMap;
use std::fmt;

use rivulet_core::category::Category;
use rivulet_core::config::EngineConfig;
use rivulet_core::error::{Error, Result};
use rivulet_core::expr::ExpressionNode;

use crate::factory::{Args, Built};

/// What a validated argument position may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// A source or decorator stream.
    Stream,
    Evaluator,
    Accumulator,
    /// A literal value or bare field name.
    Value,
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArgKind::Stream => "a stream",
            ArgKind::Evaluator => "an evaluator",
            ArgKind::Accumulator => "an accumulator",
            ArgKind::Value => "a value",
        };
        f.write_str(s)
    }
}

/// Named constructor invoked by the factory after validation.
pub type Constructor = fn(&ExpressionNode, &mut Args) -> Result<Built>;

/// Declared contract the factory validates before invoking a constructor.
#[derive(Debug, Clone, Copy)]
pub struct Signature {
    pub min_args: usize,
    /// `usize::MAX` means unbounded.
    pub max_args: usize,
    /// Accepted kinds for the leading positions, in order.
    pub positions: &'static [&'static [ArgKind]],
    /// Accepted kinds for every position past `positions`.
    pub rest: &'static [ArgKind],
    pub required_params: &'static [&'static str],
}

impl Signature {
    pub const fn new(min_args: usize, max_args: usize) -> Self {
        Self {
            min_args,
            max_args,
            positions: &[],
            rest: &[],
            required_params: &[],
        }
    }

    pub const fn positions(mut self, positions: &'static [&'static [ArgKind]]) -> Self {
        self.positions = positions;
        self
    }

    pub const fn rest(mut self, rest: &'static [ArgKind]) -> Self {
        self.rest = rest;
        self
    }

    pub const fn require(mut self, params: &'static [&'static str]) -> Self {
        self.required_params = params;
        self
    }
}

/// (category, constructor, declared contract) for one operator name.
#[derive(Debug, Clone, Copy)]
pub struct Binding {
    pub category: Category,
    pub constructor: Constructor,
    pub signature: Signature,
}

impl Binding {
    pub fn new(category: Category, constructor: Constructor, signature: Signature) -> Self {
        Self {
            category,
            constructor,
            signature,
        }
    }
}

pub struct Registry {
    bindings: HashMap<String, Binding>,
    strict: bool,
}

impl Registry {
    /// Strict registry: cross-category rebinds are rejected.
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
            strict: true,
        }
    }

    /// Lenient registry: last registration always wins, even across
    /// categories, making the earlier binding permanently unreachable.
    pub fn lenient() -> Self {
        Self {
            bindings: HashMap::new(),
            strict: false,
        }
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            bindings: HashMap::new(),
            strict: config.strict_bindings,
        }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Insert or override the binding for `name`.
    ///
    /// A later call for the same name replaces the earlier one, except that
    /// a strict registry refuses a category change and leaves the first
    /// binding active.
    pub fn register(&mut self, name: impl Into<String>, binding: Binding) -> Result<()> {
        let name = name.into();
        if let Some(existing) = self.bindings.get(&name) {
            if self.strict && existing.category != binding.category {
                return Err(Error::DuplicateBinding {
                    name,
                    existing: existing.category,
                    attempted: binding.category,
                });
            }
            tracing::debug!(
                name = %name,
                old = %existing.category,
                new = %binding.category,
                "overwriting operator binding"
            );
        }
        self.bindings.insert(name, binding);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Result<&Binding> {
        self.bindings
            .get(name)
            .ok_or_else(|| Error::UnknownOperator {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
