//! Parsed expression syntax nodes.
//!
//! The tokenizer/parser that turns query text into these nodes lives outside
//! this workspace; the factory consumes nodes, it never retains them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tuple::Scalar;

/// One positional argument: either a nested operator call or a literal value
/// (bare field names arrive as string values).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Arg {
    Expr(ExpressionNode),
    Value(Scalar),
}

/// Immutable parsed syntax unit: operator name, ordered positional arguments,
/// named parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionNode {
    pub name: String,
    pub args: Vec<Arg>,
    pub params: BTreeMap<String, String>,
}

impl ExpressionNode {
    pub fn call(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            params: BTreeMap::new(),
        }
    }

    pub fn with_expr(mut self, child: ExpressionNode) -> Self {
        self.args.push(Arg::Expr(child));
        self
    }

    pub fn with_value(mut self, value: impl Into<Scalar>) -> Self {
        self.args.push(Arg::Value(value.into()));
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

impl fmt::Display for ExpressionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        let mut first = true;
        for arg in &self.args {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            match arg {
                Arg::Expr(e) => write!(f, "{e}")?,
                Arg::Value(v) => write!(f, "{v}")?,
            }
        }
        for (k, v) in &self.params {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{k}=\"{v}\"")?;
        }
        write!(f, ")")
    }
}
