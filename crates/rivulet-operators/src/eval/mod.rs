//! Evaluators: pure value computations over one record.

pub mod arith;
pub mod array;
pub mod boolean;
pub mod cond;
pub mod misc;

use rivulet_core::error::Result;
use rivulet_core::tuple::{Scalar, Tuple};

use crate::traits::Evaluator;

/// Leaf operand naming a record field.
///
/// A name that does not resolve to a field yields itself as a string
/// literal, so bare words work both as field references and as constants.
pub struct FieldValueEvaluator {
    name: String,
}

impl FieldValueEvaluator {
    pub fn new(name: String) -> Self {
        Self { name }
    }
}

impl Evaluator for FieldValueEvaluator {
    fn name(&self) -> &'static str {
        "field"
    }

    fn evaluate(&self, tuple: &Tuple) -> Result<Scalar> {
        match tuple.get(&self.name) {
            Some(value) => Ok(value.clone()),
            None => Ok(Scalar::Str(self.name.clone())),
        }
    }
}

/// Leaf operand holding a literal value (`val(...)` and literal arguments).
pub struct RawValueEvaluator {
    value: Scalar,
}

impl RawValueEvaluator {
    pub fn new(value: Scalar) -> Self {
        Self { value }
    }
}

impl Evaluator for RawValueEvaluator {
    fn name(&self) -> &'static str {
        "val"
    }

    fn evaluate(&self, _tuple: &Tuple) -> Result<Scalar> {
        Ok(self.value.clone())
    }
}
