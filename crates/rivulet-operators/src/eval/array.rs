//! List evaluators.

use rivulet_core::error::{Error, Result};
use rivulet_core::tuple::{scalar_cmp, Scalar, Tuple};

use crate::traits::Evaluator;

/// Collects its operands into a list: `array(a, b, c)`.
pub struct ArrayEvaluator {
    operands: Vec<Box<dyn Evaluator>>,
}

impl ArrayEvaluator {
    pub fn new(operands: Vec<Box<dyn Evaluator>>) -> Self {
        Self { operands }
    }
}

impl Evaluator for ArrayEvaluator {
    fn name(&self) -> &'static str {
        "array"
    }

    fn evaluate(&self, tuple: &Tuple) -> Result<Scalar> {
        let mut items = Vec::with_capacity(self.operands.len());
        for operand in &self.operands {
            items.push(operand.evaluate(tuple)?);
        }
        Ok(Scalar::List(items))
    }
}

pub struct LengthEvaluator {
    operand: Box<dyn Evaluator>,
}

impl LengthEvaluator {
    pub fn new(operand: Box<dyn Evaluator>) -> Self {
        Self { operand }
    }
}

impl Evaluator for LengthEvaluator {
    fn name(&self) -> &'static str {
        "length"
    }

    fn evaluate(&self, tuple: &Tuple) -> Result<Scalar> {
        match self.operand.evaluate(tuple)? {
            Scalar::List(items) => Ok(Scalar::I64(items.len() as i64)),
            Scalar::Null => Ok(Scalar::Null),
            other => Err(Error::stream(
                "length",
                format!("expected list, got {}", other.type_name()),
            )),
        }
    }
}

pub struct ReverseEvaluator {
    operand: Box<dyn Evaluator>,
}

impl ReverseEvaluator {
    pub fn new(operand: Box<dyn Evaluator>) -> Self {
        Self { operand }
    }
}

impl Evaluator for ReverseEvaluator {
    fn name(&self) -> &'static str {
        "rev"
    }

    fn evaluate(&self, tuple: &Tuple) -> Result<Scalar> {
        match self.operand.evaluate(tuple)? {
            Scalar::List(mut items) => {
                items.reverse();
                Ok(Scalar::List(items))
            }
            other => Err(Error::stream(
                "rev",
                format!("expected list, got {}", other.type_name()),
            )),
        }
    }
}

/// Ascending sort of a list.
pub struct AscEvaluator {
    operand: Box<dyn Evaluator>,
}

impl AscEvaluator {
    pub fn new(operand: Box<dyn Evaluator>) -> Self {
        Self { operand }
    }
}

impl Evaluator for AscEvaluator {
    fn name(&self) -> &'static str {
        "asc"
    }

    fn evaluate(&self, tuple: &Tuple) -> Result<Scalar> {
        match self.operand.evaluate(tuple)? {
            Scalar::List(mut items) => {
                items.sort_by(scalar_cmp);
                Ok(Scalar::List(items))
            }
            other => Err(Error::stream(
                "asc",
                format!("expected list, got {}", other.type_name()),
            )),
        }
    }
}

/// Appends values to a list; list operands are spliced in element-wise.
/// Registered as both `append` and `addAll`.
pub struct AppendEvaluator {
    operands: Vec<Box<dyn Evaluator>>,
}

impl AppendEvaluator {
    pub fn new(operands: Vec<Box<dyn Evaluator>>) -> Self {
        Self { operands }
    }
}

impl Evaluator for AppendEvaluator {
    fn name(&self) -> &'static str {
        "append"
    }

    fn evaluate(&self, tuple: &Tuple) -> Result<Scalar> {
        let mut operands = self.operands.iter();
        let base = match operands.next() {
            Some(op) => op.evaluate(tuple)?,
            None => return Ok(Scalar::List(Vec::new())),
        };
        let mut items = match base {
            Scalar::List(items) => items,
            other => {
                return Err(Error::stream(
                    "append",
                    format!("first operand must be a list, got {}", other.type_name()),
                ))
            }
        };
        for operand in operands {
            match operand.evaluate(tuple)? {
                Scalar::List(more) => items.extend(more),
                single => items.push(single),
            }
        }
        Ok(Scalar::List(items))
    }
}
