//! Odds and ends: `coalesce` and `uuid`.

use rivulet_core::error::Result;
use rivulet_core::tuple::{Scalar, Tuple};

use crate::traits::Evaluator;

/// First non-null operand, or null when they all are.
pub struct CoalesceEvaluator {
    operands: Vec<Box<dyn Evaluator>>,
}

impl CoalesceEvaluator {
    pub fn new(operands: Vec<Box<dyn Evaluator>>) -> Self {
        Self { operands }
    }
}

impl Evaluator for CoalesceEvaluator {
    fn name(&self) -> &'static str {
        "coalesce"
    }

    fn evaluate(&self, tuple: &Tuple) -> Result<Scalar> {
        for operand in &self.operands {
            let v = operand.evaluate(tuple)?;
            if !v.is_null() {
                return Ok(v);
            }
        }
        Ok(Scalar::Null)
    }
}

/// Fresh v4 UUID per evaluation. The one deliberately impure evaluator.
pub struct UuidEvaluator;

impl Evaluator for UuidEvaluator {
    fn name(&self) -> &'static str {
        "uuid"
    }

    fn evaluate(&self, _tuple: &Tuple) -> Result<Scalar> {
        Ok(Scalar::Str(uuid::Uuid::new_v4().to_string()))
    }
}
