//! Boolean and comparison evaluators.

use std::cmp::Ordering;

use rivulet_core::error::{Error, Result};
use rivulet_core::tuple::{scalar_cmp, Scalar, Tuple};

use crate::traits::Evaluator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Gt,
    Gteq,
    Lt,
    Lteq,
}

impl CompareOp {
    fn name(self) -> &'static str {
        match self {
            CompareOp::Eq => "eq",
            CompareOp::Gt => "gt",
            CompareOp::Gteq => "gteq",
            CompareOp::Lt => "lt",
            CompareOp::Lteq => "lteq",
        }
    }

    fn accepts(self, ord: Ordering) -> bool {
        match self {
            CompareOp::Eq => ord == Ordering::Equal,
            CompareOp::Gt => ord == Ordering::Greater,
            CompareOp::Gteq => ord != Ordering::Less,
            CompareOp::Lt => ord == Ordering::Less,
            CompareOp::Lteq => ord != Ordering::Greater,
        }
    }
}

pub struct ComparisonEvaluator {
    op: CompareOp,
    left: Box<dyn Evaluator>,
    right: Box<dyn Evaluator>,
}

impl ComparisonEvaluator {
    pub fn new(op: CompareOp, left: Box<dyn Evaluator>, right: Box<dyn Evaluator>) -> Self {
        Self { op, left, right }
    }
}

impl Evaluator for ComparisonEvaluator {
    fn name(&self) -> &'static str {
        self.op.name()
    }

    fn evaluate(&self, tuple: &Tuple) -> Result<Scalar> {
        let lv = self.left.evaluate(tuple)?;
        let rv = self.right.evaluate(tuple)?;
        // scalar_cmp already compares mixed numerics numerically and puts
        // nulls first, so one total order serves every comparison op.
        Ok(Scalar::Bool(self.op.accepts(scalar_cmp(&lv, &rv))))
    }
}

/// Variadic conjunction/disjunction. Short-circuits left to right.
pub struct AndEvaluator {
    operands: Vec<Box<dyn Evaluator>>,
}

impl AndEvaluator {
    pub fn new(operands: Vec<Box<dyn Evaluator>>) -> Self {
        Self { operands }
    }
}

impl Evaluator for AndEvaluator {
    fn name(&self) -> &'static str {
        "and"
    }

    fn evaluate(&self, tuple: &Tuple) -> Result<Scalar> {
        for operand in &self.operands {
            if !boolean("and", operand.evaluate(tuple)?)? {
                return Ok(Scalar::Bool(false));
            }
        }
        Ok(Scalar::Bool(true))
    }
}

pub struct OrEvaluator {
    operands: Vec<Box<dyn Evaluator>>,
}

impl OrEvaluator {
    pub fn new(operands: Vec<Box<dyn Evaluator>>) -> Self {
        Self { operands }
    }
}

impl Evaluator for OrEvaluator {
    fn name(&self) -> &'static str {
        "or"
    }

    fn evaluate(&self, tuple: &Tuple) -> Result<Scalar> {
        for operand in &self.operands {
            if boolean("or", operand.evaluate(tuple)?)? {
                return Ok(Scalar::Bool(true));
            }
        }
        Ok(Scalar::Bool(false))
    }
}

pub struct NotEvaluator {
    operand: Box<dyn Evaluator>,
}

impl NotEvaluator {
    pub fn new(operand: Box<dyn Evaluator>) -> Self {
        Self { operand }
    }
}

impl Evaluator for NotEvaluator {
    fn name(&self) -> &'static str {
        "not"
    }

    fn evaluate(&self, tuple: &Tuple) -> Result<Scalar> {
        Ok(Scalar::Bool(!boolean("not", self.operand.evaluate(tuple)?)?))
    }
}

fn boolean(operator: &str, v: Scalar) -> Result<bool> {
    v.truthy().ok_or_else(|| {
        Error::stream(
            operator,
            format!("expected boolean operand, got {}", v.type_name()),
        )
    })
}
