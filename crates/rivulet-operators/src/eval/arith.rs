//! Numeric evaluators.
//!
//! Null operands propagate to a null result. Integer inputs stay integers
//! where the operation is closed over them; division and roots widen to
//! doubles.

use rivulet_core::error::{Error, Result};
use rivulet_core::tuple::{Scalar, Tuple};

use crate::traits::Evaluator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mult,
    Div,
    Mod,
    Pow,
}

impl ArithOp {
    fn name(self) -> &'static str {
        match self {
            ArithOp::Add => "add",
            ArithOp::Sub => "sub",
            ArithOp::Mult => "mult",
            ArithOp::Div => "div",
            ArithOp::Mod => "mod",
            ArithOp::Pow => "pow",
        }
    }
}

pub struct ArithEvaluator {
    op: ArithOp,
    operands: Vec<Box<dyn Evaluator>>,
}

impl ArithEvaluator {
    pub fn new(op: ArithOp, operands: Vec<Box<dyn Evaluator>>) -> Self {
        Self { op, operands }
    }
}

impl Evaluator for ArithEvaluator {
    fn name(&self) -> &'static str {
        self.op.name()
    }

    fn evaluate(&self, tuple: &Tuple) -> Result<Scalar> {
        let mut values = Vec::with_capacity(self.operands.len());
        for operand in &self.operands {
            let v = operand.evaluate(tuple)?;
            if v.is_null() {
                return Ok(Scalar::Null);
            }
            values.push(numeric(self.name(), &v)?);
        }

        let all_ints = values.iter().all(|v| matches!(v, Num::Int(_)));
        let integral = all_ints && matches!(self.op, ArithOp::Add | ArithOp::Sub | ArithOp::Mult);

        if integral {
            let mut ints = values.iter().map(Num::as_i64);
            let first = ints.next().ok_or_else(|| no_operands(self.name()))?;
            let folded = ints.fold(first, |acc, v| match self.op {
                ArithOp::Add => acc.wrapping_add(v),
                ArithOp::Sub => acc.wrapping_sub(v),
                ArithOp::Mult => acc.wrapping_mul(v),
                _ => acc,
            });
            return Ok(Scalar::I64(folded));
        }

        let mut floats = values.iter().map(Num::as_f64);
        let first = floats.next().ok_or_else(|| no_operands(self.name()))?;
        let folded = floats.try_fold(first, |acc, v| match self.op {
            ArithOp::Add => Ok(acc + v),
            ArithOp::Sub => Ok(acc - v),
            ArithOp::Mult => Ok(acc * v),
            ArithOp::Div => {
                if v == 0.0 {
                    Err(Error::stream(self.name(), "division by zero"))
                } else {
                    Ok(acc / v)
                }
            }
            ArithOp::Mod => {
                if v == 0.0 {
                    Err(Error::stream(self.name(), "modulo by zero"))
                } else {
                    Ok(acc % v)
                }
            }
            ArithOp::Pow => Ok(acc.powf(v)),
        })?;
        Ok(Scalar::F64(folded))
    }
}

#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn as_i64(&self) -> i64 {
        match self {
            Num::Int(i) => *i,
            Num::Float(f) => *f as i64,
        }
    }

    fn as_f64(&self) -> f64 {
        match self {
            Num::Int(i) => *i as f64,
            Num::Float(f) => *f,
        }
    }
}

fn numeric(operator: &str, v: &Scalar) -> Result<Num> {
    match v {
        Scalar::I64(i) => Ok(Num::Int(*i)),
        Scalar::F64(f) => Ok(Num::Float(*f)),
        other => Err(Error::stream(
            operator,
            format!("non-numeric operand: {}", other.type_name()),
        )),
    }
}

fn no_operands(operator: &str) -> Error {
    Error::stream(operator, "no operands")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Abs,
    Round,
    Floor,
    Ceil,
    Sqrt,
}

impl UnaryOp {
    fn name(self) -> &'static str {
        match self {
            UnaryOp::Abs => "abs",
            UnaryOp::Round => "round",
            UnaryOp::Floor => "floor",
            UnaryOp::Ceil => "ceil",
            UnaryOp::Sqrt => "sqrt",
        }
    }
}

pub struct UnaryMathEvaluator {
    op: UnaryOp,
    operand: Box<dyn Evaluator>,
}

impl UnaryMathEvaluator {
    pub fn new(op: UnaryOp, operand: Box<dyn Evaluator>) -> Self {
        Self { op, operand }
    }
}

impl Evaluator for UnaryMathEvaluator {
    fn name(&self) -> &'static str {
        self.op.name()
    }

    fn evaluate(&self, tuple: &Tuple) -> Result<Scalar> {
        let v = self.operand.evaluate(tuple)?;
        if v.is_null() {
            return Ok(Scalar::Null);
        }
        let n = numeric(self.name(), &v)?;
        Ok(match (self.op, n) {
            (UnaryOp::Abs, Num::Int(i)) => Scalar::I64(i.wrapping_abs()),
            (UnaryOp::Abs, Num::Float(f)) => Scalar::F64(f.abs()),
            (UnaryOp::Round, Num::Int(i)) => Scalar::I64(i),
            (UnaryOp::Round, Num::Float(f)) => Scalar::I64(f.round() as i64),
            (UnaryOp::Floor, Num::Int(i)) => Scalar::I64(i),
            (UnaryOp::Floor, Num::Float(f)) => Scalar::I64(f.floor() as i64),
            (UnaryOp::Ceil, Num::Int(i)) => Scalar::I64(i),
            (UnaryOp::Ceil, Num::Float(f)) => Scalar::I64(f.ceil() as i64),
            (UnaryOp::Sqrt, n) => Scalar::F64(n.as_f64().sqrt()),
        })
    }
}
