//! Conditional evaluator: `if(test, then, else)`.

use rivulet_core::error::{Error, Result};
use rivulet_core::tuple::{Scalar, Tuple};

use crate::traits::Evaluator;

pub struct IfThenElseEvaluator {
    test: Box<dyn Evaluator>,
    then_branch: Box<dyn Evaluator>,
    else_branch: Box<dyn Evaluator>,
}

impl IfThenElseEvaluator {
    pub fn new(
        test: Box<dyn Evaluator>,
        then_branch: Box<dyn Evaluator>,
        else_branch: Box<dyn Evaluator>,
    ) -> Self {
        Self {
            test,
            then_branch,
            else_branch,
        }
    }
}

impl Evaluator for IfThenElseEvaluator {
    fn name(&self) -> &'static str {
        "if"
    }

    fn evaluate(&self, tuple: &Tuple) -> Result<Scalar> {
        let test = self.test.evaluate(tuple)?;
        match test.truthy() {
            Some(true) => self.then_branch.evaluate(tuple),
            Some(false) => self.else_branch.evaluate(tuple),
            None => Err(Error::stream(
                "if",
                format!("test must yield a boolean, got {}", test.type_name()),
            )),
        }
    }
}
