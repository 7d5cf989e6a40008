//! Decorator that keeps records whose predicate evaluates to true.

use rivulet_core::context::StreamContext;
use rivulet_core::error::{Error, Result};
use rivulet_core::sort::SortKey;
use rivulet_core::tuple::Tuple;

use crate::traits::{Evaluator, TupleStream};

pub struct HavingStream {
    child: Box<dyn TupleStream>,
    predicate: Box<dyn Evaluator>,
}

impl HavingStream {
    pub fn new(child: Box<dyn TupleStream>, predicate: Box<dyn Evaluator>) -> Self {
        Self { child, predicate }
    }
}

impl TupleStream for HavingStream {
    fn name(&self) -> &'static str {
        "having"
    }

    fn open(&mut self, ctx: &StreamContext) -> Result<()> {
        self.child.open(ctx)
    }

    fn read(&mut self) -> Result<Option<Tuple>> {
        loop {
            let record = match self.child.read() {
                Ok(Some(t)) => t,
                Ok(None) => return Ok(None),
                Err(e) => {
                    let _ = self.child.close();
                    return Err(e);
                }
            };
            let verdict = match self.predicate.evaluate(&record) {
                Ok(v) => v,
                Err(e) => {
                    let _ = self.child.close();
                    return Err(e);
                }
            };
            match verdict.truthy() {
                Some(true) => return Ok(Some(record)),
                Some(false) => continue,
                None => {
                    let _ = self.child.close();
                    return Err(Error::stream(
                        "having",
                        format!(
                            "predicate '{}' must yield a boolean, got {}",
                            self.predicate.name(),
                            verdict.type_name()
                        ),
                    ));
                }
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        self.child.close()
    }

    fn sort_order(&self) -> &[SortKey] {
        self.child.sort_order()
    }
}
