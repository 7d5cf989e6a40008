//! Decorator that expands a list-valued field into one record per element.
//! Records whose field is not a list pass through unchanged; an empty list
//! drops the record.

use std::collections::VecDeque;

use rivulet_core::context::StreamContext;
use rivulet_core::error::Result;
use rivulet_core::tuple::{Scalar, Tuple};

use crate::traits::TupleStream;

pub struct CartesianProductStream {
    child: Box<dyn TupleStream>,
    field: String,
    pending: VecDeque<Tuple>,
}

impl CartesianProductStream {
    pub fn new(child: Box<dyn TupleStream>, field: String) -> Self {
        Self {
            child,
            field,
            pending: VecDeque::new(),
        }
    }
}

impl TupleStream for CartesianProductStream {
    fn name(&self) -> &'static str {
        "cartesianProduct"
    }

    fn open(&mut self, ctx: &StreamContext) -> Result<()> {
        self.pending.clear();
        self.child.open(ctx)
    }

    fn read(&mut self) -> Result<Option<Tuple>> {
        loop {
            if let Some(t) = self.pending.pop_front() {
                return Ok(Some(t));
            }
            let record = match self.child.read() {
                Ok(Some(t)) => t,
                Ok(None) => return Ok(None),
                Err(e) => {
                    let _ = self.child.close();
                    return Err(e);
                }
            };
            match record.value_of(&self.field) {
                Scalar::List(items) => {
                    for item in items {
                        let mut out = record.clone();
                        out.set(self.field.clone(), item);
                        self.pending.push_back(out);
                    }
                }
                _ => return Ok(Some(record)),
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        self.pending.clear();
        self.child.close()
    }
}
