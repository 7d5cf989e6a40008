//! Decorator that drops records whose `over` field repeats the previous
//! record's value. Requires input sorted on that field to dedup globally.

use rivulet_core::context::StreamContext;
use rivulet_core::error::Result;
use rivulet_core::sort::SortKey;
use rivulet_core::tuple::{scalar_cmp, Scalar, Tuple};

use crate::traits::TupleStream;

pub struct UniqueStream {
    child: Box<dyn TupleStream>,
    over: String,
    previous: Option<Scalar>,
}

impl UniqueStream {
    pub fn new(child: Box<dyn TupleStream>, over: String) -> Self {
        Self {
            child,
            over,
            previous: None,
        }
    }
}

impl TupleStream for UniqueStream {
    fn name(&self) -> &'static str {
        "unique"
    }

    fn open(&mut self, ctx: &StreamContext) -> Result<()> {
        self.previous = None;
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
            let value = record.value_of(&self.over);
            let duplicate = self
                .previous
                .as_ref()
                .is_some_and(|prev| scalar_cmp(prev, &value) == std::cmp::Ordering::Equal);
            if duplicate {
                continue;
            }
            self.previous = Some(value);
            return Ok(Some(record));
        }
    }

    fn close(&mut self) -> Result<()> {
        self.previous = None;
        self.child.close()
    }

    fn sort_order(&self) -> &[SortKey] {
        self.child.sort_order()
    }
}
