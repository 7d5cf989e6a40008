//! Source stream that emits one record built from its named parameters:
//! `tuple(id=1, name=ada)`.

use rivulet_core::context::StreamContext;
use rivulet_core::error::Result;
use rivulet_core::tuple::Tuple;

use crate::traits::TupleStream;

pub struct TupStream {
    record: Tuple,
    done: bool,
}

impl TupStream {
    pub fn new(record: Tuple) -> Self {
        Self {
            record,
            done: false,
        }
    }
}

impl TupleStream for TupStream {
    fn name(&self) -> &'static str {
        "tuple"
    }

    fn open(&mut self, _ctx: &StreamContext) -> Result<()> {
        self.done = false;
        Ok(())
    }

    fn read(&mut self) -> Result<Option<Tuple>> {
        if self.done {
            return Ok(None);
        }
        self.done = true;
        Ok(Some(self.record.clone()))
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
