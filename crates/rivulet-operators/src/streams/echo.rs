//! Source stream that emits its argument as a single one-field record.
//! Handy for smoke tests and for feeding literals into decorators.

use rivulet_core::context::StreamContext;
use rivulet_core::error::Result;
use rivulet_core::tuple::{Scalar, Tuple};

use crate::traits::TupleStream;

pub struct EchoStream {
    value: String,
    done: bool,
}

impl EchoStream {
    pub fn new(value: String) -> Self {
        Self { value, done: false }
    }
}

impl TupleStream for EchoStream {
    fn name(&self) -> &'static str {
        "echo"
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
        Ok(Some(Tuple::from_pairs([(
            "echo",
            Scalar::Str(self.value.clone()),
        )])))
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
