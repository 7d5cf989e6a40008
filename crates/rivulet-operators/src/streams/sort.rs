//! Decorator that fully buffers its child and re-emits in sorted order.

use rivulet_core::context::StreamContext;
use rivulet_core::error::Result;
use rivulet_core::sort::{self, SortKey};
use rivulet_core::tuple::Tuple;

use crate::traits::TupleStream;

pub struct SortStream {
    child: Box<dyn TupleStream>,
    by: Vec<SortKey>,
    buffered: Option<std::vec::IntoIter<Tuple>>,
}

impl SortStream {
    pub fn new(child: Box<dyn TupleStream>, by: Vec<SortKey>) -> Self {
        Self {
            child,
            by,
            buffered: None,
        }
    }
}

impl TupleStream for SortStream {
    fn name(&self) -> &'static str {
        "sort"
    }

    fn open(&mut self, ctx: &StreamContext) -> Result<()> {
        self.buffered = None;
        self.child.open(ctx)
    }

    fn read(&mut self) -> Result<Option<Tuple>> {
        if self.buffered.is_none() {
            let mut records = Vec::new();
            loop {
                match self.child.read() {
                    Ok(Some(t)) => records.push(t),
                    Ok(None) => break,
                    Err(e) => {
                        let _ = self.child.close();
                        return Err(e);
                    }
                }
            }
            records.sort_by(|a, b| sort::compare(&self.by, a, b));
            self.buffered = Some(records.into_iter());
        }
        Ok(self.buffered.as_mut().and_then(Iterator::next))
    }

    fn close(&mut self) -> Result<()> {
        self.buffered = None;
        self.child.close()
    }

    fn sort_order(&self) -> &[SortKey] {
        &self.by
    }
}
