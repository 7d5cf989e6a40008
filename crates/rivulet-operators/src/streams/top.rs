//! Decorator that keeps the best `size` records under a sort key.

use rivulet_core::context::StreamContext;
use rivulet_core::error::Result;
use rivulet_core::sort::{self, SortKey};
use rivulet_core::tuple::Tuple;

use crate::traits::TupleStream;

pub struct RankStream {
    child: Box<dyn TupleStream>,
    size: usize,
    by: Vec<SortKey>,
    buffered: Option<std::vec::IntoIter<Tuple>>,
}

impl RankStream {
    pub fn new(child: Box<dyn TupleStream>, size: usize, by: Vec<SortKey>) -> Self {
        Self {
            child,
            size,
            by,
            buffered: None,
        }
    }
}

impl TupleStream for RankStream {
    fn name(&self) -> &'static str {
        "top"
    }

    fn open(&mut self, ctx: &StreamContext) -> Result<()> {
        self.buffered = None;
        self.child.open(ctx)
    }

    fn read(&mut self) -> Result<Option<Tuple>> {
        if self.buffered.is_none() {
            // Bounded buffer: keep at most 2*size records between trims so
            // memory stays proportional to the requested rank size.
            let mut kept: Vec<Tuple> = Vec::new();
            loop {
                match self.child.read() {
                    Ok(Some(t)) => {
                        kept.push(t);
                        if kept.len() >= self.size.saturating_mul(2).max(self.size + 1) {
                            kept.sort_by(|a, b| sort::compare(&self.by, a, b));
                            kept.truncate(self.size);
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        let _ = self.child.close();
                        return Err(e);
                    }
                }
            }
            kept.sort_by(|a, b| sort::compare(&self.by, a, b));
            kept.truncate(self.size);
            self.buffered = Some(kept.into_iter());
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
