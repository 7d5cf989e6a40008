//! Decorator that merges two or more sorted child streams.
//!
//! Output order follows the declared `on` key, never arrival order; ties
//! break toward the lower child index so merges are fully deterministic.

use rivulet_core::context::StreamContext;
use rivulet_core::error::{Error, Result};
use rivulet_core::sort::{self, SortKey};
use rivulet_core::tuple::Tuple;

use crate::traits::TupleStream;

enum Slot {
    Pending,
    Ready(Tuple),
    Done,
}

pub struct MergeStream {
    children: Vec<Box<dyn TupleStream>>,
    on: Vec<SortKey>,
    slots: Vec<Slot>,
}

impl MergeStream {
    pub fn new(children: Vec<Box<dyn TupleStream>>, on: Vec<SortKey>) -> Self {
        let slots = children.iter().map(|_| Slot::Pending).collect();
        Self {
            children,
            on,
            slots,
        }
    }

    fn close_all(&mut self) -> Result<()> {
        // Best-effort cascade: every child gets closed even when an earlier
        // close fails; the first failure is reported after the sweep.
        let mut first_err = None;
        for child in &mut self.children {
            if let Err(e) = child.close() {
                tracing::debug!(child = child.name(), error = %e, "child close failed");
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl TupleStream for MergeStream {
    fn name(&self) -> &'static str {
        "merge"
    }

    fn open(&mut self, ctx: &StreamContext) -> Result<()> {
        for slot in &mut self.slots {
            *slot = Slot::Pending;
        }
        for i in 0..self.children.len() {
            if let Err(e) = self.children[i].open(ctx) {
                // Close the siblings that did open before re-raising.
                for j in 0..i {
                    let _ = self.children[j].close();
                }
                return Err(e);
            }
        }
        Ok(())
    }

    fn read(&mut self) -> Result<Option<Tuple>> {
        // Refill every consumed slot.
        for i in 0..self.children.len() {
            if matches!(self.slots[i], Slot::Pending) {
                match self.children[i].read() {
                    Ok(Some(t)) => self.slots[i] = Slot::Ready(t),
                    Ok(None) => self.slots[i] = Slot::Done,
                    Err(e) => {
                        let _ = self.close_all();
                        return Err(e);
                    }
                }
            }
        }

        // Pick the smallest ready head under the merge key.
        let mut best: Option<usize> = None;
        for (i, slot) in self.slots.iter().enumerate() {
            if let Slot::Ready(candidate) = slot {
                best = match best {
                    None => Some(i),
                    Some(j) => {
                        let Slot::Ready(current) = &self.slots[j] else {
                            return Err(Error::stream("merge", "slot state out of sync"));
                        };
                        if sort::compare(&self.on, candidate, current) == std::cmp::Ordering::Less
                        {
                            Some(i)
                        } else {
                            Some(j)
                        }
                    }
                };
            }
        }

        match best {
            None => Ok(None),
            Some(i) => {
                let taken = std::mem::replace(&mut self.slots[i], Slot::Pending);
                match taken {
                    Slot::Ready(t) => Ok(Some(t)),
                    _ => Err(Error::stream("merge", "slot state out of sync")),
                }
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        for slot in &mut self.slots {
            *slot = Slot::Pending;
        }
        self.close_all()
    }

    fn sort_order(&self) -> &[SortKey] {
        &self.on
    }
}
